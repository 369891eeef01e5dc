use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::utils::ClientResult;

const TOKEN_FILE: &str = "jwt_token";
const USER_FILE: &str = "current_user.json";

/// 会话中保存的当前用户身份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<i64>,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == "ADMIN"
    }
}

/// 认证状态的唯一来源：token 与当前用户要么同时存在，要么同时不存在。
/// 角色只用于界面侧的拦截，服务端才是鉴权的最终裁决者。
pub struct SessionStore {
    dir: PathBuf,
    token: Option<String>,
    user: Option<SessionUser>,
}

impl SessionStore {
    /// 进程启动时恢复会话。损坏的持久化状态按"未登录"处理，绝不让启动失败。
    pub fn restore(dir: &Path) -> Self {
        let token = read_entry(&dir.join(TOKEN_FILE));
        let user = read_entry(&dir.join(USER_FILE)).and_then(|raw| {
            match serde_json::from_str::<SessionUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("会话用户数据损坏，按未登录处理: {}", e);
                    None
                }
            }
        });

        // 缺一侧则两侧都视为不存在
        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (Some(token), Some(user)),
            _ => (None, None),
        };

        Self {
            dir: dir.to_path_buf(),
            token,
            user,
        }
    }

    /// 登录成功后写入新的会话对，替换任何旧会话。
    /// 两个文件都写成功后内存状态才切换，失败时保持原状态。
    pub fn establish(&mut self, token: String, user: SessionUser) -> ClientResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(USER_FILE), serde_json::to_string(&user)?)?;
        std::fs::write(self.dir.join(TOKEN_FILE), &token)?;

        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    /// 无条件同步清除会话，不与后端通信
    pub fn clear(&mut self) {
        for file in [TOKEN_FILE, USER_FILE] {
            let path = self.dir.join(file);
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("清除会话文件失败 {}: {}", path.display(), e);
                }
            }
        }
        self.token = None;
        self.user = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map(|user| user.is_admin()).unwrap_or(false)
    }
}

fn read_entry(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => Some(content.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> SessionUser {
        SessionUser {
            id: Some(1),
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            role: "ADMIN".to_string(),
        }
    }

    #[test]
    fn establish_then_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = SessionStore::restore(dir.path());
        assert!(!store.is_authenticated());
        store.establish("tok-123".to_string(), admin()).unwrap();

        let restored = SessionStore::restore(dir.path());
        assert_eq!(restored.token(), Some("tok-123"));
        assert_eq!(restored.user().unwrap().username, "alice");
        assert_eq!(restored.user().unwrap().role, "ADMIN");
        assert!(restored.is_admin());
    }

    #[test]
    fn clear_removes_both_entries() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = SessionStore::restore(dir.path());
        store.establish("tok".to_string(), admin()).unwrap();
        store.clear();

        assert!(store.token().is_none());
        assert!(store.user().is_none());

        let restored = SessionStore::restore(dir.path());
        assert!(!restored.is_authenticated());
        assert!(restored.user().is_none());
    }

    #[test]
    fn clear_on_empty_session_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::restore(dir.path());
        store.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn corrupt_user_entry_reads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "tok").unwrap();
        std::fs::write(dir.path().join(USER_FILE), "{not json").unwrap();

        let store = SessionStore::restore(dir.path());
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn half_written_pair_reads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "tok").unwrap();

        let store = SessionStore::restore(dir.path());
        assert!(store.token().is_none());

        std::fs::remove_file(dir.path().join(TOKEN_FILE)).unwrap();
        std::fs::write(
            dir.path().join(USER_FILE),
            serde_json::to_string(&admin()).unwrap(),
        )
        .unwrap();

        let store = SessionStore::restore(dir.path());
        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn login_replaces_prior_session() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = SessionStore::restore(dir.path());
        store.establish("tok-1".to_string(), admin()).unwrap();

        let bob = SessionUser {
            id: Some(2),
            username: "bob".to_string(),
            email: None,
            role: "USER".to_string(),
        };
        store.establish("tok-2".to_string(), bob).unwrap();

        let restored = SessionStore::restore(dir.path());
        assert_eq!(restored.token(), Some("tok-2"));
        assert_eq!(restored.user().unwrap().username, "bob");
        assert!(!restored.is_admin());
    }
}
