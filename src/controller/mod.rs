//! 把用户动作翻译成网关调用加缓存刷新的控制层。
//! 每个动作只有一个处理入口，管理员动作先过本地角色门，
//! 所有变更之后都重新抓取受影响的集合，不做乐观更新。

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::api::models::{
    AdminDashboard, Article, AuthResponse, Course, ImportRequest, LoginRequest, NewArticle,
    NewCourse, NewProject, Pdf, Project, RegisterRequest,
};
use crate::api::ApiClient;
use crate::cache::views::{filter_articles, group_by_course, recent_courses};
use crate::cache::{Collection, SnapshotStore};
use crate::config::AppConfig;
use crate::session::{SessionStore, SessionUser};
use crate::utils::ClientError;
use crate::views::{self, DashboardStats};

pub struct AppController {
    api: ApiClient,
    session: SessionStore,
    cache: SnapshotStore,
    download_dir: PathBuf,
    assume_yes: bool,
    github_url: Regex,
}

impl AppController {
    pub fn new(
        config: &AppConfig,
        session: SessionStore,
        cache: SnapshotStore,
        assume_yes: bool,
    ) -> Self {
        let api = ApiClient::new(
            &config.api.base_url,
            &config.api.user_agent,
            session.token().map(str::to_string),
        );

        Self {
            api,
            session,
            cache,
            download_dir: PathBuf::from(&config.storage.download_dir),
            assume_yes,
            github_url: github_import_url(),
        }
    }

    // ---- 认证 ----

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let request = LoginRequest { username, password };
        let auth = match self
            .api
            .post::<AuthResponse, _>("/auth/login", &request, "Login failed")
            .await
        {
            Ok(auth) => auth,
            Err(e) => {
                // 失败时旧会话保持原样
                self.notice(&e.to_string());
                return Ok(());
            }
        };

        let Some(token) = auth.token.clone() else {
            self.notice(auth.message.as_deref().unwrap_or("Login failed"));
            return Ok(());
        };

        let user = session_user_from(&auth, username);
        info!("已登录: {} ({})", user.username, user.role);
        self.session.establish(token, user)?;
        println!("Login successful!");
        Ok(())
    }

    /// 只清本地会话，从不联系后端
    pub fn logout(&mut self) {
        self.session.clear();
        println!("Logged out.");
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        let request = RegisterRequest {
            username,
            password,
            email,
            first_name,
            last_name,
        };
        match self
            .api
            .post_unit("/auth/register", &request, "Registration failed")
            .await
        {
            Ok(()) => println!("Registration successful! Please login."),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub fn status(&self) {
        println!("{}", views::session_status(self.session.user()));
    }

    // ---- 初始加载批次 ----

    /// 三个集合并发抓取；单个失败不拦住其它的，
    /// 任何失败只汇总成一条通用提示
    pub async fn refresh_all(&mut self) -> Result<()> {
        info!("正在并发拉取全部集合快照...");
        let (courses, articles, pdfs) = tokio::join!(
            self.fetch_courses(),
            self.fetch_articles(),
            self.fetch_pdfs(),
        );

        let mut loaded: Vec<String> = Vec::new();
        let mut failed = false;

        match courses {
            Ok(items) => loaded.push(format!("{} courses", items.len())),
            Err(e) => {
                self.note_failure(e);
                failed = true;
            }
        }
        match articles {
            Ok(items) => loaded.push(format!("{} articles", items.len())),
            Err(e) => {
                self.note_failure(e);
                failed = true;
            }
        }
        match pdfs {
            Ok(items) => loaded.push(format!("{} PDFs", items.len())),
            Err(e) => {
                self.note_failure(e);
                failed = true;
            }
        }

        if !loaded.is_empty() {
            println!("Loaded {}.", loaded.join(", "));
        }
        if failed {
            self.notice("Some data failed to load.");
        }
        Ok(())
    }

    // ---- 仪表盘 ----

    /// 统计尽量用缓存快照，缺的集合补一次抓取；
    /// 这里的失败静默降级成 0，不打断仪表盘
    pub async fn show_dashboard(&mut self) -> Result<()> {
        let courses = self.best_effort_courses().await;
        let articles = self.best_effort_articles().await;
        let pdfs = self.best_effort_pdfs().await;

        let stats = DashboardStats {
            courses: courses.len(),
            articles: articles.len(),
            pdfs: pdfs.len(),
        };
        let recent = recent_courses(&courses);
        println!("{}", views::dashboard(&stats, self.session.user(), &recent));
        Ok(())
    }

    // ---- 课程 ----

    pub async fn list_courses(&mut self) -> Result<()> {
        match self.fetch_courses().await {
            Ok(courses) => println!("{}", views::course_list(&courses)),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn add_course(
        &mut self,
        title: &str,
        course_type: &str,
        description: &str,
    ) -> Result<()> {
        if !self.session.is_authenticated() {
            self.notice("You must login first.");
            return Ok(());
        }
        if title.trim().is_empty() {
            self.notice("Please enter a course title");
            return Ok(());
        }

        let request = NewCourse {
            title,
            course_type,
            description,
        };
        match self
            .api
            .post_unit("/courses", &request, "Failed to create course")
            .await
        {
            Ok(()) => {
                println!("Course created successfully!");
                self.refresh_after_mutation(Collection::Courses).await;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    /// 课程下的文章：纯客户端过滤当前文章快照
    pub async fn course_articles(&mut self, course_id: i64) -> Result<()> {
        let articles = match self.articles_snapshot().await {
            Ok(articles) => articles,
            Err(e) => {
                self.fail(e);
                return Ok(());
            }
        };

        let filtered = filter_articles(&articles, Some(course_id), None);
        if filtered.is_empty() {
            println!("No articles for this course.");
        } else {
            println!("{}", views::article_list(&filtered));
        }
        Ok(())
    }

    pub async fn delete_course(&mut self, id: i64) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Unauthorized access");
            return Ok(());
        }
        if !self.confirm(&format!("Are you sure you want to delete course {}?", id)) {
            println!("Cancelled.");
            return Ok(());
        }

        match self
            .api
            .delete(&format!("/courses/{}", id), "Failed to delete course")
            .await
        {
            Ok(_) => {
                println!("Course deleted.");
                self.refresh_after_mutation(Collection::Courses).await;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    // ---- 文章 ----

    /// 每次调用都是一次"标签页激活"：过滤条件从零开始，
    /// 先刷新快照再做客户端过滤
    pub async fn list_articles(
        &mut self,
        course_id: Option<i64>,
        search: Option<&str>,
        grouped: bool,
    ) -> Result<()> {
        let articles = match self.fetch_articles().await {
            Ok(articles) => articles,
            Err(e) => {
                self.fail(e);
                return Ok(());
            }
        };

        if grouped {
            let courses = self.best_effort_courses().await;
            let groups = group_by_course(&articles);
            println!("{}", views::grouped_articles(&groups, &courses));
            return Ok(());
        }

        let filtered = filter_articles(&articles, course_id, search);
        println!("{}", views::article_count(filtered.len()));
        println!("{}", views::article_list(&filtered));
        Ok(())
    }

    pub async fn add_article(&mut self, title: &str, content: &str, course_id: i64) -> Result<()> {
        if !self.session.is_authenticated() {
            self.notice("You must login first.");
            return Ok(());
        }
        if title.trim().is_empty() || content.trim().is_empty() {
            self.notice("Please fill all required fields");
            return Ok(());
        }

        let request = NewArticle {
            title,
            content,
            course_id,
        };
        match self
            .api
            .post_unit("/articles", &request, "Failed to create article")
            .await
        {
            Ok(()) => {
                println!("Article created successfully!");
                self.refresh_after_mutation(Collection::Articles).await;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn delete_article(&mut self, id: i64) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Unauthorized access");
            return Ok(());
        }
        if !self.confirm(&format!("Are you sure you want to delete article {}?", id)) {
            println!("Cancelled.");
            return Ok(());
        }

        match self
            .api
            .delete(&format!("/articles/{}", id), "Failed to delete article")
            .await
        {
            Ok(_) => {
                println!("Article deleted.");
                self.refresh_after_mutation(Collection::Articles).await;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    // ---- PDF ----

    pub async fn list_pdfs(&mut self) -> Result<()> {
        match self.fetch_pdfs().await {
            Ok(pdfs) => println!("{}", views::pdf_list(&pdfs)),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn upload_pdf(&mut self, file: &Path, course_id: Option<i64>) -> Result<()> {
        if !self.session.is_authenticated() {
            self.notice("You must login first.");
            return Ok(());
        }
        // 本地校验在任何文件和网络 IO 之前
        if let Err(message) = validate_pdf_path(file) {
            self.notice(message);
            return Ok(());
        }
        let Some(course_id) = course_id else {
            self.notice("Please select a course for the PDF.");
            return Ok(());
        };

        match self
            .api
            .upload_pdf(file, course_id, "Failed to upload PDF")
            .await
        {
            Ok(()) => {
                println!("PDF uploaded successfully!");
                self.refresh_after_mutation(Collection::Pdfs).await;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn fetch_pdf_file(&mut self, id: i64, output: Option<PathBuf>) -> Result<()> {
        let bytes = match self
            .api
            .download(&format!("/pdf/file/{}", id), "Failed to fetch PDF")
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail(e);
                return Ok(());
            }
        };

        let path = match output {
            Some(path) => path,
            None => {
                tokio::fs::create_dir_all(&self.download_dir).await?;
                self.download_dir.join(self.pdf_file_name(id).await)
            }
        };
        tokio::fs::write(&path, &bytes).await?;
        println!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    pub async fn delete_pdf(&mut self, id: i64) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Unauthorized access");
            return Ok(());
        }
        if !self.confirm(&format!("Are you sure you want to delete PDF {}?", id)) {
            println!("Cancelled.");
            return Ok(());
        }

        match self
            .api
            .delete(&format!("/pdf/{}", id), "Failed to delete PDF")
            .await
        {
            Ok(_) => {
                println!("PDF deleted.");
                self.refresh_after_mutation(Collection::Pdfs).await;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    // ---- 项目点子 ----

    pub async fn suggest_projects(&mut self, technologies: &[String]) -> Result<()> {
        if technologies.is_empty() {
            self.notice("Please enter at least one technology.");
            return Ok(());
        }

        match self
            .api
            .post::<Vec<Project>, _>(
                "/projects/suggest",
                &technologies,
                "Failed to fetch project ideas",
            )
            .await
        {
            Ok(projects) => println!("{}", views::project_list(&projects)),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn list_projects(&mut self) -> Result<()> {
        match self
            .api
            .get::<Vec<Project>>("/projects", "Failed to load projects")
            .await
        {
            Ok(projects) => println!("{}", views::project_list(&projects)),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn show_project(&mut self, id: i64) -> Result<()> {
        match self
            .api
            .get::<Project>(&format!("/projects/{}", id), "Failed to load project")
            .await
        {
            Ok(project) => println!("{}", views::project_roadmap(&project)),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn add_project(
        &mut self,
        title: &str,
        summary: &str,
        technologies: Vec<String>,
        roadmap: Vec<String>,
    ) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Only admins can add projects.");
            return Ok(());
        }

        let request = NewProject {
            title: title.to_string(),
            summary: summary.to_string(),
            technologies: technologies.clone(),
            roadmap,
        };
        match self
            .api
            .post_unit("/projects", &request, "Failed to add project")
            .await
        {
            Ok(()) => {
                println!("Project added!");
                // 用刚输入的技术栈重新发一次建议查询
                self.suggest_projects(&technologies).await?;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn import_project(&mut self, url: &str) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Only admins can import projects.");
            return Ok(());
        }
        // 后端只认 github.com/{owner}/{repo}，不合法就不发请求
        if !self.github_url.is_match(url) {
            self.notice("Invalid GitHub URL");
            return Ok(());
        }

        let request = ImportRequest { url };
        match self
            .api
            .post_unit("/projects/import", &request, "Failed to import project")
            .await
        {
            Ok(()) => {
                println!("Project imported from GitHub!");
                self.list_projects().await?;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    // ---- 管理员 ----

    pub async fn admin_users(&mut self) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Unauthorized access");
            return Ok(());
        }

        match self
            .api
            .get::<AdminDashboard>("/admin/dashboard", "Failed to load users")
            .await
        {
            Ok(dashboard) => println!("{}", views::user_list(&dashboard.users)),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn admin_delete_user(&mut self, id: i64) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Unauthorized access");
            return Ok(());
        }
        if !self.confirm(&format!("Are you sure you want to delete user {}?", id)) {
            println!("Cancelled.");
            return Ok(());
        }

        match self
            .api
            .delete(&format!("/admin/users/{}", id), "Failed to delete user")
            .await
        {
            Ok(_) => {
                println!("User deleted.");
                self.admin_users().await?;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn admin_reported(&mut self) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Unauthorized access");
            return Ok(());
        }

        match self
            .api
            .get::<AdminDashboard>("/admin/dashboard", "Failed to load reported content")
            .await
        {
            Ok(dashboard) => println!("{}", views::reported_list(&dashboard.reported_content)),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    pub async fn admin_approve(&mut self, id: i64) -> Result<()> {
        self.moderate(id, "approve", "Content approved!", "Failed to approve content")
            .await
    }

    pub async fn admin_reject(&mut self, id: i64) -> Result<()> {
        self.moderate(id, "reject", "Content rejected!", "Failed to reject content")
            .await
    }

    async fn moderate(
        &mut self,
        id: i64,
        action: &str,
        success: &str,
        default_err: &str,
    ) -> Result<()> {
        if self.admin_gate().is_err() {
            self.notice("Unauthorized access");
            return Ok(());
        }

        match self
            .api
            .put_empty(&format!("/admin/content/{}/{}", id, action), default_err)
            .await
        {
            Ok(()) => {
                println!("{}", success);
                self.admin_reported().await?;
            }
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    // ---- 抓取与缓存 ----

    async fn fetch_courses(&self) -> Result<Vec<Course>, ClientError> {
        let generation = self.cache.begin(Collection::Courses).await?;
        let courses: Vec<Course> = self.api.get("/courses", "Failed to load courses").await?;
        if !self.cache.replace_courses(generation, &courses).await? {
            warn!("courses 快照在本次请求期间已被替换，丢弃过期数据");
        }
        Ok(courses)
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>, ClientError> {
        let generation = self.cache.begin(Collection::Articles).await?;
        let articles: Vec<Article> = self.api.get("/articles", "Failed to load articles").await?;
        if !self.cache.replace_articles(generation, &articles).await? {
            warn!("articles 快照在本次请求期间已被替换，丢弃过期数据");
        }
        Ok(articles)
    }

    async fn fetch_pdfs(&self) -> Result<Vec<Pdf>, ClientError> {
        let generation = self.cache.begin(Collection::Pdfs).await?;
        let pdfs: Vec<Pdf> = self.api.get("/pdf", "Failed to load PDFs").await?;
        if !self.cache.replace_pdfs(generation, &pdfs).await? {
            warn!("pdfs 快照在本次请求期间已被替换，丢弃过期数据");
        }
        Ok(pdfs)
    }

    /// 有快照用快照，没有就补一次抓取
    async fn articles_snapshot(&self) -> Result<Vec<Article>, ClientError> {
        if let Some(articles) = self.cache.articles().await? {
            return Ok(articles);
        }
        self.fetch_articles().await
    }

    async fn best_effort_courses(&self) -> Vec<Course> {
        match self.cache.courses().await {
            Ok(Some(courses)) => courses,
            Ok(None) => self.fetch_courses().await.unwrap_or_else(|e| {
                warn!("课程统计降级为空: {}", e);
                Vec::new()
            }),
            Err(e) => {
                warn!("读取课程快照失败: {}", e);
                Vec::new()
            }
        }
    }

    async fn best_effort_articles(&self) -> Vec<Article> {
        match self.cache.articles().await {
            Ok(Some(articles)) => articles,
            Ok(None) => self.fetch_articles().await.unwrap_or_else(|e| {
                warn!("文章统计降级为空: {}", e);
                Vec::new()
            }),
            Err(e) => {
                warn!("读取文章快照失败: {}", e);
                Vec::new()
            }
        }
    }

    async fn best_effort_pdfs(&self) -> Vec<Pdf> {
        match self.cache.pdfs().await {
            Ok(Some(pdfs)) => pdfs,
            Ok(None) => self.fetch_pdfs().await.unwrap_or_else(|e| {
                warn!("PDF 统计降级为空: {}", e);
                Vec::new()
            }),
            Err(e) => {
                warn!("读取 PDF 快照失败: {}", e);
                Vec::new()
            }
        }
    }

    /// 变更成功后重新抓取受影响的集合，失败只记一条提示
    async fn refresh_after_mutation(&mut self, collection: Collection) {
        let result = match collection {
            Collection::Courses => self.fetch_courses().await.map(|_| ()),
            Collection::Articles => self.fetch_articles().await.map(|_| ()),
            Collection::Pdfs => self.fetch_pdfs().await.map(|_| ()),
        };
        if let Err(e) = result {
            self.note_failure(e);
            self.notice("Some data failed to load.");
        }
    }

    async fn pdf_file_name(&self, id: i64) -> String {
        let cached = self.cache.pdfs().await.ok().flatten().and_then(|pdfs| {
            pdfs.into_iter()
                .find(|pdf| pdf.id == id)
                .map(|pdf| pdf.file_name)
        });
        cached.unwrap_or_else(|| format!("pdf_{}.pdf", id))
    }

    // ---- 拦截与提示 ----

    fn admin_gate(&self) -> Result<(), ClientError> {
        admin_gate(&self.session)
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }

    fn notice(&self, message: &str) {
        println!("⚠ {}", message);
    }

    /// 失败统一收口：401 等价的拒绝顺带清掉本地会话
    fn fail(&mut self, err: ClientError) {
        if err.is_token_rejected() {
            warn!("后端拒绝了当前 token，清除本地会话");
            self.session.clear();
        }
        self.notice(&err.to_string());
    }

    /// 批次内的单项失败：记录日志并处理 401，不单独打提示
    fn note_failure(&mut self, err: ClientError) {
        warn!("集合加载失败: {}", err);
        if err.is_token_rejected() {
            self.session.clear();
        }
    }
}

/// 管理员门：本地有 token 且缓存角色是 ADMIN 才放行。
/// 这只是界面侧的拦截，服务端仍然会对每个请求做真正的鉴权。
fn admin_gate(session: &SessionStore) -> Result<(), ClientError> {
    if session.token().is_some() && session.is_admin() {
        Ok(())
    } else {
        Err(ClientError::Unauthorized)
    }
}

/// 非 PDF 文件在任何 IO 之前就地拒绝
fn validate_pdf_path(path: &Path) -> Result<(), &'static str> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        Ok(())
    } else {
        Err("Only PDF files are allowed.")
    }
}

fn session_user_from(auth: &AuthResponse, login_username: &str) -> SessionUser {
    SessionUser {
        id: auth.user.as_ref().map(|user| user.id),
        username: auth
            .user
            .as_ref()
            .map(|user| user.username.clone())
            .or_else(|| auth.username.clone())
            .unwrap_or_else(|| login_username.to_string()),
        email: auth
            .user
            .as_ref()
            .and_then(|user| user.email.clone())
            .or_else(|| auth.email.clone()),
        role: auth
            .user
            .as_ref()
            .map(|user| user.role.clone())
            .or_else(|| auth.role.clone())
            .unwrap_or_else(|| "USER".to_string()),
    }
}

fn github_import_url() -> Regex {
    Regex::new(r"^https://github\.com/[^/\s]+/[^/\s]+").expect("invalid GitHub URL pattern")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(role: Option<&str>) -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::restore(dir.path());
        if let Some(role) = role {
            store
                .establish(
                    "tok".to_string(),
                    SessionUser {
                        id: Some(1),
                        username: "alice".to_string(),
                        email: None,
                        role: role.to_string(),
                    },
                )
                .unwrap();
        }
        (dir, store)
    }

    #[test]
    fn admin_gate_requires_token_and_admin_role() {
        let (_dir, anonymous) = session_with(None);
        let err = admin_gate(&anonymous).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized access");

        let (_dir, user) = session_with(Some("USER"));
        assert!(admin_gate(&user).is_err());

        let (_dir, admin) = session_with(Some("ADMIN"));
        assert!(admin_gate(&admin).is_ok());
    }

    #[test]
    fn pdf_validation_is_case_insensitive_on_extension() {
        assert!(validate_pdf_path(Path::new("notes.pdf")).is_ok());
        assert!(validate_pdf_path(Path::new("NOTES.PDF")).is_ok());

        let err = validate_pdf_path(Path::new("notes.docx")).unwrap_err();
        assert_eq!(err, "Only PDF files are allowed.");
        assert!(validate_pdf_path(Path::new("notes")).is_err());
    }

    #[test]
    fn github_url_check_accepts_owner_repo_only() {
        let pattern = github_import_url();
        assert!(pattern.is_match("https://github.com/rust-lang/rust"));
        assert!(pattern.is_match("https://github.com/rust-lang/rust/tree/master"));
        assert!(!pattern.is_match("https://gitlab.com/rust-lang/rust"));
        assert!(!pattern.is_match("https://github.com/rust-lang"));
        assert!(!pattern.is_match("github.com/rust-lang/rust"));
    }

    #[test]
    fn session_user_merges_auth_response_fields() {
        let auth: AuthResponse = serde_json::from_str(
            r#"{"token":"t","role":"ADMIN","email":"a@b.c","user":{"id":3,"username":"alice","role":"ADMIN"}}"#,
        )
        .unwrap();
        let user = session_user_from(&auth, "typed-name");
        assert_eq!(user.id, Some(3));
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, "ADMIN");
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn session_user_defaults_role_and_username() {
        let auth: AuthResponse = serde_json::from_str(r#"{"token":"t"}"#).unwrap();
        let user = session_user_from(&auth, "bob");
        assert_eq!(user.username, "bob");
        assert_eq!(user.role, "USER");
        assert!(user.id.is_none());
    }
}
