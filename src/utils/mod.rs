pub mod logger;

use thiserror::Error;

/// 客户端错误分类：传输层失败、应用层拒绝、本地状态问题各自独立，
/// 调用方可以据此选择重试或仅提示
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("网络请求错误: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("解析错误: {0}")]
    Parse(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unauthorized access")]
    Unauthorized,
}

impl ClientError {
    /// 后端拒绝了当前 token（401 等价），会话应当被清除
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, ClientError::Rejected { status: 401, .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
