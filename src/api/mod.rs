pub mod models;

use reqwest::multipart;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::utils::{ClientError, ClientResult};

/// 统一的请求分发与响应解释层。
/// 契约：不重试、不设超时、不做退避，每个请求只发一次，
/// 成功或失败都一次性向调用方报告。
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, user_agent: &str, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 有 token 则带上 Bearer 头，没有则匿名发出
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// 发送请求并按声明的 content type 解释响应，返回原始响应体
    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        default_err: &str,
    ) -> ClientResult<String> {
        let response = self.authed(request).send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response.text().await?;

        interpret(status, content_type.as_deref(), &body, default_err)?;
        Ok(body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, default_err: &str) -> ClientResult<T> {
        let body = self
            .dispatch(self.client.get(self.url(path)), default_err)
            .await?;
        parse_json(&body)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        default_err: &str,
    ) -> ClientResult<T> {
        let text = self
            .dispatch(self.client.post(self.url(path)).json(body), default_err)
            .await?;
        parse_json(&text)
    }

    /// POST 但丢弃响应体（创建类接口返回的实体客户端用不上）
    pub async fn post_unit<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        default_err: &str,
    ) -> ClientResult<()> {
        self.dispatch(self.client.post(self.url(path)).json(body), default_err)
            .await
            .map(|_| ())
    }

    pub async fn put_empty(&self, path: &str, default_err: &str) -> ClientResult<()> {
        self.dispatch(self.client.put(self.url(path)), default_err)
            .await
            .map(|_| ())
    }

    /// DELETE 接口返回纯文本消息
    pub async fn delete(&self, path: &str, default_err: &str) -> ClientResult<String> {
        self.dispatch(self.client.delete(self.url(path)), default_err)
            .await
    }

    /// 下载二进制文件（PDF）
    pub async fn download(&self, path: &str, default_err: &str) -> ClientResult<Vec<u8>> {
        let response = self.authed(self.client.get(self.url(path))).send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, content_type.as_deref(), &body, default_err));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// multipart 上传：file 部分 + courseId 文本部分。
    /// 这里不能手动设置 JSON Content-Type，multipart 边界由 reqwest 自动生成。
    pub async fn upload_pdf(
        &self,
        file: &Path,
        course_id: i64,
        default_err: &str,
    ) -> ClientResult<()> {
        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.pdf")
            .to_string();
        let bytes = tokio::fs::read(file).await?;
        info!("上传 PDF: {} ({} 字节)", file_name, bytes.len());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("courseId", course_id.to_string());

        self.dispatch(
            self.client.post(self.url("/pdf/upload")).multipart(form),
            default_err,
        )
        .await
        .map(|_| ())
    }
}

/// 响应解释：JSON 错误体优先取 message 字段，缺省用调用方给的默认文案；
/// 非 JSON 用原始文本。成功状态直接放行。
pub fn interpret(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
    default_err: &str,
) -> ClientResult<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(rejection(status, content_type, body, default_err))
}

fn rejection(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
    default_err: &str,
) -> ClientError {
    let is_json = content_type
        .map(|value| value.contains("application/json"))
        .unwrap_or(false);

    let message = if is_json {
        extract_message(body).unwrap_or_else(|| default_err.to_string())
    } else if !body.trim().is_empty() {
        body.trim().to_string()
    } else {
        default_err.to_string()
    };

    ClientError::Rejected {
        status: status.as_u16(),
        message,
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|message| message.as_str())
        .map(|message| message.to_string())
}

fn parse_json<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_passes_through() {
        assert!(interpret(StatusCode::OK, Some("application/json"), "[]", "fail").is_ok());
        assert!(interpret(StatusCode::CREATED, None, "", "fail").is_ok());
    }

    #[test]
    fn json_error_prefers_message_field() {
        let err = interpret(
            StatusCode::UNAUTHORIZED,
            Some("application/json;charset=UTF-8"),
            r#"{"message":"Bad credentials"}"#,
            "Login failed",
        )
        .unwrap_err();
        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn json_error_without_message_uses_default() {
        let err = interpret(
            StatusCode::BAD_REQUEST,
            Some("application/json"),
            r#"{"timestamp":"2024-01-01"}"#,
            "Login failed",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
    }

    #[test]
    fn text_error_uses_raw_body() {
        let err = interpret(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some("text/plain"),
            "boom",
            "Operation failed",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn empty_text_error_uses_default() {
        let err = interpret(StatusCode::NOT_FOUND, None, "  ", "Operation failed").unwrap_err();
        assert_eq!(err.to_string(), "Operation failed");
    }

    #[test]
    fn rejected_401_is_token_rejection() {
        let err = interpret(
            StatusCode::UNAUTHORIZED,
            Some("application/json"),
            "{}",
            "fail",
        )
        .unwrap_err();
        assert!(err.is_token_rejected());

        let err = interpret(StatusCode::FORBIDDEN, None, "", "fail").unwrap_err();
        assert!(!err.is_token_rejected());
    }

    #[test]
    fn parse_json_failure_is_distinct_from_rejection() {
        let result = parse_json::<Vec<i64>>("not json");
        assert!(matches!(result, Err(ClientError::Parse(_))));
    }
}
