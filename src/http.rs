//! Jira / Confluence 客户端共用的 HTTP 细节

use crate::error::{GanttError, HttpError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// 单次请求超时
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| GanttError::Other(format!("Failed to create HTTP client: {}", e)))
}

/// 拼接 REST 路径，兼容 base url 末尾带或不带 `/`
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// 发送请求并把 2xx 响应体解析为 `T`
pub(crate) async fn send_json<T: DeserializeOwned>(
    builder: RequestBuilder,
) -> std::result::Result<T, HttpError> {
    let response = builder.send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(HttpError::ApiError { status, message });
    }

    let body = response
        .json::<T>()
        .await
        .map_err(|e| HttpError::InvalidResponse(e.to_string()))?;

    debug!("HTTP 响应解析完成");
    Ok(body)
}
