//! 上游请求错误

use thiserror::Error;

/// 上游请求错误
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("请求 {url} 返回状态码 {status}")]
    Status { url: String, status: u16 },

    #[error("请求 {url} 重试 {attempts} 次后仍失败: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },

    #[error("响应解码失败: {0}")]
    Decode(String),
}

impl FetchError {
    /// 是否值得重试：网络层错误、5xx、429
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => !e.is_builder() && !e.is_redirect(),
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            url: "http://example.com".to_string(),
            status: code,
        }
    }

    #[test]
    fn test_status_retryable() {
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(412).is_retryable());
    }

    #[test]
    fn test_decode_error_not_retryable() {
        assert!(!FetchError::Decode("bad".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let e = FetchError::RetriesExhausted {
            url: "http://a".into(),
            attempts: 3,
            last: "timeout".into(),
        };
        assert_eq!(e.to_string(), "请求 http://a 重试 3 次后仍失败: timeout");
    }
}
