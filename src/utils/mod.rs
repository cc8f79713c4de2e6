//! 通用工具模块
//!
//! 上游请求（重试、缓存）与响应解析的公共实现

pub mod cache; // 响应缓存
pub mod error; // 请求错误类型
pub mod http; // 带重试的 HTTP 客户端
pub mod parse; // JSONP / JS / GBK / HTML / Excel / ZIP 解析

pub use error::FetchError;
pub use http::{HttpClient, RequestSpec};
