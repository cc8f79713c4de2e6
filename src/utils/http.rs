//! 带重试与缓存的 HTTP 客户端
//!
//! 所有数据接口共用一个 `HttpClient`：
//! - 失败时按指数退避加随机抖动重试（网络错误、5xx、429）
//! - 成功的可缓存请求写入响应缓存，有效期内不再访问上游

use rand::Rng;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::cache::ResponseCache;
use super::error::FetchError;
use crate::config::AppConfig;

/// 请求体
#[derive(Debug, Clone)]
pub enum RequestBody {
    None,
    Json(Value),
    Form(Vec<(String, String)>),
}

/// 一次上游请求的描述
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// 是否允许读写缓存
    pub cacheable: bool,
}

impl RequestSpec {
    /// GET 请求，默认可缓存
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::None,
            cacheable: true,
        }
    }

    /// POST 请求，默认不缓存
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            cacheable: false,
            ..Self::get(url)
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn queries(mut self, pairs: &[(&str, &str)]) -> Self {
        self.query
            .extend(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, pairs: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// 实时行情等数据不走缓存
    pub fn no_cache(mut self) -> Self {
        self.cacheable = false;
        self
    }

    /// 允许缓存 POST 请求
    pub fn cached(mut self) -> Self {
        self.cacheable = true;
        self
    }

    fn body_bytes(&self) -> Option<Vec<u8>> {
        match &self.body {
            RequestBody::None => None,
            RequestBody::Json(v) => Some(v.to_string().into_bytes()),
            RequestBody::Form(pairs) => Some(
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish()
                    .into_bytes(),
            ),
        }
    }

    fn cache_key(&self) -> String {
        ResponseCache::key(
            self.method.as_str(),
            &self.url,
            &self.query,
            self.body_bytes().as_deref(),
        )
    }
}

/// 重试策略
///
/// 第 n 次失败（从 0 开始）后等待 `base_delay * 2^n + U(jitter.0, jitter.1)`
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次请求）
    pub max_retries: u32,
    pub base_delay: Duration,
    pub jitter: (Duration, Duration),
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, jitter: (Duration, Duration)) -> Self {
        let (lo, hi) = jitter;
        Self {
            max_retries: max_retries.max(1),
            base_delay,
            jitter: if lo <= hi { (lo, hi) } else { (hi, lo) },
        }
    }

    /// 不等待的策略，测试用
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO, (Duration::ZERO, Duration::ZERO))
    }

    /// 第 `attempt` 次失败后的等待时间
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let backoff = self.base_delay.saturating_mul(factor);

        let lo = self.jitter.0.as_millis() as u64;
        let hi = self.jitter.1.as_millis() as u64;
        let jitter_ms = if hi > lo {
            rand::thread_rng().gen_range(lo..=hi)
        } else {
            lo
        };

        backoff.saturating_add(Duration::from_millis(jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            3,
            Duration::from_secs(1),
            (Duration::from_millis(500), Duration::from_millis(1500)),
        )
    }
}

/// 共享的上游 HTTP 客户端
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
    cache: Option<Arc<ResponseCache>>,
}

impl HttpClient {
    /// 按应用配置构建客户端
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .connect_timeout(Duration::from_secs(config.api.connect_timeout_secs))
            .cookie_store(true)
            .gzip(true)
            // 部分交易所站点证书链不完整
            .danger_accept_invalid_certs(true)
            .build()?;

        let cache = if config.cache.enabled {
            Some(Arc::new(ResponseCache::new(
                config.cache.ttl(),
                config.cache.max_entries,
            )))
        } else {
            None
        };

        Ok(Self {
            client,
            policy: config.http.retry_policy(),
            cache,
        })
    }

    /// 使用指定重试策略、不带缓存的客户端
    pub fn new(policy: RetryPolicy) -> anyhow::Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            policy,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    /// 发送请求：先查缓存，未命中则带重试请求上游并写入缓存
    pub async fn send(&self, spec: &RequestSpec) -> Result<Vec<u8>, FetchError> {
        let cache = self.cache.as_ref().filter(|_| spec.cacheable);

        let key = match cache {
            Some(cache) => {
                let key = spec.cache_key();
                if let Some(body) = cache.get(&key).await {
                    log::debug!("缓存命中: {}", key);
                    return Ok(body);
                }
                log::debug!("缓存未命中: {}", key);
                Some(key)
            }
            None => None,
        };

        let body = self.request_with_retry(spec).await?;

        if let (Some(cache), Some(key)) = (cache, key) {
            cache.insert(key, body.clone()).await;
        }

        Ok(body)
    }

    /// 带指数退避与随机抖动的请求
    ///
    /// 不可重试的错误（如 4xx）立即返回；尝试次数用尽后返回 `RetriesExhausted`
    pub async fn request_with_retry(&self, spec: &RequestSpec) -> Result<Vec<u8>, FetchError> {
        let attempts = self.policy.max_retries;
        let mut last_error = None;

        for attempt in 0..attempts {
            match self.execute_once(spec).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    log::warn!(
                        "请求 {} 失败（第 {}/{} 次）: {}",
                        spec.url,
                        attempt + 1,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.policy.delay_for(attempt)).await;
                    }
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: spec.url.clone(),
            attempts,
            last: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    async fn execute_once(&self, spec: &RequestSpec) -> Result<Vec<u8>, FetchError> {
        let mut builder = self.client.request(spec.method.clone(), &spec.url);

        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        for (key, value) in &spec.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder = match &spec.body {
            RequestBody::None => builder,
            RequestBody::Json(v) => builder.json(v),
            RequestBody::Form(pairs) => builder.form(pairs),
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: spec.url.clone(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// 以 UTF-8 读取响应文本
    pub async fn text(&self, spec: &RequestSpec) -> Result<String, FetchError> {
        let body = self.send(spec).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// 以 GBK 读取响应文本（新浪等站点）
    pub async fn gbk_text(&self, spec: &RequestSpec) -> Result<String, FetchError> {
        let body = self.send(spec).await?;
        Ok(super::parse::decode_gbk(&body))
    }

    /// 解析 JSON 响应
    pub async fn json(&self, spec: &RequestSpec) -> Result<Value, FetchError> {
        let body = self.send(spec).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// 访问首页获取 Cookie，失败只记录日志
    pub async fn warm_up(&self, url: &str) {
        if let Err(e) = self.client.get(url).send().await {
            log::warn!("预访问 {} 失败: {}", url, e);
        }
    }
}
