//! AkShare 数据目录服务
//!
//! 将股票、期货、债券、基金、指数、宏观等公开金融数据接口
//! 整理为统一表格，以 RESTful API 形式提供
//! 数据来源：东方财富、新浪财经、100ppi、99期货网、交易所官网等

mod config; // 配置
mod handlers; // HTTP 请求处理器
mod middleware; // 中间件
mod models; // 数据模型定义
mod services; // 数据接口
mod utils; // HTTP 客户端、缓存、解析工具

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::time::Duration;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::utils::HttpClient;

/// 应用程序入口
///
/// 加载配置后启动 HTTP 服务器，默认监听 0.0.0.0:8080
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load();

    // RUST_LOG 优先，其次使用配置文件中的级别
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    if config.api.api_key.is_empty() {
        log::warn!("未配置 API Key，所有接口无需认证");
    }

    let client = HttpClient::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let client = web::Data::new(client);

    // 定期清理过期缓存
    if let Some(cache) = client.cache().cloned() {
        let period = config.cache.ttl().max(Duration::from_secs(60));
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(period);
            loop {
                interval.tick().await;
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    log::debug!("清理过期缓存 {} 条", purged);
                }
            }
        });
    }

    let bind_addr = config.bind_addr();
    log::info!(
        "启动 AkShare 数据目录服务 {}，缓存: {}",
        bind_addr,
        if config.cache.enabled { "开启" } else { "关闭" }
    );

    let api_key = config.api.api_key.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(client.clone())
            .wrap(ApiKeyMiddleware::new(api_key.clone())) // API Key 认证
            .wrap(Logger::default()) // 请求日志
            .configure(handlers::config)
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
