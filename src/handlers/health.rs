use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::models::ApiResponse;
use crate::utils::HttpClient;

pub async fn health_check() -> Result<HttpResponse> {
    let response = ApiResponse::success("Service is healthy");
    Ok(HttpResponse::Ok().json(response))
}

/// 清空响应缓存
///
/// DELETE /api/v1/cache
pub async fn clear_cache(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    let cleared = match client.cache() {
        Some(cache) => cache.clear().await,
        None => 0,
    };
    log::info!("清空响应缓存 {} 条", cleared);
    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({ "cleared": cleared }))))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/cache", web::delete().to(clear_cache));
}
