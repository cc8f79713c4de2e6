//! 指数接口处理器

use actix_web::{web, HttpResponse, Result};

use super::stock::{DEFAULT_END_DATE, DEFAULT_START_DATE};
use crate::models::{ApiResponse, HistQuery};
use crate::services::index;
use crate::utils::HttpClient;

pub async fn spot(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(
        index::stock_zh_index_spot_sina(&client).await,
    ))
}

/// GET /index/hist/{symbol}?period=daily&start_date=20240101&end_date=20241231
pub async fn hist(
    client: web::Data<HttpClient>,
    path: web::Path<String>,
    query: web::Query<HistQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let result = index::index_zh_a_hist(
        &client,
        &symbol,
        query.period.as_deref().unwrap_or("daily"),
        query.start_date.as_deref().unwrap_or(DEFAULT_START_DATE),
        query.end_date.as_deref().unwrap_or(DEFAULT_END_DATE),
    )
    .await;
    Ok(ApiResponse::respond(result))
}

pub async fn cons(
    client: web::Data<HttpClient>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    Ok(ApiResponse::respond(
        index::index_stock_cons_csindex(&client, &symbol).await,
    ))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/index")
            .route("/spot", web::get().to(spot))
            .route("/hist/{symbol}", web::get().to(hist))
            .route("/cons/{symbol}", web::get().to(cons)),
    );
}
