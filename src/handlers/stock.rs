//! 股票接口处理器
//!
//! - GET /stock/zh_a_spot_em - 东方财富 A 股实时行情
//! - GET /stock/zh_a_hist/{symbol} - 东方财富 A 股历史行情
//! - GET /stock/zh_a_spot - 新浪 A 股实时行情
//! - GET /stock/realtime?symbols=sh600000,sz000001 - 新浪单只股票实时行情
//! - GET /stock/daily/{symbol}?limit=30 - 新浪日K线

use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, DataTable, HistQuery, LimitQuery, SymbolsQuery};
use crate::services::stock;
use crate::utils::HttpClient;

pub(crate) const DEFAULT_START_DATE: &str = "19700101";
pub(crate) const DEFAULT_END_DATE: &str = "20500101";
const DEFAULT_DAILY_LIMIT: usize = 30;

pub async fn zh_a_spot_em(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(stock::stock_zh_a_spot_em(&client).await))
}

/// GET /stock/zh_a_hist/{symbol}?period=daily&start_date=20240101&end_date=20241231&adjust=qfq
pub async fn zh_a_hist(
    client: web::Data<HttpClient>,
    path: web::Path<String>,
    query: web::Query<HistQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let result = stock::stock_zh_a_hist(
        &client,
        &symbol,
        query.period.as_deref().unwrap_or("daily"),
        query.start_date.as_deref().unwrap_or(DEFAULT_START_DATE),
        query.end_date.as_deref().unwrap_or(DEFAULT_END_DATE),
        query.adjust.as_deref().unwrap_or(""),
    )
    .await;
    Ok(ApiResponse::respond(result))
}

pub async fn zh_a_spot(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(stock::stock_zh_a_spot(&client).await))
}

pub async fn realtime(
    client: web::Data<HttpClient>,
    query: web::Query<SymbolsQuery>,
) -> Result<HttpResponse> {
    let symbols = query.list();
    if symbols.is_empty() {
        return Ok(ApiResponse::<DataTable>::bad_request("symbols 不能为空"));
    }
    Ok(ApiResponse::respond(
        stock::stock_zh_a_realtime_sina(&client, &symbols).await,
    ))
}

pub async fn daily(
    client: web::Data<HttpClient>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_DAILY_LIMIT);
    Ok(ApiResponse::respond(
        stock::stock_zh_a_daily_sina(&client, &symbol, limit).await,
    ))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stock")
            .route("/zh_a_spot_em", web::get().to(zh_a_spot_em))
            .route("/zh_a_hist/{symbol}", web::get().to(zh_a_hist))
            .route("/zh_a_spot", web::get().to(zh_a_spot))
            .route("/realtime", web::get().to(realtime))
            .route("/daily/{symbol}", web::get().to(daily)),
    );
}
