//! 基金接口处理器

use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, FundInfoQuery};
use crate::services::fund;
use crate::utils::HttpClient;

pub async fn name(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(fund::fund_name_em(&client).await))
}

/// GET /fund/info/{symbol}?indicator=累计净值走势
pub async fn info(
    client: web::Data<HttpClient>,
    path: web::Path<String>,
    query: web::Query<FundInfoQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let indicator = query.indicator.as_deref().unwrap_or("单位净值走势");
    Ok(ApiResponse::respond(
        fund::fund_open_fund_info_em(&client, &symbol, indicator).await,
    ))
}

pub async fn etf_spot(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(fund::fund_etf_spot_em(&client).await))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fund")
            .route("/name", web::get().to(name))
            .route("/info/{symbol}", web::get().to(info))
            .route("/etf_spot", web::get().to(etf_spot)),
    );
}
