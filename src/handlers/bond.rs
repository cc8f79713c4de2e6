//! 债券接口处理器

use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, StartDateQuery};
use crate::services::bond;
use crate::utils::HttpClient;

const DEFAULT_US_RATE_START: &str = "19901219";

pub async fn zh_hs_spot(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(bond::bond_zh_hs_spot(&client).await))
}

/// GET /bond/zh_us_rate?start_date=20200101
pub async fn zh_us_rate(
    client: web::Data<HttpClient>,
    query: web::Query<StartDateQuery>,
) -> Result<HttpResponse> {
    let start_date = query.start_date.as_deref().unwrap_or(DEFAULT_US_RATE_START);
    Ok(ApiResponse::respond(
        bond::bond_zh_us_rate(&client, start_date).await,
    ))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bond")
            .route("/zh_hs_spot", web::get().to(zh_hs_spot))
            .route("/zh_us_rate", web::get().to(zh_us_rate)),
    );
}
