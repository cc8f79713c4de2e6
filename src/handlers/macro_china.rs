//! 宏观数据接口处理器

use actix_web::{web, HttpResponse, Result};

use crate::models::ApiResponse;
use crate::services::macro_china;
use crate::utils::HttpClient;

pub async fn cpi(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(macro_china::macro_china_cpi(&client).await))
}

pub async fn gdp(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(macro_china::macro_china_gdp(&client).await))
}

pub async fn pmi(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(macro_china::macro_china_pmi(&client).await))
}

pub async fn money_supply(client: web::Data<HttpClient>) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(
        macro_china::macro_china_money_supply(&client).await,
    ))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/macro")
            .route("/cpi", web::get().to(cpi))
            .route("/gdp", web::get().to(gdp))
            .route("/pmi", web::get().to(pmi))
            .route("/money_supply", web::get().to(money_supply)),
    );
}
