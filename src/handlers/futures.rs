//! 期货接口处理器
//!
//! ## API 列表
//! - GET /futures/realtime?symbols=RB2505,IF2412 - 实时行情
//! - GET /futures/daily/{symbol}?limit=30 - 日K线
//! - GET /futures/spot_price?date=20241220&vars=CU,RB - 现货价格及基差
//! - GET /futures/inventory/{symbol} - 99期货网库存
//! - GET /futures/warehouse_receipt/czce?date=20241220 - 郑商所仓单日报
//! - GET /futures/position_rank/dce?date=20241220&vars=M,Y - 大商所持仓排名

use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, DataTable, DateQuery, DateVarsQuery, LimitQuery, SymbolsQuery};
use crate::services::futures;
use crate::utils::HttpClient;

/// 获取期货实时行情
///
/// GET /api/v1/futures/realtime?symbols=RB2505,IF2412
pub async fn realtime(
    client: web::Data<HttpClient>,
    query: web::Query<SymbolsQuery>,
) -> Result<HttpResponse> {
    let symbols = query.list();
    if symbols.is_empty() {
        return Ok(ApiResponse::<DataTable>::bad_request("symbols 不能为空"));
    }
    Ok(ApiResponse::respond(
        futures::futures_zh_realtime(&client, &symbols).await,
    ))
}

/// 获取日K线，limit 为空时返回全部
pub async fn daily(
    client: web::Data<HttpClient>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let result = futures::futures_zh_daily_sina(&client, &symbol)
        .await
        .map(|table| match query.limit {
            Some(n) => table.tail(n),
            None => table,
        });
    Ok(ApiResponse::respond(result))
}

pub async fn spot_price(
    client: web::Data<HttpClient>,
    query: web::Query<DateVarsQuery>,
) -> Result<HttpResponse> {
    let vars = query.vars_list();
    Ok(ApiResponse::respond(
        futures::futures_spot_price(&client, &query.date, vars.as_deref()).await,
    ))
}

/// symbol: 品种名称（如"豆一"）或代码（如"A"）
pub async fn inventory(
    client: web::Data<HttpClient>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    Ok(ApiResponse::respond(
        futures::futures_inventory_99(&client, &symbol).await,
    ))
}

pub async fn warehouse_receipt_czce(
    client: web::Data<HttpClient>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse> {
    Ok(ApiResponse::respond(
        futures::futures_warehouse_receipt_czce(&client, &query.date).await,
    ))
}

pub async fn position_rank_dce(
    client: web::Data<HttpClient>,
    query: web::Query<DateVarsQuery>,
) -> Result<HttpResponse> {
    let vars = query.vars_list();
    Ok(ApiResponse::respond(
        futures::futures_dce_position_rank(&client, &query.date, vars.as_deref()).await,
    ))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/futures")
            .route("/realtime", web::get().to(realtime))
            .route("/daily/{symbol}", web::get().to(daily))
            .route("/spot_price", web::get().to(spot_price))
            .route("/inventory/{symbol}", web::get().to(inventory))
            .route("/warehouse_receipt/czce", web::get().to(warehouse_receipt_czce))
            .route("/position_rank/dce", web::get().to(position_rank_dce)),
    );
}
