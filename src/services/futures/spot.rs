//! 现货价格及基差数据
//!
//! 数据来源: https://www.100ppi.com/sf/

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::common::{chinese_to_english, extract_contract_month, SPOT_PRICE_URL};
use crate::models::DataTable;
use crate::utils::parse::{clean_cell, clean_number, parse_html_tables};
use crate::utils::{HttpClient, RequestSpec};

const SPOT_COLUMNS: [&str; 11] = [
    "date",
    "symbol",
    "spot_price",
    "near_contract",
    "near_contract_price",
    "dominant_contract",
    "dominant_contract_price",
    "near_basis",
    "dom_basis",
    "near_basis_rate",
    "dom_basis_rate",
];

/// 期货现货价格及基差
/// 对应 akshare 的 futures_spot_price() 函数
///
/// date: 交易日期 YYYYMMDD；vars: 品种代码过滤，None 为全部
pub async fn futures_spot_price(
    client: &HttpClient,
    date: &str,
    vars: Option<&[String]>,
) -> Result<DataTable> {
    let day = format_day(date)?;
    let url = format!("{}/day-{}.html", SPOT_PRICE_URL, day);
    log::info!("请求现货价格数据 URL: {}", url);

    let spec = RequestSpec::get(url).header(
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    );
    let html = client.text(&spec).await?;
    parse_spot_price(&html, date, vars)
}

/// `YYYYMMDD` -> `YYYY-MM-DD`
fn format_day(date: &str) -> Result<String> {
    if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("日期格式应为 YYYYMMDD: {}", date));
    }
    Ok(format!("{}-{}-{}", &date[0..4], &date[4..6], &date[6..8]))
}

/// 解析 #fdata 表格
///
/// 列: 商品, 现货价格, 最近合约代码, 最近合约价格, 最近合约基差, 基差率, ..., 主力合约代码, 主力合约价格, ...
fn parse_spot_price(html: &str, date: &str, vars: Option<&[String]>) -> Result<DataTable> {
    let tables = parse_html_tables(html, "table#fdata")?;
    let rows = tables
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("未找到数据表格(#fdata)，可能是非交易日"))?;

    let mut table = DataTable::new(&SPOT_COLUMNS);

    for cells in rows {
        if cells.len() < 10 {
            continue;
        }

        let name = clean_cell(&cells[0]);
        if name.is_empty() || name == "商品" || name.contains("交易所") {
            continue;
        }

        let Some(symbol) = chinese_to_english(&name) else {
            log::debug!("跳过未知品种: {}", name);
            continue;
        };

        if let Some(vars) = vars {
            if !vars.iter().any(|v| v.eq_ignore_ascii_case(symbol)) {
                continue;
            }
        }

        let spot_price = match clean_number(&cells[1]) {
            Some(p) if p != 0.0 => p,
            _ => continue,
        };

        let near_price = clean_number(&cells[3]);
        let dominant_price = clean_number(&cells[8]);

        let near_contract = format!(
            "{}{}",
            symbol.to_lowercase(),
            extract_contract_month(&cells[2])
        );
        let dominant_contract = format!(
            "{}{}",
            symbol.to_lowercase(),
            extract_contract_month(&cells[7])
        );

        let basis = |price: Option<f64>| price.map(|p| p - spot_price);
        let basis_rate = |price: Option<f64>| price.map(|p| p / spot_price - 1.0);

        table.push_row(vec![
            Value::String(date.to_string()),
            Value::String(symbol.to_string()),
            number(Some(spot_price)),
            Value::String(near_contract),
            number(near_price),
            Value::String(dominant_contract),
            number(dominant_price),
            number(basis(near_price)),
            number(basis(dominant_price)),
            number(basis_rate(near_price)),
            number(basis_rate(dominant_price)),
        ]);
    }

    log::info!("解析到 {} 条现货价格数据", table.len());
    Ok(table)
}

fn number(v: Option<f64>) -> Value {
    v.and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
