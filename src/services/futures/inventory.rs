//! 99期货网库存数据

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use serde_json::Value;

use super::common::QH99_STOCK_URL;
use crate::models::DataTable;
use crate::utils::{HttpClient, RequestSpec};

/// 99期货网品种
#[derive(Debug, Clone, PartialEq)]
pub struct Qh99Symbol {
    pub product_id: i64,
    pub name: String,
    pub code: String,
}

/// 提取页面中 `script#__NEXT_DATA__` 的 JSON
fn next_data(html: &str) -> Result<Value> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script#__NEXT_DATA__").map_err(|e| anyhow!("无效的选择器: {:?}", e))?;

    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| anyhow!("未找到__NEXT_DATA__脚本标签"))?;

    let json_text = script.text().collect::<String>();
    serde_json::from_str(&json_text).map_err(|e| anyhow!("解析__NEXT_DATA__失败: {}", e))
}

/// 解析品种映射表
fn parse_symbol_map(html: &str) -> Result<Vec<Qh99Symbol>> {
    let json = next_data(html)?;

    let symbols = json["props"]["pageProps"]["data"]["varietyListData"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|variety| variety["productList"].as_array())
        .flatten()
        .filter_map(|product| {
            let product_id = product["productId"].as_i64().unwrap_or(0);
            let name = product["name"].as_str().unwrap_or("").trim().to_string();
            let code = product["code"].as_str().unwrap_or("").trim().to_string();
            (product_id > 0 && !name.is_empty()).then_some(Qh99Symbol {
                product_id,
                name,
                code,
            })
        })
        .collect();

    Ok(symbols)
}

/// 按品种名称或代码查找编号
fn find_product_id(symbols: &[Qh99Symbol], symbol: &str) -> Option<i64> {
    let symbol = symbol.trim();
    symbols
        .iter()
        .find(|s| s.name == symbol || s.code.eq_ignore_ascii_case(symbol))
        .map(|s| s.product_id)
}

/// 解析库存走势
///
/// 每条记录为 [日期, 收盘价, 库存]
fn parse_inventory(html: &str) -> Result<DataTable> {
    let json = next_data(html)?;
    let list = json["props"]["pageProps"]["data"]["positionTrendChartListData"]["list"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let mut table = DataTable::new(&["日期", "收盘价", "库存"]);
    for item in list {
        let Some(arr) = item.as_array() else {
            continue;
        };
        let date = arr.first().cloned().unwrap_or(Value::Null);
        if date.is_null() {
            continue;
        }
        table.push_row(vec![
            date,
            arr.get(1).cloned().unwrap_or(Value::Null),
            arr.get(2).cloned().unwrap_or(Value::Null),
        ]);
    }

    Ok(table
        .to_date(&["日期"])
        .to_numeric(&["收盘价", "库存"])
        .sort_by("日期", true))
}

/// 99期货网-大宗商品库存数据
/// 对应 akshare 的 futures_inventory_99() 函数
///
/// symbol: 品种名称（如"豆一"）或代码（如"A"）
pub async fn futures_inventory_99(client: &HttpClient, symbol: &str) -> Result<DataTable> {
    let html = client.text(&RequestSpec::get(QH99_STOCK_URL)).await?;
    let symbols = parse_symbol_map(&html)?;
    log::info!("99期货网品种映射 {} 个", symbols.len());

    let product_id = find_product_id(&symbols, symbol)
        .ok_or_else(|| anyhow!("未找到品种 {} 对应的编号", symbol))?;
    log::info!("品种 {} 对应的ID: {}", symbol, product_id);

    let spec = RequestSpec::get(QH99_STOCK_URL).query("productId", product_id);
    let html = client.text(&spec).await?;
    let table = parse_inventory(&html)?;

    log::info!("解析到 {} 条库存数据", table.len());
    Ok(table)
}
