//! 指数数据服务
//!
//! - 新浪财经：沪深重要指数实时行情
//! - 东方财富：指数历史行情
//! - 中证指数公司：指数成分股

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::models::DataTable;
use crate::services::eastmoney::{fetch_kline, kline_table, period_to_klt, EM_KLINE_URL};
use crate::services::sina::{fetch_node_data, SINA_MARKET_CENTER_URL};
use crate::utils::parse::parse_excel;
use crate::utils::{HttpClient, RequestSpec};

const CSINDEX_CONS_URL: &str =
    "https://oss-ch.csindex.com.cn/static/html/csindex/public/uploads/file/autofile/cons";

const SPOT_RENAME: [(&str, &str); 11] = [
    ("symbol", "代码"),
    ("name", "名称"),
    ("trade", "最新价"),
    ("pricechange", "涨跌额"),
    ("changepercent", "涨跌幅"),
    ("settlement", "昨收"),
    ("open", "今开"),
    ("high", "最高"),
    ("low", "最低"),
    ("volume", "成交量"),
    ("amount", "成交额"),
];

const CONS_COLUMNS: [&str; 9] = [
    "日期",
    "指数代码",
    "指数名称",
    "指数英文名称",
    "成分券代码",
    "成分券名称",
    "成分券英文名称",
    "交易所",
    "交易所英文名称",
];

/// 新浪财经-沪深重要指数实时行情
/// 对应 akshare 的 stock_zh_index_spot_sina() 函数
pub async fn stock_zh_index_spot_sina(client: &HttpClient) -> Result<DataTable> {
    let records = fetch_node_data(client, SINA_MARKET_CENTER_URL, "hs_s").await?;
    Ok(parse_index_spot(&records))
}

fn parse_index_spot(records: &[Value]) -> DataTable {
    let keys: Vec<&str> = SPOT_RENAME.iter().map(|(k, _)| *k).collect();
    let numeric: Vec<&str> = SPOT_RENAME.iter().skip(2).map(|(_, v)| *v).collect();

    DataTable::from_records(records, &keys)
        .rename(&SPOT_RENAME)
        .to_numeric(&numeric)
}

/// 指数代码转东方财富 secid
///
/// sh/sz 前缀优先；否则 399 开头为深证，其余为上证
pub fn index_secid(symbol: &str) -> String {
    let lower = symbol.trim().to_lowercase();
    if let Some(code) = lower.strip_prefix("sh") {
        return format!("1.{}", code);
    }
    if let Some(code) = lower.strip_prefix("sz") {
        return format!("0.{}", code);
    }
    if lower.starts_with("399") {
        format!("0.{}", lower)
    } else {
        format!("1.{}", lower)
    }
}

/// 东方财富-指数历史行情
/// 对应 akshare 的 index_zh_a_hist() 函数
///
/// symbol: 000300 / sh000300 / sz399001；period: daily / weekly / monthly
pub async fn index_zh_a_hist(
    client: &HttpClient,
    symbol: &str,
    period: &str,
    start_date: &str,
    end_date: &str,
) -> Result<DataTable> {
    let klt = period_to_klt(period)?;
    let secid = index_secid(symbol);

    let rows = fetch_kline(client, EM_KLINE_URL, &secid, klt, "0", start_date, end_date).await?;
    Ok(kline_table(rows))
}

/// 中证指数-指数成分股
/// 对应 akshare 的 index_stock_cons_csindex() 函数
///
/// symbol: 指数代码，如 "000300"
pub async fn index_stock_cons_csindex(client: &HttpClient, symbol: &str) -> Result<DataTable> {
    let url = format!("{}/{}cons.xls", CSINDEX_CONS_URL, symbol);
    log::info!("请求中证指数成分股 URL: {}", url);

    let bytes = client.send(&RequestSpec::get(url)).await?;
    let rows = parse_excel(&bytes)?;
    parse_cons(rows)
}

/// 首行为中英文表头，其后每行一只成分券
fn parse_cons(rows: Vec<Vec<Value>>) -> Result<DataTable> {
    let mut iter = rows.into_iter();
    let header = iter.next().ok_or_else(|| anyhow!("成分股文件为空"))?;
    if header.len() < CONS_COLUMNS.len() {
        return Err(anyhow!(
            "成分股文件列数不足: 期望{}列，实际{}列",
            CONS_COLUMNS.len(),
            header.len()
        ));
    }

    let mut table = DataTable::new(&CONS_COLUMNS);
    for row in iter {
        if row.iter().all(Value::is_null) {
            continue;
        }
        table.push_row(row);
    }

    Ok(table
        .to_date(&["日期"])
        .zfill("指数代码", 6)
        .zfill("成分券代码", 6))
}
