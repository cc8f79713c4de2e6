//! 东方财富股票行情

use anyhow::Result;
use serde_json::Value;

use crate::models::DataTable;
use crate::services::eastmoney::{
    adjust_to_fqt, fetch_clist, fetch_kline, kline_table, period_to_klt, EM_CLIST_URL,
    EM_KLINE_URL,
};
use crate::utils::HttpClient;

/// 沪深京 A 股市场过滤条件
const A_SHARE_FS: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";
const SPOT_FIELDS: &str = "f2,f3,f4,f5,f6,f7,f8,f9,f10,f12,f14,f15,f16,f17,f18,f20,f21,f23";

const SPOT_RENAME: [(&str, &str); 18] = [
    ("f12", "代码"),
    ("f14", "名称"),
    ("f2", "最新价"),
    ("f3", "涨跌幅"),
    ("f4", "涨跌额"),
    ("f5", "成交量"),
    ("f6", "成交额"),
    ("f7", "振幅"),
    ("f15", "最高"),
    ("f16", "最低"),
    ("f17", "今开"),
    ("f18", "昨收"),
    ("f10", "量比"),
    ("f8", "换手率"),
    ("f9", "市盈率-动态"),
    ("f23", "市净率"),
    ("f20", "总市值"),
    ("f21", "流通市值"),
];

/// 东方财富-沪深京 A 股-实时行情
/// 对应 akshare 的 stock_zh_a_spot_em() 函数
/// 数据来源: https://quote.eastmoney.com/center/gridlist.html#hs_a_board
pub async fn stock_zh_a_spot_em(client: &HttpClient) -> Result<DataTable> {
    let records = fetch_clist(client, EM_CLIST_URL, A_SHARE_FS, SPOT_FIELDS).await?;
    Ok(parse_spot_em(&records))
}

pub(crate) fn parse_spot_em(records: &[Value]) -> DataTable {
    let keys: Vec<&str> = SPOT_RENAME.iter().map(|(k, _)| *k).collect();
    let numeric: Vec<&str> = SPOT_RENAME.iter().skip(2).map(|(_, v)| *v).collect();

    DataTable::from_records(records, &keys)
        .rename(&SPOT_RENAME)
        .to_numeric(&numeric)
        .insert_index("序号")
}

/// 股票代码转东方财富 secid
///
/// 上交所（6/9/5 开头）为 1，深交所和北交所为 0；允许 sh/sz/bj 前缀
pub fn stock_secid(symbol: &str) -> String {
    let lower = symbol.trim().to_lowercase();
    let (prefix, code) = match lower.get(..2) {
        Some(p @ ("sh" | "sz" | "bj")) => (Some(p.to_string()), lower[2..].to_string()),
        _ => (None, lower.clone()),
    };

    let market = match prefix.as_deref() {
        Some("sh") => "1",
        Some(_) => "0",
        None if code.starts_with('6') || code.starts_with('9') || code.starts_with('5') => "1",
        None => "0",
    };
    format!("{}.{}", market, code)
}

/// 东方财富-沪深京 A 股-历史行情
/// 对应 akshare 的 stock_zh_a_hist() 函数
///
/// period: daily / weekly / monthly；adjust: 空 / qfq / hfq
pub async fn stock_zh_a_hist(
    client: &HttpClient,
    symbol: &str,
    period: &str,
    start_date: &str,
    end_date: &str,
    adjust: &str,
) -> Result<DataTable> {
    let klt = period_to_klt(period)?;
    let fqt = adjust_to_fqt(adjust)?;
    let secid = stock_secid(symbol);

    let rows = fetch_kline(client, EM_KLINE_URL, &secid, klt, fqt, start_date, end_date).await?;
    let code = secid.split('.').nth(1).unwrap_or(symbol).to_string();
    Ok(with_stock_code(kline_table(rows), &code))
}

fn with_stock_code(table: DataTable, code: &str) -> DataTable {
    table.insert_column(1, "股票代码", Value::String(code.to_string()))
}
