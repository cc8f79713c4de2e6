//! 债券数据服务
//!
//! - 新浪财经：沪深债券实时行情
//! - 东方财富数据中心：中美国债收益率

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::models::table::parse_date_str;
use crate::models::DataTable;
use crate::services::eastmoney::{fetch_datacenter, EM_DATACENTER_URL};
use crate::services::sina::{fetch_node_data, SINA_MARKET_CENTER_URL};
use crate::utils::HttpClient;

const HS_SPOT_RENAME: [(&str, &str); 13] = [
    ("symbol", "代码"),
    ("name", "名称"),
    ("trade", "最新价"),
    ("pricechange", "涨跌额"),
    ("changepercent", "涨跌幅"),
    ("buy", "买入"),
    ("sell", "卖出"),
    ("settlement", "昨收"),
    ("open", "今开"),
    ("high", "最高"),
    ("low", "最低"),
    ("volume", "成交量"),
    ("amount", "成交额"),
];

const US_RATE_RENAME: [(&str, &str); 11] = [
    ("SOLAR_DATE", "日期"),
    ("EMM00588704", "中国国债收益率2年"),
    ("EMM00166462", "中国国债收益率5年"),
    ("EMM00166466", "中国国债收益率10年"),
    ("EMM00166469", "中国国债收益率30年"),
    ("EMM01276014", "中国国债收益率10年-2年"),
    ("EMG00001306", "美国国债收益率2年"),
    ("EMG00001308", "美国国债收益率5年"),
    ("EMG00001310", "美国国债收益率10年"),
    ("EMG00001312", "美国国债收益率30年"),
    ("EMG01339436", "美国国债收益率10年-2年"),
];

/// 新浪财经-债券-沪深债券-实时行情
/// 对应 akshare 的 bond_zh_hs_spot() 函数
pub async fn bond_zh_hs_spot(client: &HttpClient) -> Result<DataTable> {
    let records = fetch_node_data(client, SINA_MARKET_CENTER_URL, "hs_z").await?;
    Ok(parse_hs_spot(&records))
}

fn parse_hs_spot(records: &[Value]) -> DataTable {
    let keys: Vec<&str> = HS_SPOT_RENAME.iter().map(|(k, _)| *k).collect();
    let numeric: Vec<&str> = HS_SPOT_RENAME.iter().skip(2).map(|(_, v)| *v).collect();

    DataTable::from_records(records, &keys)
        .rename(&HS_SPOT_RENAME)
        .to_numeric(&numeric)
}

/// 东方财富-中美国债收益率
/// 对应 akshare 的 bond_zh_us_rate() 函数
///
/// start_date: 起始日期 YYYYMMDD
pub async fn bond_zh_us_rate(client: &HttpClient, start_date: &str) -> Result<DataTable> {
    let start = parse_date_str(start_date)
        .ok_or_else(|| anyhow!("日期格式应为 YYYYMMDD: {}", start_date))?;
    let filter = format!("(SOLAR_DATE>='{}')", start.format("%Y-%m-%d"));

    let records = fetch_datacenter(
        client,
        EM_DATACENTER_URL,
        "RPTA_WEB_TREASURYYIELD",
        "SOLAR_DATE",
        Some(filter.as_str()),
    )
    .await?;
    Ok(parse_us_rate(&records))
}

fn parse_us_rate(records: &[Value]) -> DataTable {
    let keys: Vec<&str> = US_RATE_RENAME.iter().map(|(k, _)| *k).collect();
    let numeric: Vec<&str> = US_RATE_RENAME.iter().skip(1).map(|(_, v)| *v).collect();

    DataTable::from_records(records, &keys)
        .rename(&US_RATE_RENAME)
        .to_date(&["日期"])
        .to_numeric(&numeric)
        .sort_by("日期", true)
}
