//! 东方财富公共接口
//!
//! 行情列表（clist）、K线（kline）和数据中心（datacenter）三类接口
//! 被股票、基金、指数、宏观等多个模块共用，这里只负责分页拉取原始记录。

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::models::DataTable;
use crate::utils::{HttpClient, RequestSpec};

/// 行情列表 API
pub const EM_CLIST_URL: &str = "https://82.push2.eastmoney.com/api/qt/clist/get";
/// 历史K线 API
pub const EM_KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
/// 数据中心 API
pub const EM_DATACENTER_URL: &str = "https://datacenter-web.eastmoney.com/api/data/v1/get";

const CLIST_PAGE_SIZE: usize = 100;
const DATACENTER_PAGE_SIZE: usize = 500;

/// K线列名（f51 ~ f61）
pub const KLINE_COLUMNS: [&str; 11] = [
    "日期", "开盘", "收盘", "最高", "最低", "成交量", "成交额", "振幅", "涨跌幅", "涨跌额", "换手率",
];

/// 分页拉取行情列表，返回 `data.diff` 中的全部记录
///
/// fs: 市场过滤条件，如 "m:0 t:6,m:1 t:2"
pub async fn fetch_clist(
    client: &HttpClient,
    base_url: &str,
    fs: &str,
    fields: &str,
) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let spec = RequestSpec::get(base_url)
            .query("pn", page)
            .query("pz", CLIST_PAGE_SIZE)
            .queries(&[
                ("po", "1"),
                ("np", "1"),
                ("ut", "bd1d9ddb04089700cf9c27f6f7426281"),
                ("fltt", "2"),
                ("invt", "2"),
                ("fid", "f3"),
                ("fs", fs),
                ("fields", fields),
            ])
            .no_cache();

        log::info!("请求东方财富行情列表 第{}页: {}", page, base_url);
        let json = client.json(&spec).await?;

        let data = &json["data"];
        let diff = match data["diff"].as_array() {
            Some(diff) if !diff.is_empty() => diff,
            _ => break,
        };
        records.extend(diff.iter().cloned());

        let total = data["total"].as_u64().unwrap_or(0) as usize;
        if records.len() >= total || diff.len() < CLIST_PAGE_SIZE {
            break;
        }
        page += 1;
    }

    log::info!("东方财富行情列表共 {} 条", records.len());
    Ok(records)
}

/// 周期转 klt 参数
pub fn period_to_klt(period: &str) -> Result<&'static str> {
    match period {
        "daily" => Ok("101"),
        "weekly" => Ok("102"),
        "monthly" => Ok("103"),
        other => Err(anyhow!("无效的周期参数: {}，可选: daily/weekly/monthly", other)),
    }
}

/// 复权方式转 fqt 参数
pub fn adjust_to_fqt(adjust: &str) -> Result<&'static str> {
    match adjust {
        "" => Ok("0"),
        "qfq" => Ok("1"),
        "hfq" => Ok("2"),
        other => Err(anyhow!("无效的复权参数: {}，可选: 空/qfq/hfq", other)),
    }
}

/// 拉取K线，返回按逗号拆分后的原始字段
pub async fn fetch_kline(
    client: &HttpClient,
    base_url: &str,
    secid: &str,
    klt: &str,
    fqt: &str,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<Vec<String>>> {
    let spec = RequestSpec::get(base_url).queries(&[
        ("fields1", "f1,f2,f3,f4,f5,f6"),
        ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61"),
        ("ut", "7eea3edcaed734bea9cbfc24409ed989"),
        ("klt", klt),
        ("fqt", fqt),
        ("secid", secid),
        ("beg", start_date),
        ("end", end_date),
    ]);

    log::info!("请求东方财富K线 secid={} klt={} fqt={}", secid, klt, fqt);
    let json = client.json(&spec).await?;
    Ok(parse_klines(&json))
}

/// 解析 `data.klines`，data 为 null 时返回空
pub fn parse_klines(json: &Value) -> Vec<Vec<String>> {
    json["data"]["klines"]
        .as_array()
        .map(|lines| {
            lines
                .iter()
                .filter_map(|line| line.as_str())
                .map(|line| line.split(',').map(|s| s.to_string()).collect())
                .collect()
        })
        .unwrap_or_default()
}

/// K线原始字段整理为表格
pub fn kline_table(rows: Vec<Vec<String>>) -> DataTable {
    DataTable::from_rows(&KLINE_COLUMNS, rows)
        .to_date(&["日期"])
        .to_numeric(&KLINE_COLUMNS[1..])
}

/// 分页拉取数据中心报表，`result` 为 null 时视为无数据
pub async fn fetch_datacenter(
    client: &HttpClient,
    base_url: &str,
    report_name: &str,
    sort_column: &str,
    filter: Option<&str>,
) -> Result<Vec<Value>> {
    let mut records = Vec::new();
    let mut page = 1u64;

    loop {
        let mut spec = RequestSpec::get(base_url)
            .query("reportName", report_name)
            .query("columns", "ALL")
            .query("pageNumber", page)
            .query("pageSize", DATACENTER_PAGE_SIZE)
            .query("sortColumns", sort_column)
            .queries(&[("sortTypes", "-1"), ("source", "WEB"), ("client", "WEB")]);
        if let Some(filter) = filter {
            spec = spec.query("filter", filter);
        }

        log::info!("请求东方财富数据中心 {} 第{}页", report_name, page);
        let json = client.json(&spec).await?;

        let result = &json["result"];
        if result.is_null() {
            break;
        }
        if let Some(data) = result["data"].as_array() {
            records.extend(data.iter().cloned());
        }

        let pages = result["pages"].as_u64().unwrap_or(1);
        if page >= pages {
            break;
        }
        page += 1;
    }

    log::info!("{} 共 {} 条记录", report_name, records.len());
    Ok(records)
}
