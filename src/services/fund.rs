//! 基金数据服务
//!
//! 数据来源: 天天基金网 (fund.eastmoney.com)、东方财富行情列表

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::models::DataTable;
use crate::services::eastmoney::{fetch_clist, EM_CLIST_URL};
use crate::utils::parse::extract_js_var;
use crate::utils::{HttpClient, RequestSpec};

const FUND_NAME_URL: &str = "https://fund.eastmoney.com/js/fundcode_search.js";
const FUND_INFO_URL: &str = "https://fund.eastmoney.com/pingzhongdata";

/// ETF 板块
const ETF_FS: &str = "b:MK0021,b:MK0022,b:MK0023,b:MK0024";
const ETF_FIELDS: &str = "f2,f3,f4,f5,f6,f8,f12,f14,f15,f16,f17,f18,f20,f21";

const ETF_RENAME: [(&str, &str); 14] = [
    ("f12", "代码"),
    ("f14", "名称"),
    ("f2", "最新价"),
    ("f4", "涨跌额"),
    ("f3", "涨跌幅"),
    ("f5", "成交量"),
    ("f6", "成交额"),
    ("f17", "开盘价"),
    ("f15", "最高价"),
    ("f16", "最低价"),
    ("f18", "昨收"),
    ("f8", "换手率"),
    ("f21", "流通市值"),
    ("f20", "总市值"),
];

/// 基金净值指标
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FundIndicator {
    /// 单位净值走势
    UnitNetValue,
    /// 累计净值走势
    AccumulatedNetValue,
}

impl FundIndicator {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "单位净值走势" => Ok(Self::UnitNetValue),
            "累计净值走势" => Ok(Self::AccumulatedNetValue),
            other => Err(anyhow!(
                "无效的指标参数: {}，可选: 单位净值走势/累计净值走势",
                other
            )),
        }
    }
}

/// 天天基金网-全部基金名称
/// 对应 akshare 的 fund_name_em() 函数
pub async fn fund_name_em(client: &HttpClient) -> Result<DataTable> {
    let text = client.text(&RequestSpec::get(FUND_NAME_URL)).await?;
    parse_fund_name(&text)
}

/// 格式: var r = [["000001","HXCZHH","华夏成长混合","混合型-灵活","HUAXIACHENGZHANGHUNHE"],...];
fn parse_fund_name(text: &str) -> Result<DataTable> {
    let value = extract_js_var(text, "r")?;
    let rows: Vec<Vec<String>> = value
        .as_array()
        .ok_or_else(|| anyhow!("基金列表格式无效"))?
        .iter()
        .filter_map(|item| item.as_array())
        .map(|fields| {
            fields
                .iter()
                .map(|f| f.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .collect();

    let table = DataTable::from_rows(
        &["基金代码", "拼音缩写", "基金简称", "基金类型", "拼音全称"],
        rows,
    );
    log::info!("解析到 {} 只基金", table.len());
    Ok(table)
}

/// 天天基金网-开放式基金-历史净值
/// 对应 akshare 的 fund_open_fund_info_em() 函数
///
/// symbol: 基金代码；indicator: 单位净值走势 / 累计净值走势
pub async fn fund_open_fund_info_em(
    client: &HttpClient,
    symbol: &str,
    indicator: &str,
) -> Result<DataTable> {
    let indicator = FundIndicator::parse(indicator)?;
    let url = format!("{}/{}.js", FUND_INFO_URL, symbol);
    log::info!("请求基金净值 URL: {}", url);

    let text = client.text(&RequestSpec::get(url)).await?;
    parse_fund_info(&text, indicator)
}

fn parse_fund_info(text: &str, indicator: FundIndicator) -> Result<DataTable> {
    match indicator {
        FundIndicator::UnitNetValue => {
            // [{"x":1577808000000,"y":1.0,"equityReturn":0.0,"unitMoney":""},...]
            let trend = extract_js_var(text, "Data_netWorthTrend")?;
            let records = trend.as_array().cloned().unwrap_or_default();

            Ok(DataTable::from_records(&records, &["x", "y", "equityReturn"])
                .rename(&[("x", "净值日期"), ("y", "单位净值"), ("equityReturn", "日增长率")])
                .to_date(&["净值日期"])
                .to_numeric(&["单位净值", "日增长率"]))
        }
        FundIndicator::AccumulatedNetValue => {
            // [[1577808000000,1.0],...]
            let trend = extract_js_var(text, "Data_ACWorthTrend")?;
            let mut table = DataTable::new(&["净值日期", "累计净值"]);
            for point in trend.as_array().into_iter().flatten() {
                if let Some(pair) = point.as_array() {
                    table.push_row(vec![
                        pair.first().cloned().unwrap_or(Value::Null),
                        pair.get(1).cloned().unwrap_or(Value::Null),
                    ]);
                }
            }
            Ok(table.to_date(&["净值日期"]).to_numeric(&["累计净值"]))
        }
    }
}

/// 东方财富-ETF 实时行情
/// 对应 akshare 的 fund_etf_spot_em() 函数
pub async fn fund_etf_spot_em(client: &HttpClient) -> Result<DataTable> {
    let records = fetch_clist(client, EM_CLIST_URL, ETF_FS, ETF_FIELDS).await?;
    Ok(parse_etf_spot(&records))
}

fn parse_etf_spot(records: &[Value]) -> DataTable {
    let keys: Vec<&str> = ETF_RENAME.iter().map(|(k, _)| *k).collect();
    let numeric: Vec<&str> = ETF_RENAME.iter().skip(2).map(|(_, v)| *v).collect();

    DataTable::from_records(records, &keys)
        .rename(&ETF_RENAME)
        .to_numeric(&numeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PINGZHONG: &str = r#"/*基金或股票信息*/var fS_name = "华夏成长混合";var fS_code = "000001";
/*单位净值走势 equityReturn-净值回报 unitMoney-每份派送金*/var Data_netWorthTrend = [{"x":1704124800000,"y":1.012,"equityReturn":0.5,"unitMoney":""},{"x":1704211200000,"y":1.001,"equityReturn":-1.09,"unitMoney":""}];
/*累计净值走势*/var Data_ACWorthTrend = [[1704124800000,3.512],[1704211200000,null]];"#;

    #[test]
    fn test_fund_indicator_parse() {
        assert_eq!(FundIndicator::parse("单位净值走势").unwrap(), FundIndicator::UnitNetValue);
        assert_eq!(
            FundIndicator::parse("累计净值走势").unwrap(),
            FundIndicator::AccumulatedNetValue
        );
        assert!(FundIndicator::parse("分红送配详情").is_err());
    }

    #[test]
    fn test_parse_fund_name() {
        let text = r#"var r = [["000001","HXCZHH","华夏成长混合","混合型-灵活","HUAXIACHENGZHANGHUNHE"],["000003","ZHKZZZQA","中海可转债债券A","债券型-混合二级","ZHONGHAIKEZHUANZHAIZHAIQUANA"]];"#;
        let table = parse_fund_name(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "基金代码"), Some(&json!("000003")));
        assert_eq!(table.cell(0, "基金类型"), Some(&json!("混合型-灵活")));
    }

    #[test]
    fn test_parse_unit_net_value_dates_in_beijing_time() {
        let table = parse_fund_info(PINGZHONG, FundIndicator::UnitNetValue).unwrap();
        assert_eq!(table.columns, vec!["净值日期", "单位净值", "日增长率"]);
        // 1704124800000 = 2024-01-01T16:00:00Z = 2024-01-02 00:00 北京时间
        assert_eq!(table.cell(0, "净值日期"), Some(&json!("2024-01-02")));
        assert_eq!(table.cell(0, "单位净值"), Some(&json!(1.012)));
        assert_eq!(table.cell(1, "日增长率"), Some(&json!(-1.09)));
    }

    #[test]
    fn test_parse_accumulated_net_value() {
        let table = parse_fund_info(PINGZHONG, FundIndicator::AccumulatedNetValue).unwrap();
        assert_eq!(table.columns, vec!["净值日期", "累计净值"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "累计净值"), Some(&json!(3.512)));
        assert_eq!(table.cell(1, "累计净值"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_etf_spot() {
        let records = vec![json!({"f12": "510300", "f14": "沪深300ETF", "f2": 3.501, "f3": 0.43,
            "f4": 0.015, "f5": 5123456, "f6": 1.79e9, "f8": 0.52, "f15": 3.51, "f16": 3.48,
            "f17": 3.49, "f18": 3.486, "f20": 9.8e10, "f21": "-"})];
        let table = parse_etf_spot(&records);
        assert_eq!(table.columns.len(), 14);
        assert_eq!(table.cell(0, "开盘价"), Some(&json!(3.49)));
        assert_eq!(table.cell(0, "流通市值"), Some(&Value::Null));
    }
}
