//! 新浪财经股票接口
//!
//! 提供 A 股实时行情列表、单只股票实时行情、日K线
//! 对接 https://hq.sinajs.cn 和 https://quotes.sina.cn

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::models::DataTable;
use crate::services::sina::{fetch_hq, fetch_node_data, SINA_HQ_URL, SINA_MARKET_CENTER_URL};
use crate::utils::parse::strip_jsonp;
use crate::utils::{HttpClient, RequestSpec};

/// 新浪日K线 API
const SINA_KLINE_URL: &str =
    "https://quotes.sina.cn/cn/api/jsonp_v2.php/=/CN_MarketDataService.getKLineData";

const SPOT_RENAME: [(&str, &str); 14] = [
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
    ("ticktime", "时间戳"),
];

const REALTIME_COLUMNS: [&str; 11] = [
    "代码", "名称", "今开", "昨收", "最新价", "最高", "最低", "成交量", "成交额", "日期", "时间",
];

/// 新浪财经-沪深京 A 股实时行情
/// 对应 akshare 的 stock_zh_a_spot() 函数
pub async fn stock_zh_a_spot(client: &HttpClient) -> Result<DataTable> {
    let records = fetch_node_data(client, SINA_MARKET_CENTER_URL, "hs_a").await?;
    Ok(parse_node_spot(&records))
}

pub(crate) fn parse_node_spot(records: &[Value]) -> DataTable {
    let keys: Vec<&str> = SPOT_RENAME.iter().map(|(k, _)| *k).collect();
    DataTable::from_records(records, &keys)
        .rename(&SPOT_RENAME)
        .to_numeric(&[
            "最新价", "涨跌额", "涨跌幅", "买入", "卖出", "昨收", "今开", "最高", "最低", "成交量",
            "成交额",
        ])
}

/// 新浪财经-单只或多只股票实时行情
///
/// symbols: 带市场前缀的代码，如 ["sh600000", "sz000001"]
pub async fn stock_zh_a_realtime_sina(client: &HttpClient, symbols: &[String]) -> Result<DataTable> {
    let codes: Vec<String> = symbols.iter().map(|s| s.to_lowercase()).collect();
    let quotes = fetch_hq(client, SINA_HQ_URL, &codes).await?;
    parse_realtime(&quotes)
}

/// 解析新浪股票实时数据
///
/// 格式: var hq_str_sh600000="浦发银行,今开,昨收,最新价,最高,最低,买一,卖一,成交量,成交额,...,日期,时间,00";
fn parse_realtime(quotes: &[(String, Vec<String>)]) -> Result<DataTable> {
    let mut table = DataTable::new(&REALTIME_COLUMNS);

    for (code, fields) in quotes {
        if fields.len() < 32 {
            return Err(anyhow!("股票代码 {} 可能无效或已退市", code));
        }

        let mut row = vec![Value::String(code.clone()), Value::String(fields[0].clone())];
        row.extend([1, 2, 3, 4, 5, 8, 9].iter().map(|&i| Value::String(fields[i].clone())));
        row.push(Value::String(fields[30].clone()));
        row.push(Value::String(fields[31].clone()));
        table.push_row(row);
    }

    Ok(table
        .to_numeric(&["今开", "昨收", "最新价", "最高", "最低", "成交量", "成交额"])
        .to_date(&["日期"]))
}

/// 新浪财经-股票日K线
///
/// symbol: 带市场前缀的代码；limit: 返回最近多少个交易日
pub async fn stock_zh_a_daily_sina(client: &HttpClient, symbol: &str, limit: usize) -> Result<DataTable> {
    let spec = RequestSpec::get(SINA_KLINE_URL)
        .query("symbol", symbol.to_lowercase())
        .queries(&[("scale", "240"), ("ma", "no")])
        .query("datalen", limit)
        .header("Referer", "https://finance.sina.com.cn/");

    log::info!("请求新浪日K线 symbol={} datalen={}", symbol, limit);
    let text = client.text(&spec).await?;
    parse_daily(&text)
}

/// 格式: =([{day:"2024-01-02",open:"10.00",high:"10.50",low:"9.80",close:"10.20",volume:"123456"},...]);
fn parse_daily(text: &str) -> Result<DataTable> {
    let json = strip_jsonp(text)?;
    let records = json.as_array().cloned().unwrap_or_default();

    let table = DataTable::from_records(&records, &["day", "open", "high", "low", "close", "volume"])
        .rename(&[("day", "date")])
        .to_date(&["date"])
        .to_numeric(&["open", "high", "low", "close", "volume"]);

    log::info!("解析到 {} 条日K线数据", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse::sina_hq_fields;
    use serde_json::json;

    #[test]
    fn test_parse_realtime() {
        let mut fields = vec!["浦发银行", "6.60", "6.58", "6.62", "6.65", "6.57", "6.61", "6.62", "31234500", "206789123.000"];
        fields.extend(std::iter::repeat("0").take(20));
        fields.extend(["2024-01-02", "15:00:00", "00"]);
        let text = format!("var hq_str_sh600000=\"{}\";\n", fields.join(","));

        let table = parse_realtime(&sina_hq_fields(&text)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "代码"), Some(&json!("sh600000")));
        assert_eq!(table.cell(0, "名称"), Some(&json!("浦发银行")));
        assert_eq!(table.cell(0, "最新价"), Some(&json!(6.62)));
        assert_eq!(table.cell(0, "成交量"), Some(&json!(31234500.0)));
        assert_eq!(table.cell(0, "日期"), Some(&json!("2024-01-02")));
        assert_eq!(table.cell(0, "时间"), Some(&json!("15:00:00")));
    }

    #[test]
    fn test_parse_realtime_empty_quote() {
        let quotes = sina_hq_fields("var hq_str_sh999999=\"\";");
        let err = parse_realtime(&quotes).unwrap_err();
        assert!(err.to_string().contains("sh999999"));
    }

    #[test]
    fn test_parse_daily() {
        let text = r#"/*<script>location.href='//sina.com';</script>*/
=([{"day":"2024-01-02","open":"6.600","high":"6.650","low":"6.570","close":"6.620","volume":"31234500"},{"day":"2024-01-03","open":"6.620","high":"6.630","low":"6.550","close":"6.590","volume":"29876500"}]);"#;
        let table = parse_daily(text).unwrap();
        assert_eq!(table.columns, vec!["date", "open", "high", "low", "close", "volume"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "close"), Some(&json!(6.59)));
    }

    #[test]
    fn test_parse_node_spot() {
        let records = vec![json!({
            "symbol": "sh600000", "code": "600000", "name": "浦发银行", "trade": "6.620",
            "pricechange": 0.04, "changepercent": 0.608, "buy": "6.610", "sell": "6.620",
            "settlement": "6.580", "open": "6.600", "high": "6.650", "low": "6.570",
            "volume": 31234500, "amount": 206789123, "ticktime": "15:00:00"
        })];
        let table = parse_node_spot(&records);
        assert_eq!(table.columns.len(), 14);
        assert_eq!(table.cell(0, "代码"), Some(&json!("sh600000")));
        assert_eq!(table.cell(0, "最新价"), Some(&json!(6.62)));
        assert_eq!(table.cell(0, "涨跌额"), Some(&json!(0.04)));
        assert_eq!(table.cell(0, "时间戳"), Some(&json!("15:00:00")));
    }
}
