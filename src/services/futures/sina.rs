//! 新浪期货行情：实时行情与日K线

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::common::{
    format_realtime_code, strip_realtime_prefix, SINA_FUTURES_DAILY_API,
};
use crate::models::DataTable;
use crate::services::sina::{fetch_hq, SINA_HQ_URL};
use crate::utils::parse::strip_jsonp;
use crate::utils::{HttpClient, RequestSpec};

const REALTIME_COLUMNS: [&str; 11] = [
    "代码", "名称", "最新价", "涨跌额", "涨跌幅", "开盘价", "最高价", "最低价", "昨日结算价", "持仓量", "成交量",
];

/// 商品期货字段位置：名称, 开盘, 最高, 最低, 最新价, 昨结算, 持仓量, 成交量
const NF_LAYOUT: FieldLayout = FieldLayout {
    name: Some(0),
    open: 2,
    high: 3,
    low: 4,
    price: 8,
    prev_settlement: 10,
    open_interest: 13,
    volume: 14,
};

/// 中金所字段位置，名称在第 49 个字段
const CFF_LAYOUT: FieldLayout = FieldLayout {
    name: Some(49),
    open: 0,
    high: 1,
    low: 2,
    price: 3,
    prev_settlement: 14,
    open_interest: 6,
    volume: 4,
};

struct FieldLayout {
    name: Option<usize>,
    open: usize,
    high: usize,
    low: usize,
    price: usize,
    prev_settlement: usize,
    open_interest: usize,
    volume: usize,
}

impl FieldLayout {
    fn min_len(&self) -> usize {
        [
            self.open,
            self.high,
            self.low,
            self.price,
            self.prev_settlement,
            self.open_interest,
            self.volume,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// 新浪财经-国内期货实时行情
/// 对应 akshare 的 futures_zh_realtime() 函数
///
/// symbols: 合约代码，如 ["RB2505", "IF2412"]，中金所品种自动加 `CFF_` 前缀
pub async fn futures_zh_realtime(client: &HttpClient, symbols: &[String]) -> Result<DataTable> {
    let codes: Vec<String> = symbols.iter().map(|s| format_realtime_code(s)).collect();
    let quotes = fetch_hq(client, SINA_HQ_URL, &codes).await?;
    parse_realtime(&quotes)
}

fn parse_realtime(quotes: &[(String, Vec<String>)]) -> Result<DataTable> {
    let mut table = DataTable::new(&REALTIME_COLUMNS);

    for (code, fields) in quotes {
        let layout = if code.starts_with("CFF_") {
            &CFF_LAYOUT
        } else {
            &NF_LAYOUT
        };
        if fields.len() < layout.min_len() {
            return Err(anyhow!("期货合约 {} 无行情数据，可能代码无效或已到期", code));
        }

        let symbol = strip_realtime_prefix(code).to_string();
        let name = layout
            .name
            .and_then(|i| fields.get(i))
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| symbol.clone());

        let number = |i: usize| fields[i].trim().parse::<f64>().ok();
        let price = number(layout.price);
        let prev_settlement = number(layout.prev_settlement);

        let (change, change_percent) = match (price, prev_settlement) {
            (Some(p), Some(s)) if s != 0.0 => (Some(p - s), Some((p - s) / s * 100.0)),
            (Some(p), Some(s)) => (Some(p - s), None),
            _ => (None, None),
        };

        let to_value = |v: Option<f64>| {
            v.and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        };

        table.push_row(vec![
            Value::String(symbol),
            Value::String(name),
            to_value(price),
            to_value(change),
            to_value(change_percent),
            to_value(number(layout.open)),
            to_value(number(layout.high)),
            to_value(number(layout.low)),
            to_value(prev_settlement),
            to_value(number(layout.open_interest)),
            to_value(number(layout.volume)),
        ]);
    }

    log::info!("解析到 {} 条期货实时行情", table.len());
    Ok(table)
}

/// 新浪财经-期货日K线
/// 对应 akshare 的 futures_zh_daily_sina() 函数
///
/// symbol: 合约代码，如 "RB2505"，主力连续合约如 "RB0"
pub async fn futures_zh_daily_sina(client: &HttpClient, symbol: &str) -> Result<DataTable> {
    let spec = RequestSpec::get(SINA_FUTURES_DAILY_API)
        .query("symbol", symbol.to_uppercase())
        .header("Referer", "https://finance.sina.com.cn/");

    log::info!("请求期货日K线 symbol={}", symbol);
    let text = client.text(&spec).await?;
    parse_daily(&text)
}

/// 解析日K线
///
/// 格式: var _temp=([{"d":"2024-01-02","o":"3900","h":"3950","l":"3880","c":"3920","v":"123456","p":"654321","s":"3910"},...]);
fn parse_daily(text: &str) -> Result<DataTable> {
    let json = strip_jsonp(text)?;
    let records = match json {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => return Err(anyhow!("无效的日K线数据: {}", other)),
    };

    Ok(DataTable::from_records(&records, &["d", "o", "h", "l", "c", "v", "p", "s"])
        .rename(&[
            ("d", "date"),
            ("o", "open"),
            ("h", "high"),
            ("l", "low"),
            ("c", "close"),
            ("v", "volume"),
            ("p", "hold"),
            ("s", "settle"),
        ])
        .to_date(&["date"])
        .to_numeric(&["open", "high", "low", "close", "volume", "hold", "settle"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse::sina_hq_fields;
    use serde_json::json;

    #[test]
    fn test_parse_realtime_commodity() {
        let text = "var hq_str_nf_RB2505=\"螺纹钢2505,225959,3300.000,3320.000,3290.000,0.000,3305.000,3306.000,3310.000,0.000,3280.000,12,34,1500000.000,800000,沪,螺纹钢,2024-12-20,1,,,,,,,,,3301.500,0.000,0,0.000,0,0.000,0,0.000,0,0.000,0,0.000,0,0.000,0,0.000,0\";";
        let table = parse_realtime(&sina_hq_fields(text)).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "代码"), Some(&json!("RB2505")));
        assert_eq!(table.cell(0, "名称"), Some(&json!("螺纹钢2505")));
        assert_eq!(table.cell(0, "最新价"), Some(&json!(3310.0)));
        assert_eq!(table.cell(0, "昨日结算价"), Some(&json!(3280.0)));
        assert_eq!(table.cell(0, "涨跌额"), Some(&json!(30.0)));
        assert_eq!(table.cell(0, "持仓量"), Some(&json!(1500000.0)));
        assert_eq!(table.cell(0, "成交量"), Some(&json!(800000.0)));
    }

    #[test]
    fn test_parse_realtime_cffex_without_name() {
        let mut fields = vec!["3900.0", "3950.0", "3880.0", "3920.0", "80000", "9.4e10", "200000"];
        fields.extend(std::iter::repeat("0").take(7));
        fields.push("3900.0");
        let text = format!("var hq_str_CFF_IF2412=\"{}\";", fields.join(","));

        let table = parse_realtime(&sina_hq_fields(&text)).unwrap();
        assert_eq!(table.cell(0, "代码"), Some(&json!("IF2412")));
        assert_eq!(table.cell(0, "名称"), Some(&json!("IF2412")));
        assert_eq!(table.cell(0, "最新价"), Some(&json!(3920.0)));
        assert_eq!(table.cell(0, "昨日结算价"), Some(&json!(3900.0)));
        assert_eq!(table.cell(0, "持仓量"), Some(&json!(200000.0)));
    }

    #[test]
    fn test_parse_realtime_empty_quote() {
        let err = parse_realtime(&sina_hq_fields("var hq_str_nf_XX9999=\"\";")).unwrap_err();
        assert!(err.to_string().contains("nf_XX9999"));
    }

    #[test]
    fn test_parse_daily() {
        let text = r#"var _temp=([{"d":"2024-01-02","o":"3900","h":"3950","l":"3880","c":"3920","v":"123456","p":"654321","s":"3910"}]);"#;
        let table = parse_daily(text).unwrap();

        assert_eq!(
            table.columns,
            vec!["date", "open", "high", "low", "close", "volume", "hold", "settle"]
        );
        assert_eq!(table.cell(0, "date"), Some(&json!("2024-01-02")));
        assert_eq!(table.cell(0, "hold"), Some(&json!(654321.0)));
        assert_eq!(table.cell(0, "settle"), Some(&json!(3910.0)));
    }

    #[test]
    fn test_parse_daily_null() {
        let table = parse_daily("var _temp=(null);").unwrap();
        assert!(table.is_empty());
    }
}
