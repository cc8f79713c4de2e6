//! 期货仓单日报

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::common::CZCE_STATIC_URL;
use crate::models::DataTable;
use crate::utils::parse::parse_excel;
use crate::utils::{HttpClient, RequestSpec};

const CZCE_COLUMNS: [&str; 5] = ["品种", "仓库简称", "仓单数量", "有效预报", "增减"];

/// 郑商所自该日起改用 xlsx 格式
const CZCE_XLSX_SINCE: u32 = 20251101;

/// 郑州商品交易所-交易数据-仓单日报
/// 对应 akshare 的 futures_warehouse_receipt_czce() 函数
/// 数据来源: http://www.czce.com.cn/cn/jysj/cdrb/H770310index_1.htm
///
/// date: 交易日期，格式 YYYYMMDD
pub async fn futures_warehouse_receipt_czce(client: &HttpClient, date: &str) -> Result<DataTable> {
    let url = czce_receipt_url(date)?;
    log::info!("请求郑商所仓单日报 URL: {}", url);

    let bytes = client
        .send(&RequestSpec::get(url))
        .await
        .map_err(|e| anyhow!("获取郑商所仓单日报失败，可能是非交易日: {}", e))?;
    let rows = parse_excel(&bytes)?;
    let table = parse_czce_receipt(&rows);

    log::info!("解析到 {} 条郑商所仓单数据", table.len());
    Ok(table)
}

fn czce_receipt_url(date: &str) -> Result<String> {
    let date_num: u32 = date
        .parse()
        .ok()
        .filter(|_| date.len() == 8)
        .ok_or_else(|| anyhow!("日期格式应为 YYYYMMDD: {}", date))?;

    let ext = if date_num > CZCE_XLSX_SINCE { "xlsx" } else { "xls" };
    Ok(format!(
        "{}/{}/{}/FutureDataWhsheet.{}",
        CZCE_STATIC_URL,
        &date[0..4],
        date,
        ext
    ))
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 从 "品种：白糖SR  单位：张" 中提取品种代码
fn extract_letters(s: &str) -> String {
    let head = s.split("单位").next().unwrap_or(s);
    head.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase()
}

/// 各列在表头中的位置，找不到时按 (简称, 仓单数量, 有效预报, 增减) = (0, 1, 2, 3)
fn locate_columns(header: &[String]) -> [usize; 4] {
    let find = |keys: &[&str], fallback: usize| {
        header
            .iter()
            .position(|h| keys.iter().any(|k| h.contains(k)))
            .unwrap_or(fallback)
    };
    [
        find(&["简称"], 0),
        find(&["仓单数量"], 1),
        find(&["有效预报"], 2),
        find(&["增减"], 3),
    ]
}

/// 解析仓单日报工作表
///
/// 工作表由多个品种块组成，每块以 "品种" 开头，下一行为表头，其后为各仓库数据
fn parse_czce_receipt(rows: &[Vec<Value>]) -> DataTable {
    let text_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let mut starts: Vec<usize> = text_rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.first().is_some_and(|c| c.starts_with("品种")))
        .map(|(i, _)| i)
        .collect();
    starts.push(text_rows.len());

    let mut table = DataTable::new(&CZCE_COLUMNS);

    for window in starts.windows(2) {
        let (start, end) = (window[0], window[1]);
        let symbol = extract_letters(&text_rows[start][0]);
        if symbol.is_empty() {
            continue;
        }

        let Some(header_idx) = (start + 1..end).find(|&i| {
            text_rows[i]
                .iter()
                .any(|c| c.contains("仓库") || c.contains("简称"))
        }) else {
            continue;
        };
        let [name_col, receipt_col, forecast_col, change_col] =
            locate_columns(&text_rows[header_idx]);

        for i in header_idx + 1..end {
            let row = &text_rows[i];
            let warehouse = row.get(name_col).cloned().unwrap_or_default();
            if warehouse.is_empty()
                || row.iter().take(2).any(|c| c.contains("合计") || c.contains("小计") || c.contains("总计"))
            {
                continue;
            }

            let value = |col: usize| rows[i].get(col).cloned().unwrap_or(Value::Null);
            table.push_row(vec![
                Value::String(symbol.clone()),
                Value::String(warehouse),
                value(receipt_col),
                value(forecast_col),
                value(change_col),
            ]);
        }
    }

    table
        .to_numeric(&["仓单数量", "有效预报", "增减"])
        .sort_by("品种", true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_czce_receipt_url_switches_to_xlsx() {
        assert_eq!(
            czce_receipt_url("20241220").unwrap(),
            "http://www.czce.com.cn/cn/DFSStaticFiles/Future/2024/20241220/FutureDataWhsheet.xls"
        );
        assert!(czce_receipt_url("20251103").unwrap().ends_with(".xlsx"));
        assert!(czce_receipt_url("20251101").unwrap().ends_with(".xls"));
        assert!(czce_receipt_url("2024-12-20").is_err());
    }

    #[test]
    fn test_extract_letters() {
        assert_eq!(extract_letters("品种：白糖SR     单位：张"), "SR");
    }

    #[test]
    fn test_parse_czce_receipt() {
        let rows = vec![
            vec![json!("郑州商品交易所仓单日报"), Value::Null, Value::Null, Value::Null],
            vec![json!("品种：棉花CF     单位：张"), Value::Null, Value::Null, Value::Null],
            vec![json!("仓库简称"), json!("仓单数量"), json!("有效预报"), json!("当日增减")],
            vec![json!("中储棉"), json!(1200.0), json!(30.0), json!(-5.0)],
            vec![json!("新疆库"), json!("800"), json!("-"), json!("10")],
            vec![json!("小计"), json!(2000.0), json!(30.0), json!(5.0)],
            vec![json!("品种：白糖SR     单位：张"), Value::Null, Value::Null, Value::Null],
            vec![json!("仓库编号"), json!("仓库简称"), json!("仓单数量"), json!("当日增减"), json!("有效预报")],
            vec![json!("0101"), json!("中粮"), json!(500.0), json!(0.0), json!(12.0)],
            vec![json!("合计"), Value::Null, json!(500.0), json!(0.0), json!(12.0)],
        ];

        let table = parse_czce_receipt(&rows);
        assert_eq!(table.columns, CZCE_COLUMNS);
        assert_eq!(table.len(), 3);

        assert_eq!(table.cell(0, "品种"), Some(&json!("CF")));
        assert_eq!(table.cell(0, "仓库简称"), Some(&json!("中储棉")));
        assert_eq!(table.cell(0, "增减"), Some(&json!(-5.0)));
        assert_eq!(table.cell(1, "有效预报"), Some(&Value::Null));
        assert_eq!(table.cell(1, "仓单数量"), Some(&json!(800.0)));

        assert_eq!(table.cell(2, "品种"), Some(&json!("SR")));
        assert_eq!(table.cell(2, "仓库简称"), Some(&json!("中粮")));
        assert_eq!(table.cell(2, "有效预报"), Some(&json!(12.0)));
        assert_eq!(table.cell(2, "增减"), Some(&json!(0.0)));
    }
}
