//! 响应解析辅助函数
//!
//! 各数据源返回的格式五花八门：JSONP 回调、JS 变量赋值、GBK 文本、
//! HTML 表格、Excel 文件、ZIP 压缩包。这里只负责把它们还原成
//! JSON 值或字符串矩阵，列名和类型由各接口自行整理。

use anyhow::{anyhow, Result};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::io::{Cursor, Read};

/// GBK/GB2312 解码
pub fn decode_gbk(bytes: &[u8]) -> String {
    encoding_rs::GBK.decode(bytes).0.into_owned()
}

/// UTF-8 优先，失败时按 GBK 解码
pub fn decode_auto(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => decode_gbk(bytes),
    }
}

/// 去掉 JSONP 回调包装，返回括号内的 JSON
///
/// `cb([{...}]);` / `var _temp=([...]);` / `/*<script>*/=([...])`
pub fn strip_jsonp(text: &str) -> Result<Value> {
    let start = text.find('(').ok_or_else(|| anyhow!("无效的JSONP数据"))?;
    let end = text.rfind(')').ok_or_else(|| anyhow!("无效的JSONP数据"))?;
    if end <= start {
        return Err(anyhow!("无效的JSONP数据"));
    }

    let inner = text[start + 1..end].trim();
    if inner.is_empty() || inner == "null" {
        return Ok(Value::Null);
    }
    serde_json::from_str(inner).map_err(|e| anyhow!("解析JSONP失败: {}", e))
}

/// 提取 `var name = <json>;` 中的 JSON 字面量
pub fn extract_js_var(text: &str, name: &str) -> Result<Value> {
    let pattern = format!(r"var\s+{}\s*=\s*", regex::escape(name));
    let re = Regex::new(&pattern)?;
    let m = re
        .find(text)
        .ok_or_else(|| anyhow!("未找到JS变量 {}", name))?;

    let literal =
        take_json_literal(&text[m.end()..]).ok_or_else(|| anyhow!("JS变量 {} 格式无效", name))?;

    serde_json::from_str(literal).map_err(|e| anyhow!("解析JS变量 {} 失败: {}", name, e))
}

/// 截取开头的一个完整 JSON 字面量（对象、数组、字符串或标量）
fn take_json_literal(text: &str) -> Option<&str> {
    let text = text.trim_start();
    let first = text.chars().next()?;

    if first != '[' && first != '{' {
        let end = text.find(';').unwrap_or(text.len());
        return Some(text[..end].trim());
    }

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// 解析新浪行情接口 `var hq_str_<code>="f0,f1,...";`
///
/// 返回 (代码, 字段列表)，空数据的代码也会返回，字段为空
pub fn sina_hq_fields(text: &str) -> Vec<(String, Vec<String>)> {
    let mut result = Vec::new();

    for line in text.split(';') {
        let line = line.trim();
        let Some(rest) = line.strip_prefix("var hq_str_") else {
            continue;
        };
        let Some((code, value)) = rest.split_once('=') else {
            continue;
        };

        let value = value.trim().trim_matches('"');
        let fields = if value.is_empty() {
            Vec::new()
        } else {
            value.split(',').map(|s| s.trim().to_string()).collect()
        };
        result.push((code.trim().to_string(), fields));
    }

    result
}

/// 解析 HTML 中指定表格的所有行
///
/// 每行为单元格文本列表（th 与 td），去除不间断空格
pub fn parse_html_tables(html: &str, table_selector: &str) -> Result<Vec<Vec<Vec<String>>>> {
    let document = Html::parse_document(html);
    let table_sel =
        Selector::parse(table_selector).map_err(|e| anyhow!("无效的选择器 {}: {:?}", table_selector, e))?;
    let tr_sel = Selector::parse("tr").map_err(|e| anyhow!("{:?}", e))?;
    let cell_sel = Selector::parse("th, td").map_err(|e| anyhow!("{:?}", e))?;

    let tables = document
        .select(&table_sel)
        .map(|table| {
            table
                .select(&tr_sel)
                .map(|row| {
                    row.select(&cell_sel)
                        .map(|cell| clean_cell(&cell.text().collect::<String>()))
                        .collect::<Vec<_>>()
                })
                .filter(|row| !row.is_empty())
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(tables)
}

/// 清理单元格文本
pub fn clean_cell(s: &str) -> String {
    s.replace('\u{a0}', " ").trim().to_string()
}

/// 读取 Excel（xls/xlsx 自动识别）第一个工作表
///
/// 数值单元格保持为数字，其余转为字符串，空单元格为 null
pub fn parse_excel(bytes: &[u8]) -> Result<Vec<Vec<Value>>> {
    use calamine::{open_workbook_auto_from_rs, Data, Reader};

    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| anyhow!("打开Excel文件失败: {}", e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| anyhow!("Excel文件没有工作表"))?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| anyhow!("读取工作表失败: {}", e))?;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => Value::Null,
                    Data::Float(f) => serde_json::Number::from_f64(*f)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                    Data::Int(i) => Value::from(*i),
                    Data::Bool(b) => Value::Bool(*b),
                    Data::String(s) => Value::String(s.trim().to_string()),
                    Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64())
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                    other => Value::String(other.to_string()),
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

/// 读取 ZIP 压缩包中的所有文件
pub fn read_zip_entries(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let cursor = Cursor::new(bytes);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| anyhow!("打开ZIP文件失败: {}", e))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| anyhow!("读取ZIP文件失败: {}", e))?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        entries.push((name, content));
    }

    Ok(entries)
}

/// 解析数字，去除千分位、百分号和空白，"-" 等占位符返回 None
pub fn clean_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != '\u{a0}' && !c.is_whitespace())
        .collect();

    match cleaned.as_str() {
        "" | "-" | "--" | "—" | "None" | "none" | "nan" | "NaN" | "null" => None,
        s => s.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_jsonp() {
        let text = r#"/*<script>location.href='//sina.com';</script>*/
var _temp=([{"d":"2024-01-02","o":"100"}]);"#;
        let value = strip_jsonp(text).unwrap();
        assert_eq!(value[0]["d"], "2024-01-02");

        assert_eq!(strip_jsonp("cb(null)").unwrap(), Value::Null);
        assert!(strip_jsonp("no callback here").is_err());
    }

    #[test]
    fn test_extract_js_var_array() {
        let text = r#"var r = [["000001","HXCZHH","华夏成长混合","混合型-灵活","HUAXIACHENGZHANGHUNHE"]];"#;
        let value = extract_js_var(text, "r").unwrap();
        assert_eq!(value[0][2], "华夏成长混合");
    }

    #[test]
    fn test_extract_js_var_among_others() {
        let text = r#"var fS_name = "华夏成长混合";var fS_code = "000001";
var Data_netWorthTrend = [{"x":1704124800000,"y":1.05,"equityReturn":0.5,"unitMoney":""}];
var Data_ACWorthTrend = [[1704124800000,3.2]];"#;

        assert_eq!(extract_js_var(text, "fS_code").unwrap(), "000001");
        let trend = extract_js_var(text, "Data_netWorthTrend").unwrap();
        assert_eq!(trend[0]["y"], 1.05);
        let ac = extract_js_var(text, "Data_ACWorthTrend").unwrap();
        assert_eq!(ac[0][1], 3.2);
        assert!(extract_js_var(text, "Data_missing").is_err());
    }

    #[test]
    fn test_extract_js_var_string_with_brackets() {
        let text = r#"var x = [{"name":"a]b;c"}];"#;
        let value = extract_js_var(text, "x").unwrap();
        assert_eq!(value[0]["name"], "a]b;c");
    }

    #[test]
    fn test_sina_hq_fields() {
        let text = "var hq_str_sh600000=\"浦发银行,10.00,9.90,10.10\";\nvar hq_str_sz000000=\"\";\n";
        let parsed = sina_hq_fields(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, "sh600000");
        assert_eq!(parsed[0].1[0], "浦发银行");
        assert_eq!(parsed[0].1.len(), 4);
        assert_eq!(parsed[1].0, "sz000000");
        assert!(parsed[1].1.is_empty());
    }

    #[test]
    fn test_parse_html_tables() {
        let html = r#"<html><body>
<table id="fdata">
  <tr><th>商品</th><th>现货价格</th></tr>
  <tr><td>&nbsp;铜&nbsp;</td><td>75,000</td></tr>
</table>
<table><tr><td>other</td></tr></table>
</body></html>"#;
        let tables = parse_html_tables(html, "table#fdata").unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][0], vec!["商品", "现货价格"]);
        assert_eq!(tables[0][1], vec!["铜", "75,000"]);
    }

    #[test]
    fn test_decode_gbk() {
        let (encoded, _, _) = encoding_rs::GBK.encode("浦发银行");
        assert_eq!(decode_gbk(&encoded), "浦发银行");
        assert_eq!(decode_auto(&encoded), "浦发银行");
        assert_eq!(decode_auto("abc".as_bytes()), "abc");
    }

    #[test]
    fn test_read_zip_entries() {
        use std::io::Write;

        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::FileOptions::default();
            writer.start_file("20240102_a2405.txt", options).unwrap();
            writer.write_all("名次\t会员简称".as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let entries = read_zip_entries(&buf).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "20240102_a2405.txt");
        assert_eq!(decode_auto(&entries[0].1), "名次\t会员简称");
    }

    #[test]
    fn test_parse_excel_rejects_garbage() {
        assert!(parse_excel(b"not an excel file").is_err());
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number("1,234.5"), Some(1234.5));
        assert_eq!(clean_number(" 3.2% "), Some(3.2));
        assert_eq!(clean_number("-1.5"), Some(-1.5));
        assert_eq!(clean_number("-"), None);
        assert_eq!(clean_number("--"), None);
        assert_eq!(clean_number(""), None);
        assert_eq!(clean_number("abc"), None);
        assert_eq!(clean_number("nan"), None);
    }
}
