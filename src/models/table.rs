//! 表格数据模型
//!
//! 所有数据接口的统一返回结构：列名 + 行数据。
//! 整理步骤（重命名、选列、数值/日期转换）失败时一律置为 null，不报错。

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Asia::Shanghai;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::utils::parse::clean_number;

/// 通用表格
///
/// 每一行的单元格数与列数保持一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// 从 JSON 对象列表按给定键顺序取值，缺失的键为 null
    pub fn from_records<S: AsRef<str>>(records: &[Value], keys: &[S]) -> Self {
        let mut table = Self::new(keys);
        for record in records {
            let row = keys
                .iter()
                .map(|k| record.get(k.as_ref()).cloned().unwrap_or(Value::Null))
                .collect();
            table.push_row(row);
        }
        table
    }

    /// 从字符串矩阵构建，空字符串为 null
    pub fn from_rows<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<String>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(
                row.into_iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            Value::Null
                        } else {
                            Value::String(cell)
                        }
                    })
                    .collect(),
            );
        }
        table
    }

    /// 追加一行，单元格数不足补 null，多余截断
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// 列重命名，不存在的列忽略
    pub fn rename(mut self, mapping: &[(&str, &str)]) -> Self {
        for (from, to) in mapping {
            if let Some(idx) = self.column_index(from) {
                self.columns[idx] = to.to_string();
            }
        }
        self
    }

    /// 在指定位置插入一列，所有行填充同一个值
    pub fn insert_column(mut self, index: usize, name: &str, fill: Value) -> Self {
        let index = index.min(self.columns.len());
        self.columns.insert(index, name.to_string());
        for row in &mut self.rows {
            row.insert(index, fill.clone());
        }
        self
    }

    /// 在首列插入从 1 开始的序号
    pub fn insert_index(mut self, name: &str) -> Self {
        self.columns.insert(0, name.to_string());
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.insert(0, Value::from(i as u64 + 1));
        }
        self
    }

    /// 转为数值，无法解析的置为 null
    pub fn to_numeric(mut self, names: &[&str]) -> Self {
        for name in names {
            if let Some(idx) = self.column_index(name) {
                for row in &mut self.rows {
                    row[idx] = coerce_number(&row[idx]);
                }
            }
        }
        self
    }

    /// 转为 `YYYY-MM-DD` 日期字符串，无法解析的置为 null
    pub fn to_date(mut self, names: &[&str]) -> Self {
        for name in names {
            if let Some(idx) = self.column_index(name) {
                for row in &mut self.rows {
                    row[idx] = coerce_date(&row[idx])
                        .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                        .unwrap_or(Value::Null);
                }
            }
        }
        self
    }

    /// 代码列左侧补零，数字形式的代码先转为整数字符串
    pub fn zfill(mut self, name: &str, width: usize) -> Self {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                let raw = match &row[idx] {
                    Value::String(s) => s.trim().to_string(),
                    Value::Number(n) => match n.as_f64() {
                        Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
                        _ => n.to_string(),
                    },
                    _ => continue,
                };
                row[idx] = Value::String(format!("{:0>width$}", raw, width = width));
            }
        }
        self
    }

    /// 按列排序，null 排在最后
    pub fn sort_by(mut self, name: &str, ascending: bool) -> Self {
        if let Some(idx) = self.column_index(name) {
            self.rows
                .sort_by(|a, b| compare_values(&a[idx], &b[idx], ascending));
        }
        self
    }

    /// 保留最后 n 行
    pub fn tail(mut self, n: usize) -> Self {
        if self.rows.len() > n {
            self.rows.drain(..self.rows.len() - n);
        }
        self
    }
}

fn compare_values(a: &Value, b: &Value, ascending: bool) -> Ordering {
    let ord = match (a, b) {
        (Value::Null, Value::Null) => return Ordering::Equal,
        (Value::Null, _) => return Ordering::Greater,
        (_, Value::Null) => return Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    };
    if ascending {
        ord
    } else {
        ord.reverse()
    }
}

/// 数值转换
pub fn coerce_number(value: &Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => value.clone(),
            _ => Value::Null,
        },
        Value::String(s) => clean_number(s)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Value::Bool(b) => Value::from(if *b { 1 } else { 0 }),
        _ => Value::Null,
    }
}

/// 日期转换
///
/// 支持日期字符串、毫秒时间戳（按北京时间）、Excel 序列日期和 YYYYMMDD 整数
pub fn coerce_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => {
            let f = n.as_f64()?;
            date_from_number(f)
        }
        _ => None,
    }
}

fn date_from_number(f: f64) -> Option<NaiveDate> {
    if !f.is_finite() || f <= 0.0 {
        return None;
    }
    // 毫秒时间戳只识别 1e11（1973-03-03）及以后，更早的返回 None
    if f >= 1e11 {
        let dt = Shanghai.timestamp_millis_opt(f as i64).single()?;
        return Some(dt.date_naive());
    }
    if (19000101.0..=21001231.0).contains(&f) && f.fract() == 0.0 {
        return NaiveDate::parse_from_str(&format!("{}", f as i64), "%Y%m%d").ok();
    }
    if (1.0..=2958465.0).contains(&f) {
        // Excel 序列日期，1899-12-30 为第 0 天
        let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        return base.checked_add_signed(Duration::days(f.trunc() as i64));
    }
    None
}

/// 解析常见日期字符串
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%Y年%m月%d日"];
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if s.len() == 13 && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<f64>().ok().and_then(date_from_number);
    }
    if s.len() > 10 && s.is_char_boundary(10) {
        return NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DataTable {
        let records = vec![
            json!({"f12": "600000", "f14": "浦发银行", "f2": 10.5, "f3": "-"}),
            json!({"f12": "000001", "f14": "平安银行", "f2": "11.2", "f3": "1.5"}),
            json!({"f12": "300750", "f14": "宁德时代"}),
        ];
        DataTable::from_records(&records, &["f12", "f14", "f2", "f3"])
    }

    #[test]
    fn test_from_records_fills_missing() {
        let table = sample();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns, vec!["f12", "f14", "f2", "f3"]);
        assert_eq!(table.rows[2][2], Value::Null);
    }

    #[test]
    fn test_rename_numeric() {
        let table = sample()
            .rename(&[("f12", "代码"), ("f14", "名称"), ("f2", "最新价"), ("f3", "涨跌幅"), ("nope", "x")])
            .to_numeric(&["最新价", "涨跌幅"]);

        assert_eq!(table.columns, vec!["代码", "名称", "最新价", "涨跌幅"]);
        assert_eq!(table.rows[0][2], json!(10.5));
        assert_eq!(table.rows[0][3], Value::Null);
        assert_eq!(table.rows[1][2], json!(11.2));
        assert_eq!(table.rows[1][3], json!(1.5));
        assert_eq!(table.rows[2][2], Value::Null);
    }

    #[test]
    fn test_push_row_keeps_width() {
        let mut table = DataTable::new(&["a", "b"]);
        table.push_row(vec![json!(1)]);
        table.push_row(vec![json!(1), json!(2), json!(3)]);
        assert!(table.rows.iter().all(|r| r.len() == 2));
        assert_eq!(table.rows[0][1], Value::Null);
    }

    #[test]
    fn test_to_date_variants() {
        let mut table = DataTable::new(&["d"]);
        for v in [
            json!("2024-01-02"),
            json!("20240102"),
            json!("2024/01/02"),
            json!("2024-01-02 15:00:00"),
            json!(1704124800000i64),
            json!(45293),
            json!(20240102),
            json!("bad"),
            Value::Null,
        ] {
            table.push_row(vec![v]);
        }
        let table = table.to_date(&["d"]);
        let values: Vec<&Value> = table.rows.iter().map(|r| &r[0]).collect();
        for v in &values[..7] {
            assert_eq!(**v, json!("2024-01-02"));
        }
        assert_eq!(*values[7], Value::Null);
        assert_eq!(*values[8], Value::Null);
    }

    #[test]
    fn test_epoch_millis_cutoff() {
        // 1e11 毫秒 = 1973-03-03 09:46:40 UTC
        assert_eq!(
            coerce_date(&json!(100_000_000_000i64)),
            NaiveDate::from_ymd_opt(1973, 3, 3)
        );
        assert_eq!(coerce_date(&json!(99_999_999_999i64)), None);
    }

    #[test]
    fn test_sort_tail() {
        let mut table = DataTable::new(&["日期", "收盘"]);
        table.push_row(vec![json!("2024-01-03"), json!(3)]);
        table.push_row(vec![json!("2024-01-01"), json!(1)]);
        table.push_row(vec![json!("2024-01-02"), json!(2)]);
        table.push_row(vec![json!("2024-01-05"), json!(5)]);

        let asc = table.clone().sort_by("日期", true);
        assert_eq!(asc.rows[0][1], json!(1));

        let desc = table.clone().sort_by("收盘", false);
        assert_eq!(desc.rows[0][1], json!(5));

        let last = table.sort_by("日期", true).tail(2);
        assert_eq!(last.rows[0][0], json!("2024-01-03"));
        assert_eq!(last.rows[1][0], json!("2024-01-05"));
    }

    #[test]
    fn test_sort_nulls_last() {
        let mut table = DataTable::new(&["v"]);
        table.push_row(vec![Value::Null]);
        table.push_row(vec![json!(2)]);
        table.push_row(vec![json!(1)]);

        let asc = table.clone().sort_by("v", true);
        assert_eq!(asc.rows[2][0], Value::Null);
        let desc = table.sort_by("v", false);
        assert_eq!(desc.rows[0][0], json!(2));
        assert_eq!(desc.rows[2][0], Value::Null);
    }

    #[test]
    fn test_zfill_and_insert() {
        let mut table = DataTable::new(&["代码"]);
        table.push_row(vec![json!(1)]);
        table.push_row(vec![json!("300")]);
        let table = table
            .zfill("代码", 6)
            .insert_index("序号")
            .insert_column(1, "市场", json!("SZ"));

        assert_eq!(table.columns, vec!["序号", "市场", "代码"]);
        assert_eq!(table.rows[0], vec![json!(1), json!("SZ"), json!("000001")]);
        assert_eq!(table.rows[1], vec![json!(2), json!("SZ"), json!("000300")]);
    }

    #[test]
    fn test_serialize_shape() {
        let mut table = DataTable::new(&["a"]);
        table.push_row(vec![json!(1)]);
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value, json!({"columns": ["a"], "data": [[1]]}));
    }

    #[test]
    fn test_from_rows_empty_is_null() {
        let table = DataTable::from_rows(&["a", "b"], vec![vec!["x".to_string(), String::new()]]);
        assert_eq!(table.rows[0], vec![json!("x"), Value::Null]);
    }
}
