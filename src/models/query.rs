//! 接口查询参数

use serde::Deserialize;

/// 历史行情查询参数
#[derive(Debug, Default, Deserialize)]
pub struct HistQuery {
    /// 周期: daily / weekly / monthly
    pub period: Option<String>,
    /// 开始日期（YYYYMMDD）
    pub start_date: Option<String>,
    /// 结束日期（YYYYMMDD）
    pub end_date: Option<String>,
    /// 复权方式: 空 / qfq / hfq
    pub adjust: Option<String>,
}

/// 多代码查询参数，逗号分隔
#[derive(Debug, Deserialize)]
pub struct SymbolsQuery {
    pub symbols: String,
}

impl SymbolsQuery {
    pub fn list(&self) -> Vec<String> {
        split_list(&self.symbols)
    }
}

/// 按交易日查询，可选品种过滤
#[derive(Debug, Deserialize)]
pub struct DateVarsQuery {
    /// 交易日期（YYYYMMDD）
    pub date: String,
    /// 品种代码，逗号分隔，如 "CU,AL"
    pub vars: Option<String>,
}

impl DateVarsQuery {
    pub fn vars_list(&self) -> Option<Vec<String>> {
        self.vars
            .as_deref()
            .map(split_list)
            .filter(|v| !v.is_empty())
    }
}

/// 按交易日查询
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

/// 起始日期查询
#[derive(Debug, Default, Deserialize)]
pub struct StartDateQuery {
    pub start_date: Option<String>,
}

/// 返回条数限制
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// 基金净值查询参数
#[derive(Debug, Default, Deserialize)]
pub struct FundInfoQuery {
    /// 单位净值走势 / 累计净值走势
    pub indicator: Option<String>,
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
