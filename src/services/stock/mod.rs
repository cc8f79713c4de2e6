//! 股票数据接口
//!
//! - 东方财富：沪深京 A 股实时行情、历史行情
//! - 新浪财经：A 股实时行情列表、单只股票实时行情、日K线

mod em;
mod sina;

pub use em::{stock_zh_a_hist, stock_zh_a_spot_em};
pub use sina::{stock_zh_a_daily_sina, stock_zh_a_realtime_sina, stock_zh_a_spot};
