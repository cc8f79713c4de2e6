//! 期货数据服务
//!
//! ## 数据来源
//! - 新浪财经：实时行情、日K线
//! - 100ppi：现货价格及基差
//! - 99期货网：库存数据
//! - 郑州商品交易所：仓单日报
//! - 大连商品交易所：持仓排名

mod common;
mod inventory;
mod position_rank;
mod sina;
mod spot;
mod warehouse;

pub use inventory::futures_inventory_99;
pub use position_rank::futures_dce_position_rank;
pub use sina::{futures_zh_daily_sina, futures_zh_realtime};
pub use spot::futures_spot_price;
pub use warehouse::futures_warehouse_receipt_czce;
