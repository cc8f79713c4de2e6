//! 数据接口服务模块
//!
//! 每个接口拉取一个数据源并整理为 `DataTable`

pub mod bond;
pub mod eastmoney;
pub mod fund;
pub mod futures;
pub mod index;
pub mod macro_china;
pub mod sina;
pub mod stock;
