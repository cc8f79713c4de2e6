pub mod query;
pub mod response;
pub mod table;

pub use query::*;
pub use response::*;
pub use table::DataTable;
