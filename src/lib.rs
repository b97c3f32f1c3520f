pub mod builder;
pub mod display;
pub mod rolling;
pub mod table;
pub mod types;

// Re-exports for library users
pub use builder::{build_columns, ColumnBuilder};
pub use display::display_table;
pub use table::Table;
pub use types::{ColumnGroupConfig, ColumnSpec, Limit, Mode, PARALLEL_THRESHOLD};
