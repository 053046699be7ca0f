//! An in-memory stand-in for a relational database connection: schema
//! definitions are mirrored, executed statements are logged, and every
//! read comes back deterministically empty.

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod error;
pub mod schema;
pub mod types;

pub use adapter::{EmptyResult, EntryPoint, NullDbAdapter, Statement};
pub use config::{NullDbConfig, SchemaProtocol};
pub use error::{Error, Result};

#[macro_export]
macro_rules! fmt_err {
    ($($arg:tt)*) => {
        format!("[{}:{}] {}", file!(), line!(), format_args!($($arg)*))
    };
}
