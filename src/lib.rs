pub mod build;
pub mod dictionary;
pub mod error;
pub mod expr;
pub mod merge;
pub mod normalizer;
pub mod query;
pub mod search;
pub mod spimi;
pub mod universe;

pub use build::build_index;
pub use error::{IndexError, QueryError};
pub use expr::Expr;
pub use search::run_search;
