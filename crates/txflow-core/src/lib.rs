pub mod dot;
pub mod error;
pub mod esplora;
pub mod fetch;
pub mod flow;
pub mod graph;
pub mod ids;
pub mod labels;
pub mod records;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::{ApiError, CoreError};
pub use types::{IdEntry, TxInput, TxOutput, TxRecord};
