pub mod config;
pub mod error;
pub mod harness;
pub mod params;
pub mod payload;
pub mod proto;
pub mod report;
pub mod request;
pub mod reset;
pub mod runner;
pub mod schema;
pub mod store;

pub use error::{BenchError, Result};

/// Mutation driven against the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    /// Overwrite the key with a single number.
    Scalar,
    /// Push a list of `ENV_LIST_SIZE` numbers.
    ListAppend,
    /// Set one field of a map-valued key, `ENV_DKEY_CNT` fields per repetition.
    NestedField,
    /// Overwrite the key with an `ENV_BYTE_SZ`-byte string.
    ByteString,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Scalar => "scalar",
            OperationKind::ListAppend => "list_append",
            OperationKind::NestedField => "nested_field",
            OperationKind::ByteString => "byte_string",
        }
    }
}
