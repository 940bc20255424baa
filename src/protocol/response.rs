use bincode::{Decode, Encode};

/// Raw cells of one returned row, positionally aligned with the result's
/// column descriptors. A zero-length cell carries no value.
pub type RawRow = Vec<Vec<u8>>;

/// Name and declared type of one output column.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub type_tag: String,
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub enum CqlResult {
    /// The statement completed without producing anything.
    Void,
    /// The statement reported an affected-row count.
    Count(u64),
    /// The statement produced a result set; cells stay wire-encoded here.
    Rows { columns: Vec<Column>, rows: Vec<RawRow> },
}

#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub enum Response {
    Ok,
    Version(String),
    Result(CqlResult),
    Err { code: ErrorCode, message: String },
}

/// Failure classes a node reports alongside its message.
#[derive(Debug, Clone, Copy, Encode, Decode, PartialEq, Eq)]
pub enum ErrorCode {
    Authentication,
    InvalidQuery,
    Unavailable,
    Internal,
}
