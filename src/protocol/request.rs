use bincode::{Decode, Encode};

/// Remote procedures a node accepts, one variant per call.
#[derive(Debug, Clone, Encode, Decode, PartialEq, Eq)]
pub enum Request {
    Login { username: String, password: String },
    DescribeVersion,
    SetCqlVersion(String),
    Query(Vec<u8>),
}
