pub mod cli;
pub mod cursor;
pub mod error;
pub mod marshal;
pub mod protocol;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub use cli::{Command, prompt};
pub use cursor::{Cursor, Row};
pub use error::{Error, Result};
pub use marshal::{Value, WireType};
pub use protocol::{Column, CqlResult};
pub use session::{
    ConnectOptions, DEFAULT_CQL_MAJOR, DEFAULT_KEYSPACE, DEFAULT_PORT, RemoteVersion, Session,
    connect,
};
