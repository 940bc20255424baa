//! Client-node communication protocol.
//!
//! This module defines the wire protocol spoken between the driver and a
//! column-store node, including message formats, encoding strategy, and the
//! transport abstraction. It provides the types and logic required to
//! serialize, deserialize, and interpret requests and responses over the
//! network.
//!
//! # Overview
//!
//! The protocol layer is responsible for defining how statements and control
//! calls are exchanged with a node. Each remote procedure is a strict
//! request/response pair over one blocking stream; nothing is pipelined and
//! nothing arrives unsolicited.
//!
//! Result sets cross the wire with their cells still in the node's binary
//! column encoding. Decoding them into native values is deliberately kept
//! out of this layer; see [`marshal`](crate::marshal).
//!
//! # Key Components
//!
//! - [`Request`] / [`Response`]: the messages either side may send.
//! - [`FramedTransport`]: framing and codec over a bidirectional byte stream.
//! - [`RpcClient`]: typed remote procedures built on the transport.
//!
//! # Binary Format
//!
//! Protocol messages are serialized with a compact framing format:
//!
//! - Each frame begins with a four byte big-endian payload length.
//! - The payload follows, a single message encoded with fixed-width integer
//!   encoding, big-endian.
//! - A frame longer than [`MAX_FRAME`] is treated as stream corruption.
//!
//! This format allows a reader to take exactly one message at a time off a
//! long-lived connection.
mod client;
mod request;
mod response;
mod transport;

pub use client::RpcClient;
pub use request::Request;
pub use response::{Column, CqlResult, ErrorCode, RawRow, Response};
pub use transport::{FramedTransport, MAX_FRAME, TransportError};
