use std::io::{self, Read, Write};

use bincode::{
    config::{BigEndian, Configuration, Fixint},
    decode_from_slice, encode_to_vec,
};
use thiserror::Error;

use super::{Request, Response};

/// Frames longer than this are treated as corruption rather than read.
pub const MAX_FRAME: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode message: {0}")]
    Serialize(#[from] bincode::error::EncodeError),
    #[error("failed to decode message: {0}")]
    Deserialize(#[from] bincode::error::DecodeError),
    #[error("transport io error: {0}")]
    Io(#[from] io::Error),
    #[error("bad frame: {0}")]
    Frame(String),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Length-prefixed message framing over any blocking byte stream.
///
/// Each message travels as a four byte big-endian payload length followed by
/// the payload itself, a single encoded [`Request`] or [`Response`]. Reads
/// block until a whole frame has arrived.
pub struct FramedTransport<T: Read + Write> {
    stream: T,
    config: Configuration<BigEndian, Fixint>,
}

impl<T: Read + Write> FramedTransport<T> {
    pub fn new(stream: T) -> Self {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();
        Self { stream, config }
    }

    /// Consumes the transport and hands back the underlying stream.
    pub fn into_inner(self) -> T {
        self.stream
    }

    pub fn write_request(&mut self, req: Request) -> Result<(), TransportError> {
        let payload = encode_to_vec(req, self.config)?;
        self.write_frame(&payload)
    }

    pub fn write_response(&mut self, resp: Response) -> Result<(), TransportError> {
        let payload = encode_to_vec(resp, self.config)?;
        self.write_frame(&payload)
    }

    pub fn read_request(&mut self) -> Result<Request, TransportError> {
        let payload = self.read_frame()?;
        self.decode_payload(&payload)
    }

    pub fn read_response(&mut self) -> Result<Response, TransportError> {
        let payload = self.read_frame()?;
        self.decode_payload(&payload)
    }

    fn decode_payload<D: bincode::Decode<()>>(&self, payload: &[u8]) -> Result<D, TransportError> {
        let (message, consumed) = decode_from_slice(payload, self.config)?;
        if consumed != payload.len() {
            return Err(TransportError::Frame(format!(
                "{} trailing byte(s) after message",
                payload.len() - consumed
            )));
        }
        Ok(message)
    }

    fn write_frame(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > MAX_FRAME {
            return Err(TransportError::Frame(format!(
                "{} byte payload exceeds frame limit",
                payload.len()
            )));
        }
        let len = payload.len() as u32;
        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(payload)?;
        self.stream.flush()?;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut header = [0_u8; 4];
        self.stream.read_exact(&mut header)?;
        let len = u32::from_be_bytes(header) as usize;
        if len > MAX_FRAME {
            return Err(TransportError::Frame(format!(
                "{len} byte payload exceeds frame limit"
            )));
        }
        let mut payload = vec![0_u8; len];
        self.stream.read_exact(&mut payload)?;
        Ok(payload)
    }
}
