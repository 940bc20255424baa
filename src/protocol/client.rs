use std::io::{Read, Write};

use crate::error::Error;

use super::{
    request::Request,
    response::{CqlResult, ErrorCode, Response},
    transport::{FramedTransport, TransportError},
};

/// Blocking stub for the remote procedures a node exposes.
///
/// Every call writes one request frame and reads one response frame; there
/// is no pipelining. Remote `Err` responses are classified into driver
/// error kinds here so the layers above never see wire error codes.
pub struct RpcClient<T: Read + Write> {
    transport: FramedTransport<T>,
}

impl<T: Read + Write> RpcClient<T> {
    pub fn new(stream: T) -> Self {
        Self {
            transport: FramedTransport::new(stream),
        }
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), Error> {
        let req = Request::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.call(req)? {
            Response::Ok => Ok(()),
            other => Err(unexpected("login", &other)),
        }
    }

    pub fn describe_version(&mut self) -> Result<String, Error> {
        match self.call(Request::DescribeVersion)? {
            Response::Version(version) => Ok(version),
            other => Err(unexpected("describe_version", &other)),
        }
    }

    pub fn set_cql_version(&mut self, version: &str) -> Result<(), Error> {
        match self.call(Request::SetCqlVersion(version.to_string()))? {
            Response::Ok => Ok(()),
            other => Err(unexpected("set_cql_version", &other)),
        }
    }

    pub fn execute(&mut self, query: &[u8]) -> Result<CqlResult, Error> {
        match self.call(Request::Query(query.to_vec()))? {
            Response::Result(result) => Ok(result),
            other => Err(unexpected("execute", &other)),
        }
    }

    fn call(&mut self, req: Request) -> Result<Response, Error> {
        self.transport.write_request(req)?;
        let resp = self.transport.read_response()?;
        if let Response::Err { code, message } = resp {
            return Err(remote_error(code, message));
        }
        Ok(resp)
    }
}

/// Classifies a failure reported by the remote node.
fn remote_error(code: ErrorCode, message: String) -> Error {
    match code {
        ErrorCode::Authentication => Error::Authentication(message),
        ErrorCode::InvalidQuery => Error::Programming(format!("bad request: {message}")),
        ErrorCode::Unavailable | ErrorCode::Internal => Error::Server(message),
    }
}

fn unexpected(procedure: &str, resp: &Response) -> Error {
    Error::Transport(TransportError::Unexpected(format!(
        "{procedure} got {resp:?}"
    )))
}
