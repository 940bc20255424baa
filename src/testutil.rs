//! Shared test helpers: scripted in-memory streams and a TCP mock node
//! speaking the wire protocol.
use std::io::{self, Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::protocol::{Column, CqlResult, FramedTransport, RawRow, Request, Response};
use crate::session::{ConnectOptions, Session};

/// In-memory stream: reads come from pre-scripted response frames, writes
/// land in a shared buffer the test can inspect afterwards.
pub(crate) struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
}

impl ScriptedStream {
    /// Scripts the given responses, in order, and hands back the stream plus
    /// a handle onto everything written into it.
    pub(crate) fn new(responses: &[Response]) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let mut transport = FramedTransport::new(Cursor::new(Vec::new()));
        for response in responses {
            transport
                .write_response(response.clone())
                .expect("scripting response");
        }
        let input = Cursor::new(transport.into_inner().into_inner());
        let written = Arc::new(Mutex::new(Vec::new()));
        let stream = Self {
            input,
            written: Arc::clone(&written),
        };
        (stream, written)
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Decodes the requests a driver wrote into a scripted stream.
pub(crate) fn sent_requests(bytes: &[u8]) -> Vec<Request> {
    let mut transport = FramedTransport::new(Cursor::new(bytes.to_vec()));
    let mut requests = Vec::new();
    while let Ok(request) = transport.read_request() {
        requests.push(request);
    }
    requests
}

/// Opens a session over a scripted stream. The handshake consumes one
/// version frame; `extra` responses are left for the test to consume.
pub(crate) fn scripted_session(extra: &[Response]) -> Session<ScriptedStream> {
    let mut responses = vec![Response::Version("19.36.0".to_string())];
    responses.extend_from_slice(extra);
    let (stream, _) = ScriptedStream::new(&responses);
    let opts = ConnectOptions {
        keyspace: String::new(),
        ..ConnectOptions::default()
    };
    Session::open(stream, "testhost", opts).expect("scripted handshake")
}

/// Builds a rows result from `(name, type_tag)` descriptors and raw cells.
pub(crate) fn rows_response(columns: &[(&str, &str)], rows: Vec<RawRow>) -> Response {
    Response::Result(CqlResult::Rows {
        columns: columns
            .iter()
            .map(|(name, type_tag)| Column {
                name: (*name).to_string(),
                type_tag: (*type_tag).to_string(),
            })
            .collect(),
        rows,
    })
}

/// Runs `script` against one accepted connection on an ephemeral port.
pub(crate) fn spawn_node<F, R>(script: F) -> (SocketAddr, thread::JoinHandle<R>)
where
    F: FnOnce(&mut FramedTransport<TcpStream>) -> R + Send + 'static,
    R: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock node");
    let addr = listener.local_addr().expect("mock node address");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept connection");
        let mut transport = FramedTransport::new(stream);
        script(&mut transport)
    });
    (addr, handle)
}
