use std::io;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::{Request, Response};

/// Client side of one filter session, used by the one-shot CLI and the
/// test suite. The connection is the session: dropping the client ends it,
/// and with it the server-side engine.
#[derive(Debug)]
pub struct FilterClient {
    reader: BufReader<UnixStream>,
}

impl FilterClient {
    /// Open a connection, starting a fresh session on the server
    pub async fn connect(socket_path: impl AsRef<Path>) -> io::Result<Self> {
        let stream = UnixStream::connect(socket_path).await?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    /// Write one newline-framed request without waiting for the reply.
    /// Requests may be pipelined; replies come back in request order.
    pub async fn send_request(&mut self, request: &Request) -> io::Result<()> {
        let mut frame = serde_json::to_vec(request)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        frame.push(b'\n');

        let stream = self.reader.get_mut();
        stream.write_all(&frame).await?;
        stream.flush().await
    }

    /// Read the next framed response. EOF here means the server went away
    /// mid-session.
    pub async fn recv_response(&mut self) -> io::Result<Response> {
        let mut frame = String::new();
        if self.reader.read_line(&mut frame).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "session closed by server",
            ));
        }

        serde_json::from_str(frame.trim_end())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// One full exchange: send a request, wait for its response
    pub async fn call(&mut self, request: &Request) -> io::Result<Response> {
        self.send_request(request).await?;
        self.recv_response().await
    }

    /// Load a source file into this session's engine
    pub async fn init(&mut self, filename: impl Into<String>) -> io::Result<Response> {
        self.call(&Request::Init {
            filename: filename.into(),
        })
        .await
    }

    /// Replace the search pattern
    pub async fn search(&mut self, pattern: impl Into<String>) -> io::Result<Response> {
        self.call(&Request::Search {
            pattern: pattern.into(),
        })
        .await
    }

    /// Move the selection by a signed offset
    pub async fn move_selection(&mut self, delta: i64) -> io::Result<Response> {
        self.call(&Request::Move { delta }).await
    }
}
