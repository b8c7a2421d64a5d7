use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use super::protocol::Response;
use super::session::Session;
use crate::source::TextEncoding;

/// Upper bound on a single framed request, matching the original transport's
/// 64 KiB message buffers. Patterns and filenames are far smaller.
const MAX_REQUEST_BYTES: u64 = 64 * 1024;

/// Settings handed to each session at connection time. These come from the
/// config layer as plain constructor parameters; there is no ambient state.
#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    pub encoding: TextEncoding,
    pub case_sensitive: bool,
}

/// Single-client filter server over a Unix domain socket.
///
/// The accept loop is strictly sequential: one connection is serviced to
/// completion before the next is accepted, so at most one session (and one
/// engine) exists at any moment. A second client blocks in the kernel accept
/// queue until the first disconnects.
///
/// A connection stays open across many request/response exchanges; the
/// session ends when the peer closes. Each newline-framed request gets
/// exactly one newline-framed response, fully written before the next read.
pub struct FilterServer {
    listener: UnixListener,
    socket_path: PathBuf,
    settings: ServerSettings,
}

impl FilterServer {
    /// Bind the server socket, removing any stale socket file first.
    pub fn bind(socket_path: impl AsRef<Path>, settings: ServerSettings) -> io::Result<Self> {
        let socket_path = socket_path.as_ref().to_path_buf();

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)?;
        }

        let listener = UnixListener::bind(&socket_path)?;

        Ok(Self {
            listener,
            socket_path,
            settings,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept loop. Runs until interrupted (ctrl-c). Transport errors end
    /// the current session and are logged; the loop then accepts the next
    /// connection.
    pub async fn run(&self) -> io::Result<()> {
        self.run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Accept loop with a caller-supplied shutdown future. Returns as soon
    /// as the future completes, whether the loop is waiting to accept or in
    /// the middle of an active session.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) -> io::Result<()> {
        tokio::pin!(shutdown);

        info!(socket = %self.socket_path.display(), "listening");

        loop {
            let stream = tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => stream,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    }
                }
            };

            debug!("client connected");
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, dropping active session");
                    return Ok(());
                }
                served = self.serve_connection(stream) => {
                    if let Err(e) = served {
                        warn!(error = %e, "session ended with transport error");
                    }
                    debug!("client disconnected");
                }
            }
        }
    }

    /// Service one session: read newline-framed requests until EOF, writing
    /// one framed response per request. A peer that closes without sending
    /// anything is a normal empty interaction. A request that exceeds
    /// [`MAX_REQUEST_BYTES`] without a newline gets an error response and
    /// ends the session.
    async fn serve_connection(&self, stream: UnixStream) -> io::Result<()> {
        let mut session = Session::new(self.settings.encoding, self.settings.case_sensitive);
        let mut reader = BufReader::new(stream);
        let mut line = String::new();

        loop {
            line.clear();
            let n = (&mut reader)
                .take(MAX_REQUEST_BYTES)
                .read_line(&mut line)
                .await?;
            if n == 0 {
                return Ok(());
            }
            if n as u64 == MAX_REQUEST_BYTES && !line.ends_with('\n') {
                write_response(reader.get_mut(), &Response::err("request too large")).await?;
                return Ok(());
            }

            let raw = line.trim();
            if raw.is_empty() {
                continue;
            }

            let response = session.handle_raw(raw);
            write_response(reader.get_mut(), &response).await?;
        }
    }

    /// Remove the socket file. Also done best-effort on drop.
    pub fn cleanup(&self) -> io::Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }
        Ok(())
    }
}

impl Drop for FilterServer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

async fn write_response(stream: &mut UnixStream, response: &Response) -> io::Result<()> {
    let mut json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json.push('\n');

    stream.write_all(json.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}
