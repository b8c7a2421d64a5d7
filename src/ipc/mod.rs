// IPC layer: newline-framed JSON messages over a Unix domain socket.
// One session (and one engine) per accepted connection.

pub mod client;
pub mod protocol;
pub mod server;
pub mod session;

pub use client::FilterClient;
pub use protocol::{Request, Response};
pub use server::{FilterServer, ServerSettings};
pub use session::Session;
