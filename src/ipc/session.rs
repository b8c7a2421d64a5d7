use tracing::{debug, warn};

use super::protocol::{Request, Response};
use crate::filter::FilterEngine;
use crate::source::{self, TextEncoding};

/// Protocol state for one accepted connection.
///
/// Owns at most one [`FilterEngine`], created by the first successful `init`
/// and replaced by any later one. `search` and `move` before `init` get an
/// explicit error response so every request state is observable from the
/// client side.
pub struct Session {
    engine: Option<FilterEngine>,
    encoding: TextEncoding,
    case_sensitive: bool,
}

impl Session {
    pub fn new(encoding: TextEncoding, case_sensitive: bool) -> Self {
        Self {
            engine: None,
            encoding,
            case_sensitive,
        }
    }

    /// Decode one raw message and apply it. Decode failures become error
    /// responses; the session stays usable for the next exchange.
    pub fn handle_raw(&mut self, raw: &str) -> Response {
        match serde_json::from_str::<Request>(raw) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "undecodable request");
                Response::err(format!("invalid request: {e}"))
            }
        }
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Init { filename } => self.init(&filename),
            Request::Search { pattern } => match self.engine.as_mut() {
                Some(engine) => Response::ok(engine.update_filter(&pattern)),
                None => Response::err("no active session"),
            },
            Request::Move { delta } => match self.engine.as_mut() {
                Some(engine) => Response::ok(engine.move_selection(delta)),
                None => Response::err("no active session"),
            },
        }
    }

    fn init(&mut self, filename: &str) -> Response {
        match source::load_lines(filename.as_ref(), self.encoding) {
            Ok(lines) => {
                debug!(filename, lines = lines.len(), "source loaded");
                let engine = FilterEngine::new(lines, self.case_sensitive);
                let line = engine.selected_line().to_string();
                self.engine = Some(engine);
                Response::ok(line)
            }
            Err(e) => {
                warn!(filename, error = %e, "source load failed");
                Response::err(format!("failed to load {filename}: {e}"))
            }
        }
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "apple\nbanana\ncherry\ngrape\nApple Pie\n").unwrap();
        file
    }

    fn insensitive_session() -> Session {
        Session::new(TextEncoding::Utf8, false)
    }

    #[test]
    fn search_before_init_is_an_error() {
        let mut session = insensitive_session();
        let resp = session.handle(Request::Search {
            pattern: "a".to_string(),
        });
        assert_eq!(resp, Response::err("no active session"));
        assert!(!session.has_engine());
    }

    #[test]
    fn move_before_init_is_an_error() {
        let mut session = insensitive_session();
        let resp = session.handle(Request::Move { delta: 1 });
        assert_eq!(resp, Response::err("no active session"));
    }

    #[test]
    fn init_loads_file_and_selects_first_line() {
        let file = fixture_file();
        let mut session = insensitive_session();

        let resp = session.handle(Request::Init {
            filename: file.path().to_string_lossy().into_owned(),
        });
        assert_eq!(resp.line(), Some("apple"));
        assert!(session.has_engine());
    }

    #[test]
    fn init_failure_reports_error_and_leaves_no_engine() {
        let mut session = insensitive_session();

        let resp = session.handle(Request::Init {
            filename: "/nonexistent/source.txt".to_string(),
        });
        assert!(!resp.is_ok());
        assert!(!session.has_engine());

        // Follow-up requests still get the explicit error
        let resp = session.handle(Request::Search {
            pattern: "a".to_string(),
        });
        assert_eq!(resp, Response::err("no active session"));
    }

    #[test]
    fn init_replaces_prior_engine() {
        let file = fixture_file();
        let mut other = NamedTempFile::new().unwrap();
        write!(other, "zebra\nyak\n").unwrap();

        let mut session = insensitive_session();
        let path = file.path().to_string_lossy().into_owned();
        session.handle(Request::Init { filename: path });
        session.handle(Request::Search {
            pattern: "ap".to_string(),
        });

        let resp = session.handle(Request::Init {
            filename: other.path().to_string_lossy().into_owned(),
        });
        assert_eq!(resp.line(), Some("zebra"));

        // Fresh engine: the old pattern is gone
        let resp = session.handle(Request::Search {
            pattern: String::new(),
        });
        assert_eq!(resp.line(), Some("zebra"));
    }

    #[test]
    fn search_and_move_flow() {
        let file = fixture_file();
        let mut session = insensitive_session();
        session.handle(Request::Init {
            filename: file.path().to_string_lossy().into_owned(),
        });

        let resp = session.handle(Request::Search {
            pattern: "ap".to_string(),
        });
        assert_eq!(resp.line(), Some("apple"));

        let resp = session.handle(Request::Move { delta: 1 });
        assert_eq!(resp.line(), Some("grape"));

        let resp = session.handle(Request::Move { delta: 100 });
        assert_eq!(resp.line(), Some("Apple Pie"));
    }

    #[test]
    fn case_sensitive_session_respects_flag() {
        let file = fixture_file();
        let mut session = Session::new(TextEncoding::Utf8, true);
        session.handle(Request::Init {
            filename: file.path().to_string_lossy().into_owned(),
        });

        let resp = session.handle(Request::Search {
            pattern: "Apple".to_string(),
        });
        assert_eq!(resp.line(), Some("Apple Pie"));
    }

    #[test]
    fn malformed_payload_gets_error_response() {
        let mut session = insensitive_session();
        let resp = session.handle_raw("not json at all");
        assert!(!resp.is_ok());

        let resp = session.handle_raw(r#"{"type":"frobnicate"}"#);
        assert!(!resp.is_ok());
    }

    #[test]
    fn session_survives_malformed_payload() {
        let file = fixture_file();
        let mut session = insensitive_session();
        session.handle_raw("garbage");

        let init = format!(
            r#"{{"type":"init","filename":"{}"}}"#,
            file.path().to_string_lossy()
        );
        let resp = session.handle_raw(&init);
        assert_eq!(resp.line(), Some("apple"));
    }
}
