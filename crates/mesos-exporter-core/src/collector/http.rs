//! HTTP state source backed by a live Mesos master.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::traits::{FetchError, StateSource};
use crate::model::State;

/// Default state endpoint. Older masters also serve `/master/state`.
pub const DEFAULT_STATE_PATH: &str = "/state";

/// Fetches `/state` from a master with a blocking HTTP client.
///
/// The client must be created and dropped outside of an async runtime;
/// collection cycles run it on a blocking thread.
#[derive(Debug, Clone)]
pub struct HttpStateSource {
    client: Client,
    master: String,
    path: String,
}

impl HttpStateSource {
    /// Creates a source for `master` (e.g. `http://10.0.0.1:5050`).
    pub fn new(master: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mesos-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            master: master.into().trim_end_matches('/').to_string(),
            path: DEFAULT_STATE_PATH.to_string(),
        })
    }

    /// Overrides the state endpoint path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }
}

impl StateSource for HttpStateSource {
    fn fetch_state(&self) -> Result<State, FetchError> {
        let url = self.url();
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        debug!(url = %url, bytes = body.len(), "state fetched");

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn url(&self) -> String {
        format!("{}{}", self.master, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves exactly one canned HTTP response and returns the base URL.
    fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn source(base: &str) -> HttpStateSource {
        HttpStateSource::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url() {
        let s = source("http://master:5050/");
        assert_eq!(s.url(), "http://master:5050/state");
        assert_eq!(
            s.clone().with_path("master/state").url(),
            "http://master:5050/master/state"
        );
        assert_eq!(s.with_path("/state.json").url(), "http://master:5050/state.json");
    }

    #[test]
    fn test_fetch_ok() {
        let base = serve_once(
            "200 OK",
            r#"{"slaves":[{"pid":"s1","hostname":"h1","resources":{"cpus":4}}],"frameworks":[]}"#,
        );
        let state = source(&base).fetch_state().unwrap();
        assert_eq!(state.slaves.len(), 1);
        assert_eq!(state.slaves[0].total.cpus, 4.0);
    }

    #[test]
    fn test_fetch_status_error() {
        let base = serve_once("503 Service Unavailable", "");
        let err = source(&base).fetch_state().unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[test]
    fn test_fetch_decode_error() {
        let base = serve_once("200 OK", "not json");
        let err = source(&base).fetch_state().unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_fetch_connection_refused() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let err = source(&format!("http://{}", addr)).fetch_state().unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
