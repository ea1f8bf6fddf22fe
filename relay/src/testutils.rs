//! Shared fixtures for relay tests.

use crate::backends::BackendSource;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;
use url::Url;

/// In-memory [`BackendSource`] for driving discovery from tests.
pub struct MapSource {
    entries: HashMap<String, String>,
}

impl MapSource {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn from_owned(pairs: Vec<(String, String)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }
}

impl BackendSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// A local backend server that records every request it receives and
/// answers with a fixed status.
pub struct RecordingBackend {
    port: u16,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<(HeaderMap, Bytes)>>>,
}

impl RecordingBackend {
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://127.0.0.1:{}/webhook", self.port)).unwrap()
    }

    pub fn url_str(&self) -> String {
        self.url().to_string()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(HeaderMap, Bytes)> {
        self.last.lock().unwrap().clone()
    }
}

/// Spawns a recording backend on an ephemeral port.
pub async fn spawn_backend(status: StatusCode) -> RecordingBackend {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test backend");
    let port = listener.local_addr().unwrap().port();

    let hits = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None));

    let task_hits = hits.clone();
    let task_last = last.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => return,
            };
            let io = TokioIo::new(stream);

            let conn_hits = task_hits.clone();
            let conn_last = task_last.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let hits = conn_hits.clone();
                    let last = conn_last.clone();
                    async move {
                        let (parts, body) = req.into_parts();
                        let body_bytes = body
                            .collect()
                            .await
                            .map(|collected| collected.to_bytes())
                            .unwrap_or_else(|_| Bytes::new());

                        hits.fetch_add(1, Ordering::SeqCst);
                        *last.lock().unwrap() = Some((parts.headers, body_bytes));

                        let mut response = Response::new(Full::new(Bytes::from_static(b"OK")));
                        *response.status_mut() = status;
                        Ok::<_, Infallible>(response)
                    }
                });

                let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                    .serve_connection(io, service)
                    .await;
            });
        }
    });

    RecordingBackend { port, hits, last }
}
