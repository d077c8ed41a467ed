//! In-process stand-in for the remote classifier
//!
//! Serves `POST /classify` on an ephemeral port. Like the real service it
//! answers 400 when the multipart field `image` is missing; otherwise it
//! replies with the configured status and body.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    routing::post,
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Canned reply for every classify request
#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub status: StatusCode,
    pub body: String,
    pub delay: Option<Duration>,
}

impl FakeResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn with_status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// An `image` part as the fake server received it
#[derive(Debug, Clone)]
pub struct ReceivedImage {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
struct FakeState {
    response: FakeResponse,
    requests: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<ReceivedImage>>>,
}

pub struct FakeClassifier {
    pub url: String,
    state: FakeState,
    handle: JoinHandle<()>,
}

impl FakeClassifier {
    pub async fn start(response: FakeResponse) -> Self {
        let state = FakeState {
            response,
            requests: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/classify", post(classify))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/classify", addr),
            state,
            handle,
        }
    }

    /// Requests that reached the handler, including rejected ones
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<ReceivedImage> {
        self.state.received.lock().unwrap().clone()
    }
}

impl Drop for FakeClassifier {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn classify(
    State(state): State<FakeState>,
    mut multipart: Multipart,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let mut image = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            image = Some(ReceivedImage { file_name, bytes });
        }
    }

    let json = [(header::CONTENT_TYPE, "application/json")];

    let Some(image) = image else {
        return (
            StatusCode::BAD_REQUEST,
            json,
            r#"{"error":"No image file provided"}"#.to_string(),
        );
    };
    state.received.lock().unwrap().push(image);

    if let Some(delay) = state.response.delay {
        tokio::time::sleep(delay).await;
    }

    (state.response.status, json, state.response.body.clone())
}
