use std::sync::{Arc, Mutex, Once};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::IntoResponse,
};
use tokio::{net::TcpListener, runtime::Runtime};

/// What the stub saw for one request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    content_type: &'static str,
    body: String,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

/// axum server answering every route with one canned response.
///
/// Runs on its own runtime so blocking reqwest clients in the test thread
/// stay outside any async context.
pub struct StubServer {
    pub url: String,
    seen: Arc<Mutex<Vec<Recorded>>>,
    _runtime: Runtime,
}

impl StubServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().expect("stub state poisoned").clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("stub server saw no request")
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.seen.lock().expect("stub state poisoned").push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    });
    (
        state.status,
        [(header::CONTENT_TYPE, state.content_type)],
        state.body.clone(),
    )
}

static NO_PROXY: Once = Once::new();

pub fn serve(status: u16, content_type: &'static str, body: &str) -> StubServer {
    NO_PROXY.call_once(|| {
        // SAFETY: runs once, before any client in this test binary reads the environment.
        unsafe { std::env::set_var("NO_PROXY", "127.0.0.1,localhost") };
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("stub runtime");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status: StatusCode::from_u16(status).expect("valid status"),
        content_type,
        body: body.to_string(),
        seen: seen.clone(),
    };

    let listener = runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    let app = Router::new().fallback(record).with_state(state);
    runtime.spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubServer {
        url: format!("http://{addr}"),
        seen,
        _runtime: runtime,
    }
}
