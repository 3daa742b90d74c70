//! Exercises the 401 handling against a real loopback server: one refresh
//! call per expiry, FIFO release of queued requests, at-most-once replay,
//! and terminal handling of the auth endpoints themselves.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use sehat::{endpoints, ApiClient, ApiError, AuthStore, HealthProfile};
use serde_json::json;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use url::Url;

/// How the stub backend should treat chat requests.
#[derive(Debug, Copy, Clone, PartialEq)]
enum ChatMode {
    /// 401 until a refresh has completed, then 200.
    AfterRefresh,
    /// 401 no matter what, even after a refresh.
    AlwaysUnauthorized,
    /// A plain server error, nothing to do with auth.
    ServerError,
}

struct Backend {
    chat_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    refreshed: AtomicBool,
    refresh_ok: bool,
    refresh_delay: Duration,
    chat_mode: ChatMode,
}

impl Backend {
    fn new(chat_mode: ChatMode, refresh_ok: bool, delay_ms: u64) -> Arc<Self> {
        Arc::new(Backend {
            chat_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            refreshed: AtomicBool::new(false),
            refresh_ok,
            refresh_delay: Duration::from_millis(delay_ms),
            chat_mode,
        })
    }

    fn chat_calls(&self) -> usize { self.chat_calls.load(Ordering::SeqCst) }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

async fn chat_handler(State(backend): State<Arc<Backend>>) -> Response {
    backend.chat_calls.fetch_add(1, Ordering::SeqCst);

    match backend.chat_mode {
        ChatMode::AlwaysUnauthorized => {
            StatusCode::UNAUTHORIZED.into_response()
        },
        ChatMode::ServerError => {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
        ChatMode::AfterRefresh => {
            if backend.refreshed.load(Ordering::SeqCst) {
                Json(reply_body()).into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        },
    }
}

async fn refresh_handler(State(backend): State<Arc<Backend>>) -> StatusCode {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(backend.refresh_delay).await;

    if backend.refresh_ok {
        backend.refreshed.store(true, Ordering::SeqCst);
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn me_handler() -> StatusCode { StatusCode::UNAUTHORIZED }

fn reply_body() -> serde_json::Value {
    json!({
        "answer": "Rest and keep yourself hydrated.",
        "route": "vector",
        "facts": [],
        "citations": [],
        "safety": {
            "red_flag": false,
            "matched": [],
            "mental_health": {"crisis": false, "matched": [], "first_aid": []},
            "pregnancy": {"concern": false, "matched": []}
        }
    })
}

async fn serve(backend: Arc<Backend>) -> Url {
    let app = Router::new()
        .route("/chat", post(chat_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/auth/me", get(me_handler))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{}/", addr)).unwrap()
}

async fn client_for(backend: &Arc<Backend>) -> ApiClient {
    let base_url = serve(Arc::clone(backend)).await;
    ApiClient::new(base_url, AuthStore::in_memory()).unwrap()
}

#[tokio::test]
async fn a_401_triggers_exactly_one_refresh_and_one_replay() {
    let backend = Backend::new(ChatMode::AfterRefresh, true, 0);
    let api = client_for(&backend).await;

    let reply = endpoints::chat(&api, "mild headache", "en", &HealthProfile::default())
        .await
        .unwrap();

    assert_eq!(reply.answer, "Rest and keep yourself hydrated.");
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.chat_calls(), 2);
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
    // the slow refresh keeps the coordinator in the Refreshing state long
    // enough that every request has already been turned away once
    let backend = Backend::new(ChatMode::AfterRefresh, true, 150);
    let api = client_for(&backend).await;
    let profile = HealthProfile::default();

    let send = || endpoints::chat(&api, "mild headache", "en", &profile);
    let (a, b, c, d, e) = tokio::join!(send(), send(), send(), send(), send());

    for reply in [a, b, c, d, e] {
        assert!(reply.is_ok());
    }
    assert_eq!(backend.refresh_calls(), 1);
    // every request was sent once, turned away, and replayed exactly once
    assert_eq!(backend.chat_calls(), 10);
}

#[tokio::test]
async fn failed_refresh_rejects_every_queued_request_and_clears_auth() {
    let backend = Backend::new(ChatMode::AfterRefresh, false, 100);
    let api = client_for(&backend).await;
    api.store().set_authenticated();
    let profile = HealthProfile::default();

    let send = || endpoints::chat(&api, "mild headache", "en", &profile);
    let (a, b, c) = tokio::join!(send(), send(), send());

    for outcome in [a, b, c] {
        assert!(matches!(outcome, Err(ApiError::SessionExpired)));
    }
    assert_eq!(backend.refresh_calls(), 1);
    assert!(!api.store().is_authenticated());
    assert!(api.store().take_session_expired());
}

#[tokio::test]
async fn a_replay_that_still_fails_passes_the_401_through() {
    let backend = Backend::new(ChatMode::AlwaysUnauthorized, true, 0);
    let api = client_for(&backend).await;

    let err = endpoints::chat(&api, "mild headache", "en", &HealthProfile::default())
        .await
        .unwrap_err();

    match err {
        ApiError::HttpClient(e) => {
            assert_eq!(e.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
        },
        other => panic!("Expected the 401 to pass through, got {:?}", other),
    }
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.chat_calls(), 2);
}

#[tokio::test]
async fn non_auth_errors_pass_through_without_a_refresh() {
    let backend = Backend::new(ChatMode::ServerError, true, 0);
    let api = client_for(&backend).await;

    let err = endpoints::chat(&api, "mild headache", "en", &HealthProfile::default())
        .await
        .unwrap_err();

    match err {
        ApiError::HttpClient(e) => {
            assert_eq!(
                e.status(),
                Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
            );
        },
        other => panic!("Expected the 500 to pass through, got {:?}", other),
    }
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(backend.chat_calls(), 1);
}

#[tokio::test]
async fn identity_401_is_terminal() {
    let backend = Backend::new(ChatMode::AfterRefresh, true, 0);
    let api = client_for(&backend).await;
    api.store().set_authenticated();

    let err = endpoints::me(&api).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(backend.refresh_calls(), 0);
    assert!(!api.store().is_authenticated());
    assert!(api.store().take_session_expired());
}

#[tokio::test]
async fn refresh_endpoint_401_never_cascades() {
    let backend = Backend::new(ChatMode::AfterRefresh, false, 0);
    let api = client_for(&backend).await;

    let err = endpoints::refresh(&api).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(backend.refresh_calls(), 1);
    assert!(api.store().take_session_expired());
}

#[tokio::test]
async fn independent_clients_keep_independent_refresh_state() {
    let backend = Backend::new(ChatMode::AfterRefresh, true, 150);
    let base_url = serve(Arc::clone(&backend)).await;
    let first = ApiClient::new(base_url.clone(), AuthStore::in_memory()).unwrap();
    let second = ApiClient::new(base_url, AuthStore::in_memory()).unwrap();
    let profile = HealthProfile::default();

    let (a, b) = tokio::join!(
        endpoints::chat(&first, "mild headache", "en", &profile),
        endpoints::chat(&second, "mild headache", "en", &profile),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    // no shared globals: each client coordinates its own refresh
    assert_eq!(backend.refresh_calls(), 2);
}
