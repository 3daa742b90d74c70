use crate::{endpoints, AuthStore, DEFAULT_USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::collections::VecDeque;
use tokio::sync::{oneshot, Mutex};
use url::Url;

/// An HTTP client for the Sehat backend which attaches the session cookie
/// to every request and renews an expired session transparently.
///
/// # The refresh protocol
///
/// Any response with status 401 (other than from the refresh and identity
/// endpoints themselves) triggers a single `POST auth/refresh` call.
/// Requests that hit a 401 while that call is already in flight are queued
/// rather than starting a second refresh, and are released in arrival order
/// once it resolves. Each original request is replayed at most once; a
/// replay that still comes back 401 is handed to the caller unchanged.
///
/// If the refresh itself fails, the local auth state is cleared, the
/// session-expired note is set for the login surface, and every queued
/// request is rejected with [`ApiError::SessionExpired`] in arrival order.
///
/// All of that state lives inside the client instance, so independent
/// clients never share a refresh.
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: AuthStore,
    refresh: Mutex<RefreshState>,
}

/// What a queued request learns when the in-flight refresh resolves. The
/// actual refresh error stays with the request that led the refresh; the
/// queue only needs to know which way it went.
type RefreshOutcome = Result<(), ()>;

#[derive(Debug)]
enum RefreshState {
    Idle,
    Refreshing {
        waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
    },
}

impl ApiClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: Url, store: AuthStore) -> Result<Self, ApiError> {
        let mut base_url = base_url;
        // relative endpoint paths join onto the last path segment, so make
        // sure there is a trailing slash to join onto
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .cookie_store(true)
            .build()?;

        Ok(ApiClient {
            http,
            base_url,
            store,
            refresh: Mutex::new(RefreshState::Idle),
        })
    }

    pub fn base_url(&self) -> &Url { &self.base_url }

    pub fn store(&self) -> &AuthStore { &self.store }

    /// Send a request through the refresh protocol.
    ///
    /// `customize` is applied to a fresh [`RequestBuilder`] on every
    /// attempt, so replays work even for bodies that can't be cloned
    /// (multipart uploads).
    pub(crate) async fn send<F>(
        &self,
        method: Method,
        path: &str,
        customize: F,
    ) -> Result<Response, ApiError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.base_url.join(path)?;
        let mut retried = false;

        loop {
            log::debug!("Sending a request to {}", url);
            let request =
                customize(self.http.request(method.clone(), url.clone()));
            let response = request.send().await?;
            log::trace!("Headers: {:#?}", response.headers());

            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if endpoints::is_auth_endpoint(path) {
                // The credential itself was rejected, there is nothing
                // left to renew.
                log::info!(
                    "The server rejected the session credential at {}",
                    url
                );
                self.expire_session();
                return Err(ApiError::SessionExpired);
            }

            if retried {
                // the replay was rejected too; hand the 401 to the caller
                return Ok(response);
            }

            self.refresh_session().await?;
            retried = true;
        }
    }

    /// Send a request directly, bypassing the refresh protocol. Used where
    /// a 401 carries a different meaning than "session expired", e.g. bad
    /// credentials on the login endpoint.
    pub(crate) async fn send_unguarded<F>(
        &self,
        method: Method,
        path: &str,
        customize: F,
    ) -> Result<Response, ApiError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.base_url.join(path)?;
        log::debug!("Sending a request to {}", url);

        let response =
            customize(self.http.request(method, url)).send().await?;
        log::trace!("Headers: {:#?}", response.headers());

        Ok(response)
    }

    /// Renew the session, coordinating with any refresh already underway.
    ///
    /// The first caller becomes the refresher; everyone else waits for its
    /// outcome. Returns once the session is fresh, or with
    /// [`ApiError::SessionExpired`] once it is beyond saving.
    pub(crate) async fn refresh_session(&self) -> Result<(), ApiError> {
        let waiter = {
            let mut state = self.refresh.lock().await;
            match &mut *state {
                RefreshState::Refreshing { waiters } => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push_back(tx);
                    Some(rx)
                },
                state @ RefreshState::Idle => {
                    *state = RefreshState::Refreshing {
                        waiters: VecDeque::new(),
                    };
                    None
                },
            }
        };

        match waiter {
            Some(rx) => match rx.await {
                Ok(Ok(())) => Ok(()),
                // a rejected or abandoned refresh both mean sign in again
                _ => Err(ApiError::SessionExpired),
            },
            None => self.lead_refresh().await,
        }
    }

    /// Perform the refresh call and settle the queue, in arrival order.
    async fn lead_refresh(&self) -> Result<(), ApiError> {
        let outcome = self.renew_session().await;

        let waiters = {
            let mut state = self.refresh.lock().await;
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => VecDeque::new(),
            }
        };

        match &outcome {
            Ok(()) => {
                for waiter in waiters {
                    let _ = waiter.send(Ok(()));
                }
            },
            Err(e) => {
                log::info!("Giving up on the session: {}", e);
                self.expire_session();
                for waiter in waiters {
                    let _ = waiter.send(Err(()));
                }
            },
        }

        outcome
    }

    /// Ask the server to rotate the session credential. The cookie store
    /// picks the new cookie up from the response automatically.
    async fn renew_session(&self) -> Result<(), ApiError> {
        let url = self.base_url.join(endpoints::AUTH_REFRESH_PATH)?;
        log::debug!("Refreshing the session via {}", url);

        let response = self.http.post(url).send().await?;

        if response.status().is_success() {
            self.store.set_authenticated();
            Ok(())
        } else {
            log::warn!("Session refresh failed with {}", response.status());
            Err(ApiError::SessionExpired)
        }
    }

    /// Terminal auth failure: forget the local auth state and leave the
    /// session-expired note for the login surface.
    fn expire_session(&self) {
        self.store.clear();
        self.store.mark_session_expired();
    }
}

/// Errors shared by every endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the request")]
    HttpClient(#[from] reqwest::Error),
    /// The endpoint path could not be joined onto the base URL.
    #[error("Invalid endpoint path")]
    BadUrl(#[from] url::ParseError),
    /// The session could not be renewed; the user has to sign in again.
    #[error("The session has expired")]
    SessionExpired,
}
