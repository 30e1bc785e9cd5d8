//! Scripted in-memory transport for store and client tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::api::ApiClient;
use super::token::{MemoryTokenStore, StoredToken, TokenStore};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::error::ApiError;
use crate::notify::UiEvent;
use crate::util::clock::now_unix;

#[derive(Clone, Debug)]
pub(crate) enum MockReply {
    Respond(HttpResponse),
    /// Respond after sleeping on the tokio clock.
    Delayed(Duration, HttpResponse),
    Fail(String),
}

/// Transport that answers from per-route queues.
///
/// The last reply queued for a route is sticky: it keeps answering once the
/// queue is down to one entry. Unscripted routes answer 404.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, method: Method, path: &str, reply: MockReply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, MockReply::Respond(HttpResponse { status, body: body.to_string() }));
    }

    pub(crate) fn on_delayed(&self, method: Method, path: &str, delay: Duration, body: Value) {
        self.push(method, path, MockReply::Delayed(delay, HttpResponse { status: 200, body: body.to_string() }));
    }

    pub(crate) fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, MockReply::Fail(message.to_owned()));
    }

    pub(crate) fn calls(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&(method, path.to_owned()))?;
        if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let reply = self.next_reply(request.method, &request.path);
        self.requests.lock().unwrap().push(request);
        match reply {
            Some(MockReply::Respond(resp)) => Ok(resp),
            Some(MockReply::Delayed(delay, resp)) => {
                tokio::time::sleep(delay).await;
                Ok(resp)
            }
            Some(MockReply::Fail(message)) => Err(ApiError::Transport(message)),
            None => Ok(HttpResponse { status: 404, body: r#"{"detail":"Not Found"}"#.to_owned() }),
        }
    }
}

/// Everything a store test needs: the scripted transport, a signed-in token
/// store, the API client, and the receiving end of its UI events.
pub(crate) struct Harness {
    pub(crate) transport: Arc<MockTransport>,
    pub(crate) tokens: Arc<MemoryTokenStore>,
    pub(crate) api: ApiClient,
    pub(crate) events: tokio::sync::mpsc::UnboundedReceiver<UiEvent>,
}

impl Harness {
    /// Harness with a valid token that will not need refreshing.
    pub(crate) fn signed_in() -> Self {
        let harness = Self::signed_out();
        harness
            .tokens
            .save(&StoredToken { access_token: "tok-1".to_owned(), expires_at: now_unix() + 3600 });
        harness
    }

    pub(crate) fn signed_out() -> Self {
        let transport = MockTransport::new();
        let tokens = Arc::new(MemoryTokenStore::default());
        let (tx, events) = tokio::sync::mpsc::unbounded_channel();
        let api = ApiClient::new(transport.clone(), tokens.clone(), Arc::new(tx), 30);
        Self { transport, tokens, api, events }
    }

    /// Drain every event emitted so far.
    pub(crate) fn drain_events(&mut self) -> Vec<UiEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub(crate) fn toasts(&mut self) -> Vec<crate::notify::Toast> {
        self.drain_events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Toast(toast) => Some(toast),
                UiEvent::Navigate(_) => None,
            })
            .collect()
    }
}
