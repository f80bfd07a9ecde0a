/*!
Mock storage node dashboard API

Serves the fixture payloads on an ephemeral localhost port. A scenario
switches every endpoint into a failure mode; single satellites can be
overridden so one bad satellite can be tested next to healthy ones.
Every request path is recorded for assertions.
*/

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures;

/// How long the `Timeout` scenario keeps a request waiting.
pub const TIMEOUT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Fixture payloads.
    Success,
    /// `{}` on every endpoint.
    MissingKeys,
    /// 200 with a plain text body.
    WrongText,
    NotFound,
    ServerError,
    /// Answers only after [`TIMEOUT_DELAY`].
    Timeout,
}

impl std::str::FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "success" => Ok(Scenario::Success),
            "missingkeys" => Ok(Scenario::MissingKeys),
            "wrongtext" => Ok(Scenario::WrongText),
            "notfound" => Ok(Scenario::NotFound),
            "servererror" => Ok(Scenario::ServerError),
            "timeout" => Ok(Scenario::Timeout),
            other => anyhow::bail!("unknown scenario: {}", other),
        }
    }
}

struct MockState {
    scenario: Mutex<Scenario>,
    satellite_overrides: Mutex<HashMap<String, Scenario>>,
    requests: Mutex<Vec<String>>,
    node: Mutex<Value>,
    payout: Mutex<Value>,
    satellite: Mutex<Value>,
}

impl MockState {
    fn record(&self, path: &str) {
        self.requests.lock().unwrap().push(path.to_string());
        log::debug!("[MOCK] GET {}", path);
    }

    fn scenario(&self) -> Scenario {
        *self.scenario.lock().unwrap()
    }
}

pub struct MockStorjApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockStorjApi {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Scenario::Success).await
    }

    pub async fn start_with(scenario: Scenario) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            scenario: Mutex::new(scenario),
            satellite_overrides: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            node: Mutex::new(fixtures::node()),
            payout: Mutex::new(fixtures::payout()),
            satellite: Mutex::new(fixtures::satellite()),
        });

        let router = Router::new()
            .route("/api/sno/", get(node))
            .route("/api/sno/estimated-payout", get(payout))
            .route("/api/sno/satellite/{id}", get(satellite))
            .fallback(unknown)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                log::error!("[MOCK] server stopped: {}", e);
            }
        });
        log::info!("[MOCK] storage node API on http://{} ({:?})", addr, scenario);

        Ok(Self { addr, state, server })
    }

    /// `http://127.0.0.1:{port}`, without the API path.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn set_scenario(&self, scenario: Scenario) {
        *self.state.scenario.lock().unwrap() = scenario;
    }

    /// Overrides the scenario for one satellite detail endpoint.
    pub fn fail_satellite(&self, id: &str, scenario: Scenario) {
        self.state
            .satellite_overrides
            .lock()
            .unwrap()
            .insert(id.to_string(), scenario);
    }

    pub fn set_node(&self, payload: Value) {
        *self.state.node.lock().unwrap() = payload;
    }

    pub fn set_payout(&self, payload: Value) {
        *self.state.payout.lock().unwrap() = payload;
    }

    pub fn set_satellite(&self, payload: Value) {
        *self.state.satellite.lock().unwrap() = payload;
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().unwrap().clear();
    }
}

impl Drop for MockStorjApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn respond(scenario: Scenario, payload: Value) -> Response {
    match scenario {
        Scenario::Success => Json(payload).into_response(),
        Scenario::MissingKeys => Json(json!({})).into_response(),
        Scenario::WrongText => (StatusCode::OK, "wrong text").into_response(),
        Scenario::NotFound => StatusCode::NOT_FOUND.into_response(),
        Scenario::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Scenario::Timeout => {
            tokio::time::sleep(TIMEOUT_DELAY).await;
            Json(payload).into_response()
        }
    }
}

async fn node(State(state): State<Arc<MockState>>) -> Response {
    state.record("/api/sno/");
    let payload = state.node.lock().unwrap().clone();
    respond(state.scenario(), payload).await
}

async fn payout(State(state): State<Arc<MockState>>) -> Response {
    state.record("/api/sno/estimated-payout");
    let payload = state.payout.lock().unwrap().clone();
    respond(state.scenario(), payload).await
}

async fn satellite(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.record(&format!("/api/sno/satellite/{}", id));
    let scenario = state
        .satellite_overrides
        .lock()
        .unwrap()
        .get(&id)
        .copied()
        .unwrap_or_else(|| state.scenario());
    let mut payload = state.satellite.lock().unwrap().clone();
    if let Some(object) = payload.as_object_mut() {
        object.insert("id".to_string(), Value::String(id));
    }
    respond(scenario, payload).await
}

async fn unknown(State(state): State<Arc<MockState>>, req: Request) -> StatusCode {
    state.record(req.uri().path());
    StatusCode::NOT_FOUND
}
