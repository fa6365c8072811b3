//! Test doubles for the engine: a scripted network and a recording notifier.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pwacache_core::{CacheDb, EngineConfig, Error, Request, Response, ResponseSource};
use url::Url;

use super::{CacheEngine, Interception, Notification, Notifier, OfflineWorker};
use crate::fetch::Network;

pub const ORIGIN: &str = "http://app.test";

pub fn test_config_versions(static_version: &str, dynamic_version: &str) -> EngineConfig {
    let origin = Url::parse(ORIGIN).unwrap();
    EngineConfig::new(origin, static_version, dynamic_version)
        .with_manifest(["/", "/static/app.js", "/static/app.css"])
        .with_routes(["/", "/team", "/player"])
}

pub fn test_config() -> EngineConfig {
    test_config_versions("v1", "v1")
}

/// Network stub keyed by path. Unknown paths answer 404.
#[derive(Default)]
pub struct StubNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubNetwork {
    pub fn serve(&self, path: &str, status: u16, content_type: &str, body: &str) {
        let response = Response::new(
            status,
            vec![("content-type".to_string(), content_type.to_string())],
            body.to_string(),
            ResponseSource::Network,
        );
        self.routes.lock().unwrap().insert(path.to_string(), response);
    }

    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let path = request.url.path().to_string();
        *self.calls.lock().unwrap().entry(path.clone()).or_default() += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkUnavailable(format!("offline: {}", request.url)));
        }

        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(&path)
            .cloned()
            .unwrap_or_else(|| Response::new(404, Vec::new(), "not found", ResponseSource::Network)))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, notification: Notification) {
        self.shown.lock().unwrap().push(notification);
    }
}

/// Build an engine over an existing store database and network.
pub fn engine_on(db: CacheDb, network: Arc<StubNetwork>, config: EngineConfig) -> Arc<CacheEngine> {
    Arc::new(CacheEngine::new(config, db, network, Arc::new(RecordingNotifier::default())))
}

pub async fn new_engine(config: EngineConfig) -> (Arc<CacheEngine>, Arc<StubNetwork>, Arc<RecordingNotifier>) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let network = Arc::new(StubNetwork::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Arc::new(CacheEngine::new(config, db, network.clone(), notifier.clone()));
    (engine, network, notifier)
}

pub fn serve_manifest(network: &StubNetwork) {
    network.serve("/", 200, "text/html", "<h1>home</h1>");
    network.serve("/static/app.js", 200, "application/javascript", "console.log('app')");
    network.serve("/static/app.css", 200, "text/css", "body{}");
}

/// An installed and activated engine with the test manifest cached.
pub async fn active_engine() -> (Arc<CacheEngine>, Arc<StubNetwork>, Arc<RecordingNotifier>) {
    let (engine, network, notifier) = new_engine(test_config()).await;
    serve_manifest(&network);
    engine.on_install().await.unwrap();
    engine.on_activate().await.unwrap();
    (engine, network, notifier)
}

pub fn get(path: &str) -> Request {
    Request::get(Url::parse(ORIGIN).unwrap().join(path).unwrap())
}

pub fn post(path: &str) -> Request {
    Request::new("POST", Url::parse(ORIGIN).unwrap().join(path).unwrap())
}

/// Intercept `request` and return the response, failing on passthrough.
pub async fn handled(engine: &CacheEngine, request: Request) -> Response {
    match engine.intercept(request).await.unwrap() {
        Interception::Handled(response) => response,
        Interception::Passthrough => panic!("expected the engine to handle the request"),
    }
}
