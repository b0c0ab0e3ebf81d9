use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use bmo_core::{BackendClient, BackendConfig};

use crate::BmoMcp;

pub type RecordedQueries = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Canned reply served for every backend request.
#[derive(Clone)]
pub struct StubReply {
    status: StatusCode,
    body: &'static str,
}

impl StubReply {
    pub const fn ok(body: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            status: StatusCode::from_u16(code).expect("valid status code"),
            body: "",
        }
    }
}

/// Spawns a stub backend and returns a service pointed at it.
pub async fn stub_service(reply: StubReply) -> BmoMcp {
    recording_service(reply).await.0
}

/// Like [`stub_service`], also returning the decoded query string of every
/// backend request.
pub async fn recording_service(reply: StubReply) -> (BmoMcp, RecordedQueries) {
    let reply = Arc::new(reply);
    let recorded = RecordedQueries::default();
    let sink = recorded.clone();
    let router = Router::new().fallback(move |Query(query): Query<HashMap<String, String>>| {
        let reply = reply.clone();
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push(query);
            (reply.status, [("x-op-status", "done")], reply.body)
        }
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub backend serve");
    });
    let service = BmoMcp::new(BackendClient::new(BackendConfig::new(format!("http://{addr}"))));
    (service, recorded)
}
