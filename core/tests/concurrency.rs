//! Overlapping calls through one client must not leak state between them.
//!
//! A fixture transport answers each path with its own body, but only once the
//! job's gate is opened. Tests open the gates in reverse issue order, so
//! completion order is fixed and differs from issue order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::{json, Value};
use sunspot_core::{ApiClient, ApiError, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
use tokio::sync::Notify;
use tokio::task::JoinSet;

const BASE_URL: &str = "http://fixture";
const CALLS: usize = 16;

struct Fixture {
    status: u16,
    body: String,
    gate: Arc<Notify>,
}

#[derive(Default)]
struct FixtureTransport {
    fixtures: HashMap<String, Fixture>,
    gates: Vec<Arc<Notify>>,
}

impl FixtureTransport {
    fn insert(&mut self, path: &str, status: u16, body: Value, gate: &Arc<Notify>) {
        self.fixtures.insert(
            format!("{BASE_URL}{path}"),
            Fixture {
                status,
                body: body.to_string(),
                gate: Arc::clone(gate),
            },
        );
    }

    /// Let the pending (or next) request for job `i` complete.
    fn release(&self, i: usize) {
        self.gates[i].notify_one();
    }
}

impl Transport for FixtureTransport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let found = self
            .fixtures
            .get(&request.path)
            .map(|f| (f.status, f.body.clone(), Arc::clone(&f.gate)));
        async move {
            let (status, body, gate) = match found {
                Some(fixture) => fixture,
                None => return Err(TransportError::from(format!("no fixture for {}", request.path))),
            };
            gate.notified().await;
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            })
        }
    }
}

fn client() -> Arc<ApiClient<FixtureTransport>> {
    let mut transport = FixtureTransport::default();
    for i in 0..CALLS {
        let gate = Arc::new(Notify::new());
        transport.insert(
            &format!("/api/jobs/{i}?job_index={i}"),
            200,
            json!({ "job_index": i, "output_data": format!("out/{i}.parquet") }),
            &gate,
        );
        transport.insert(
            &format!("/api/jobs/{i}/run"),
            if i % 2 == 0 { 200 } else { 422 },
            if i % 2 == 0 {
                json!({ "output_info": format!("out/{i}.json") })
            } else {
                json!({ "detail": format!("job {i} rejected") })
            },
            &gate,
        );
        transport.gates.push(gate);
    }
    Arc::new(ApiClient::new(BASE_URL, transport))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_gets_resolve_to_their_own_fixture() {
    let client = client();
    let mut set = JoinSet::new();
    for i in 0..CALLS {
        let client = Arc::clone(&client);
        set.spawn(async move {
            let res: Value = client
                .get(&format!("/api/jobs/{i}"), &json!({ "jobIndex": i }))
                .await
                .unwrap();
            (i, res)
        });
    }

    // Only one gate is open at a time, so each join yields the job just released.
    let mut finished = Vec::new();
    for expected in (0..CALLS).rev() {
        client.transport().release(expected);
        let (i, res) = set.join_next().await.unwrap().unwrap();
        assert_eq!(i, expected);
        assert_eq!(res, json!({ "jobIndex": i, "outputData": format!("out/{i}.parquet") }));
        finished.push(i);
    }
    assert!(set.is_empty());
    assert_eq!(finished, (0..CALLS).rev().collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failures_stay_isolated() {
    let client = client();
    let mut set = JoinSet::new();
    for i in 0..CALLS {
        let client = Arc::clone(&client);
        set.spawn(async move {
            let res = client
                .post::<Value, _>(&format!("/api/jobs/{i}/run"), &json!({ "jobIndex": i }))
                .await;
            (i, res)
        });
    }

    for expected in (0..CALLS).rev() {
        client.transport().release(expected);
        let (i, res) = set.join_next().await.unwrap().unwrap();
        assert_eq!(i, expected);
        if i % 2 == 0 {
            assert_eq!(res.unwrap(), json!({ "outputInfo": format!("out/{i}.json") }));
        } else {
            match res.unwrap_err() {
                ApiError::Http { status, detail } => {
                    assert_eq!(status, 422);
                    assert_eq!(detail, format!("job {i} rejected"));
                }
                other => panic!("job {i}: unexpected error: {other:?}"),
            }
        }
    }
    assert!(set.is_empty());
}

#[tokio::test]
async fn missing_fixture_is_a_transport_error() {
    let client = client();
    let err = client.get::<Value, _>("/api/unknown", &()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn fixture_requests_are_plain_gets() {
    let client = client();
    let req = client.build_get("/api/jobs/3", &json!({ "jobIndex": 3 })).unwrap();
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.path, "http://fixture/api/jobs/3?job_index=3");
}
