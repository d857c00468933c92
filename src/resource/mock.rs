//! In-memory transport for unit tests

use crate::api::{ApiClient, ApiError, Result, Transport};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use url::Url;

pub const BASE: &str = "http://mock.test/api/v2";

/// Serves canned bodies by exact URL and records every request.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        ApiClient::new(BASE, Arc::clone(self) as Arc<dyn Transport>).unwrap()
    }

    pub fn respond(&self, url: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), body);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn get_json(&self, url: Url) -> BoxFuture<'_, Result<Value>> {
        async move {
            let key = url.to_string();
            self.requests.lock().unwrap().push(key.clone());
            let response = self.responses.lock().unwrap().get(&key).cloned();

            // Suspend like a real network call would.
            tokio::task::yield_now().await;

            response.ok_or(ApiError::Status {
                status: 404,
                url: key,
            })
        }
        .boxed()
    }
}

pub fn berry(id: u64, name: &str) -> Value {
    json!({"id": id, "name": name, "growth_time": 3})
}

/// Listing body whose results are berries `range.start + 1 ..= range.end`
pub fn listing_body(count: usize, range: Range<usize>) -> Value {
    let results: Vec<Value> = range
        .map(|i| {
            json!({
                "name": format!("berry-{}", i + 1),
                "url": format!("{}/berry/{}/", BASE, i + 1),
            })
        })
        .collect();

    json!({
        "count": count,
        "next": null,
        "previous": null,
        "results": results,
    })
}
