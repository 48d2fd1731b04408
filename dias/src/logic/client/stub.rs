//! In-process stand-in for the appliance REST API, used by client tests.

use crate::logic::config::ApplianceConfig;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::Filter;

pub const STUB_API_KEY: &str = "stub-api-key";

#[derive(Default)]
struct Recorded {
    cursors: Vec<u64>,
    auth_headers: Vec<Option<String>>,
    accept_headers: Vec<Option<String>>,
    removals: Vec<u64>,
}

pub struct StubAppliance {
    base_url: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl StubAppliance {
    /// Serve `pages` (status, body) in order to successive inventory requests;
    /// once they run out every request gets an empty final page. Removal
    /// requests answer 204 unless the id is in `failing_removals`.
    pub async fn start(pages: Vec<(u16, Value)>, failing_removals: Vec<u64>) -> Self {
        let pages = Arc::new(Mutex::new(VecDeque::from(pages)));
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        let inventory = {
            let recorded = recorded.clone();
            warp::get()
                .and(warp::path!("api" / "v1" / "devices"))
                .and(warp::query::<HashMap<String, String>>())
                .and(warp::header::optional::<String>("authorization"))
                .and(warp::header::optional::<String>("accept"))
                .map(
                    move |query: HashMap<String, String>,
                          auth: Option<String>,
                          accept: Option<String>| {
                        let cursor = query
                            .get("after_device_id")
                            .and_then(|c| c.parse().ok())
                            .unwrap_or(u64::MAX);
                        {
                            let mut recorded = recorded.lock().unwrap();
                            recorded.cursors.push(cursor);
                            recorded.auth_headers.push(auth);
                            recorded.accept_headers.push(accept);
                        }
                        let (status, body) = pages
                            .lock()
                            .unwrap()
                            .pop_front()
                            .unwrap_or((200, json!({ "devices": [] })));
                        warp::reply::with_status(
                            warp::reply::json(&body),
                            StatusCode::from_u16(status).unwrap(),
                        )
                    },
                )
        };

        let removal = {
            let recorded = recorded.clone();
            warp::post()
                .and(warp::path!("api" / "v1" / "devices" / u64 / "actions" / "remove"))
                .and(warp::header::optional::<String>("authorization"))
                .map(move |id: u64, auth: Option<String>| {
                    {
                        let mut recorded = recorded.lock().unwrap();
                        recorded.removals.push(id);
                        recorded.auth_headers.push(auth);
                    }
                    let status = if failing_removals.contains(&id) {
                        StatusCode::NOT_FOUND
                    } else {
                        StatusCode::NO_CONTENT
                    };
                    warp::reply::with_status(warp::reply(), status)
                })
        };

        let (addr, server) = warp::serve(inventory.or(removal)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self {
            base_url: format!("http://{}", addr),
            recorded,
        }
    }

    pub fn appliance(&self) -> ApplianceConfig {
        ApplianceConfig {
            fqdn: self.base_url.clone(),
            api_key: STUB_API_KEY.to_string(),
        }
    }

    /// `after_device_id` of every inventory request, in arrival order
    pub fn cursors(&self) -> Vec<u64> {
        self.recorded.lock().unwrap().cursors.clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.recorded.lock().unwrap().auth_headers.clone()
    }

    pub fn accept_headers(&self) -> Vec<Option<String>> {
        self.recorded.lock().unwrap().accept_headers.clone()
    }

    /// Ids of every removal request, in arrival order
    pub fn removals(&self) -> Vec<u64> {
        self.recorded.lock().unwrap().removals.clone()
    }
}
