use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;

use crate::blockchain::Blockchain;
use crate::error::PeerError;

/// Endpoints peers expose to each other.
pub const BET_PATH: &str = "/bet";
pub const RECEIVE_BLOCK_PATH: &str = "/receive-new-block";
pub const REGISTER_NODE_PATH: &str = "/register-node";
pub const REGISTER_BULK_PATH: &str = "/register-nodes-bulk";
pub const BLOCKCHAIN_PATH: &str = "/blockchain";

/// HTTP client for talking to other nodes. Every request is bounded by the
/// configured timeout so one unreachable peer cannot stall the others.
#[derive(Clone)]
pub struct PeerClient {
    client: Client,
    node_url: String,
}

impl PeerClient {
    pub fn new(node_url: impl Into<String>, timeout: Duration) -> Result<Self, PeerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PeerError::ClientInit)?;
        Ok(Self {
            client,
            node_url: node_url.into(),
        })
    }

    /// This node's own public URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    pub fn is_self(&self, url: &str) -> bool {
        url == self.node_url
    }

    /// POST a JSON body to `url`, failing on transport errors and non-2xx.
    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<(), PeerError> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| PeerError::Request(url.to_string(), e))?;
        if !resp.status().is_success() {
            return Err(PeerError::Status(url.to_string(), resp.status()));
        }
        Ok(())
    }

    /// Fire-and-forget `body` to `path` on every peer except this node.
    /// Each dispatch runs on its own task; failures are only logged.
    pub fn broadcast<T: Serialize + ?Sized>(&self, peers: &[String], path: &str, body: &T) {
        let payload = match serde_json::to_value(body) {
            Ok(v) => v,
            Err(e) => {
                warn!("broadcast {path} - could not encode payload: {e}");
                return;
            }
        };

        for peer in peers.iter().filter(|p| !self.is_self(p)) {
            let this = self.clone();
            let url = format!("{peer}{path}");
            let payload = payload.clone();
            actix_web::rt::spawn(async move {
                match this.post_json(&url, &payload).await {
                    Ok(()) => debug!("broadcast - delivered to {url}"),
                    Err(e) => warn!("broadcast - {e}"),
                }
            });
        }
    }

    /// Download a peer's full snapshot.
    pub async fn fetch_chain(&self, peer: &str) -> Result<Blockchain, PeerError> {
        let url = format!("{peer}{BLOCKCHAIN_PATH}");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PeerError::Request(url.clone(), e))?;
        if !resp.status().is_success() {
            return Err(PeerError::Status(url, resp.status()));
        }
        resp.json::<Blockchain>()
            .await
            .map_err(|e| PeerError::Decode(url, e))
    }

    /// Fetch every peer's snapshot concurrently. Peers that fail or answer
    /// with garbage are logged and left out.
    pub async fn fetch_chains(&self, peers: &[String]) -> Vec<Blockchain> {
        let fetches = peers
            .iter()
            .filter(|p| !self.is_self(p))
            .map(|peer| self.fetch_chain(peer));

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|res| match res {
                Ok(bc) => Some(bc),
                Err(e) => {
                    warn!("consensus - {e}");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::time::Duration;

    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use serde_json::{Value, json};

    type Inbox = Mutex<Vec<(String, Value)>>;

    /// A peer node on an ephemeral port. Serves a fixed body on
    /// `GET /blockchain` and records every other request's path and JSON body.
    pub struct MockPeer {
        pub url: String,
        inbox: web::Data<Inbox>,
    }

    async fn serve_snapshot(snapshot: web::Data<String>) -> HttpResponse {
        HttpResponse::Ok()
            .content_type("application/json")
            .body(snapshot.get_ref().clone())
    }

    async fn record(req: HttpRequest, body: web::Bytes, inbox: web::Data<Inbox>) -> HttpResponse {
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        inbox
            .lock()
            .unwrap()
            .push((req.path().to_string(), value));
        HttpResponse::Ok().json(json!({ "note": "ok" }))
    }

    impl MockPeer {
        pub fn start(snapshot: impl Into<String>) -> Self {
            let inbox: web::Data<Inbox> = web::Data::new(Mutex::new(Vec::new()));
            let snapshot = web::Data::new(snapshot.into());
            let app_inbox = inbox.clone();
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(app_inbox.clone())
                    .app_data(snapshot.clone())
                    .route("/blockchain", web::get().to(serve_snapshot))
                    .default_service(web::to(record))
            })
            .workers(1)
            .bind(("127.0.0.1", 0))
            .expect("bind mock peer");
            let addr = server.addrs()[0];
            actix_web::rt::spawn(server.run());
            Self {
                url: format!("http://{addr}"),
                inbox,
            }
        }

        /// Wait until at least `n` requests arrived, then return them all.
        pub async fn received(&self, n: usize) -> Vec<(String, Value)> {
            for _ in 0..100 {
                {
                    let inbox = self.inbox.lock().unwrap();
                    if inbox.len() >= n {
                        return inbox.clone();
                    }
                }
                actix_web::rt::time::sleep(Duration::from_millis(50)).await;
            }
            self.inbox.lock().unwrap().clone()
        }
    }
}
