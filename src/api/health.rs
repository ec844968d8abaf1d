use actix_web::{HttpResponse, get, web};

use super::models::{AppState, HealthResponse};
use crate::error::ApiError;

/// Liveness plus a short summary of this node's view of the network.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let bc = state.chain()?;
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        node_url: state.peers.node_url().to_string(),
        chain_length: bc.len(),
        pending_bets: bc.pending_bets.len(),
        peers: bc.network_nodes.len(),
        mining: state.is_mining(),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::api::{init_routes, testing};
    use crate::blockchain::testing::{bet, chain_of};

    #[actix_web::test]
    async fn reports_node_view() {
        let mut bc = chain_of(3, "alice", 1);
        bc.register_bet(bet("bob", "m9", 1, 1));
        bc.register_node("http://peer-a");
        let state = testing::state(bc);
        let app = test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;
        let _slot = state.start_mining().unwrap();

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "status": "ok",
                "node_url": testing::NODE_URL,
                "chain_length": 3,
                "pending_bets": 1,
                "peers": 1,
                "mining": true,
            })
        );
    }
}
