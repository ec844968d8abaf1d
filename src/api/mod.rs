mod bet;
mod chain;
mod health;
pub mod models;
mod node;

use actix_web::web::{self, ServiceConfig};

use crate::error::ApiError;

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::Malformed(err.to_string()).into()),
    )
    .service(health::health_check)
    .service(chain::get_blockchain)
    .service(chain::mine)
    .service(chain::receive_new_block)
    .service(chain::consensus)
    .service(bet::post_bet)
    .service(bet::broadcast_bet)
    .service(bet::bets_for_match)
    .service(bet::bets_for_player)
    .service(node::register_node)
    .service(node::register_and_broadcast_node)
    .service(node::register_nodes_bulk);
}
