mod api;
mod bet;
mod blockchain;
mod config;
mod error;
mod network;

use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use log::info;

use api::AppState;
use blockchain::Blockchain;
use config::Config;
use network::PeerClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    info!(
        "⛓️ Starting bet chain node at http://{}:{} (public url {})",
        config.host, config.port, config.node_url
    );

    let state = web::Data::new(AppState::new(
        Blockchain::new(),
        PeerClient::new(config.node_url.clone(), config.peer_timeout).map_err(std::io::Error::other)?,
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Methods", "GET, POST")),
            )
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
