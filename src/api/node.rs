use actix_web::{HttpResponse, post, web};
use log::info;

use super::models::{AppState, NoteResponse, RegisterNodeRequest};
use crate::error::{ApiError, FieldError};
use crate::network::{REGISTER_BULK_PATH, REGISTER_NODE_PATH};

fn node_url(req: &RegisterNodeRequest) -> Result<String, ApiError> {
    let url = req.new_node_url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "newnodeurl",
            "required",
        )]));
    }
    Ok(url.to_string())
}

/// Register a single peer (sent by the node that accepted it).
#[post("/register-node")]
pub async fn register_node(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let url = node_url(&body)?;
    if !state.peers.is_self(&url) && state.chain()?.register_node(&url) {
        info!("peer registered: {url}");
    }
    Ok(HttpResponse::Ok().json(NoteResponse {
        note: "Node registered successfully.",
    }))
}

/// Register a new peer, announce it to every known peer and hand it the
/// full peer list (including this node).
#[post("/register-and-broadcast-node")]
pub async fn register_and_broadcast_node(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodeRequest>,
) -> Result<HttpResponse, ApiError> {
    let url = node_url(&body)?;
    if state.peers.is_self(&url) {
        return Ok(HttpResponse::Ok().json(NoteResponse {
            note: "Node registered successfully.",
        }));
    }

    let known = {
        let mut bc = state.chain()?;
        bc.register_node(&url);
        bc.network_nodes.clone()
    };

    let others: Vec<String> = known.iter().filter(|n| **n != url).cloned().collect();
    state.peers.broadcast(
        &others,
        REGISTER_NODE_PATH,
        &RegisterNodeRequest {
            new_node_url: url.clone(),
        },
    );

    let mut all = known;
    all.push(state.peers.node_url().to_string());
    state
        .peers
        .broadcast(std::slice::from_ref(&url), REGISTER_BULK_PATH, &all);

    info!("peer {url} registered and announced to {} peer(s)", others.len());
    Ok(HttpResponse::Ok().json(NoteResponse {
        note: "Node registered successfully.",
    }))
}

/// Register every listed peer except this node.
#[post("/register-nodes-bulk")]
pub async fn register_nodes_bulk(
    state: web::Data<AppState>,
    body: web::Json<Vec<String>>,
) -> Result<HttpResponse, ApiError> {
    let own = state.peers.node_url().to_string();
    let added = state
        .chain()?
        .register_nodes(body.iter().map(|u| u.trim_end_matches('/')), &own);
    info!("bulk registration - {added} new peer(s)");
    Ok(HttpResponse::Ok().json(NoteResponse {
        note: "Bulk registration successful.",
    }))
}
