use actix_web::{HttpResponse, get, post, web};
use log::{debug, info};

use super::models::{AppState, NoteResponse};
use crate::bet::{Bet, BetRequest};
use crate::error::ApiError;
use crate::network::BET_PATH;

/// Validate a submitted bet and queue it in the pending pool.
fn queue_bet(state: &AppState, req: &BetRequest) -> Result<(Bet, Vec<String>), ApiError> {
    let bet = req.validate().map_err(ApiError::Validation)?;
    let mut bc = state.chain()?;
    bc.register_bet(bet.clone());
    debug!(
        "bet - {} on {} ({}-{}) queued, pending={}",
        bet.player_name,
        bet.match_id,
        bet.team_one_score,
        bet.team_two_score,
        bc.pending_bets.len()
    );
    Ok((bet, bc.network_nodes.clone()))
}

/// Submit a bet to this node only.
#[post("/bet")]
pub async fn post_bet(
    state: web::Data<AppState>,
    body: web::Json<BetRequest>,
) -> Result<HttpResponse, ApiError> {
    queue_bet(&state, &body)?;
    Ok(HttpResponse::Created().json(NoteResponse {
        note: "Bet created successfully.",
    }))
}

/// Submit a bet locally, then relay it to every peer.
#[post("/bet/broadcast")]
pub async fn broadcast_bet(
    state: web::Data<AppState>,
    body: web::Json<BetRequest>,
) -> Result<HttpResponse, ApiError> {
    let (bet, peers) = queue_bet(&state, &body)?;
    state.peers.broadcast(&peers, BET_PATH, &bet);
    info!("bet - relayed bet on {} to {} peer(s)", bet.match_id, peers.len());
    Ok(HttpResponse::Created().json(NoteResponse {
        note: "Bet created and broadcast successfully.",
    }))
}

/// All mined bets for a match.
#[get("/match/{match_id}")]
pub async fn bets_for_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let bets = state.chain()?.bets_for_match(&path.into_inner());
    Ok(HttpResponse::Ok().json(bets))
}

/// All mined bets placed by a player.
#[get("/player/{player_name}")]
pub async fn bets_for_player(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let bets = state.chain()?.bets_for_player(&path.into_inner());
    Ok(HttpResponse::Ok().json(bets))
}
