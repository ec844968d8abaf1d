use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use actix_web::{HttpResponse, get, post, web};
use log::{debug, info, warn};

use super::models::{AbortOnDrop, AppState, ConsensusResponse, MineResponse, ReceiveBlockResponse};
use crate::blockchain::{AppendOutcome, Block};
use crate::error::ApiError;
use crate::network::RECEIVE_BLOCK_PATH;

/// Full snapshot: chain, pending bets and known peers.
#[get("/blockchain")]
pub async fn get_blockchain(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let bc = state.chain()?;
    Ok(HttpResponse::Ok().json(&*bc))
}

/// Mine the pending bets into a new block and push it to peers:
/// - snapshot tip + pending pool under the lock
/// - search the nonce on the blocking pool, lock released
/// - re-lock and append only if the tip did not move
///
/// The mining slot travels with the search, so it is held until the search
/// has actually stopped. Dropping the request aborts the search.
#[post("/mine")]
pub async fn mine(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let slot = state.start_mining()?;

    let (template, difficulty) = {
        let bc = state.chain()?;
        (bc.mining_template(), bc.difficulty())
    };
    debug!(
        "MINER - mining block #{} with {} bet(s) at difficulty {}",
        template.index,
        template.bets.len(),
        difficulty
    );

    let abort = Arc::new(AtomicBool::new(false));
    let _abort_on_drop = AbortOnDrop(Arc::clone(&abort));

    let t0 = Instant::now();
    let (template, proof, slot) = web::block(move || {
        let proof = template.solve(difficulty, &abort);
        if proof.is_none() {
            debug!("MINER - search for block #{} aborted", template.index);
        }
        (template, proof, slot)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    let proof = proof.ok_or_else(|| ApiError::Internal("nonce search gave up".into()))?;

    let (block, peers) = {
        let mut bc = state.chain()?;
        let block = bc.seal_block(&template, proof).inspect_err(|e| warn!("MINER - {e}"))?;
        (block, bc.network_nodes.clone())
    };
    drop(slot);
    info!(
        "MINER - sealed block #{} (hash={}, nonce={}) in {} ms",
        block.index,
        block.hash,
        block.nonce,
        t0.elapsed().as_millis()
    );

    state.peers.broadcast(&peers, RECEIVE_BLOCK_PATH, &block);

    Ok(HttpResponse::Ok().json(MineResponse {
        note: "New block mined and broadcast successfully.",
        block,
    }))
}

/// Accept a block mined by a peer if it extends our tip. A rejection is a
/// normal outcome reported in the body, not an HTTP error.
#[post("/receive-new-block")]
pub async fn receive_new_block(
    state: web::Data<AppState>,
    body: web::Json<Block>,
) -> Result<HttpResponse, ApiError> {
    let block = body.into_inner();
    let index = block.index;
    let outcome = state.chain()?.try_append(block);

    let resp = match outcome {
        AppendOutcome::Accepted => {
            info!("peer block #{index} accepted");
            ReceiveBlockResponse {
                note: "New Block received and accepted.",
                accepted: true,
                reason: None,
            }
        }
        AppendOutcome::Rejected(reason) => {
            warn!("peer block #{index} rejected: {reason}");
            ReceiveBlockResponse {
                note: "New Block rejected.",
                accepted: false,
                reason: Some(reason.to_string()),
            }
        }
    };
    Ok(HttpResponse::Ok().json(resp))
}

/// Pull every peer's chain and adopt the longest valid one if it is
/// strictly longer than ours.
#[get("/consensus")]
pub async fn consensus(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let peers = state.chain()?.network_nodes.clone();
    let candidates = state.peers.fetch_chains(&peers).await;
    debug!(
        "consensus - {} of {} peer(s) answered",
        candidates.len(),
        peers.len()
    );

    let outcome = state.chain()?.resolve(candidates);
    let note = if outcome.replaced() {
        "This chain has been replaced."
    } else {
        "This chain has not been replaced."
    };
    Ok(HttpResponse::Ok().json(ConsensusResponse {
        note,
        replaced: outcome.replaced(),
        length: outcome.length(),
    }))
}
