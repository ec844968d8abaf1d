use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Blockchain};
use crate::error::ApiError;
use crate::network::PeerClient;

/// Shared application state: the ledger behind a single lock, the peer
/// client and a flag allowing one mining run at a time.
pub struct AppState {
    blockchain: Mutex<Blockchain>,
    pub peers: PeerClient,
    mining: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(blockchain: Blockchain, peers: PeerClient) -> Self {
        Self {
            blockchain: Mutex::new(blockchain),
            peers,
            mining: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Exclusive access to chain, pending bets and peer registry.
    pub fn chain(&self) -> Result<MutexGuard<'_, Blockchain>, ApiError> {
        self.blockchain
            .lock()
            .map_err(|_| ApiError::Internal("blockchain mutex poisoned".into()))
    }

    /// Claim the mining slot, or fail if another run holds it.
    ///
    /// The slot is owned, so it can travel with the nonce search onto the
    /// blocking pool and stay taken for as long as that search runs.
    pub fn start_mining(&self) -> Result<MiningSlot, ApiError> {
        self.mining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| MiningSlot(Arc::clone(&self.mining)))
            .map_err(|_| ApiError::MiningInProgress)
    }

    pub fn is_mining(&self) -> bool {
        self.mining.load(Ordering::Acquire)
    }
}

/// The node's single mining slot. Released on drop.
#[derive(Debug)]
pub struct MiningSlot(Arc<AtomicBool>);

impl Drop for MiningSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Raises the abort flag of a nonce search when dropped, e.g. when the
/// request that started it goes away.
pub struct AbortOnDrop(pub Arc<AtomicBool>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/* ---------- Generic ---------- */

#[derive(Serialize)]
pub struct NoteResponse {
    pub note: &'static str,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct MineResponse {
    pub note: &'static str,
    pub block: Block,
}

#[derive(Serialize)]
pub struct ReceiveBlockResponse {
    pub note: &'static str,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct ConsensusResponse {
    pub note: &'static str,
    pub replaced: bool,
    pub length: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub node_url: String,
    pub chain_length: usize,
    pub pending_bets: usize,
    pub peers: usize,
    pub mining: bool,
}

/* ---------- Node API Models ---------- */

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterNodeRequest {
    #[serde(rename = "newnodeurl", alias = "newNodeUrl")]
    pub new_node_url: String,
}
