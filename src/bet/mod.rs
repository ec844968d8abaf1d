pub mod model;

pub use model::{Bet, BetRequest};
