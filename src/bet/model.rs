use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// A single bet on a match outcome. Immutable once accepted.
///
/// Field order matters: it is the order used when block data is
/// serialized for hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    #[serde(rename = "playername")]
    pub player_name: String,
    #[serde(rename = "matchid")]
    pub match_id: String,
    #[serde(rename = "teamonescore")]
    pub team_one_score: u32,
    #[serde(rename = "teamtwoscore")]
    pub team_two_score: u32,
}

/// Bet as submitted by a client, before validation.
///
/// Every field is optional so that a missing field is reported as a
/// validation failure rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetRequest {
    #[serde(rename = "playername")]
    pub player_name: Option<String>,
    #[serde(rename = "matchid")]
    pub match_id: Option<String>,
    #[serde(rename = "teamonescore")]
    pub team_one_score: Option<i64>,
    #[serde(rename = "teamtwoscore")]
    pub team_two_score: Option<i64>,
}

impl BetRequest {
    /// Check every field and either build a `Bet` or return all violations.
    ///
    /// Scores follow the literal "required, min 0" rule: a zero score is
    /// treated as absent and rejected as `required`.
    pub fn validate(&self) -> Result<Bet, Vec<FieldError>> {
        let mut errors = Vec::new();

        let player_name = required_text("playername", &self.player_name, &mut errors);
        let match_id = required_text("matchid", &self.match_id, &mut errors);
        let team_one_score = required_score("teamonescore", self.team_one_score, &mut errors);
        let team_two_score = required_score("teamtwoscore", self.team_two_score, &mut errors);

        match (player_name, match_id, team_one_score, team_two_score) {
            (Some(player_name), Some(match_id), Some(team_one_score), Some(team_two_score))
                if errors.is_empty() =>
            {
                Ok(Bet {
                    player_name,
                    match_id,
                    team_one_score,
                    team_two_score,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(
    field: &'static str,
    value: &Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v.clone()),
        _ => {
            errors.push(FieldError::new(field, "required"));
            None
        }
    }
}

fn required_score(
    field: &'static str,
    value: Option<i64>,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    match value {
        None | Some(0) => {
            errors.push(FieldError::new(field, "required"));
            None
        }
        Some(v) if v < 0 => {
            errors.push(FieldError::new(field, "min"));
            None
        }
        Some(v) => match u32::try_from(v) {
            Ok(score) => Some(score),
            Err(_) => {
                errors.push(FieldError::new(field, "max"));
                None
            }
        },
    }
}
