//! Move definitions and the per-category movepool.
//!
//! Moves are immutable data. A creature's active set is the subset of its
//! movepool with `learned_at_level <= level`, re-filtered on every level-up.

use super::TokenCategory;
use serde::{Deserialize, Serialize};

/// Broad move behavior class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Attack,
    Special,
    Defend,
    Status,
}

impl MoveCategory {
    /// True for moves that roll damage against the opponent.
    pub fn is_offensive(&self) -> bool {
        matches!(self, MoveCategory::Attack | MoveCategory::Special)
    }
}

/// What an optional secondary effect does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Damage,
    Heal,
    Buff,
    Debuff,
    Status,
}

/// Which side an effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectTarget {
    User,
    Opponent,
}

/// Stat touched by a buff/debuff effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectStat {
    Attack,
    Defense,
    Speed,
}

/// Optional secondary effect of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEffect {
    pub kind: EffectKind,
    /// Magnitude interpretation depends on kind: heal = percent of max
    /// health, buff/debuff = percent applied to the temporary stat.
    pub magnitude: i64,
    pub target: EffectTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat: Option<EffectStat>,
}

/// Immutable move definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub id: String,
    pub name: String,
    pub category: MoveCategory,
    pub power: i64,
    /// Hit chance in [0, 100].
    pub accuracy: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<MoveEffect>,
    pub learned_at_level: i64,
}

impl Move {
    fn attack(id: &str, name: &str, power: i64, accuracy: i64, learned_at_level: i64) -> Self {
        Move {
            id: id.to_string(),
            name: name.to_string(),
            category: MoveCategory::Attack,
            power,
            accuracy,
            effect: None,
            learned_at_level,
        }
    }

    fn special(id: &str, name: &str, power: i64, accuracy: i64, learned_at_level: i64) -> Self {
        Move {
            id: id.to_string(),
            name: name.to_string(),
            category: MoveCategory::Special,
            power,
            accuracy,
            effect: None,
            learned_at_level,
        }
    }

    fn defend(id: &str, name: &str, learned_at_level: i64) -> Self {
        Move {
            id: id.to_string(),
            name: name.to_string(),
            category: MoveCategory::Defend,
            power: 0,
            accuracy: 100,
            effect: Some(MoveEffect {
                kind: EffectKind::Buff,
                magnitude: 50,
                target: EffectTarget::User,
                stat: Some(EffectStat::Defense),
            }),
            learned_at_level,
        }
    }

    fn heal_status(id: &str, name: &str, magnitude: i64, learned_at_level: i64) -> Self {
        Move {
            id: id.to_string(),
            name: name.to_string(),
            category: MoveCategory::Status,
            power: 0,
            accuracy: 100,
            effect: Some(MoveEffect {
                kind: EffectKind::Heal,
                magnitude,
                target: EffectTarget::User,
                stat: None,
            }),
            learned_at_level,
        }
    }
}

/// Full movepool for a token category, ordered by learn level.
///
/// Every category shares a basic opener so a level-1 creature always has at
/// least one offensive move; the rest is category flavor.
pub fn movepool_for_category(category: TokenCategory) -> Vec<Move> {
    let mut pool = vec![
        Move::attack("tackle", "Tackle", 35, 95, 1),
        Move::defend("hodl", "HODL", 5),
        Move::heal_status("rebase", "Rebase", 25, 12),
    ];

    let flavor = match category {
        TokenCategory::Meme => vec![
            Move::attack("shill", "Shill Storm", 50, 90, 7),
            Move::special("moonshot", "Moonshot", 80, 70, 16),
            Move::special("rug-threat", "Rug Threat", 95, 60, 28),
        ],
        TokenCategory::Layer1 => vec![
            Move::attack("finality", "Finality Slam", 55, 90, 8),
            Move::special("fork-bomb", "Fork Bomb", 75, 80, 18),
            Move::defend("checkpoint", "Checkpoint", 24),
        ],
        TokenCategory::Layer2 => vec![
            Move::attack("rollup", "Rollup Rush", 45, 95, 7),
            Move::special("zk-proof", "ZK Burst", 70, 85, 17),
            Move::special("batch-settle", "Batch Settle", 85, 75, 30),
        ],
        TokenCategory::Defi => vec![
            Move::attack("liquidate", "Liquidate", 50, 90, 8),
            Move::heal_status("compound", "Compound Yield", 35, 14),
            Move::special("flash-loan", "Flash Loan", 85, 70, 26),
        ],
        TokenCategory::Exchange => vec![
            Move::attack("listing", "Listing Pump", 50, 90, 7),
            Move::special("delist", "Delist", 90, 65, 24),
            Move::defend("cold-storage", "Cold Storage", 15),
        ],
        TokenCategory::Governance => vec![
            Move::attack("proposal", "Hostile Proposal", 45, 95, 8),
            Move::defend("quorum", "Quorum Wall", 14),
            Move::special("veto", "Veto", 80, 75, 25),
        ],
        TokenCategory::Wrapped => vec![
            Move::attack("peg-snap", "Peg Snap", 45, 95, 7),
            Move::heal_status("re-peg", "Re-Peg", 30, 13),
            Move::special("unwrap", "Unwrap", 75, 80, 22),
        ],
        TokenCategory::Unknown => vec![
            Move::attack("dust", "Dust Attack", 45, 90, 9),
            Move::special("obscure", "Obscure Pump", 70, 75, 20),
        ],
    };

    pool.extend(flavor);
    pool.sort_by_key(|m| m.learned_at_level);
    pool
}
