//! Static gym rosters and synthetic opponent instantiation.

use crate::domain::{
    movepool_for_category, CapturedCreature, Price, Symbol, TimeMs, TokenAddress, TokenCategory,
};
use crate::engine::leveling::LevelingEngine;
use std::collections::VecDeque;
use uuid::Uuid;

/// One predefined opponent in a gym roster.
#[derive(Debug, Clone)]
pub struct GymMember {
    pub symbol: &'static str,
    pub name: &'static str,
    pub category: TokenCategory,
    pub level: i64,
}

/// A themed gym: ordered team, unique badge on first win.
#[derive(Debug, Clone)]
pub struct Gym {
    pub id: &'static str,
    pub name: &'static str,
    pub badge_id: &'static str,
    pub team: Vec<GymMember>,
}

/// Look up a gym by id. None for unknown ids.
pub fn gym_by_id(id: &str) -> Option<Gym> {
    roster().into_iter().find(|g| g.id == id)
}

/// All defined gyms, in progression order.
pub fn roster() -> Vec<Gym> {
    vec![
        Gym {
            id: "gym1",
            name: "Genesis Gym",
            badge_id: "genesis-badge",
            team: vec![GymMember {
                symbol: "GEN",
                name: "Genesion",
                category: TokenCategory::Layer1,
                level: 5,
            }],
        },
        Gym {
            id: "gym2",
            name: "Liquidity Gym",
            badge_id: "liquidity-badge",
            team: vec![
                GymMember {
                    symbol: "POOL",
                    name: "Poolvyrn",
                    category: TokenCategory::Defi,
                    level: 9,
                },
                GymMember {
                    symbol: "VAULT",
                    name: "Vaultodon",
                    category: TokenCategory::Defi,
                    level: 12,
                },
            ],
        },
        Gym {
            id: "gym3",
            name: "Degen Gym",
            badge_id: "degen-badge",
            team: vec![
                GymMember {
                    symbol: "WOJK",
                    name: "Wojakka",
                    category: TokenCategory::Meme,
                    level: 15,
                },
                GymMember {
                    symbol: "FOMO",
                    name: "Fomogre",
                    category: TokenCategory::Meme,
                    level: 22,
                },
            ],
        },
    ]
}

/// Build a synthetic creature for a roster member: no real price history,
/// purchase pinned at 1 and current at the member's level, stats derived
/// straight from the leveling engine.
pub fn instantiate_member(gym_id: &str, member: &GymMember, leveling: &LevelingEngine) -> CapturedCreature {
    synthetic_creature(
        member.symbol,
        member.name,
        TokenAddress::new(format!("gym:{}:{}", gym_id, member.symbol)),
        member.category,
        member.level,
        leveling,
    )
}

/// Shared builder for opponents that were never captured (gym rosters,
/// wild spawns). Fully healed, moves filtered to the given level.
pub fn synthetic_creature(
    symbol: &str,
    name: &str,
    address: TokenAddress,
    category: TokenCategory,
    level: i64,
    leveling: &LevelingEngine,
) -> CapturedCreature {
    let stats = leveling.stats_for_level(level, category);
    let moves = movepool_for_category(category)
        .into_iter()
        .filter(|m| m.learned_at_level <= level)
        .collect();

    CapturedCreature {
        instance_id: Uuid::new_v4(),
        symbol: Symbol::new(symbol),
        name: name.to_string(),
        address,
        category,
        captured_at: TimeMs::now(),
        purchase_price: Price::one(),
        current_price: Price::from_i64(level),
        peak_price: Price::from_i64(level),
        max_gain: Price::zero(),
        level,
        max_level_reached: level,
        health: stats.hp,
        max_health: stats.hp,
        knocked_out: false,
        stats,
        moves,
        price_history: VecDeque::new(),
        progression_log: Vec::new(),
    }
}
