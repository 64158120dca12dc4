//! Pure computation engines for deterministic game logic.

pub mod battle;
pub mod damage;
pub mod gain;
pub mod leveling;

pub use battle::{
    Badge, BattleEvent, BattleInitError, BattleKind, BattlePhase, BattleSession, BattleSide,
    Participant, Rewards,
};
pub use damage::{
    battle_damage, healing, health_status, price_damage, revival_cost, revive_health,
    AttackOutcome, HealthStatus,
};
pub use gain::{GainTracker, PriceUpdateOutcome};
pub use leveling::{LevelingEngine, MAX_LEVEL, MIN_LEVEL};
