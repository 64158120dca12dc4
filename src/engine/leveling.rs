//! Leveling engine: peak-gain level curve and stat derivation.
//!
//! Level is a monotonic step function of the high-water gain only, so a
//! creature's level can never fall; price drops degrade health instead.

use crate::config::BalanceConfig;
use crate::domain::{
    movepool_for_category, CapturedCreature, Price, ProgressionEventKind, Stats, TimeMs,
    TokenCategory,
};

pub const MIN_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = 100;

/// Per-category base stat block at level 1.
///
/// Meme tokens hit hard and fast but fold under pressure; wrapped and
/// governance tokens tank; the rest sit in between.
fn base_stats(category: TokenCategory) -> Stats {
    match category {
        TokenCategory::Meme => Stats {
            attack: 14,
            defense: 6,
            speed: 12,
            hp: 45,
        },
        TokenCategory::Layer1 => Stats {
            attack: 10,
            defense: 12,
            speed: 8,
            hp: 55,
        },
        TokenCategory::Layer2 => Stats {
            attack: 9,
            defense: 9,
            speed: 13,
            hp: 48,
        },
        TokenCategory::Defi => Stats {
            attack: 8,
            defense: 12,
            speed: 9,
            hp: 52,
        },
        TokenCategory::Exchange => Stats {
            attack: 11,
            defense: 10,
            speed: 9,
            hp: 50,
        },
        TokenCategory::Governance => Stats {
            attack: 8,
            defense: 13,
            speed: 8,
            hp: 52,
        },
        TokenCategory::Wrapped => Stats {
            attack: 7,
            defense: 14,
            speed: 7,
            hp: 55,
        },
        TokenCategory::Unknown => Stats {
            attack: 9,
            defense: 9,
            speed: 9,
            hp: 50,
        },
    }
}

/// Derives levels, stats and max health from peak gain and category.
#[derive(Debug, Clone)]
pub struct LevelingEngine {
    balance: BalanceConfig,
}

impl LevelingEngine {
    pub fn new(balance: BalanceConfig) -> Self {
        LevelingEngine { balance }
    }

    /// Map a peak-gain ratio to a level in [1, 100].
    ///
    /// Non-positive gain (including invalid purchase prices, which yield a
    /// zero gain upstream) clamps to level 1.
    pub fn level_for_gain(&self, max_gain: Price) -> i64 {
        if !max_gain.is_positive() {
            return MIN_LEVEL;
        }
        let steps = (max_gain / self.balance.gain_per_level).floor_i64();
        (MIN_LEVEL + steps).clamp(MIN_LEVEL, MAX_LEVEL)
    }

    /// Stat block at a level: category base plus linear per-level growth.
    pub fn stats_for_level(&self, level: i64, category: TokenCategory) -> Stats {
        let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        let base = base_stats(category);
        let steps = level - MIN_LEVEL;
        Stats {
            attack: base.attack + steps * self.balance.attack_per_level,
            defense: base.defense + steps * self.balance.defense_per_level,
            speed: base.speed + steps * self.balance.speed_per_level,
            hp: base.hp + steps * self.balance.hp_per_level,
        }
    }

    /// Max health at a level; equal to the derived hp stat.
    pub fn max_health_for_level(&self, level: i64, category: TokenCategory) -> i64 {
        self.stats_for_level(level, category).hp
    }

    /// Raise a creature to `new_level`: recompute stats and max health,
    /// grow current health by the max-health delta (clamped, never reduced),
    /// re-filter the active move set and log the event.
    ///
    /// A knocked-out creature keeps health 0 until explicitly revived, so
    /// the knocked-out invariant survives level-ups.
    pub fn apply_level_up(&self, creature: &mut CapturedCreature, new_level: i64, at: TimeMs) {
        let new_level = new_level.clamp(MIN_LEVEL, MAX_LEVEL);
        if new_level <= creature.level {
            return;
        }

        let old_level = creature.level;
        let old_max = creature.max_health;
        creature.level = new_level;
        creature.max_level_reached = creature.max_level_reached.max(new_level);
        creature.stats = self.stats_for_level(new_level, creature.category);
        creature.max_health = creature.stats.hp;

        if !creature.knocked_out {
            let delta = (creature.max_health - old_max).max(0);
            creature.health = (creature.health + delta).min(creature.max_health);
        }

        creature.moves = movepool_for_category(creature.category)
            .into_iter()
            .filter(|m| m.learned_at_level <= new_level)
            .collect();

        creature.log_event(
            ProgressionEventKind::LevelUp,
            at,
            format!("level {} -> {}", old_level, new_level),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LevelingEngine {
        LevelingEngine::new(BalanceConfig::default())
    }

    fn p(s: &str) -> Price {
        Price::parse(s).unwrap()
    }

    #[test]
    fn test_level_for_gain_clamps_low() {
        let engine = engine();
        assert_eq!(engine.level_for_gain(Price::zero()), 1);
        assert_eq!(engine.level_for_gain(p("-0.5")), 1);
        assert_eq!(engine.level_for_gain(p("0.05")), 1);
    }

    #[test]
    fn test_level_for_gain_steps() {
        let engine = engine();
        // Default curve: one level per 10% of peak gain.
        assert_eq!(engine.level_for_gain(p("0.1")), 2);
        assert_eq!(engine.level_for_gain(p("1.5")), 16);
        assert_eq!(engine.level_for_gain(p("0.19")), 2);
    }

    #[test]
    fn test_level_for_gain_clamps_high() {
        let engine = engine();
        assert_eq!(engine.level_for_gain(p("1000")), MAX_LEVEL);
    }

    #[test]
    fn test_level_monotonic_in_gain() {
        let engine = engine();
        let mut last = 0;
        for tenths in 0..200 {
            let gain = Price::from_i64(tenths) / Price::from_i64(10);
            let level = engine.level_for_gain(gain);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn test_stats_scale_linearly() {
        let engine = engine();
        let l1 = engine.stats_for_level(1, TokenCategory::Meme);
        let l4 = engine.stats_for_level(4, TokenCategory::Meme);
        assert_eq!(l4.attack - l1.attack, 15);
        assert_eq!(l4.defense - l1.defense, 15);
        assert_eq!(l4.speed - l1.speed, 6);
        assert_eq!(l4.hp - l1.hp, 30);
    }

    #[test]
    fn test_meme_flavor() {
        let engine = engine();
        let meme = engine.stats_for_level(1, TokenCategory::Meme);
        let wrapped = engine.stats_for_level(1, TokenCategory::Wrapped);
        assert!(meme.attack > wrapped.attack);
        assert!(meme.speed > wrapped.speed);
        assert!(meme.defense < wrapped.defense);
    }

    #[test]
    fn test_max_health_equals_hp_stat() {
        let engine = engine();
        assert_eq!(
            engine.max_health_for_level(7, TokenCategory::Defi),
            engine.stats_for_level(7, TokenCategory::Defi).hp
        );
    }
}
