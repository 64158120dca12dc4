//! Price/gain tracker: folds a price observation into creature state.
//!
//! Ordering per tick is fixed: peak update, then retracement damage, then
//! the level check. All mutations for one observation land together with at
//! most one log entry per triggered event.

use crate::config::BalanceConfig;
use crate::domain::{CapturedCreature, Price, ProgressionEventKind, TimeMs};
use crate::engine::damage::price_damage;
use crate::engine::leveling::LevelingEngine;

/// Outcome of applying one price observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceUpdateOutcome {
    pub leveled_up: bool,
    pub damage_applied: i64,
}

/// Applies price observations to creatures, delegating level math to the
/// leveling engine it is constructed with.
#[derive(Debug, Clone)]
pub struct GainTracker {
    leveling: LevelingEngine,
    balance: BalanceConfig,
}

impl GainTracker {
    pub fn new(leveling: LevelingEngine, balance: BalanceConfig) -> Self {
        GainTracker { leveling, balance }
    }

    /// Fold one observed price into the creature.
    ///
    /// Non-positive prices are rejected as a no-op. Otherwise the peak is
    /// raised to `max(peak, new_price)` before any damage or level math,
    /// the observation is appended to the bounded history, retracement
    /// damage is assessed off the (possibly just-raised) peak, and finally
    /// the level check runs against the high-water gain.
    pub fn apply_price_update(
        &self,
        creature: &mut CapturedCreature,
        new_price: Price,
        at: TimeMs,
    ) -> PriceUpdateOutcome {
        if !new_price.is_positive() {
            return PriceUpdateOutcome::default();
        }

        creature.peak_price = creature.peak_price.max(new_price);
        creature.current_price = new_price;
        creature.push_price_point(new_price, at);

        let peak_gain = creature.peak_price.gain_over(creature.purchase_price);
        creature.max_gain = peak_gain.max(Price::zero());

        let mut outcome = PriceUpdateOutcome::default();

        let damage = price_damage(
            creature.purchase_price,
            creature.peak_price,
            creature.current_price,
            creature.max_health,
            self.balance.retrace_damage_divisor,
        );
        if damage > 0 && !creature.knocked_out {
            let applied = creature.apply_damage(damage);
            if applied > 0 {
                outcome.damage_applied = applied;
                creature.log_event(
                    ProgressionEventKind::DamageTaken,
                    at,
                    format!("retracement -{} hp", applied),
                );
            }
        }

        let new_level = self.leveling.level_for_gain(creature.max_gain);
        if new_level > creature.level {
            self.leveling.apply_level_up(creature, new_level, at);
            outcome.leveled_up = true;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Stats, Symbol, TokenAddress, TokenCategory};
    use std::collections::VecDeque;
    use uuid::Uuid;

    fn p(s: &str) -> Price {
        Price::parse(s).unwrap()
    }

    fn tracker() -> GainTracker {
        let balance = BalanceConfig::default();
        GainTracker::new(LevelingEngine::new(balance.clone()), balance)
    }

    fn creature(purchase: &str) -> CapturedCreature {
        let engine = LevelingEngine::new(BalanceConfig::default());
        let stats = engine.stats_for_level(1, TokenCategory::Meme);
        CapturedCreature {
            instance_id: Uuid::new_v4(),
            symbol: Symbol::new("PEPE"),
            name: "Pepe".to_string(),
            address: TokenAddress::new("0xpepe"),
            category: TokenCategory::Meme,
            captured_at: TimeMs::new(0),
            purchase_price: p(purchase),
            current_price: p(purchase),
            peak_price: p(purchase),
            max_gain: Price::zero(),
            level: 1,
            max_level_reached: 1,
            health: stats.hp,
            max_health: stats.hp,
            knocked_out: false,
            stats,
            moves: Vec::new(),
            price_history: VecDeque::new(),
            progression_log: Vec::new(),
        }
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let tracker = tracker();
        let mut c = creature("100");
        let before = c.clone();

        assert_eq!(
            tracker.apply_price_update(&mut c, Price::zero(), TimeMs::new(1)),
            PriceUpdateOutcome::default()
        );
        assert_eq!(
            tracker.apply_price_update(&mut c, p("-5"), TimeMs::new(1)),
            PriceUpdateOutcome::default()
        );
        assert_eq!(c, before);
    }

    #[test]
    fn test_peak_monotonic_over_updates() {
        let tracker = tracker();
        let mut c = creature("100");
        let prices = ["120", "90", "300", "150", "299", "10"];
        let mut last_peak = c.peak_price;
        for (i, s) in prices.iter().enumerate() {
            tracker.apply_price_update(&mut c, p(s), TimeMs::new(i as i64));
            assert!(c.peak_price >= last_peak);
            last_peak = c.peak_price;
        }
        assert_eq!(c.peak_price, p("300"));
    }

    #[test]
    fn test_level_never_decreases_on_drop() {
        let tracker = tracker();
        let mut c = creature("100");

        let up = tracker.apply_price_update(&mut c, p("250"), TimeMs::new(1));
        assert!(up.leveled_up);
        let level_at_peak = c.level;

        let down = tracker.apply_price_update(&mut c, p("120"), TimeMs::new(2));
        assert!(!down.leveled_up);
        assert_eq!(c.level, level_at_peak);
    }

    #[test]
    fn test_rise_then_retrace_scenario() {
        // Purchase 100, peak 250, drop to 150: max gain 1.5, 40% retrace,
        // damage = 20% of max health.
        let tracker = tracker();
        let mut c = creature("100");

        let up = tracker.apply_price_update(&mut c, p("250"), TimeMs::new(1));
        assert!(up.leveled_up);
        assert_eq!(up.damage_applied, 0);
        assert_eq!(c.max_gain, p("1.5"));
        assert_eq!(c.level, 16);
        assert_eq!(c.health, c.max_health);

        let max_before_drop = c.max_health;
        let down = tracker.apply_price_update(&mut c, p("150"), TimeMs::new(2));
        assert!(!down.leveled_up);
        assert_eq!(down.damage_applied, max_before_drop * 20 / 100);
        assert_eq!(c.health, c.max_health - down.damage_applied);
        assert!(!c.knocked_out);
    }

    #[test]
    fn test_no_damage_at_new_peak() {
        let tracker = tracker();
        let mut c = creature("100");
        let outcome = tracker.apply_price_update(&mut c, p("500"), TimeMs::new(1));
        assert_eq!(outcome.damage_applied, 0);
    }

    #[test]
    fn test_single_log_entry_per_event() {
        let tracker = tracker();
        let mut c = creature("100");

        tracker.apply_price_update(&mut c, p("250"), TimeMs::new(1));
        let level_ups = c
            .progression_log
            .iter()
            .filter(|e| e.kind == ProgressionEventKind::LevelUp)
            .count();
        assert_eq!(level_ups, 1);

        tracker.apply_price_update(&mut c, p("150"), TimeMs::new(2));
        let damages = c
            .progression_log
            .iter()
            .filter(|e| e.kind == ProgressionEventKind::DamageTaken)
            .count();
        assert_eq!(damages, 1);
    }

    #[test]
    fn test_invalid_purchase_price_clamps_to_level_one() {
        let tracker = tracker();
        let mut c = creature("100");
        c.purchase_price = Price::zero();

        let outcome = tracker.apply_price_update(&mut c, p("500"), TimeMs::new(1));
        assert!(!outcome.leveled_up);
        assert_eq!(outcome.damage_applied, 0);
        assert_eq!(c.level, 1);
        assert_eq!(c.max_gain, Price::zero());
    }

    #[test]
    fn test_level_up_refreshes_move_set() {
        let tracker = tracker();
        let mut c = creature("100");
        assert!(c.moves.is_empty());

        tracker.apply_price_update(&mut c, p("250"), TimeMs::new(1));
        assert!(c.moves.iter().all(|m| m.learned_at_level <= c.level));
        // Level 16 meme creature has learned the level-7 and level-16 moves.
        assert!(c.moves.iter().any(|m| m.id == "shill"));
        assert!(c.moves.iter().any(|m| m.id == "moonshot"));
        assert!(!c.moves.iter().any(|m| m.id == "rug-threat"));
    }

    #[test]
    fn test_health_bounds_hold_across_random_walk() {
        let tracker = tracker();
        let mut c = creature("100");
        let walk = [
            "150", "80", "400", "200", "90", "410", "50", "500", "30", "600",
        ];
        for (i, s) in walk.iter().enumerate() {
            tracker.apply_price_update(&mut c, p(s), TimeMs::new(i as i64));
            assert!(c.health >= 0 && c.health <= c.max_health);
            assert_eq!(c.knocked_out, c.health == 0);
        }
    }
}
