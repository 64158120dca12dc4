//! Pure damage, healing and classification functions.
//!
//! Nothing in here mutates state or fails; bad input clamps to zero.

use crate::domain::{EffectKind, EffectTarget, Move, Price, Stats};
use rand::Rng;
use serde::Serialize;

/// Passive damage from price retracement off the peak.
///
/// Zero whenever `current >= peak` or the purchase price is invalid.
/// Otherwise `floor((drop_pct / divisor) / 100 * max_health)`: damage is
/// proportional to the fall from the creature's own high-water mark, not
/// from the purchase price.
pub fn price_damage(
    purchase: Price,
    peak: Price,
    current: Price,
    max_health: i64,
    divisor: i64,
) -> i64 {
    if !purchase.is_positive() || max_health <= 0 || divisor <= 0 {
        return 0;
    }
    let drop_pct = peak.drop_percent_to(current);
    if drop_pct.is_zero() {
        return 0;
    }
    let scaled = drop_pct / Price::from_i64(divisor) / Price::hundred() * Price::from_i64(max_health);
    scaled.floor_i64().max(0)
}

/// Result of one offensive move execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub missed: bool,
    pub damage: i64,
}

impl AttackOutcome {
    fn miss() -> Self {
        AttackOutcome {
            missed: true,
            damage: 0,
        }
    }
}

/// Active battle damage for a move, including the accuracy roll.
///
/// Non-offensive moves deal 0. The roll is an integer in [0, 100):
/// `roll >= accuracy` misses, so accuracy 100 never misses and accuracy 0
/// always does. On a hit, `raw = power*attack/10 - defense/20` floored at 1,
/// scaled by a random factor in [0.9, 1.1] and halved when the defender is
/// defending, truncating to integer at each step.
pub fn battle_damage<R: Rng + ?Sized>(
    attacker: &Stats,
    defender: &Stats,
    mv: &Move,
    defender_defending: bool,
    rng: &mut R,
) -> AttackOutcome {
    if !mv.category.is_offensive() {
        return AttackOutcome {
            missed: false,
            damage: 0,
        };
    }

    let roll = rng.gen_range(0..100);
    if roll >= mv.accuracy {
        return AttackOutcome::miss();
    }

    let raw = (mv.power * attacker.attack / 10 - defender.defense / 20).max(1);
    let factor_pct = rng.gen_range(90..=110);
    let mut damage = raw * factor_pct / 100;
    if defender_defending {
        damage /= 2;
    }

    AttackOutcome {
        missed: false,
        damage: damage.max(0),
    }
}

/// Healing from a defend/status move's heal effect, as a flat amount:
/// `floor(max_health * magnitude / 100)`. Zero for moves without a
/// self-targeted heal effect.
pub fn healing(max_health: i64, mv: &Move) -> i64 {
    match &mv.effect {
        Some(effect)
            if effect.kind == EffectKind::Heal && effect.target == EffectTarget::User =>
        {
            (max_health * effect.magnitude / 100).max(0)
        }
        _ => 0,
    }
}

/// Currency cost to revive a creature of the given level.
pub fn revival_cost(level: i64, cost_per_level: i64) -> i64 {
    (level.max(1)) * cost_per_level
}

/// Health restored by a revive at the given percent of max.
pub fn revive_health(max_health: i64, percent: i64) -> i64 {
    (max_health * percent / 100).max(0)
}

/// Coarse health classification shared by presentation and battle AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Injured,
    BadlyInjured,
    Critical,
    KnockedOut,
}

/// Classify health against max: >=75% healthy, >=50% injured, >=25% badly
/// injured, >0 critical, 0 knocked out.
pub fn health_status(health: i64, max_health: i64) -> HealthStatus {
    if health <= 0 || max_health <= 0 {
        return HealthStatus::KnockedOut;
    }
    let pct = health * 100 / max_health;
    if pct >= 75 {
        HealthStatus::Healthy
    } else if pct >= 50 {
        HealthStatus::Injured
    } else if pct >= 25 {
        HealthStatus::BadlyInjured
    } else {
        HealthStatus::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{movepool_for_category, MoveCategory, TokenCategory};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn p(s: &str) -> Price {
        Price::parse(s).unwrap()
    }

    fn attack_move(power: i64, accuracy: i64) -> Move {
        Move {
            id: "test-attack".to_string(),
            name: "Test Attack".to_string(),
            category: MoveCategory::Attack,
            power,
            accuracy,
            effect: None,
            learned_at_level: 1,
        }
    }

    #[test]
    fn test_price_damage_zero_at_or_above_peak() {
        assert_eq!(price_damage(p("100"), p("250"), p("250"), 100, 2), 0);
        assert_eq!(price_damage(p("100"), p("250"), p("300"), 100, 2), 0);
    }

    #[test]
    fn test_price_damage_retracement() {
        // Peak 250 -> current 150 is a 40% drop; half of that against
        // 100 max health is 20.
        assert_eq!(price_damage(p("100"), p("250"), p("150"), 100, 2), 20);
    }

    #[test]
    fn test_price_damage_invalid_purchase() {
        assert_eq!(price_damage(Price::zero(), p("250"), p("150"), 100, 2), 0);
        assert_eq!(price_damage(p("-5"), p("250"), p("150"), 100, 2), 0);
    }

    #[test]
    fn test_price_damage_floors() {
        // 10% drop / 2 = 5% of 55 = 2.75 -> 2.
        assert_eq!(price_damage(p("100"), p("100"), p("90"), 55, 2), 2);
    }

    #[test]
    fn test_accuracy_100_never_misses() {
        let mut rng = StdRng::seed_from_u64(7);
        let attacker = Stats {
            attack: 25,
            ..Default::default()
        };
        let defender = Stats {
            defense: 20,
            ..Default::default()
        };
        let mv = attack_move(40, 100);
        for _ in 0..200 {
            let outcome = battle_damage(&attacker, &defender, &mv, false, &mut rng);
            assert!(!outcome.missed);
        }
    }

    #[test]
    fn test_accuracy_0_always_misses() {
        let mut rng = StdRng::seed_from_u64(7);
        let attacker = Stats {
            attack: 25,
            ..Default::default()
        };
        let defender = Stats::default();
        let mv = attack_move(40, 0);
        for _ in 0..200 {
            let outcome = battle_damage(&attacker, &defender, &mv, false, &mut rng);
            assert!(outcome.missed);
            assert_eq!(outcome.damage, 0);
        }
    }

    #[test]
    fn test_battle_damage_range() {
        // power=40, attack=25, defense=20: raw = 100 - 1 = 99, scaled by
        // [0.9, 1.1] -> [89, 108].
        let mut rng = StdRng::seed_from_u64(42);
        let attacker = Stats {
            attack: 25,
            ..Default::default()
        };
        let defender = Stats {
            defense: 20,
            ..Default::default()
        };
        let mv = attack_move(40, 100);
        for _ in 0..500 {
            let outcome = battle_damage(&attacker, &defender, &mv, false, &mut rng);
            assert!(
                (89..=108).contains(&outcome.damage),
                "damage {} out of range",
                outcome.damage
            );
        }
    }

    #[test]
    fn test_defending_halves_damage() {
        let attacker = Stats {
            attack: 25,
            ..Default::default()
        };
        let defender = Stats {
            defense: 20,
            ..Default::default()
        };
        let mv = attack_move(40, 100);

        let mut rng = StdRng::seed_from_u64(9);
        let open = battle_damage(&attacker, &defender, &mv, false, &mut rng);
        let mut rng = StdRng::seed_from_u64(9);
        let guarded = battle_damage(&attacker, &defender, &mv, true, &mut rng);
        assert_eq!(guarded.damage, open.damage / 2);
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let attacker = Stats {
            attack: 25,
            ..Default::default()
        };
        let defender = Stats {
            defense: 20,
            ..Default::default()
        };
        let mv = attack_move(40, 95);

        let mut a = StdRng::seed_from_u64(1234);
        let mut b = StdRng::seed_from_u64(1234);
        for _ in 0..50 {
            assert_eq!(
                battle_damage(&attacker, &defender, &mv, false, &mut a),
                battle_damage(&attacker, &defender, &mv, false, &mut b)
            );
        }
    }

    #[test]
    fn test_non_offensive_deals_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = movepool_for_category(TokenCategory::Layer1);
        let defend = pool.iter().find(|m| m.id == "hodl").unwrap();
        let outcome = battle_damage(&Stats::default(), &Stats::default(), defend, false, &mut rng);
        assert!(!outcome.missed);
        assert_eq!(outcome.damage, 0);
    }

    #[test]
    fn test_healing_from_status_move() {
        let pool = movepool_for_category(TokenCategory::Meme);
        let rebase = pool.iter().find(|m| m.id == "rebase").unwrap();
        // 25% of 80 max health.
        assert_eq!(healing(80, rebase), 20);

        let tackle = pool.iter().find(|m| m.id == "tackle").unwrap();
        assert_eq!(healing(80, tackle), 0);
    }

    #[test]
    fn test_revival_amounts() {
        assert_eq!(revival_cost(5, 10), 50);
        assert_eq!(revive_health(55, 50), 27);
        assert_eq!(revive_health(55, 100), 55);
    }

    #[test]
    fn test_health_status_thresholds() {
        assert_eq!(health_status(100, 100), HealthStatus::Healthy);
        assert_eq!(health_status(75, 100), HealthStatus::Healthy);
        assert_eq!(health_status(74, 100), HealthStatus::Injured);
        assert_eq!(health_status(50, 100), HealthStatus::Injured);
        assert_eq!(health_status(49, 100), HealthStatus::BadlyInjured);
        assert_eq!(health_status(25, 100), HealthStatus::BadlyInjured);
        assert_eq!(health_status(24, 100), HealthStatus::Critical);
        assert_eq!(health_status(1, 100), HealthStatus::Critical);
        assert_eq!(health_status(0, 100), HealthStatus::KnockedOut);
    }
}
