//! Opponent move selection heuristic.
//!
//! Contract is the bias, not the exact pick: low HP prefers defensive
//! options, otherwise attacks dominate. Always legal (chosen from the
//! active set).

use super::Participant;
use crate::domain::{Move, MoveCategory};
use rand::seq::SliceRandom;
use rand::Rng;

/// HP percentage below which the AI looks for a defensive option.
const DESPERATION_HP_PERCENT: i64 = 30;
/// Chance of preferring an offensive move when healthy.
const ATTACK_BIAS_PERCENT: i64 = 80;

/// Pick a move for the participant, or None if it has none.
pub fn select_ai_move<R: Rng + ?Sized>(participant: &Participant, rng: &mut R) -> Option<Move> {
    let available = &participant.creature.moves;
    if available.is_empty() {
        return None;
    }

    if participant.hp_percent() < DESPERATION_HP_PERCENT {
        let defensive: Vec<&Move> = available
            .iter()
            .filter(|m| matches!(m.category, MoveCategory::Defend | MoveCategory::Status))
            .collect();
        if let Some(chosen) = defensive.choose(rng) {
            return Some((*chosen).clone());
        }
    }

    if rng.gen_range(0..100) < ATTACK_BIAS_PERCENT {
        let offensive: Vec<&Move> = available
            .iter()
            .filter(|m| m.category.is_offensive())
            .collect();
        if let Some(chosen) = offensive.choose(rng) {
            return Some((*chosen).clone());
        }
    }

    available.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        movepool_for_category, CapturedCreature, Price, Stats, Symbol, TimeMs, TokenAddress,
        TokenCategory,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use uuid::Uuid;

    fn participant(level: i64, hp: i64, max_hp: i64) -> Participant {
        let moves: Vec<Move> = movepool_for_category(TokenCategory::Meme)
            .into_iter()
            .filter(|m| m.learned_at_level <= level)
            .collect();
        let creature = CapturedCreature {
            instance_id: Uuid::new_v4(),
            symbol: Symbol::new("PEPE"),
            name: "Pepe".to_string(),
            address: TokenAddress::new("0xpepe"),
            category: TokenCategory::Meme,
            captured_at: TimeMs::new(0),
            purchase_price: Price::one(),
            current_price: Price::one(),
            peak_price: Price::one(),
            max_gain: Price::zero(),
            level,
            max_level_reached: level,
            health: hp,
            max_health: max_hp,
            knocked_out: false,
            stats: Stats {
                attack: 10,
                defense: 10,
                speed: 10,
                hp: max_hp,
            },
            moves,
            price_history: VecDeque::new(),
            progression_log: Vec::new(),
        };
        Participant {
            current_hp: hp,
            temporary_stats: creature.stats,
            is_defending: false,
            selected_move: None,
            creature,
        }
    }

    #[test]
    fn test_always_picks_from_active_set() {
        let p = participant(10, 50, 50);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..300 {
            let chosen = select_ai_move(&p, &mut rng).expect("has moves");
            assert!(p.creature.moves.iter().any(|m| m.id == chosen.id));
        }
    }

    #[test]
    fn test_low_hp_prefers_defensive() {
        // Level 10 meme set has both HODL (defend) and offensive moves.
        let desperate = participant(10, 10, 100);
        let healthy = participant(10, 100, 100);
        let mut rng = StdRng::seed_from_u64(99);

        let defensive_picks = |p: &Participant, rng: &mut StdRng| {
            (0..400)
                .filter(|_| {
                    let m = select_ai_move(p, rng).unwrap();
                    matches!(m.category, MoveCategory::Defend | MoveCategory::Status)
                })
                .count()
        };

        let when_desperate = defensive_picks(&desperate, &mut rng);
        let when_healthy = defensive_picks(&healthy, &mut rng);
        assert!(
            when_desperate > when_healthy,
            "desperate {} <= healthy {}",
            when_desperate,
            when_healthy
        );
    }

    #[test]
    fn test_healthy_bias_toward_offense() {
        let p = participant(10, 100, 100);
        let mut rng = StdRng::seed_from_u64(7);
        let offensive = (0..400)
            .filter(|_| select_ai_move(&p, &mut rng).unwrap().category.is_offensive())
            .count();
        // 80% bias plus offensive share of the uniform fallback.
        assert!(offensive > 240, "only {} offensive picks", offensive);
    }

    #[test]
    fn test_empty_move_set_yields_none() {
        let mut p = participant(10, 50, 50);
        p.creature.moves.clear();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(select_ai_move(&p, &mut rng).is_none());
    }
}
