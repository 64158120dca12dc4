//! The captured token-creature and its progression records.

use super::{Move, Price, Symbol, TimeMs, TokenAddress, TokenCategory};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Maximum number of retained price observations per creature.
pub const PRICE_HISTORY_CAPACITY: usize = 100;

/// Combat stat block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub attack: i64,
    pub defense: i64,
    pub speed: i64,
    pub hp: i64,
}

/// Discrete progression event kinds, append-only per creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionEventKind {
    Caught,
    LevelUp,
    DamageTaken,
    Healed,
    Revived,
}

/// One entry in a creature's progression log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionEvent {
    pub kind: ProgressionEventKind,
    pub at: TimeMs,
    pub detail: String,
}

/// A single observed price point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: Price,
    pub at: TimeMs,
}

/// A captured token-creature.
///
/// Level derives from the peak gain (high-water mark) and only ever goes up;
/// health tracks current standing and absorbs retracement and battle damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedCreature {
    /// Unique per capture; duplicates of one address get distinct ids.
    pub instance_id: Uuid,
    pub symbol: Symbol,
    pub name: String,
    pub address: TokenAddress,
    pub category: TokenCategory,
    pub captured_at: TimeMs,

    pub purchase_price: Price,
    pub current_price: Price,
    pub peak_price: Price,
    /// High-water relative gain over purchase, never negative.
    pub max_gain: Price,

    pub level: i64,
    pub max_level_reached: i64,

    pub health: i64,
    pub max_health: i64,
    pub knocked_out: bool,

    pub stats: Stats,
    /// Active move set: movepool entries with learned_at_level <= level.
    pub moves: Vec<Move>,
    pub price_history: VecDeque<PricePoint>,
    pub progression_log: Vec<ProgressionEvent>,
}

impl CapturedCreature {
    /// Append a price observation, dropping the oldest beyond capacity.
    pub fn push_price_point(&mut self, price: Price, at: TimeMs) {
        if self.price_history.len() == PRICE_HISTORY_CAPACITY {
            self.price_history.pop_front();
        }
        self.price_history.push_back(PricePoint { price, at });
    }

    /// Append a progression log entry.
    pub fn log_event(&mut self, kind: ProgressionEventKind, at: TimeMs, detail: impl Into<String>) {
        self.progression_log.push(ProgressionEvent {
            kind,
            at,
            detail: detail.into(),
        });
    }

    /// Apply damage, clamping health at 0 and flipping knocked_out.
    /// Returns the amount actually deducted.
    pub fn apply_damage(&mut self, amount: i64) -> i64 {
        let applied = amount.clamp(0, self.health);
        self.health -= applied;
        self.knocked_out = self.health == 0;
        applied
    }

    /// Restore health, clamped to max. Returns the amount actually restored.
    /// Has no effect on a knocked-out creature; revival is a separate path.
    pub fn heal(&mut self, amount: i64) -> i64 {
        if self.knocked_out {
            return 0;
        }
        let restored = amount.clamp(0, self.max_health - self.health);
        self.health += restored;
        restored
    }

    /// Bring a knocked-out creature back at the given health.
    pub fn revive(&mut self, health: i64) {
        self.health = health.clamp(1, self.max_health);
        self.knocked_out = false;
    }

    /// Relative gain of the current price over purchase. Display flavor
    /// only; leveling always derives from the peak gain.
    pub fn current_gain(&self) -> Price {
        self.current_price.gain_over(self.purchase_price)
    }

    /// Current health as a percentage of max, 0 when max is degenerate.
    pub fn health_percent(&self) -> i64 {
        if self.max_health <= 0 {
            return 0;
        }
        self.health * 100 / self.max_health
    }
}

/// Durable capture record as stored by the capture ledger.
///
/// Two explicit shapes exist: `Legacy` rows predate creature metadata and
/// carry only the purchase facts; `Current` rows carry full identity. Each
/// has its own constructor and both normalize through [`CaptureRecord::into_seed`];
/// nothing downstream probes for field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum CaptureRecord {
    Legacy {
        address: TokenAddress,
        symbol: Symbol,
        purchase_price: Price,
        captured_at: TimeMs,
    },
    Current {
        address: TokenAddress,
        symbol: Symbol,
        name: String,
        category: TokenCategory,
        purchase_price: Price,
        captured_at: TimeMs,
    },
}

impl CaptureRecord {
    pub fn legacy(
        address: TokenAddress,
        symbol: Symbol,
        purchase_price: Price,
        captured_at: TimeMs,
    ) -> Self {
        CaptureRecord::Legacy {
            address,
            symbol,
            purchase_price,
            captured_at,
        }
    }

    pub fn current(
        address: TokenAddress,
        symbol: Symbol,
        name: String,
        category: TokenCategory,
        purchase_price: Price,
        captured_at: TimeMs,
    ) -> Self {
        CaptureRecord::Current {
            address,
            symbol,
            name,
            category,
            purchase_price,
            captured_at,
        }
    }

    /// Normalize either shape into a capture seed. Legacy rows get the
    /// symbol as display name and an Unknown category.
    pub fn into_seed(self) -> CaptureSeed {
        match self {
            CaptureRecord::Legacy {
                address,
                symbol,
                purchase_price,
                captured_at,
            } => CaptureSeed {
                name: symbol.as_str().to_string(),
                address,
                symbol,
                category: TokenCategory::Unknown,
                purchase_price,
                captured_at,
            },
            CaptureRecord::Current {
                address,
                symbol,
                name,
                category,
                purchase_price,
                captured_at,
            } => CaptureSeed {
                address,
                symbol,
                name,
                category,
                purchase_price,
                captured_at,
            },
        }
    }
}

/// Normalized input for creating a creature, produced from either capture
/// record shape or from a fresh swap.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSeed {
    pub address: TokenAddress,
    pub symbol: Symbol,
    pub name: String,
    pub category: TokenCategory,
    pub purchase_price: Price,
    pub captured_at: TimeMs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creature() -> CapturedCreature {
        CapturedCreature {
            instance_id: Uuid::new_v4(),
            symbol: Symbol::new("PEPE"),
            name: "Pepe".to_string(),
            address: TokenAddress::new("0xpepe"),
            category: TokenCategory::Meme,
            captured_at: TimeMs::new(0),
            purchase_price: Price::parse("100").unwrap(),
            current_price: Price::parse("100").unwrap(),
            peak_price: Price::parse("100").unwrap(),
            max_gain: Price::zero(),
            level: 1,
            max_level_reached: 1,
            health: 50,
            max_health: 50,
            knocked_out: false,
            stats: Stats {
                attack: 10,
                defense: 10,
                speed: 10,
                hp: 50,
            },
            moves: Vec::new(),
            price_history: VecDeque::new(),
            progression_log: Vec::new(),
        }
    }

    #[test]
    fn test_damage_clamps_and_knocks_out() {
        let mut c = creature();
        assert_eq!(c.apply_damage(30), 30);
        assert_eq!(c.health, 20);
        assert!(!c.knocked_out);

        // Overkill clamps to remaining health.
        assert_eq!(c.apply_damage(100), 20);
        assert_eq!(c.health, 0);
        assert!(c.knocked_out);
    }

    #[test]
    fn test_heal_clamps_to_max_and_skips_knocked_out() {
        let mut c = creature();
        c.apply_damage(30);
        assert_eq!(c.heal(100), 30);
        assert_eq!(c.health, c.max_health);

        c.apply_damage(50);
        assert!(c.knocked_out);
        assert_eq!(c.heal(10), 0);
        assert_eq!(c.health, 0);
    }

    #[test]
    fn test_revive_restores_and_clears_flag() {
        let mut c = creature();
        c.apply_damage(50);
        assert!(c.knocked_out);
        c.revive(25);
        assert_eq!(c.health, 25);
        assert!(!c.knocked_out);
    }

    #[test]
    fn test_price_history_bounded() {
        let mut c = creature();
        for i in 0..(PRICE_HISTORY_CAPACITY as i64 + 10) {
            c.push_price_point(Price::from_i64(i), TimeMs::new(i));
        }
        assert_eq!(c.price_history.len(), PRICE_HISTORY_CAPACITY);
        // Oldest dropped: front is observation 10.
        assert_eq!(c.price_history.front().unwrap().price, Price::from_i64(10));
    }

    #[test]
    fn test_capture_record_shapes_normalize() {
        let legacy = CaptureRecord::legacy(
            TokenAddress::new("0x1"),
            Symbol::new("OLD"),
            Price::parse("5").unwrap(),
            TimeMs::new(1),
        )
        .into_seed();
        assert_eq!(legacy.category, TokenCategory::Unknown);
        assert_eq!(legacy.name, "OLD");

        let current = CaptureRecord::current(
            TokenAddress::new("0x2"),
            Symbol::new("NEW"),
            "Newcoin".to_string(),
            TokenCategory::Defi,
            Price::parse("5").unwrap(),
            TimeMs::new(2),
        )
        .into_seed();
        assert_eq!(current.category, TokenCategory::Defi);
        assert_eq!(current.name, "Newcoin");
    }
}
