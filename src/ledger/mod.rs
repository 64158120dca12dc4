//! Inventory/health ledger: the authoritative collection of captured
//! creatures, consumable items, currency and badges.
//!
//! All mutation goes through the operations below; callers sharing a ledger
//! across tasks must serialize access (the service layer holds it behind a
//! mutex).

use crate::domain::{
    movepool_for_category, CaptureSeed, CapturedCreature, Price, ProgressionEventKind, TimeMs,
    TokenAddress,
};
use crate::engine::battle::{Badge, Rewards};
use crate::engine::damage::{revival_cost, revive_health};
use crate::engine::gain::{GainTracker, PriceUpdateOutcome};
use crate::engine::leveling::LevelingEngine;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use uuid::Uuid;

/// Consumable item tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Potion,
    SuperPotion,
    HyperPotion,
    MaxPotion,
    Revive,
    MaxRevive,
}

impl ItemKind {
    /// Flat heal amount, None for revives and the full-heal tier.
    fn heal_amount(&self) -> Option<i64> {
        match self {
            ItemKind::Potion => Some(20),
            ItemKind::SuperPotion => Some(50),
            ItemKind::HyperPotion => Some(100),
            ItemKind::MaxPotion => None, // heals to full
            ItemKind::Revive | ItemKind::MaxRevive => None,
        }
    }

    fn revive_percent(&self) -> Option<i64> {
        match self {
            ItemKind::Revive => Some(50),
            ItemKind::MaxRevive => Some(100),
            _ => None,
        }
    }

    pub fn is_revive(&self) -> bool {
        self.revive_percent().is_some()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no captured creature at address {0}")]
    NotFound(String),
    #[error("not enough currency: need {needed}, have {available}")]
    InsufficientCurrency { needed: i64, available: i64 },
    #[error("{0} is not knocked out")]
    NotKnockedOut(String),
    #[error("{0} is knocked out")]
    KnockedOut(String),
}

/// Fraction of current price credited on a sale (20% transaction cost).
const SELL_CREDIT_PERCENT: i64 = 80;
/// Health percent restored by a paid healing-center revive.
const CENTER_REVIVE_PERCENT: i64 = 50;

/// The player's inventory and progression wallet.
#[derive(Debug)]
pub struct InventoryLedger {
    leveling: LevelingEngine,
    revive_cost_per_level: i64,
    full_restore_discount_percent: i64,
    creatures: Vec<CapturedCreature>,
    items: HashMap<ItemKind, u32>,
    currency: i64,
    /// Addresses ever captured (the dex "seen" set).
    dex: HashSet<TokenAddress>,
    badges: Vec<Badge>,
    gyms_defeated: HashSet<String>,
    total_experience: i64,
}

impl InventoryLedger {
    pub fn new(
        leveling: LevelingEngine,
        revive_cost_per_level: i64,
        full_restore_discount_percent: i64,
    ) -> Self {
        InventoryLedger {
            leveling,
            revive_cost_per_level,
            full_restore_discount_percent,
            creatures: Vec::new(),
            items: HashMap::new(),
            currency: 0,
            dex: HashSet::new(),
            badges: Vec::new(),
            gyms_defeated: HashSet::new(),
            total_experience: 0,
        }
    }

    // ---- snapshots ----

    pub fn creatures(&self) -> &[CapturedCreature] {
        &self.creatures
    }

    pub fn currency(&self) -> i64 {
        self.currency
    }

    pub fn total_experience(&self) -> i64 {
        self.total_experience
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn gyms_defeated(&self) -> &HashSet<String> {
        &self.gyms_defeated
    }

    pub fn dex(&self) -> &HashSet<TokenAddress> {
        &self.dex
    }

    pub fn item_count(&self, kind: ItemKind) -> u32 {
        self.items.get(&kind).copied().unwrap_or(0)
    }

    pub fn find_by_address(&self, address: &TokenAddress) -> Option<&CapturedCreature> {
        self.creatures.iter().find(|c| &c.address == address)
    }

    pub fn find_by_instance(&self, instance_id: Uuid) -> Option<&CapturedCreature> {
        self.creatures.iter().find(|c| c.instance_id == instance_id)
    }

    fn find_mut(&mut self, address: &TokenAddress) -> Option<&mut CapturedCreature> {
        self.creatures.iter_mut().find(|c| &c.address == address)
    }

    // ---- mutations ----

    /// Register a fresh capture. Level, stats and health come from the
    /// leveling engine using the gain already present in the seed prices;
    /// the address joins the dex.
    pub fn capture(&mut self, seed: CaptureSeed, current_price: Price) -> &CapturedCreature {
        self.capture_with_id(Uuid::new_v4(), seed, current_price)
    }

    /// Capture with a caller-supplied instance id, used when rebuilding
    /// the projection from the durable store.
    pub fn capture_with_id(
        &mut self,
        instance_id: Uuid,
        seed: CaptureSeed,
        current_price: Price,
    ) -> &CapturedCreature {
        let peak = current_price.max(seed.purchase_price);
        let max_gain = peak.gain_over(seed.purchase_price).max(Price::zero());
        let level = self.leveling.level_for_gain(max_gain);
        let stats = self.leveling.stats_for_level(level, seed.category);
        let moves = movepool_for_category(seed.category)
            .into_iter()
            .filter(|m| m.learned_at_level <= level)
            .collect();

        let mut creature = CapturedCreature {
            instance_id,
            symbol: seed.symbol,
            name: seed.name,
            address: seed.address.clone(),
            category: seed.category,
            captured_at: seed.captured_at,
            purchase_price: seed.purchase_price,
            current_price,
            peak_price: peak,
            max_gain,
            level,
            max_level_reached: level,
            health: stats.hp,
            max_health: stats.hp,
            knocked_out: false,
            stats,
            moves,
            price_history: VecDeque::new(),
            progression_log: Vec::new(),
        };
        creature.push_price_point(current_price, seed.captured_at);
        creature.log_event(ProgressionEventKind::Caught, seed.captured_at, "caught");

        self.dex.insert(seed.address);
        self.creatures.push(creature);
        self.creatures.last().expect("just pushed")
    }

    /// Fold one price observation into every creature holding the token.
    /// Returns one outcome per affected creature.
    pub fn fold_price(
        &mut self,
        tracker: &GainTracker,
        address: &TokenAddress,
        price: Price,
        at: TimeMs,
    ) -> Vec<PriceUpdateOutcome> {
        self.creatures
            .iter_mut()
            .filter(|c| &c.address == address)
            .map(|c| tracker.apply_price_update(c, price, at))
            .collect()
    }

    /// Fold a price observation into a single creature, ignoring other
    /// holders of the token. Used when replaying stored observations.
    pub fn fold_price_for_instance(
        &mut self,
        tracker: &GainTracker,
        instance_id: Uuid,
        price: Price,
        at: TimeMs,
    ) -> Option<PriceUpdateOutcome> {
        self.creatures
            .iter_mut()
            .find(|c| c.instance_id == instance_id)
            .map(|c| tracker.apply_price_update(c, price, at))
    }

    /// Remove exactly one creature at the address (first match when
    /// duplicates exist) and credit 80% of its current price.
    pub fn sell(&mut self, address: &TokenAddress) -> Result<i64, LedgerError> {
        let index = self
            .creatures
            .iter()
            .position(|c| &c.address == address)
            .ok_or_else(|| LedgerError::NotFound(address.to_string()))?;

        let creature = self.creatures.remove(index);
        let credited = (creature.current_price * Price::from_i64(SELL_CREDIT_PERCENT)
            / Price::hundred())
        .floor_i64()
        .max(0);
        self.currency += credited;
        Ok(credited)
    }

    /// Consume one item against the creature at the address.
    ///
    /// Returns false without mutating anything when the item is out of
    /// stock, the creature is missing, a heal targets a knocked-out
    /// creature, or a revive targets a standing one.
    pub fn use_item(&mut self, kind: ItemKind, address: &TokenAddress, at: TimeMs) -> bool {
        if self.item_count(kind) == 0 {
            return false;
        }
        let Some(creature) = self.find_mut(address) else {
            return false;
        };

        if let Some(percent) = kind.revive_percent() {
            if !creature.knocked_out {
                return false;
            }
            let restored = revive_health(creature.max_health, percent);
            creature.revive(restored);
            creature.log_event(ProgressionEventKind::Revived, at, format!("revived to {}", restored));
        } else {
            if creature.knocked_out {
                return false;
            }
            let amount = kind.heal_amount().unwrap_or(creature.max_health);
            let restored = creature.heal(amount);
            creature.log_event(ProgressionEventKind::Healed, at, format!("+{} hp", restored));
        }

        *self.items.entry(kind).or_insert(0) -= 1;
        true
    }

    /// Add items to the bag.
    pub fn grant_item(&mut self, kind: ItemKind, count: u32) {
        *self.items.entry(kind).or_insert(0) += count;
    }

    /// Direct heal helper (items and healing-center flows).
    pub fn heal_token(
        &mut self,
        address: &TokenAddress,
        amount: i64,
        at: TimeMs,
    ) -> Result<i64, LedgerError> {
        let creature = self
            .find_mut(address)
            .ok_or_else(|| LedgerError::NotFound(address.to_string()))?;
        if creature.knocked_out {
            return Err(LedgerError::KnockedOut(creature.name.clone()));
        }
        let restored = creature.heal(amount);
        if restored > 0 {
            creature.log_event(ProgressionEventKind::Healed, at, format!("+{} hp", restored));
        }
        Ok(restored)
    }

    /// Direct revive helper. Fails on a standing creature.
    pub fn revive_token(
        &mut self,
        address: &TokenAddress,
        percent: i64,
        at: TimeMs,
    ) -> Result<i64, LedgerError> {
        let creature = self
            .find_mut(address)
            .ok_or_else(|| LedgerError::NotFound(address.to_string()))?;
        if !creature.knocked_out {
            return Err(LedgerError::NotKnockedOut(creature.name.clone()));
        }
        let restored = revive_health(creature.max_health, percent);
        creature.revive(restored);
        creature.log_event(ProgressionEventKind::Revived, at, format!("revived to {}", restored));
        Ok(restored)
    }

    /// Healing center: free full heal for every standing creature.
    /// Knocked-out creatures need a (paid) revive.
    pub fn heal_all(&mut self, at: TimeMs) {
        for creature in self.creatures.iter_mut().filter(|c| !c.knocked_out) {
            let restored = creature.heal(i64::MAX);
            if restored > 0 {
                creature.log_event(ProgressionEventKind::Healed, at, format!("+{} hp", restored));
            }
        }
    }

    /// Level-scaled cost to revive the creature at the address.
    pub fn revive_cost(&self, address: &TokenAddress) -> Result<i64, LedgerError> {
        let creature = self
            .find_by_address(address)
            .ok_or_else(|| LedgerError::NotFound(address.to_string()))?;
        Ok(revival_cost(creature.level, self.revive_cost_per_level))
    }

    /// Healing center: paid revive at half health. Deducts currency first;
    /// nothing changes when funds are short or the creature is standing.
    pub fn paid_revive(&mut self, address: &TokenAddress, at: TimeMs) -> Result<i64, LedgerError> {
        let cost = self.revive_cost(address)?;
        {
            let creature = self
                .find_by_address(address)
                .ok_or_else(|| LedgerError::NotFound(address.to_string()))?;
            if !creature.knocked_out {
                return Err(LedgerError::NotKnockedOut(creature.name.clone()));
            }
        }
        self.spend(cost)?;
        self.revive_token(address, CENTER_REVIVE_PERCENT, at)?;
        Ok(cost)
    }

    /// Bundle price for reviving every knocked-out creature: 90% of the
    /// summed individual costs.
    pub fn full_restore_cost(&self) -> i64 {
        let total: i64 = self
            .creatures
            .iter()
            .filter(|c| c.knocked_out)
            .map(|c| revival_cost(c.level, self.revive_cost_per_level))
            .sum();
        total * self.full_restore_discount_percent / 100
    }

    /// Healing center: pay the bundle price, revive all knocked-out
    /// creatures at full and heal everyone else to max.
    pub fn full_restore(&mut self, at: TimeMs) -> Result<i64, LedgerError> {
        let cost = self.full_restore_cost();
        self.spend(cost)?;
        for creature in self.creatures.iter_mut() {
            if creature.knocked_out {
                creature.revive(creature.max_health);
                creature.log_event(ProgressionEventKind::Revived, at, "full restore");
            } else if creature.health < creature.max_health {
                creature.heal(i64::MAX);
                creature.log_event(ProgressionEventKind::Healed, at, "full restore");
            }
        }
        Ok(cost)
    }

    pub fn earn(&mut self, amount: i64) {
        self.currency += amount.max(0);
    }

    pub fn spend(&mut self, amount: i64) -> Result<(), LedgerError> {
        if amount > self.currency {
            return Err(LedgerError::InsufficientCurrency {
                needed: amount,
                available: self.currency,
            });
        }
        self.currency -= amount;
        Ok(())
    }

    /// Fold a finished battle back into the ledger: the player creature's
    /// battle HP becomes its permanent health, currency and experience are
    /// credited, and a gym badge lands on the first win only.
    pub fn apply_battle_rewards(
        &mut self,
        instance_id: Uuid,
        final_hp: i64,
        rewards: &Rewards,
        at: TimeMs,
    ) -> Result<(), LedgerError> {
        let creature = self
            .creatures
            .iter_mut()
            .find(|c| c.instance_id == instance_id)
            .ok_or_else(|| LedgerError::NotFound(instance_id.to_string()))?;

        let clamped = final_hp.clamp(0, creature.max_health);
        if clamped < creature.health {
            creature.log_event(
                ProgressionEventKind::DamageTaken,
                at,
                format!("battle -{} hp", creature.health - clamped),
            );
        }
        creature.health = clamped;
        creature.knocked_out = creature.health == 0;

        self.currency += rewards.currency;
        self.total_experience += rewards.experience;

        if let Some(badge) = &rewards.badge {
            if self.gyms_defeated.insert(badge.gym_id.clone()) {
                self.badges.push(badge.clone());
            }
        }
        Ok(())
    }
}
