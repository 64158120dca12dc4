//! Game service: the single owner of mutable game state.
//!
//! Everything the API exposes goes through here. The service holds the
//! inventory ledger, the active battle (at most one), and the boundary
//! clients, and is shared behind an async mutex by the router and the
//! background price ticker.

use crate::config::Config;
use crate::datasource::{PriceFeed, PriceFeedError, SwapError, SwapExecutor};
use crate::db::Repository;
use crate::domain::{
    CaptureSeed, CapturedCreature, Symbol, TimeMs, TokenAddress, TokenCategory,
    PRICE_HISTORY_CAPACITY,
};
use crate::engine::battle::{
    roster, synthetic_creature, BattleInitError, BattlePhase, BattleSession, BattleSide, Gym,
};
use crate::engine::gain::GainTracker;
use crate::engine::leveling::LevelingEngine;
use crate::error::AppError;
use crate::ledger::{InventoryLedger, ItemKind, LedgerError};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("price feed unavailable: {0}")]
    Feed(#[from] PriceFeedError),
    #[error("swap failed: {0}")]
    Swap(#[from] SwapError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    BattleInit(#[from] BattleInitError),
    #[error("no active battle")]
    NoActiveBattle,
    #[error("a battle is already in progress")]
    BattleInProgress,
    #[error("{0}")]
    InvalidMove(String),
    #[error("only wild battles can be forfeited, and only between turns")]
    ForfeitRejected,
    #[error("{0}")]
    ItemRejected(String),
    #[error("no captured creature at address {0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Feed(e) => AppError::Rejected(e.to_string()),
            GameError::Swap(e) => AppError::Rejected(e.to_string()),
            GameError::Ledger(LedgerError::NotFound(what)) => AppError::NotFound(what),
            GameError::Ledger(e) => AppError::Rejected(e.to_string()),
            GameError::BattleInit(BattleInitError::UnknownGym(id)) => {
                AppError::NotFound(format!("gym {}", id))
            }
            GameError::BattleInit(e) => AppError::Rejected(e.to_string()),
            GameError::NoActiveBattle => AppError::NotFound("no active battle".to_string()),
            GameError::InvalidMove(msg) => AppError::BadRequest(msg),
            GameError::ItemRejected(msg) => AppError::Rejected(msg),
            GameError::NotFound(what) => AppError::NotFound(what),
            GameError::Db(e) => AppError::Internal(e.to_string()),
            other => AppError::Rejected(other.to_string()),
        }
    }
}

/// Result of a completed capture swap.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub tx_id: String,
    pub creature: CapturedCreature,
}

/// Per-tick summary for the background price loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tokens_updated: usize,
    pub tokens_skipped: usize,
    pub level_ups: usize,
    pub damage_events: usize,
}

/// Wild spawn table: symbol, name, category.
const WILD_SPAWNS: &[(&str, &str, TokenCategory)] = &[
    ("SHDW", "Shadowisp", TokenCategory::Meme),
    ("GLCH", "Glitchling", TokenCategory::Unknown),
    ("FERA", "Feralith", TokenCategory::Defi),
    ("NMAD", "Nomadon", TokenCategory::Layer2),
    ("WYRM", "Wyrmhole", TokenCategory::Layer1),
];

/// Items every new game starts with.
const STARTER_ITEMS: &[(ItemKind, u32)] = &[(ItemKind::Potion, 3), (ItemKind::Revive, 1)];

pub struct GameService {
    config: Config,
    leveling: LevelingEngine,
    tracker: GainTracker,
    ledger: InventoryLedger,
    battle: Option<BattleSession>,
    feed: Arc<dyn PriceFeed>,
    swaps: Arc<dyn SwapExecutor>,
    repo: Repository,
}

impl GameService {
    pub fn new(
        config: Config,
        feed: Arc<dyn PriceFeed>,
        swaps: Arc<dyn SwapExecutor>,
        repo: Repository,
    ) -> Self {
        let leveling = LevelingEngine::new(config.balance.clone());
        let tracker = GainTracker::new(leveling.clone(), config.balance.clone());
        let mut ledger = InventoryLedger::new(
            leveling.clone(),
            config.balance.revive_cost_per_level,
            config.balance.full_restore_discount_percent,
        );
        for &(kind, count) in STARTER_ITEMS {
            ledger.grant_item(kind, count);
        }

        GameService {
            config,
            leveling,
            tracker,
            ledger,
            battle: None,
            feed,
            swaps,
            repo,
        }
    }

    // ---- snapshots ----

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn battle(&self) -> Option<&BattleSession> {
        self.battle.as_ref()
    }

    pub fn gyms(&self) -> Vec<Gym> {
        roster()
    }

    // ---- startup ----

    /// Rebuild the in-memory ledger from the durable store: re-seed each
    /// capture at its purchase price, then replay stored observations
    /// taken after the capture. Peaks, levels and retracement damage come
    /// out of the replay, not out of stored state.
    pub async fn load_from_store(&mut self) -> Result<usize, GameError> {
        let rows = self.repo.load_captures().await?;
        let count = rows.len();

        for row in rows {
            let seed = row.record.into_seed();
            let address = seed.address.clone();
            let captured_at = seed.captured_at;
            let purchase = seed.purchase_price;
            self.ledger.capture_with_id(row.instance_id, seed, purchase);

            let observations = self
                .repo
                .observations_for(&address, PRICE_HISTORY_CAPACITY as i64)
                .await?;
            for point in observations {
                if point.at >= captured_at {
                    self.ledger.fold_price_for_instance(
                        &self.tracker,
                        row.instance_id,
                        point.price,
                        point.at,
                    );
                }
            }
        }

        info!(captures = count, "Ledger rebuilt from store");
        Ok(count)
    }

    // ---- capture / sell ----

    /// Buy and capture a token: execute the swap, persist the capture, and
    /// register the creature at the fill price.
    pub async fn capture(
        &mut self,
        address: TokenAddress,
        symbol: Symbol,
        name: String,
        category: TokenCategory,
    ) -> Result<CaptureOutcome, GameError> {
        let receipt = self
            .swaps
            .execute_swap(&address, self.config.capture_usdc_amount)
            .await?;

        let purchase_price = match receipt.fill_price {
            Some(price) => price,
            None => self.feed.latest_price(&address).await?.price,
        };
        let captured_at = TimeMs::now();
        let instance_id = Uuid::new_v4();

        self.repo
            .insert_capture(
                instance_id,
                &address,
                &symbol,
                &name,
                category,
                purchase_price,
                captured_at,
            )
            .await?;
        self.repo
            .record_observation(&address, purchase_price, captured_at)
            .await?;

        let seed = CaptureSeed {
            address,
            symbol,
            name,
            category,
            purchase_price,
            captured_at,
        };
        let creature = self.ledger.capture_with_id(instance_id, seed, purchase_price);
        info!(
            name = %creature.name,
            level = creature.level,
            tx = %receipt.tx_id,
            "Captured token"
        );

        Ok(CaptureOutcome {
            tx_id: receipt.tx_id,
            creature: creature.clone(),
        })
    }

    /// Sell one creature at the address; 80% of current price is credited.
    pub async fn sell(&mut self, address: &TokenAddress) -> Result<i64, GameError> {
        let instance_id = self
            .ledger
            .find_by_address(address)
            .ok_or_else(|| GameError::NotFound(address.to_string()))?
            .instance_id;

        self.repo.delete_capture(instance_id).await?;
        let credited = self.ledger.sell(address)?;
        info!(address = %address, credited, "Sold token");
        Ok(credited)
    }

    // ---- price ticking ----

    /// Fetch the latest price for every distinct held token and fold it
    /// into the holders. Feed failures skip the token for this tick.
    pub async fn tick_prices(&mut self) -> TickReport {
        let addresses: Vec<TokenAddress> = {
            let mut seen = Vec::new();
            for creature in self.ledger.creatures() {
                if !seen.contains(&creature.address) {
                    seen.push(creature.address.clone());
                }
            }
            seen
        };

        let mut report = TickReport::default();
        for address in addresses {
            let quote = match self.feed.latest_price(&address).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!(address = %address, error = %e, "Price fetch failed, skipping");
                    report.tokens_skipped += 1;
                    continue;
                }
            };

            if let Err(e) = self
                .repo
                .record_observation(&address, quote.price, quote.as_of)
                .await
            {
                warn!(address = %address, error = %e, "Failed to persist observation");
            }

            let outcomes =
                self.ledger
                    .fold_price(&self.tracker, &address, quote.price, quote.as_of);
            report.tokens_updated += 1;
            for outcome in outcomes {
                if outcome.leveled_up {
                    report.level_ups += 1;
                }
                if outcome.damage_applied > 0 {
                    report.damage_events += 1;
                }
            }
        }

        debug!(
            updated = report.tokens_updated,
            skipped = report.tokens_skipped,
            level_ups = report.level_ups,
            "Price tick complete"
        );
        report
    }

    // ---- battles ----

    pub fn start_gym_battle(
        &mut self,
        address: &TokenAddress,
        gym_id: &str,
    ) -> Result<&BattleSession, GameError> {
        self.ensure_no_active_battle()?;
        let player = self
            .ledger
            .find_by_address(address)
            .ok_or_else(|| GameError::NotFound(address.to_string()))?
            .clone();

        let session =
            BattleSession::new_gym(player, gym_id, &self.leveling, &self.config.balance)?;
        info!(gym = gym_id, battle = %session.id, "Gym battle started");
        Ok(self.battle.insert(session))
    }

    pub fn start_wild_battle(
        &mut self,
        address: &TokenAddress,
    ) -> Result<&BattleSession, GameError> {
        self.ensure_no_active_battle()?;
        let player = self
            .ledger
            .find_by_address(address)
            .ok_or_else(|| GameError::NotFound(address.to_string()))?
            .clone();

        let wild = spawn_wild(player.level, &self.leveling, &mut rand::thread_rng());
        let session = BattleSession::new_wild(player, wild, &self.config.balance)?;
        info!(battle = %session.id, opponent = %session.opponent.creature.name, "Wild battle started");
        Ok(self.battle.insert(session))
    }

    /// Commit the player's move for the turn; the opponent picks via AI and
    /// the turn resolves immediately. A battle that ends here is settled
    /// back into the ledger in the same call.
    pub fn choose_move(&mut self, move_id: &str) -> Result<&BattleSession, GameError> {
        let session = self.battle.as_mut().ok_or(GameError::NoActiveBattle)?;
        if session.phase != BattlePhase::SelectingMove {
            return Err(GameError::InvalidMove(
                "battle is not awaiting a move".to_string(),
            ));
        }
        if !session.select_move(BattleSide::Player, move_id) {
            return Err(GameError::InvalidMove(format!(
                "move {} is not in the active set",
                move_id
            )));
        }
        session.select_opponent_move();
        session.resolve_turn();

        if session.phase == BattlePhase::Ended {
            self.settle_battle()?;
        }
        self.battle.as_ref().ok_or(GameError::NoActiveBattle)
    }

    /// Flee an active wild battle. Battle damage taken so far sticks.
    pub fn forfeit_battle(&mut self) -> Result<&BattleSession, GameError> {
        let session = self.battle.as_mut().ok_or(GameError::NoActiveBattle)?;
        if !session.forfeit() {
            return Err(GameError::ForfeitRejected);
        }
        self.settle_battle()?;
        self.battle.as_ref().ok_or(GameError::NoActiveBattle)
    }

    fn ensure_no_active_battle(&self) -> Result<(), GameError> {
        match &self.battle {
            Some(session) if session.phase != BattlePhase::Ended => {
                Err(GameError::BattleInProgress)
            }
            _ => Ok(()),
        }
    }

    /// Fold the finished battle back into the ledger exactly once: the
    /// player's battle HP becomes permanent health and any rewards land.
    fn settle_battle(&mut self) -> Result<(), GameError> {
        let Some(session) = &self.battle else {
            return Ok(());
        };
        let instance_id = session.player.creature.instance_id;
        let final_hp = session.player.current_hp;
        let rewards = session.rewards.clone().unwrap_or_default();

        self.ledger
            .apply_battle_rewards(instance_id, final_hp, &rewards, TimeMs::now())?;
        info!(
            battle = %session.id,
            winner = ?session.winner,
            currency = rewards.currency,
            "Battle settled"
        );
        Ok(())
    }

    // ---- items and healing center ----

    pub fn use_item(&mut self, kind: ItemKind, address: &TokenAddress) -> Result<(), GameError> {
        if self.ledger.item_count(kind) == 0 {
            return Err(GameError::ItemRejected("item out of stock".to_string()));
        }
        if self.ledger.find_by_address(address).is_none() {
            return Err(GameError::NotFound(address.to_string()));
        }
        if !self.ledger.use_item(kind, address, TimeMs::now()) {
            return Err(GameError::ItemRejected(if kind.is_revive() {
                "revives only work on knocked-out creatures".to_string()
            } else {
                "healing items cannot target a knocked-out creature".to_string()
            }));
        }
        Ok(())
    }

    pub fn grant_item(&mut self, kind: ItemKind, count: u32) {
        self.ledger.grant_item(kind, count);
    }

    /// Healing center: free full heal for all standing creatures.
    pub fn heal_all(&mut self) {
        self.ledger.heal_all(TimeMs::now());
    }

    pub fn revive_cost(&self, address: &TokenAddress) -> Result<i64, GameError> {
        Ok(self.ledger.revive_cost(address)?)
    }

    /// Healing center: paid revive at half health.
    pub fn paid_revive(&mut self, address: &TokenAddress) -> Result<i64, GameError> {
        Ok(self.ledger.paid_revive(address, TimeMs::now())?)
    }

    pub fn full_restore_cost(&self) -> i64 {
        self.ledger.full_restore_cost()
    }

    /// Healing center: discounted revive-everyone-and-heal-everything.
    pub fn full_restore(&mut self) -> Result<i64, GameError> {
        Ok(self.ledger.full_restore(TimeMs::now())?)
    }
}

/// Roll a wild opponent near the player's level.
fn spawn_wild<R: Rng + ?Sized>(
    player_level: i64,
    leveling: &LevelingEngine,
    rng: &mut R,
) -> CapturedCreature {
    let (symbol, name, category) = WILD_SPAWNS[rng.gen_range(0..WILD_SPAWNS.len())];
    let level = (player_level + rng.gen_range(-2..=2)).clamp(1, 100);
    synthetic_creature(
        symbol,
        name,
        TokenAddress::new(format!("wild:{}", symbol)),
        category,
        level,
        leveling,
    )
}
