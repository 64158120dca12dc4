//! Two-participant turn-based battle state machine.
//!
//! Transitions are synchronous and instantaneous; presentation pacing is a
//! consumer concern layered over the event log. Temporary buffs and the
//! defending flag last exactly one turn.

pub mod ai;
pub mod gym;

use crate::config::BalanceConfig;
use crate::domain::{
    CapturedCreature, EffectKind, EffectStat, Move, MoveCategory, Stats, TimeMs,
};
use crate::engine::damage::{battle_damage, healing};
use crate::engine::leveling::LevelingEngine;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub use ai::select_ai_move;
pub use gym::{gym_by_id, instantiate_member, roster, synthetic_creature, Gym, GymMember};

/// Which corner a participant fights from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleSide {
    Player,
    Opponent,
}

impl BattleSide {
    pub fn other(&self) -> BattleSide {
        match self {
            BattleSide::Player => BattleSide::Opponent,
            BattleSide::Opponent => BattleSide::Player,
        }
    }
}

/// Battle lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    SelectingMove,
    ResolvingTurn,
    Ended,
}

/// What kind of encounter this session is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum BattleKind {
    Gym {
        #[serde(rename = "gymId")]
        gym_id: String,
        #[serde(rename = "badgeId")]
        badge_id: String,
    },
    Wild,
}

/// A badge awarded for a first gym win, timestamped at award time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: String,
    pub gym_id: String,
    pub awarded_at: TimeMs,
}

/// Rewards computed when the battle ends with a player win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Rewards {
    pub currency: i64,
    pub experience: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
}

/// One narrated battle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleEvent {
    pub turn: u32,
    pub message: String,
}

/// One side of the encounter: a working copy of the creature plus
/// battle-local HP, stats and flags.
#[derive(Debug, Clone)]
pub struct Participant {
    pub creature: CapturedCreature,
    pub current_hp: i64,
    /// Working stats; buffs/debuffs apply here and reset every turn.
    pub temporary_stats: Stats,
    pub is_defending: bool,
    pub selected_move: Option<Move>,
}

impl Participant {
    fn new(creature: CapturedCreature) -> Self {
        let temporary_stats = creature.stats;
        let current_hp = creature.health;
        Participant {
            creature,
            current_hp,
            temporary_stats,
            is_defending: false,
            selected_move: None,
        }
    }

    pub fn hp_percent(&self) -> i64 {
        if self.creature.max_health <= 0 {
            return 0;
        }
        self.current_hp * 100 / self.creature.max_health
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp <= 0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BattleInitError {
    #[error("{0} is knocked out and cannot battle")]
    PlayerKnockedOut(String),
    #[error("unknown gym: {0}")]
    UnknownGym(String),
}

/// Experience granted per opponent level on a win.
const EXPERIENCE_PER_LEVEL: i64 = 25;
/// Currency per opponent level: gym battles pay ten times wild rate.
const GYM_CURRENCY_PER_LEVEL: i64 = 100;
const WILD_CURRENCY_PER_LEVEL: i64 = 10;

/// An active battle. Owned exclusively by its orchestrator and discarded
/// when the session ends.
#[derive(Debug)]
pub struct BattleSession {
    pub id: Uuid,
    pub kind: BattleKind,
    pub player: Participant,
    pub opponent: Participant,
    pub turn: u32,
    pub phase: BattlePhase,
    pub events: Vec<BattleEvent>,
    pub winner: Option<BattleSide>,
    pub rewards: Option<Rewards>,
    /// Gym members still waiting behind the active opponent.
    bench: Vec<CapturedCreature>,
    defend_heal_percent: i64,
    rng: StdRng,
}

impl BattleSession {
    /// Open a wild encounter between two already-instantiated creatures.
    pub fn new_wild(
        player: CapturedCreature,
        wild: CapturedCreature,
        balance: &BalanceConfig,
    ) -> Result<Self, BattleInitError> {
        Self::new_wild_seeded(player, wild, balance, rand::random())
    }

    /// Wild encounter with a caller-supplied RNG seed, for reproducibility.
    pub fn new_wild_seeded(
        player: CapturedCreature,
        wild: CapturedCreature,
        balance: &BalanceConfig,
        seed: u64,
    ) -> Result<Self, BattleInitError> {
        Self::open(player, wild, Vec::new(), BattleKind::Wild, balance, seed)
    }

    /// Open a gym battle. The roster fights in order: when a member
    /// faints, the next one steps in at the start of the following turn.
    pub fn new_gym(
        player: CapturedCreature,
        gym_id: &str,
        leveling: &LevelingEngine,
        balance: &BalanceConfig,
    ) -> Result<Self, BattleInitError> {
        Self::new_gym_seeded(player, gym_id, leveling, balance, rand::random())
    }

    /// Gym battle with a caller-supplied RNG seed, for reproducibility.
    pub fn new_gym_seeded(
        player: CapturedCreature,
        gym_id: &str,
        leveling: &LevelingEngine,
        balance: &BalanceConfig,
        seed: u64,
    ) -> Result<Self, BattleInitError> {
        let gym = gym_by_id(gym_id)
            .ok_or_else(|| BattleInitError::UnknownGym(gym_id.to_string()))?;
        let mut team: Vec<CapturedCreature> = gym
            .team
            .iter()
            .map(|member| instantiate_member(gym.id, member, leveling))
            .collect();
        let opponent = team.remove(0);
        Self::open(
            player,
            opponent,
            team,
            BattleKind::Gym {
                gym_id: gym.id.to_string(),
                badge_id: gym.badge_id.to_string(),
            },
            balance,
            seed,
        )
    }

    fn open(
        player: CapturedCreature,
        opponent: CapturedCreature,
        bench: Vec<CapturedCreature>,
        kind: BattleKind,
        balance: &BalanceConfig,
        seed: u64,
    ) -> Result<Self, BattleInitError> {
        if player.knocked_out || player.health <= 0 {
            return Err(BattleInitError::PlayerKnockedOut(player.name.clone()));
        }

        let mut session = BattleSession {
            id: Uuid::new_v4(),
            kind,
            player: Participant::new(player),
            opponent: Participant::new(opponent),
            turn: 1,
            phase: BattlePhase::SelectingMove,
            events: Vec::new(),
            winner: None,
            rewards: None,
            bench,
            defend_heal_percent: balance.defend_heal_percent,
            rng: StdRng::seed_from_u64(seed),
        };
        session.log(format!(
            "{} faces {}!",
            session.player.creature.name, session.opponent.creature.name
        ));
        Ok(session)
    }

    fn participant(&self, side: BattleSide) -> &Participant {
        match side {
            BattleSide::Player => &self.player,
            BattleSide::Opponent => &self.opponent,
        }
    }

    fn participant_mut(&mut self, side: BattleSide) -> &mut Participant {
        match side {
            BattleSide::Player => &mut self.player,
            BattleSide::Opponent => &mut self.opponent,
        }
    }

    fn log(&mut self, message: String) {
        self.events.push(BattleEvent {
            turn: self.turn,
            message,
        });
    }

    /// Record a participant's move for the turn.
    ///
    /// Silently ignored outside the selecting phase (UI races are not
    /// errors); rejected when the move is not in the creature's active set.
    /// Returns whether the selection was recorded.
    pub fn select_move(&mut self, side: BattleSide, move_id: &str) -> bool {
        if self.phase != BattlePhase::SelectingMove {
            return false;
        }
        let participant = self.participant(side);
        let Some(chosen) = participant
            .creature
            .moves
            .iter()
            .find(|m| m.id == move_id)
            .cloned()
        else {
            return false;
        };
        self.participant_mut(side).selected_move = Some(chosen);
        true
    }

    /// Let the AI pick the opponent's move for this turn.
    pub fn select_opponent_move(&mut self) -> bool {
        if self.phase != BattlePhase::SelectingMove {
            return false;
        }
        let Some(chosen) = select_ai_move(&self.opponent, &mut self.rng) else {
            return false;
        };
        self.opponent.selected_move = Some(chosen);
        true
    }

    /// True once both sides have committed a move.
    pub fn ready_to_resolve(&self) -> bool {
        self.phase == BattlePhase::SelectingMove
            && self.player.selected_move.is_some()
            && self.opponent.selected_move.is_some()
    }

    /// Speed-ordered action order for this turn. Equal speed resolves
    /// player-first; the tiebreak is part of the contract.
    pub fn turn_order(&self) -> [BattleSide; 2] {
        if self.opponent.temporary_stats.speed > self.player.temporary_stats.speed {
            [BattleSide::Opponent, BattleSide::Player]
        } else {
            [BattleSide::Player, BattleSide::Opponent]
        }
    }

    /// Resolve one full turn pair. Returns false when not ready.
    ///
    /// A faint cuts the pair short; the fainted side's remaining move is
    /// skipped. The battle ends there unless a benched gym member steps in,
    /// in which case selection reopens against the fresh opponent. A
    /// completed pair clears defending flags, resets temporary stats and
    /// selections, and returns to move selection.
    pub fn resolve_turn(&mut self) -> bool {
        if !self.ready_to_resolve() {
            return false;
        }
        self.phase = BattlePhase::ResolvingTurn;

        for side in self.turn_order() {
            self.execute_move(side);
            if self.handle_faint() {
                break;
            }
        }
        if self.phase == BattlePhase::Ended {
            return true;
        }

        self.player.is_defending = false;
        self.opponent.is_defending = false;
        self.player.temporary_stats = self.player.creature.stats;
        self.opponent.temporary_stats = self.opponent.creature.stats;
        self.player.selected_move = None;
        self.opponent.selected_move = None;
        self.turn += 1;
        self.phase = BattlePhase::SelectingMove;
        true
    }

    fn execute_move(&mut self, side: BattleSide) {
        let Some(mv) = self.participant(side).selected_move.clone() else {
            return;
        };
        let actor_name = self.participant(side).creature.name.clone();

        match mv.category {
            MoveCategory::Attack | MoveCategory::Special => {
                let attacker = self.participant(side).temporary_stats;
                let defender = self.participant(side.other());
                let defender_stats = defender.temporary_stats;
                let defender_defending = defender.is_defending;
                let outcome = battle_damage(
                    &attacker,
                    &defender_stats,
                    &mv,
                    defender_defending,
                    &mut self.rng,
                );
                if outcome.missed {
                    self.log(format!("{} used {} but missed!", actor_name, mv.name));
                } else {
                    let target = self.participant_mut(side.other());
                    target.current_hp = (target.current_hp - outcome.damage).max(0);
                    let target_name = target.creature.name.clone();
                    self.log(format!(
                        "{} used {} on {} for {} damage",
                        actor_name, mv.name, target_name, outcome.damage
                    ));
                }
            }
            MoveCategory::Defend => {
                let heal_pct = self.defend_heal_percent;
                let actor = self.participant_mut(side);
                actor.is_defending = true;
                if let Some(effect) = &mv.effect {
                    if effect.kind == EffectKind::Buff && effect.stat == Some(EffectStat::Defense)
                    {
                        actor.temporary_stats.defense =
                            actor.temporary_stats.defense * (100 + effect.magnitude) / 100;
                    }
                }
                // Defensive consolidation: a small self-heal with the guard.
                let recovered = (actor.creature.max_health * heal_pct / 100)
                    .clamp(0, actor.creature.max_health - actor.current_hp);
                actor.current_hp += recovered;
                self.log(format!(
                    "{} braces with {} and recovers {} hp",
                    actor_name, mv.name, recovered
                ));
            }
            MoveCategory::Status => {
                let actor = self.participant_mut(side);
                let amount = healing(actor.creature.max_health, &mv)
                    .clamp(0, actor.creature.max_health - actor.current_hp);
                actor.current_hp += amount;
                self.log(format!(
                    "{} used {} and restored {} hp",
                    actor_name, mv.name, amount
                ));
            }
        }
    }

    /// Handle a faint after a move. Returns true when the rest of the
    /// pair is skipped: the battle ended, or a benched gym member replaced
    /// the fallen opponent.
    fn handle_faint(&mut self) -> bool {
        let fainted = if self.player.is_fainted() {
            Some(BattleSide::Player)
        } else if self.opponent.is_fainted() {
            Some(BattleSide::Opponent)
        } else {
            None
        };
        let Some(loser) = fainted else {
            return false;
        };

        let loser_name = self.participant(loser).creature.name.clone();
        self.log(format!("{} fainted!", loser_name));

        if loser == BattleSide::Opponent && !self.bench.is_empty() {
            let next = self.bench.remove(0);
            self.log(format!("{} steps up!", next.name));
            self.opponent = Participant::new(next);
            return true;
        }

        let winner = loser.other();
        self.winner = Some(winner);
        self.phase = BattlePhase::Ended;

        if winner == BattleSide::Player {
            let opponent_level = self.opponent.creature.level;
            let rewards = match &self.kind {
                BattleKind::Gym { gym_id, badge_id } => Rewards {
                    currency: opponent_level * GYM_CURRENCY_PER_LEVEL,
                    experience: opponent_level * EXPERIENCE_PER_LEVEL,
                    badge: Some(Badge {
                        id: badge_id.clone(),
                        gym_id: gym_id.clone(),
                        awarded_at: TimeMs::now(),
                    }),
                },
                BattleKind::Wild => Rewards {
                    currency: opponent_level * WILD_CURRENCY_PER_LEVEL,
                    experience: opponent_level * EXPERIENCE_PER_LEVEL,
                    badge: None,
                },
            };
            self.log(format!("Victory! Earned {} coins", rewards.currency));
            self.rewards = Some(rewards);
        } else {
            self.log("Defeat...".to_string());
        }
        true
    }

    /// Abandon the battle. Only wild encounters can be forfeited, and only
    /// between turns. The opponent is credited with the win; no rewards.
    pub fn forfeit(&mut self) -> bool {
        if self.kind != BattleKind::Wild || self.phase != BattlePhase::SelectingMove {
            return false;
        }
        let name = self.player.creature.name.clone();
        self.log(format!("{} fled the battle", name));
        self.winner = Some(BattleSide::Opponent);
        self.phase = BattlePhase::Ended;
        true
    }
}
