use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::inventory::MoveDto;
use super::AppState;
use crate::domain::TokenAddress;
use crate::engine::battle::{BattleKind, BattlePhase, BattleSession, BattleSide, Participant};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResponse {
    pub battle_id: String,
    pub kind: BattleKind,
    pub phase: BattlePhase,
    pub turn: u32,
    pub player: ParticipantDto,
    pub opponent: ParticipantDto,
    pub events: Vec<EventDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<BattleSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewards: Option<RewardsDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub name: String,
    pub symbol: String,
    pub level: i64,
    pub current_hp: i64,
    pub max_hp: i64,
    pub hp_percent: i64,
    pub is_defending: bool,
    pub moves: Vec<MoveDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub turn: u32,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsDto {
    pub currency: i64,
    pub experience: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_id: Option<String>,
}

impl BattleResponse {
    fn from_session(session: &BattleSession) -> Self {
        BattleResponse {
            battle_id: session.id.to_string(),
            kind: session.kind.clone(),
            phase: session.phase,
            turn: session.turn,
            player: participant_dto(&session.player, true),
            opponent: participant_dto(&session.opponent, false),
            events: session
                .events
                .iter()
                .map(|e| EventDto {
                    turn: e.turn,
                    message: e.message.clone(),
                })
                .collect(),
            winner: session.winner,
            rewards: session.rewards.as_ref().map(|r| RewardsDto {
                currency: r.currency,
                experience: r.experience,
                badge_id: r.badge.as_ref().map(|b| b.id.clone()),
            }),
        }
    }
}

fn participant_dto(participant: &Participant, include_moves: bool) -> ParticipantDto {
    ParticipantDto {
        name: participant.creature.name.clone(),
        symbol: participant.creature.symbol.to_string(),
        level: participant.creature.level,
        current_hp: participant.current_hp,
        max_hp: participant.creature.max_health,
        hp_percent: participant.hp_percent(),
        is_defending: participant.is_defending,
        // The opponent's move list stays hidden.
        moves: if include_moves {
            participant
                .creature
                .moves
                .iter()
                .map(MoveDto::from_move)
                .collect()
        } else {
            Vec::new()
        },
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GymBattleRequest {
    pub address: String,
    pub gym_id: String,
}

pub async fn post_gym_battle(
    State(state): State<AppState>,
    Json(req): Json<GymBattleRequest>,
) -> Result<Json<BattleResponse>, AppError> {
    let mut game = state.game.lock().await;
    let session = game.start_gym_battle(&TokenAddress::new(req.address), &req.gym_id)?;
    Ok(Json(BattleResponse::from_session(session)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WildBattleRequest {
    pub address: String,
}

pub async fn post_wild_battle(
    State(state): State<AppState>,
    Json(req): Json<WildBattleRequest>,
) -> Result<Json<BattleResponse>, AppError> {
    let mut game = state.game.lock().await;
    let session = game.start_wild_battle(&TokenAddress::new(req.address))?;
    Ok(Json(BattleResponse::from_session(session)))
}

pub async fn get_battle(
    State(state): State<AppState>,
) -> Result<Json<BattleResponse>, AppError> {
    let game = state.game.lock().await;
    let session = game
        .battle()
        .ok_or_else(|| AppError::NotFound("no active battle".to_string()))?;
    Ok(Json(BattleResponse::from_session(session)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub move_id: String,
}

pub async fn post_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<BattleResponse>, AppError> {
    let mut game = state.game.lock().await;
    let session = game.choose_move(&req.move_id)?;
    Ok(Json(BattleResponse::from_session(session)))
}

pub async fn post_forfeit(
    State(state): State<AppState>,
) -> Result<Json<BattleResponse>, AppError> {
    let mut game = state.game.lock().await;
    let session = game.forfeit_battle()?;
    Ok(Json(BattleResponse::from_session(session)))
}
