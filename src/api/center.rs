//! Item use and healing-center endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::domain::TokenAddress;
use crate::error::AppError;
use crate::ledger::ItemKind;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseItemRequest {
    pub item: ItemKind,
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UseItemResponse {
    pub item: ItemKind,
    pub remaining: u32,
    pub health: i64,
}

pub async fn post_use_item(
    State(state): State<AppState>,
    Json(req): Json<UseItemRequest>,
) -> Result<Json<UseItemResponse>, AppError> {
    let address = TokenAddress::new(req.address);
    let mut game = state.game.lock().await;
    game.use_item(req.item, &address)?;

    let health = game
        .ledger()
        .find_by_address(&address)
        .map(|c| c.health)
        .unwrap_or(0);
    Ok(Json(UseItemResponse {
        item: req.item,
        remaining: game.ledger().item_count(req.item),
        health,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealAllResponse {
    pub healed: usize,
    pub knocked_out: usize,
}

pub async fn post_heal_all(State(state): State<AppState>) -> Json<HealAllResponse> {
    let mut game = state.game.lock().await;
    game.heal_all();

    let knocked_out = game
        .ledger()
        .creatures()
        .iter()
        .filter(|c| c.knocked_out)
        .count();
    Json(HealAllResponse {
        healed: game.ledger().creatures().len() - knocked_out,
        knocked_out,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviveRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviveResponse {
    pub cost: i64,
    pub currency: i64,
    pub health: i64,
}

pub async fn post_revive(
    State(state): State<AppState>,
    Json(req): Json<ReviveRequest>,
) -> Result<Json<ReviveResponse>, AppError> {
    let address = TokenAddress::new(req.address);
    let mut game = state.game.lock().await;
    let cost = game.paid_revive(&address)?;

    let health = game
        .ledger()
        .find_by_address(&address)
        .map(|c| c.health)
        .unwrap_or(0);
    Ok(Json(ReviveResponse {
        cost,
        currency: game.ledger().currency(),
        health,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullRestoreResponse {
    pub cost: i64,
    pub currency: i64,
}

pub async fn post_full_restore(
    State(state): State<AppState>,
) -> Result<Json<FullRestoreResponse>, AppError> {
    let mut game = state.game.lock().await;
    let cost = game.full_restore()?;
    Ok(Json(FullRestoreResponse {
        cost,
        currency: game.ledger().currency(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostQuery {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revive_cost: Option<i64>,
    pub full_restore_cost: i64,
}

pub async fn get_cost(
    Query(query): Query<CostQuery>,
    State(state): State<AppState>,
) -> Result<Json<CostResponse>, AppError> {
    let game = state.game.lock().await;
    let revive_cost = match query.address {
        Some(address) => Some(game.revive_cost(&TokenAddress::new(address))?),
        None => None,
    };
    Ok(Json(CostResponse {
        revive_cost,
        full_restore_cost: game.full_restore_cost(),
    }))
}
