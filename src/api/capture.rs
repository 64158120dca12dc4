use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::inventory::CreatureDto;
use super::AppState;
use crate::domain::{Symbol, TokenAddress, TokenCategory};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub address: String,
    pub symbol: String,
    pub name: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub tx_id: String,
    pub creature: CreatureDto,
}

pub async fn post_capture(
    State(state): State<AppState>,
    Json(req): Json<CaptureRequest>,
) -> Result<Json<CaptureResponse>, AppError> {
    if req.address.trim().is_empty() {
        return Err(AppError::BadRequest("address must not be empty".to_string()));
    }
    if req.symbol.trim().is_empty() {
        return Err(AppError::BadRequest("symbol must not be empty".to_string()));
    }

    let name = req.name.unwrap_or_else(|| req.symbol.clone());
    let category = req
        .category
        .as_deref()
        .map(TokenCategory::parse_or_unknown)
        .unwrap_or(TokenCategory::Unknown);

    let mut game = state.game.lock().await;
    let outcome = game
        .capture(
            TokenAddress::new(req.address),
            Symbol::new(req.symbol),
            name,
            category,
        )
        .await?;

    Ok(Json(CaptureResponse {
        tx_id: outcome.tx_id,
        creature: CreatureDto::from_creature(&outcome.creature),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellResponse {
    pub credited: i64,
    pub currency: i64,
}

pub async fn post_sell(
    State(state): State<AppState>,
    Json(req): Json<SellRequest>,
) -> Result<Json<SellResponse>, AppError> {
    let mut game = state.game.lock().await;
    let credited = game.sell(&TokenAddress::new(req.address)).await?;
    Ok(Json(SellResponse {
        credited,
        currency: game.ledger().currency(),
    }))
}
