use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::domain::{CapturedCreature, Move, TokenAddress};
use crate::engine::damage::{health_status, HealthStatus};
use crate::engine::battle::Badge;
use crate::error::AppError;
use crate::ledger::ItemKind;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureDto {
    pub instance_id: String,
    pub symbol: String,
    pub name: String,
    pub address: String,
    pub category: String,
    pub captured_at: i64,
    pub purchase_price: String,
    pub current_price: String,
    pub peak_price: String,
    pub max_gain: String,
    pub level: i64,
    pub health: i64,
    pub max_health: i64,
    pub health_percent: i64,
    pub status: HealthStatus,
    pub knocked_out: bool,
    pub attack: i64,
    pub defense: i64,
    pub speed: i64,
    pub moves: Vec<MoveDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub power: i64,
    pub accuracy: i64,
    pub learned_at_level: i64,
}

impl MoveDto {
    pub fn from_move(mv: &Move) -> Self {
        MoveDto {
            id: mv.id.clone(),
            name: mv.name.clone(),
            category: format!("{:?}", mv.category).to_lowercase(),
            power: mv.power,
            accuracy: mv.accuracy,
            learned_at_level: mv.learned_at_level,
        }
    }
}

impl CreatureDto {
    pub fn from_creature(c: &CapturedCreature) -> Self {
        CreatureDto {
            instance_id: c.instance_id.to_string(),
            symbol: c.symbol.to_string(),
            name: c.name.clone(),
            address: c.address.to_string(),
            category: c.category.as_str().to_string(),
            captured_at: c.captured_at.as_i64(),
            purchase_price: c.purchase_price.to_canonical_string(),
            current_price: c.current_price.to_canonical_string(),
            peak_price: c.peak_price.to_canonical_string(),
            max_gain: c.max_gain.to_canonical_string(),
            level: c.level,
            health: c.health,
            max_health: c.max_health,
            health_percent: c.health_percent(),
            status: health_status(c.health, c.max_health),
            knocked_out: c.knocked_out,
            attack: c.stats.attack,
            defense: c.stats.defense,
            speed: c.stats.speed,
            moves: c.moves.iter().map(MoveDto::from_move).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub creatures: Vec<CreatureDto>,
    pub currency: i64,
    pub total_experience: i64,
    pub items: Vec<ItemStackDto>,
    pub badges: Vec<BadgeDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStackDto {
    pub item: ItemKind,
    pub count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDto {
    pub id: String,
    pub gym_id: String,
    pub awarded_at: i64,
}

impl BadgeDto {
    fn from_badge(b: &Badge) -> Self {
        BadgeDto {
            id: b.id.clone(),
            gym_id: b.gym_id.clone(),
            awarded_at: b.awarded_at.as_i64(),
        }
    }
}

const ALL_ITEMS: &[ItemKind] = &[
    ItemKind::Potion,
    ItemKind::SuperPotion,
    ItemKind::HyperPotion,
    ItemKind::MaxPotion,
    ItemKind::Revive,
    ItemKind::MaxRevive,
];

pub async fn get_inventory(State(state): State<AppState>) -> Json<InventoryResponse> {
    let game = state.game.lock().await;
    let ledger = game.ledger();

    let items = ALL_ITEMS
        .iter()
        .map(|&item| ItemStackDto {
            item,
            count: ledger.item_count(item),
        })
        .filter(|stack| stack.count > 0)
        .collect();

    Json(InventoryResponse {
        creatures: ledger
            .creatures()
            .iter()
            .map(CreatureDto::from_creature)
            .collect(),
        currency: ledger.currency(),
        total_experience: ledger.total_experience(),
        items,
        badges: ledger.badges().iter().map(BadgeDto::from_badge).collect(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DexResponse {
    pub seen: Vec<String>,
    pub gyms_defeated: Vec<String>,
    pub gyms: Vec<GymDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GymDto {
    pub id: String,
    pub name: String,
    pub badge_id: String,
    pub team_size: usize,
    pub lead_level: i64,
}

pub async fn get_dex(State(state): State<AppState>) -> Json<DexResponse> {
    let game = state.game.lock().await;
    let ledger = game.ledger();

    let mut seen: Vec<String> = ledger.dex().iter().map(|a| a.to_string()).collect();
    seen.sort();
    let mut gyms_defeated: Vec<String> = ledger.gyms_defeated().iter().cloned().collect();
    gyms_defeated.sort();

    let gyms = game
        .gyms()
        .iter()
        .map(|g| GymDto {
            id: g.id.to_string(),
            name: g.name.to_string(),
            badge_id: g.badge_id.to_string(),
            team_size: g.team.len(),
            lead_level: g.team[0].level,
        })
        .collect();

    Json(DexResponse {
        seen,
        gyms_defeated,
        gyms,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetailResponse {
    #[serde(flatten)]
    pub creature: CreatureDto,
    pub price_history: Vec<PricePointDto>,
    pub progression_log: Vec<ProgressionEventDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePointDto {
    pub price: String,
    pub at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionEventDto {
    pub kind: String,
    pub at: i64,
    pub detail: String,
}

pub async fn get_token(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TokenDetailResponse>, AppError> {
    let game = state.game.lock().await;
    let address = TokenAddress::new(address);
    let creature = game
        .ledger()
        .find_by_address(&address)
        .ok_or_else(|| AppError::NotFound(address.to_string()))?;

    Ok(Json(TokenDetailResponse {
        creature: CreatureDto::from_creature(creature),
        price_history: creature
            .price_history
            .iter()
            .map(|p| PricePointDto {
                price: p.price.to_canonical_string(),
                at: p.at.as_i64(),
            })
            .collect(),
        progression_log: creature
            .progression_log
            .iter()
            .map(|e| ProgressionEventDto {
                kind: serde_variant_name(e.kind),
                at: e.at.as_i64(),
                detail: e.detail.clone(),
            })
            .collect(),
    }))
}

fn serde_variant_name(kind: crate::domain::ProgressionEventKind) -> String {
    use crate::domain::ProgressionEventKind::*;
    match kind {
        Caught => "caught",
        LevelUp => "level_up",
        DamageTaken => "damage_taken",
        Healed => "healed",
        Revived => "revived",
    }
    .to_string()
}
