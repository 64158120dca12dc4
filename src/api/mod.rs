pub mod battle;
pub mod capture;
pub mod center;
pub mod health;
pub mod inventory;

use crate::config::Config;
use crate::orchestration::GameService;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub game: Arc<Mutex<GameService>>,
    pub config: Config,
}

impl AppState {
    pub fn new(game: Arc<Mutex<GameService>>, config: Config) -> Self {
        Self { game, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/inventory", get(inventory::get_inventory))
        .route("/v1/dex", get(inventory::get_dex))
        .route("/v1/tokens/:address", get(inventory::get_token))
        .route("/v1/capture", post(capture::post_capture))
        .route("/v1/sell", post(capture::post_sell))
        .route("/v1/items/use", post(center::post_use_item))
        .route("/v1/center/heal", post(center::post_heal_all))
        .route("/v1/center/revive", post(center::post_revive))
        .route("/v1/center/full-restore", post(center::post_full_restore))
        .route("/v1/center/cost", get(center::get_cost))
        .route("/v1/battle", get(battle::get_battle))
        .route("/v1/battle/gym", post(battle::post_gym_battle))
        .route("/v1/battle/wild", post(battle::post_wild_battle))
        .route("/v1/battle/move", post(battle::post_move))
        .route("/v1/battle/forfeit", post(battle::post_forfeit))
        .layer(cors)
        .with_state(state)
}
