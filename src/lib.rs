pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod orchestration;

pub use config::{BalanceConfig, Config};
pub use datasource::{
    HttpPriceFeed, HttpSwapRelay, MockPriceFeed, MockSwapExecutor, PriceFeed, PriceFeedError,
    SwapError, SwapExecutor,
};
pub use db::{init_db, Repository};
pub use domain::{
    CaptureRecord, CaptureSeed, CapturedCreature, Price, PricePoint, Stats, Symbol, TimeMs,
    TokenAddress, TokenCategory,
};
pub use error::AppError;
pub use ledger::{InventoryLedger, ItemKind};
pub use orchestration::{GameService, TickReport};
