//! Domain types for the token progression and battle engine.
//!
//! This module provides:
//! - Lossless price handling via the Price wrapper
//! - Domain primitives: TimeMs, TokenAddress, Symbol, TokenCategory
//! - The CapturedCreature record, its progression log and capture shapes
//! - Move definitions and the per-category movepool

pub mod creature;
pub mod moves;
pub mod price;
pub mod primitives;

pub use creature::{
    CaptureRecord, CaptureSeed, CapturedCreature, PricePoint, ProgressionEvent,
    ProgressionEventKind, Stats, PRICE_HISTORY_CAPACITY,
};
pub use moves::{
    movepool_for_category, EffectKind, EffectStat, EffectTarget, Move, MoveCategory, MoveEffect,
};
pub use price::Price;
pub use primitives::{Symbol, TimeMs, TokenAddress, TokenCategory};
