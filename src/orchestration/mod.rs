//! Orchestration: the game service owning all mutable state, plus the
//! background price ticker that drives progression between requests.

pub mod game;
pub mod ticker;

pub use game::{CaptureOutcome, GameError, GameService, TickReport};
pub use ticker::spawn_price_ticker;
