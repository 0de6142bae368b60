pub mod format;
pub mod replay;
pub mod strategy;

pub use format::format_duration;
pub use replay::{reconstruct, SESSION_TIMEOUT_SECS};
pub use strategy::{ClientReported, DurationStrategy, EventReplay, StrategyKind};
