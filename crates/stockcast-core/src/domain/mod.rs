//! # Domain Models
//!
//! Canonical value types shared by every pipeline stage.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`IsoDate`] | Calendar date serialized as `YYYY-MM-DD` |
//! | [`PricePoint`] | One `(date, close)` observation |
//! | [`PriceSeries`] | Ordered closes with strictly increasing dates |
//!
//! All types validate their invariants at construction time, so later stages never
//! re-check ordering or positivity.

mod date;
mod series;
mod symbol;

pub use date::IsoDate;
pub use series::{PricePoint, PriceSeries};
pub use symbol::Symbol;
