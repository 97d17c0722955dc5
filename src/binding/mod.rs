//! Bindings: live-state references embedded in display templates
//!
//! ```text
//! "Temp: {hall.temp;round(1)} °C"
//!         └──────┬──────────┘
//!   Binding { state_ref: "hall.temp.val", operations: [Round(1)], .. }
//! ```
//!
//! - `types`: `Binding`, `Operation`, `FormulaArg`
//! - `parse`: `BindingParser` trait and the default `TokenParser`
//! - `cache`: per-template memo of parsed bindings

mod cache;
mod parse;
mod types;

pub use cache::BindingCache;
pub use parse::{BindingParser, TokenParser, MAX_TOKENS};
pub use types::{split_channel, Binding, FormulaArg, Operation, CHANNELS};
