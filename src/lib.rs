//! bindfmt - binding & formatting engine for live-state display templates
//!
//! ```text
//! "Power: {house.power;/(1000);round(2)} kW"  ──►  "Power: 1.25 kW"
//! ```

pub mod binding;
pub mod config;
pub mod context;
pub mod date;
pub mod engine;
pub mod error;
pub mod formula;
pub mod jsonpath;
mod pipeline;
pub mod special;
pub mod value;
pub mod value_format;

pub use binding::{Binding, BindingCache, BindingParser, FormulaArg, Operation, TokenParser};
pub use config::EngineConfig;
pub use context::{EngineContext, FormatRequest, StateSource, Translator, Widget};
pub use date::{Calendar, CalendarLocale, Clock, DateFormatter, DateZone, MomentCalendar};
pub use engine::{unescape, FormattingEngine, SharedStates};
pub use error::{BindError, FixSuggestion};
pub use formula::{FormulaError, FormulaLimits};
pub use special::SpecialValue;
pub use value::Value;
pub use value_format::{format_value, format_value_with, Separators, ValueFormat};
