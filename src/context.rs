//! Formatting context
//!
//! - `EngineContext`: engine-wide fields (user, language, edit mode, ...)
//! - `FormatRequest`: per-call fields (view, widget, overrides)
//! - `StateSource`: live state lookup by reference (`"hall.temp.val"`)

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::date::Calendar;
use crate::value::Value;

/// Translation function for UI literals ("Today", "Yesterday")
pub type Translator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Live state lookup
pub trait StateSource {
    /// Current value of `id`, `None` when the state is unknown
    fn get_state(&self, id: &str) -> Option<Value>;
}

impl<V, S> StateSource for HashMap<String, V, S>
where
    V: Clone + Into<Value>,
    S: BuildHasher,
{
    fn get_state(&self, id: &str) -> Option<Value> {
        self.get(id).cloned().map(Into::into)
    }
}

impl<V> StateSource for BTreeMap<String, V>
where
    V: Clone + Into<Value>,
{
    fn get_state(&self, id: &str) -> Option<Value> {
        self.get(id).cloned().map(Into::into)
    }
}

impl<V, S> StateSource for DashMap<String, V, S>
where
    V: Clone + Into<Value>,
    S: BuildHasher + Clone,
{
    fn get_state(&self, id: &str) -> Option<Value> {
        self.get(id).map(|entry| entry.value().clone().into())
    }
}

impl StateSource for Map<String, Json> {
    fn get_state(&self, id: &str) -> Option<Value> {
        self.get(id).map(Value::from)
    }
}

/// Engine-wide context shared by every `format` call
pub struct EngineContext {
    pub user: String,
    pub login_required: bool,
    pub instance: u64,
    pub language: String,
    /// Default pattern for `date`/`momentDate` without an argument
    pub date_format: String,
    pub translate: Translator,
    edit_mode: AtomicBool,
}

impl EngineContext {
    pub fn new(user: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            login_required: false,
            instance: 0,
            language: language.into(),
            date_format: crate::date::DEFAULT_DATE_FORMAT.to_string(),
            translate: Arc::new(|text| text.to_string()),
            edit_mode: AtomicBool::new(false),
        }
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode.load(Ordering::Acquire)
    }

    pub fn set_edit_mode(&self, enabled: bool) {
        self.edit_mode.store(enabled, Ordering::Release);
    }

    pub fn translate(&self, text: &str) -> String {
        (self.translate)(text)
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("user", &self.user)
            .field("login_required", &self.login_required)
            .field("instance", &self.instance)
            .field("language", &self.language)
            .field("date_format", &self.date_format)
            .field("edit_mode", &self.edit_mode())
            .finish_non_exhaustive()
    }
}

/// Widget record as stored by the view editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(default)]
    pub tpl: String,
    #[serde(default)]
    pub data: Map<String, Json>,
    #[serde(default)]
    pub style: Map<String, Json>,
}

/// Per-call inputs of [`FormattingEngine::format`](crate::FormattingEngine::format)
#[derive(Clone, Copy, Default)]
pub struct FormatRequest<'a> {
    pub view: &'a str,
    pub widget_id: &'a str,
    pub widget: Option<&'a Widget>,
    /// Data record of the widget being rendered (overrides `widget.data`)
    pub widget_data: Option<&'a Map<String, Json>>,
    /// Checked before the engine's own state source
    pub values: Option<&'a dyn StateSource>,
    /// Overrides the engine's default calendar for `momentDate`
    pub calendar: Option<&'a dyn Calendar>,
}

impl<'a> FormatRequest<'a> {
    pub fn new(view: &'a str, widget_id: &'a str) -> Self {
        Self {
            view,
            widget_id,
            ..Self::default()
        }
    }

    pub fn with_widget(mut self, widget: &'a Widget) -> Self {
        self.widget = Some(widget);
        self
    }

    pub fn with_widget_data(mut self, data: &'a Map<String, Json>) -> Self {
        self.widget_data = Some(data);
        self
    }

    pub fn with_values(mut self, values: &'a dyn StateSource) -> Self {
        self.values = Some(values);
        self
    }

    pub fn with_calendar(mut self, calendar: &'a dyn Calendar) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Active widget data: explicit record first, then the widget's own
    pub fn data(&self) -> Option<&'a Map<String, Json>> {
        self.widget_data.or(self.widget.map(|w| &w.data))
    }
}

impl fmt::Debug for FormatRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRequest")
            .field("view", &self.view)
            .field("widget_id", &self.widget_id)
            .field("widget", &self.widget)
            .field("widget_data", &self.widget_data)
            .field("values", &self.values.is_some())
            .field("calendar", &self.calendar.is_some())
            .finish()
    }
}
