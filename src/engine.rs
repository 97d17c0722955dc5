//! Template formatting engine
//!
//! ```text
//! template ──► bindings (cache or parser)
//!              └─► per binding: resolve value ─► pipeline ─► substitute token
//!          ──► unescape `{{` `}}`
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::binding::{Binding, BindingCache, BindingParser, TokenParser};
use crate::config::EngineConfig;
use crate::context::{EngineContext, FormatRequest, StateSource};
use crate::date::{Calendar, DateFormatter};
use crate::error::Result;
use crate::formula::FormulaLimits;
use crate::pipeline::Pipeline;
use crate::special::SpecialValue;
use crate::value::Value;

/// Shared live-state source
pub type SharedStates = Arc<dyn StateSource + Send + Sync>;

/// Restore literal braces: `{{` → `{`, `}}` → `}`
pub fn unescape(text: &str) -> String {
    text.replace("{{", "{").replace("}}", "}")
}

/// Resolves templates like `"{hall.temp;round(1)} °C"` into display text
pub struct FormattingEngine {
    pub(crate) context: EngineContext,
    states: SharedStates,
    parser: Box<dyn BindingParser>,
    cache: BindingCache,
    pub(crate) calendar: Option<Arc<dyn Calendar>>,
    pub(crate) dates: DateFormatter,
    pub(crate) limits: FormulaLimits,
}

impl FormattingEngine {
    pub fn new(config: &EngineConfig, states: SharedStates) -> Result<Self> {
        let mut context = EngineContext::new(config.user.clone(), config.language.clone());
        context.login_required = config.login_required;
        context.instance = config.instance;
        context.date_format = config.date_format.clone();

        Ok(Self {
            context,
            states,
            parser: Box::new(TokenParser::new(config.max_bindings)),
            cache: BindingCache::new(),
            calendar: None,
            dates: DateFormatter::new(config.zone()?),
            limits: config.formula,
        })
    }

    /// Replace the default token parser
    pub fn with_parser(mut self, parser: impl BindingParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn with_translator(mut self, translate: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.context.translate = Arc::new(translate);
        self
    }

    /// Default calendar for `momentDate` (a request may still override it)
    pub fn with_calendar(mut self, calendar: Arc<dyn Calendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn cache(&self) -> &BindingCache {
        &self.cache
    }

    /// Edit mode bypasses the binding cache (no reads, no writes)
    pub fn set_edit_mode(&self, enabled: bool) {
        self.context.set_edit_mode(enabled);
    }

    /// Parsed bindings of `template`, through the cache unless in edit mode
    pub fn bindings(&self, template: &str) -> Vec<Binding> {
        let edit_mode = self.context.edit_mode();
        if !edit_mode {
            if let Some(cached) = self.cache.get(template) {
                return cached;
            }
        }

        let parsed = self.parser.parse(template).unwrap_or_default();
        if !edit_mode {
            self.cache.insert(template, &parsed);
        }
        parsed
    }

    /// Substitute every binding of `template`
    ///
    /// Never fails: operator problems are logged and the affected value
    /// degrades (unchanged, `0` for formulas, empty for dates).
    pub fn format(&self, template: &str, request: &FormatRequest<'_>) -> String {
        let bindings = self.bindings(template);
        if bindings.is_empty() {
            return unescape(template);
        }
        debug!(template, bindings = bindings.len(), "formatting template");

        let mut output = template.to_string();
        for binding in &bindings {
            let value = self.lookup(&binding.state_ref, request);
            let value = Pipeline::new(self, request, binding).run(value);
            output = output.replacen(&binding.token, &value.to_string(), 1);
        }
        unescape(&output)
    }

    /// Current value of `state_ref`: reserved identifiers, then the request
    /// override, then the engine's states
    ///
    /// A `.val` reference also matches a state stored under its bare id.
    pub fn lookup(&self, state_ref: &str, request: &FormatRequest<'_>) -> Value {
        if let Some(special) = SpecialValue::from_ref(state_ref) {
            return special.resolve(&self.context, request);
        }

        let bare = state_ref.strip_suffix(".val");
        let find = |source: &dyn StateSource| {
            source
                .get_state(state_ref)
                .or_else(|| bare.and_then(|id| source.get_state(id)))
        };

        request
            .values
            .and_then(find)
            .or_else(|| find(self.states.as_ref()))
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for FormattingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormattingEngine")
            .field("context", &self.context)
            .field("cached_templates", &self.cache.len())
            .field("calendar", &self.calendar.is_some())
            .field("dates", &self.dates)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn engine(states: &[(&str, f64)]) -> FormattingEngine {
        let map: HashMap<String, f64> = states.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        FormattingEngine::new(&EngineConfig::default(), Arc::new(map)).unwrap()
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormattingEngine>();
    }

    #[test]
    fn unescapes_literal_braces() {
        assert_eq!(unescape("{{a}} and }}"), "{a} and }");
    }

    #[test]
    fn substitutes_each_token_once_in_order() {
        let engine = engine(&[("a.val", 1.0), ("b.val", 2.0)]);
        let out = engine.format("{a}+{b}={a}", &FormatRequest::default());
        assert_eq!(out, "1+2=1");
    }

    #[test]
    fn bare_ids_match_val_references() {
        let engine = engine(&[("hall.temp", 21.5)]);
        assert_eq!(engine.format("{hall.temp}", &FormatRequest::default()), "21.5");
        assert_eq!(engine.format("{hall.temp.ts}", &FormatRequest::default()), "undefined");
    }

    #[test]
    fn request_values_take_precedence() {
        let engine = engine(&[("a.val", 1.0)]);
        let overrides: HashMap<String, f64> = [("a.val".to_string(), 9.0)].into_iter().collect();
        let request = FormatRequest::default().with_values(&overrides);
        assert_eq!(engine.format("{a}", &request), "9");
    }

    #[test]
    fn cache_is_filled_outside_edit_mode_only() {
        let engine = engine(&[]);
        engine.set_edit_mode(true);
        engine.format("{x}", &FormatRequest::default());
        assert!(engine.cache().is_empty());

        engine.set_edit_mode(false);
        engine.format("{x}", &FormatRequest::default());
        engine.format("plain", &FormatRequest::default());
        assert_eq!(engine.cache().len(), 2);
    }
}
