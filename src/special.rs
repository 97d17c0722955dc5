//! Reserved state identifiers answered from the formatting context

use crate::context::{EngineContext, FormatRequest};
use crate::value::Value;

/// Identifiers that never reach the state source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialValue {
    /// `username`: active user
    Username,
    /// `login`: whether login is required
    Login,
    /// `instance`: numeric instance id
    Instance,
    /// `language`: active UI language
    Language,
    /// `wid`: id of the widget being rendered
    WidgetId,
    /// `wname`: widget `data.name`, falling back to the widget id
    WidgetName,
    /// `view`: current view
    View,
}

impl SpecialValue {
    /// Match a full state reference such as `"username.val"`
    pub fn from_ref(state_ref: &str) -> Option<Self> {
        let special = match state_ref {
            "username.val" => Self::Username,
            "login.val" => Self::Login,
            "instance.val" => Self::Instance,
            "language.val" => Self::Language,
            "wid.val" => Self::WidgetId,
            "wname.val" => Self::WidgetName,
            "view.val" => Self::View,
            _ => return None,
        };
        Some(special)
    }

    pub fn resolve(self, ctx: &EngineContext, request: &FormatRequest<'_>) -> Value {
        match self {
            Self::Username => Value::from(ctx.user.as_str()),
            Self::Login => Value::Bool(ctx.login_required),
            Self::Instance => Value::Number(ctx.instance as f64),
            Self::Language => Value::from(ctx.language.as_str()),
            Self::WidgetId => Value::from(request.widget_id),
            Self::WidgetName => request
                .data()
                .and_then(|d| d.get("name"))
                .filter(|name| !name.is_null() && name.as_str() != Some(""))
                .map(Value::from)
                .unwrap_or_else(|| Value::from(request.widget_id)),
            Self::View => Value::from(request.view),
        }
    }
}
