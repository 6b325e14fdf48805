use crate::route::RouteLocation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a decision handler hands back, before normalization.
///
/// Handlers normally answer with one of the sentinels (`Next`, `Abort`) or a
/// redirect `Location`. `Value` carries anything else, the way a dynamically
/// shaped return would: a path string or a location-shaped object still
/// redirects, everything else fails closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The "allow" sentinel.
    Next,
    /// The "block" sentinel.
    Abort,
    Location(RouteLocation),
    Value(Value),
}

impl From<RouteLocation> for Reply {
    fn from(loc: RouteLocation) -> Self {
        Reply::Location(loc)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl From<Outcome> for Reply {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Continue => Reply::Next,
            Outcome::Stop => Reply::Abort,
            Outcome::Redirect(loc) => Reply::Location(loc),
        }
    }
}

/// The canonical result of one outpost execution or one pipeline pass.
///
/// Nothing past the normalizer looks at a raw [`Reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum Outcome {
    Continue,
    Stop,
    Redirect(RouteLocation),
}

impl Outcome {
    pub fn is_continue(&self) -> bool {
        matches!(self, Outcome::Continue)
    }

    /// `Stop` and `Redirect` end the current pipeline pass.
    pub fn is_terminal(&self) -> bool {
        !self.is_continue()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Continue => "continue",
            Outcome::Stop => "stop",
            Outcome::Redirect(_) => "redirect",
        }
    }

    /// Normalize any reply. Unrecognized replies become `Stop`.
    pub fn normalize(reply: Reply) -> Outcome {
        Outcome::recognize(reply).unwrap_or(Outcome::Stop)
    }

    /// Normalize a reply, returning `None` when its shape is not recognized.
    ///
    /// Error and timeout policies use this to detect a useless answer and fall
    /// back to the default policy instead of silently stopping.
    pub fn recognize(reply: Reply) -> Option<Outcome> {
        match reply {
            Reply::Next => Some(Outcome::Continue),
            Reply::Abort => Some(Outcome::Stop),
            Reply::Location(loc) => loc.is_addressable().then_some(Outcome::Redirect(loc)),
            Reply::Value(value) => recognize_value(value),
        }
    }
}

fn recognize_value(value: Value) -> Option<Outcome> {
    match value {
        Value::String(path) if !path.is_empty() => {
            Some(Outcome::Redirect(RouteLocation::path(path)))
        }
        Value::Object(map) if map.contains_key("name") || map.contains_key("path") => {
            serde_json::from_value::<RouteLocation>(Value::Object(map))
                .ok()
                .filter(RouteLocation::is_addressable)
                .map(Outcome::Redirect)
        }
        _ => None,
    }
}
