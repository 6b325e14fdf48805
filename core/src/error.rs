use thiserror::Error;

/// Failure raised by a handler, its loader, or a custom policy.
#[derive(Error, Debug)]
pub enum UnitError {
    #[error("outpost rejected the navigation: {0}")]
    Failed(String),
    #[error("failed to load outpost handler: {0}")]
    Load(String),
    #[error("outpost handler panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UnitError {
    pub fn failed(msg: impl Into<String>) -> Self {
        UnitError::Failed(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        UnitError::Load(msg.into())
    }
}

/// Why a definition could not be registered, or is stored but inert.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("outpost definition is missing a name")]
    MissingName,
    #[error("outpost `{0}` has no handler")]
    MissingHandler(String),
    #[error("outpost `{0}` declares an empty phase set")]
    EmptyPhases(String),
    #[error("outpost `{name}` declares unknown phases: {phases:?}")]
    UnknownPhases { name: String, phases: Vec<String> },
}

impl DefinitionError {
    /// Configuration errors leave the outpost stored but excluded from
    /// phase-filtered execution; the others skip registration.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DefinitionError::MissingName | DefinitionError::MissingHandler(_)
        )
    }
}

/// A registry or route lookup that did not find its target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("route `{0}` is not known to the router")]
    UnknownRoute(String),
    #[error("{scope} outpost `{name}` is not registered")]
    UnknownOutpost { scope: crate::Scope, name: String },
    #[error("outpost `{name}` is not attached to route `{route}`")]
    NotAttached { route: String, name: String },
    #[error("engine has been torn down")]
    TornDown,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value `{value}` for setting `{key}`")]
    InvalidValue { key: String, value: String },
}
