use thiserror::Error;

/// A raw status code that is not part of a status space
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} status '{code}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub code: String,
}

/// Problems found while building a transition registry from a rule set
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate transition rule from '{from}' to '{to}'")]
    DuplicateRule { from: String, to: String },

    #[error("Transition rule from '{status}' to itself is not allowed")]
    SelfLoop { status: String },

    #[error("Terminal status '{from}' cannot have an outbound rule (to '{to}')")]
    TerminalSource { from: String, to: String },

    #[error("Transition rule from '{from}' to '{to}' allows no roles")]
    NoAllowedRoles { from: String, to: String },

    #[error("Failed to read rule table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Reasons a status history entry could not be created
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Status history entry requires an entity id")]
    MissingEntityId,

    #[error("Status history entry requires an actor")]
    MissingActor,

    #[error("Status is already '{status}'")]
    Unchanged { status: String },

    #[error("Transition rejected: {}", .errors.join("; "))]
    Rejected { errors: Vec<String> },
}
