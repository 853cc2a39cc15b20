use thiserror::Error;

/// Errors surfaced to the caller. Lookups that miss are not errors; they
/// come back as `None`/`false` and the caller no-ops.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("bookmark label must not be empty")]
    EmptyLabel,

    #[error("please select a group, file, or bookmark")]
    EmptySelection,

    #[error("no files to include")]
    NothingToInclude,

    #[error("built-in group '{0}' cannot be modified")]
    BuiltInGroup(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GroupError>;
