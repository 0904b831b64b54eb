use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    /// The parts database cannot be reached at all (connection-level failure).
    ///
    /// The resolver treats this as "part not found" for a single lookup,
    /// degrading to weaker strategies instead of failing the resolution.
    #[error("parts database unavailable: {0}")]
    Unavailable(String),

    /// A query reached the database but failed (bad result, decode error).
    #[error("parts database query failed: {0}")]
    Query(String),

    /// Interchange data could not be interpreted.
    #[error("invalid interchange row: {0}")]
    InvalidInterchange(String),
}

impl MappingError {
    /// Whether this error means the database could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;
