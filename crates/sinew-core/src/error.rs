//! Error types for Sinew

use thiserror::Error;

/// The main error type for Sinew operations
#[derive(Debug, Error)]
pub enum SinewError {
    #[error("Clip not found: {0}")]
    ClipNotFound(String),

    #[error("Bone not found: {0}")]
    BoneNotFound(String),

    #[error("Duplicate bone name: {0}")]
    DuplicateBone(String),

    #[error("Bone id {id} exceeds the skeleton limit of {max} bones")]
    BoneLimitExceeded { id: usize, max: usize },

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Invalid clip: {0}")]
    InvalidClip(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Sinew operations
pub type Result<T> = std::result::Result<T, SinewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bone_limit_message_names_both_values() {
        let err = SinewError::BoneLimitExceeded { id: 120, max: 100 };
        assert_eq!(
            err.to_string(),
            "Bone id 120 exceeds the skeleton limit of 100 bones"
        );
    }
}
