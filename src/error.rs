use thiserror::Error;

#[derive(Error, Debug)]
pub enum GestureSceneError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Landmark source error: {0}")]
    Source(#[from] SourceError),
}

/// Failures of the landmark producer. These are the only failures that ever
/// leave the control core, and only when the source cannot be brought up.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open landmark source {source_name}: {details}")]
    Open { source_name: String, details: String },

    #[error("Landmark source {0} is not open")]
    NotOpen(String),
}

/// Rejection reasons for raw landmark data. The pipeline downgrades these to
/// "no hand visible".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("Expected {expected} landmarks, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Receiver lagged behind by {0} events")]
    Lagged(u64),

    #[error("Event channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, GestureSceneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_converts() {
        let err: GestureSceneError = SourceError::NotOpen("replay".to_string()).into();
        assert!(matches!(err, GestureSceneError::Source(_)));
        assert!(err.to_string().contains("replay"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: GestureSceneError =
            config::ConfigError::Message("bad range".to_string()).into();
        assert!(matches!(err, GestureSceneError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
