//! Errors raised while assembling tool sets and talking to external actors.

use thiserror::Error;

/// Rejected tool registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateName(String),

    #[error("tool name '{0}' is reserved by the engine")]
    ReservedName(String),

    #[error("invalid tool name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

/// Failure of a remote tool provider during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("provider '{provider}' unavailable: {message}")]
    Unavailable { provider: String, message: String },

    /// The provider answered, but not with usable descriptors.
    #[error("provider '{provider}' protocol error: {message}")]
    Protocol { provider: String, message: String },
}

impl ProviderError {
    /// Name of the provider that failed.
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Unavailable { provider, .. }
            | ProviderError::Protocol { provider, .. } => provider,
        }
    }
}

/// Failure of a human interaction channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The other side went away (EOF, dropped script).
    #[error("interaction channel closed")]
    Closed,

    #[error("interaction channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let err = ProviderError::Unavailable {
            provider: "mcp".into(),
            message: "connection refused".into(),
        };
        assert_eq!(err.provider(), "mcp");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_channel_error_from_io() {
        let err: ChannelError = std::io::Error::other("broken pipe").into();
        assert!(matches!(err, ChannelError::Io(_)));
    }
}
