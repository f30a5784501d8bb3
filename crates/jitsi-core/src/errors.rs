use thiserror::Error;

/// Reply code for input the caller can fix (blank room, bad URL, bad flag).
pub const CODE_INVALID_ARGUMENT: &str = "400";
/// Reply code when no host context is attached.
pub const CODE_HOST_UNAVAILABLE: &str = "503";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("room can not be null or empty")]
    BlankRoom,
    #[error("{field} is not a valid URL: '{value}' ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("feature flag '{key}' must be a boolean or an integer, got {value}")]
    FeatureFlag { key: String, value: String },
    #[error("host context is not attached")]
    HostUnavailable,
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),
    #[error("argument '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl BridgeError {
    /// True when the caller broke the channel protocol rather than sending
    /// bad user input. These are never turned into error replies.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_) | Self::WrongType { .. } | Self::MalformedPayload(_)
        )
    }

    /// Machine-readable reply code, `None` for contract violations.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::BlankRoom | Self::InvalidUrl { .. } | Self::FeatureFlag { .. } => {
                Some(CODE_INVALID_ARGUMENT)
            }
            Self::HostUnavailable => Some(CODE_HOST_UNAVAILABLE),
            Self::MissingArgument(_) | Self::WrongType { .. } | Self::MalformedPayload(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_room_keeps_plugin_message() {
        let err = BridgeError::BlankRoom;
        assert_eq!(err.to_string(), "room can not be null or empty");
        assert_eq!(err.code(), Some("400"));
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn contract_violations_have_no_code() {
        for err in [
            BridgeError::MissingArgument("room"),
            BridgeError::WrongType { field: "isAudioMuted", expected: "a boolean" },
            BridgeError::MalformedPayload("expected an object".into()),
        ] {
            assert!(err.is_contract_violation());
            assert_eq!(err.code(), None);
        }
    }

    #[test]
    fn host_unavailable_maps_to_503() {
        assert_eq!(BridgeError::HostUnavailable.code(), Some("503"));
    }
}
