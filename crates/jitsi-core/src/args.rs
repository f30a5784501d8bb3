use serde_json::{Map, Value};
use url::Url;

use crate::errors::BridgeError;

/// Server used when the caller does not pass `serverUrl`.
pub const DEFAULT_SERVER_URL: &str = "https://meet.jit.si";

/// Untyped arguments of a method call, as sent by the host runtime.
///
/// A JSON `null` value is treated the same as an absent key, matching how the
/// host's codec encodes unset optionals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    inner: Map<String, Value>,
}

impl Arguments {
    pub fn new(inner: Map<String, Value>) -> Self {
        Self { inner }
    }

    /// Accepts an object, or `null` for calls that carry no arguments.
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        match value {
            Value::Object(inner) => Ok(Self { inner }),
            Value::Null => Ok(Self::default()),
            other => Err(BridgeError::MalformedPayload(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key).filter(|v| !v.is_null())
    }

    pub fn optional_str(&self, key: &'static str) -> Result<Option<&str>, BridgeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(BridgeError::WrongType { field: key, expected: "a string" }),
        }
    }

    pub fn required_str(&self, key: &'static str) -> Result<&str, BridgeError> {
        self.optional_str(key)?
            .ok_or(BridgeError::MissingArgument(key))
    }

    pub fn required_bool(&self, key: &'static str) -> Result<bool, BridgeError> {
        match self.get(key) {
            None => Err(BridgeError::MissingArgument(key)),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(BridgeError::WrongType { field: key, expected: "a boolean" }),
        }
    }

    pub fn required_object(&self, key: &'static str) -> Result<&Map<String, Value>, BridgeError> {
        match self.get(key) {
            None => Err(BridgeError::MissingArgument(key)),
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(BridgeError::WrongType { field: key, expected: "an object" }),
        }
    }
}

/// A URL that parsed successfully. Keeps the caller's text so it is handed
/// to the engine exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    raw: String,
    url: Url,
}

impl ParsedUrl {
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, BridgeError> {
        let url = Url::parse(raw).map_err(|e| BridgeError::InvalidUrl {
            field,
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { raw: raw.to_string(), url })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<ParsedUrl>,
}

/// Validated arguments of a `joinMeeting` call.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRequest {
    /// Trimmed, never empty.
    pub room: String,
    pub server_url: ParsedUrl,
    pub subject: Option<String>,
    pub token: Option<String>,
    pub is_audio_muted: bool,
    pub is_audio_only: bool,
    pub is_video_muted: bool,
    pub user_info: UserInfo,
    /// Still untyped; see [`crate::flags::FeatureFlagSet::coerce`].
    pub feature_flags: Map<String, Value>,
}

impl JoinRequest {
    /// Decode a `joinMeeting` payload.
    ///
    /// Fields are read in the order the host plugin always has: a blank room
    /// is reported before anything else is looked at. An absent `serverUrl`
    /// means [`DEFAULT_SERVER_URL`].
    pub fn decode(args: &Arguments) -> Result<Self, BridgeError> {
        let room = args.required_str("room")?.trim();
        if room.is_empty() {
            return Err(BridgeError::BlankRoom);
        }

        let server_url = args
            .optional_str("serverUrl")?
            .unwrap_or(DEFAULT_SERVER_URL);
        let server_url = ParsedUrl::parse("serverUrl", server_url)?;

        let subject = args.optional_str("subject")?.map(str::to_string);
        let token = args.optional_str("token")?.map(str::to_string);
        let is_audio_muted = args.required_bool("isAudioMuted")?;
        let is_audio_only = args.required_bool("isAudioOnly")?;
        let is_video_muted = args.required_bool("isVideoMuted")?;

        let user_info = UserInfo {
            display_name: args.optional_str("userDisplayName")?.map(str::to_string),
            email: args.optional_str("userEmail")?.map(str::to_string),
            avatar_url: args
                .optional_str("userAvatarUrl")?
                .map(|raw| ParsedUrl::parse("userAvatarUrl", raw))
                .transpose()?,
        };

        let feature_flags = args.required_object("featureFlags")?.clone();

        Ok(Self {
            room: room.to_string(),
            server_url,
            subject,
            token,
            is_audio_muted,
            is_audio_only,
            is_video_muted,
            user_info,
            feature_flags,
        })
    }
}
