//! Jitsi Meet bridge core.
//!
//! Decodes method-channel calls from a cross-platform host, validates and
//! translates them into conference options, and hands them to the native
//! conferencing engine. Pure Rust crate with no platform dependencies.
//! Consumed by native plugin shells via UniFFI bindings.

pub mod args;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod flags;
pub mod meeting;
pub mod options;

pub use args::{Arguments, DEFAULT_SERVER_URL, JoinRequest, ParsedUrl, UserInfo};
pub use dispatcher::{CallContext, Command, Dispatcher, METHOD_CHANNEL, MethodHandler, MethodReply};
pub use errors::BridgeError;
pub use events::{BridgeEvent, HostContext, MEETING_CLOSE_EVENT};
pub use flags::{FeatureFlag, FeatureFlagSet};
pub use meeting::{CloseMeetingHandler, ConferenceEngine, JoinMeetingHandler};
pub use options::{ConferenceOptions, ConferenceOptionsBuilder};
