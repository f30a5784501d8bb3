use std::sync::Arc;

use serde_json::Value;

use crate::args::{Arguments, JoinRequest};
use crate::dispatcher::{CallContext, MethodHandler};
use crate::errors::BridgeError;
use crate::events::{BridgeEvent, HostContext};
use crate::flags::FeatureFlagSet;
use crate::options::ConferenceOptions;

/// The conferencing SDK, as far as this crate is concerned.
///
/// `launch` is fire-and-forget: it starts the meeting UI against `host` and
/// returns without waiting for the conference. Launch failures are the
/// engine's business.
pub trait ConferenceEngine: Send + Sync {
    fn launch(&self, host: &dyn HostContext, options: ConferenceOptions);
}

/// Assemble engine options from a validated request, always in the same
/// field order, flags last.
pub fn build_options(request: JoinRequest, flags: &FeatureFlagSet) -> ConferenceOptions {
    flags
        .iter()
        .fold(
            ConferenceOptions::builder(request.room, request.server_url)
                .subject(request.subject)
                .token(request.token)
                .audio_muted(request.is_audio_muted)
                .audio_only(request.is_audio_only)
                .video_muted(request.is_video_muted)
                .user_info(request.user_info),
            |builder, (key, value)| builder.feature_flag(key, value),
        )
        .build()
}

/// Handles `joinMeeting`.
pub struct JoinMeetingHandler {
    engine: Arc<dyn ConferenceEngine>,
}

impl JoinMeetingHandler {
    pub fn new(engine: Arc<dyn ConferenceEngine>) -> Self {
        Self { engine }
    }
}

impl MethodHandler for JoinMeetingHandler {
    fn handle(&self, payload: Value, ctx: &CallContext<'_>) -> Result<Option<String>, BridgeError> {
        let args = Arguments::from_value(payload)?;
        let request = JoinRequest::decode(&args)?;
        let flags = FeatureFlagSet::coerce(&request.feature_flags)?;
        let host = ctx.host.ok_or(BridgeError::HostUnavailable)?;

        let confirmation = format!("Successfully joined room: {}", request.room);
        tracing::info!(
            "launching meeting room={} server={} flags={}",
            request.room,
            request.server_url.as_str(),
            flags.len()
        );
        let options = build_options(request, &flags);
        self.engine.launch(host, options);

        Ok(Some(confirmation))
    }
}

/// Handles `closeMeeting`: broadcasts [`BridgeEvent::MeetingClose`] whether
/// or not a meeting is running. The payload is never read.
pub struct CloseMeetingHandler;

impl MethodHandler for CloseMeetingHandler {
    fn handle(&self, _payload: Value, ctx: &CallContext<'_>) -> Result<Option<String>, BridgeError> {
        let host = ctx.host.ok_or(BridgeError::HostUnavailable)?;
        tracing::info!("broadcasting {}", BridgeEvent::MeetingClose.name());
        host.send_broadcast(BridgeEvent::MeetingClose);
        Ok(None)
    }
}
