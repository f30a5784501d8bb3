use std::any::Any;

/// Broadcast name the meeting activity listens on to close itself.
pub const MEETING_CLOSE_EVENT: &str = "JITSI_MEETING_CLOSE";

/// Out-of-band events the core sends to the hosting environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    MeetingClose,
}

impl BridgeEvent {
    /// Name the event is broadcast under. Carries no payload.
    pub fn name(self) -> &'static str {
        match self {
            Self::MeetingClose => MEETING_CLOSE_EVENT,
        }
    }
}

/// The currently attached hosting context (an Android activity, an iOS view
/// controller). Hosts attach and detach it on their own lifecycle; the core
/// only ever borrows it for the duration of one dispatch.
///
/// Implementations must be Send + Sync (the host may dispatch from any thread).
/// Engines that need their own view of the host can downcast through `Any`.
pub trait HostContext: Any + Send + Sync {
    fn send_broadcast(&self, event: BridgeEvent);
}
