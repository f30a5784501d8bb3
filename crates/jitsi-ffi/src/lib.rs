//! UniFFI bindings for jitsi-core.
//!
//! Provides a JitsiClient object that wraps the method dispatcher and the
//! attached host into a single FFI-safe interface for the Android and iOS
//! plugin shells.

use std::any::Any;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use jitsi_core::{
    self, BridgeError as CoreBridgeError, BridgeEvent as CoreBridgeEvent, CallContext,
    ConferenceEngine as CoreConferenceEngine, ConferenceOptions as CoreConferenceOptions,
    Dispatcher, FeatureFlag as CoreFeatureFlag, HostContext as CoreHostContext,
    MethodReply as CoreMethodReply, UserInfo as CoreUserInfo,
};
use serde_json::Value;

uniffi::include_scaffolding!("jitsi");

/// Log tag the Android plugin has always used.
const PLUGIN_TAG: &str = "JITSI_MEET_PLUGIN";

// ── Platform log helper ──────────────────────────────────────────────

/// Write a message to logcat on Android, syslog on iOS, or stderr elsewhere.
fn bridge_log(msg: &str) {
    #[cfg(target_os = "android")]
    {
        use std::ffi::CString;
        unsafe extern "C" {
            fn __android_log_write(prio: i32, tag: *const std::ffi::c_char, text: *const std::ffi::c_char) -> i32;
        }
        let Ok(tag) = CString::new(PLUGIN_TAG) else { return };
        let Ok(text) = CString::new(msg.replace('\0', " ")) else { return };
        unsafe { __android_log_write(4 /* INFO */, tag.as_ptr(), text.as_ptr()); }
    }
    #[cfg(target_os = "ios")]
    {
        use std::ffi::CString;
        unsafe extern "C" {
            fn syslog(priority: i32, message: *const std::ffi::c_char, ...);
        }
        let Ok(text) = CString::new(format!("{PLUGIN_TAG}: {}", msg.replace('\0', " "))) else { return };
        unsafe { syslog(6 /* LOG_INFO */, text.as_ptr()); }
    }
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    eprintln!("{PLUGIN_TAG}: {msg}");
}

// ── Namespace functions ──────────────────────────────────────────────

/// Initialize tracing/logging. Call once from the host before using JitsiClient.
fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("jitsi_core=debug,jitsi_ffi=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .try_init();
    });
}

// ── FFI-safe type conversions ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureFlagValue {
    Bool { value: bool },
    Int { value: i32 },
}

impl From<CoreFeatureFlag> for FeatureFlagValue {
    fn from(f: CoreFeatureFlag) -> Self {
        match f {
            CoreFeatureFlag::Bool(value) => Self::Bool { value },
            CoreFeatureFlag::Int(value) => Self::Int { value },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlagEntry {
    pub key: String,
    pub value: FeatureFlagValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&CoreUserInfo> for UserInfo {
    fn from(u: &CoreUserInfo) -> Self {
        Self {
            display_name: u.display_name.clone(),
            email: u.email.clone(),
            avatar_url: u.avatar_url.as_ref().map(|url| url.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConferenceOptions {
    pub room: String,
    pub server_url: String,
    pub subject: Option<String>,
    pub token: Option<String>,
    pub audio_muted: bool,
    pub audio_only: bool,
    pub video_muted: bool,
    pub user_info: UserInfo,
    pub feature_flags: Vec<FeatureFlagEntry>,
}

impl From<CoreConferenceOptions> for ConferenceOptions {
    fn from(o: CoreConferenceOptions) -> Self {
        Self {
            room: o.room().to_string(),
            server_url: o.server_url().as_str().to_string(),
            subject: o.subject().map(str::to_string),
            token: o.token().map(str::to_string),
            audio_muted: o.audio_muted(),
            audio_only: o.audio_only(),
            video_muted: o.video_muted(),
            user_info: o.user_info().into(),
            feature_flags: o
                .feature_flags()
                .iter()
                .map(|(key, value)| FeatureFlagEntry {
                    key: key.clone(),
                    value: (*value).into(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodReply {
    Success { value: Option<String> },
    Error { code: String, message: String, details: Option<String> },
    NotImplemented,
}

impl From<CoreMethodReply> for MethodReply {
    fn from(r: CoreMethodReply) -> Self {
        match r {
            CoreMethodReply::Success(value) => Self::Success { value },
            CoreMethodReply::Error { code, message, details } => {
                Self::Error { code, message, details }
            }
            CoreMethodReply::NotImplemented => Self::NotImplemented,
        }
    }
}

// ── Error conversion ──────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Contract violation: {msg}")]
    ContractViolation { msg: String },
    #[error("Rejected: {msg}")]
    Rejected { msg: String },
    #[error("Panic: {msg}")]
    Panic { msg: String },
}

impl From<CoreBridgeError> for BridgeError {
    fn from(e: CoreBridgeError) -> Self {
        tracing::error!("BridgeError: {e}");
        let msg = e.to_string();
        match e {
            CoreBridgeError::MissingArgument(_)
            | CoreBridgeError::WrongType { .. }
            | CoreBridgeError::MalformedPayload(_) => Self::ContractViolation { msg },
            CoreBridgeError::BlankRoom
            | CoreBridgeError::InvalidUrl { .. }
            | CoreBridgeError::FeatureFlag { .. }
            | CoreBridgeError::HostUnavailable => Self::Rejected { msg },
        }
    }
}

// ── Foreign-implemented traits ────────────────────────────────────────

/// Broadcast sink of the currently attached activity/view controller.
pub trait HostContext: Send + Sync {
    fn send_broadcast(&self, event_name: String);
}

/// Starts the native meeting UI from `host`. Implemented by the plugin shell.
pub trait ConferenceEngine: Send + Sync {
    fn launch(&self, host: Arc<dyn HostContext>, options: ConferenceOptions);
}

// ── Bridges: foreign objects → core traits ────────────────────────────

struct EngineBridge {
    ffi_engine: Arc<dyn ConferenceEngine>,
}

impl CoreConferenceEngine for EngineBridge {
    fn launch(&self, host: &dyn CoreHostContext, options: CoreConferenceOptions) {
        let host: &dyn Any = host;
        match host.downcast_ref::<HostBridge>() {
            Some(bridge) => self.ffi_engine.launch(bridge.ffi_host.clone(), options.into()),
            None => tracing::error!("launch skipped: host was not attached through JitsiClient"),
        }
    }
}

struct HostBridge {
    ffi_host: Arc<dyn HostContext>,
}

impl CoreHostContext for HostBridge {
    fn send_broadcast(&self, event: CoreBridgeEvent) {
        self.ffi_host.send_broadcast(event.name().to_string());
    }
}

/// Empty text is "no arguments"; text that is not JSON is handed on as a
/// plain string, which handlers that need an object reject.
fn parse_payload(arguments_json: String) -> Value {
    if arguments_json.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&arguments_json).unwrap_or_else(|e| {
        tracing::debug!("arguments are not JSON ({e}), passing them as text");
        Value::String(arguments_json)
    })
}

// ── JitsiClient: main FFI object ──────────────────────────────────────

pub struct JitsiClient {
    dispatcher: Dispatcher,
    /// Written only by the host lifecycle (attach/detach); every dispatch
    /// takes a snapshot.
    host: StdMutex<Option<Arc<HostBridge>>>,
}

impl JitsiClient {
    pub fn new(engine: Arc<dyn ConferenceEngine>) -> Self {
        bridge_log(&format!(
            "JitsiClient::new() on channel {}",
            jitsi_core::METHOD_CHANNEL
        ));
        let engine: Arc<dyn CoreConferenceEngine> = Arc::new(EngineBridge { ffi_engine: engine });
        Self {
            dispatcher: Dispatcher::new(engine),
            host: StdMutex::new(None),
        }
    }

    // The slot is replaced in one assignment, so a poisoned lock still holds
    // a whole value.
    fn host_slot(&self) -> MutexGuard<'_, Option<Arc<HostBridge>>> {
        self.host.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called when the plugin attaches to an activity, including
    /// re-attachment after a configuration change.
    pub fn attach_host(&self, host: Arc<dyn HostContext>) {
        bridge_log("host attached");
        *self.host_slot() = Some(Arc::new(HostBridge { ffi_host: host }));
    }

    pub fn detach_host(&self) {
        bridge_log("host detached");
        *self.host_slot() = None;
    }

    pub fn is_host_attached(&self) -> bool {
        self.host_slot().is_some()
    }

    pub fn dispatch(&self, method: String, arguments_json: String) -> Result<MethodReply, BridgeError> {
        let host = self.host_slot().clone();

        // Wrap in catch_unwind to prevent panics from crossing the FFI boundary.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let ctx = CallContext {
                host: host.as_deref().map(|h| h as &dyn CoreHostContext),
            };
            self.dispatcher.dispatch(&method, parse_payload(arguments_json), &ctx)
        }));

        match result {
            Ok(Ok(reply)) => Ok(reply.into()),
            Ok(Err(e)) => Err(e.into()),
            Err(panic_info) => {
                let msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                bridge_log(&format!("dispatch({method}) PANIC caught: {msg}"));
                Err(BridgeError::Panic { msg: format!("panic in {method}: {msg}") })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records options and marks the host it was handed with a broadcast.
    #[derive(Clone, Default)]
    struct RecordingEngine {
        launched: Arc<StdMutex<Vec<ConferenceOptions>>>,
    }

    impl ConferenceEngine for RecordingEngine {
        fn launch(&self, host: Arc<dyn HostContext>, options: ConferenceOptions) {
            host.send_broadcast(format!("launched:{}", options.room));
            self.launched.lock().unwrap().push(options);
        }
    }

    #[derive(Clone, Default)]
    struct RecordingHost {
        events: Arc<StdMutex<Vec<String>>>,
    }

    impl HostContext for RecordingHost {
        fn send_broadcast(&self, event_name: String) {
            self.events.lock().unwrap().push(event_name);
        }
    }

    const STANDUP: &str = r#"{
        "room": "team-standup",
        "isAudioMuted": true,
        "isAudioOnly": false,
        "isVideoMuted": false,
        "userAvatarUrl": "https://example.com/a.png",
        "featureFlags": { "welcomepage.enabled": false, "toolbar.timeout": 5000 }
    }"#;

    fn client() -> (JitsiClient, RecordingEngine) {
        let engine = RecordingEngine::default();
        (JitsiClient::new(Arc::new(engine.clone())), engine)
    }

    #[test]
    fn test_join_hands_ffi_options_to_engine() {
        let (client, engine) = client();
        client.attach_host(Arc::new(RecordingHost::default()));

        let reply = client.dispatch("joinMeeting".into(), STANDUP.into()).unwrap();
        assert_eq!(
            reply,
            MethodReply::Success { value: Some("Successfully joined room: team-standup".into()) }
        );

        let launched = engine.launched.lock().unwrap();
        assert_eq!(launched.len(), 1);
        let options = &launched[0];
        assert_eq!(options.server_url, "https://meet.jit.si");
        assert_eq!(options.user_info.avatar_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(
            options.feature_flags,
            vec![
                FeatureFlagEntry {
                    key: "toolbar.timeout".into(),
                    value: FeatureFlagValue::Int { value: 5000 },
                },
                FeatureFlagEntry {
                    key: "welcomepage.enabled".into(),
                    value: FeatureFlagValue::Bool { value: false },
                },
            ]
        );
    }

    #[test]
    fn test_engine_launches_from_host_attached_at_dispatch() {
        let (client, engine) = client();
        let first = RecordingHost::default();
        let second = RecordingHost::default();

        client.attach_host(Arc::new(first.clone()));
        client.detach_host();
        client.attach_host(Arc::new(second.clone()));

        client.dispatch("joinMeeting".into(), STANDUP.into()).unwrap();
        assert_eq!(engine.launched.lock().unwrap().len(), 1);
        assert!(first.events.lock().unwrap().is_empty());
        assert_eq!(*second.events.lock().unwrap(), ["launched:team-standup"]);
    }

    #[test]
    fn test_close_broadcasts_to_attached_host() {
        let (client, _engine) = client();
        let host = RecordingHost::default();
        client.attach_host(Arc::new(host.clone()));

        let reply = client.dispatch("closeMeeting".into(), "null".into()).unwrap();
        assert_eq!(reply, MethodReply::Success { value: None });
        let reply = client.dispatch("closeMeeting".into(), String::new()).unwrap();
        assert_eq!(reply, MethodReply::Success { value: None });
        assert_eq!(*host.events.lock().unwrap(), ["JITSI_MEETING_CLOSE", "JITSI_MEETING_CLOSE"]);
    }

    #[test]
    fn test_close_accepts_arguments_that_are_not_json() {
        let (client, _engine) = client();
        let host = RecordingHost::default();
        client.attach_host(Arc::new(host.clone()));

        for args in ["bye", "{not json", "[1]"] {
            let reply = client.dispatch("closeMeeting".into(), args.into()).unwrap();
            assert_eq!(reply, MethodReply::Success { value: None });
        }
        assert_eq!(host.events.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_detached_host_is_reported() {
        let (client, engine) = client();
        client.attach_host(Arc::new(RecordingHost::default()));
        client.detach_host();
        assert!(!client.is_host_attached());

        let reply = client.dispatch("joinMeeting".into(), STANDUP.into()).unwrap();
        assert!(matches!(reply, MethodReply::Error { ref code, .. } if code == "503"));
        assert!(engine.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_method_and_contract_violations() {
        let (client, _engine) = client();
        client.attach_host(Arc::new(RecordingHost::default()));

        let reply = client.dispatch("pingMeeting".into(), "{}".into()).unwrap();
        assert_eq!(reply, MethodReply::NotImplemented);

        let err = client.dispatch("joinMeeting".into(), "{}".into()).unwrap_err();
        assert!(matches!(err, BridgeError::ContractViolation { .. }));

        let err = client.dispatch("joinMeeting".into(), "{not json".into()).unwrap_err();
        assert!(matches!(err, BridgeError::ContractViolation { .. }));
    }

    #[test]
    fn test_host_slot_survives_poisoned_lock() {
        let (client, _engine) = client();
        let host = RecordingHost::default();
        client.attach_host(Arc::new(host.clone()));

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = client.host.lock().unwrap();
            panic!("poison the host lock");
        }));
        assert!(client.host.is_poisoned());

        assert!(client.is_host_attached());
        let reply = client.dispatch("closeMeeting".into(), String::new()).unwrap();
        assert_eq!(reply, MethodReply::Success { value: None });
        client.detach_host();
        assert!(!client.is_host_attached());
        assert_eq!(*host.events.lock().unwrap(), ["JITSI_MEETING_CLOSE"]);
    }
}
