use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::BridgeError;
use crate::events::HostContext;
use crate::meeting::{CloseMeetingHandler, ConferenceEngine, JoinMeetingHandler};

/// Name of the host method channel this dispatcher serves.
pub const METHOD_CHANNEL: &str = "jitsi_meet";

/// Commands understood on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Join,
    Close,
}

impl Command {
    pub const ALL: [Command; 2] = [Command::Join, Command::Close];

    pub fn method_name(self) -> &'static str {
        match self {
            Self::Join => "joinMeeting",
            Self::Close => "closeMeeting",
        }
    }

    /// Exact, case-sensitive match on the method name.
    pub fn from_method(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.method_name() == name)
    }
}

/// Outcome of one dispatch, mirroring the host's method-channel result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodReply {
    Success(Option<String>),
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    /// The method is not handled here; the host may try another handler.
    NotImplemented,
}

impl MethodReply {
    /// Error reply for a recoverable failure. `None` for contract violations.
    pub fn from_error(err: &BridgeError) -> Option<Self> {
        let code = err.code()?;
        let message = err.to_string();
        Some(Self::Error {
            code: code.to_string(),
            details: Some(message.clone()),
            message,
        })
    }
}

/// Per-call view of host state. Nothing in here outlives a dispatch.
pub struct CallContext<'a> {
    pub host: Option<&'a dyn HostContext>,
}

pub trait MethodHandler: Send + Sync {
    /// Success value on `Ok`; any `Err` is either turned into an error reply
    /// or, for contract violations, returned to the caller as-is.
    ///
    /// `payload` is passed through untouched; handlers that take arguments
    /// decode it themselves.
    fn handle(&self, payload: Value, ctx: &CallContext<'_>) -> Result<Option<String>, BridgeError>;
}

/// Routes method calls to their handlers.
pub struct Dispatcher {
    handlers: HashMap<Command, Box<dyn MethodHandler>>,
}

impl Dispatcher {
    /// Dispatcher with the join and close handlers wired to `engine`.
    pub fn new(engine: Arc<dyn ConferenceEngine>) -> Self {
        Self::empty()
            .with_handler(Command::Join, Box::new(JoinMeetingHandler::new(engine)))
            .with_handler(Command::Close, Box::new(CloseMeetingHandler))
    }

    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn with_handler(mut self, command: Command, handler: Box<dyn MethodHandler>) -> Self {
        self.handlers.insert(command, handler);
        self
    }

    /// Dispatch one call.
    ///
    /// Returns exactly one reply, or `Err` when the caller broke the channel
    /// contract (missing required argument, wrong type, non-object payload).
    pub fn dispatch(
        &self,
        method: &str,
        payload: Value,
        ctx: &CallContext<'_>,
    ) -> Result<MethodReply, BridgeError> {
        let Some(handler) = Command::from_method(method).and_then(|c| self.handlers.get(&c)) else {
            tracing::warn!("method not implemented: {method}");
            return Ok(MethodReply::NotImplemented);
        };

        tracing::info!("dispatching {method}");
        match handler.handle(payload, ctx) {
            Ok(value) => Ok(MethodReply::Success(value)),
            Err(err) => match MethodReply::from_error(&err) {
                Some(reply) => {
                    tracing::warn!("{method} rejected: {err}");
                    Ok(reply)
                }
                None => {
                    tracing::error!("{method} contract violation: {err}");
                    Err(err)
                }
            },
        }
    }
}
