use crate::args::{ParsedUrl, UserInfo};
use crate::flags::FeatureFlag;

/// Everything the engine needs to start a conference.
///
/// Only obtainable through [`ConferenceOptionsBuilder`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ConferenceOptions {
    room: String,
    server_url: ParsedUrl,
    subject: Option<String>,
    token: Option<String>,
    audio_muted: bool,
    audio_only: bool,
    video_muted: bool,
    user_info: UserInfo,
    feature_flags: Vec<(String, FeatureFlag)>,
}

impl ConferenceOptions {
    pub fn builder(room: impl Into<String>, server_url: ParsedUrl) -> ConferenceOptionsBuilder {
        ConferenceOptionsBuilder::new(room, server_url)
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn server_url(&self) -> &ParsedUrl {
        &self.server_url
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn audio_muted(&self) -> bool {
        self.audio_muted
    }

    pub fn audio_only(&self) -> bool {
        self.audio_only
    }

    pub fn video_muted(&self) -> bool {
        self.video_muted
    }

    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    /// Flags in the order they were set. A key set twice keeps its last value.
    pub fn feature_flags(&self) -> &[(String, FeatureFlag)] {
        &self.feature_flags
    }

    pub fn feature_flag(&self, key: &str) -> Option<FeatureFlag> {
        self.feature_flags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }
}

pub struct ConferenceOptionsBuilder {
    options: ConferenceOptions,
}

impl ConferenceOptionsBuilder {
    pub fn new(room: impl Into<String>, server_url: ParsedUrl) -> Self {
        Self {
            options: ConferenceOptions {
                room: room.into(),
                server_url,
                subject: None,
                token: None,
                audio_muted: false,
                audio_only: false,
                video_muted: false,
                user_info: UserInfo::default(),
                feature_flags: Vec::new(),
            },
        }
    }

    pub fn subject(mut self, subject: Option<String>) -> Self {
        self.options.subject = subject;
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.options.token = token;
        self
    }

    pub fn audio_muted(mut self, muted: bool) -> Self {
        self.options.audio_muted = muted;
        self
    }

    pub fn audio_only(mut self, audio_only: bool) -> Self {
        self.options.audio_only = audio_only;
        self
    }

    pub fn video_muted(mut self, muted: bool) -> Self {
        self.options.video_muted = muted;
        self
    }

    pub fn user_info(mut self, user_info: UserInfo) -> Self {
        self.options.user_info = user_info;
        self
    }

    pub fn feature_flag(mut self, key: impl Into<String>, value: FeatureFlag) -> Self {
        let key = key.into();
        match self.options.feature_flags.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.options.feature_flags.push((key, value)),
        }
        self
    }

    pub fn build(self) -> ConferenceOptions {
        self.options
    }
}
