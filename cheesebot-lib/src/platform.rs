//! Chat platform abstraction consumed by the bot core.
//!
//! A [`Session`] enumerates channels, joins voice channels and delivers
//! messages. Platform events reach the bot as [`Event`]s over a channel and
//! are dispatched on the thread that runs [`crate::bot::Bot::run`].

use std::sync::Arc;

use crate::audio::MixedStream;
use crate::error::Result;

/// Kind of a channel inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
}

/// A single text or voice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// A server or guild: a named group of channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub name: String,
    pub channels: Vec<Channel>,
}

/// A chat message received by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Id of the channel the message was posted in.
    pub channel: String,
    pub author: String,
    pub content: String,
}

/// Events delivered by the platform to the bot's dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Connection established; channel groups are available.
    Ready,
    Message(Message),
    /// Termination requested by the operator.
    Shutdown,
}

/// Connection to the chat platform.
pub trait Session {
    /// Text that addresses the bot inside a message.
    fn user_mention(&self) -> String;

    /// Channel groups visible to the bot.
    fn channel_groups(&self) -> Vec<ChannelGroup>;

    /// Join a voice channel and obtain its playback sink.
    fn join_voice(&mut self, channel: &Channel) -> Result<Box<dyn VoiceSink>>;

    /// Post `content` to the channel with id `channel`.
    fn send_message(&mut self, channel: &str, content: &str) -> Result<()>;
}

/// Audio output of a joined voice channel.
pub trait VoiceSink: Send {
    /// Build a player that pulls audio from `source` once started.
    fn create_stream_player(&mut self, source: Arc<MixedStream>) -> Result<Box<dyn StreamPlayer>>;
}

/// Pull-based player attached to a [`VoiceSink`].
pub trait StreamPlayer: Send {
    fn start(&mut self);

    fn stop(&mut self);
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory session used by unit tests.

    use super::*;
    use std::sync::Mutex;

    /// Everything the fake platform observed.
    #[derive(Default)]
    pub struct Recorded {
        pub joined: Vec<String>,
        pub playing: bool,
        pub stream: Option<Arc<MixedStream>>,
        pub sent: Vec<(String, String)>,
    }

    pub struct FakeSession {
        pub groups: Vec<ChannelGroup>,
        pub recorded: Arc<Mutex<Recorded>>,
    }

    struct FakeSink(Arc<Mutex<Recorded>>);

    struct FakePlayer(Arc<Mutex<Recorded>>);

    impl FakeSession {
        pub fn new(groups: Vec<ChannelGroup>) -> Self {
            Self {
                groups,
                recorded: Arc::new(Mutex::new(Recorded::default())),
            }
        }

        /// One group holding a text channel `"text"` and a voice channel.
        pub fn with_voice(name: &str) -> Self {
            Self::new(vec![ChannelGroup {
                name: "guild".to_string(),
                channels: vec![
                    Channel::new("text", "general", ChannelKind::Text),
                    Channel::new("voice", name, ChannelKind::Voice),
                ],
            }])
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.recorded.lock().unwrap().sent.clone()
        }
    }

    impl Session for FakeSession {
        fn user_mention(&self) -> String {
            "<@42>".to_string()
        }

        fn channel_groups(&self) -> Vec<ChannelGroup> {
            self.groups.clone()
        }

        fn join_voice(&mut self, channel: &Channel) -> Result<Box<dyn VoiceSink>> {
            self.recorded.lock().unwrap().joined.push(channel.id.clone());
            Ok(Box::new(FakeSink(self.recorded.clone())))
        }

        fn send_message(&mut self, channel: &str, content: &str) -> Result<()> {
            self.recorded
                .lock()
                .unwrap()
                .sent
                .push((channel.to_string(), content.to_string()));
            Ok(())
        }
    }

    impl VoiceSink for FakeSink {
        fn create_stream_player(
            &mut self,
            source: Arc<MixedStream>,
        ) -> Result<Box<dyn StreamPlayer>> {
            self.0.lock().unwrap().stream = Some(source);
            Ok(Box::new(FakePlayer(self.0.clone())))
        }
    }

    impl StreamPlayer for FakePlayer {
        fn start(&mut self) {
            self.0.lock().unwrap().playing = true;
        }

        fn stop(&mut self) {
            self.0.lock().unwrap().playing = false;
        }
    }

    /// Text message addressed to `channel`.
    pub fn message(channel: &str, content: &str) -> Message {
        Message {
            channel: channel.to_string(),
            author: "someone".to_string(),
            content: content.to_string(),
        }
    }
}
