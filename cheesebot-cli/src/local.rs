//! Local platform: the default audio device is the only voice channel and
//! the terminal is the only text channel.

use log::{debug, error, warn};
use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cheesebot_lib::audio::{MixedStream, StreamSource};
use cheesebot_lib::platform::{
    Channel, ChannelGroup, ChannelKind, Session, StreamPlayer, VoiceSink,
};
use cheesebot_lib::{BotError, Result};

const OUTPUT_STREAM_OPEN_RETRIES: usize = 20;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// Id of the console text channel.
pub const CONSOLE_CHANNEL: &str = "console";

pub struct LocalSession {
    mention: String,
    voice_channel: Option<String>,
    stream: Option<OutputStream>,
}

impl LocalSession {
    /// # Arguments
    ///
    /// * `mention` - Text that addresses the bot in console input.
    /// * `voice_channel` - Name of the voice channel backed by the audio
    ///   device, `None` for a text-only session.
    pub fn new(mention: impl Into<String>, voice_channel: Option<String>) -> Self {
        Self {
            mention: mention.into(),
            voice_channel,
            stream: None,
        }
    }
}

impl Session for LocalSession {
    fn user_mention(&self) -> String {
        self.mention.clone()
    }

    fn channel_groups(&self) -> Vec<ChannelGroup> {
        let mut channels = vec![Channel::new(CONSOLE_CHANNEL, "console", ChannelKind::Text)];
        if let Some(name) = &self.voice_channel {
            channels.push(Channel::new("speakers", name.as_str(), ChannelKind::Voice));
        }
        vec![ChannelGroup {
            name: "local".to_string(),
            channels,
        }]
    }

    fn join_voice(&mut self, channel: &Channel) -> Result<Box<dyn VoiceSink>> {
        if self.stream.is_none() {
            self.stream = Some(open_output_stream_with_retry()?);
        }
        let Some(stream) = &self.stream else {
            return Err(BotError::Voice("output stream unavailable".to_string()));
        };
        debug!("joined {} on the default output device", channel.name);
        Ok(Box::new(LocalVoice {
            mixer: stream.mixer().clone(),
        }))
    }

    fn send_message(&mut self, channel: &str, content: &str) -> Result<()> {
        debug!("reply to {}", channel);
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", content).map_err(|err| BotError::Send(err.to_string()))?;
        stdout.flush().map_err(|err| BotError::Send(err.to_string()))
    }
}

/// Open the default output stream with bounded retry behavior.
fn open_output_stream_with_retry() -> Result<OutputStream> {
    let mut attempt = 1;
    loop {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                if attempt == OUTPUT_STREAM_OPEN_RETRIES {
                    error!(
                        "failed to open default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    return Err(BotError::Voice(err.to_string()));
                }
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
                attempt += 1;
            }
        }
    }
}

struct LocalVoice {
    mixer: Mixer,
}

impl VoiceSink for LocalVoice {
    fn create_stream_player(&mut self, source: Arc<MixedStream>) -> Result<Box<dyn StreamPlayer>> {
        let sink = Sink::connect_new(&self.mixer);
        sink.pause();
        Ok(Box::new(LocalPlayer {
            sink,
            source: Some(StreamSource::new(source)),
        }))
    }
}

/// Plays a mixed stream on a rodio sink.
struct LocalPlayer {
    sink: Sink,
    source: Option<StreamSource>,
}

impl StreamPlayer for LocalPlayer {
    fn start(&mut self) {
        if let Some(source) = self.source.take() {
            self.sink.append(source);
        }
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}
