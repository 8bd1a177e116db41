//! Bot owner: storage, configuration, cogs and the event dispatch loop.

use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::cogs::{AdminCog, AudioCog, Cog, Context, MentionCog};
use crate::config::Config;
use crate::constants::{SE_MAX_DELAY_SECS, SE_MIN_DELAY_SECS};
use crate::error::Result;
use crate::platform::{Event, Session};
use crate::store::Store;

/// Storage file inside the data directory.
pub const STORAGE_FILE: &str = "storage.json";

/// Base-level configuration seeded on first start.
pub fn default_settings() -> Vec<(&'static str, Value)> {
    vec![
        ("voice_channel", Value::from("Ch'sebur'gah")),
        ("phrase_set", Value::from("odan")),
        ("se_min_delay", Value::from(SE_MIN_DELAY_SECS)),
        ("se_max_delay", Value::from(SE_MAX_DELAY_SECS)),
        ("command_prefix", Value::from(crate::cogs::DEFAULT_PREFIX)),
    ]
}

pub struct Bot {
    data_path: PathBuf,
    store: Arc<Store>,
    config: Arc<Config>,
    cogs: Vec<Box<dyn Cog>>,
}

impl Bot {
    /// Open `<data_path>/storage.json` and seed missing defaults.
    pub fn new(data_path: impl Into<PathBuf>) -> Result<Self> {
        let data_path = data_path.into();
        let store = Store::open(data_path.join(STORAGE_FILE))?;
        Self::with_store(data_path, store)
    }

    /// Build a bot around an already opened store.
    pub fn with_store(data_path: impl Into<PathBuf>, store: Arc<Store>) -> Result<Self> {
        let config = Arc::new(Config::new(&store, 0));
        for (key, value) in default_settings() {
            config.set_default(key, value)?;
        }
        Ok(Self {
            data_path: data_path.into(),
            store,
            config,
            cogs: Vec::new(),
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn add_cog(&mut self, cog: Box<dyn Cog>) -> &mut Self {
        debug!("registered cog `{}`", cog.name());
        self.cogs.push(cog);
        self
    }

    /// Register the audio, mention and admin cogs.
    ///
    /// Background music is read from `<data>/bgm/stream.raw` and sound
    /// effects from `<data>/se`.
    pub fn add_default_cogs(&mut self) -> &mut Self {
        let audio = AudioCog::new(
            self.data_path.join("bgm").join("stream.raw"),
            self.data_path.join("se"),
        );
        let mention = MentionCog::new(&self.store, &self.config);
        self.add_cog(Box::new(audio))
            .add_cog(Box::new(mention))
            .add_cog(Box::new(AdminCog::new()))
    }

    /// Hand one event to every cog in registration order.
    ///
    /// Returns `false` once the bot should stop.
    pub fn dispatch(&mut self, session: &mut dyn Session, event: &Event) -> bool {
        let mut ctx = Context {
            session,
            config: &self.config,
            store: &self.store,
        };
        match event {
            Event::Ready => {
                info!("Connected.");
                for cog in &mut self.cogs {
                    cog.on_ready(&mut ctx);
                }
                true
            }
            Event::Message(message) => {
                for cog in &mut self.cogs {
                    cog.on_message(&mut ctx, message);
                }
                true
            }
            Event::Shutdown => false,
        }
    }

    /// Dispatch `events` until shutdown is requested or every sender is
    /// gone, then stop the cogs and flush storage.
    pub fn run(&mut self, session: &mut dyn Session, events: Receiver<Event>) -> Result<()> {
        for event in events.iter() {
            if !self.dispatch(session, &event) {
                info!("Shutting down.");
                break;
            }
        }
        self.shutdown()
    }

    /// Stop every cog and write pending storage changes.
    pub fn shutdown(&mut self) -> Result<()> {
        for cog in self.cogs.iter_mut().rev() {
            debug!("stopping cog `{}`", cog.name());
            cog.shutdown();
        }
        if let Err(err) = self.store.flush() {
            warn!("failed to flush storage: {}", err);
            return Err(err);
        }
        Ok(())
    }
}
