//! Background music with randomly interleaved sound effects.

use log::{debug, error, info, warn};
use std::path::PathBuf;

use crate::picker::{Picker, SoundEffects};
use crate::scheduler::{EffectScheduler, SchedulerHandle, SchedulerSettings};
use crate::setup::{setup_background, Playback};

use super::{Cog, Context};

/// Starts the looping background stream once the platform is ready.
pub struct AudioCog {
    bgm: PathBuf,
    effects_dir: PathBuf,
    playback: Option<Playback>,
    scheduler: Option<SchedulerHandle>,
}

impl AudioCog {
    /// # Arguments
    ///
    /// * `bgm` - Raw PCM file looped in the voice channel.
    /// * `effects_dir` - Directory scanned for sound effect clips.
    pub fn new(bgm: impl Into<PathBuf>, effects_dir: impl Into<PathBuf>) -> Self {
        Self {
            bgm: bgm.into(),
            effects_dir: effects_dir.into(),
            playback: None,
            scheduler: None,
        }
    }

    /// Background playback, once started.
    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    pub fn scheduler(&self) -> Option<&SchedulerHandle> {
        self.scheduler.as_ref()
    }

    fn start_effects(&mut self, ctx: &Context<'_>) {
        let Some(playback) = &self.playback else {
            return;
        };
        let effects = match SoundEffects::new(&self.effects_dir) {
            Ok(effects) => effects,
            Err(err) => {
                error!("sound effects disabled: {}", err);
                return;
            }
        };
        let settings = SchedulerSettings::from_config(ctx.config);
        debug!(
            "sound effects from {} every {:?} to {:?}",
            effects.dir().display(),
            settings.min_delay,
            settings.max_delay
        );
        self.scheduler = Some(EffectScheduler::spawn(
            playback.stream.clone(),
            Picker::new(effects),
            settings,
        ));
    }
}

impl Cog for AudioCog {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn on_ready(&mut self, ctx: &mut Context<'_>) {
        if self.playback.is_some() {
            return;
        }
        let Some(voice_channel) = ctx.config.get_str("voice_channel") else {
            warn!("No voice channel configured.");
            return;
        };

        match setup_background(&mut *ctx.session, &voice_channel, &self.bgm) {
            Ok(Some(playback)) => {
                info!("Now playing background music in {}", playback.channel.name);
                self.playback = Some(playback);
                self.start_effects(ctx);
            }
            Ok(None) => warn!("Voice channel \"{}\" not found.", voice_channel),
            Err(err) => error!("failed to start background music: {}", err),
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        if let Some(mut playback) = self.playback.take() {
            playback.player.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pcm::{from_samples, to_samples};
    use crate::config::Config;
    use crate::platform::testing::FakeSession;
    use crate::scheduler::SchedulerState;
    use crate::store::Store;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn ready_starts_background_and_scheduler() {
        let dir = tempfile::tempdir().unwrap();
        let bgm = dir.path().join("stream.raw");
        fs::write(&bgm, from_samples(&[40, 80])).unwrap();

        let store = Store::in_memory();
        let config = Arc::new(Config::new(&store, 0));
        config.set("voice_channel", "Cheese").unwrap();
        config.set("se_min_delay", 3600).unwrap();
        config.set("se_max_delay", 3600).unwrap();

        let mut session = FakeSession::with_voice("Cheese cellar");
        let mut cog = AudioCog::new(&bgm, dir.path().join("se"));
        let mut ctx = Context {
            session: &mut session,
            config: &config,
            store: &store,
        };
        cog.on_ready(&mut ctx);
        cog.on_ready(&mut ctx);

        assert_eq!(session.recorded.lock().unwrap().joined, vec!["voice".to_string()]);
        let stream = cog.playback().unwrap().stream.clone();
        assert_eq!(to_samples(&stream.read(8)), vec![20, 40, 20, 40]);
        assert_eq!(
            cog.scheduler().unwrap().state(),
            SchedulerState::WaitingToFire
        );

        cog.shutdown();
        assert!(cog.playback().is_none());
        assert!(!session.recorded.lock().unwrap().playing);
    }

    #[test]
    fn missing_channel_leaves_cog_idle() {
        let store = Store::in_memory();
        let config = Arc::new(Config::new(&store, 0));
        config.set("voice_channel", "Elsewhere").unwrap();

        let mut session = FakeSession::with_voice("Cheese cellar");
        let mut cog = AudioCog::new("/no/bgm.raw", "/no/se");
        cog.on_ready(&mut Context {
            session: &mut session,
            config: &config,
            store: &store,
        });
        assert!(cog.playback().is_none());
        assert!(cog.scheduler().is_none());
    }

    #[test]
    fn unreadable_bgm_leaves_cog_idle() {
        let store = Store::in_memory();
        let config = Arc::new(Config::new(&store, 0));
        config.set("voice_channel", "Cheese").unwrap();

        let mut session = FakeSession::with_voice("Cheese cellar");
        let mut cog = AudioCog::new("/no/bgm.raw", "/no/se");
        cog.on_ready(&mut Context {
            session: &mut session,
            config: &config,
            store: &store,
        });
        assert!(cog.playback().is_none());
    }
}
