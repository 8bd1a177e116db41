//! Background injection of sound effects into a running [`MixedStream`].
//!
//! The scheduler thread alternates between waiting a random delay and
//! playing one clip to completion. Both waits are interruptible through the
//! shared [`Signal`], so a shutdown request unblocks it immediately.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::audio::MixedStream;
use crate::config::Config;
use crate::constants::{SE_MAX_DELAY_SECS, SE_MIN_DELAY_SECS};
use crate::picker::{ItemSource, Picker};

/// Lifecycle of an [`EffectScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    WaitingToFire,
    Playing,
    Stopped,
}

/// Bounds of the random delay between two effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(SE_MIN_DELAY_SECS),
            Duration::from_secs(SE_MAX_DELAY_SECS),
        )
    }
}

impl SchedulerSettings {
    /// Build settings, swapping the bounds if they are reversed.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay: min_delay.min(max_delay),
            max_delay: max_delay.max(min_delay),
        }
    }

    /// Read `se_min_delay` / `se_max_delay` (seconds), falling back to defaults.
    pub fn from_config(config: &Config) -> Self {
        let min = config.get_u64("se_min_delay").unwrap_or(SE_MIN_DELAY_SECS);
        let max = config.get_u64("se_max_delay").unwrap_or(SE_MAX_DELAY_SECS);
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    fn random_delay(&self, rng: &mut impl Rng) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        rng.gen_range(self.min_delay..=self.max_delay)
    }
}

#[derive(Debug, Default)]
struct SignalState {
    resumed: bool,
    dying: bool,
}

/// Resume/shutdown rendezvous between the scheduler and its wakers.
#[derive(Debug, Default)]
pub struct Signal {
    state: Mutex<SignalState>,
    wake: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake a pending wait without stopping.
    pub fn resume(&self) {
        self.state.lock().unwrap().resumed = true;
        self.wake.notify_all();
    }

    /// Mark as dying and release any pending wait.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        state.dying = true;
        state.resumed = true;
        self.wake.notify_all();
    }

    pub fn is_dying(&self) -> bool {
        self.state.lock().unwrap().dying
    }

    /// Block until resumed. Returns `false` when shutting down.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        while !state.resumed && !state.dying {
            state = self.wake.wait(state).unwrap();
        }
        state.resumed = false;
        !state.dying
    }

    /// Block until resumed or `timeout` elapses. Returns `false` when
    /// shutting down.
    ///
    /// A timeout too large to represent as an [`Instant`] waits untimed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            debug!("delay of {:?} is unbounded, waiting for resume", timeout);
            return self.wait();
        };
        let mut state = self.state.lock().unwrap();
        while !state.resumed && !state.dying {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            state = self.wake.wait_timeout(state, deadline - now).unwrap().0;
        }
        state.resumed = false;
        !state.dying
    }
}

/// Sets the shared state to `Stopped` when the scheduler thread exits.
struct StoppedGuard {
    state: Arc<Mutex<SchedulerState>>,
}

impl Drop for StoppedGuard {
    fn drop(&mut self) {
        *self.state.lock().unwrap() = SchedulerState::Stopped;
    }
}

/// Periodically plays a freshly picked clip over the background stream.
pub struct EffectScheduler<S: ItemSource<Item = PathBuf>> {
    stream: Arc<MixedStream>,
    picker: Picker<S>,
    settings: SchedulerSettings,
    signal: Arc<Signal>,
    state: Arc<Mutex<SchedulerState>>,
    rng: StdRng,
}

impl<S> EffectScheduler<S>
where
    S: ItemSource<Item = PathBuf> + Send + 'static,
{
    /// Start the scheduler on its own thread.
    ///
    /// # Arguments
    ///
    /// * `stream` - Mix receiving the clips.
    /// * `picker` - Chooses the clip for each cycle.
    /// * `settings` - Delay bounds between clips.
    pub fn spawn(
        stream: Arc<MixedStream>,
        picker: Picker<S>,
        settings: SchedulerSettings,
    ) -> SchedulerHandle {
        let signal = Arc::new(Signal::new());
        let state = Arc::new(Mutex::new(SchedulerState::WaitingToFire));
        let scheduler = Self {
            stream,
            picker,
            settings,
            signal: signal.clone(),
            state: state.clone(),
            rng: StdRng::from_entropy(),
        };

        let handle = thread::Builder::new()
            .name("se-scheduler".to_string())
            .spawn(move || scheduler.run());
        let thread = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("failed to spawn sound effect scheduler: {}", err);
                *state.lock().unwrap() = SchedulerState::Stopped;
                None
            }
        };

        SchedulerHandle {
            signal,
            state,
            thread,
        }
    }

    fn run(mut self) {
        let _guard = StoppedGuard {
            state: self.state.clone(),
        };
        while !self.signal.is_dying() {
            self.cycle();
        }
        debug!("sound effect scheduler stopped");
    }

    fn set_state(&self, state: SchedulerState) {
        *self.state.lock().unwrap() = state;
    }

    fn cycle(&mut self) {
        self.set_state(SchedulerState::WaitingToFire);
        let delay = self.settings.random_delay(&mut self.rng);
        debug!("next sound effect in {:?}", delay);
        if !self.signal.wait_timeout(delay) {
            return;
        }

        let Some(path) = self.picker.pick() else {
            debug!("no sound effects available");
            return;
        };

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                warn!("skipping sound effect {}: {}", path.display(), err);
                return;
            }
        };

        info!("Playing {}", path.display());
        self.set_state(SchedulerState::Playing);
        let signal = self.signal.clone();
        self.stream.add_source(
            Box::new(BufReader::new(file)),
            Some(Box::new(move || signal.resume())),
        );
        self.signal.wait();
    }
}

/// Owner-side handle of a running scheduler.
pub struct SchedulerHandle {
    signal: Arc<Signal>,
    state: Arc<Mutex<SchedulerState>>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap()
    }

    /// Request shutdown and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.signal.shutdown();
        if let Some(handle) = self.thread.take() {
            if handle.thread().id() == thread::current().id() {
                warn!("scheduler stop called from scheduler thread; skipping join");
            } else if handle.join().is_err() {
                warn!("sound effect scheduler panicked during join");
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
