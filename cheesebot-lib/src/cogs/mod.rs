//! Feature modules plugged into the bot's event dispatch.

use std::sync::Arc;

use crate::config::Config;
use crate::platform::{Message, Session};
use crate::store::Store;

mod admin;
mod audio;
mod mention;

pub use admin::{parse_value, AdminCog, DEFAULT_PREFIX};
pub use audio::AudioCog;
pub use mention::MentionCog;

/// Name of the storage table holding phrases.
pub const PHRASES_TABLE: &str = "phrases";

/// Shared state handed to a cog for the duration of one event.
pub struct Context<'a> {
    pub session: &'a mut dyn Session,
    pub config: &'a Arc<Config>,
    pub store: &'a Arc<Store>,
}

/// A feature reacting to platform events.
///
/// Every hook defaults to doing nothing.
pub trait Cog {
    fn name(&self) -> &'static str;

    /// The platform connected and channel groups are available.
    fn on_ready(&mut self, _ctx: &mut Context<'_>) {}

    fn on_message(&mut self, _ctx: &mut Context<'_>, _message: &Message) {}

    /// Release threads and players before the process exits.
    fn shutdown(&mut self) {}
}
