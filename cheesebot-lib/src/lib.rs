//! # Cheesebot Library
//!
//! Core of a voice chat bot that loops background music in a voice channel,
//! mixes randomly chosen sound effects over it and answers mentions with
//! phrases from a configurable set. It includes the PCM mixer, the
//! no-repeat picker, the effect scheduler, document storage, layered
//! configuration and the cogs reacting to platform events.

pub mod audio;
pub mod bot;
pub mod cogs;
pub mod config;
pub mod constants;
pub mod error;
pub mod picker;
pub mod platform;
pub mod scheduler;
pub mod setup;
pub mod store;

pub use bot::Bot;
pub use error::{BotError, Result};

#[doc(hidden)]
pub use serde_json as __serde_json;
