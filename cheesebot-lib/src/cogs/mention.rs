//! Replies with a random phrase whenever the bot is mentioned.

use log::{debug, error};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::picker::{Phrases, Picker};
use crate::platform::Message;
use crate::store::Store;

use super::{Cog, Context, PHRASES_TABLE};

/// Config key naming the phrase set used for replies.
const PHRASE_SET_KEY: &str = "phrase_set";

pub struct MentionCog {
    picker: Arc<Mutex<Picker<Phrases>>>,
}

impl MentionCog {
    /// Reply from the phrase set configured under `phrase_set`, following
    /// later changes of that key.
    pub fn new(store: &Arc<Store>, config: &Config) -> Self {
        let table = store.table(PHRASES_TABLE);
        let set = config.get_str(PHRASE_SET_KEY).unwrap_or_default();
        let picker = Arc::new(Mutex::new(Picker::new(Phrases::new(table.clone(), set))));

        let shared = picker.clone();
        config.on_change(PHRASE_SET_KEY, move |value| {
            let set = match value {
                Some(Value::String(set)) => set.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            debug!("replying from phrase set `{}`", set);
            *shared.lock().unwrap() = Picker::new(Phrases::new(table.clone(), set));
        });

        Self { picker }
    }

    /// Phrase set currently used for replies.
    pub fn phrase_set(&self) -> String {
        self.picker.lock().unwrap().source().set().to_string()
    }
}

impl Cog for MentionCog {
    fn name(&self) -> &'static str {
        "mention"
    }

    fn on_message(&mut self, ctx: &mut Context<'_>, message: &Message) {
        if !message.content.contains(&ctx.session.user_mention()) {
            return;
        }
        let Some(phrase) = self.picker.lock().unwrap().pick() else {
            debug!("no phrases to reply with");
            return;
        };
        if let Err(err) = ctx.session.send_message(&message.channel, &phrase) {
            error!("failed to reply to mention: {}", err);
        }
    }
}
