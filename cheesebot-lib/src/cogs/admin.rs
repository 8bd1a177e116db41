//! Chat commands for maintaining phrases and runtime configuration.
//!
//! A command is a message starting with the configured `command_prefix`
//! followed by shell-style arguments, e.g.
//! `🧀 phrase-add odan "Cheese is life"`.
//!
//! The `db-*` commands take trailing `key=value` filters that a document
//! must all match, e.g. `🧀 db-inspect phrases set=odan`.

use clap::{Parser, Subcommand};
use log::{debug, error};
use serde_json::Value;

use crate::doc;
use crate::error::{BotError, Result};
use crate::platform::Message;
use crate::store::{field_eq, Document, Table};

use super::{Cog, Context, PHRASES_TABLE};

/// Config key holding the command prefix.
const PREFIX_KEY: &str = "command_prefix";

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "🧀";

/// Documents shown by `db-inspect`.
const INSPECT_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "cheese", disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a phrase to a phrase set.
    PhraseAdd {
        set: String,
        content: String,
        notes: Option<String>,
    },
    /// Move a phrase to another set.
    PhraseMove { content: String, set: String },
    /// Attach notes to a phrase.
    PhraseAnnotate { content: String, notes: String },
    PhraseRemove { content: String },
    /// Show the set and notes of a phrase.
    PhraseInfo { content: String },
    /// Rename a phrase set.
    PhraseSetMove { old: String, new: String },
    PhraseSetRemove { set: String },
    /// Show the effective value of a config key.
    ConfigGet {
        key: String,
        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        level: i64,
    },
    /// Set a config key for a level and everything above it.
    ConfigSet {
        key: String,
        value: String,
        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        level: i64,
    },
    /// List tables, or show the documents of a table.
    DbInspect {
        table: Option<String>,
        filters: Vec<String>,
    },
    /// Apply an operation to a column of matching documents.
    DbUpdate {
        table: String,
        operation: String,
        column: String,
        /// Optional value followed by filters.
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
    },
}

/// Column operations available to `db-update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateOp {
    Add,
    Decrement,
    Delete,
    Increment,
    Set,
    Subtract,
}

impl UpdateOp {
    const ALL: [UpdateOp; 6] = [
        UpdateOp::Add,
        UpdateOp::Decrement,
        UpdateOp::Delete,
        UpdateOp::Increment,
        UpdateOp::Set,
        UpdateOp::Subtract,
    ];

    fn name(self) -> &'static str {
        match self {
            UpdateOp::Add => "add",
            UpdateOp::Decrement => "decrement",
            UpdateOp::Delete => "delete",
            UpdateOp::Increment => "increment",
            UpdateOp::Set => "set",
            UpdateOp::Subtract => "subtract",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Apply the operation to `column` of `doc`.
    ///
    /// `set`, `add` and `subtract` need a value, the others refuse one.
    /// `add` appends when both sides are strings.
    fn apply(self, doc: &mut Document, column: &str, value: Option<&Value>) -> Result<()> {
        let outcome = match (self, value) {
            (UpdateOp::Set, Some(value)) => {
                doc.insert(column.to_string(), value.clone());
                Ok(())
            }
            (UpdateOp::Delete, None) => doc.remove(column).map(|_| ()).ok_or("no such column"),
            (UpdateOp::Increment, None) => shift(doc, column, Some(1)),
            (UpdateOp::Decrement, None) => shift(doc, column, Some(-1)),
            (UpdateOp::Add, Some(Value::String(suffix))) => match doc.get_mut(column) {
                Some(Value::String(text)) => {
                    text.push_str(suffix);
                    Ok(())
                }
                _ => Err("column is not a string"),
            },
            (UpdateOp::Add, Some(amount)) => shift(doc, column, amount.as_i64()),
            (UpdateOp::Subtract, Some(amount)) => {
                shift(doc, column, amount.as_i64().and_then(i64::checked_neg))
            }
            (_, Some(_)) => Err("operation takes no value"),
            (_, None) => Err("operation needs a value"),
        };
        outcome.map_err(|reason| {
            BotError::Update(format!("{} `{}`: {}", self.name(), column, reason))
        })
    }
}

fn shift(
    doc: &mut Document,
    column: &str,
    by: Option<i64>,
) -> std::result::Result<(), &'static str> {
    let by = by.ok_or("amount is not an integer")?;
    let current = doc
        .get(column)
        .and_then(Value::as_i64)
        .ok_or("column is not an integer")?;
    let next = current.checked_add(by).ok_or("integer overflow")?;
    doc.insert(column.to_string(), Value::from(next));
    Ok(())
}

/// Parse `key=value` filters. `None` when any of them is malformed.
fn parse_filters(filters: &[String]) -> Option<Document> {
    filters
        .iter()
        .map(|filter| {
            let (key, value) = filter.split_once('=')?;
            if !is_word(key) {
                return None;
            }
            Some((key.to_string(), parse_value(value).ok()?))
        })
        .collect()
}

fn is_filter(arg: &str) -> bool {
    arg.split_once('=').is_some_and(|(key, _)| is_word(key))
}

/// Predicate matching documents that agree with every field of `filter`.
fn matches_all(filter: Document) -> impl Fn(&Document) -> bool {
    move |doc| filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

/// Parse a command argument into a config value.
///
/// `int(..)`, `str(..)` and `list(..)` force a type. Otherwise a comma
/// separated list of words becomes a list, digits become an integer and
/// anything else stays a string.
pub fn parse_value(text: &str) -> std::result::Result<Value, String> {
    for kind in ["str", "int", "list"] {
        let inner = text
            .strip_prefix(kind)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(inner) = inner.filter(|inner| !inner.contains(')')) {
            return typed(kind, inner);
        }
    }
    typed(guess_kind(text), text)
}

fn typed(kind: &str, text: &str) -> std::result::Result<Value, String> {
    match kind {
        "int" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("`{}` is not an integer", text)),
        "list" => Ok(Value::from(
            text.split(',').map(str::to_string).collect::<Vec<_>>(),
        )),
        _ => Ok(Value::from(text)),
    }
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn guess_kind(text: &str) -> &'static str {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() > 1 && parts.iter().all(|part| is_word(part)) {
        "list"
    } else if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        "int"
    } else {
        "str"
    }
}

/// Human readable rendering of a config value.
fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Maintenance commands over phrases and config.
#[derive(Default)]
pub struct AdminCog;

impl AdminCog {
    pub fn new() -> Self {
        Self
    }

    /// Run one command line and produce the reply text.
    fn respond(&self, ctx: &Context<'_>, line: &str) -> Result<String> {
        let Some(mut args) = shlex::split(line) else {
            return Ok("error: Invalid quoting".to_string());
        };
        args.insert(0, "cheese".to_string());
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(err) => return Ok(err.to_string()),
        };
        debug!("admin command {:?}", cli.command);

        let phrases = ctx.store.table(PHRASES_TABLE);
        match cli.command {
            Command::DbInspect { table, filters } => Ok(match db_query(ctx, table, &filters) {
                Ok((table, filter)) => db_inspect(&table, filter),
                Err(reply) => reply,
            }),
            Command::DbUpdate {
                table,
                operation,
                column,
                args,
            } => db_update(ctx, table, &operation, &column, &args),
            Command::PhraseAdd {
                set,
                content,
                notes,
            } => phrase_add(&phrases, set, content, notes),
            Command::PhraseMove { content, set } => {
                let fields = doc!("set" => set.as_str());
                let ids = phrases.update(fields, field_eq("content", content))?;
                Ok(if ids.is_empty() {
                    format!("Phrase could _not_ be moved to set `{}`.", set)
                } else {
                    format!("Phrase was successfully moved to set `{}`.", set)
                })
            }
            Command::PhraseAnnotate { content, notes } => {
                let fields = doc!("notes" => notes);
                let ids = phrases.update(fields, field_eq("content", content))?;
                Ok(if ids.is_empty() {
                    "Notes could _not_ be set for the given phrase.".to_string()
                } else {
                    "Notes were successfully set for the given phrase.".to_string()
                })
            }
            Command::PhraseRemove { content } => {
                let ids = phrases.remove(field_eq("content", content))?;
                Ok(if ids.is_empty() {
                    "Phrase could _not_ be removed.".to_string()
                } else {
                    "Phrase was successfully removed.".to_string()
                })
            }
            Command::PhraseInfo { content } => Ok(phrase_info(&phrases, content)),
            Command::PhraseSetMove { old, new } => {
                let fields = doc!("set" => new.as_str());
                let ids = phrases.update(fields, field_eq("set", old.as_str()))?;
                Ok(format!(
                    "{} phrases were moved from set `{}` to set `{}`.",
                    ids.len(),
                    old,
                    new
                ))
            }
            Command::PhraseSetRemove { set } => {
                let ids = phrases.remove(field_eq("set", set.as_str()))?;
                Ok(format!("{} phrases were removed from set `{}`.", ids.len(), set))
            }
            Command::ConfigGet { key, level } => Ok(match ctx.config.at_level(level).get(&key) {
                Some(value) => format!(
                    "Effective value for config `{}` at level {}: `{}`",
                    key,
                    level,
                    display(value)
                ),
                None => format!("Config `{}` not defined for level {} or below.", key, level),
            }),
            Command::ConfigSet { key, value, level } => {
                let parsed = match parse_value(&value) {
                    Ok(parsed) => parsed,
                    Err(reason) => {
                        return Ok(format!(
                            "Failed setting config `{}` to `{}` for level {} and up: {}",
                            key, value, level, reason
                        ))
                    }
                };
                let shown = display(&parsed);
                ctx.config.set_at(&key, parsed, level)?;
                Ok(format!(
                    "Effective value for config `{}` at level {} set to: `{}`",
                    key, level, shown
                ))
            }
        }
    }
}

fn prefix(ctx: &Context<'_>) -> String {
    ctx.config
        .get_str(PREFIX_KEY)
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
}

/// Resolve the table and filters of a `db-*` command, or the reply telling
/// why they are unusable.
fn db_query(
    ctx: &Context<'_>,
    table: Option<String>,
    filters: &[String],
) -> std::result::Result<(Table, Document), String> {
    let tables: Vec<String> = ctx
        .store
        .tables()
        .into_iter()
        .filter(|name| !name.starts_with('_'))
        .collect();
    let Some(table) = table else {
        return Err(format!(
            "The following tables are available:\n`{}`",
            tables.join("`, `")
        ));
    };
    if !tables.contains(&table) {
        return Err(format!("Table `{}` doesn't exist.", table));
    }
    let Some(filter) = parse_filters(filters) else {
        return Err(format!(
            "Invalid where condition. Expected:\n```{}db-* {} key1=value1 key2=value2 ...```",
            prefix(ctx),
            table
        ));
    };
    Ok((ctx.store.table(&table), filter))
}

fn db_inspect(table: &Table, filter: Document) -> String {
    let rows = table.search(matches_all(filter));
    if rows.is_empty() {
        return format!("No matches found in table `{}`", table.name());
    }
    let footer = if rows.len() > INSPECT_ROWS {
        format!(
            "\n(Showing top {} results out of {})",
            INSPECT_ROWS,
            rows.len()
        )
    } else {
        String::new()
    };
    let shown: Vec<String> = rows
        .iter()
        .take(INSPECT_ROWS)
        .map(|row| {
            row.iter()
                .map(|(key, value)| format!("{}:\n    {}", key, display(value)))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();
    format!("```{}```{}", shown.join("\n\n"), footer)
}

fn db_update(
    ctx: &Context<'_>,
    table: String,
    operation: &str,
    column: &str,
    args: &[String],
) -> Result<String> {
    let (value, filters) = match args.split_first() {
        Some((first, rest)) if !is_filter(first) => (Some(first), rest),
        _ => (None, args),
    };
    let (table, filter) = match db_query(ctx, Some(table), filters) {
        Ok(query) => query,
        Err(reply) => return Ok(reply),
    };
    let Some(op) = UpdateOp::parse(operation) else {
        let names: Vec<&str> = UpdateOp::ALL.iter().map(|op| op.name()).collect();
        return Ok(format!(
            "Invalid operation `{}`. Expected:\n`{}`",
            operation,
            names.join("`, `")
        ));
    };
    let value = match value.map(|text| parse_value(text)).transpose() {
        Ok(value) => value,
        Err(reason) => return Ok(format!("Invalid value for column `{}`: {}", column, reason)),
    };

    match table.update_with(|doc| op.apply(doc, column, value.as_ref()), matches_all(filter)) {
        Ok(ids) => Ok(format!(
            "{} records in `{}` have been updated.",
            ids.len(),
            table.name()
        )),
        Err(BotError::Update(reason)) => {
            debug!("db-update refused: {}", reason);
            Ok("Oops! Something went wrong!\nNote that some operations don't expect a value."
                .to_string())
        }
        Err(err) => Err(err),
    }
}

fn phrase_add(
    phrases: &Table,
    set: String,
    content: String,
    notes: Option<String>,
) -> Result<String> {
    if let Some(existing) = phrases.get(field_eq("content", content.as_str())) {
        let existing_set = existing.get("set").map(display).unwrap_or_default();
        return Ok(format!(
            "Phrase already exists in set `{}`! Be a little more creative :)",
            existing_set
        ));
    }
    phrases.insert(doc!(
        "set" => set.as_str(),
        "content" => content,
        "notes" => notes,
    ))?;
    Ok(format!("Added the phrase to set `{}`.", set))
}

fn phrase_info(phrases: &Table, content: String) -> String {
    let Some(info) = phrases.get(field_eq("content", content)) else {
        return "The given phrase doesn't exist in any phrase set.".to_string();
    };
    let set = info.get("set").map(display).unwrap_or_default();
    let mut reply = format!("The given phrase is part of the phrase set `{}`.", set);
    if let Some(Value::String(notes)) = info.get("notes") {
        if !notes.is_empty() {
            reply.push_str(&format!(
                "\nThe following notes were provided:\n```{}```",
                notes
            ));
        }
    }
    reply
}

impl Cog for AdminCog {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn on_message(&mut self, ctx: &mut Context<'_>, message: &Message) {
        let prefix = prefix(ctx);
        let Some(line) = message.content.strip_prefix(prefix.as_str()) else {
            return;
        };

        let reply = match self.respond(ctx, line.trim()) {
            Ok(reply) => reply,
            Err(err) => {
                error!("admin command failed: {}", err);
                "Oops! Something went wrong!".to_string()
            }
        };
        if let Err(err) = ctx.session.send_message(&message.channel, &reply) {
            error!("failed to send admin reply: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::testing::{message, FakeSession};
    use crate::store::Store;
    use serde_json::json;
    use std::sync::Arc;

    struct Harness {
        store: Arc<Store>,
        config: Arc<Config>,
        session: FakeSession,
        cog: AdminCog,
    }

    impl Harness {
        fn new() -> Self {
            let store = Store::in_memory();
            let config = Arc::new(Config::new(&store, 0));
            Self {
                store,
                config,
                session: FakeSession::with_voice("voice"),
                cog: AdminCog::new(),
            }
        }

        fn say(&mut self, content: &str) -> Option<String> {
            let before = self.session.sent().len();
            let mut ctx = Context {
                session: &mut self.session,
                config: &self.config,
                store: &self.store,
            };
            self.cog.on_message(&mut ctx, &message("text", content));
            self.session.sent().get(before).map(|(_, text)| text.clone())
        }
    }

    #[test]
    fn parses_explicit_and_guessed_values() {
        assert_eq!(parse_value("42"), Ok(json!(42)));
        assert_eq!(parse_value("a,b,c"), Ok(json!(["a", "b", "c"])));
        assert_eq!(parse_value("hello world"), Ok(json!("hello world")));
        assert_eq!(parse_value("str(42)"), Ok(json!("42")));
        assert_eq!(parse_value("int(7)"), Ok(json!(7)));
        assert_eq!(parse_value("list(one)"), Ok(json!(["one"])));
        assert_eq!(parse_value("-3"), Ok(json!("-3")));
        assert!(parse_value("int(seven)").is_err());
    }

    #[test]
    fn ignores_messages_without_prefix() {
        let mut harness = Harness::new();
        assert_eq!(harness.say("phrase-info cheese"), None);
    }

    #[test]
    fn manages_phrases() {
        let mut harness = Harness::new();
        assert_eq!(
            harness.say("🧀 phrase-add odan \"Say cheese\" \"a classic\"").unwrap(),
            "Added the phrase to set `odan`."
        );
        assert_eq!(
            harness.say("🧀 phrase-add other \"Say cheese\"").unwrap(),
            "Phrase already exists in set `odan`! Be a little more creative :)"
        );
        assert_eq!(
            harness.say("🧀 phrase-info \"Say cheese\"").unwrap(),
            concat!(
                "The given phrase is part of the phrase set `odan`.\n",
                "The following notes were provided:\n```a classic```"
            )
        );
        assert_eq!(
            harness.say("🧀 phrase-move \"Say cheese\" spoopy").unwrap(),
            "Phrase was successfully moved to set `spoopy`."
        );
        assert_eq!(
            harness.say("🧀 phrase-move nothing spoopy").unwrap(),
            "Phrase could _not_ be moved to set `spoopy`."
        );
        assert_eq!(
            harness.say("🧀 phrase-annotate \"Say cheese\" moved").unwrap(),
            "Notes were successfully set for the given phrase."
        );
        assert_eq!(
            harness.say("🧀 phrase-remove \"Say cheese\"").unwrap(),
            "Phrase was successfully removed."
        );
        assert_eq!(
            harness.say("🧀 phrase-info \"Say cheese\"").unwrap(),
            "The given phrase doesn't exist in any phrase set."
        );
    }

    #[test]
    fn manages_phrase_sets() {
        let mut harness = Harness::new();
        harness.say("🧀 phrase-add odan one");
        harness.say("🧀 phrase-add odan two");
        harness.say("🧀 phrase-add spoopy three");
        assert_eq!(
            harness.say("🧀 phrase-set-move odan cheddar").unwrap(),
            "2 phrases were moved from set `odan` to set `cheddar`."
        );
        assert_eq!(
            harness.say("🧀 phrase-set-remove cheddar").unwrap(),
            "2 phrases were removed from set `cheddar`."
        );
        assert_eq!(harness.store.table(PHRASES_TABLE).all().len(), 1);
    }

    #[test]
    fn reads_and_writes_config_levels() {
        let mut harness = Harness::new();
        assert_eq!(
            harness.say("🧀 config-get se_min_delay").unwrap(),
            "Config `se_min_delay` not defined for level 0 or below."
        );
        assert_eq!(
            harness.say("🧀 config-set se_min_delay 5").unwrap(),
            "Effective value for config `se_min_delay` at level 0 set to: `5`"
        );
        assert_eq!(harness.config.get("se_min_delay"), Some(json!(5)));
        harness.say("🧀 config-set se_min_delay 20 3");
        assert_eq!(
            harness.say("🧀 config-get se_min_delay 2").unwrap(),
            "Effective value for config `se_min_delay` at level 2: `5`"
        );
        assert_eq!(
            harness.say("🧀 config-get se_min_delay 3").unwrap(),
            "Effective value for config `se_min_delay` at level 3: `20`"
        );
        assert!(harness
            .say("🧀 config-set se_min_delay int(soon)")
            .unwrap()
            .starts_with("Failed setting config `se_min_delay`"));
    }

    #[test]
    fn inspects_tables() {
        let mut harness = Harness::new();
        assert_eq!(
            harness.say("🧀 db-inspect").unwrap(),
            "The following tables are available:\n``"
        );
        harness.say("🧀 phrase-add odan one \"first one\"");
        for n in 0..6 {
            harness.say(&format!("🧀 phrase-add spoopy boo{}", n));
        }
        harness.config.set("se_min_delay", 5).unwrap();
        harness.store.table("_meta").insert(doc!("version" => 1)).unwrap();

        assert_eq!(
            harness.say("🧀 db-inspect").unwrap(),
            "The following tables are available:\n`config`, `phrases`"
        );
        assert_eq!(
            harness.say("🧀 db-inspect cheddar").unwrap(),
            "Table `cheddar` doesn't exist."
        );
        assert_eq!(
            harness.say("🧀 db-inspect _meta").unwrap(),
            "Table `_meta` doesn't exist."
        );
        assert_eq!(
            harness.say("🧀 db-inspect phrases set=odan").unwrap(),
            "```content:\n    one\nnotes:\n    first one\nset:\n    odan```"
        );
        assert_eq!(
            harness.say("🧀 db-inspect phrases set=cheddar").unwrap(),
            "No matches found in table `phrases`"
        );
        assert_eq!(
            harness.say("🧀 db-inspect phrases set").unwrap(),
            "Invalid where condition. Expected:\n```🧀db-* phrases key1=value1 key2=value2 ...```"
        );

        let reply = harness.say("🧀 db-inspect phrases set=spoopy").unwrap();
        assert!(reply.ends_with("```\n(Showing top 5 results out of 6)"));
        assert!(reply.contains("boo4"));
        assert!(!reply.contains("boo5"));
    }

    #[test]
    fn updates_matching_records() {
        let mut harness = Harness::new();
        harness.say("🧀 phrase-add odan one");
        harness.say("🧀 phrase-add odan two");
        harness.say("🧀 phrase-add spoopy three");
        let phrases = harness.store.table(PHRASES_TABLE);

        assert_eq!(
            harness.say("🧀 db-update phrases set votes 0").unwrap(),
            "3 records in `phrases` have been updated."
        );
        assert_eq!(
            harness.say("🧀 db-update phrases increment votes set=odan").unwrap(),
            "2 records in `phrases` have been updated."
        );
        harness.say("🧀 db-update phrases add votes 10 content=three");
        harness.say("🧀 db-update phrases decrement votes content=one");
        let votes = |content: &str| {
            phrases.get(field_eq("content", content)).unwrap()["votes"].clone()
        };
        assert_eq!(votes("one"), json!(0));
        assert_eq!(votes("two"), json!(1));
        assert_eq!(votes("three"), json!(10));

        assert_eq!(
            harness.say("🧀 db-update phrases delete notes set=spoopy").unwrap(),
            "1 records in `phrases` have been updated."
        );
        assert!(!phrases.get(field_eq("content", "three")).unwrap().contains_key("notes"));
        assert_eq!(
            harness.say("🧀 db-update phrases set votes 7 set=cheddar").unwrap(),
            "0 records in `phrases` have been updated."
        );
    }

    #[test]
    fn rejects_bad_updates_without_changes() {
        let mut harness = Harness::new();
        harness.say("🧀 phrase-add odan one");
        harness.say("🧀 phrase-add odan two");
        let phrases = harness.store.table(PHRASES_TABLE);

        assert_eq!(
            harness.say("🧀 db-update phrases rename set").unwrap(),
            concat!(
                "Invalid operation `rename`. Expected:\n",
                "`add`, `decrement`, `delete`, `increment`, `set`, `subtract`"
            )
        );
        assert_eq!(
            harness.say("🧀 db-update cheddar set set x").unwrap(),
            "Table `cheddar` doesn't exist."
        );
        let oops = "Oops! Something went wrong!\nNote that some operations don't expect a value.";
        assert_eq!(harness.say("🧀 db-update phrases increment set").unwrap(), oops);
        assert_eq!(harness.say("🧀 db-update phrases delete set x").unwrap(), oops);
        assert_eq!(harness.say("🧀 db-update phrases set set").unwrap(), oops);
        assert_eq!(phrases.search(field_eq("set", "odan")).len(), 2);
    }

    #[test]
    fn honours_configured_prefix_and_reports_usage() {
        let mut harness = Harness::new();
        harness.config.set(PREFIX_KEY, "!").unwrap();
        assert_eq!(harness.say("🧀 phrase-info x"), None);
        let reply = harness.say("!bogus").unwrap();
        assert!(reply.contains("bogus"));
        let reply = harness.say("!phrase-add \"unterminated").unwrap();
        assert_eq!(reply, "error: Invalid quoting");
    }
}
