//! Command line options.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cheesebot",
    version,
    about = "Voice chat bot with background music and sound effects"
)]
pub struct Cli {
    /// Directory holding storage.json, bgm/stream.raw and se/
    #[arg(long, value_name = "DIR", default_value = "data", env = "CHEESEBOT_DATA")]
    pub data: PathBuf,

    /// Voice channel to join, overriding the stored config
    #[arg(long, value_name = "NAME")]
    pub voice_channel: Option<String>,

    /// Mention text that addresses the bot on the console
    #[arg(long, value_name = "TEXT", default_value = "@cheesebot")]
    pub mention: String,

    /// Run text-only without opening the audio device
    #[arg(long)]
    pub mute: bool,

    /// Show debug output
    #[arg(short, long)]
    pub debug: bool,
}
