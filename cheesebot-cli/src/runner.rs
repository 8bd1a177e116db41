use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;

use cheesebot_lib::platform::{Event, Message};
use cheesebot_lib::{Bot, Result};
use log::{info, warn};

use crate::cli::Cli;
use crate::local::{LocalSession, CONSOLE_CHANNEL};
use crate::logging::{self, LogBuffer};

/// Console line printing the recent log instead of reaching the bot.
const LOGS_COMMAND: &str = "/logs";

pub fn run(args: &Cli, log_buffer: LogBuffer) -> Result<i32> {
    let mut bot = Bot::new(&args.data)?;
    info!("Starting cheesebot with data in {}", bot.data_path().display());
    if let Some(channel) = &args.voice_channel {
        bot.config().set("voice_channel", channel.as_str())?;
    }
    bot.add_default_cogs();

    let voice_channel = if args.mute {
        None
    } else {
        bot.config().get_str("voice_channel")
    };
    let mut session = LocalSession::new(args.mention.as_str(), voice_channel);

    let (events, receiver) = mpsc::channel();
    install_shutdown_handler(events.clone());
    spawn_console(events.clone(), log_buffer)?;
    // Ready is queued before any console line can be.
    let _ = events.send(Event::Ready);
    drop(events);

    bot.run(&mut session, receiver)?;
    Ok(0)
}

fn install_shutdown_handler(events: Sender<Event>) {
    let result = ctrlc::set_handler(move || {
        eprintln!("\nShutting down...");
        let _ = events.send(Event::Shutdown);
    });
    if let Err(err) = result {
        warn!("failed to install signal handler: {}", err);
    }
}

/// Forward console lines to the bot; end of input shuts it down.
fn spawn_console(events: Sender<Event>, log_buffer: LogBuffer) -> Result<()> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == LOGS_COMMAND {
                    for entry in logging::snapshot(&log_buffer) {
                        println!("{}", entry);
                    }
                    continue;
                }
                let message = Message {
                    channel: CONSOLE_CHANNEL.to_string(),
                    author: "console".to_string(),
                    content: line.to_string(),
                };
                if events.send(Event::Message(message)).is_err() {
                    return;
                }
            }
            let _ = events.send(Event::Shutdown);
        })?;
    Ok(())
}
