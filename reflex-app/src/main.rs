mod app;
mod command;
mod render;
mod settings;

use anyhow::{Context, Result};
use app::App;
use command::Command;
use log::{debug, info};
use reflex_store::{FileStore, Storage};
use reflex_timing::MonotonicTimer;
use settings::Settings;
use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn main() -> Result<()> {
    let default_level = if Settings::is_debug_mode() { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let data_dir = Settings::data_dir();
    let settings = Settings::load(&data_dir);
    let store = FileStore::open(&data_dir)
        .with_context(|| format!("cannot use data directory {}", data_dir.display()))?;
    info!(target: "app", "Data directory {}", store.dir().display());

    let mut app = App::new(settings, MonotonicTimer::new(), Storage::new(store), Settings::seed_from_env());
    print_lines(app.greeting());

    // stdin is read on its own thread; the loop below polls session timers
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        let command = match rx.recv_timeout(app.poll_interval()) {
            Ok(line) => match line.parse::<Command>() {
                Ok(command) => Some(command),
                Err(e) => {
                    println!("{e}");
                    None
                }
            },
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                debug!(target: "app", "stdin closed");
                break;
            }
        };
        print_lines(app.step(command));
        if app.should_exit() {
            break;
        }
    }

    app.shutdown();
    Ok(())
}
