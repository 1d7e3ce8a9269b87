mod app;
mod args;
mod commands;
mod render;
mod worker;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead};
use std::thread;

use annotate::engines::Engines;
use annotate::rules::CozyRules;
use annotate::services::EngineId;
use annotate::store::JsonFileStore;
use annotate::{HudConfig, Session};
use app::{Arena, Event};
use args::Args;
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let config = HudConfig::default();
    let engine: EngineId = args.engine.parse().unwrap_or_default();

    let mut session = Session::new(
        Box::new(CozyRules),
        engine,
        args.human.into(),
        config.debounce_ms.value,
    );
    if let Some(path) = &args.session {
        session = session.with_store(Box::new(JsonFileStore::new(path)));
    }
    if !session.restore() {
        session.new_game()?;
    }

    info!(
        "Arena {} using {} ({})",
        env!("CARGO_PKG_VERSION"),
        session.engine(),
        args.stockfish.display()
    );

    let engines = Engines::new(args.stockfish.clone(), args.seed);
    let arena = Arena::new(session, config, engines, io::stdout());

    let interrupts = arena.sender();
    ctrlc::set_handler(move || {
        let _ = interrupts.send(Event::Interrupted);
    })?;

    let input = arena.sender();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if input.send(Event::Input(line)).is_err() {
                return;
            }
        }
        let _ = input.send(Event::InputClosed);
    });

    arena.run()?;
    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to a file or stderr
    if let Some(log_file) = &args.log_file {
        WriteLogger::init(
            LevelFilter::Debug,
            Config::default(),
            File::create(log_file)?,
        )?;
    } else {
        TermLogger::init(
            args.log_level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?;
    }

    Ok(args)
}
