// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! fantasy8: A Chip-8 style fantasy console, in your terminal

mod term;

use fantasy8::{error::Result, *};
use gumdrop::*;
use log::{info, warn, LevelFilter};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use term::Term;

pub fn main() -> Result<()> {
    let options = Arguments::parse_args_default_or_exit();
    init_logger(options.debug);

    let Some(file) = options.file.clone() else {
        println!("Too few arguments.\n{}", usage());
        return Ok(());
    };
    let mut emu = Emulator::new(options.flags(), options.rates());
    if let Err(e) = emu.load_program(&file) {
        eprintln!("{}", e.bold().red());
        std::process::exit(1);
    }

    // The terminal is restored when `term` drops, before anything is printed
    let result = Term::new().and_then(|mut term| emu.run(&mut term));
    match result {
        Ok(exit) => info!("{exit:?} after {} instructions", emu.cpu().cycle()),
        Err(e) => {
            eprintln!("{}", e.bold().red());
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Logs to stderr, filtered by `RUST_LOG`. Debug mode raises the level so
/// the instruction trace comes through.
fn init_logger(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn usage() -> String {
    format!(
        "Usage: {} [OPTIONS] FILE\n\n{}",
        env!("CARGO_PKG_NAME"),
        Arguments::usage()
    )
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Load a program to run.", free)]
    pub file: Option<PathBuf>,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Enable debug mode (instruction trace) at startup.")]
    pub debug: bool,

    #[options(
        help = "Set the instructions-per-second rate. If unspecified or 0, run as fast as possible.",
        meta = "IPS"
    )]
    pub speed: Option<u32>,
    #[options(help = "Set the target framerate.", default = "100", meta = "FR")]
    pub frame_rate: u32,

    #[options(
        short = "k",
        help = "Skip over invalid instructions, instead of halting."
    )]
    pub skip_invalid: bool,
}

impl Arguments {
    fn flags(&self) -> Flags {
        Flags {
            debug: self.debug,
            on_invalid: match self.skip_invalid {
                true => InvalidPolicy::Skip,
                false => InvalidPolicy::Halt,
            },
            ..Default::default()
        }
    }

    fn rates(&self) -> Rates {
        if self.speed == Some(0) {
            warn!("--speed 0 would never run; running as fast as possible");
        }
        Rates {
            ips: self.speed.filter(|&ips| ips > 0),
            frame_hz: self.frame_rate,
            ..Default::default()
        }
    }
}
