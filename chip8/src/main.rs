use std::path::PathBuf;
use std::process;

use clap::Parser;

use chip8_core::constants::{
    DEFAULT_INSTRUCTION_RATE, DEFAULT_REFRESH_RATE, DEFAULT_SCALE, DEFAULT_TICK_RATE,
};
use chip8_core::Config;

mod audio;
mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter")]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTION_RATE)]
    ips: u32,

    /// Timer decrements per second
    #[arg(long, default_value_t = DEFAULT_TICK_RATE)]
    tick_hz: u32,

    /// Display refreshes per second
    #[arg(long, default_value_t = DEFAULT_REFRESH_RATE)]
    refresh_hz: u32,

    /// Display scale factor
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: u32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let config = Config {
        instruction_rate: args.ips,
        tick_rate: args.tick_hz,
        refresh_rate: args.refresh_hz,
        scale: args.scale,
    };

    if let Err(e) = run::run(&args.rom, config) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
