// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command line runner
//!
//! Loads a raw big-endian program image into RDRAM, runs it for a number of
//! cycles and optionally writes a trace, a JSON register dump or a save
//! state.

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use n64rx::core::config::EmulatorConfig;
use n64rx::core::error::Result;
use n64rx::core::system::{RunControl, System};

/// Nintendo 64 CPU emulator
#[derive(Parser)]
#[command(name = "n64rx")]
#[command(about = "VR4300 CPU emulator", long_about = None)]
struct Args {
    /// Raw program image (big-endian)
    program: PathBuf,

    /// Configuration file (TOML). Falls back to $N64RX_CONFIG.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Physical load address
    #[arg(short = 'a', long, default_value = "0x1000", value_parser = parse_address)]
    load_address: u64,

    /// Virtual entry point (defaults to the kseg0 alias of the load address)
    #[arg(short = 'e', long, value_parser = parse_address)]
    entry: Option<u64>,

    /// Number of cycles to execute
    #[arg(short = 'n', long, default_value = "100000")]
    cycles: u64,

    /// PIF boot ROM; when given, execution starts at the reset vector
    #[arg(long)]
    pif_rom: Option<PathBuf>,

    /// Write an execution trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Stop on the first unimplemented instruction
    #[arg(long)]
    halt_on_unimplemented: bool,

    /// Restore a save state before running
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write a save state after running
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Write the final CPU state as JSON
    #[arg(long)]
    dump_state: Option<PathBuf>,
}

/// Parse a decimal or 0x-prefixed hexadecimal address
fn parse_address(text: &str) -> std::result::Result<u64, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

fn load_config(args: &Args) -> Result<EmulatorConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var("N64RX_CONFIG").ok().map(PathBuf::from));

    let mut config = match path {
        Some(path) => EmulatorConfig::from_file(path)?,
        None => EmulatorConfig::default(),
    };
    if args.halt_on_unimplemented {
        config.halt_on_unimplemented = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    // Load .env file if present (log levels, config path)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize logger with default level INFO
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("n64rx v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = load_config(&args)?;
    let trace_limit = config.trace_limit;
    let mut system = System::with_config(config)?;

    let size = system.load_program_file(&args.program, args.load_address)?;
    info!("Loaded {} ({} bytes)", args.program.display(), size);

    match &args.pif_rom {
        Some(path) => {
            let rom = std::fs::read(path)?;
            system.bus_mut().load_pif_rom(&rom);
            info!("PIF ROM loaded, starting at the reset vector");
        }
        None => {
            let entry = args.entry.unwrap_or(System::kseg0(args.load_address));
            system.boot(entry);
        }
    }

    if let Some(path) = &args.load_state {
        system.load_state(path)?;
    }

    if let Some(path) = &args.trace {
        system.enable_tracing(path, trace_limit)?;
    }

    let control = RunControl::new();
    let outcome = system.run_for(&control, args.cycles);
    match &outcome {
        Ok(executed) => info!("Executed {} cycles", executed),
        Err(e) => {
            error!("Error at PC=0x{:016X}: {}", system.cpu().current_pc(), e);
            system.cpu().dump_registers();
        }
    }
    system.disable_tracing();

    info!("Total cycles: {}", system.cycles());
    info!("Final PC: 0x{:016X}", system.pc());

    if let Some(path) = &args.dump_state {
        let json = control
            .latest_snapshot()
            .unwrap_or_else(|| system.snapshot())
            .to_json()?;
        std::fs::write(path, json)?;
        info!("CPU state written to {}", path.display());
    }

    if let Some(path) = &args.save_state {
        system.save_state(path)?;
    }

    outcome.map(|_| ())
}
