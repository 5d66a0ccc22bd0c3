//! mcbp-dump
//!
//! Decodes hex-encoded frames and prints their header fields.

use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mcbp_core::protocol::{descriptor, Frame, MAX_BODY_SIZE};

/// Frame decoder for debugging captures
#[derive(Parser, Debug)]
#[command(name = "mcbp-dump")]
#[command(about = "Decode hex-encoded binary protocol frames")]
#[command(version)]
struct Args {
    /// Hex-encoded frames; read one per line from stdin when omitted
    frames: Vec<String>,

    /// Largest body accepted (bytes)
    #[arg(long, default_value_t = MAX_BODY_SIZE)]
    max_body: usize,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mcbp_core=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let inputs: Vec<String> = if args.frames.is_empty() {
        match io::stdin().lock().lines().collect::<io::Result<Vec<String>>>() {
            Ok(lines) => lines,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        args.frames
    };

    let mut failures = 0usize;
    for (index, input) in inputs.iter().enumerate() {
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if let Err(e) = dump(input, args.max_body) {
            tracing::warn!("Frame {}: {}", index, e);
            failures += 1;
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn dump(input: &str, max_body: usize) -> Result<(), String> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(cleaned).map_err(|e| format!("invalid hex: {}", e))?;
    let frame = Frame::parse_bounded(&bytes, max_body).map_err(|e| e.to_string())?;
    let header = frame.header().map_err(|e| e.to_string())?;

    println!("magic:           {:?}", frame.magic);
    println!(
        "opcode:          {} (0x{:02x})",
        descriptor(frame.opcode).name,
        frame.opcode as u8
    );
    if frame.magic.is_response() {
        println!("status:          {:?}", frame.status());
    } else {
        println!("vbucket:         {}", frame.vbucket_or_status);
    }
    println!("opaque:          {}", frame.opaque);
    println!("cas:             {}", frame.cas);
    println!("datatype:        0x{:02x}", frame.datatype);
    println!(
        "regions:         framing={} extras={} key={} value={}",
        header.framing_extras_len,
        header.extras_len,
        header.key_len,
        header.value_len()
    );
    if !frame.key.is_empty() {
        println!("key:             {}", String::from_utf8_lossy(&frame.key));
    }
    if !frame.value.is_empty() {
        println!("value:           {}", hex::encode(&frame.value));
    }
    if let Some(duration) = frame.server_duration() {
        println!("server duration: {:?}", duration);
    }
    println!();
    Ok(())
}
