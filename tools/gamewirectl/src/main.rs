// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! gamewirectl: inspect and mutate game-protocol packets from the terminal.
//!
//! Thin shell over the gamewire core: it parses arguments, loads a schema
//! source if one is given, and prints what the core returns. All protocol
//! logic lives in the library.

use gamewire::codec::FieldValue;
use gamewire::fuzzing::{self, MutationKind};
use gamewire::packet::{self, field};
use gamewire::phase::{Phase, Tracker};
use gamewire::schema::Registry;
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let command = args.get(1).map(String::as_str);
    let result = match command {
        Some("decode") => cmd_decode(&args[2..]),
        Some("fuzz") => cmd_fuzz(&args[2..]),
        Some("phases") => cmd_phases(),
        _ => {
            print_usage();
            std::process::exit(2)
        }
    };

    if let Err(message) = result {
        eprintln!("[FAIL] {}", message);
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("gamewirectl: game-protocol packet inspector");
    println!();
    println!("Usage:");
    println!("  gamewirectl decode <hex> [schema.json]");
    println!("  gamewirectl fuzz <packet-id> [limit] [schema.json]");
    println!("  gamewirectl phases");
    println!();
    println!("Examples:");
    println!("  gamewirectl decode 0300000000000000000000000000000000000b48656c6c6f20576f726c640000018d1234abcd");
    println!("  gamewirectl fuzz 0x01 10");
}

/// Load a registry from an optional schema path; without one the builtin
/// layouts recovered from captures are used directly.
fn load_registry(path: Option<&String>) -> Registry {
    match path {
        Some(path) => Registry::from_file_or_fallback(Path::new(path)),
        None => Registry::builtin(),
    }
}

fn cmd_decode(args: &[String]) -> Result<(), String> {
    let hex_input = args.first().ok_or("missing hex payload")?;
    let cleaned: String = hex_input.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = hex::decode(&cleaned).map_err(|e| format!("bad hex payload: {}", e))?;

    let registry = load_registry(args.get(1));
    let analysis = packet::analyze(&registry, &raw);

    println!("{}", "=".repeat(60));
    print!("{}", analysis.packet);
    println!("{}", "=".repeat(60));
    if !analysis.success {
        return Err("decode incomplete (see error above)".into());
    }
    Ok(())
}

fn parse_packet_id(input: &str) -> Result<u64, String> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    u64::from_str_radix(digits, 16).map_err(|e| format!("bad packet id {:?}: {}", input, e))
}

fn cmd_fuzz(args: &[String]) -> Result<(), String> {
    let packet_id = parse_packet_id(args.first().ok_or("missing packet id")?)?;
    let limit: usize = match args.get(1) {
        Some(raw) => raw.parse().map_err(|e| format!("bad limit: {}", e))?,
        None => 10,
    };
    let registry = load_registry(args.get(2));

    // A representative baseline keeps the unmutated fields realistic.
    let base = vec![
        field("playerID", FieldValue::Identifier16([0xAB; 16])),
        field("position", FieldValue::Vector3f([100.0, 64.0, 100.0])),
        field("tick", FieldValue::U32(1000)),
    ];

    let cases = fuzzing::fuzz(&registry, packet_id, &base, &MutationKind::ALL)
        .map_err(|e| e.to_string())?;

    let mut count = 0usize;
    for (bytes, record) in cases.take(limit) {
        count += 1;
        println!("Mutation #{}", count);
        println!("  Field: {}", record.field_name);
        println!("  Kind: {}", record.mutation_kind);
        println!("  Original: {}", record.original_value);
        println!("  Mutated: {}", record.mutated_value);
        println!("  Packet (hex): {}", preview_hex(&bytes));

        let analysis = packet::analyze(&registry, &bytes);
        if !analysis.success {
            println!("  [!] local parser rejects this shape");
        }
        println!();
    }
    println!("Generated {} mutations", count);
    Ok(())
}

/// Shorten long packet dumps to keep terminal output readable.
fn preview_hex(bytes: &[u8]) -> String {
    let full = hex::encode(bytes);
    if full.len() > 80 {
        format!("{}... ({} bytes)", &full[..80], bytes.len())
    } else {
        full
    }
}

fn cmd_phases() -> Result<(), String> {
    let mut tracker = Tracker::new();

    // The documented session flow, then one forged claim.
    tracker.record(Phase::Init, Phase::AuthPending, "AUTH_REQUEST");
    tracker.record(Phase::AuthPending, Phase::AuthComplete, "AUTH_RESPONSE");
    tracker.record(Phase::AuthComplete, Phase::Lobby, "JOIN_LOBBY");
    tracker.record(Phase::Lobby, Phase::Day, "GAME_START");
    tracker.record(Phase::Day, Phase::Voting, "PHASE_CHANGE");
    tracker.record(Phase::Voting, Phase::Night, "VOTE_COMPLETE");
    tracker.record(Phase::Night, Phase::End, "GAME_END");
    tracker.record(Phase::End, Phase::Day, "FORGED_PHASE_CHANGE");

    let stats = tracker.statistics();
    println!("Total transitions: {}", stats.total_transitions);
    println!("Invalid transitions: {}", stats.invalid_transitions);
    println!("Current phase: {}", stats.current_phase);
    println!();

    let anomalies = tracker.detect_anomalies();
    if anomalies.is_empty() {
        println!("No anomalies detected");
    } else {
        println!("Anomalies:");
        for anomaly in &anomalies {
            println!("  [{}] {}: {}", anomaly.severity, anomaly.kind, anomaly.description);
        }
    }
    println!();
    println!("{}", tracker.export_dot());
    Ok(())
}
