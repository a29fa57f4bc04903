//! pinch_menu — interactive entry point.

use pinch_menu::app::{AppConfig, run};
use hand_signal::Handedness;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Pinch Menu — hand gesture volume & brightness         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: left hand, hover 120 px, commit 55 px, built-in icons\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let mut cfg = AppConfig::default();

    cfg.menu.handedness = pick_handedness();

    cfg.menu.control.display_exponent = {
        let e: f32 = read_line("  Display curve exponent (default 1.0): ")
            .trim().parse().unwrap_or(1.0);
        if e.is_finite() && e > 0.0 { e.clamp(0.1, 5.0) } else { 1.0 }
    };

    cfg.menu.hover_radius = read_line("  Hover radius px (default 120): ")
        .trim().parse::<f32>().unwrap_or(120.0).clamp(20.0, 300.0);

    let hover = cfg.menu.hover_radius;
    cfg.menu.commit_radius = loop {
        let line = read_line("  Commit radius px (default 55): ");
        let Ok(r) = line.trim().parse::<f32>() else {
            // blank, unreadable or closed stdin: default, never wider than hover
            break commit_default(hover);
        };
        if r >= 10.0 && r <= hover { break r; }
        println!("    ⚠  10–{} only (not wider than hover).", hover);
    };

    cfg.midi_channel = read_line("  MIDI channel for volume 1–16 (default 1): ")
        .trim().parse::<u8>().unwrap_or(1).clamp(1, 16) - 1;

    let dir = read_line("  Icon directory (blank = built-in): ");
    let dir = dir.trim();
    if !dir.is_empty() {
        cfg.icon_dir = Some(PathBuf::from(dir));
    }

    cfg
}

fn commit_default(hover_radius: f32) -> f32 {
    55.0_f32.min(hover_radius).max(10.0)
}

fn pick_handedness() -> Handedness {
    println!("  Tracked hand:  1.Left  2.Right");
    match read_line("  Choice (1–2, default 1): ").trim() {
        "2" => Handedness::Right,
        _   => Handedness::Left,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
