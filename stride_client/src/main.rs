//! Headless client binary.
//!
//! Usage:
//!   cargo run -p stride_client -- [--config demo.json] [--hz 60] [--frames 600] [--script keys.json]
//!
//! With `--script`, key transitions are replayed in simulated time and the
//! final state is printed. Otherwise the client runs a paced frame loop and
//! reads commands from stdin.
//!
//! Console commands:
//!   down <key>     - Press a key (w a s d space shift 1 2 3 4, or a key code)
//!   up <key>       - Release a key
//!   resize <w> <h> - Resize the viewport
//!   clear          - Release all keys
//!   reset          - Put the character back at the origin
//!   status         - Show character state
//!   quit           - Exit client

use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use stride_client::input::KeyScript;
use stride_client::DemoApp;
use stride_shared::config::DemoConfig;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    hz: Option<u32>,
    /// 0 runs until `quit`.
    frames: u32,
}

fn parse_args() -> Args {
    let mut out = Args::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--script" if i + 1 < args.len() => {
                out.script = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--hz" if i + 1 < args.len() => {
                out.hz = args[i + 1].parse().ok();
                i += 2;
            }
            "--frames" if i + 1 < args.len() => {
                out.frames = args[i + 1].parse().unwrap_or(0);
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let mut cfg = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    if let Some(hz) = args.hz {
        cfg.frame_hz = hz;
    }
    info!(frame_hz = cfg.frame_hz, clips = cfg.clips.len(), "Starting client");

    let mut app = DemoApp::headless(cfg);

    if let Some(path) = &args.script {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read script {}", path.display()))?;
        let script = KeyScript::from_json_str(&text)
            .with_context(|| format!("parse script {}", path.display()))?;
        let frames = if args.frames > 0 {
            args.frames
        } else {
            // Run one second past the last event so trailing actions finish.
            ((script.duration() + 1.0) / app.cfg.frame_dt()).ceil() as u32
        };
        app.replay(&script, frames);
        for ev in app.drain_anim_events() {
            info!(?ev, "Animation");
        }
        for line in app.status() {
            println!("{}", line);
        }
        return Ok(());
    }

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Client running. Type 'status' for info, 'quit' to exit.");
    println!();

    let dt = app.cfg.frame_dt();
    let frame_interval = Duration::from_secs_f32(dt);
    let report_every = u64::from(app.cfg.frame_hz.max(1));
    let mut next = Instant::now();

    loop {
        // Process console commands.
        let mut quit = false;
        while let Ok(line) = console_rx.try_recv() {
            if matches!(line.as_str(), "quit" | "exit") {
                quit = true;
                break;
            }
            for out in app.exec_command(&line) {
                println!("{}", out);
            }
        }
        if quit {
            break;
        }

        next += frame_interval;
        app.frame(dt);

        for ev in app.drain_anim_events() {
            info!(?ev, "Animation");
        }
        if app.frame_count() % report_every == 0 {
            let p = app.character.position;
            info!(
                frame = app.frame_count(),
                x = p.x,
                z = p.z,
                speed = app.controller.movement.speed(),
                "Character"
            );
        }
        if args.frames > 0 && app.frame_count() >= u64::from(args.frames) {
            break;
        }

        tokio::time::sleep_until(next).await;
    }

    for line in app.status() {
        println!("{}", line);
    }
    Ok(())
}
