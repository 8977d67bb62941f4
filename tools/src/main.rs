//! sim-runner: headless runner for the actor simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 600 --rules data/rules.json
//!   sim-runner --seed 12345 --ticks 600 --json
//!   sim-runner --seed 12345 --ipc-mode

use actorsim_core::{
    actor::ActorInit,
    command::Order,
    config::Ruleset,
    engine::SimEngine,
    error::SimResult,
    event::SimEvent,
    player::Player,
    snapshot::WorldSnapshot,
    types::{ActorId, CPos, Color, PlayerId},
};
use anyhow::Result;
use std::{
    collections::BTreeMap,
    env,
    io::{self, BufRead, Write},
    sync::Arc,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Order { actor: ActorId, order: Order },
    Damage { actor: ActorId, attacker: Option<ActorId>, amount: i32 },
    Infiltrate { actor: ActorId, infiltrator: ActorId },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    snapshot:  WorldSnapshot,
    sync_hash: u64,
    paused:    bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let seed: u64 = flag_value(&args, "--seed").unwrap_or(42);
    let ticks: u64 = flag_value(&args, "--ticks").unwrap_or(600);
    let rules = flag_str(&args, "--rules");
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let json = has_flag(&args, "--json");

    let ruleset = match rules {
        Some(path) => Ruleset::load(path)?,
        None => Ruleset::default_test(),
    };

    if !ipc_mode && !json {
        println!("actorsim sim-runner");
        println!("  seed:   {seed}");
        println!("  ticks:  {ticks}");
        println!("  rules:  {}", rules.unwrap_or("(built-in)"));
        println!();
    }

    let run_id = format!("run-{seed}");
    let mut engine = SimEngine::new(run_id, seed, Arc::new(ruleset), skirmish_players());
    setup_skirmish(&mut engine)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        engine.run_ticks(ticks)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&build_ui_state(&engine)?)?);
        } else {
            print_summary(&engine)?;
        }
    }

    Ok(())
}

fn skirmish_players() -> Vec<Player> {
    vec![
        Player::neutral(PlayerId(0)),
        Player::new(PlayerId(1), "Allies", Color::rgb(80, 120, 255), 5000),
        Player::new(PlayerId(2), "Soviets", Color::rgb(230, 40, 40), 5000),
    ]
}

/// Two small bases. Whatever the ruleset lacks is skipped with a warning,
/// so custom rule files only need the types they care about.
fn setup_skirmish(engine: &mut SimEngine) -> Result<()> {
    let layout = [
        ("powerplant", 1, CPos::new(2, 2)),
        ("refinery", 1, CPos::new(5, 2)),
        ("harvester", 1, CPos::new(6, 4)),
        ("harvester", 1, CPos::new(7, 4)),
        ("tank", 1, CPos::new(8, 8)),
        ("medic", 1, CPos::new(9, 8)),
        ("powerplant", 2, CPos::new(40, 40)),
        ("refinery", 2, CPos::new(43, 40)),
        ("bunker", 2, CPos::new(38, 36)),
        ("stealth", 2, CPos::new(36, 36)),
        ("tank", 2, CPos::new(35, 35)),
    ];

    let mut bulk = Vec::new();
    for (actor_type, owner, location) in layout {
        if engine.world().ruleset().get(actor_type).is_none() {
            log::warn!("ruleset has no '{actor_type}', skipping");
            continue;
        }
        bulk.push((actor_type.to_string(), ActorInit::new(PlayerId(owner), location)));
    }
    let ids = engine.spawn_bulk(bulk)?;
    log::info!("skirmish ready: {} actors", ids.len());
    Ok(())
}

/// One JSON command per stdin line, one JSON reply per stdout line.
/// Bad input and failed operations get an `{"error": ...}` reply and the
/// loop keeps going; EOF or `quit` ends it.
fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let mut out = io::stdout().lock();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<IpcCommand>(&line) {
            Err(e) => error_reply(e),
            Ok(IpcCommand::Quit) => break,
            Ok(cmd) => match apply_command(engine, cmd) {
                Ok(()) => serde_json::to_value(build_ui_state(engine)?)?,
                Err(e) => error_reply(e),
            },
        };
        writeln!(out, "{reply}")?;
        out.flush()?;
    }
    Ok(())
}

fn apply_command(engine: &mut SimEngine, cmd: IpcCommand) -> SimResult<()> {
    match cmd {
        IpcCommand::GetState | IpcCommand::Quit => Ok(()),
        IpcCommand::Tick { count } => engine.run_ticks(count),
        IpcCommand::Order { actor, order } => {
            engine.issue_order(actor, order);
            Ok(())
        }
        IpcCommand::Damage { actor, attacker, amount } => {
            engine.inflict_damage(actor, attacker, amount).map(drop)
        }
        IpcCommand::Infiltrate { actor, infiltrator } => {
            engine.infiltrate(actor, infiltrator).map(drop)
        }
    }
}

fn error_reply(e: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": e.to_string() })
}

fn build_ui_state(engine: &SimEngine) -> Result<UiState> {
    let snapshot = engine.snapshot();
    let sync_hash = snapshot.sync_hash()?;
    Ok(UiState { snapshot, sync_hash, paused: engine.is_paused() })
}

fn print_summary(engine: &SimEngine) -> Result<()> {
    let snapshot = engine.snapshot();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in engine.event_log() {
        *counts.entry(event.type_name()).or_default() += 1;
    }
    let services = engine
        .event_log()
        .iter()
        .filter(|e| matches!(e, SimEvent::ServiceCompleted { .. }))
        .count();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:      {}", engine.run_id);
    println!("  final tick:  {}", engine.current_tick());
    println!("  actors:      {}", snapshot.actors.len());
    println!("  services:    {services}");
    println!("  sync hash:   {:016x}", snapshot.sync_hash()?);

    println!();
    println!("=== PLAYERS ===");
    for p in engine.world().players() {
        println!(
            "  {:<8} | cash: {:>6} | power: {:>4} / {:<4}",
            p.name,
            p.cash(),
            p.power_provided(),
            p.power_drained()
        );
    }

    println!();
    println!("=== EVENTS ===");
    for (name, count) in counts {
        println!("  {name:<22} {count}");
    }
    Ok(())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_str<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let at = args.iter().position(|a| a == flag)?;
    args.get(at + 1).map(String::as_str)
}

/// Unparseable values fall back to the default like missing ones.
fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    flag_str(args, flag)?.parse().ok()
}
