//! Atombox entry point
//!
//! A thin text-mode shim around the engine: parses difficulty/seed from the
//! command line, feeds player commands to the simulation, and prints the
//! events drained back out. No game rules live here.

use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use glam::IVec2;

use atombox::highscores::{HighScoreEntry, HighScores};
use atombox::settings::{Difficulty, Settings};
use atombox::sim::{Command, Direction, GameEvent, GamePhase, GameState, RayOutcome, apply};

fn print_usage() {
    println!("Usage: atombox [--difficulty easy|medium|hard] [--seed N] [--name NAME]");
    println!();
    println!("Commands at the prompt:");
    println!("  fire <x> <y> <up|down|left|right>   fire a ray from a ring cell");
    println!("  guess <x> <y>                       toggle an atom guess");
    println!("  done                                finalize guesses for scoring");
    println!("  quit                                abandon the run");
}

fn main() {
    env_logger::init();

    let mut settings = Settings::load();
    let mut seed = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--difficulty" | "-d" => {
                if let Some(tier) = args.next().as_deref().and_then(Difficulty::from_str) {
                    settings.difficulty = tier;
                }
            }
            "--seed" | "-s" => {
                seed = args.next().and_then(|v| v.parse().ok());
            }
            "--name" | "-n" => {
                if let Some(name) = args.next() {
                    settings.player_name = name;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                return;
            }
        }
    }

    let seed = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });

    let mut state = GameState::solo(settings.player_name.clone(), settings.difficulty, seed);
    let size = state.board(0).grid().size();
    println!(
        "{} board: {}x{} grid, {} hidden atoms, score {}. Ring cells use x or y = -1 or {}.",
        settings.difficulty.as_str(),
        size,
        size,
        state.board(0).atoms().len(),
        state.player(0).score,
        size,
    );

    let stdin = io::stdin();
    let mut line = String::new();
    while state.phase == GamePhase::Active {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts[0] == "quit" {
            println!("Run abandoned.");
            return;
        }
        let Some(command) = parse_command(&parts) else {
            println!("Unrecognized command.");
            continue;
        };
        if let Err(e) = apply(&mut state, command) {
            println!("Rejected: {e}");
            continue;
        }
        for event in state.take_events() {
            print_event(&settings, &event);
        }
    }

    record_run(&settings, &state);
}

fn parse_command(parts: &[&str]) -> Option<Command> {
    match parts {
        ["fire", x, y, dir] => Some(Command::FireRay {
            entry: IVec2::new(x.parse().ok()?, y.parse().ok()?),
            direction: Direction::from_str(dir)?,
        }),
        ["guess", x, y] => Some(Command::ToggleGuess {
            pos: IVec2::new(x.parse().ok()?, y.parse().ok()?),
        }),
        ["done"] => Some(Command::FinalizeGuesses),
        ["pass"] => Some(Command::EndTurn),
        _ => None,
    }
}

fn print_event(settings: &Settings, event: &GameEvent) {
    match event {
        GameEvent::RayFired { ray, .. } => {
            match ray.outcome {
                RayOutcome::Hit => println!("Absorbed."),
                RayOutcome::Exit { exit } => {
                    println!("Passed through; exited at ({}, {}).", exit.x, exit.y)
                }
                RayOutcome::Deflected { exit } => {
                    println!("Deflected; exited at ({}, {}).", exit.x, exit.y)
                }
                RayOutcome::DoubleDeflected { exit } => {
                    if settings.highlight_detours {
                        println!("Detour! Reflected back to ({}, {}).", exit.x, exit.y)
                    } else {
                        println!("Reflected back to ({}, {}).", exit.x, exit.y)
                    }
                }
            }
            if settings.show_ray_paths {
                let cells: Vec<String> = ray
                    .path
                    .iter()
                    .map(|p| format!("({}, {})", p.x, p.y))
                    .collect();
                println!("  path: {}", cells.join(" -> "));
            }
        }
        GameEvent::GuessToggled { pos, active, .. } => {
            let verb = if *active { "placed" } else { "removed" };
            println!("Guess {verb} at ({}, {}).", pos.x, pos.y);
        }
        GameEvent::GuessesScored {
            correct, incorrect, ..
        } => {
            println!("Scored: {correct} correct, {incorrect} wrong.");
        }
        GameEvent::ScoreChanged { score, .. } => println!("Score: {score}"),
        GameEvent::AtomRevealed { pos, .. } => {
            println!("Atom found at ({}, {})!", pos.x, pos.y)
        }
        GameEvent::TurnPassed { .. } => {}
        GameEvent::SimulationFault { .. } => {
            println!("The ray fizzled out; treat it as a miss.")
        }
        GameEvent::GameEnded { winner, .. } => match winner {
            Some(_) => println!("You found every atom. Well played!"),
            None => println!("Out of points. The atoms keep their secrets."),
        },
    }
}

/// Push a finished run onto the leaderboard if it qualifies
fn record_run(settings: &Settings, state: &GameState) {
    if state.phase != GamePhase::Finished {
        return;
    }
    let player = state.player(0);
    let mut scores = HighScores::load();
    let entry = HighScoreEntry {
        name: player.name.clone(),
        score: player.score,
        difficulty: settings.difficulty,
        rays_fired: player.rays.len() as u32,
        atoms_found: player.found.len() as u32,
        timestamp: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    };
    if let Some(rank) = scores.add_score(entry) {
        scores.save();
        println!("High score! Rank {rank} with {} points.", player.score);
    }
}
