//! Live terminal session driver.
//!
//! Ticks the session machine once per second and maps stdin commands onto
//! the browser-level signals: `away`/`back` stand in for visibility changes,
//! `pause`/`resume` for the manual toggle. Ending goes through the exit
//! guard; a denied evaluation keeps the session running.

use chrono::Utc;
use clap::Args;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use lockin_core::guard::{EvaluationInput, ExitGuard};
use lockin_core::roast::{RoastContext, RoastGenerator};
use lockin_core::{
    ChecklistItem, Config, Event, LlmClient, SessionConfig, SessionMachine,
};

#[derive(Args)]
pub struct SessionArgs {
    /// Session goal
    #[arg(long)]
    pub goal: String,
    /// Target duration in minutes
    #[arg(long)]
    pub minutes: u32,
    /// Checklist item (repeatable)
    #[arg(long = "task")]
    pub tasks: Vec<String>,
}

pub async fn run(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let llm = LlmClient::new(&config.llm);
    let guard = ExitGuard::new(llm.clone());
    let roaster = Arc::new(RoastGenerator::new(llm));

    let checklist = args
        .tasks
        .iter()
        .map(|task| ChecklistItem::new(task.clone()))
        .collect();
    let session_config = SessionConfig::new(args.goal, args.minutes, checklist)?;

    let mut machine = SessionMachine::new(config.session.debounce_window());
    if let Some(Event::SessionStarted {
        goal,
        target_minutes,
        ..
    }) = machine.start(session_config)
    {
        println!("Locked in: {goal} ({target_minutes} minutes)");
        println!(
            "Commands: pause, resume, away, back, status, end <reflection, \\n between points>, end!"
        );
    }

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut target_announced = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                machine.tick();
                if let Some(snap) = machine.snapshot() {
                    let target_secs = snap.target_minutes as u64 * 60;
                    if !target_announced && snap.elapsed_secs >= target_secs {
                        target_announced = true;
                        println!("Target duration reached. `end <reflection>` to finish.");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                if try_end(&mut machine, &guard, "").await? {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if handle_command(line.trim(), &mut machine, &guard, &roaster).await? {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Returns true when the session is over and the loop should exit.
async fn handle_command(
    line: &str,
    machine: &mut SessionMachine,
    guard: &ExitGuard,
    roaster: &Arc<RoastGenerator>,
) -> Result<bool, Box<dyn std::error::Error>> {
    match line {
        "" => {}
        "pause" => {
            if machine.pause().is_some() {
                println!("Paused. Focused time is not accumulating.");
            }
        }
        "resume" => {
            if machine.resume().is_some() {
                println!("Resumed.");
            }
        }
        "away" => {
            if let Some(Event::FocusLost { violations, .. }) =
                machine.visibility_changed(false, Utc::now())
            {
                println!("Focus lost! Violation #{violations}.");
                if let Some(snap) = machine.snapshot() {
                    let context = RoastContext {
                        elapsed_secs: snap.elapsed_secs,
                        focus_pct: snap.focus_pct(),
                        violations,
                    };
                    let roaster = Arc::clone(roaster);
                    // Never blocks the transition; the message prints when it
                    // arrives.
                    tokio::spawn(async move {
                        if let Some(message) = roaster.roast_debounced(&context).await {
                            println!("{message}");
                        }
                    });
                }
            }
        }
        "back" => {
            machine.visibility_changed(true, Utc::now());
            if machine.lock_back_in().is_some() {
                println!("Locked back in.");
            }
        }
        "status" => {
            if let Some(snap) = machine.snapshot() {
                println!(
                    "{}s elapsed, {}s focused ({}%), {} violations",
                    snap.elapsed_secs,
                    snap.focused_secs,
                    snap.focus_pct(),
                    snap.violations,
                );
            }
        }
        "end!" => {
            if let Some(Event::SessionEnded {
                elapsed_secs,
                focused_secs,
                violations,
                ..
            }) = machine.force_end()
            {
                println!(
                    "Ended anyway: {elapsed_secs}s elapsed, {focused_secs}s focused, \
                     {violations} violations."
                );
            }
            return Ok(true);
        }
        _ => {
            if line == "end" || line.starts_with("end ") {
                // Literal \n separates reflection points on a single line.
                let reflection = line.strip_prefix("end").unwrap_or_default().trim().replace("\\n", "\n");
                return try_end(machine, guard, &reflection).await;
            }
            println!("Unknown command: {line}");
        }
    }
    Ok(false)
}

async fn try_end(
    machine: &mut SessionMachine,
    guard: &ExitGuard,
    reflection: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(snap) = machine.request_end() else {
        return Ok(true);
    };
    println!("Evaluating session...");
    let evaluation = guard
        .evaluate(&EvaluationInput {
            goal_minutes: snap.target_minutes,
            elapsed_secs: snap.elapsed_secs,
            violations: snap.violations,
            reflection: reflection.to_string(),
            checklist_complete: snap.checklist_complete,
            focus_pct: snap.focus_pct(),
        })
        .await;

    match machine.resolve_end(snap.session_id, &evaluation) {
        Some(Event::SessionEnded {
            elapsed_secs,
            focused_secs,
            violations,
            ..
        }) => {
            println!("{}", evaluation.feedback);
            println!(
                "Session ended: {elapsed_secs}s elapsed, {focused_secs}s focused, \
                 {violations} violations."
            );
            Ok(true)
        }
        Some(Event::EndDenied { feedback, .. }) => {
            println!("{feedback}");
            if !evaluation.roast.is_empty() {
                println!("{}", evaluation.roast);
            }
            println!("Session continues. Add reflection detail, or `end!` to end anyway.");
            Ok(false)
        }
        _ => Ok(false),
    }
}
