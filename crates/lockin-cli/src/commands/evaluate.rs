use clap::Args;

use lockin_core::{evaluate_session, EvaluationInput, SessionContext};

#[derive(Args)]
pub struct EvaluateArgs {
    /// Target duration in minutes
    #[arg(long)]
    pub goal_minutes: u32,
    /// Elapsed seconds
    #[arg(long)]
    pub elapsed_seconds: u64,
    /// Focused seconds (used to derive the focus rate)
    #[arg(long)]
    pub focused_seconds: u64,
    /// Violation count
    #[arg(long, default_value_t = 0)]
    pub violations: u32,
    /// Reflection text; "-" reads it from stdin
    #[arg(long, default_value = "")]
    pub reflection: String,
    /// All checklist items were completed
    #[arg(long)]
    pub checklist_complete: bool,
}

pub fn run(args: EvaluateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let reflection = if args.reflection == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        args.reflection
    };

    let focus_pct = SessionContext {
        session_secs: args.elapsed_seconds,
        focused_secs: args.focused_seconds,
    }
    .focus_rate();

    let evaluation = evaluate_session(&EvaluationInput {
        goal_minutes: args.goal_minutes,
        elapsed_secs: args.elapsed_seconds,
        violations: args.violations,
        reflection,
        checklist_complete: args.checklist_complete,
        focus_pct,
    });

    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}
