use clap::Args;

use lockin_core::roast::{fallback_roast, RoastContext, RoastGenerator};
use lockin_core::{Config, LlmClient, SessionContext};

#[derive(Args)]
pub struct RoastArgs {
    /// Elapsed seconds
    #[arg(long)]
    pub elapsed_seconds: u64,
    /// Focused seconds
    #[arg(long)]
    pub focused_seconds: u64,
    /// Violation count
    #[arg(long, default_value_t = 1)]
    pub violations: u32,
    /// Skip the collaborator and pick a canned message
    #[arg(long)]
    pub local: bool,
}

pub async fn run(args: RoastArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.local {
        println!("{}", fallback_roast());
        return Ok(());
    }

    let config = Config::load()?;
    let generator = RoastGenerator::new(LlmClient::new(&config.llm));
    let focus_pct = SessionContext {
        session_secs: args.elapsed_seconds,
        focused_secs: args.focused_seconds,
    }
    .focus_rate();

    let message = generator
        .roast(&RoastContext {
            elapsed_secs: args.elapsed_seconds,
            focus_pct,
            violations: args.violations,
        })
        .await;
    println!("{message}");
    Ok(())
}
