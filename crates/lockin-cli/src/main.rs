use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lockin-cli", version, about = "Lock-In CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live focus session in the terminal
    Session(commands::session::SessionArgs),
    /// Evaluate a session-end request with the local decision procedure
    Evaluate(commands::evaluate::EvaluateArgs),
    /// Fetch a focus-loss message for the given session stats
    Roast(commands::roast::RoastArgs),
    /// Ask the study assistant a question
    Ask(commands::ask::AskArgs),
    /// Define a term from study material
    Define(commands::define::DefineArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session(args) => commands::session::run(args).await,
        Commands::Evaluate(args) => commands::evaluate::run(args),
        Commands::Roast(args) => commands::roast::run(args).await,
        Commands::Ask(args) => commands::ask::run(args).await,
        Commands::Define(args) => commands::define::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
