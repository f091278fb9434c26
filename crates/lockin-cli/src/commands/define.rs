use clap::Args;

#[derive(Args)]
pub struct DefineArgs {
    /// The term to define
    pub term: String,
    /// Surrounding context (subject, chapter, selection)
    #[arg(long, default_value = "")]
    pub context: String,
}

pub fn run(args: DefineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let definition = lockin_core::define(&args.term, &args.context);
    println!("{}", serde_json::to_string_pretty(&definition)?);
    Ok(())
}
