use clap::Args;
use std::path::PathBuf;

use lockin_core::{Config, LlmClient, PdfContext, SessionContext, StudyAssistant};

#[derive(Args)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,
    /// Elapsed session seconds, for grounding the answer
    #[arg(long, default_value_t = 0)]
    pub session_seconds: u64,
    /// Focused session seconds
    #[arg(long, default_value_t = 0)]
    pub focused_seconds: u64,
    /// Extracted study-material text file to attach as context
    #[arg(long)]
    pub material: Option<PathBuf>,
}

pub async fn run(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let assistant = StudyAssistant::new(LlmClient::new(&config.llm));

    let pdf = match &args.material {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Some(PdfContext::new(filename, text))
        }
        None => None,
    };

    let context = SessionContext {
        session_secs: args.session_seconds,
        focused_secs: args.focused_seconds,
    };
    let answer = assistant.answer(&args.question, &context, pdf.as_ref()).await;
    println!("{answer}");
    Ok(())
}
