//! Study assistant -- Q&A and term definitions.
//!
//! `answer` forwards the question to the chat collaborator with session and
//! PDF context; the rule-based responder covers every failure. `define` is
//! rule-based only: a small glossary plus heuristics for unknown terms.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::{self, ChatMessage, ChatParams, LlmClient};
use crate::pdf::PdfContext;
use crate::session::machine_focus_pct as focus_pct;

const ANSWER_PARAMS: ChatParams = ChatParams {
    max_completion_tokens: 200,
    temperature: 0.7,
    top_p: 0.8,
};

/// Session stats the assistant grounds its answers in.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    pub session_secs: u64,
    pub focused_secs: u64,
}

impl SessionContext {
    pub fn focus_rate(&self) -> u32 {
        focus_pct(self.focused_secs, self.session_secs)
    }
}

pub struct StudyAssistant {
    llm: LlmClient,
}

impl StudyAssistant {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Answer a study question. Never fails: collaborator trouble degrades to
    /// [`contextual_answer`].
    pub async fn answer(
        &self,
        question: &str,
        context: &SessionContext,
        pdf: Option<&PdfContext>,
    ) -> String {
        llm::with_fallback(self.answer_remote(question, context, pdf).await, || {
            contextual_answer(question, context)
        })
    }

    async fn answer_remote(
        &self,
        question: &str,
        context: &SessionContext,
        pdf: Option<&PdfContext>,
    ) -> Result<String, LlmError> {
        let messages = [
            ChatMessage::system(coach_prompt(context, pdf)),
            ChatMessage::user(question),
        ];
        self.llm.chat(&messages, ANSWER_PARAMS).await
    }
}

fn coach_prompt(context: &SessionContext, pdf: Option<&PdfContext>) -> String {
    let material = match pdf {
        Some(pdf) => format!(
            "The user is studying from a PDF document titled \"{}\". Here is the content of \
             their study material:\n\n\"{}\"\n\nUse this content to provide contextually \
             relevant help and answer questions about the material they're studying.\n\n",
            pdf.filename,
            pdf.clipped()
        ),
        None => String::new(),
    };
    format!(
        "You are a professional study assistant and academic coach. The user is currently in \
         a {} minute study session with {}% focus rate.\n\n\
         {material}\
         Your role is to:\n\
         - Provide clear, actionable study advice\n\
         - Help with academic questions and concepts about their study material\n\
         - Offer motivation and focus techniques\n\
         - Suggest effective learning strategies\n\
         - Answer questions about study methods, time management, and productivity\n\
         - Help explain concepts from their PDF content when relevant\n\n\
         Guidelines:\n\
         - Be professional and encouraging\n\
         - Keep responses concise (2-3 sentences max)\n\
         - Focus on practical, actionable advice\n\
         - Reference specific content from their PDF when relevant\n\
         - Avoid emojis, casual language, or excessive enthusiasm\n\
         - Use a supportive but academic tone\n\
         - If asked about focus issues, provide specific techniques like Pomodoro, active \
         recall, or spaced repetition",
        context.session_secs / 60,
        context.focus_rate(),
    )
}

/// Rule-based responder used whenever the collaborator is unavailable.
/// Keyword buckets first, then focus-rate-keyed encouragement.
pub fn contextual_answer(question: &str, context: &SessionContext) -> String {
    let q = question.to_lowercase();
    let focus_rate = context.focus_rate();
    let session_minutes = context.session_secs / 60;

    if q.contains("focus") || q.contains("concentrate") || q.contains("distracted") {
        if focus_rate < 70 {
            return "I notice your focus rate is lower today. Try the 2-minute rule: commit to \
                    just 2 minutes of focused work. Often, starting is the hardest part, and \
                    you'll naturally continue beyond 2 minutes."
                .to_string();
        }
        return "Great focus so far! To maintain it, try the 20-20-20 rule: every 20 minutes, \
                look at something 20 feet away for 20 seconds. This prevents eye strain and \
                mental fatigue."
            .to_string();
    }

    if q.contains("motivation") || q.contains("tired") || q.contains("energy") || q.contains("lazy")
    {
        return format!(
            "You've been working for {session_minutes} minutes - that's already progress! Try \
             a 30-second desk stretch or take 3 deep breaths. Small energy boosts can make a \
             big difference."
        );
    }

    if q.contains("study") || q.contains("learn") || q.contains("remember") || q.contains("memorize")
    {
        return "Try active recall: close your materials and write down everything you \
                remember, then check what you missed. This is more effective than re-reading. \
                What subject are you working on?"
            .to_string();
    }

    if q.contains("time") || q.contains("schedule") || q.contains("plan") {
        return "Time-blocking works well: assign specific time slots to specific tasks. \
                You're already doing great by using focused sessions! Consider planning your \
                next session's goals now."
            .to_string();
    }

    if q.contains("stress") || q.contains("anxious") || q.contains("overwhelmed") || q.contains("pressure")
    {
        return "Feeling overwhelmed is normal. Break your work into smaller, specific tasks. \
                Instead of 'study math,' try 'complete 5 algebra problems.' Small wins build \
                momentum and reduce stress."
            .to_string();
    }

    if focus_rate >= 80 {
        return "You're doing excellent work! Your focus rate is strong. Keep up this momentum \
                and remember to take breaks when needed."
            .to_string();
    }
    if focus_rate >= 60 {
        return "Good progress! If you're getting distracted, try the Pomodoro technique: 25 \
                minutes focused work, 5 minute break. What's your biggest distraction right \
                now?"
            .to_string();
    }

    "I'm here to help with your study session! I can assist with focus techniques, \
     motivation, study strategies, or just provide encouragement. What would be most helpful \
     right now?"
        .to_string()
}

/// A term definition: one-line summary plus supporting bullets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    pub summary: String,
    pub bullets: Vec<String>,
}

fn glossary(term: &str) -> Option<Definition> {
    let (summary, bullets): (&str, &[&str]) = match term {
        "photosynthesis" => (
            "The process by which plants convert light energy into chemical energy (glucose) \
             using carbon dioxide and water.",
            &[
                "Occurs in chloroplasts of plant cells",
                "Requires sunlight, CO2, and water",
                "Produces glucose and oxygen as byproducts",
                "Essential for most life on Earth",
            ],
        ),
        "mitochondria" => (
            "The powerhouse of the cell - organelles that produce ATP energy through cellular \
             respiration.",
            &[
                "Found in most eukaryotic cells",
                "Contains its own DNA",
                "Site of aerobic respiration",
                "Critical for cellular energy production",
            ],
        ),
        "algorithm" => (
            "A step-by-step procedure or set of rules designed to solve a problem or complete \
             a task.",
            &[
                "Must be finite and well-defined",
                "Takes input and produces output",
                "Used extensively in computer science",
                "Can be expressed in pseudocode or programming languages",
            ],
        ),
        "democracy" => (
            "A system of government where power is held by the people, either directly or \
             through elected representatives.",
            &[
                "Based on majority rule with minority rights",
                "Includes free and fair elections",
                "Emphasizes individual freedoms and rights",
                "Requires active citizen participation",
            ],
        ),
        "entropy" => (
            "A measure of disorder or randomness in a system, fundamental to thermodynamics \
             and information theory.",
            &[
                "Always increases in isolated systems",
                "Related to the second law of thermodynamics",
                "Measures energy unavailable for work",
                "Used in physics, chemistry, and information science",
            ],
        ),
        _ => return None,
    };
    Some(Definition {
        summary: summary.to_string(),
        bullets: bullets.iter().map(|b| b.to_string()).collect(),
    })
}

const GLOSSARY_TERMS: [&str; 5] = [
    "photosynthesis",
    "mitochondria",
    "algorithm",
    "democracy",
    "entropy",
];

/// Define a term selected from study material. Exact glossary match first,
/// then partial match, then heuristics keyed on the surrounding context.
pub fn define(term: &str, context: &str) -> Definition {
    let t = term.to_lowercase().trim().to_string();

    if let Some(definition) = glossary(&t) {
        return definition;
    }

    for key in GLOSSARY_TERMS {
        if t.contains(key) || key.contains(t.as_str()) {
            if let Some(definition) = glossary(key) {
                return definition;
            }
        }
    }

    if t.chars().count() < 3 {
        return Definition {
            summary: format!("\"{term}\" - Term too short for meaningful definition."),
            bullets: vec!["Try selecting a longer phrase or complete word".to_string()],
        };
    }

    let looks_technical =
        !t.is_empty() && t.chars().all(|c| c.is_ascii_lowercase()) && t.ends_with("tion");
    if context.contains("math") || context.contains("science") || looks_technical {
        return Definition {
            summary: format!(
                "\"{term}\" appears to be a technical or scientific term. This concept likely \
                 relates to {context}."
            ),
            bullets: vec![
                "Consider checking your textbook glossary".to_string(),
                "Look for related terms in the same chapter".to_string(),
                "Try breaking down the word into root parts".to_string(),
                "Ask your instructor for clarification".to_string(),
            ],
        };
    }

    Definition {
        summary: format!(
            "\"{term}\" - This term appears in your study material and may be important for \
             understanding the topic."
        ),
        bullets: vec![
            "Look for context clues in surrounding text".to_string(),
            "Check if it's defined elsewhere in the document".to_string(),
            "Consider how it relates to the main topic".to_string(),
            "Make a note to research this term further".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(session_secs: u64, focused_secs: u64) -> SessionContext {
        SessionContext {
            session_secs,
            focused_secs,
        }
    }

    #[test]
    fn focus_questions_branch_on_focus_rate() {
        let low = contextual_answer("I keep getting distracted", &ctx(600, 300));
        assert!(low.contains("2-minute rule"));

        let high = contextual_answer("how do I keep my focus up", &ctx(600, 540));
        assert!(high.contains("20-20-20"));
    }

    #[test]
    fn motivation_answer_mentions_session_minutes() {
        let answer = contextual_answer("I'm feeling tired", &ctx(900, 900));
        assert!(answer.contains("15 minutes"));
    }

    #[test]
    fn default_answer_is_keyed_on_focus_rate() {
        assert!(contextual_answer("hello", &ctx(100, 90)).contains("excellent work"));
        assert!(contextual_answer("hello", &ctx(100, 65)).contains("Pomodoro"));
        assert!(contextual_answer("hello", &ctx(100, 10)).contains("here to help"));
    }

    #[test]
    fn focus_rate_is_100_for_a_fresh_session() {
        assert_eq!(ctx(0, 0).focus_rate(), 100);
    }

    #[test]
    fn glossary_terms_resolve_exactly() {
        let definition = define("Entropy", "physics notes");
        assert!(definition.summary.contains("disorder"));
        assert_eq!(definition.bullets.len(), 4);
    }

    #[test]
    fn partial_matches_resolve_to_the_glossary() {
        let definition = define("sorting algorithms", "computer science");
        assert!(definition.summary.contains("step-by-step"));
    }

    #[test]
    fn short_terms_are_rejected() {
        let definition = define("ab", "");
        assert!(definition.summary.contains("too short"));
    }

    #[test]
    fn tion_suffix_is_treated_as_technical() {
        let definition = define("oxidation", "chemistry chapter");
        assert!(definition.summary.contains("technical or scientific term"));
    }

    #[test]
    fn unknown_terms_get_the_generic_study_tips() {
        let definition = define("zeitgeist", "history essay");
        assert!(definition.summary.contains("study material"));
        assert_eq!(definition.bullets.len(), 4);
    }

    #[test]
    fn coach_prompt_includes_clipped_material() {
        let pdf = PdfContext::new("notes.pdf", "x".repeat(5000));
        let prompt = coach_prompt(&ctx(1200, 1200), Some(&pdf));
        assert!(prompt.contains("notes.pdf"));
        // Clipped to the context budget, not the full 5000 chars.
        assert!(prompt.len() < 6000);
    }
}
