//! Exit guard -- decides whether a termination request is approved.
//!
//! Primary path: hand the full session context to the chat collaborator and
//! expect an `{"allow", "feedback", "roast"}` JSON payload back. Any failure
//! along that path (transport, status, empty or non-JSON content) resolves to
//! the local heuristic, which is also the entire logic when the collaborator
//! is bypassed.

mod heuristics;

pub use heuristics::{evaluate_session, reflection_stats, EvaluationInput, ExitEvaluation, ReflectionStats};

use crate::error::LlmError;
use crate::llm::{self, ChatMessage, ChatParams, LlmClient};

const EVALUATE_PARAMS: ChatParams = ChatParams {
    max_completion_tokens: 300,
    temperature: 0.7,
    top_p: 0.8,
};

pub struct ExitGuard {
    llm: LlmClient,
}

impl ExitGuard {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Evaluate a termination request. Never fails: collaborator trouble
    /// degrades to [`evaluate_session`].
    pub async fn evaluate(&self, input: &EvaluationInput) -> ExitEvaluation {
        llm::with_fallback(self.evaluate_remote(input).await, || evaluate_session(input))
    }

    async fn evaluate_remote(&self, input: &EvaluationInput) -> Result<ExitEvaluation, LlmError> {
        let messages = [
            ChatMessage::system(evaluator_prompt(input)),
            ChatMessage::user(format!(
                "I want to end my study session. Here's my reflection: \"{}\"",
                input.reflection
            )),
        ];
        let content = self.llm.chat(&messages, EVALUATE_PARAMS).await?;
        parse_evaluation(&content)
    }
}

fn evaluator_prompt(input: &EvaluationInput) -> String {
    let elapsed_minutes = input.elapsed_secs / 60;
    let time_goal_pct = if input.goal_minutes == 0 {
        100
    } else {
        ((input.elapsed_secs as f64 / 60.0 / input.goal_minutes as f64) * 100.0).round() as i64
    };
    format!(
        "You are a professional study session evaluator. The user wants to end their study \
         session. Evaluate based on:\n\
         - Time goal: {goal} minutes (completed: {elapsed} minutes, {pct}%)\n\
         - Focus rate: {focus}%\n\
         - Distractions: {violations}\n\
         - Reflection quality: {reflection_len} characters\n\
         - Checklist completion: {checklist}\n\n\
         Decide if they should be allowed to end the session. If yes, give encouraging \
         feedback. If no, give constructive feedback and a motivating message.\n\n\
         Guidelines:\n\
         - Be professional and supportive\n\
         - Avoid emojis or casual language\n\
         - Focus on academic progress and learning\n\
         - Keep feedback constructive and actionable\n\n\
         Respond with JSON: {{\"allow\": boolean, \"feedback\": \"string\", \"roast\": \"string\"}}",
        goal = input.goal_minutes,
        elapsed = elapsed_minutes,
        pct = time_goal_pct,
        focus = input.focus_pct,
        violations = input.violations,
        reflection_len = input.reflection.chars().count(),
        checklist = if input.checklist_complete { "Yes" } else { "No" },
    )
}

/// Defensive parse of the model's reply. Anything that is not the expected
/// JSON object counts as malformed and sends the caller to the fallback.
fn parse_evaluation(content: &str) -> Result<ExitEvaluation, LlmError> {
    serde_json::from_str::<ExitEvaluation>(content.trim())
        .map_err(|e| LlmError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_payload_parses() {
        let eval = parse_evaluation(
            r#"{"allow": true, "feedback": "Good work.", "roast": ""}"#,
        )
        .unwrap();
        assert!(eval.allow);
        assert_eq!(eval.feedback, "Good work.");
    }

    #[test]
    fn prose_payload_is_malformed() {
        assert!(matches!(
            parse_evaluation("Sure, you can end the session."),
            Err(LlmError::MalformedPayload(_))
        ));
    }

    #[test]
    fn evaluator_prompt_embeds_the_session_context() {
        let prompt = evaluator_prompt(&EvaluationInput {
            goal_minutes: 60,
            elapsed_secs: 2880,
            violations: 2,
            reflection: "Finished the problem set".to_string(),
            checklist_complete: true,
            focus_pct: 90,
        });
        assert!(prompt.contains("Time goal: 60 minutes (completed: 48 minutes, 80%)"));
        assert!(prompt.contains("Focus rate: 90%"));
        assert!(prompt.contains("Distractions: 2"));
        assert!(prompt.contains("Checklist completion: Yes"));
    }
}
