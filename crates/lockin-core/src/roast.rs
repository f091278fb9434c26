//! Roast generator -- short motivational messages on focus loss.
//!
//! The message fetch is asynchronous and must never block the violation
//! bookkeeping: the monitor flips state synchronously, then the driver asks
//! for a message. Collaborator failure degrades to a uniform pick from the
//! fixed fallback list.

use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::LlmError;
use crate::llm::{self, ChatMessage, ChatParams, LlmClient};

/// Canned messages used whenever the collaborator is unreachable.
pub const FALLBACK_ROASTS: [&str; 5] = [
    "Really? Already? Your attention span is shorter than a goldfish's memory!",
    "Come on! You couldn't even focus for 2 seconds? Time to get serious!",
    "Distraction detected! Your future self will thank you for staying focused.",
    "Focus slipping? Remember why you started this session!",
    "That was quick! Ready to dive back into deep work?",
];

const ROAST_PARAMS: ChatParams = ChatParams {
    max_completion_tokens: 100,
    temperature: 0.8,
    top_p: 0.9,
};

/// Session stats the message is seeded with.
#[derive(Debug, Clone, Copy)]
pub struct RoastContext {
    pub elapsed_secs: u64,
    pub focus_pct: u32,
    pub violations: u32,
}

pub struct RoastGenerator {
    llm: LlmClient,
    in_flight: AtomicBool,
}

impl RoastGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fetch a message for one focus-loss event. Returns None when a request
    /// for the same event is already in flight (idempotent trigger).
    pub async fn roast_debounced(&self, context: &RoastContext) -> Option<String> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        let message = self.roast(context).await;
        self.in_flight.store(false, Ordering::SeqCst);
        Some(message)
    }

    /// Fetch a message, falling back to a canned one. Never fails.
    pub async fn roast(&self, context: &RoastContext) -> String {
        llm::with_fallback(self.roast_remote(context).await, fallback_roast)
    }

    async fn roast_remote(&self, context: &RoastContext) -> Result<String, LlmError> {
        let messages = [
            ChatMessage::system(roast_prompt(context)),
            ChatMessage::user("I just lost focus and got distracted during my study session."),
        ];
        self.llm.chat(&messages, ROAST_PARAMS).await
    }
}

fn roast_prompt(context: &RoastContext) -> String {
    format!(
        "You are a motivational study coach. The user just lost focus during their study \
         session. They've been studying for {} minutes with {}% focus rate and {} \
         distractions.\n\n\
         Give them a short, motivating message to get them back on track. Be encouraging \
         but firm. Keep it under 100 characters and avoid emojis. Focus on motivation and \
         getting back to work.",
        context.elapsed_secs / 60,
        context.focus_pct,
        context.violations,
    )
}

/// Uniform pick from [`FALLBACK_ROASTS`].
pub fn fallback_roast() -> String {
    let mut rng = rand::thread_rng();
    FALLBACK_ROASTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(FALLBACK_ROASTS[0])
        .to_string()
}
