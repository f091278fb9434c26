//! Local exit-evaluation procedure.
//!
//! This is the full decision logic when the chat collaborator is bypassed,
//! and the fallback when it fails or returns something unparseable. It is a
//! pure function of its input -- same input, same decision, no state touched.

use serde::{Deserialize, Serialize};

/// Everything the exit decision depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub goal_minutes: u32,
    pub elapsed_secs: u64,
    pub violations: u32,
    pub reflection: String,
    pub checklist_complete: bool,
    /// Focused/elapsed as a whole percent; 100 when nothing has elapsed.
    pub focus_pct: u32,
}

/// Outcome of one evaluation attempt. Transient -- recomputed per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitEvaluation {
    pub allow: bool,
    pub feedback: String,
    pub roast: String,
}

/// Reflection quality: "bullets" are non-blank lines longer than 10
/// characters; words are whitespace-separated tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionStats {
    pub bullets: usize,
    pub words: usize,
}

pub fn reflection_stats(reflection: &str) -> ReflectionStats {
    let bullets = reflection
        .lines()
        .filter(|line| line.trim().chars().count() > 10)
        .count();
    let words = reflection.split_whitespace().count();
    ReflectionStats { bullets, words }
}

/// Percentage of the time goal reached. A zero-minute goal never comes out of
/// a validated session; treat it as met rather than dividing by zero.
fn time_goal_pct(input: &EvaluationInput) -> f64 {
    if input.goal_minutes == 0 {
        return 100.0;
    }
    input.elapsed_secs as f64 / 60.0 / input.goal_minutes as f64 * 100.0
}

pub fn evaluate_session(input: &EvaluationInput) -> ExitEvaluation {
    let time_goal_pct = time_goal_pct(input);
    let stats = reflection_stats(&input.reflection);
    let focus_pct = input.focus_pct;

    let time_goal_met = time_goal_pct >= 80.0;
    let good_reflection = stats.bullets >= 3 && stats.words >= 30;
    let excellent_focus = focus_pct >= 85;
    let decent_focus = focus_pct >= 60;
    let low_violations = input.violations <= 3;

    if time_goal_met && decent_focus && low_violations {
        return ExitEvaluation {
            allow: true,
            feedback: format!(
                "Excellent! You completed {}% of your time goal with {}% focus. Well done!",
                time_goal_pct.round(),
                focus_pct
            ),
            roast: String::new(),
        };
    }

    if good_reflection && decent_focus {
        return ExitEvaluation {
            allow: true,
            feedback: "Great reflection! You've clearly thought about your learning process. \
                       Your detailed insights show real engagement with the material."
                .to_string(),
            roast: String::new(),
        };
    }

    if input.checklist_complete && excellent_focus {
        return ExitEvaluation {
            allow: true,
            feedback: "Outstanding focus and task completion! You've demonstrated excellent \
                       self-discipline and productivity."
                .to_string(),
            roast: String::new(),
        };
    }

    // Deny: name what is missing, then one remedial message + roast by
    // priority.
    let mut issues = Vec::new();
    if time_goal_pct < 50.0 {
        issues.push(format!("only {}% of your time goal", time_goal_pct.round()));
    }
    if focus_pct < 60 {
        issues.push(format!("low focus rate ({focus_pct}%)"));
    }
    if input.violations > 5 {
        issues.push(format!("too many distractions ({} violations)", input.violations));
    }
    if stats.words < 20 {
        issues.push("insufficient reflection detail".to_string());
    }

    let mut feedback = if issues.is_empty() {
        String::new()
    } else {
        format!("Not quite ready to end: {}. ", issues.join(", "))
    };

    let roast;
    if stats.bullets < 3 {
        feedback.push_str(
            "Please provide at least 3 detailed points about what you learned or accomplished.",
        );
        roast = "Come on, give me more than that! What did you actually learn or struggle with?";
    } else if time_goal_pct < 30.0 {
        feedback.push_str("You've barely started! Try to reach at least 50% of your time goal.");
        roast = "That was quick! Are you sure you gave it your best effort?";
    } else if focus_pct < 40 {
        feedback.push_str("Your focus was quite scattered. What kept distracting you?");
        roast = "Looks like your attention was everywhere except your work!";
    } else {
        feedback.push_str("You're close! Just need a bit more effort or reflection.");
        roast = "Almost there! Don't give up when you're so close to the finish line.";
    }

    ExitEvaluation {
        allow: false,
        feedback,
        roast: roast.to_string(),
    }
}
