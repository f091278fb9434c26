//! Session configuration -- immutable once a session starts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// One checklist entry set up at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            completed: false,
        }
    }
}

/// Immutable configuration captured when the session starts.
///
/// Constructed through [`SessionConfig::new`], which rejects invalid setup
/// input (empty goal, zero duration) so no session is ever created from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub goal: String,
    pub target_minutes: u32,
    pub checklist: Vec<ChecklistItem>,
}

impl SessionConfig {
    pub fn new(
        goal: impl Into<String>,
        target_minutes: u32,
        checklist: Vec<ChecklistItem>,
    ) -> Result<Self, ValidationError> {
        let goal = goal.into();
        if goal.trim().is_empty() {
            return Err(ValidationError::invalid("goal", "goal text must not be empty"));
        }
        if target_minutes == 0 {
            return Err(ValidationError::invalid(
                "target_minutes",
                "target duration must be a positive number of minutes",
            ));
        }
        Ok(Self {
            goal,
            target_minutes,
            checklist,
        })
    }

    /// True when every checklist item is done. An empty checklist never
    /// counts as complete -- the checklist-based exit rule requires that the
    /// user actually planned tasks.
    pub fn checklist_complete(&self) -> bool {
        !self.checklist.is_empty() && self.checklist.iter().all(|item| item.completed)
    }

    pub fn set_item_completed(&mut self, id: &str, completed: bool) -> bool {
        match self.checklist.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.completed = completed;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_goal_is_rejected() {
        assert!(SessionConfig::new("", 25, vec![]).is_err());
        assert!(SessionConfig::new("   ", 25, vec![]).is_err());
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(SessionConfig::new("read chapter 4", 0, vec![]).is_err());
    }

    #[test]
    fn valid_setup_is_accepted() {
        let config = SessionConfig::new("read chapter 4", 25, vec![]).unwrap();
        assert_eq!(config.target_minutes, 25);
        assert!(config.checklist.is_empty());
    }

    #[test]
    fn empty_checklist_is_never_complete() {
        let config = SessionConfig::new("read", 25, vec![]).unwrap();
        assert!(!config.checklist_complete());
    }

    #[test]
    fn checklist_complete_requires_every_item() {
        let mut config = SessionConfig::new(
            "read",
            25,
            vec![ChecklistItem::new("notes"), ChecklistItem::new("exercises")],
        )
        .unwrap();
        assert!(!config.checklist_complete());

        let ids: Vec<String> = config.checklist.iter().map(|i| i.id.clone()).collect();
        assert!(config.set_item_completed(&ids[0], true));
        assert!(!config.checklist_complete());
        assert!(config.set_item_completed(&ids[1], true));
        assert!(config.checklist_complete());
    }
}
