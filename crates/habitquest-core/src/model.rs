//! Cached copies of backend-owned entities.
//!
//! Field names follow the backend's JSON so list responses deserialize
//! straight into these types.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub type EntityId = i64;

/// The backend stores difficulty as free text, so decoding ignores case and
/// maps anything unrecognised to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Unknown,
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match normalize(&raw).as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Unknown,
        })
    }
}

/// Categorical tag used to pick the feedback flavor. Decoded like
/// [`Difficulty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Studies,
    Exercise,
    Sleep,
    Nutrition,
    /// Any tag this client does not know about.
    Unknown,
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match normalize(&raw).as_str() {
            "studies" => Theme::Studies,
            "exercise" => Theme::Exercise,
            "sleep" => Theme::Sleep,
            "nutrition" => Theme::Nutrition,
            _ => Theme::Unknown,
        })
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Serialized as the backend's `is_completed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum CompletionState {
    #[default]
    Pending,
    Completed,
}

impl CompletionState {
    pub fn is_completed(self) -> bool {
        self == CompletionState::Completed
    }
}

impl From<bool> for CompletionState {
    fn from(done: bool) -> Self {
        if done {
            CompletionState::Completed
        } else {
            CompletionState::Pending
        }
    }
}

impl From<CompletionState> for bool {
    fn from(state: CompletionState) -> Self {
        state.is_completed()
    }
}

/// Which completable entity a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Habit,
    Task,
    Subtask,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Habit => "habit",
            EntityKind::Task => "task",
            EntityKind::Subtask => "subtask",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: EntityId,
    #[serde(rename = "habit_title")]
    pub title: String,
    #[serde(rename = "habit_notes", default)]
    pub notes: String,
    #[serde(rename = "habit_difficulty")]
    pub difficulty: Difficulty,
    #[serde(rename = "habit_theme", default)]
    pub theme: Option<Theme>,
    #[serde(rename = "habit_frequency", default)]
    pub frequency: String,
    #[serde(rename = "is_completed", default)]
    pub state: CompletionState,
    #[serde(default)]
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: EntityId,
    pub description: String,
    #[serde(rename = "is_completed", default)]
    pub state: CompletionState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    #[serde(rename = "task_title")]
    pub title: String,
    #[serde(rename = "task_notes", default)]
    pub notes: String,
    #[serde(rename = "task_difficulty")]
    pub difficulty: Difficulty,
    #[serde(rename = "task_theme", default)]
    pub theme: Option<Theme>,
    #[serde(rename = "is_completed", default)]
    pub state: CompletionState,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn subtask_mut(&mut self, id: EntityId) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn habit_decodes_backend_shape() {
        let json = r#"{
            "id": 7,
            "user": 1,
            "habit_title": "Read",
            "habit_notes": "",
            "habit_difficulty": "medium",
            "habit_theme": "studies",
            "habit_frequency": "daily",
            "xp_reward": 25,
            "is_completed": true,
            "current_streak": 4
        }"#;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.title, "Read");
        assert_eq!(habit.theme, Some(Theme::Studies));
        assert_eq!(habit.state, CompletionState::Completed);
        assert_eq!(habit.current_streak, 4);
    }

    #[test]
    fn unknown_theme_is_tolerated() {
        let json = r#"{"id": 1, "task_title": "x", "task_difficulty": "hard", "task_theme": "gardening"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.theme, Some(Theme::Unknown));
        assert_eq!(task.state, CompletionState::Pending);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn capitalised_difficulty_and_theme_decode() {
        let json = r#"[
            {"id": 1, "task_title": "a", "task_difficulty": "Easy", "task_theme": "Studies"},
            {"id": 2, "task_title": "b", "task_difficulty": " HARD ", "task_theme": "sleep"},
            {"id": 3, "task_title": "c", "task_difficulty": "legendary"}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        assert_eq!(tasks[0].difficulty, Difficulty::Easy);
        assert_eq!(tasks[0].theme, Some(Theme::Studies));
        assert_eq!(tasks[1].difficulty, Difficulty::Hard);
        assert_eq!(tasks[1].theme, Some(Theme::Sleep));
        assert_eq!(tasks[2].difficulty, Difficulty::Unknown);
        assert_eq!(tasks[2].theme, None);
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Difficulty::Medium).unwrap(), "medium");
    }

    #[test]
    fn completion_state_serializes_as_flag() {
        let sub = Subtask {
            id: 3,
            description: "outline".into(),
            state: CompletionState::Completed,
        };
        let value = serde_json::to_value(&sub).unwrap();
        assert_eq!(value["is_completed"], serde_json::Value::Bool(true));
    }
}
