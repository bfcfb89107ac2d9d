use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const UNKNOWN_SUBJECT: &str = "<unknown>";
pub const UNKNOWN_GRADE: &str = "? kl.";

/// Lessons grouped per day, exactly as the dashboard returns them.
pub type Timetable = Vec<Vec<LessonRecord>>;

/// One scheduled lesson from the dashboard's timetable table. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LessonRecord {
    #[serde(default)]
    pub uuid: Option<String>,
    /// Naive local time in `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub subject: Option<Named>,
    #[serde(default)]
    pub grade: Option<Named>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl LessonRecord {
    pub fn subject_name(&self) -> &str {
        self.subject
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or(UNKNOWN_SUBJECT)
    }

    pub fn grade_name(&self) -> &str {
        self.grade
            .as_ref()
            .and_then(|g| g.name.as_deref())
            .unwrap_or(UNKNOWN_GRADE)
    }

    pub fn first_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.first_name.as_deref())
            .unwrap_or("")
    }

    pub fn last_name(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.last_name.as_deref())
            .unwrap_or("")
    }

    /// `"{subject} {grade} - {first_name} {last_initial}"`. The trailing space stays when
    /// there is no last name.
    pub fn title(&self) -> String {
        let last_initial = self
            .last_name()
            .chars()
            .next()
            .map(|c| format!("{c}."))
            .unwrap_or_default();
        format!(
            "{} {} - {} {}",
            self.subject_name(),
            self.grade_name(),
            self.first_name(),
            last_initial
        )
    }
}

/// A one-hour block in the published calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} {}",
            self.start.format("%Y-%m-%d"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.summary
        )
    }
}

/// The whole published calendar. Metadata is fixed; only the events vary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    pub events: Vec<CalendarEvent>,
}

impl Calendar {
    pub const PRODID: &'static str = "-//Digi1 Lessons//EN";
    pub const VERSION: &'static str = "2.0";
    pub const CALSCALE: &'static str = "GREGORIAN";
    pub const METHOD: &'static str = "PUBLISH";
    pub const NAME: &'static str = "Digi1 Lessons";

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(last_name: &str) -> LessonRecord {
        LessonRecord {
            uuid: Some("abc".to_string()),
            published_at: Some("2024-03-10 14:00:00".to_string()),
            subject: Some(Named {
                name: Some("Math".to_string()),
            }),
            grade: Some(Named {
                name: Some("5 kl.".to_string()),
            }),
            user: Some(User {
                first_name: Some("Jane".to_string()),
                last_name: Some(last_name.to_string()),
            }),
        }
    }

    #[test]
    fn title_uses_last_initial() {
        assert_eq!(record("Doe").title(), "Math 5 kl. - Jane D.");
    }

    #[test]
    fn title_keeps_trailing_space_without_last_name() {
        assert_eq!(record("").title(), "Math 5 kl. - Jane ");
    }

    #[test]
    fn title_initial_is_a_whole_character() {
        assert_eq!(record("Šimkus").title(), "Math 5 kl. - Jane Š.");
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        assert_eq!(LessonRecord::default().title(), "<unknown> ? kl. -  ");
    }

    #[test]
    fn deserializes_nulls_and_missing_keys() {
        let json = r#"{"uuid": "u1", "published_at": null, "subject": {"name": null}, "grade": null}"#;
        let record: LessonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.uuid.as_deref(), Some("u1"));
        assert!(record.published_at.is_none());
        assert_eq!(record.subject_name(), UNKNOWN_SUBJECT);
        assert_eq!(record.grade_name(), UNKNOWN_GRADE);
        assert_eq!(record.first_name(), "");
    }
}
