use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::Classroom;
use super::lesson::{LessonSummary, UserSummary};
use super::record::{Record, RecordId, Ref};

/// Day a schedule entry falls on. Matched case-insensitively; a value the
/// API sends outside the known set is kept as sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Weekday {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Other(String),
}

impl Weekday {
    /// Display name; an unrecognised day shows its raw text.
    pub fn name(&self) -> &str {
        match self {
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Other(raw) => raw.trim(),
        }
    }
}

impl From<String> for Weekday {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "SATURDAY" => Weekday::Saturday,
            "SUNDAY" => Weekday::Sunday,
            "MONDAY" => Weekday::Monday,
            "TUESDAY" => Weekday::Tuesday,
            "WEDNESDAY" => Weekday::Wednesday,
            "THURSDAY" => Weekday::Thursday,
            "FRIDAY" => Weekday::Friday,
            _ => Weekday::Other(value),
        }
    }
}

impl From<Weekday> for String {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Other(raw) => raw,
            known => known.name().to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One weekly meeting of a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(alias = "dayOfWeek")]
    pub day_of_week: Option<Weekday>,
    #[serde(alias = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", alias = "end_time")]
    pub end_time: Option<String>,
}

impl Schedule {
    /// `Monday 08:00-10:00`, or `None` when the entry is empty.
    pub fn display(&self) -> Option<String> {
        let day = self.day_of_week.as_ref().map(Weekday::name).unwrap_or_default();
        let start = self.start_time.as_deref().unwrap_or_default();
        let end = self.end_time.as_deref().unwrap_or_default();
        if day.is_empty() && start.is_empty() && end.is_empty() {
            return None;
        }
        Some(format!("{} {}-{}", day, start, end).trim().to_string())
    }
}

/// A scheduled offering of a lesson.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(flatten)]
    pub ids: RecordId,
    pub lesson: Option<Ref<LessonSummary>>,
    pub classroom: Option<Ref<Classroom>>,
    pub professor: Option<Ref<UserSummary>>,
    pub capacity: Option<u32>,
    pub students: Option<Vec<Value>>,
    pub schedules: Option<Vec<Schedule>>,
}

impl Section {
    pub fn lesson_title(&self) -> Option<&str> {
        self.lesson
            .as_ref()
            .and_then(Ref::embedded)
            .and_then(|l| l.title.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn lesson_unit(&self) -> Option<u32> {
        self.lesson.as_ref().and_then(Ref::embedded).and_then(|l| l.unit)
    }

    pub fn classroom_label(&self) -> Option<String> {
        self.classroom
            .as_ref()
            .and_then(Ref::embedded)
            .map(Classroom::label)
            .filter(|l| !l.is_empty())
    }

    pub fn professor_name(&self) -> Option<String> {
        self.professor
            .as_ref()
            .and_then(Ref::embedded)
            .and_then(UserSummary::full_name)
    }

    pub fn enrolled(&self) -> usize {
        self.students.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// `<enrolled> / <capacity>`, with `-` for an unknown capacity.
    pub fn seats_display(&self) -> String {
        match self.capacity {
            Some(capacity) => format!("{} / {}", self.enrolled(), capacity),
            None => format!("{} / -", self.enrolled()),
        }
    }

    /// Non-empty schedule entries joined with `separator`.
    pub fn schedule_summary(&self, separator: &str) -> String {
        self.schedules
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(Schedule::display)
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Case-insensitive match of `query` against the lesson title, the
    /// classroom, the professor and the schedule. A blank query matches.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let haystack = [
            self.lesson_title().unwrap_or_default().to_string(),
            self.classroom_label().unwrap_or_default(),
            self.professor_name().unwrap_or_default(),
            self.schedule_summary(" "),
        ]
        .join(" ")
        .to_lowercase();
        haystack.contains(&query)
    }
}

impl Record for Section {
    fn id(&self) -> Option<String> {
        self.ids.get()
    }

    fn label(&self) -> String {
        self.lesson_title().unwrap_or("-").to_string()
    }
}
