use serde::{Deserialize, Serialize};

use super::record::{string_or_number, Record, RecordId, Ref};
use crate::utils::format_timestamp;

/// Credit units when a form leaves the field empty
const DEFAULT_UNIT: u32 = 1;

/// Minimal lesson shape, as embedded in prerequisites and sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonSummary {
    #[serde(flatten)]
    pub ids: RecordId,
    pub title: Option<String>,
    pub unit: Option<u32>,
}

impl Record for LessonSummary {
    fn id(&self) -> Option<String> {
        self.ids.get()
    }

    fn label(&self) -> String {
        self.title.clone().unwrap_or_default()
    }
}

/// A user as embedded in other records (creator, section professor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(flatten)]
    pub ids: RecordId,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl UserSummary {
    /// "First Last" with blanks dropped, or `None` if both are empty.
    pub fn full_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

impl Record for UserSummary {
    fn id(&self) -> Option<String> {
        self.ids.get()
    }

    fn label(&self) -> String {
        self.full_name()
            .or_else(|| self.username.clone().filter(|u| !u.is_empty()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(flatten)]
    pub ids: RecordId,
    pub title: Option<String>,
    pub unit: Option<u32>,
    #[serde(rename = "type")]
    pub lesson_type: Option<String>,
    pub field: Option<String>,
    /// Registrar's course code, distinct from the record id
    #[serde(rename = "lessonId", default, deserialize_with = "string_or_number")]
    pub course_code: Option<String>,
    pub prerequisite: Option<Vec<Ref<LessonSummary>>>,
    #[serde(rename = "createdBy")]
    pub created_by: Option<Ref<UserSummary>>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
}

impl Lesson {
    pub fn prerequisites(&self) -> &[Ref<LessonSummary>] {
        self.prerequisite.as_deref().unwrap_or_default()
    }

    /// Titles of the populated prerequisites, comma separated.
    pub fn prerequisite_titles(&self) -> String {
        self.prerequisites()
            .iter()
            .filter_map(Ref::embedded)
            .filter_map(|p| p.title.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn prerequisite_ids(&self) -> Vec<String> {
        self.prerequisites().iter().filter_map(Ref::id).collect()
    }

    /// Who created the lesson: a name, a username, `user #<id>`, or `-`.
    pub fn creator_display(&self) -> String {
        let Some(creator) = &self.created_by else {
            return "-".to_string();
        };
        match creator {
            Ref::Id(id) if !id.is_empty() => format!("user #{}", id),
            Ref::Id(_) => "-".to_string(),
            Ref::Embedded(user) => {
                let label = user.label();
                if !label.is_empty() {
                    label
                } else if let Some(id) = user.id() {
                    format!("user #{}", id)
                } else {
                    "-".to_string()
                }
            }
        }
    }

    pub fn created_at_display(&self) -> String {
        self.created_at.as_deref().map(format_timestamp).unwrap_or_default()
    }
}

impl Record for Lesson {
    fn id(&self) -> Option<String> {
        self.ids.get()
    }

    fn label(&self) -> String {
        self.title.clone().unwrap_or_default()
    }
}

/// Create/update payload for a lesson.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLesson {
    pub title: String,
    pub unit: u32,
    #[serde(rename = "type")]
    pub lesson_type: String,
    pub field: String,
    #[serde(rename = "lessonId")]
    pub course_code: String,
    pub prerequisite: Vec<String>,
}

impl NewLesson {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            unit: DEFAULT_UNIT,
            lesson_type: String::new(),
            field: String::new(),
            course_code: String::new(),
            prerequisite: Vec::new(),
        }
    }

    /// Edit form pre-filled from an existing lesson.
    pub fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            title: lesson.title.clone().unwrap_or_default(),
            unit: lesson.unit.filter(|u| *u > 0).unwrap_or(DEFAULT_UNIT),
            lesson_type: lesson.lesson_type.clone().unwrap_or_default(),
            field: lesson.field.clone().unwrap_or_default(),
            course_code: lesson.course_code.clone().unwrap_or_default(),
            prerequisite: lesson.prerequisite_ids(),
        }
    }

    /// Trimmed copy, or `None` when the title is blank.
    pub fn normalized(&self) -> Option<Self> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            unit: if self.unit == 0 { DEFAULT_UNIT } else { self.unit },
            lesson_type: self.lesson_type.trim().to_string(),
            field: self.field.trim().to_string(),
            course_code: self.course_code.trim().to_string(),
            prerequisite: self.prerequisite.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Lesson {
        serde_json::from_value(json!({
            "_id": "65f0a1",
            "title": "Data Structures",
            "unit": 3,
            "type": "core",
            "field": "computer",
            "lessonId": 4011,
            "prerequisite": [
                {"_id": "65f0a0", "title": "Programming I"},
                "65f09f"
            ],
            "createdBy": {"_id": "u1", "firstName": "Sara", "lastName": "Karimi"},
            "createdAt": "2024-03-05T14:30:00"
        }))
        .unwrap()
    }

    #[test]
    fn test_decode_populated_lesson() {
        let lesson = sample();
        assert_eq!(lesson.id().as_deref(), Some("65f0a1"));
        assert_eq!(lesson.label(), "Data Structures");
        assert_eq!(lesson.course_code.as_deref(), Some("4011"));
        assert_eq!(lesson.prerequisite_titles(), "Programming I");
        assert_eq!(lesson.prerequisite_ids(), vec!["65f0a0", "65f09f"]);
        assert_eq!(lesson.creator_display(), "Sara Karimi");
        assert_eq!(lesson.created_at_display(), "2024-03-05 | 14:30");
    }

    #[test]
    fn test_decode_sparse_lesson() {
        let lesson: Lesson = serde_json::from_value(json!({"id": "l2", "prerequisite": null})).unwrap();
        assert_eq!(lesson.id().as_deref(), Some("l2"));
        assert_eq!(lesson.prerequisite_titles(), "");
        assert_eq!(lesson.creator_display(), "-");
        assert_eq!(lesson.created_at_display(), "");
    }

    #[test]
    fn test_creator_display_fallbacks() {
        let mut lesson = Lesson::default();

        lesson.created_by = Some(Ref::Id("abc".to_string()));
        assert_eq!(lesson.creator_display(), "user #abc");

        lesson.created_by = Some(Ref::Embedded(UserSummary {
            username: Some("admin1".to_string()),
            ..UserSummary::default()
        }));
        assert_eq!(lesson.creator_display(), "admin1");

        lesson.created_by = Some(Ref::Embedded(UserSummary {
            ids: RecordId {
                mongo_id: Some(json!("u9")),
                id: None,
            },
            ..UserSummary::default()
        }));
        assert_eq!(lesson.creator_display(), "user #u9");

        lesson.created_by = Some(Ref::Embedded(UserSummary::default()));
        assert_eq!(lesson.creator_display(), "-");
    }

    #[test]
    fn test_new_lesson_wire_format() {
        let mut payload = NewLesson::new("Compilers");
        payload.prerequisite = vec!["65f0a1".to_string()];
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "title": "Compilers",
                "unit": 1,
                "type": "",
                "field": "",
                "lessonId": "",
                "prerequisite": ["65f0a1"]
            })
        );
    }

    #[test]
    fn test_new_lesson_from_existing() {
        let payload = NewLesson::from_lesson(&sample());
        assert_eq!(payload.title, "Data Structures");
        assert_eq!(payload.unit, 3);
        assert_eq!(payload.course_code, "4011");
        assert_eq!(payload.prerequisite, vec!["65f0a0", "65f09f"]);
    }

    #[test]
    fn test_normalized_rejects_blank_title() {
        assert_eq!(NewLesson::new("   ").normalized(), None);

        let mut payload = NewLesson::new("  Networks ");
        payload.unit = 0;
        let normalized = payload.normalized().unwrap();
        assert_eq!(normalized.title, "Networks");
        assert_eq!(normalized.unit, 1);
    }
}
