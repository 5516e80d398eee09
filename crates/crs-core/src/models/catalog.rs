use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId, Ref};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    #[serde(flatten)]
    pub ids: RecordId,
    #[serde(alias = "roomNumber")]
    pub room_number: Option<String>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub capacity: Option<u32>,
}

impl Record for Classroom {
    fn id(&self) -> Option<String> {
        self.ids.get()
    }

    /// Room number, else name, else code.
    fn label(&self) -> String {
        [&self.room_number, &self.name, &self.code]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    #[serde(flatten)]
    pub ids: RecordId,
    pub name: Option<String>,
}

impl Record for Faculty {
    fn id(&self) -> Option<String> {
        self.ids.get()
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Major {
    #[serde(flatten)]
    pub ids: RecordId,
    pub name: Option<String>,
    pub faculty: Option<Ref<Faculty>>,
}

impl Record for Major {
    fn id(&self) -> Option<String> {
        self.ids.get()
    }

    /// `Name (Faculty)` when the faculty is populated.
    fn label(&self) -> String {
        let name = self.name.clone().unwrap_or_default();
        match self.faculty.as_ref().and_then(Ref::embedded).map(Faculty::label) {
            Some(faculty) if !faculty.is_empty() => format!("{} ({})", name, faculty),
            _ => name,
        }
    }
}
