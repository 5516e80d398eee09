//! Plain-text rendering for command output.

use serde::Deserialize;
use serde_json::Value;

use crs_core::models::{Classroom, Faculty, Lesson, Major, Record, Section, UserSummary};
use crs_core::utils::truncate_string;
use crs_core::Resource;

/// Widest a cell may get before it is cut with an ellipsis
const MAX_CELL_WIDTH: usize = 40;

/// Shown for missing values
const EMPTY_CELL: &str = "-";

#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        let row = row
            .into_iter()
            .map(|cell| {
                if cell.trim().is_empty() {
                    EMPTY_CELL.to_string()
                } else {
                    truncate_string(&cell, MAX_CELL_WIDTH)
                }
            })
            .collect();
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let mut out = vec![line(self.headers.clone()), line(rules.iter().map(String::as_str).collect())];
        for row in &self.rows {
            out.push(line(row.iter().map(String::as_str).collect()));
        }
        out.join("\n")
    }
}

fn id_of(record: &impl Record) -> String {
    record.id().unwrap_or_default()
}

fn decode<'a, T: Deserialize<'a>>(value: &'a Value) -> Result<Vec<T>, serde_json::Error> {
    Vec::<T>::deserialize(value)
}

pub fn lessons_table(lessons: &[Lesson]) -> Table {
    let mut table = Table::new(&["ID", "Title", "Units", "Code", "Prerequisites", "Created by", "Created"]);
    for lesson in lessons {
        table.push(vec![
            id_of(lesson),
            lesson.label(),
            lesson.unit.map(|u| u.to_string()).unwrap_or_default(),
            lesson.course_code.clone().unwrap_or_default(),
            lesson.prerequisite_titles(),
            lesson.creator_display(),
            lesson.created_at_display(),
        ]);
    }
    table
}

pub fn sections_table(sections: &[&Section]) -> Table {
    let mut table = Table::new(&["ID", "Lesson", "Units", "Classroom", "Professor", "Seats", "Schedule"]);
    for section in sections {
        table.push(vec![
            id_of(*section),
            section.label(),
            section.lesson_unit().map(|u| u.to_string()).unwrap_or_default(),
            section.classroom_label().unwrap_or_default(),
            section.professor_name().unwrap_or_default(),
            section.seats_display(),
            section.schedule_summary(", "),
        ]);
    }
    table
}

fn labelled_table<T: Record>(records: &[T]) -> Table {
    let mut table = Table::new(&["ID", "Name"]);
    for record in records {
        table.push(vec![id_of(record), record.label()]);
    }
    table
}

fn users_table(users: &[UserSummary]) -> Table {
    let mut table = Table::new(&["ID", "Name", "Username"]);
    for user in users {
        table.push(vec![
            id_of(user),
            user.full_name().unwrap_or_default(),
            user.username.clone().unwrap_or_default(),
        ]);
    }
    table
}

/// Table for a listed collection. Fails when the body doesn't have the
/// shape the collection's schema expects.
pub fn collection_table(resource: Resource, value: &Value) -> Result<Table, serde_json::Error> {
    Ok(match resource {
        Resource::Lessons => lessons_table(&decode::<Lesson>(value)?),
        Resource::Sections => {
            let sections = decode::<Section>(value)?;
            sections_table(&sections.iter().collect::<Vec<_>>())
        }
        Resource::Classrooms => {
            let rooms = decode::<Classroom>(value)?;
            let mut table = Table::new(&["ID", "Room", "Capacity"]);
            for room in &rooms {
                table.push(vec![
                    id_of(room),
                    room.label(),
                    room.capacity.map(|c| c.to_string()).unwrap_or_default(),
                ]);
            }
            table
        }
        Resource::Faculties => labelled_table(&decode::<Faculty>(value)?),
        Resource::Majors => labelled_table(&decode::<Major>(value)?),
        Resource::Students | Resource::Professors | Resource::Admins => {
            users_table(&decode::<UserSummary>(value)?)
        }
    })
}

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
