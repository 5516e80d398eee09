//! Data models for the course-registration API.
//!
//! Server payloads are loosely shaped: references arrive populated or as
//! bare ids, identifiers as `_id` or `id`, some fields under two spellings.
//! These schemas absorb all of that once, at decode time:
//!
//! - `Lesson`, `NewLesson`: lessons and their create/update payload
//! - `Section`, `Schedule`, `Weekday`: section offerings and meeting times
//! - `Classroom`, `Faculty`, `Major`: catalog records
//! - `NewUser`: account-creation payload
//! - `Role`, `Panel`: the closed sets of roles and dashboard panels

pub mod catalog;
pub mod lesson;
pub mod record;
pub mod role;
pub mod section;
pub mod user;

pub use catalog::{Classroom, Faculty, Major};
pub use lesson::{Lesson, LessonSummary, NewLesson, UserSummary};
pub use record::{Record, RecordId, Ref};
pub use role::{Panel, ParseNameError, Role};
pub use section::{Schedule, Section, Weekday};
pub use user::{Gender, NewUser, ValidationError};
