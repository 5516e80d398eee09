use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::Resource;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseNameError {
    #[error("Unknown role: {0}")]
    Role(String),

    #[error("Unknown panel: {0}")]
    Panel(String),
}

/// The closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Professor,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Professor, Role::Student];

    /// Wire form, as the API and token claims spell it
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Professor => "PROFESSOR",
            Role::Student => "STUDENT",
        }
    }

    /// Shown in place of a name when the token carries none
    pub fn generic_label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Professor => "Professor",
            Role::Student => "Student",
        }
    }

    pub fn initial(self) -> char {
        match self {
            Role::Admin => 'A',
            Role::Professor => 'P',
            Role::Student => 'S',
        }
    }

    /// Collection that accounts of this role are created in
    pub fn account_resource(self) -> Resource {
        match self {
            Role::Admin => Resource::Admins,
            Role::Professor => Resource::Professors,
            Role::Student => Resource::Students,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "PROFESSOR" => Ok(Role::Professor),
            "STUDENT" => Ok(Role::Student),
            _ => Err(ParseNameError::Role(s.to_string())),
        }
    }
}

/// Dashboard panels. Each role sees a fixed subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Overview,
    Lessons,
    CreateUser,
    Sections,
    Profile,
}

impl Panel {
    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Overview => "overview",
            Panel::Lessons => "lessons",
            Panel::CreateUser => "create-user",
            Panel::Sections => "sections",
            Panel::Profile => "profile",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Overview => "Overview",
            Panel::Lessons => "Lesson management",
            Panel::CreateUser => "Add user",
            Panel::Sections => "Sections",
            Panel::Profile => "Profile",
        }
    }

    pub fn available_for(role: Role) -> &'static [Panel] {
        match role {
            Role::Admin => &[Panel::Overview, Panel::Lessons, Panel::CreateUser, Panel::Profile],
            Role::Professor | Role::Student => &[Panel::Sections, Panel::Profile],
        }
    }

    pub fn default_for(role: Role) -> Panel {
        match role {
            Role::Admin => Panel::Overview,
            Role::Professor | Role::Student => Panel::Sections,
        }
    }

    pub fn is_available_to(self, role: Role) -> bool {
        Self::available_for(role).contains(&self)
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Panel {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Panel::Overview),
            "lessons" => Ok(Panel::Lessons),
            "create-user" => Ok(Panel::CreateUser),
            "sections" => Ok(Panel::Sections),
            "profile" => Ok(Panel::Profile),
            _ => Err(ParseNameError::Panel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str_case_insensitive() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("PROFESSOR".parse::<Role>(), Ok(Role::Professor));
        assert_eq!(" Student ".parse::<Role>(), Ok(Role::Student));
        assert_eq!(
            "janitor".parse::<Role>(),
            Err(ParseNameError::Role("janitor".to_string()))
        );
    }

    #[test]
    fn test_role_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Professor).unwrap(), "\"PROFESSOR\"");
        let role: Role = serde_json::from_str("\"STUDENT\"").unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_account_resource() {
        assert_eq!(Role::Admin.account_resource(), Resource::Admins);
        assert_eq!(Role::Professor.account_resource(), Resource::Professors);
        assert_eq!(Role::Student.account_resource(), Resource::Students);
    }

    #[test]
    fn test_panel_names_round_trip() {
        for role in Role::ALL {
            for panel in Panel::available_for(role) {
                assert_eq!(panel.as_str().parse::<Panel>(), Ok(*panel));
            }
        }
    }

    #[test]
    fn test_unknown_panel_is_an_error() {
        assert!("settings".parse::<Panel>().is_err());
        assert!("".parse::<Panel>().is_err());
    }

    #[test]
    fn test_panels_per_role() {
        assert!(Panel::CreateUser.is_available_to(Role::Admin));
        assert!(!Panel::CreateUser.is_available_to(Role::Student));
        assert!(Panel::Sections.is_available_to(Role::Professor));
        assert!(!Panel::Lessons.is_available_to(Role::Professor));
        assert_eq!(Panel::default_for(Role::Admin), Panel::Overview);
        assert_eq!(Panel::default_for(Role::Student), Panel::Sections);
        for role in Role::ALL {
            assert!(Panel::default_for(role).is_available_to(role));
            assert!(Panel::Profile.is_available_to(role));
        }
    }
}
