use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Password is empty")]
    EmptyPassword,

    #[error("Password and confirmation do not match")]
    PasswordMismatch,
}

/// Account-creation payload. `faculty` and `education` only apply to
/// professors, `major` only to students.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub gender: Gender,
    pub national_id: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

impl NewUser {
    /// Trim text fields and keep only the role-specific fields that apply
    /// to `role`. Professors and students always send theirs, if empty.
    pub fn for_role(mut self, role: Role) -> Self {
        for field in [
            &mut self.first_name,
            &mut self.last_name,
            &mut self.username,
            &mut self.national_id,
            &mut self.phone,
            &mut self.address,
        ] {
            *field = field.trim().to_string();
        }
        let trimmed = |v: Option<String>| Some(v.unwrap_or_default().trim().to_string());
        match role {
            Role::Professor => {
                self.faculty = trimmed(self.faculty);
                self.education = trimmed(self.education);
                self.major = None;
            }
            Role::Student => {
                self.major = trimmed(self.major);
                self.faculty = None;
                self.education = None;
            }
            Role::Admin => {
                self.faculty = None;
                self.education = None;
                self.major = None;
            }
        }
        self
    }

    /// Local checks before the request is sent; the server validates again.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("username", &self.username),
            ("nationalId", &self.national_id),
            ("phone", &self.phone),
            ("address", &self.address),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::MissingField(*name));
        }
        if self.password.is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}
