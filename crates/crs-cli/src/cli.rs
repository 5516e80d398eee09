//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crs_core::{Resource, Role};

/// Course registration from the terminal
#[derive(Debug, Parser)]
#[command(name = "crs")]
#[command(about = "Command-line client for the course-registration API")]
#[command(version)]
pub struct Cli {
    /// API base URL, overriding config and CRS_API_BASE
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the access token
    Login {
        /// Defaults to the last username that signed in
        username: Option<String>,
        /// Keep the token after this session ends
        #[arg(short, long)]
        remember: bool,
    },
    /// Forget the stored token
    Logout,
    /// Show who the stored token belongs to
    Whoami,
    /// Trade the refresh token for a new access token
    Refresh,
    /// List a collection
    List {
        /// lessons, faculties, majors, classrooms, sections, students, professors, admins
        resource: Resource,
        /// Server-side search text
        #[arg(short, long)]
        search: Option<String>,
        /// Print the raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one record as JSON
    Get { resource: Resource, id: String },
    /// Delete one record
    Delete { resource: Resource, id: String },
    /// Create a record from a JSON file
    Create { resource: Resource, file: PathBuf },
    /// Replace a record with the contents of a JSON file
    Update {
        resource: Resource,
        id: String,
        file: PathBuf,
    },
    /// Create an account from a JSON file
    CreateUser { role: Role, file: PathBuf },
    /// Browse sections, filtered locally
    Sections {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Record counts for every collection
    Overview,
    /// Change the signed-in user's password
    ChangePassword,
    /// Panels a role can open
    Panels {
        /// Defaults to the signed-in user's role
        #[arg(long)]
        role: Option<Role>,
    },
}
