//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::query::EnrollmentFilter;
use crate::record::Grade;

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Student name
    #[arg(short, long)]
    pub name: String,

    /// Student age (must be a positive whole number)
    #[arg(short, long, allow_hyphen_values = true)]
    pub age: String,

    /// Grade (A, B, C, D or F)
    #[arg(short, long, default_value = "A")]
    pub grade: Grade,

    /// Record the student as not enrolled
    #[arg(long)]
    pub inactive: bool,
}

/// Edit command arguments.
///
/// Fields that are not given keep their current values.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Id of the student to edit
    pub id: i64,

    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New age
    #[arg(short, long, allow_hyphen_values = true)]
    pub age: Option<String>,

    /// New grade
    #[arg(short, long)]
    pub grade: Option<Grade>,

    /// Mark the student as enrolled
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Mark the student as not enrolled
    #[arg(long)]
    pub inactive: bool,
}

impl EditCommand {
    /// The requested enrollment change, if any.
    #[must_use]
    pub fn enrollment(&self) -> Option<bool> {
        match (self.active, self.inactive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the student to delete
    pub id: i64,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the student to show
    pub id: i64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show students whose name contains this text (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter by enrollment status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Enrollment status argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Every student
    All,
    /// Enrolled students
    Active,
    /// Students not enrolled
    Inactive,
}

impl From<StatusArg> for EnrollmentFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Active => Self::Active,
            StatusArg::Inactive => Self::Inactive,
        }
    }
}

/// Output format for record listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per student
    Plain,
    /// Aligned table
    #[default]
    Table,
    /// JSON array
    Json,
}
