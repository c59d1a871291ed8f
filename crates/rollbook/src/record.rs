//! Core record types for rollbook.
//!
//! This module defines the student record as it is stored, the editable
//! draft the form works on, and the validated shape the store accepts.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Letter grade from the fixed set A, B, C, D, F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Grade {
    /// Grade A.
    #[default]
    A,
    /// Grade B.
    B,
    /// Grade C.
    C,
    /// Grade D.
    D,
    /// Grade F.
    F,
}

impl Grade {
    /// All grades in display order.
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    /// The single-letter form of the grade.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a grade outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid grade '{0}' (expected one of A, B, C, D, F)")]
pub struct ParseGradeError(String);

impl FromStr for Grade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            "F" | "f" => Ok(Self::F),
            other => Err(ParseGradeError(other.to_string())),
        }
    }
}

/// A stored student record.
///
/// The serialized field names match the persisted format
/// (`id`, `name`, `age`, `grade`, `enrollmentStatus`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Unique identifier, assigned by the record store.
    pub id: i64,
    /// Student name, never empty.
    pub name: String,
    /// Age in years, always positive.
    pub age: u32,
    /// Current grade.
    pub grade: Grade,
    /// `true` when the student is actively enrolled.
    pub enrollment_status: bool,
}

impl StudentRecord {
    /// Build a record from a validated student and an assigned id.
    #[must_use]
    pub fn from_valid(id: i64, student: ValidStudent) -> Self {
        Self {
            id,
            name: student.name,
            age: student.age,
            grade: student.grade,
            enrollment_status: student.enrollment_status,
        }
    }

    /// Replace every field except the id.
    pub fn apply(&mut self, student: ValidStudent) {
        self.name = student.name;
        self.age = student.age;
        self.grade = student.grade;
        self.enrollment_status = student.enrollment_status;
    }

    /// Human-readable enrollment label.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        enrollment_label(self.enrollment_status)
    }
}

/// An in-progress record held by the form.
///
/// `age` is signed so that zero, negative and unparsable input can be held
/// until validation rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    /// Name as typed.
    pub name: String,
    /// Age as entered; `0` when the input was not a number.
    pub age: i64,
    /// Selected grade.
    pub grade: Grade,
    /// Enrollment checkbox.
    pub enrollment_status: bool,
}

impl Default for StudentDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 0,
            grade: Grade::A,
            enrollment_status: true,
        }
    }
}

impl StudentDraft {
    /// Human-readable enrollment label.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        enrollment_label(self.enrollment_status)
    }
}

impl From<&StudentRecord> for StudentDraft {
    fn from(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: i64::from(record.age),
            grade: record.grade,
            enrollment_status: record.enrollment_status,
        }
    }
}

fn enrollment_label(active: bool) -> &'static str {
    if active {
        "Active"
    } else {
        "Inactive"
    }
}

/// A draft that passed validation.
///
/// Only the form controller constructs these, so the record store can rely
/// on the name being non-empty and the age positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
    pub(crate) name: String,
    pub(crate) age: u32,
    pub(crate) grade: Grade,
    pub(crate) enrollment_status: bool,
}

impl ValidStudent {
    /// Student name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Student age.
    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Student grade.
    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Enrollment status.
    #[must_use]
    pub fn enrollment_status(&self) -> bool {
        self.enrollment_status
    }
}
