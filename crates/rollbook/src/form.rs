//! The student form: draft state, validation and submit intents.
//!
//! The controller starts in create mode. Selecting a record for editing
//! switches to edit mode with the draft pre-filled and the record id held
//! aside. A successful submit yields a [`FormIntent`] for the caller to apply
//! to the record store, then resets the form; a failed submit records
//! per-field errors and changes nothing else.

use serde::Serialize;
use tracing::debug;

use crate::record::{Grade, StudentDraft, StudentRecord, ValidStudent};

/// Error text for a missing name.
pub const NAME_REQUIRED: &str = "Name is required";

/// Error text for a zero, negative or non-numeric age.
pub const AGE_NOT_POSITIVE: &str = "Age must be a positive number";

/// Which kind of submit the form will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    /// Submitting creates a new record.
    #[default]
    Create,
    /// Submitting updates the record with this id.
    Edit {
        /// Id of the record being edited.
        id: i64,
    },
}

/// Per-field validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    /// Error for the name field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Error for the age field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

impl FormErrors {
    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.name.as_deref(), self.age.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join("; "))
    }
}

/// What a successful submit asks the record store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    /// Append a new record with a fresh id.
    Create(ValidStudent),
    /// Replace the fields of an existing record.
    Update {
        /// Id of the record to update.
        id: i64,
        /// The new field values.
        student: ValidStudent,
    },
}

/// Form state machine.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    draft: StudentDraft,
    mode: FormMode,
    errors: FormErrors,
}

impl FormController {
    /// A fresh form in create mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current draft.
    #[must_use]
    pub fn draft(&self) -> &StudentDraft {
        &self.draft
    }

    /// The current mode.
    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Errors from the last failed submit, minus fields edited since.
    #[must_use]
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Id of the record under edit, if any.
    #[must_use]
    pub fn editing_id(&self) -> Option<i64> {
        match self.mode {
            FormMode::Edit { id } => Some(id),
            FormMode::Create => None,
        }
    }

    /// Enter edit mode for `record`, replacing the draft with its fields.
    pub fn begin_edit(&mut self, record: &StudentRecord) {
        debug!("Editing student {}", record.id);
        self.draft = StudentDraft::from(record);
        self.mode = FormMode::Edit { id: record.id };
        self.errors = FormErrors::default();
    }

    /// Set the name and clear the name error.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
        self.errors.name = None;
    }

    /// Set the age and clear the age error.
    pub fn set_age(&mut self, age: i64) {
        self.draft.age = age;
        self.errors.age = None;
    }

    /// Set the age from raw text input.
    ///
    /// Reads the leading integer and ignores anything after it, so `"20.5"`
    /// and `"21abc"` give 20 and 21. Input without leading digits becomes `0`,
    /// which validation rejects.
    pub fn set_age_input(&mut self, input: &str) {
        self.set_age(leading_integer(input));
    }

    /// Set the grade.
    pub fn set_grade(&mut self, grade: Grade) {
        self.draft.grade = grade;
    }

    /// Set the enrollment status.
    pub fn set_enrollment(&mut self, active: bool) {
        self.draft.enrollment_status = active;
    }

    /// Check the draft without touching the recorded errors.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when the name is blank or the age is not
    /// a positive number.
    pub fn validate(&self) -> Result<ValidStudent, FormErrors> {
        validate_draft(&self.draft)
    }

    /// Whether submit would currently be accepted.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Label for the submit action in the current mode.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Student",
            FormMode::Edit { .. } => "Update Student",
        }
    }

    /// Validate and, on success, turn the draft into an intent and reset.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when validation fails. The errors are
    /// also kept on the form; draft and mode are left as they were.
    pub fn submit(&mut self) -> Result<FormIntent, FormErrors> {
        match validate_draft(&self.draft) {
            Ok(student) => {
                let intent = match self.mode {
                    FormMode::Create => FormIntent::Create(student),
                    FormMode::Edit { id } => FormIntent::Update { id, student },
                };
                self.reset();
                Ok(intent)
            }
            Err(errors) => {
                debug!("Submit rejected: {}", errors);
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Leave edit mode and reset the draft without submitting.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.draft = StudentDraft::default();
        self.mode = FormMode::Create;
        self.errors = FormErrors::default();
    }
}

/// The optionally signed integer at the start of `input`, after leading
/// whitespace. Out-of-range values saturate.
fn leading_integer(input: &str) -> i64 {
    let input = input.trim_start();
    let (negative, rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return 0;
    }

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

/// Validate a draft.
///
/// # Errors
///
/// Returns the per-field errors when the trimmed name is empty or the age is
/// not a positive number that fits in a `u32`.
pub fn validate_draft(draft: &StudentDraft) -> Result<ValidStudent, FormErrors> {
    let mut errors = FormErrors::default();

    if draft.name.trim().is_empty() {
        errors.name = Some(NAME_REQUIRED.to_string());
    }

    let age = u32::try_from(draft.age).ok().filter(|age| *age > 0);
    if age.is_none() {
        errors.age = Some(AGE_NOT_POSITIVE.to_string());
    }

    match age {
        Some(age) if errors.is_empty() => Ok(ValidStudent {
            name: draft.name.clone(),
            age,
            grade: draft.grade,
            enrollment_status: draft.enrollment_status,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form(name: &str, age: i64) -> FormController {
        let mut form = FormController::new();
        form.set_name(name);
        form.set_age(age);
        form
    }

    fn sample_record() -> StudentRecord {
        StudentRecord {
            id: 9,
            name: "Ann".to_string(),
            age: 20,
            grade: Grade::B,
            enrollment_status: false,
        }
    }

    #[test]
    fn test_new_form_is_create_mode_with_defaults() {
        let form = FormController::new();
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.draft(), &StudentDraft::default());
        assert!(form.errors().is_empty());
        assert_eq!(form.submit_label(), "Add Student");
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut form = filled_form("", 20);
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED));
        assert!(errors.age.is_none());
    }

    #[test]
    fn test_whitespace_name_rejected() {
        let mut form = filled_form("   \t", 20);
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_non_positive_age_rejected() {
        for age in [0, -1, -100] {
            let mut form = filled_form("Ann", age);
            let errors = form.submit().unwrap_err();
            assert_eq!(errors.age.as_deref(), Some(AGE_NOT_POSITIVE));
            assert!(errors.name.is_none());
        }
    }

    #[test]
    fn test_age_out_of_range_rejected() {
        let mut form = filled_form("Ann", i64::from(u32::MAX) + 1);
        assert!(form.submit().unwrap_err().age.is_some());
    }

    #[test]
    fn test_non_numeric_age_input_rejected() {
        let mut form = filled_form("Ann", 20);
        form.set_age_input("twenty");
        assert_eq!(form.draft().age, 0);
        assert!(form.submit().unwrap_err().age.is_some());
    }

    #[test]
    fn test_age_input_reads_leading_integer() {
        let mut form = filled_form("Ann", 0);

        form.set_age_input("20.5");
        assert_eq!(form.draft().age, 20);
        assert!(form.validate().is_ok());

        form.set_age_input("21abc");
        assert_eq!(form.draft().age, 21);
        assert!(form.validate().is_ok());

        form.set_age_input("+7");
        assert_eq!(form.draft().age, 7);
    }

    #[test]
    fn test_age_input_negative_or_empty_rejected() {
        let mut form = filled_form("Ann", 20);

        form.set_age_input(" -3");
        assert_eq!(form.draft().age, -3);
        assert!(form.validate().unwrap_err().age.is_some());

        for input in ["", "-", ".5", "abc21"] {
            form.set_age_input(input);
            assert_eq!(form.draft().age, 0, "input {input:?}");
        }
        assert!(form.submit().unwrap_err().age.is_some());
    }

    #[test]
    fn test_age_input_huge_number_rejected() {
        let mut form = filled_form("Ann", 20);
        form.set_age_input("99999999999999999999999");
        assert_eq!(form.draft().age, i64::MAX);
        assert!(form.submit().unwrap_err().age.is_some());
    }

    #[test]
    fn test_age_input_parses_trimmed_integer() {
        let mut form = FormController::new();
        form.set_age_input(" 21 ");
        assert_eq!(form.draft().age, 21);
    }

    #[test]
    fn test_both_errors_reported() {
        let mut form = FormController::new();
        let errors = form.submit().unwrap_err();
        assert!(errors.name.is_some());
        assert!(errors.age.is_some());
        assert_eq!(
            errors.to_string(),
            "Name is required; Age must be a positive number"
        );
    }

    #[test]
    fn test_rejected_submit_keeps_state() {
        let record = sample_record();
        let mut form = FormController::new();
        form.begin_edit(&record);
        form.set_name("");

        assert!(form.submit().is_err());
        assert_eq!(form.mode(), FormMode::Edit { id: 9 });
        assert_eq!(form.draft().age, 20);
        assert!(form.errors().name.is_some());
    }

    #[test]
    fn test_errors_cleared_per_field() {
        let mut form = FormController::new();
        assert!(form.submit().is_err());

        form.set_name("Ann");
        assert!(form.errors().name.is_none());
        assert!(form.errors().age.is_some());

        form.set_age(3);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_grade_edit_keeps_errors() {
        let mut form = FormController::new();
        assert!(form.submit().is_err());
        form.set_grade(Grade::C);
        assert!(form.errors().name.is_some());
    }

    #[test]
    fn test_create_submit_yields_create_intent_and_resets() {
        let mut form = filled_form("Ann", 20);
        form.set_grade(Grade::B);
        form.set_enrollment(true);

        let intent = form.submit().unwrap();
        match intent {
            FormIntent::Create(student) => {
                assert_eq!(student.name(), "Ann");
                assert_eq!(student.age(), 20);
                assert_eq!(student.grade(), Grade::B);
                assert!(student.enrollment_status());
            }
            FormIntent::Update { .. } => panic!("expected create intent"),
        }
        assert_eq!(form.draft(), &StudentDraft::default());
        assert_eq!(form.mode(), FormMode::Create);
    }

    #[test]
    fn test_edit_prefills_and_submits_update() {
        let record = sample_record();
        let mut form = FormController::new();
        form.begin_edit(&record);

        assert_eq!(form.editing_id(), Some(9));
        assert_eq!(form.draft().name, "Ann");
        assert!(!form.draft().enrollment_status);
        assert_eq!(form.submit_label(), "Update Student");

        form.set_age(21);
        let intent = form.submit().unwrap();
        match intent {
            FormIntent::Update { id, student } => {
                assert_eq!(id, 9);
                assert_eq!(student.age(), 21);
                assert_eq!(student.grade(), Grade::B);
            }
            FormIntent::Create(_) => panic!("expected update intent"),
        }
        assert_eq!(form.mode(), FormMode::Create);
        assert!(form.editing_id().is_none());
    }

    #[test]
    fn test_cancel_resets() {
        let mut form = FormController::new();
        form.begin_edit(&sample_record());
        form.set_name("Changed");

        form.cancel();
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.draft(), &StudentDraft::default());
    }

    #[test]
    fn test_name_kept_untrimmed() {
        let mut form = filled_form("  Ann ", 20);
        match form.submit().unwrap() {
            FormIntent::Create(student) => assert_eq!(student.name(), "  Ann "),
            FormIntent::Update { .. } => panic!("expected create intent"),
        }
    }

    #[test]
    fn test_can_submit() {
        let mut form = FormController::new();
        assert!(!form.can_submit());
        form.set_name("Ann");
        assert!(!form.can_submit());
        form.set_age(1);
        assert!(form.can_submit());
    }
}
