//! Application state and the action reducer.
//!
//! [`App`] owns everything the presentation layer reads: the record store,
//! the form and the current query. Every user intent is an [`Action`] passed
//! to [`App::dispatch`], which runs it to completion (including the storage
//! write) before returning.

use tracing::debug;

use crate::error::Result;
use crate::form::{FormController, FormErrors, FormIntent};
use crate::query::{EnrollmentFilter, Query};
use crate::record::{Grade, StudentRecord};
use crate::storage::KeyValueStore;
use crate::store::RecordStore;

/// A user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Type into the name field.
    SetName(String),
    /// Set the age field to a number.
    SetAge(i64),
    /// Type raw text into the age field.
    SetAgeInput(String),
    /// Pick a grade.
    SetGrade(Grade),
    /// Toggle the enrollment checkbox.
    SetEnrollment(bool),
    /// Submit the form.
    Submit,
    /// Select a record for editing.
    BeginEdit(i64),
    /// Leave edit mode without saving.
    CancelEdit,
    /// Delete a record.
    Delete(i64),
    /// Change the search text.
    SetSearch(String),
    /// Change the enrollment filter.
    SetFilter(EnrollmentFilter),
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Form or query state changed; the collection did not.
    Unchanged,
    /// A new record was stored.
    Created(StudentRecord),
    /// An existing record was replaced.
    Updated(StudentRecord),
    /// A record was removed.
    Deleted(i64),
    /// The form rejected the submit.
    Rejected(FormErrors),
    /// The action named an id that does not exist.
    NotFound(i64),
}

/// Owned application state.
#[derive(Debug)]
pub struct App<S> {
    store: RecordStore<S>,
    form: FormController,
    query: Query,
}

impl<S: KeyValueStore> App<S> {
    /// Wrap a loaded store with a fresh form and an empty query.
    #[must_use]
    pub fn new(store: RecordStore<S>) -> Self {
        Self {
            store,
            form: FormController::new(),
            query: Query::default(),
        }
    }

    /// Start from a specific query instead of the default.
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// The record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    /// The form.
    #[must_use]
    pub fn form(&self) -> &FormController {
        &self.form
    }

    /// The current query.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Records visible under the current query.
    #[must_use]
    pub fn visible(&self) -> Vec<&StudentRecord> {
        self.query.apply(self.store.list())
    }

    /// Apply one action.
    ///
    /// # Errors
    ///
    /// Returns an error only when the record store cannot persist a change.
    /// Validation failures and unknown ids are reported as [`Outcome`]s.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        debug!("Dispatching {:?}", action);
        match action {
            Action::SetName(name) => self.form.set_name(name),
            Action::SetAge(age) => self.form.set_age(age),
            Action::SetAgeInput(input) => self.form.set_age_input(&input),
            Action::SetGrade(grade) => self.form.set_grade(grade),
            Action::SetEnrollment(active) => self.form.set_enrollment(active),
            Action::SetSearch(search) => self.query.search = search,
            Action::SetFilter(filter) => self.query.filter = filter,
            Action::CancelEdit => self.form.cancel(),
            Action::Submit => return self.submit(),
            Action::BeginEdit(id) => {
                let Some(record) = self.store.get(id) else {
                    return Ok(Outcome::NotFound(id));
                };
                self.form.begin_edit(record);
            }
            Action::Delete(id) => return self.delete(id),
        }
        Ok(Outcome::Unchanged)
    }

    fn submit(&mut self) -> Result<Outcome> {
        let intent = match self.form.submit() {
            Ok(intent) => intent,
            Err(errors) => return Ok(Outcome::Rejected(errors)),
        };

        match intent {
            FormIntent::Create(student) => Ok(Outcome::Created(self.store.add(student)?)),
            FormIntent::Update { id, student } => {
                if !self.store.update(id, student)? {
                    return Ok(Outcome::NotFound(id));
                }
                Ok(self
                    .store
                    .get(id)
                    .cloned()
                    .map_or(Outcome::NotFound(id), Outcome::Updated))
            }
        }
    }

    fn delete(&mut self, id: i64) -> Result<Outcome> {
        if !self.store.remove(id)? {
            return Ok(Outcome::NotFound(id));
        }
        if self.form.editing_id() == Some(id) {
            self.form.cancel();
        }
        Ok(Outcome::Deleted(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormMode;
    use crate::storage::MemoryStore;

    fn new_app() -> App<MemoryStore> {
        App::new(RecordStore::load(MemoryStore::new(), "students"))
    }

    fn create(app: &mut App<MemoryStore>, name: &str, age: i64, active: bool) -> StudentRecord {
        app.dispatch(Action::SetName(name.to_string())).unwrap();
        app.dispatch(Action::SetAge(age)).unwrap();
        app.dispatch(Action::SetEnrollment(active)).unwrap();
        match app.dispatch(Action::Submit).unwrap() {
            Outcome::Created(record) => record,
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_creates_record() {
        let mut app = new_app();
        let record = create(&mut app, "Ann", 20, true);

        assert_eq!(app.store().len(), 1);
        assert_eq!(app.visible(), vec![&record]);
        assert_eq!(app.form().mode(), FormMode::Create);
    }

    #[test]
    fn test_rejected_submit_leaves_store_alone() {
        let mut app = new_app();
        app.dispatch(Action::SetName("   ".to_string())).unwrap();

        let outcome = app.dispatch(Action::Submit).unwrap();
        match outcome {
            Outcome::Rejected(errors) => {
                assert!(errors.name.is_some());
                assert!(errors.age.is_some());
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert!(app.store().is_empty());
        assert!(app.form().errors().name.is_some());
    }

    #[test]
    fn test_edit_unknown_id() {
        let mut app = new_app();
        assert_eq!(
            app.dispatch(Action::BeginEdit(77)).unwrap(),
            Outcome::NotFound(77)
        );
        assert_eq!(app.form().mode(), FormMode::Create);
    }

    #[test]
    fn test_edit_then_cancel_does_not_mutate() {
        let mut app = new_app();
        let record = create(&mut app, "Ann", 20, true);

        app.dispatch(Action::BeginEdit(record.id)).unwrap();
        app.dispatch(Action::SetName("Changed".to_string())).unwrap();
        app.dispatch(Action::CancelEdit).unwrap();

        assert_eq!(app.store().get(record.id), Some(&record));
        assert_eq!(app.form().mode(), FormMode::Create);
        assert_eq!(app.form().draft().name, "");
    }

    #[test]
    fn test_deleting_edited_record_cancels_edit() {
        let mut app = new_app();
        let record = create(&mut app, "Ann", 20, true);

        app.dispatch(Action::BeginEdit(record.id)).unwrap();
        assert_eq!(
            app.dispatch(Action::Delete(record.id)).unwrap(),
            Outcome::Deleted(record.id)
        );
        assert_eq!(app.form().mode(), FormMode::Create);
    }

    #[test]
    fn test_deleting_other_record_keeps_edit() {
        let mut app = new_app();
        let ann = create(&mut app, "Ann", 20, true);
        let bob = create(&mut app, "Bob", 30, false);

        app.dispatch(Action::BeginEdit(ann.id)).unwrap();
        app.dispatch(Action::Delete(bob.id)).unwrap();
        assert_eq!(app.form().editing_id(), Some(ann.id));
    }

    #[test]
    fn test_delete_unknown_id() {
        let mut app = new_app();
        create(&mut app, "Ann", 20, true);
        assert_eq!(
            app.dispatch(Action::Delete(404)).unwrap(),
            Outcome::NotFound(404)
        );
        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn test_search_and_filter_actions() {
        let mut app = new_app();
        create(&mut app, "Ann", 20, true);
        create(&mut app, "Bob", 30, false);

        app.dispatch(Action::SetSearch("AN".to_string())).unwrap();
        assert_eq!(app.visible().len(), 1);

        app.dispatch(Action::SetSearch(String::new())).unwrap();
        app.dispatch(Action::SetFilter(EnrollmentFilter::Inactive))
            .unwrap();
        let visible = app.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Bob");
    }

    #[test]
    fn test_age_input_action() {
        let mut app = new_app();
        app.dispatch(Action::SetName("Ann".to_string())).unwrap();
        app.dispatch(Action::SetAgeInput("abc".to_string())).unwrap();
        assert!(matches!(
            app.dispatch(Action::Submit).unwrap(),
            Outcome::Rejected(_)
        ));

        app.dispatch(Action::SetAgeInput("19".to_string())).unwrap();
        app.dispatch(Action::SetGrade(Grade::D)).unwrap();
        match app.dispatch(Action::Submit).unwrap() {
            Outcome::Created(record) => {
                assert_eq!(record.age, 19);
                assert_eq!(record.grade, Grade::D);
            }
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[test]
    fn test_with_query() {
        let app = new_app().with_query(Query::new("x", EnrollmentFilter::Active));
        assert_eq!(app.query().search, "x");
        assert_eq!(app.query().filter, EnrollmentFilter::Active);
    }
}
