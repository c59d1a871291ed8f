//! Interactive command loop.
//!
//! Reads one command per line, turns it into an [`Action`], dispatches it and
//! prints the result. The form persists between lines, so a student can be
//! built up field by field and then submitted.

use std::io::{BufRead, Write};

use tracing::error;

use crate::app::{Action, App, Outcome};
use crate::error::Result;
use crate::query::EnrollmentFilter;
use crate::record::Grade;
use crate::render;
use crate::storage::KeyValueStore;

const PROMPT: &str = "rollbook> ";

const HELP: &str = "\
Form:
  new                  start a new student (discards the draft)
  edit ID              load a student into the form
  name TEXT            set the name
  age NUMBER           set the age
  grade A|B|C|D|F      set the grade
  active | inactive    set the enrollment status
  submit               save the form
  cancel               leave edit mode and clear the form
  form                 show the form
Records:
  delete ID            delete a student
  search [TEXT]        search names (empty clears)
  filter all|active|inactive
  list                 show the visible students
  stats                show counts
Session:
  help                 show this text
  quit                 leave the shell
";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Blank,
    Act(Action),
    List,
    Form,
    Stats,
    Help,
    Quit,
    Invalid(String),
}

/// Run the loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if writing to `out` or reading from `input` fails.
/// Storage failures are reported on `out` and the loop continues.
pub fn run<S, R, W>(app: &mut App<S>, input: R, out: &mut W) -> Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    writeln!(out, "Type 'help' for commands.")?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for raw in input.lines() {
        let raw = raw?;
        match parse_line(&raw) {
            Line::Blank => {}
            Line::Quit => return Ok(()),
            Line::Help => write!(out, "{HELP}")?,
            Line::Invalid(message) => writeln!(out, "{message}")?,
            Line::List => write!(out, "{}", render::table(&app.visible()))?,
            Line::Form => write!(out, "{}", render::form(app.form()))?,
            Line::Stats => match app.store().stats() {
                Ok(stats) => write!(out, "{}", render::stats(&stats))?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            Line::Act(action) => match app.dispatch(action) {
                Ok(outcome) => report(out, &outcome)?,
                Err(e) => {
                    error!("Shell action failed: {}", e);
                    writeln!(out, "error: {e}")?;
                }
            },
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}

fn report<W: Write>(out: &mut W, outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::Unchanged => {}
        Outcome::Created(record) => writeln!(out, "Added {}", render::line(record))?,
        Outcome::Updated(record) => writeln!(out, "Updated {}", render::line(record))?,
        Outcome::Deleted(id) => writeln!(out, "Deleted #{id}")?,
        Outcome::NotFound(id) => writeln!(out, "No student with id {id}")?,
        Outcome::Rejected(errors) => {
            writeln!(out, "Not saved:")?;
            write!(out, "{}", render::form_errors(errors))?;
        }
    }
    Ok(())
}

fn parse_line(raw: &str) -> Line {
    let trimmed = raw.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    match word {
        "" => Line::Blank,
        "quit" | "exit" => Line::Quit,
        "help" | "?" => Line::Help,
        "list" | "ls" => Line::List,
        "form" => Line::Form,
        "stats" => Line::Stats,
        "new" | "cancel" => Line::Act(Action::CancelEdit),
        "submit" | "save" => Line::Act(Action::Submit),
        "active" => Line::Act(Action::SetEnrollment(true)),
        "inactive" => Line::Act(Action::SetEnrollment(false)),
        "name" => Line::Act(Action::SetName(rest.to_string())),
        "age" => Line::Act(Action::SetAgeInput(rest.to_string())),
        "search" => Line::Act(Action::SetSearch(rest.to_string())),
        "grade" => match rest.parse::<Grade>() {
            Ok(grade) => Line::Act(Action::SetGrade(grade)),
            Err(e) => Line::Invalid(e.to_string()),
        },
        "filter" => match rest.parse::<EnrollmentFilter>() {
            Ok(filter) => Line::Act(Action::SetFilter(filter)),
            Err(e) => Line::Invalid(e.to_string()),
        },
        "edit" => with_id(rest, Action::BeginEdit),
        "delete" | "rm" => with_id(rest, Action::Delete),
        other => Line::Invalid(format!("unknown command '{other}', try 'help'")),
    }
}

fn with_id(rest: &str, make: fn(i64) -> Action) -> Line {
    match rest.parse::<i64>() {
        Ok(id) => Line::Act(make(id)),
        Err(_) => Line::Invalid(format!("expected a student id, got '{rest}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::store::RecordStore;

    fn session(script: &str) -> (App<MemoryStore>, String) {
        let mut app = App::new(RecordStore::load(MemoryStore::new(), "students"));
        let mut out = Vec::new();
        run(&mut app, script.as_bytes(), &mut out).unwrap();
        (app, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_line_commands() {
        assert_eq!(parse_line("   "), Line::Blank);
        assert_eq!(parse_line("quit"), Line::Quit);
        assert_eq!(
            parse_line("name  Ann Lee "),
            Line::Act(Action::SetName("Ann Lee".to_string()))
        );
        assert_eq!(parse_line("grade b"), Line::Act(Action::SetGrade(Grade::B)));
        assert_eq!(parse_line("edit 12"), Line::Act(Action::BeginEdit(12)));
        assert_eq!(
            parse_line("filter inactive"),
            Line::Act(Action::SetFilter(EnrollmentFilter::Inactive))
        );
        assert_eq!(
            parse_line("search"),
            Line::Act(Action::SetSearch(String::new()))
        );
    }

    #[test]
    fn test_parse_line_invalid() {
        assert!(matches!(parse_line("grade Q"), Line::Invalid(_)));
        assert!(matches!(parse_line("filter some"), Line::Invalid(_)));
        assert!(matches!(parse_line("delete abc"), Line::Invalid(_)));
        assert!(matches!(parse_line("frobnicate"), Line::Invalid(_)));
    }

    #[test]
    fn test_shell_create_and_list() {
        let (app, out) = session("name Ann Lee\nage 20\ngrade B\nsubmit\nlist\nquit\n");

        assert_eq!(app.store().len(), 1);
        assert!(out.contains("Added #1 Ann Lee (age 20, grade B, Active)"));
        assert!(out.contains("Ann Lee"));
    }

    #[test]
    fn test_shell_rejected_submit() {
        let (app, out) = session("name  \nsubmit\n");

        assert!(app.store().is_empty());
        assert!(out.contains("Not saved:"));
        assert!(out.contains("name: Name is required"));
        assert!(out.contains("age: Age must be a positive number"));
    }

    #[test]
    fn test_shell_edit_flow() {
        let (app, out) =
            session("name Ann\nage 20\nsubmit\nedit 1\nage 21\nsubmit\nfilter inactive\nlist\n");

        assert_eq!(app.store().get(1).unwrap().age, 21);
        assert!(out.contains("Updated #1 Ann (age 21"));
        assert!(out.contains("No students found."));
    }

    #[test]
    fn test_shell_unknown_ids() {
        let (_, out) = session("edit 9\ndelete 9\n");
        assert_eq!(out.matches("No student with id 9").count(), 2);
    }

    #[test]
    fn test_shell_ends_at_eof() {
        let (_, out) = session("help\n");
        assert!(out.contains("submit"));
        assert!(out.ends_with('\n'));
    }
}
