//! `rollbook` - CLI for managing student records
//!
//! Each subcommand loads the record collection, applies one change or query,
//! and exits. `rollbook shell` keeps the collection and form open across
//! many commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use rollbook::cli::{
    AddCommand, Cli, Command, ConfigCommand, EditCommand, ListCommand, OutputFormat,
};
use rollbook::{
    init_logging, render, shell, Action, App, Config, Error, Outcome, Query, RecordStore,
    SqliteStore,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Add(cmd) => handle_add(open_app(&config)?, cmd),
        Command::Edit(cmd) => handle_edit(open_app(&config)?, cmd),
        Command::Delete(cmd) => handle_delete(open_app(&config)?, cmd.id),
        Command::Show(cmd) => handle_show(&open_app(&config)?, cmd.id, cmd.json),
        Command::List(cmd) => handle_list(open_app(&config)?, &config, cmd),
        Command::Stats(cmd) => handle_stats(&open_app(&config)?, cmd.json),
        Command::Shell => {
            let mut app = open_app(&config)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            shell::run(&mut app, stdin.lock(), &mut stdout.lock())?;
            Ok(())
        }
    }
}

fn open_app(config: &Config) -> anyhow::Result<App<SqliteStore>> {
    let path = config.database_path();
    let kv = SqliteStore::open(&path)
        .with_context(|| format!("opening student database {}", path.display()))?;
    Ok(App::new(RecordStore::load(
        kv,
        config.storage.collection_key.clone(),
    )))
}

fn handle_add(mut app: App<SqliteStore>, cmd: AddCommand) -> anyhow::Result<()> {
    app.dispatch(Action::SetName(cmd.name))?;
    app.dispatch(Action::SetAgeInput(cmd.age))?;
    app.dispatch(Action::SetGrade(cmd.grade))?;
    app.dispatch(Action::SetEnrollment(!cmd.inactive))?;

    match app.dispatch(Action::Submit)? {
        Outcome::Created(record) => {
            println!("Added {}", render::line(&record));
            Ok(())
        }
        outcome => Err(outcome_error(outcome).into()),
    }
}

fn handle_edit(mut app: App<SqliteStore>, cmd: EditCommand) -> anyhow::Result<()> {
    if let Outcome::NotFound(id) = app.dispatch(Action::BeginEdit(cmd.id))? {
        return Err(Error::not_found(id).into());
    }

    let enrollment = cmd.enrollment();
    if let Some(name) = cmd.name {
        app.dispatch(Action::SetName(name))?;
    }
    if let Some(age) = cmd.age {
        app.dispatch(Action::SetAgeInput(age))?;
    }
    if let Some(grade) = cmd.grade {
        app.dispatch(Action::SetGrade(grade))?;
    }
    if let Some(active) = enrollment {
        app.dispatch(Action::SetEnrollment(active))?;
    }

    match app.dispatch(Action::Submit)? {
        Outcome::Updated(record) => {
            println!("Updated {}", render::line(&record));
            Ok(())
        }
        outcome => Err(outcome_error(outcome).into()),
    }
}

fn handle_delete(mut app: App<SqliteStore>, id: i64) -> anyhow::Result<()> {
    match app.dispatch(Action::Delete(id))? {
        Outcome::Deleted(id) => println!("Deleted #{id}"),
        _ => warn!("No student with id {}, nothing deleted", id),
    }
    Ok(())
}

fn handle_show(app: &App<SqliteStore>, id: i64, json: bool) -> anyhow::Result<()> {
    let record = app.store().get(id).ok_or_else(|| Error::not_found(id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print!("{}", render::table(&[record]));
    }
    Ok(())
}

fn handle_list(app: App<SqliteStore>, config: &Config, cmd: ListCommand) -> anyhow::Result<()> {
    let query = Query::new(
        cmd.search.unwrap_or_default(),
        cmd.status
            .map_or(config.display.default_filter, Into::into),
    );
    let format = cmd.format.unwrap_or(config.display.default_format);

    let app = app.with_query(query);
    let visible = app.visible();
    let output = render::records(&visible, format)?;
    if format == OutputFormat::Json {
        println!("{output}");
    } else {
        print!("{output}");
    }
    Ok(())
}

fn handle_stats(app: &App<SqliteStore>, json: bool) -> anyhow::Result<()> {
    let stats = app.store().stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render::stats(&stats));
        let db = app.store().backend();
        print!("{}", render::database(db.path(), db.size_bytes()));
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!("  Collection key:  {}", config.storage.collection_key);
                println!();
                println!("[Display]");
                println!("  Default filter:  {}", config.display.default_filter);
                println!("  Default format:  {:?}", config.display.default_format);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

/// Turn an unexpected submit outcome into the error reported to the user.
fn outcome_error(outcome: Outcome) -> Error {
    match outcome {
        Outcome::Rejected(errors) => {
            eprint!("{}", render::form_errors(&errors));
            Error::Rejected { errors }
        }
        Outcome::NotFound(id) => Error::not_found(id),
        // Submit only yields Created, Updated, Rejected or NotFound
        other => Error::internal(format!("unexpected submit outcome: {other:?}")),
    }
}
