//! `taskdost-cli` — offline task manager against an in-memory store.
//!
//! Each invocation starts from an empty store; this binary exists for quick
//! smoke-testing of the task domain without a database or server.
//!
//! # Usage
//!
//! ```text
//! taskdost-cli <command> [args]
//!
//! Commands:
//!   add <title> [--description <text>]     create a task
//!   list                                   display all tasks
//!   update <id> [--title <t>] [--description <d>]
//!   delete <id>                            remove a task
//!   complete <id>                          mark a task completed
//!
//! Flags:
//!   --help, -h        print this help
//! ```
//!
//! Exit codes: 0 success, 1 domain error (validation, unknown id),
//! 2 malformed invocation.

use std::process;

use chrono::{DateTime, Local, Utc};

use taskdost::domain::{NewTask, Task, TaskStatus, task};
use taskdost::error::AppError;
use taskdost::store::{MemoryTaskStore, TaskStore};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    process::exit(run(&args));
}

fn run(args: &[String]) -> i32 {
    let parsed = match parse_args(args) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("Error: {msg}");
            print_help();
            return 2;
        }
    };

    let command = match parsed {
        Some(c) => c,
        None => {
            print_help();
            return 0;
        }
    };

    let store = MemoryTaskStore::new();
    match dispatch(&store, command) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

// ── CLI arg parsing ───────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Command {
    Add { title: String, description: Option<String> },
    List,
    Update { id: i64, title: Option<String>, description: Option<String> },
    Delete { id: i64 },
    Complete { id: i64 },
}

/// `Ok(None)` means help was requested (or no args at all).
fn parse_args(args: &[String]) -> Result<Option<Command>, String> {
    let mut iter = args.iter();
    let Some(command) = iter.next() else {
        return Ok(None);
    };

    match command.as_str() {
        "--help" | "-h" => Ok(None),
        "add" => {
            let mut title = None;
            let mut description = None;
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--description" | "-d" => {
                        description = Some(
                            iter.next().ok_or("--description requires a value")?.clone(),
                        );
                    }
                    _ if title.is_none() => title = Some(arg.clone()),
                    other => return Err(format!("unexpected argument: {other}")),
                }
            }
            let title = title.ok_or("add requires a title")?;
            Ok(Some(Command::Add { title, description }))
        }
        "list" => match iter.next() {
            None => Ok(Some(Command::List)),
            Some(other) => Err(format!("unexpected argument: {other}")),
        },
        "update" => {
            let id = parse_id(iter.next())?;
            let mut title = None;
            let mut description = None;
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--title" | "-t" => {
                        title = Some(iter.next().ok_or("--title requires a value")?.clone());
                    }
                    "--description" | "-d" => {
                        description = Some(
                            iter.next().ok_or("--description requires a value")?.clone(),
                        );
                    }
                    other => return Err(format!("unexpected argument: {other}")),
                }
            }
            Ok(Some(Command::Update { id, title, description }))
        }
        "delete" => {
            let id = parse_id(iter.next())?;
            Ok(Some(Command::Delete { id }))
        }
        "complete" => {
            let id = parse_id(iter.next())?;
            Ok(Some(Command::Complete { id }))
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_id(arg: Option<&String>) -> Result<i64, String> {
    let raw = arg.ok_or("a task id is required")?;
    raw.parse::<i64>().map_err(|_| format!("invalid task id: {raw}"))
}

fn print_help() {
    eprintln!("usage: taskdost-cli <command> [args]");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  add <title> [-d <text>]             create a task");
    eprintln!("  list                                display all tasks");
    eprintln!("  update <id> [-t <title>] [-d <text>]");
    eprintln!("  delete <id>                         remove a task");
    eprintln!("  complete <id>                       mark a task completed");
    eprintln!();
    eprintln!("flags:");
    eprintln!("  --help, -h          print this help");
}

// ── Command handlers ──────────────────────────────────────────────────────────

fn dispatch(store: &dyn TaskStore, command: Command) -> Result<String, AppError> {
    match command {
        Command::Add { title, description } => {
            let created = store.add(NewTask::new(&title, description.as_deref())?)?;
            Ok(format!("✓ Task created: {}", format_task(&created)))
        }
        Command::List => {
            let tasks = store.get_all()?;
            if tasks.is_empty() {
                Ok("No tasks found. Create one with: taskdost-cli add <title>".to_string())
            } else {
                Ok(format_task_list(&tasks))
            }
        }
        Command::Update { id, title, description } => {
            let mut found =
                store.get_by_id(id)?.ok_or(AppError::TaskNotFound(id))?;
            if let Some(t) = title {
                found.title = task::validate_title(&t)?;
            }
            if let Some(d) = description {
                found.description = task::validate_description(Some(&d))?;
            }
            let updated = store.update(&found)?;
            Ok(format!("✓ Task updated: {}", format_task(&updated)))
        }
        Command::Delete { id } => {
            if store.delete(id)? {
                Ok(format!("✓ Task {id} deleted"))
            } else {
                Err(AppError::TaskNotFound(id))
            }
        }
        Command::Complete { id } => {
            let mut found =
                store.get_by_id(id)?.ok_or(AppError::TaskNotFound(id))?;
            found.mark_complete();
            let completed = store.update(&found)?;
            Ok(format!("✓ Task completed: {}", format_task(&completed)))
        }
    }
}

// ── Output formatting ─────────────────────────────────────────────────────────

fn format_task(task: &Task) -> String {
    let status_icon = if task.status == TaskStatus::Completed { "✓" } else { "○" };
    let desc = match &task.description {
        Some(d) => format!(" - {d}"),
        None => String::new(),
    };
    format!("[{}] {} {}{}", task.id, status_icon, task.title, desc)
}

fn format_task_list(tasks: &[Task]) -> String {
    let mut lines = Vec::new();
    for task in tasks {
        lines.push(format_task(task));
        lines.push(format!("    Created: {}", format_datetime(task.created_at)));
        if task.status == TaskStatus::Completed
            && let Some(done_at) = task.completed_at
        {
            lines.push(format!("    Completed: {}", format_datetime(done_at)));
        }
    }
    lines.join("\n")
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
