use anyhow::{Context, Result};

use nudge_store::{TaskRecord, TaskStore, is_lazy, lazy_score};

use crate::TodoCommands;

/// Execute a `nudge todo` subcommand and print the resulting list.
pub fn run_todo(store: &TaskStore, command: TodoCommands) -> Result<()> {
    let path = store.path().display().to_string();
    let records = match command {
        TodoCommands::List => store
            .load()
            .with_context(|| format!("failed to load tasks from {path}"))?,
        TodoCommands::Add { title, time } => {
            let records = store.add(&title, &time)?;
            tracing::info!(title = %title, "task added");
            records
        }
        TodoCommands::Done { index } => store.mark_done(index)?,
        TodoCommands::Postpone { index } => {
            let records = store.postpone(index)?;
            tracing::info!(index, postponed = records[index].postponed, "task postponed");
            records
        }
        TodoCommands::Reset => {
            store.reset()?;
            println!("All tasks cleared.");
            Vec::new()
        }
    };

    print!("{}", format_listing(&records));
    Ok(())
}

/// Render the task list followed by the lazy score line.
pub fn format_listing(records: &[TaskRecord]) -> String {
    let mut out = String::new();
    if records.is_empty() {
        out.push_str("No tasks.\n");
    }
    for (i, rec) in records.iter().enumerate() {
        let mark = if rec.done { "x" } else { " " };
        out.push_str(&format!("{i:>3}  [{mark}] {}", rec.title));
        if !rec.time.is_empty() {
            out.push_str(&format!(" ({})", rec.time));
        }
        if rec.postponed > 0 {
            out.push_str(&format!("  postponed {}x", rec.postponed));
        }
        out.push('\n');
    }

    let score = lazy_score(records);
    out.push_str(&format!("\nLazy score: {score}"));
    if is_lazy(score) {
        out.push_str("  -- you keep putting things off. Pick one and start it today.");
    }
    out.push('\n');
    out
}
