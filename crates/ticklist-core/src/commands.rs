use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use anyhow::{Context, anyhow};
use ticklist_shared::{
    Checklist, ClearOutcome, Confirm, InteractionMode, StorageBackend, StoreError, TaskStore,
};
use tracing::{debug, info, instrument, warn};

use crate::cli::Invocation;
use crate::render::Renderer;

/// Widest `lo-hi` range accepted in an id argument.
pub const MAX_ID_RANGE: u64 = 1_000;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add", "list", "info", "done", "undone", "toggle", "delete", "clear", "help", "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }
    if token.is_empty() {
        return None;
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

/// Asks on the terminal; anything but an explicit yes declines.
#[derive(Debug, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{message} [y/N] ")
            .and_then(|_| stderr.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                warn!(error = %err, "failed reading confirmation");
                false
            }
        }
    }
}

/// Confirms without asking (`--yes`, `confirmation=off`).
#[derive(Debug, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

#[instrument(skip(store, renderer, inv, confirm), fields(command = %inv.command))]
pub fn dispatch<B: StorageBackend>(
    store: &TaskStore<B>,
    renderer: &mut Renderer,
    inv: Invocation,
    confirm: &dyn Confirm,
) -> anyhow::Result<()> {
    debug!(args = ?inv.args, "dispatching command");

    match inv.command.as_str() {
        "add" => cmd_add(store, renderer, &inv.args),
        "list" => cmd_list(store, renderer),
        "info" => cmd_info(store, renderer, &inv.args),
        "done" => cmd_set_completed(store, renderer, &inv.args, Some(true)),
        "undone" => cmd_set_completed(store, renderer, &inv.args, Some(false)),
        "toggle" => cmd_set_completed(store, renderer, &inv.args, None),
        "delete" => cmd_delete(store, renderer, &inv.args),
        "clear" => cmd_clear(store, renderer, confirm),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[instrument(skip(store, renderer, args))]
fn cmd_add<B: StorageBackend>(
    store: &TaskStore<B>,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command add");

    let text = args.join(" ");
    match store.add(&text)? {
        Some(task) => println!("Created task {}.", task.id),
        None => println!("Nothing to add: task text is blank."),
    }
    cmd_list(store, renderer)
}

/// Reloads every task and redraws the list. Every mutating command ends here.
#[instrument(skip(store, renderer))]
pub fn cmd_list<B: StorageBackend>(
    store: &TaskStore<B>,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    let tasks = store.list()?;
    let checklist = Checklist::build(&tasks, InteractionMode::Checkbox);
    renderer.print_checklist(&checklist)
}

#[instrument(skip(store, renderer, args))]
fn cmd_info<B: StorageBackend>(
    store: &TaskStore<B>,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    let ids = parse_ids(args)?;
    if ids.is_empty() {
        return Err(anyhow!("info requires a task id"));
    }

    for id in ids {
        let task = store.get(id)?.ok_or(StoreError::TaskNotFound { id })?;
        renderer.print_task_info(&task)?;
    }
    Ok(())
}

/// `Some(flag)` sets the flag, `None` flips it.
#[instrument(skip(store, renderer, args))]
fn cmd_set_completed<B: StorageBackend>(
    store: &TaskStore<B>,
    renderer: &mut Renderer,
    args: &[String],
    completed: Option<bool>,
) -> anyhow::Result<()> {
    let ids = parse_ids(args)?;
    if ids.is_empty() {
        return Err(anyhow!("expected at least one task id"));
    }

    for id in ids {
        let task = match completed {
            Some(flag) => store.set_completed(id, flag),
            None => store.toggle(id),
        }
        .with_context(|| format!("failed to update task {id}"))?;
        let state = if task.completed {
            "completed"
        } else {
            "not completed"
        };
        println!("Marked task {} {state}.", task.id);
    }
    cmd_list(store, renderer)
}

#[instrument(skip(store, renderer, args))]
fn cmd_delete<B: StorageBackend>(
    store: &TaskStore<B>,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    let ids = parse_ids(args)?;
    if ids.is_empty() {
        return Err(anyhow!("delete requires a task id"));
    }

    for id in ids {
        if store.delete(id)? {
            println!("Deleted task {id}.");
        } else {
            println!("Task {id} not found; nothing deleted.");
        }
    }
    cmd_list(store, renderer)
}

#[instrument(skip(store, renderer, confirm))]
fn cmd_clear<B: StorageBackend>(
    store: &TaskStore<B>,
    renderer: &mut Renderer,
    confirm: &dyn Confirm,
) -> anyhow::Result<()> {
    match store.clear(confirm)? {
        ClearOutcome::Declined => println!("Nothing cleared."),
        ClearOutcome::Cleared { removed } => println!("Cleared {removed} task(s)."),
    }
    cmd_list(store, renderer)
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "usage: ticklist [options] <command> [args]\n\n\
         commands:\n  \
         add <text...>     add a task\n  \
         list              show all tasks (default)\n  \
         info <id>         show one task\n  \
         done <ids>        mark completed\n  \
         undone <ids>      mark not completed\n  \
         toggle <ids>      flip completion\n  \
         delete <ids>      remove tasks\n  \
         clear             remove every task (asks first)\n  \
         version           print the version\n\n\
         ids: 3, 1,4 or 2-5 (at most {MAX_ID_RANGE} ids per range)"
    );
    Ok(())
}

/// Parses id arguments: single ids, comma lists and inclusive ranges.
pub fn parse_ids(args: &[String]) -> anyhow::Result<Vec<u64>> {
    let mut ids = Vec::new();
    for arg in args {
        for part in arg.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            if let Some((lo, hi)) = part.split_once('-') {
                let lo = parse_id(lo)?;
                let hi = parse_id(hi)?;
                if lo > hi {
                    return Err(anyhow!("invalid id range: {part}"));
                }
                if hi - lo >= MAX_ID_RANGE {
                    return Err(anyhow!(
                        "id range too large: {part} (at most {MAX_ID_RANGE} ids)"
                    ));
                }
                ids.extend(lo..=hi);
            } else {
                ids.push(parse_id(part)?);
            }
        }
    }

    let mut seen = BTreeSet::new();
    ids.retain(|id| seen.insert(*id));
    Ok(ids)
}

fn parse_id(raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| anyhow!("invalid task id: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::{MAX_ID_RANGE, expand_command_abbrev, known_command_names, parse_ids};

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ids_lists_and_ranges() {
        assert_eq!(
            parse_ids(&strings(&["3", "1,4", "6-8", "4"])).unwrap(),
            vec![3, 1, 4, 6, 7, 8]
        );
        assert!(parse_ids(&strings(&["5-2"])).is_err());
        assert!(parse_ids(&strings(&["milk"])).is_err());
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        let err = parse_ids(&strings(&["1-18446744073709551615"])).expect_err("huge range");
        assert!(err.to_string().contains("too large"), "{err}");

        let edge = format!("1-{MAX_ID_RANGE}");
        assert_eq!(
            parse_ids(&strings(&[&edge])).unwrap().len() as u64,
            MAX_ID_RANGE
        );
        let over = format!("1-{}", MAX_ID_RANGE + 1);
        assert!(parse_ids(&strings(&[&over])).is_err());
    }

    #[test]
    fn unique_prefixes_expand() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("tog", &known), Some("toggle"));
        assert_eq!(expand_command_abbrev("un", &known), Some("undone"));
        assert_eq!(expand_command_abbrev("d", &known), None);
        assert_eq!(expand_command_abbrev("", &known), None);
    }
}
