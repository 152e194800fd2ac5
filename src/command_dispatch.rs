//! Purpose: Hold top-level CLI command dispatch for `envpath`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each PATH argument is processed as its own load/modify/save cycle.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command<S: VarStore + ?Sized>(
    command: Command,
    store: &mut S,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "envpath", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Get { scope } => {
            let list = PathList::load(&*store, scope)?;
            tracing::debug!(%scope, entries = list.len(), "listing entries");
            emit_result(paths_json(scope, list.paths()), list.paths());
            Ok(RunOutcome::ok())
        }
        Command::Add {
            paths,
            scope,
            quiet,
        } => {
            for path in resolve_inputs(paths)? {
                let outcome = add_entry(store, scope, &path)?;
                match &outcome {
                    AddOutcome::Present => {
                        let entries = PathList::load(&*store, scope)?.len();
                        emit_notice(&present_notice(scope, &path, entries), color_mode);
                    }
                    AddOutcome::Added { .. } if quiet => {}
                    AddOutcome::Added { entry, previous } => {
                        let mut lines = vec![format!("added {entry} to {scope} PATH; previous:")];
                        lines.extend(previous.iter().map(|p| format!("  {p}")));
                        emit_result(add_outcome_json(scope, &path, &outcome), &lines);
                    }
                    AddOutcome::Exists { current } => {
                        let mut lines = vec![format!(
                            "{path} is already in the user or machine PATH; {scope} PATH unchanged:"
                        )];
                        lines.extend(current.iter().map(|p| format!("  {p}")));
                        emit_result(add_outcome_json(scope, &path, &outcome), &lines);
                    }
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Remove { paths, scope } => {
            for path in resolve_inputs(paths)? {
                let outcome = remove_entry(store, scope, &path)?;
                let (header, current) = match &outcome {
                    RemoveOutcome::Removed {
                        removed: Some(removed),
                        current,
                    } => (format!("removed {removed} from {scope} PATH:"), current),
                    RemoveOutcome::Removed {
                        removed: None,
                        current,
                    } => (format!("{path} not found in {scope} PATH:"), current),
                    RemoveOutcome::Absent { current } => (
                        format!("{path} is not in the user or machine PATH; {scope} PATH unchanged:"),
                        current,
                    ),
                };
                let mut lines = vec![header];
                lines.extend(current.iter().map(|p| format!("  {p}")));
                emit_result(remove_outcome_json(scope, &path, &outcome), &lines);
            }
            Ok(RunOutcome::ok())
        }
    }
}
