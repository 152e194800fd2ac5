//! Purpose: `envpath` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, renders results.
//! Invariants: Commands emit JSON on stdout when it is not a terminal, text otherwise.
//! Invariants: Errors are emitted as JSON on stderr when it is not a terminal.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All PATH reads and writes go through a `VarStore`.
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use envpath::api::{
    Error, ErrorKind, PathList, Scope, SystemStore, VarStore, exists_in_user_and_machine,
    to_exit_code,
};
use envpath::notice::{Notice, notice_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Internal)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    // SAFETY: the CLI is single-threaded; nothing else touches the environment.
    let mut store = unsafe {
        match &cli.store_dir {
            Some(dir) => SystemStore::with_store_dir(dir),
            None => SystemStore::new(),
        }
    };
    tracing::debug!(store_dir = ?cli.store_dir, "store selected");

    command_dispatch::dispatch_command(cli.command, &mut store, color_mode)
        .map_err(add_permission_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "envpath",
    version,
    about = "Add, remove, and list PATH entries per scope",
    long_about = None,
    before_help = r#"Scopes:
  - process  this process only (gone when it exits)
  - user     persistent, current user
  - machine  persistent, all users (needs elevation to write)
"#,
    after_help = r#"EXAMPLES
  $ envpath get --scope user
  $ envpath add --scope user /opt/tool/bin
  $ envpath remove --scope user /opt/tool/bin
  $ printf '/opt/a\n/opt/b\n' | envpath add --scope user --quiet

  $ envpath <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        help = "Keep user/machine values as files under this directory instead of the OS store",
        value_hint = ValueHint::DirPath
    )]
    store_dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn parse_scope(input: &str) -> Result<Scope, String> {
    input.parse::<Scope>().map_err(|err| error_message(&err))
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Add entries to a scope's PATH",
        long_about = r#"Append entries to the PATH of one scope and persist the change.

An entry already present in the user or machine PATH is not added again; the
scope's current entries are reported instead. With no PATH arguments, entries
are read from stdin, one per line."#,
        after_help = r#"EXAMPLES
  $ envpath add --scope user /opt/tool/bin
  $ envpath add --target machine 'C:\Tools\bin'

NOTES
  - Output is the scope's value before the write (use --quiet to suppress)
  - Entries must be absolute; matching ignores case"#
    )]
    Add {
        #[arg(value_name = "PATH", help = "Entries to add (default: read stdin lines)")]
        paths: Vec<String>,
        #[arg(
            long,
            short = 's',
            visible_alias = "target",
            value_parser = parse_scope,
            default_value = "process",
            help = "Scope to modify: process|user|machine"
        )]
        scope: Scope,
        #[arg(long, short = 'q', help = "Do not print the previous value after saving")]
        quiet: bool,
    },
    #[command(
        about = "List a scope's PATH entries",
        after_help = r#"EXAMPLES
  $ envpath get
  $ envpath get --scope machine | jq -r '.paths[]'"#
    )]
    Get {
        #[arg(
            long,
            short = 's',
            visible_alias = "target",
            value_parser = parse_scope,
            default_value = "process",
            help = "Scope to read: process|user|machine"
        )]
        scope: Scope,
    },
    #[command(
        about = "Remove entries from a scope's PATH",
        long_about = r#"Remove entries from the PATH of one scope and persist the change.

Only entries present in the user or machine PATH are acted on; anything else
leaves the scope untouched. With no PATH arguments, entries are read from
stdin, one per line."#,
        after_help = r#"EXAMPLES
  $ envpath remove --scope user /opt/tool/bin"#
    )]
    Remove {
        #[arg(value_name = "PATH", help = "Entries to remove (default: read stdin lines)")]
        paths: Vec<String>,
        #[arg(
            long,
            short = 's',
            visible_alias = "target",
            value_parser = parse_scope,
            default_value = "process",
            help = "Scope to modify: process|user|machine"
        )]
        scope: Scope,
    },
    #[command(about = "Print version info")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ envpath completion bash > ~/.local/share/bash-completion/completions/envpath
  $ envpath completion fish > ~/.config/fish/completions/envpath.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AddOutcome {
    /// Already in the user or machine PATH; nothing written.
    Exists { current: Vec<String> },
    Added { entry: String, previous: Vec<String> },
    /// Already in this scope only; nothing written.
    Present,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RemoveOutcome {
    Removed {
        removed: Option<String>,
        current: Vec<String>,
    },
    /// Not in the user or machine PATH; nothing written.
    Absent { current: Vec<String> },
}

fn add_entry<S: VarStore + ?Sized>(
    store: &mut S,
    scope: Scope,
    path: &str,
) -> Result<AddOutcome, Error> {
    let mut list = PathList::load(&*store, scope)?;
    if exists_in_user_and_machine(&*store, path)? {
        tracing::debug!(path, %scope, "entry already in user or machine PATH");
        return Ok(AddOutcome::Exists {
            current: list.into_paths(),
        });
    }
    match list.add_path(path)? {
        Some(entry) => {
            let previous = list.save(store)?;
            tracing::debug!(path, %scope, "entry added");
            Ok(AddOutcome::Added { entry, previous })
        }
        None => Ok(AddOutcome::Present),
    }
}

fn remove_entry<S: VarStore + ?Sized>(
    store: &mut S,
    scope: Scope,
    path: &str,
) -> Result<RemoveOutcome, Error> {
    let mut list = PathList::load(&*store, scope)?;
    if !exists_in_user_and_machine(&*store, path)? {
        tracing::debug!(path, %scope, "entry not in user or machine PATH");
        return Ok(RemoveOutcome::Absent {
            current: list.into_paths(),
        });
    }
    let removed = list.remove_path(path)?;
    list.save(store)?;
    Ok(RemoveOutcome::Removed {
        removed,
        current: list.into_paths(),
    })
}

/// Positional entries, or stdin lines when none were given.
fn resolve_inputs(paths: Vec<String>) -> Result<Vec<String>, Error> {
    if !paths.is_empty() {
        return Ok(paths);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(missing_path_error());
    }
    let lines = read_input_lines(stdin.lock())?;
    if lines.is_empty() {
        return Err(missing_path_error());
    }
    Ok(lines)
}

fn read_input_lines<R: BufRead>(reader: R) -> Result<Vec<String>, Error> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}

fn missing_path_error() -> Error {
    Error::new(ErrorKind::NullArgument)
        .with_message("no path given")
        .with_hint("Pass PATH arguments or pipe entries on stdin, one per line.")
}

fn add_outcome_json(scope: Scope, path: &str, outcome: &AddOutcome) -> Value {
    match outcome {
        AddOutcome::Exists { current } => json!({
            "scope": scope.as_str(),
            "entry": path,
            "status": "exists",
            "paths": current,
        }),
        AddOutcome::Added { entry, previous } => json!({
            "scope": scope.as_str(),
            "entry": entry,
            "status": "added",
            "previous": previous,
        }),
        AddOutcome::Present => json!({
            "scope": scope.as_str(),
            "entry": path,
            "status": "present",
        }),
    }
}

fn remove_outcome_json(scope: Scope, path: &str, outcome: &RemoveOutcome) -> Value {
    match outcome {
        RemoveOutcome::Removed { removed, current } => json!({
            "scope": scope.as_str(),
            "entry": path,
            "status": "removed",
            "removed": removed,
            "paths": current,
        }),
        RemoveOutcome::Absent { current } => json!({
            "scope": scope.as_str(),
            "entry": path,
            "status": "absent",
            "paths": current,
        }),
    }
}

fn paths_json(scope: Scope, paths: &[String]) -> Value {
    json!({
        "scope": scope.as_str(),
        "paths": paths,
    })
}

/// Terminal stdout gets `lines`; anything else gets `value` as one JSON line.
fn emit_result(value: Value, lines: &[String]) {
    if io::stdout().is_terminal() {
        for line in lines {
            println!("{line}");
        }
        return;
    }
    emit_json(value);
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("envpath {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(json!({
            "name": "envpath",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {} (scope: {})", notice.message, notice.scope);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn present_notice(scope: Scope, entry: &str, entries: usize) -> Notice {
    let mut details = Map::new();
    details.insert("entries".to_string(), json!(entries));
    Notice {
        kind: "present".to_string(),
        time: notice_time_now().unwrap_or_default(),
        cmd: "add".to_string(),
        scope: scope.as_str().to_string(),
        entry: entry.to_string(),
        message: format!("{entry} is already present"),
        details,
    }
}

fn add_permission_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Permission || err.hint().is_some() {
        return err;
    }
    match err.scope() {
        Some(Scope::Machine) => err.with_hint("Machine scope needs elevated privileges."),
        Some(scope) => err.with_hint(format!(
            "Check that the {scope} store is writable, or pass --store-dir."
        )),
        None => err,
    }
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NullArgument => "required argument missing".to_string(),
        ErrorKind::InvalidPath => "invalid path".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Store => "environment store error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(entry) = err.entry() {
        inner.insert("entry".to_string(), json!(entry));
    }
    if let Some(scope) = err.scope() {
        inner.insert("scope".to_string(), json!(scope.as_str()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(entry) = err.entry() {
        lines.push(format!(
            "{} {entry}",
            colorize_label("entry:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(scope) = err.scope() {
        lines.push(format!(
            "{} {scope}",
            colorize_label("scope:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `envpath --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "envpath") else {
        return "Try `envpath --help`.".to_string();
    };

    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();

    if parts.is_empty() {
        return "Try `envpath --help`.".to_string();
    }
    format!("Try `envpath {} --help`.", parts.join(" "))
}
