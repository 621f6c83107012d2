//! Purpose: `yakshaver` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Each shave attempt emits exactly one JSON line on stdout.
//! Invariants: Errors are emitted as JSON on stderr; notices never touch stdout.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::ffi::OsString;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, CommandFactory, Parser, Subcommand, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use yakshaver::api::{
    Effect, Error, ErrorKind, FailEvery, STATUS_OK, Script, Trim, YakShaver, to_exit_code,
    to_status_code,
};
use yakshaver::notice::{Notice, notice_json, shave_failed};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser)]
#[command(
    name = "yakshaver",
    version,
    about = "Create a yakshaver and shave yaks with it",
    after_help = r#"EXAMPLES
  $ yakshaver shave --count 3
  $ yakshaver shave --count 4 --pattern ok,fail
  $ yakshaver shave --count 10 --fail-every 3 --strict

Set RUST_LOG=debug to trace the shaver's lifecycle on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run a sequence of shaves on one fresh yakshaver")]
    Shave(ShaveArgs),
    #[command(about = "Print shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ShaveArgs {
    #[arg(short = 'n', long, default_value_t = 1, help = "Number of shave attempts")]
    count: u32,
    #[arg(
        long,
        conflicts_with = "fail_every",
        help = "Scripted outcomes, cycled: comma-separated ok|fail"
    )]
    pattern: Option<String>,
    #[arg(long, value_name = "K", help = "Fail every K-th attempt (0 never fails)")]
    fail_every: Option<u64>,
    #[arg(long, help = "Exit non-zero if any shave failed")]
    strict: bool,
}

/// Effect selected from the command line.
enum CliEffect {
    Trim(Trim),
    Script(Script),
    FailEvery(FailEvery),
}

impl Effect for CliEffect {
    fn apply(&mut self, yak: u32) -> Result<(), Error> {
        match self {
            CliEffect::Trim(effect) => effect.apply(yak),
            CliEffect::Script(effect) => effect.apply(yak),
            CliEffect::FailEvery(effect) => effect.apply(yak),
        }
    }
}

#[derive(Debug, Serialize)]
struct ShaveRecord {
    yak: u32,
    ok: bool,
    status: i32,
    shaved: u32,
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `yakshaver --help` for usage."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or("invalid arguments");
    first
        .strip_prefix("error: ")
        .unwrap_or(first)
        .trim()
        .to_string()
}

fn shave_effect(args: &ShaveArgs) -> Result<CliEffect, Error> {
    if let Some(pattern) = &args.pattern {
        return Ok(CliEffect::Script(Script::parse(pattern)?));
    }
    if let Some(period) = args.fail_every {
        return Ok(CliEffect::FailEvery(FailEvery::new(period)));
    }
    Ok(CliEffect::Trim(Trim))
}

fn run_shaves(args: &ShaveArgs) -> Result<RunOutcome, Error> {
    let effect = shave_effect(args)?;
    let mut shaver = YakShaver::create_with(effect)?;
    let mut failed = 0u32;

    for _ in 0..args.count {
        let record = match shaver.shave() {
            Ok(total) => ShaveRecord {
                yak: total,
                ok: true,
                status: STATUS_OK,
                shaved: total,
            },
            Err(err) => {
                failed += 1;
                emit_notice(&shave_failed(&err, "shave", now_rfc3339()));
                ShaveRecord {
                    yak: err.yak().unwrap_or(shaver.yaks_shaved()),
                    ok: false,
                    status: to_status_code(err.kind()),
                    shaved: shaver.yaks_shaved(),
                }
            }
        };
        emit_json(&record);
    }

    let shaved = shaver.yaks_shaved();
    shaver.destroy();
    emit_json(&json!({
        "summary": {
            "attempts": args.count,
            "shaved": shaved,
            "failed": failed,
            "time": now_rfc3339(),
        }
    }));

    if args.strict && failed > 0 {
        return Ok(RunOutcome::with_code(to_exit_code(
            ErrorKind::OperationFailure,
        )));
    }
    Ok(RunOutcome::ok())
}

fn now_rfc3339() -> String {
    use time::format_description::well_known::Rfc3339;
    let formatted = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| {
            time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()
        })
        .and_then(|ts| ts.format(&Rfc3339).ok());
    formatted.unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string())
}

fn emit_json(value: &impl Serialize) {
    let json = serde_json::to_string(value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_notice(notice: &Notice) {
    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn emit_error(err: &Error) {
    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::AllocationFailure => "allocation failed".to_string(),
        ErrorKind::OperationFailure => "shave failed".to_string(),
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
    if let Some(yak) = err.yak() {
        inner.insert("yak".to_string(), json!(yak));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}
