//! oxmodal entrypoint: replay a key sequence against a buffer and print
//! where it ends up.
use anyhow::{Context, Result, bail};
use clap::Parser;
use core_actions::{Engine, KeyOutcome};
use core_config::load_from;
use core_text::{Buffer, Position, TextBuffer};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxmodal", version, about = "Modal key-sequence interpreter")]
struct Args {
    /// File whose contents seed the buffer. Ignored when `--text` is given.
    pub path: Option<PathBuf>,
    /// Inline buffer contents (`\n` escapes are expanded).
    #[arg(long = "text")]
    pub text: Option<String>,
    /// Key sequence in `<C-o>`/`<Esc>` notation.
    #[arg(long = "keys", default_value = "")]
    pub keys: String,
    /// Initial caret as `LINE:COL`, both zero based.
    #[arg(long = "caret", value_parser = parse_caret)]
    pub caret: Option<Position>,
    /// Optional configuration file path (overrides discovery of `oxmodal.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Also print every non-empty register.
    #[arg(long = "registers")]
    pub registers: bool,
}

fn parse_caret(raw: &str) -> Result<Position, String> {
    let (line, col) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got `{raw}`"))?;
    let line = line
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad line `{line}`: {e}"))?;
    let col = col
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad column `{col}`: {e}"))?;
    Ok(Position::new(line, col))
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("oxmodal.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "oxmodal.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn initial_text(args: &Args) -> Result<String> {
    if let Some(text) = args.text.as_ref() {
        return Ok(text.replace("\\n", "\n").replace("\\t", "\t"));
    }
    match args.path.as_ref() {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            // The engine works on `\n` only.
            let content = content.replace("\r\n", "\n");
            tracing::debug!(
                target: "io",
                file = %path.display(),
                size_bytes = content.len(),
                "file_read_ok"
            );
            Ok(content)
        }
        None => Ok(String::new()),
    }
}

fn print_report(engine: &Engine<Buffer>, with_registers: bool) {
    print!("{}", engine.buffer().text());
    if !engine.buffer().text().ends_with('\n') {
        println!();
    }
    println!("---");
    let caret = engine.caret();
    println!("caret {}:{}", caret.line, caret.col);
    println!("mode  {}", engine.mode().label());
    let pending = engine.pending_keys();
    if !pending.is_empty() {
        println!("keys  {pending}");
    }
    if with_registers {
        for (name, content) in engine.registers().snapshot() {
            let shape = if content.is_linewise() { "l" } else { "c" };
            println!("\"{name} {shape} {:?}", content.text);
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_from(args.config.clone())?;
    let settings = config.effective();
    let text = initial_text(&args)?;
    let mut engine = Engine::from_text(&text, settings).context("building engine")?;

    if let Some(caret) = args.caret {
        let lines = engine.buffer().line_count();
        if caret.line >= lines {
            bail!("caret line {} outside buffer of {lines} lines", caret.line);
        }
        engine.set_caret(caret);
    }

    info!(
        target: "runtime",
        config = ?config.source,
        bytes = text.len(),
        keys = args.keys.as_str(),
        "replay_start"
    );
    let outcomes = engine
        .feed_str(&args.keys)
        .with_context(|| format!("parsing key sequence `{}`", args.keys))?;
    for err in outcomes.iter().filter_map(|o| match o {
        KeyOutcome::Bell(err) => Some(err),
        _ => None,
    }) {
        warn!(target: "runtime", %err, "bell");
        eprintln!("bell: {err}");
    }
    let metrics = engine.metrics();
    info!(
        target: "runtime",
        keys = outcomes.len(),
        bells = metrics.bells,
        register_writes = metrics.register_writes,
        "replay_complete"
    );

    print_report(&engine, args.registers);
    Ok(())
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");
    run(Args::parse())
}
