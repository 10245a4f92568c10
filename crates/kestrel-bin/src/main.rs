//! Kestrel entrypoint: a headless driver for the modal editing core.
//!
//! Loads a file (or starts empty), feeds a key script through a `Session`
//! and writes the resulting text to `--output` or stdout. The last status
//! message, if any, goes to stderr.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::Session;
use core_config::{Config, load_from};
use core_text::{Buffer, normalize_line_endings};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "kestrel", version, about = "Kestrel modal text editing core")]
struct Args {
    /// File to edit. A missing file starts an empty buffer with that name.
    pub path: Option<PathBuf>,
    /// Keys to feed, in Vim notation (`dw`, `"ayy`, `I#<Esc>j`).
    #[arg(long = "keys", conflicts_with = "keys_file")]
    pub keys: Option<String>,
    /// Read the key script from a file instead.
    #[arg(long = "keys-file")]
    pub keys_file: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `kestrel.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Write the final text here instead of stdout.
    #[arg(long = "output")]
    pub output: Option<PathBuf>,
}

struct App {
    log_guard: Option<WorkerGuard>,
}

impl App {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let file_appender = tracing_appender::rolling::never(log_dir, "kestrel.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
            .is_ok()
        {
            self.log_guard = Some(guard);
        }
        Ok(())
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

    fn run(&mut self, args: Args) -> Result<()> {
        self.configure_logging()?;
        Self::install_panic_hook();
        info!(target: "runtime", "startup");

        let config = load_from(args.config.clone())?;
        let buffer = load_buffer(args.path.as_deref(), &config)?;
        let mut session = Session::with_config(buffer, &config);

        let script = key_script(&args)?;
        session
            .feed_keys(&script)
            .context("invalid key notation")?;
        info!(
            target: "runtime",
            keys = script.len(),
            mode = session.mode().name(),
            "script_complete"
        );

        let text = session.text();
        match &args.output {
            Some(path) => std::fs::write(path, &text)
                .with_context(|| format!("writing {}", path.display()))?,
            None => std::io::stdout()
                .write_all(text.as_bytes())
                .context("writing stdout")?,
        }
        if let Some(status) = session.status() {
            eprintln!("{status}");
        }
        info!(target: "runtime", "shutdown");
        Ok(())
    }
}

fn load_buffer(path: Option<&Path>, config: &Config) -> Result<Buffer> {
    let Some(path) = path else {
        return Ok(Buffer::from_str("untitled", ""));
    };
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(target: "runtime", file = %path.display(), "new_file");
            String::new()
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    debug!(target: "runtime", file = %path.display(), size_bytes = content.len(), "file_read_ok");
    if config.editor().normalize_line_endings {
        Ok(Buffer::from_str(name, &normalize_line_endings(&content)))
    } else {
        Ok(Buffer::from_str(name, &content))
    }
}

/// Key script from `--keys` or `--keys-file`. Trailing line breaks in a file
/// are not keys.
fn key_script(args: &Args) -> Result<String> {
    if let Some(path) = &args.keys_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading key script {}", path.display()))?;
        return Ok(raw.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(args.keys.clone().unwrap_or_default())
}

fn main() -> Result<()> {
    let args = Args::parse();
    App::new().run(args)
}
