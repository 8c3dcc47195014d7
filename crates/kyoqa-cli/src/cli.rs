use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossbeam_channel::RecvTimeoutError;
use kyoqa::config::{default_config_path, ensure_directories, load_config, AppConfig};
use kyoqa::pipeline::{LogLevel, Phase};
use kyoqa::worker::{cleanup_temp_files, BatchControl, BatchEvent, BatchRequest, BatchRunner, InputSpec};
use kyoqa::{Harvester, PatternKind, PatternStore, ReviewInfo};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "kyoqa", version)]
#[command(about = "Harvest model and QA metadata from PDF bulletins into a spreadsheet template")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config JSON. Defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process PDFs and merge the results into a copy of the template.
    Run {
        #[arg(long)]
        template: PathBuf,
        /// Keep existing review files and bypass the result cache.
        #[arg(long)]
        rerun: bool,
        /// Print batch events as JSON lines instead of text.
        #[arg(long)]
        events_json: bool,
        /// PDF files, or a single directory to scan.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Inspect or edit the custom pattern file.
    Patterns {
        #[command(subcommand)]
        action: PatternsCommand,
    },
    /// Remove cached results and review files.
    Clean,
}

#[derive(Subcommand, Debug)]
pub enum PatternsCommand {
    Show,
    Add {
        #[arg(long, value_enum)]
        kind: KindArg,
        pattern: String,
    },
    Remove {
        #[arg(long, value_enum)]
        kind: KindArg,
        pattern: String,
    },
    /// Harvest a text file and print what the current patterns find.
    Test { file: PathBuf },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Model,
    Tracking,
}

impl From<KindArg> for PatternKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Model => PatternKind::Model,
            KindArg::Tracking => PatternKind::Tracking,
        }
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    init_logging(&args)?;

    let cfg_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_config(&cfg_path)
        .with_context(|| format!("loading config: {}", cfg_path.display()))?;
    ensure_directories(&cfg)?;

    match args.cmd {
        Command::Run {
            template,
            rerun,
            events_json,
            inputs,
        } => run(cfg, template, rerun, events_json, inputs),
        Command::Patterns { action } => patterns(&cfg, action),
        Command::Clean => {
            let removed = cleanup_temp_files(&cfg.directories.cache, &cfg.directories.review);
            println!("Removed {} cached and review entries", removed);
            Ok(())
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    tracing_log::LogTracer::init().map_err(|e| anyhow!("failed to bridge log records: {e}"))?;

    let level = args.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let layer = if args.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;
    Ok(())
}

fn run(
    cfg: AppConfig,
    template: PathBuf,
    rerun: bool,
    events_json: bool,
    inputs: Vec<PathBuf>,
) -> Result<()> {
    let request = BatchRequest {
        template,
        inputs: InputSpec::from_paths(inputs),
        is_rerun: rerun,
    };
    info!("Starting batch with template {}", request.template.display());

    let handle = BatchRunner::from_config(cfg).spawn(request)?;

    let ctrlc_control = Arc::clone(&handle.control);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("Cancelling after the current document...");
        ctrlc_control.cancel();
    }) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }
    spawn_keyboard_control(Arc::clone(&handle.control));
    if !events_json {
        println!("Type 'p' + Enter to pause/resume, 'c' + Enter to cancel.");
    }

    let mut printer = EventPrinter::default();
    let mut terminal = None;
    loop {
        match handle.events.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                if events_json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    printer.print(&event);
                }
                if event.is_terminal() {
                    terminal = Some(event);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    handle.join()?;

    match terminal {
        Some(BatchEvent::Error { message }) => bail!(message),
        Some(_) => Ok(()),
        None => bail!("batch worker stopped without reporting a result"),
    }
}

/// Reads single-letter commands from stdin for the lifetime of the process.
fn spawn_keyboard_control(control: Arc<BatchControl>) {
    let spawned = std::thread::Builder::new()
        .name("kyoqa-keys".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match line.trim() {
                    "p" => {
                        if control.toggle_pause() {
                            eprintln!("Paused. Type 'p' to resume.");
                        } else {
                            eprintln!("Resumed.");
                        }
                    }
                    "c" => {
                        eprintln!("Cancelling after the current document...");
                        control.cancel();
                    }
                    _ => {}
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Keyboard control unavailable: {}", e);
    }
}

#[derive(Default)]
struct EventPrinter {
    review: Vec<ReviewInfo>,
    ocr_count: usize,
}

impl EventPrinter {
    fn print(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::Log { level, message } => {
                let tag = match level {
                    LogLevel::Info => "INFO",
                    LogLevel::Success => " OK ",
                    LogLevel::Warning => "WARN",
                    LogLevel::Error => "FAIL",
                };
                println!("[{}] {}", tag, message);
            }
            BatchEvent::Status { phase, message } => {
                let label = match phase {
                    Phase::Processing => "processing",
                    Phase::Ocr => "ocr",
                    Phase::Harvesting => "harvesting",
                    Phase::Saving => "saving",
                };
                println!("  ({}) {}", label, message);
            }
            BatchEvent::Progress { current, total } => {
                println!("-- {}/{} --", current, total);
            }
            BatchEvent::ReviewItem(review) => self.review.push(review.clone()),
            BatchEvent::OcrUsed => self.ocr_count += 1,
            BatchEvent::FileComplete { status } => println!("  => {}", status),
            BatchEvent::Complete {
                output_path,
                summary,
                ..
            } => {
                println!("\n{}", summary.message());
                println!("OCR used: {}", self.ocr_count);
                println!("Elapsed: {:.1}s", summary.elapsed_seconds);
                self.print_review_list();
                println!("Report: {}", output_path.display());
            }
            BatchEvent::Cancelled { results, summary } => {
                println!("\nCancelled after {} documents.", results.len());
                println!("{}", summary.message());
                self.print_review_list();
            }
            BatchEvent::Error { message } => println!("\nBatch failed: {}", message),
        }
    }

    fn print_review_list(&self) {
        if self.review.is_empty() {
            return;
        }
        println!("\nNeeds review ({}):", self.review.len());
        for item in &self.review {
            println!("  {} - {}", item.file_name, item.reason);
            println!("    text: {}", item.extracted_text_path.display());
            println!("    pdf:  {}", item.source_pdf_path.display());
        }
    }
}

fn patterns(cfg: &AppConfig, action: PatternsCommand) -> Result<()> {
    let store = PatternStore::new(&cfg.directories.custom_patterns);

    match action {
        PatternsCommand::Show => {
            let set = store.load();
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
        PatternsCommand::Add { kind, pattern } => {
            let mut set = store.load();
            let list = set.get_mut(kind.into());
            if list.contains(&pattern) {
                println!("Pattern already present");
                return Ok(());
            }
            list.push(pattern);
            report_invalid(&store.save(&set)?);
            println!("Saved {}", store.path().display());
        }
        PatternsCommand::Remove { kind, pattern } => {
            let mut set = store.load();
            let list = set.get_mut(kind.into());
            let before = list.len();
            list.retain(|p| p != &pattern);
            if list.len() == before {
                bail!("pattern not found: {}", pattern);
            }
            report_invalid(&store.save(&set)?);
            println!("Saved {}", store.path().display());
        }
        PatternsCommand::Test { file } => test_patterns(cfg, store, &file)?,
    }
    Ok(())
}

fn report_invalid(invalid: &[String]) {
    for pattern in invalid {
        eprintln!("warning: pattern does not compile and will be ignored: {}", pattern);
    }
}

fn test_patterns(cfg: &AppConfig, store: PatternStore, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let harvester = Harvester::new(cfg.harvest.clone(), store);
    let fields = harvester.harvest(&text, &file_name);
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "file": file,
            "models": fields.models,
            "author": fields.author,
            "trackingNumbers": fields.tracking_numbers,
        }))?
    );
    Ok(())
}
