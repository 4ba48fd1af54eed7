//! ngm - nested git manager
//!
//! Finds every git repository below a directory and shows or changes them
//! all at once, either in an interactive tree or through one-shot commands.

mod commands;
mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::Workspace;
use config::Config;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ngm_core::{AppCoordinator, Message};
use ngm_git::{DiscoveryCache, GitBackend, GitCli, TaskRunner};
use ngm_ui::App;
use ratatui::prelude::*;
use std::fs::{self, File};
use std::io::{stdout, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Run git across every repository nested under a directory
#[derive(Parser, Debug)]
#[command(name = "ngm", version, about, long_about = None)]
struct Cli {
    /// Directory to search for repositories
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Walk the directory again instead of using the cached repository list
    #[arg(long, global = true)]
    reindex: bool,

    /// Configuration file (default: <config dir>/ngm/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Browse, stage and commit in a terminal UI (default)
    Interactive,
    /// Print branch and changes of every repository
    Status,
    /// Print the working tree diff of every repository
    Diff {
        /// Print plain patches instead of boxed, coloured hunks
        #[arg(long)]
        patch: bool,
    },
    /// Run `git pull` with the given arguments in every repository
    Pull {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run `git push` with the given arguments in every repository
    Push {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Commit staged changes in every repository that has some
    Commit {
        #[arg(short, long)]
        message: String,
    },
    /// Rebuild the repository index and show what changed
    Index,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Interactive);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: {e:#}");
            eprintln!("Using default configuration...");
            Config::default()
        }),
    };
    init_logging(&cli, &config, command == Command::Interactive)?;

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Cannot open root directory {:?}", cli.root))?;
    let cache = DiscoveryCache::new(&root);
    let options = config.discovery.options();

    // `index` walks the tree itself
    let repos = if command == Command::Index {
        Vec::new()
    } else {
        cache
            .load_or_index(&options, cli.reindex)
            .with_context(|| format!("Failed to index repositories under {:?}", root))?
    };
    tracing::debug!(root = %root.display(), repos = repos.len(), "using repository index");

    let mut out = stdout();

    let backend: Arc<dyn GitBackend> = Arc::new(GitCli::new());
    let runner = TaskRunner::new(config.runner.max_parallel)?;
    let ws = Workspace::new(&root, &repos, backend, runner)
        .color(out.is_terminal())
        .progress(std::io::stderr().is_terminal());

    let ok = match command {
        Command::Interactive => {
            run_interactive(ws, &config)?;
            true
        }
        Command::Status => commands::status(&ws, &mut out)?,
        Command::Diff { patch } => commands::diff(&ws, &mut out, patch)?,
        Command::Pull { args } => commands::run_everywhere(&ws, &mut out, git_args("pull", args))?,
        Command::Push { args } => commands::run_everywhere(&ws, &mut out, git_args("push", args))?,
        Command::Commit { message } => commands::commit(&ws, &mut out, &message)?,
        Command::Index => commands::index(&cache, &options, &mut out)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn git_args(subcommand: &str, args: Vec<String>) -> Vec<String> {
    std::iter::once(subcommand.to_string()).chain(args).collect()
}

/// Install the `tracing` subscriber.
///
/// The terminal UI owns the screen, so in interactive mode records go to a
/// file in the cache directory instead of stderr.
fn init_logging(cli: &Cli, config: &Config, interactive: bool) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("NGM_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(&config.log.level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if interactive {
        let path = Config::log_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
        }
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn run_interactive(ws: Workspace, config: &Config) -> Result<()> {
    let theme = config.theme()?;
    let root = ws.root().to_path_buf();
    let repos = ws.repos().to_vec();
    let backend = ws.backend();

    // Load before taking over the terminal so failures print normally
    eprintln!("Loading {} repositories...", repos.len());
    let mut app = App::new(root, &repos, backend, ws.into_runner(), theme)
        .nerd_font(config.ui.nerd_font);

    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    restore_screen(terminal.backend_mut())?;
    terminal.show_cursor()?;

    result
}

fn restore_screen(out: &mut impl Write) -> std::io::Result<()> {
    execute!(out, DisableBracketedPaste, LeaveAlternateScreen)
}

/// Leave raw mode and the alternate screen before a panic message prints,
/// otherwise it lands on the hidden screen of a raw terminal.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = restore_screen(&mut stdout());
        tracing::error!(%info, "panic in interactive mode");
        default_hook(info);
    }));
}

fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
{
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Press => {}
                Event::Key(key) => match (key.modifiers, key.code) {
                    (KeyModifiers::CONTROL, KeyCode::Char('c' | 'q')) => {
                        app.dispatch(Message::Quit);
                    }
                    _ => app.dispatch(Message::Key(key)),
                },
                other => app.dispatch(Message::from(other)),
            }
        }

        if app.should_quit() {
            break;
        }

        app.tick();
    }

    Ok(())
}
