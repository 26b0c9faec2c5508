mod api;
mod app;
mod domain;
mod input;
mod logging;
mod notifications;
mod persistence;
mod scheduler;
mod ui;

use anyhow::{Context, Result};
use api::{ApiWorker, HttpTransport, ListParams, TaskClient};
use app::{AppSettings, AppState, Moment};
use clap::{ArgAction, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::views::format_timestamp;
use domain::{build_rows, Location};
use persistence::{
    config_file, ensure_app_dir, init_local_app_dir, load_config, load_session, log_file,
    save_config, save_session, session_file, Config, Session,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "meetask")]
#[command(about = "Terminal task board for meeting action items", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Task server base URL (overrides config.json)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Meeting to show
    #[arg(short, long, global = true)]
    meeting: Option<String>,

    /// Start from a location query string, e.g. "meeting=42&sort=deadline"
    #[arg(long, global = true)]
    location: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .meetask directory with a default config
    Init,
    /// Print the task list once and exit
    List,
    /// Generate tasks from the meeting summary and print them (nothing is saved)
    Generate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Init) => {
            logging::init_stderr_logging(cli.verbose)?;
            let app_dir = init_local_app_dir()?;
            save_config(app_dir.join("config.json"), &Config::default())?;
            println!("Initialized meetask directory: {}", app_dir.display());
            println!();
            println!("Edit {} to point at your task server.", app_dir.join("config.json").display());
            println!("Run 'meetask --meeting <id>' to open a meeting's tasks.");
            Ok(())
        }
        Some(Commands::List) => {
            logging::init_stderr_logging(cli.verbose)?;
            let config = load_effective_config(cli.server.as_deref())?;
            let location = resolve_location(&cli, None);
            print_task_list(&config, &location)
        }
        Some(Commands::Generate) => {
            logging::init_stderr_logging(cli.verbose)?;
            let config = load_effective_config(cli.server.as_deref())?;
            let location = resolve_location(&cli, None);
            print_generated_tasks(&config, &location)
        }
        None => run_tui(&cli),
    }
}

/// config.json plus command-line overrides
fn load_effective_config(server: Option<&str>) -> Result<Config> {
    let mut config = load_config(config_file()?)?;
    if let Some(server) = server {
        config.server_url = server.to_string();
    }
    Ok(config)
}

/// `--location` wins over the saved session; `--meeting` wins over both
fn resolve_location(cli: &Cli, session: Option<&Session>) -> Location {
    let mut location = match (&cli.location, session) {
        (Some(raw), _) => Location::parse(raw),
        (None, Some(session)) => Location::parse(&session.location),
        (None, None) => Location::default(),
    };
    if let Some(meeting) = &cli.meeting {
        location.meeting = Some(meeting.clone()).filter(|m| !m.trim().is_empty());
    }
    location
}

fn client_for(config: &Config) -> Result<TaskClient<HttpTransport>> {
    let transport = HttpTransport::from_config(config)
        .with_context(|| format!("Could not create HTTP client for {}", config.endpoint()))?;
    Ok(TaskClient::new(transport))
}

fn print_task_list(config: &Config, location: &Location) -> Result<()> {
    let meeting_id = location
        .meeting
        .clone()
        .context("No meeting selected; pass --meeting <id>")?;

    let client = client_for(config)?;
    let listing = client
        .list(ListParams {
            meeting_id: Some(meeting_id.clone()),
            filter: location.filter.clone(),
        })
        .with_context(|| format!("Failed to load tasks for meeting {}", meeting_id))?;

    let rows = build_rows(&listing.tasks, location.filter.sort, chrono::Local::now());
    if rows.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for row in rows {
        let mark = if row.task.completed { "[x]" } else { "[ ]" };
        println!(
            "{} {:<40} {:<10} {}",
            mark,
            row.task.display_title(),
            row.status.as_str(),
            row.deadline_label
        );
    }
    Ok(())
}

fn print_generated_tasks(config: &Config, location: &Location) -> Result<()> {
    let meeting_id = location
        .meeting
        .clone()
        .context("No meeting selected; pass --meeting <id>")?;

    let client = client_for(config)?;
    let drafts = client
        .generate_from_summary(meeting_id.clone())
        .with_context(|| format!("Failed to generate tasks for meeting {}", meeting_id))?;

    if drafts.is_empty() {
        println!("No tasks generated.");
        return Ok(());
    }
    for (idx, draft) in drafts.iter().enumerate() {
        let deadline = draft
            .deadline
            .map(|d| format_timestamp(&d))
            .unwrap_or_else(|| "no deadline".to_string());
        println!("{}. {} ({})", idx + 1, draft.title, deadline);
        if !draft.content.is_empty() {
            println!("   {}", draft.content);
        }
    }
    Ok(())
}

fn run_tui(cli: &Cli) -> Result<()> {
    ensure_app_dir()?;
    logging::init_file_logging(&log_file()?, cli.verbose)?;

    let config = load_effective_config(cli.server.as_deref())?;
    let session_path = session_file()?;
    let session = match load_session(&session_path) {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable session file");
            Session::default()
        }
    };
    let location = resolve_location(cli, Some(&session));
    info!(endpoint = %config.endpoint(), location = %location.display(), "starting");

    let worker = ApiWorker::spawn(client_for(&config)?);
    let mut app = AppState::new(location, AppSettings::from_config(&config), worker.sender());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let result = run_app(&mut terminal, &mut app, &worker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.dispose();
    if let Err(e) = save_session(&session_path, &Session::new(app.session_location())) {
        eprintln!("Error saving session: {}", e);
    }

    // The worker stops once the app's sender is gone
    drop(app);
    worker.shutdown();

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    worker: &ApiWorker,
) -> Result<()> {
    let tick_rate = scheduler::tick_duration();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        app.tick(Moment::now());

        while let Some(outcome) = worker.try_recv() {
            app.apply_outcome(outcome);
        }
    }
}
