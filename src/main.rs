use std::{io, sync::Arc, time::Duration, time::Instant};

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

use typesprint::{
    app_dirs::AppDirs,
    backend::{BackendKind, LocalBackend, RemoteBackend, ScoreBackend},
    config::{Config, ConfigStore, FileConfigStore, Overrides},
    language::Language,
    logging,
    runtime::{AppEvent, CrosstermEventSource, Runner},
    session::SessionConfig,
    typing::TypingTest,
    ui::screen::current_screen,
    word_generator::WordSource,
    Action, App, POLL_INTERVAL_MS,
};

/// timed typing-speed test for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A one-minute typing test over common English words. Scores are net words per minute; your best result can be kept locally or on a remote score server."
)]
pub struct Cli {
    /// where best scores are kept
    #[clap(long, value_enum)]
    backend: Option<BackendKind>,

    /// base URL of the remote score server
    #[clap(long = "server")]
    server_url: Option<String>,

    /// session cookie sent to the remote score server
    #[clap(long = "cookie")]
    session_cookie: Option<String>,

    /// player name used by the local score store
    #[clap(long)]
    profile: Option<String>,

    /// log verbosity (error, warn, info, debug, trace)
    #[clap(long)]
    log_level: Option<String>,

    /// seed the word generator for a reproducible sequence
    #[clap(long)]
    seed: Option<u64>,

    /// persist the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend,
            server_url: self.server_url.clone(),
            session_cookie: self.session_cookie.clone(),
            profile: self.profile.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

fn build_backend(config: &Config) -> Option<Arc<dyn ScoreBackend>> {
    let built: anyhow::Result<Arc<dyn ScoreBackend>> = match config.backend {
        BackendKind::Off => return None,
        BackendKind::Local => {
            LocalBackend::open(&config.profile).map(|b| Arc::new(b) as Arc<dyn ScoreBackend>)
        }
        BackendKind::Remote => RemoteBackend::new(&config.server_url, config.session_cookie.clone())
            .map(|b| Arc::new(b) as Arc<dyn ScoreBackend>),
    };

    match built {
        Ok(backend) => Some(backend),
        Err(err) => {
            warn!(backend = %config.backend, error = %format!("{err:#}"), "score backend unavailable");
            None
        }
    }
}

fn build_app(cli: &Cli, config: &Config) -> anyhow::Result<App> {
    let session = SessionConfig::default();
    let corpus = Language::english()?;
    let source = match cli.seed {
        Some(seed) => WordSource::seeded(corpus, session.sequence_len, seed),
        None => WordSource::new(corpus, session.sequence_len),
    };

    let mut app = App::new(TypingTest::new(session, source), build_backend(config));
    app.load_profile();
    Ok(app)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let config = store.load().merged(cli.overrides());
    if cli.save_config {
        store.save(&config)?;
    }

    if let Some(log_path) = AppDirs::log_path() {
        logging::init(&log_path, &config.log_level);
    }
    info!(backend = %config.backend, profile = %config.profile, "starting");

    if !io::stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = build_app(&cli, &config)?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.settle_report();
    info!(status = %app.report_status.describe(), "exiting");
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(POLL_INTERVAL_MS),
    );

    terminal.draw(|f| current_screen(&app.state).render(&*app, f))?;

    loop {
        let redraw = match runner.step() {
            AppEvent::Key(key) => {
                if app.on_key(key, Instant::now()) == Action::Quit {
                    break;
                }
                true
            }
            AppEvent::Poll => app.on_poll(Instant::now()),
            AppEvent::Resize => true,
        };

        if redraw {
            terminal.draw(|f| current_screen(&app.state).render(&*app, f))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        let cli = Cli::parse_from(["typesprint"]);
        assert_eq!(cli.overrides(), Overrides::default());
        assert!(!cli.save_config);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_cli_flags_become_overrides() {
        let cli = Cli::parse_from([
            "typesprint",
            "--backend",
            "remote",
            "--server",
            "https://typing.example.com/auth",
            "--cookie",
            "connect.sid=abc",
            "--log-level",
            "debug",
            "--seed",
            "42",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.backend, Some(BackendKind::Remote));
        assert_eq!(
            overrides.server_url.as_deref(),
            Some("https://typing.example.com/auth")
        );
        assert_eq!(overrides.session_cookie.as_deref(), Some("connect.sid=abc"));
        assert_eq!(overrides.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_cli_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["typesprint", "--backend", "cloud"]).is_err());
    }

    #[test]
    fn test_backend_off_builds_nothing() {
        let config = Config {
            backend: BackendKind::Off,
            ..Config::default()
        };
        assert!(build_backend(&config).is_none());
    }

    #[test]
    fn test_seeded_app_is_reproducible() {
        let cli = Cli {
            seed: Some(9),
            ..Cli::default()
        };
        let config = Config {
            backend: BackendKind::Off,
            ..Config::default()
        };

        let mut a = build_app(&cli, &config).unwrap();
        let mut b = build_app(&cli, &config).unwrap();
        a.start();
        b.start();
        assert_eq!(a.test.state().sequence, b.test.state().sequence);
        assert_eq!(a.test.state().sequence.len(), 200);
    }
}
