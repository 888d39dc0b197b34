use crate::{
    backend::{LeaderboardEntry, Profile, ScoreBackend},
    report::{PendingReport, ReportOutcome, ScoreReporter},
    runtime::SecondTicker,
    typing::{FinalResults, KeyInput, Transition, TypingTest},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Typing,
    Results,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    /// No backend configured
    Disabled,
    Idle,
    Saving,
    Settled(ReportOutcome),
}

impl ReportStatus {
    pub fn describe(&self) -> String {
        match self {
            ReportStatus::Disabled => "scores are not saved".to_string(),
            ReportStatus::Idle => String::new(),
            ReportStatus::Saving => "saving score...".to_string(),
            ReportStatus::Settled(ReportOutcome::Saved) => "score saved".to_string(),
            ReportStatus::Settled(ReportOutcome::Rejected(status)) => {
                format!("score not saved ({status})")
            }
            ReportStatus::Settled(ReportOutcome::Failed(_)) => "score not saved".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardView {
    pub entries: Vec<LeaderboardEntry>,
    pub error: Option<String>,
}

pub struct App {
    pub test: TypingTest,
    pub state: AppState,
    pub ticker: SecondTicker,
    pub profile: Option<Profile>,
    pub report_status: ReportStatus,
    pub leaderboard: LeaderboardView,
    backend: Option<Arc<dyn ScoreBackend>>,
    reporter: Option<ScoreReporter>,
    pending: Option<PendingReport>,
    return_to: AppState,
}

impl App {
    pub fn new(test: TypingTest, backend: Option<Arc<dyn ScoreBackend>>) -> Self {
        let reporter = backend.as_ref().map(|b| ScoreReporter::new(Arc::clone(b)));
        let report_status = if reporter.is_some() {
            ReportStatus::Idle
        } else {
            ReportStatus::Disabled
        };

        Self {
            test,
            state: AppState::Idle,
            ticker: SecondTicker::default(),
            profile: None,
            report_status,
            leaderboard: LeaderboardView::default(),
            backend,
            reporter,
            pending: None,
            return_to: AppState::Idle,
        }
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Ask the backend who we are; failures leave the user anonymous
    pub fn load_profile(&mut self) {
        let Some(backend) = &self.backend else {
            return;
        };
        self.profile = match backend.me() {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "could not load profile");
                None
            }
        };
    }

    /// Start or refresh: fresh sequence, zeroed counters, no running countdown
    pub fn start(&mut self) {
        self.ticker.cancel();
        self.test.start();
        self.state = AppState::Typing;
        if self.reporter.is_some() {
            self.report_status = ReportStatus::Idle;
        }
    }

    fn refresh(&mut self) {
        self.ticker.cancel();
        self.test.refresh();
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match self.state {
            AppState::Idle | AppState::Results => match key.code {
                KeyCode::Esc => return Action::Quit,
                KeyCode::Enter => self.start(),
                KeyCode::Char('l') => self.open_leaderboard(),
                KeyCode::Char('o') => self.logout(),
                _ => {}
            },
            AppState::Typing => match key.code {
                KeyCode::Esc => return Action::Quit,
                KeyCode::Tab => self.refresh(),
                KeyCode::Backspace => self.apply(KeyInput::Backspace, now),
                KeyCode::Char(c) => self.apply(KeyInput::from(c), now),
                _ => {}
            },
            AppState::Leaderboard => match key.code {
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                    self.state = self.return_to;
                }
                _ => {}
            },
        }

        Action::Continue
    }

    fn apply(&mut self, input: KeyInput, now: Instant) {
        let transition = self.test.on_key(input);
        if transition.armed_now() {
            self.ticker.arm(now);
        }
    }

    /// Deliver due countdown seconds and collect a settled score report.
    /// Returns true when something visible changed.
    pub fn on_poll(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self.state == AppState::Typing {
            for _ in 0..self.ticker.due(now) {
                match self.test.tick() {
                    Transition::Finished(results) => {
                        self.finish(results);
                        changed = true;
                        break;
                    }
                    Transition::Ticked { .. } => changed = true,
                    _ => {}
                }
            }
        }

        if let Some(pending) = &mut self.pending {
            if let Some(outcome) = pending.poll().cloned() {
                let wpm = pending.wpm();
                if outcome == ReportOutcome::Saved {
                    self.raise_local_best(wpm);
                }
                self.report_status = ReportStatus::Settled(outcome);
                self.pending = None;
                changed = true;
            }
        }

        changed
    }

    fn finish(&mut self, results: FinalResults) {
        self.ticker.cancel();
        self.state = AppState::Results;

        if let Some(reporter) = &self.reporter {
            self.pending = Some(reporter.report(results.metrics.net_wpm));
            self.report_status = ReportStatus::Saving;
        }
    }

    /// The reported score may belong to a test that was already replaced
    fn raise_local_best(&mut self, wpm: u32) {
        if let Some(profile) = self.profile.as_mut().filter(|p| p.logged_in) {
            profile.highest_wpm = Some(profile.highest_wpm.unwrap_or(0).max(wpm));
        }
    }

    pub fn open_leaderboard(&mut self) {
        self.return_to = self.state;
        self.state = AppState::Leaderboard;
        self.leaderboard = match &self.backend {
            None => LeaderboardView {
                entries: vec![],
                error: Some("no score backend configured".to_string()),
            },
            Some(backend) => match backend.leaderboard() {
                Ok(entries) => LeaderboardView {
                    entries,
                    error: None,
                },
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "could not load leaderboard");
                    LeaderboardView {
                        entries: vec![],
                        error: Some("leaderboard unavailable".to_string()),
                    }
                }
            },
        };
    }

    pub fn logout(&mut self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(err) = backend.logout() {
            warn!(error = %format!("{err:#}"), "logout failed");
        }
        self.load_profile();
    }

    /// Block until an in-flight report settles; used on shutdown
    pub fn settle_report(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.report_status = ReportStatus::Settled(pending.wait());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{LocalBackend, SaveStatus},
        language::Language,
        session::{Phase, SessionConfig},
        word_generator::WordSource,
    };
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(backend: Option<Arc<dyn ScoreBackend>>) -> App {
        let source = WordSource::seeded(Language::from_words("t", ["go"]), 5, 1);
        let config = SessionConfig {
            sequence_len: 5,
            ..SessionConfig::default()
        };
        App::new(TypingTest::new(config, source), backend)
    }

    fn type_keys(app: &mut App, s: &str, now: Instant) {
        for c in s.chars() {
            app.on_key(key(KeyCode::Char(c)), now);
        }
    }

    fn wait_settled(app: &mut App, now: Instant) {
        for _ in 0..200 {
            app.on_poll(now);
            if matches!(app.report_status, ReportStatus::Settled(_)) {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("report never settled");
    }

    #[test]
    fn test_starts_idle() {
        let app = app_with(None);
        assert_eq!(app.state, AppState::Idle);
        assert_eq!(app.test.phase(), Phase::Idle);
        assert_eq!(app.report_status, ReportStatus::Disabled);
    }

    #[test]
    fn test_enter_starts_and_typing_arms_ticker() {
        let mut app = app_with(None);
        let t0 = Instant::now();

        app.on_key(key(KeyCode::Enter), t0);
        assert_eq!(app.state, AppState::Typing);
        assert!(!app.ticker.is_armed());

        // idle polls before the first key do not count down
        app.on_poll(t0 + Duration::from_secs(3));
        assert_eq!(app.test.state().time_left, 60);

        type_keys(&mut app, "g", t0);
        assert!(app.ticker.is_armed());
        app.on_poll(t0 + Duration::from_secs(2));
        assert_eq!(app.test.state().time_left, 58);
    }

    #[test]
    fn test_tab_refreshes_and_disarms() {
        let mut app = app_with(None);
        let t0 = Instant::now();
        app.start();
        type_keys(&mut app, "go ", t0);
        app.on_poll(t0 + Duration::from_secs(15));
        assert_eq!(app.test.state().time_left, 45);

        app.on_key(key(KeyCode::Tab), t0 + Duration::from_secs(15));

        assert!(!app.ticker.is_armed());
        let state = app.test.state();
        assert_eq!(state.time_left, 60);
        assert_eq!(state.committed_words, 0);
        assert!(!state.timer_armed);
        assert_eq!(app.state, AppState::Typing);
    }

    #[test]
    fn test_countdown_finishes_and_reports() {
        let local = Arc::new(LocalBackend::in_memory("ada").unwrap());
        let mut app = app_with(Some(local.clone()));
        app.load_profile();
        let t0 = Instant::now();

        app.start();
        type_keys(&mut app, "go go go go go ", t0);
        assert!(app.on_poll(t0 + Duration::from_secs(61)));

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.test.phase(), Phase::Finished);
        assert!(!app.ticker.is_armed());
        let results = *app.test.results().unwrap();
        // 10 correct chars over 60s = 2 wpm
        assert_eq!(results.metrics.net_wpm, 2);

        wait_settled(&mut app, t0 + Duration::from_secs(61));
        assert_eq!(app.report_status, ReportStatus::Settled(ReportOutcome::Saved));
        assert_eq!(local.highest_wpm("ada").unwrap(), Some(2));
        assert_eq!(app.profile.as_ref().and_then(|p| p.highest_wpm), Some(2));
    }

    /// Local store whose saves land only after a delay
    struct SlowSave {
        inner: LocalBackend,
        delay: Duration,
    }

    impl ScoreBackend for SlowSave {
        fn me(&self) -> anyhow::Result<Profile> {
            self.inner.me()
        }

        fn save_score(&self, wpm: u32) -> anyhow::Result<SaveStatus> {
            std::thread::sleep(self.delay);
            self.inner.save_score(wpm)
        }

        fn leaderboard(&self) -> anyhow::Result<Vec<LeaderboardEntry>> {
            self.inner.leaderboard()
        }

        fn logout(&self) -> anyhow::Result<()> {
            self.inner.logout()
        }
    }

    #[test]
    fn test_late_save_raises_best_after_restart() {
        let slow = Arc::new(SlowSave {
            inner: LocalBackend::in_memory("ada").unwrap(),
            delay: Duration::from_millis(50),
        });
        let mut app = app_with(Some(slow));
        app.load_profile();
        let t0 = Instant::now();

        app.start();
        type_keys(&mut app, "go go go go go ", t0);
        app.on_poll(t0 + Duration::from_secs(61));
        assert_eq!(app.report_status, ReportStatus::Saving);

        // next test starts before the save answers
        app.on_key(key(KeyCode::Enter), t0 + Duration::from_secs(61));
        assert!(app.test.results().is_none());

        wait_settled(&mut app, t0 + Duration::from_secs(61));
        assert_eq!(app.report_status, ReportStatus::Settled(ReportOutcome::Saved));
        assert_eq!(app.profile.as_ref().and_then(|p| p.highest_wpm), Some(2));
    }

    #[test]
    fn test_results_shown_without_backend() {
        let mut app = app_with(None);
        let t0 = Instant::now();
        app.start();
        type_keys(&mut app, "g", t0);
        app.on_poll(t0 + Duration::from_secs(60));

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.report_status, ReportStatus::Disabled);
    }

    #[test]
    fn test_keys_after_finish_do_not_type() {
        let mut app = app_with(None);
        let t0 = Instant::now();
        app.start();
        type_keys(&mut app, "g", t0);
        app.on_poll(t0 + Duration::from_secs(60));

        let before = app.test.state().clone();
        type_keys(&mut app, "go", t0);
        assert_eq!(app.test.state(), &before);
    }

    #[test]
    fn test_leaderboard_screen_round_trip() {
        let local = Arc::new(LocalBackend::in_memory("ada").unwrap());
        local.record("bob", 90).unwrap();
        local.record("ada", 40).unwrap();
        let mut app = app_with(Some(local));
        let now = Instant::now();

        app.on_key(key(KeyCode::Char('l')), now);
        assert_eq!(app.state, AppState::Leaderboard);
        assert_eq!(app.leaderboard.entries.len(), 2);
        assert_eq!(app.leaderboard.entries[0].username, "bob");

        app.on_key(key(KeyCode::Char('b')), now);
        assert_eq!(app.state, AppState::Idle);
    }

    #[test]
    fn test_leaderboard_without_backend() {
        let mut app = app_with(None);
        app.open_leaderboard();
        assert!(app.leaderboard.entries.is_empty());
        assert!(app.leaderboard.error.is_some());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(None);
        let now = Instant::now();
        assert_eq!(app.on_key(key(KeyCode::Esc), now), Action::Quit);

        app.start();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.on_key(ctrl_c, now), Action::Quit);
        // ctrl+c never reaches the live buffer
        assert!(app.test.state().live_buffer.is_empty());
    }

    #[test]
    fn test_report_status_text() {
        assert_eq!(ReportStatus::Saving.describe(), "saving score...");
        assert_eq!(
            ReportStatus::Settled(ReportOutcome::Rejected(SaveStatus::Unauthorized)).describe(),
            "score not saved (Unauthorized)"
        );
        assert_eq!(
            ReportStatus::Settled(ReportOutcome::Failed("timeout".into())).describe(),
            "score not saved"
        );
    }
}
