mod ui;

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use eyetest::{
    app_dirs::AppDirs,
    config::{ConfigStore, Difficulty, FileConfigStore, Settings},
    controller::{Phase, RoundController, RoundOutcome},
    diagnosis::share_url,
    error::ConfigError,
    history::{ResultLog, SessionRecord},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    stimulus::SizePalette,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 100;
const MIN_LETTERS: usize = 2;
const MAX_TIME_LIMIT_SECS: u32 = 60;

/// terminal eye test: pick the largest or smallest letter, twenty rounds
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A visual acuity game. Each of the 20 rounds shows letters of different sizes; odd rounds ask for the largest, even rounds for the smallest. Your score picks a diagnosis."
)]
pub struct Cli {
    /// number of letters shown per round
    #[clap(short = 'n', long)]
    letters: Option<usize>,

    /// seconds allowed per round
    #[clap(short = 't', long)]
    time_limit: Option<u32>,

    /// difficulty label (recorded, does not change the game)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// use the dark color scheme
    #[clap(long, conflicts_with = "light_mode")]
    dark_mode: bool,

    /// use the light color scheme
    #[clap(long)]
    light_mode: bool,

    /// seed for the letter generator, for repeatable sessions
    #[clap(long)]
    seed: Option<u64>,

    /// read and save settings at this path instead of the user config dir
    #[clap(long)]
    config: Option<PathBuf>,

    /// do not record results in the history log
    #[clap(long)]
    no_history: bool,

    /// log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Overlay command line values on stored settings
    fn apply_to(&self, stored: Settings) -> Settings {
        let mut settings = stored;
        if let Some(n) = self.letters {
            settings.num_letters = n;
        }
        if let Some(secs) = self.time_limit {
            settings.time_limit_secs = secs;
        }
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        if self.dark_mode {
            settings.dark_mode = true;
        }
        if self.light_mode {
            settings.dark_mode = false;
        }
        settings
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Welcome,
    Settings,
    Test,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsField {
    DarkMode,
    Difficulty,
    NumLetters,
    TimeLimit,
}

impl SettingsField {
    pub const ALL: [SettingsField; 4] = [
        SettingsField::DarkMode,
        SettingsField::Difficulty,
        SettingsField::NumLetters,
        SettingsField::TimeLimit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::DarkMode => "Dark mode",
            SettingsField::Difficulty => "Difficulty",
            SettingsField::NumLetters => "Letters per round",
            SettingsField::TimeLimit => "Seconds per round",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Edits a copy of the settings until saved or discarded
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub draft: Settings,
    pub field: SettingsField,
    pub error: Option<String>,
}

impl SettingsForm {
    fn new(settings: &Settings) -> Self {
        Self {
            draft: settings.clone(),
            field: SettingsField::DarkMode,
            error: None,
        }
    }

    pub fn value_text(&self, field: SettingsField) -> String {
        match field {
            SettingsField::DarkMode => {
                let text = if self.draft.dark_mode { "on" } else { "off" };
                text.to_string()
            }
            SettingsField::Difficulty => self.draft.difficulty.to_string(),
            SettingsField::NumLetters => self.draft.num_letters.to_string(),
            SettingsField::TimeLimit => self.draft.time_limit_secs.to_string(),
        }
    }

    fn adjust(&mut self, forward: bool, max_letters: usize) {
        self.error = None;
        let draft = &mut self.draft;
        match self.field {
            SettingsField::DarkMode => draft.dark_mode = !draft.dark_mode,
            SettingsField::Difficulty => {
                draft.difficulty = if forward {
                    draft.difficulty.next()
                } else {
                    draft.difficulty.prev()
                }
            }
            SettingsField::NumLetters => {
                let n = if forward {
                    draft.num_letters.saturating_add(1)
                } else {
                    draft.num_letters.saturating_sub(1)
                };
                draft.num_letters = n.clamp(MIN_LETTERS, max_letters.max(MIN_LETTERS));
            }
            SettingsField::TimeLimit => {
                let secs = if forward {
                    draft.time_limit_secs.saturating_add(1)
                } else {
                    draft.time_limit_secs.saturating_sub(1)
                };
                draft.time_limit_secs = secs.clamp(1, MAX_TIME_LIMIT_SECS);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Control {
    Continue,
    Quit,
}

pub struct App {
    pub settings: Settings,
    pub controller: RoundController<StdRng>,
    pub state: AppState,
    pub cursor: usize,
    pub last_outcome: Option<RoundOutcome>,
    pub settings_form: SettingsForm,
    pub previous_best: Option<f64>,
    pub share_notice: Option<String>,
    store: Box<dyn ConfigStore>,
    history: Option<ResultLog>,
    seed: Option<u64>,
}

impl App {
    pub fn new(
        settings: Settings,
        store: Box<dyn ConfigStore>,
        history: Option<ResultLog>,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let controller = RoundController::new(settings.clone(), Self::rng(seed))?;
        Ok(Self {
            settings_form: SettingsForm::new(&settings),
            settings,
            controller,
            state: AppState::Welcome,
            cursor: 0,
            last_outcome: None,
            previous_best: None,
            share_notice: None,
            store,
            history,
            seed,
        })
    }

    fn rng(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn start_test(&mut self) {
        self.controller.start_session();
        self.cursor = 0;
        self.last_outcome = None;
        self.share_notice = None;
        self.state = AppState::Test;
    }

    pub fn on_tick(&mut self, dt: Duration) {
        if self.state != AppState::Test {
            return;
        }
        if let Some(outcome) = self.controller.advance(dt) {
            self.after_round(outcome);
        }
    }

    pub fn select(&mut self, index: usize) {
        if self.state != AppState::Test {
            return;
        }
        if let Some(outcome) = self.controller.select_index(index) {
            self.after_round(outcome);
        }
    }

    fn after_round(&mut self, outcome: RoundOutcome) {
        self.last_outcome = Some(outcome);
        self.cursor = 0;
        if self.controller.phase() == Phase::Finished {
            self.finish_session();
        }
    }

    fn finish_session(&mut self) {
        self.state = AppState::Results;
        let (Some(log), Some(result)) = (&self.history, self.controller.session_result()) else {
            return;
        };
        self.previous_best = match log.best_percentage() {
            Ok(best) => best,
            Err(e) => {
                tracing::warn!(path = %log.path().display(), "cannot read history: {e}");
                None
            }
        };
        let record = SessionRecord::new(result, &self.settings, chrono::Local::now());
        if let Err(e) = log.append(&record) {
            tracing::warn!(path = %log.path().display(), "cannot record result: {e}");
        }
    }

    pub fn open_settings(&mut self) {
        self.settings_form = SettingsForm::new(&self.settings);
        self.state = AppState::Settings;
    }

    /// Validates and persists the draft; stays on the form if it is rejected.
    pub fn save_settings(&mut self) {
        let draft = self.settings_form.draft.clone();
        let controller = match RoundController::new(draft.clone(), Self::rng(self.seed)) {
            Ok(controller) => controller,
            Err(e) => {
                self.settings_form.error = Some(e.to_string());
                return;
            }
        };
        if let Err(e) = self.store.save(&draft) {
            tracing::warn!("cannot save settings: {e}");
        }
        self.controller = controller;
        self.settings = draft;
        self.state = AppState::Welcome;
    }

    pub fn share(&mut self) {
        self.share_with(Browser::is_available(), |url| webbrowser::open(url));
    }

    /// Without a browser the share text is shown on the results screen instead.
    fn share_with<F>(&mut self, browser_available: bool, open: F)
    where
        F: FnOnce(&str) -> io::Result<()>,
    {
        let Some(result) = self.controller.session_result() else {
            return;
        };
        let url = share_url(result);
        let notice = if !browser_available {
            Some(result.share_text())
        } else if let Err(e) = open(&url) {
            tracing::warn!("cannot open browser: {e}");
            Some(url)
        } else {
            None
        };
        self.share_notice = notice;
    }

    fn stimulus_count(&self) -> usize {
        self.controller.round().map_or(0, |r| r.stimuli.len())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        if is_interrupt(&key) {
            return Control::Quit;
        }

        match self.state {
            AppState::Welcome => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') => self.start_test(),
                KeyCode::Char('c') => self.open_settings(),
                _ => {}
            },
            AppState::Settings => {
                let max_letters = self.controller.palette().len();
                match key.code {
                    KeyCode::Esc => self.state = AppState::Welcome,
                    KeyCode::Enter => self.save_settings(),
                    KeyCode::Up => self.settings_form.field = self.settings_form.field.prev(),
                    KeyCode::Down | KeyCode::Tab => {
                        self.settings_form.field = self.settings_form.field.next()
                    }
                    KeyCode::Left => self.settings_form.adjust(false, max_letters),
                    KeyCode::Right | KeyCode::Char(' ') => {
                        self.settings_form.adjust(true, max_letters)
                    }
                    _ => {}
                }
            }
            AppState::Test => {
                let n = self.stimulus_count();
                match key.code {
                    KeyCode::Esc => self.state = AppState::Welcome,
                    KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
                    KeyCode::Right => {
                        if self.cursor + 1 < n {
                            self.cursor += 1;
                        }
                    }
                    KeyCode::Home => self.cursor = 0,
                    KeyCode::End => self.cursor = n.saturating_sub(1),
                    KeyCode::Enter | KeyCode::Char(' ') => self.select(self.cursor),
                    KeyCode::Char(c) => {
                        if let Some(digit) = c.to_digit(10).filter(|d| *d > 0) {
                            self.select(digit as usize - 1);
                        }
                    }
                    _ => {}
                }
            }
            AppState::Results => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                KeyCode::Char('t') => self.share(),
                KeyCode::Char('r') => self.state = AppState::Welcome,
                KeyCode::Char('n') => self.start_test(),
                _ => {}
            },
        }
        Control::Continue
    }

    /// Runs one loop step: elapsed time first, then the event that woke the loop.
    ///
    /// If the elapsed time ends a round, the event was aimed at a screen that is
    /// already gone, so key and mouse input from this step is dropped.
    fn handle_event(&mut self, event: GameEvent, dt: Duration, area: Rect) -> Control {
        let shown = (self.state, self.controller.round_index());
        self.on_tick(dt);
        let round_ended = shown.0 == AppState::Test
            && (self.state, self.controller.round_index()) != shown;

        match event {
            GameEvent::Tick | GameEvent::Resize => Control::Continue,
            GameEvent::Key(key) if round_ended => {
                if is_interrupt(&key) {
                    Control::Quit
                } else {
                    tracing::debug!(?key, "dropping key for a round that already ended");
                    Control::Continue
                }
            }
            GameEvent::Key(key) => self.handle_key(key),
            GameEvent::Mouse(_) if round_ended => Control::Continue,
            GameEvent::Mouse(mouse) => {
                self.handle_mouse(mouse, area);
                Control::Continue
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.state != AppState::Test {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let layout = ui::test_layout(area);
            if let Some(index) =
                ui::slot_at(layout.stimuli, self.stimulus_count(), mouse.column, mouse.row)
            {
                self.cursor = index;
                self.select(index);
            }
        }
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && key.code == KeyCode::Char('c')
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&AppDirs::log_path(), cli.verbose) {
        eprintln!("logging disabled: {e}");
    }

    let store = cli.config_store();
    let settings = cli.apply_to(store.load());
    if let Err(e) = settings.validate(&SizePalette::default()) {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let history = (!cli.no_history).then(|| ResultLog::new(AppDirs::history_path()));
    let mut app = App::new(settings, Box::new(store), history, cli.seed)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut last = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let event = runner.step();

        // wall-clock time drives the countdown, whatever woke us up
        let now = Instant::now();
        let dt = now.duration_since(last);
        last = now;

        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        if app.handle_event(event, dt, area) == Control::Quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use eyetest::diagnosis::Diagnosis;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::{tempdir, TempDir};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(dir: &TempDir, settings: Settings) -> App {
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let history = ResultLog::new(dir.path().join("results.csv"));
        App::new(settings, Box::new(store), Some(history), Some(7)).unwrap()
    }

    fn answer_correctly(app: &mut App) {
        let idx = app.controller.round().unwrap().correct_index().unwrap();
        app.select(idx);
    }

    fn screen_text(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui::draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["eyetest"]);
        assert_eq!(cli.letters, None);
        assert_eq!(cli.time_limit, None);
        assert_eq!(cli.difficulty, None);
        assert!(!cli.dark_mode);
        assert!(!cli.light_mode);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.apply_to(Settings::default()), Settings::default());
    }

    #[test]
    fn test_cli_overrides_stored_settings() {
        let cli = Cli::parse_from([
            "eyetest", "-n", "8", "-t", "4", "-d", "hard", "--dark-mode", "-vv",
        ]);
        let stored = Settings {
            num_letters: 3,
            ..Settings::default()
        };
        let settings = cli.apply_to(stored);
        assert_eq!(settings.num_letters, 8);
        assert_eq!(settings.time_limit_secs, 4);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(settings.dark_mode);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_light_mode_turns_off_stored_dark_mode() {
        let cli = Cli::parse_from(["eyetest", "--light-mode"]);
        let stored = Settings {
            dark_mode: true,
            ..Settings::default()
        };
        assert!(!cli.apply_to(stored).dark_mode);
    }

    #[test]
    fn test_cli_rejects_conflicting_modes() {
        assert!(Cli::try_parse_from(["eyetest", "--dark-mode", "--light-mode"]).is_err());
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "eyetest",
            "--letters",
            "12",
            "--time-limit",
            "30",
            "--seed",
            "9",
            "--config",
            "/tmp/eyetest.json",
            "--no-history",
        ]);
        assert_eq!(cli.letters, Some(12));
        assert_eq!(cli.time_limit, Some(30));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/eyetest.json")));
        assert!(cli.no_history);
    }

    #[test]
    fn test_app_rejects_invalid_settings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let settings = Settings {
            num_letters: 30,
            ..Settings::default()
        };
        assert!(App::new(settings, Box::new(store), None, None).is_err());
    }

    #[test]
    fn test_welcome_to_test_to_results() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        assert_eq!(app.state, AppState::Welcome);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Test);
        assert_eq!(app.controller.round_index(), 1);

        for _ in 0..20 {
            answer_correctly(&mut app);
        }
        assert_eq!(app.state, AppState::Results);
        let result = app.controller.session_result().unwrap();
        assert_eq!(result.score, 20);
        assert_eq!(result.diagnosis, Diagnosis::Excellent);

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Welcome);
    }

    #[test]
    fn test_finished_session_is_recorded() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());

        app.start_test();
        for _ in 0..20 {
            answer_correctly(&mut app);
        }
        assert_eq!(app.previous_best, None);

        app.start_test();
        for _ in 0..20 {
            app.select(usize::MAX);
            app.on_tick(Duration::from_secs(10));
        }
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.previous_best, Some(100.0));

        let records = ResultLog::new(dir.path().join("results.csv")).load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].score, 0);
    }

    #[test]
    fn test_digit_keys_select_letters() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();

        app.handle_key(key(KeyCode::Char('0')));
        assert_eq!(app.controller.round_index(), 1);

        app.handle_key(key(KeyCode::Char('9')));
        assert_eq!(app.controller.round_index(), 1);

        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.controller.round_index(), 2);
        assert!(app.last_outcome.is_some());
    }

    #[test]
    fn test_cursor_moves_and_selects() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        let target = app.controller.round().unwrap().correct_index().unwrap();

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.cursor, 0);
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Right));
        }
        assert_eq!(app.cursor, 4);
        app.handle_key(key(KeyCode::Home));
        for _ in 0..target {
            app.handle_key(key(KeyCode::Right));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.last_outcome, Some(RoundOutcome::Correct));
        assert_eq!(app.controller.score(), 1);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        app.handle_key(release);
        assert_eq!(app.state, AppState::Welcome);
    }

    #[test]
    fn test_ticks_time_out_rounds_only_during_test() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            time_limit_secs: 2,
            ..Settings::default()
        };
        let mut app = test_app(&dir, settings);

        app.on_tick(Duration::from_secs(5));
        assert_eq!(app.controller.phase(), Phase::Idle);

        app.start_test();
        app.on_tick(Duration::from_millis(1900));
        assert_eq!(app.controller.round_index(), 1);
        app.on_tick(Duration::from_millis(200));
        assert_eq!(app.controller.round_index(), 2);
        assert_eq!(app.last_outcome, Some(RoundOutcome::TimedOut));
    }

    #[test]
    fn test_key_in_the_step_a_round_times_out_is_dropped() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            time_limit_secs: 1,
            ..Settings::default()
        };
        let mut app = test_app(&dir, settings);
        app.start_test();
        let area = Rect::new(0, 0, 100, 30);

        let control = app.handle_event(
            GameEvent::Key(key(KeyCode::Char('1'))),
            Duration::from_millis(1050),
            area,
        );
        assert_eq!(control, Control::Continue);
        assert_eq!(app.controller.round_index(), 2);
        assert_eq!(app.controller.outcomes(), &[RoundOutcome::TimedOut]);

        // the next key lands on the round now on screen
        app.handle_event(GameEvent::Key(key(KeyCode::Char('1'))), Duration::ZERO, area);
        assert_eq!(app.controller.round_index(), 3);
        assert_eq!(app.controller.outcomes().len(), 2);
    }

    #[test]
    fn test_click_in_the_step_a_round_times_out_is_dropped() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            time_limit_secs: 1,
            ..Settings::default()
        };
        let mut app = test_app(&dir, settings);
        app.start_test();
        let area = Rect::new(0, 0, 100, 30);
        let slot = ui::slot_rect(ui::test_layout(area).stimuli, 5, 0);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: slot.x + slot.width / 2,
            row: slot.y + slot.height / 2,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_event(GameEvent::Mouse(click), Duration::from_secs(1), area);
        assert_eq!(app.controller.outcomes(), &[RoundOutcome::TimedOut]);
    }

    #[test]
    fn test_key_without_timeout_is_handled() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        let area = Rect::new(0, 0, 100, 30);

        app.handle_event(
            GameEvent::Key(key(KeyCode::Char('1'))),
            Duration::from_millis(300),
            area,
        );
        assert_eq!(app.controller.round_index(), 2);
        assert_ne!(app.last_outcome, Some(RoundOutcome::TimedOut));
    }

    #[test]
    fn test_ctrl_c_quits_even_when_round_times_out() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            time_limit_secs: 1,
            ..Settings::default()
        };
        let mut app = test_app(&dir, settings);
        app.start_test();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let control = app.handle_event(
            GameEvent::Key(ctrl_c),
            Duration::from_secs(1),
            Rect::new(0, 0, 100, 30),
        );
        assert_eq!(control, Control::Quit);
    }

    #[test]
    fn test_escape_abandons_test() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Control::Continue);
        assert_eq!(app.state, AppState::Welcome);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Control::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), Control::Quit);
    }

    #[test]
    fn test_settings_form_edits_and_saves() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());

        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.state, AppState::Settings);

        // dark mode
        app.handle_key(key(KeyCode::Right));
        // difficulty
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Right));
        // letters
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        // time limit
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Left));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Welcome);

        let expected = Settings {
            dark_mode: true,
            difficulty: Difficulty::Hard,
            num_letters: 7,
            time_limit_secs: 9,
        };
        assert_eq!(app.settings, expected);
        assert_eq!(app.controller.settings(), &expected);

        let stored = FileConfigStore::with_path(dir.path().join("config.json")).load();
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_settings_escape_discards_draft() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.open_settings();
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Welcome);
        assert!(!app.settings.dark_mode);
    }

    #[test]
    fn test_settings_values_are_clamped() {
        let mut form = SettingsForm::new(&Settings::default());
        form.field = SettingsField::NumLetters;
        for _ in 0..50 {
            form.adjust(true, 20);
        }
        assert_eq!(form.draft.num_letters, 20);
        for _ in 0..50 {
            form.adjust(false, 20);
        }
        assert_eq!(form.draft.num_letters, MIN_LETTERS);

        form.field = SettingsField::TimeLimit;
        for _ in 0..100 {
            form.adjust(true, 20);
        }
        assert_eq!(form.draft.time_limit_secs, MAX_TIME_LIMIT_SECS);
        for _ in 0..100 {
            form.adjust(false, 20);
        }
        assert_eq!(form.draft.time_limit_secs, 1);
    }

    #[test]
    fn test_settings_field_cycle() {
        assert_eq!(SettingsField::TimeLimit.next(), SettingsField::DarkMode);
        assert_eq!(SettingsField::DarkMode.prev(), SettingsField::TimeLimit);
        for field in SettingsField::ALL {
            assert_eq!(field.next().prev(), field);
        }
    }

    #[test]
    fn test_mouse_click_selects_slot() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        let area = Rect::new(0, 0, 100, 30);
        let layout = ui::test_layout(area);
        let slot = ui::slot_rect(layout.stimuli, 5, 3);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: slot.x + slot.width / 2,
            row: slot.y + slot.height / 2,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(click, area);
        assert_eq!(app.controller.round_index(), 2);
        assert!(app.last_outcome.is_some());
    }

    #[test]
    fn test_mouse_click_outside_letters_is_ignored() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(click, Rect::new(0, 0, 100, 30));
        assert_eq!(app.controller.round_index(), 1);
    }

    #[test]
    fn test_ui_welcome_screen() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        let content = screen_text(&mut app, 80, 24);
        assert!(content.contains("Eye Test"));
    }

    #[test]
    fn test_ui_settings_screen() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.open_settings();
        let content = screen_text(&mut app, 80, 24);
        assert!(content.contains("Letters per round"));
    }

    #[test]
    fn test_ui_test_screen_in_both_modes() {
        for dark_mode in [false, true] {
            let dir = tempdir().unwrap();
            let settings = Settings {
                dark_mode,
                num_letters: 20,
                ..Settings::default()
            };
            let mut app = test_app(&dir, settings);
            app.start_test();
            let content = screen_text(&mut app, 120, 40);
            assert!(content.contains("LARGEST"));
            assert!(content.contains("Round 1/20"));
        }
    }

    #[test]
    fn test_ui_test_screen_tiny_terminal() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        // must not panic on degenerate sizes
        screen_text(&mut app, 10, 4);
        screen_text(&mut app, 1, 1);
    }

    #[test]
    fn test_ui_results_screen() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.start_test();
        for _ in 0..20 {
            answer_correctly(&mut app);
        }
        let content = screen_text(&mut app, 100, 30);
        assert!(content.contains("100.0%"));
        assert!(content.contains("Excellent"));
        assert!(!content.contains("on the Eye Test!"));
    }

    fn finished_app(dir: &TempDir) -> App {
        let mut app = test_app(dir, Settings::default());
        app.start_test();
        for _ in 0..20 {
            answer_correctly(&mut app);
        }
        app
    }

    #[test]
    fn test_share_without_browser_shows_text() {
        let dir = tempdir().unwrap();
        let mut app = finished_app(&dir);

        app.share_with(false, |_| panic!("no browser to open"));
        assert_eq!(
            app.share_notice.as_deref(),
            Some("I scored 100.0% on the Eye Test!")
        );
        let content = screen_text(&mut app, 100, 30);
        assert!(content.contains("I scored 100.0% on the Eye Test!"));

        app.start_test();
        assert_eq!(app.share_notice, None);
    }

    #[test]
    fn test_share_failure_shows_url() {
        let dir = tempdir().unwrap();
        let mut app = finished_app(&dir);

        app.share_with(true, |_| Err(io::Error::other("launch failed")));
        let notice = app.share_notice.clone().unwrap();
        assert!(notice.starts_with("https://twitter.com/intent/tweet?text="));
        let content = screen_text(&mut app, 120, 30);
        assert!(content.contains("https://twitter.com/intent/tweet"));
    }

    #[test]
    fn test_share_opens_browser() {
        let dir = tempdir().unwrap();
        let mut app = finished_app(&dir);
        let mut opened = None;

        app.share_with(true, |url| {
            opened = Some(url.to_string());
            Ok(())
        });
        assert!(opened.unwrap().contains("100.0%25"));
        assert_eq!(app.share_notice, None);
    }

    #[test]
    fn test_share_before_results_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut app = test_app(&dir, Settings::default());
        app.share_with(false, |_| panic!("nothing to share"));
        assert_eq!(app.share_notice, None);
    }
}
