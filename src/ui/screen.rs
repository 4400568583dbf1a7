use ratatui::Frame;

use crate::{
    ui::{render_results, render_test, render_welcome, settings::render_settings},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct WelcomeScreen;

impl Screen for WelcomeScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_welcome(app, area, f.buffer_mut());
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_settings(app, area, f.buffer_mut());
    }
}

/// Letters, countdown and cursor for the running round
pub struct TestScreen;

impl Screen for TestScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_test(app, area, f.buffer_mut());
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_results(app, area, f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Welcome => Box::new(WelcomeScreen),
        AppState::Settings => Box::new(SettingsScreen),
        AppState::Test => Box::new(TestScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
