//! Application state management and input handling.

use crate::session::EditorSession;
use crate::tracker::EditableField;
use crate::types::EpisodeType;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

use super::types::{Action, Column, Screen};

/// Application state for the TUI.
pub struct App {
    /// The editing session being displayed
    pub session: EditorSession,
    /// Current screen being displayed
    pub screen: Screen,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Row selection state for the episode table
    pub table_state: TableState,
    /// Selected column (index into [`Column::ALL`])
    pub selected_column: usize,
    /// Whether the cell edit popup is open
    pub edit_mode: bool,
    /// Text being typed into the cell edit popup
    pub edit_input: String,
    /// Episode filter input
    pub filter: String,
    /// Whether the filter input is focused
    pub filter_active: bool,
    /// Loading message
    pub loading_message: String,
    /// Aggregate status message shown in the footer
    pub status_message: Option<String>,
    /// Error message to display
    pub error_message: Option<String>,
    /// Whether we're showing the save confirmation dialog
    pub save_confirm_mode: bool,
    /// Whether we're showing the discard-and-refresh confirmation dialog
    pub refresh_confirm_mode: bool,
    /// Whether the help modal is shown
    pub show_help: bool,
    /// Whether the save progress modal is shown
    pub show_save_modal: bool,
    /// Current save index (1-based)
    pub save_current: usize,
    /// Total episodes in the running batch
    pub save_total: usize,
    /// Current save message
    pub save_message: String,
    /// Save activity log
    pub save_log: Vec<String>,
}

impl App {
    /// Create a new App around a session.
    pub fn new(session: EditorSession) -> Self {
        Self {
            session,
            screen: Screen::Loading,
            should_quit: false,
            table_state: TableState::default(),
            selected_column: 0,
            edit_mode: false,
            edit_input: String::new(),
            filter: String::new(),
            filter_active: false,
            loading_message: String::new(),
            status_message: None,
            error_message: None,
            save_confirm_mode: false,
            refresh_confirm_mode: false,
            show_help: false,
            show_save_modal: false,
            save_current: 0,
            save_total: 0,
            save_message: String::new(),
            save_log: Vec::new(),
        }
    }

    /// Set the app to loading state with a message.
    pub fn set_loading(&mut self, message: &str) {
        self.screen = Screen::Loading;
        self.loading_message = message.to_string();
    }

    /// Switch to the table screen, resetting the row selection.
    pub fn show_table(&mut self) {
        self.screen = Screen::Table;
        if self.session.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(0));
        }
    }

    /// Set an error message.
    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    /// Clear error message.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Set the footer status message.
    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Initialize and show the save progress modal.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of episodes in the batch
    pub fn start_save_modal(&mut self, total: usize) {
        self.show_save_modal = true;
        self.save_current = 0;
        self.save_total = total;
        self.save_message = String::new();
        self.save_log.clear();
    }

    /// Update the "N of Total" counter displayed in the modal.
    ///
    /// # Arguments
    ///
    /// * `current` - Current episode index (1-based)
    /// * `message` - Status message (e.g., "Saving \"Pilot\"...")
    pub fn update_save_progress(&mut self, current: usize, message: &str) {
        self.save_current = current;
        self.save_message = message.to_string();
    }

    /// Add an entry to the save activity log.
    ///
    /// The log is limited to the 10 most recent entries to prevent overflow.
    pub fn add_save_log(&mut self, entry: &str) {
        self.save_log.push(entry.to_string());
        if self.save_log.len() > 10 {
            self.save_log.remove(0);
        }
    }

    /// Close the save progress modal.
    pub fn close_save_modal(&mut self) {
        self.show_save_modal = false;
    }

    /// Indices into the session's episode list matching the filter.
    pub fn get_filtered_indices(&self) -> Vec<usize> {
        if self.filter.is_empty() {
            return (0..self.session.len()).collect();
        }

        let filter_lower = self.filter.to_lowercase();
        self.session
            .episodes()
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.title.to_lowercase().contains(&filter_lower) || e.id.contains(&self.filter)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// The currently selected column.
    pub fn selected_col(&self) -> Column {
        Column::ALL[self.selected_column]
    }

    /// Id of the episode under the cursor, honoring the filter.
    pub fn selected_episode_id(&self) -> Option<String> {
        let filtered = self.get_filtered_indices();
        let row = self.table_state.selected()?;
        let idx = *filtered.get(row)?;
        self.session.episodes().get(idx).map(|e| e.id.clone())
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        // Input is swallowed while a batch save runs
        if self.show_save_modal {
            return Action::None;
        }

        // Any key dismisses an error popup
        if self.error_message.is_some() {
            self.clear_error();
            return Action::None;
        }

        // Handle help modal
        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.edit_mode {
            return self.handle_edit_input(key);
        }

        if self.filter_active {
            return self.handle_filter_input(key);
        }

        if self.save_confirm_mode {
            return self.handle_save_confirm(key);
        }

        if self.refresh_confirm_mode {
            return self.handle_refresh_confirm(key);
        }

        // Toggle help
        if key.code == KeyCode::Char('?') {
            self.show_help = true;
            return Action::None;
        }

        match self.screen {
            Screen::Table => self.handle_table_input(key),
            Screen::Loading => {
                // Allow quit during loading
                if key.code == KeyCode::Char('q') {
                    self.should_quit = true;
                    return Action::Quit;
                }
                Action::None
            }
        }
    }

    fn handle_table_input(&mut self, key: KeyEvent) -> Action {
        // Status messages show until the next keypress
        self.status_message = None;

        let filtered_len = self.get_filtered_indices().len();

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.table_state.selected().unwrap_or(0);
                if i < filtered_len.saturating_sub(1) {
                    self.table_state.select(Some(i + 1));
                }
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.table_state.selected().unwrap_or(0);
                if i > 0 {
                    self.table_state.select(Some(i - 1));
                }
                Action::None
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                self.selected_column = (self.selected_column + 1) % Column::ALL.len();
                Action::None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected_column =
                    (self.selected_column + Column::ALL.len() - 1) % Column::ALL.len();
                Action::None
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                self.begin_edit();
                Action::None
            }
            KeyCode::Char('/') => {
                self.filter_active = true;
                Action::None
            }
            KeyCode::Char('s') => {
                if self.session.has_pending() {
                    self.save_confirm_mode = true;
                } else {
                    self.set_status("No pending changes to save");
                }
                Action::None
            }
            KeyCode::Char('r') => {
                if self.session.has_pending() {
                    self.refresh_confirm_mode = true;
                    Action::None
                } else {
                    Action::Refresh
                }
            }
            KeyCode::Esc => {
                if !self.filter.is_empty() {
                    self.filter.clear();
                    self.table_state.select(Some(0));
                }
                Action::None
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                Action::Quit
            }
            _ => Action::None,
        }
    }

    /// Open the edit popup for the selected cell, or apply the edit
    /// directly for cycle/toggle columns.
    fn begin_edit(&mut self) {
        let Some(id) = self.selected_episode_id() else {
            return;
        };

        let column = self.selected_col();
        let Some(field) = column.field() else {
            self.set_status("The status field is server-controlled");
            return;
        };

        match field {
            EditableField::EpisodeType => self.cycle_episode_type(&id),
            EditableField::ContentExplicit => self.toggle_explicit(&id),
            _ => {
                self.edit_input = self.session.current_value(&id, field).unwrap_or_default();
                self.edit_mode = true;
            }
        }
    }

    fn cycle_episode_type(&mut self, id: &str) {
        let current = self
            .session
            .current_value(id, EditableField::EpisodeType)
            .and_then(|v| EpisodeType::from_name(&v))
            .unwrap_or_default();
        self.session
            .record_edit(id, EditableField::EpisodeType, current.next().as_str());
    }

    fn toggle_explicit(&mut self, id: &str) {
        let current = self
            .session
            .current_value(id, EditableField::ContentExplicit)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let flipped = if current { "false" } else { "true" };
        self.session
            .record_edit(id, EditableField::ContentExplicit, flipped);
    }

    fn handle_edit_input(&mut self, key: KeyEvent) -> Action {
        let numeric = self
            .selected_col()
            .field()
            .map(|f| f.is_numeric())
            .unwrap_or(false);

        match key.code {
            KeyCode::Enter => {
                if let (Some(id), Some(field)) =
                    (self.selected_episode_id(), self.selected_col().field())
                {
                    let value = self.edit_input.clone();
                    self.session.record_edit(&id, field, &value);
                }
                self.edit_mode = false;
                self.edit_input.clear();
                Action::None
            }
            KeyCode::Char(c) => {
                if !numeric || c.is_ascii_digit() {
                    self.edit_input.push(c);
                }
                Action::None
            }
            KeyCode::Backspace => {
                self.edit_input.pop();
                Action::None
            }
            KeyCode::Esc => {
                self.edit_mode = false;
                self.edit_input.clear();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_filter_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.filter_active = false;
                if !self.get_filtered_indices().is_empty() {
                    self.table_state.select(Some(0));
                }
                Action::None
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.table_state.select(Some(0));
                Action::None
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.table_state.select(Some(0));
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_save_confirm(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.save_confirm_mode = false;
                Action::SaveAll
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.save_confirm_mode = false;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_refresh_confirm(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.refresh_confirm_mode = false;
                Action::Refresh
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.refresh_confirm_mode = false;
                Action::None
            }
            _ => Action::None,
        }
    }
}
