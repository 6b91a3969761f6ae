//! Key handling for the dashboard, kept free of terminal I/O

use std::time::SystemTime;

use crossterm::event::{KeyCode, KeyModifiers};

use statuslite_core::model::{NewService, ServiceRecord};
use statuslite_core::reducer::Action;

/// Cards per row in grid view
pub const GRID_COLUMNS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    fn toggle(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::List,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Name,
    Description,
    Url,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Description, Field::Url];

    fn next(self) -> Self {
        match self {
            Field::Name => Field::Description,
            Field::Description => Field::Url,
            Field::Url => Field::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Name => Field::Url,
            Field::Description => Field::Name,
            Field::Url => Field::Description,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Description => "Description",
            Field::Url => "URL",
        }
    }
}

/// The "add monitor" form
#[derive(Clone, Debug, Default)]
pub struct AddForm {
    pub name: String,
    pub description: String,
    pub url: String,
    pub focus: Field,
    pub error: Option<String>,
}

impl AddForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Description => &self.description,
            Field::Url => &self.url,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Name => &mut self.name,
            Field::Description => &mut self.description,
            Field::Url => &mut self.url,
        }
    }

    fn optional(value: &str) -> Option<String> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn submit(&mut self) -> Option<NewService> {
        if self.name.trim().is_empty() {
            self.error = Some("Name is required".into());
            self.focus = Field::Name;
            return None;
        }
        Some(NewService {
            name: self.name.trim().to_string(),
            description: Self::optional(&self.description),
            url: Self::optional(&self.url),
        })
    }
}

#[derive(Clone, Debug)]
pub enum Modal {
    Add(AddForm),
    ConfirmDelete { id: String, name: String },
    Help,
}

/// What the loop should do after a key press
#[derive(Debug)]
pub enum Intent {
    None,
    Quit,
    Dispatch(Action),
    /// Start a background "check all"
    CheckAll,
}

#[derive(Clone, Debug)]
pub struct Flash {
    pub text: String,
    pub error: bool,
}

#[derive(Debug, Default)]
pub struct UiState {
    pub admin: bool,
    pub view: ViewMode,
    pub selected: usize,
    pub modal: Option<Modal>,
    /// A check batch is in flight
    pub checking: bool,
    pub last_checked: Option<SystemTime>,
    pub flash: Option<Flash>,
}

impl UiState {
    pub fn flash_ok(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            error: false,
        });
    }

    pub fn flash_err(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            error: true,
        });
    }

    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn finish_check(&mut self, at: SystemTime) {
        self.checking = false;
        self.last_checked = Some(at);
    }

    /// The batch died without results; `last_checked` keeps its old value
    pub fn abort_check(&mut self, reason: impl Into<String>) {
        self.checking = false;
        self.flash_err(reason);
    }

    fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    fn step(&mut self) -> isize {
        match self.view {
            ViewMode::List => 1,
            ViewMode::Grid => GRID_COLUMNS as isize,
        }
    }

    pub fn handle_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        records: &[ServiceRecord],
    ) -> Intent {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Intent::Quit;
        }

        match self.modal.take() {
            Some(Modal::Help) => {
                if !matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.modal = Some(Modal::Help);
                }
                Intent::None
            }
            Some(Modal::ConfirmDelete { id, name }) => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Intent::Dispatch(Action::Remove { id })
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Intent::None,
                _ => {
                    self.modal = Some(Modal::ConfirmDelete { id, name });
                    Intent::None
                }
            },
            Some(Modal::Add(form)) => self.handle_form_key(form, code, modifiers),
            None => self.handle_main_key(code, records),
        }
    }

    fn handle_form_key(&mut self, mut form: AddForm, code: KeyCode, modifiers: KeyModifiers) -> Intent {
        match code {
            KeyCode::Esc => return Intent::None,
            KeyCode::Enter => {
                if let Some(service) = form.submit() {
                    return Intent::Dispatch(Action::Add(service));
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                form.focused_mut().push(c);
                form.error = None;
            }
            _ => {}
        }
        self.modal = Some(Modal::Add(form));
        Intent::None
    }

    fn handle_main_key(&mut self, code: KeyCode, records: &[ServiceRecord]) -> Intent {
        let len = records.len();
        match code {
            KeyCode::Char('q') => return Intent::Quit,
            KeyCode::Char('?') => self.modal = Some(Modal::Help),
            KeyCode::Char('a') => {
                self.admin = !self.admin;
                self.flash_ok(if self.admin {
                    "admin mode on"
                } else {
                    "admin mode off"
                });
            }
            KeyCode::Char('v') => self.view = self.view.toggle(),
            KeyCode::Char('c') => {
                if self.checking {
                    return Intent::None;
                }
                self.checking = true;
                return Intent::CheckAll;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let step = self.step();
                self.move_by(-step, len);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let step = self.step();
                self.move_by(step, len);
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_by(-1, len),
            KeyCode::Right | KeyCode::Char('l') => self.move_by(1, len),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected = len.saturating_sub(1),
            KeyCode::Char('n') | KeyCode::Char('d') | KeyCode::Char(' ') if !self.admin => {
                self.flash_err("press a to enter admin mode");
            }
            KeyCode::Char('n') => self.modal = Some(Modal::Add(AddForm::default())),
            KeyCode::Char('d') => {
                if let Some(record) = records.get(self.selected) {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: record.id.clone(),
                        name: record.name.clone(),
                    });
                }
            }
            KeyCode::Char(' ') => {
                if let Some(record) = records.get(self.selected) {
                    return Intent::Dispatch(Action::Cycle {
                        id: record.id.clone(),
                    });
                }
            }
            _ => {}
        }
        Intent::None
    }
}
