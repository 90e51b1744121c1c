//! Scripted in-memory stand-in for the Solteq Sund client. It models the
//! application's observable phases (login window, main window, patient
//! search, print dialog) with configurable appearance delays, driven by the
//! same inputs the real client reacts to.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::archive::DocumentArchive;
use crate::backend::{Control, ControlImpl, UiBackend};
use crate::descriptor::{ControlDescriptor, ControlKind};
use crate::errors::AutomationError;

pub const VALID_USER: &str = "svc-robot";
pub const VALID_PASSWORD: &str = "hunter2";

#[derive(Clone)]
pub struct FakeSundConfig {
    /// Delay from launch until the login window renders.
    pub login_window_delay: Duration,
    /// Delay from credential submission until the main window renders.
    pub main_window_delay: Duration,
    /// Delay from clicking the store button until the dialog closes.
    pub store_delay: Duration,
    /// When set, the store button does nothing and the dialog never closes.
    pub dialog_sticks: bool,
    /// Name of the one patient the search can find, as listed in results.
    pub patient: Option<String>,
}

impl Default for FakeSundConfig {
    fn default() -> Self {
        Self {
            login_window_delay: Duration::from_secs(1),
            main_window_delay: Duration::from_secs(2),
            store_delay: Duration::from_secs(2),
            dialog_sticks: false,
            patient: Some("010101-0101".to_string()),
        }
    }
}

#[derive(Default)]
struct FakeState {
    launched_at: Option<Instant>,
    typed_username: String,
    typed_password: String,
    main_visible_at: Option<Instant>,
    search_visible: bool,
    search_text: String,
    results: Vec<String>,
    open_tab: Option<String>,
    dialog_open: bool,
    dialog_closes_at: Option<Instant>,
}

impl FakeState {
    fn login_window_visible(&self, config: &FakeSundConfig) -> bool {
        match self.launched_at {
            Some(at) => Instant::now() >= at + config.login_window_delay,
            None => false,
        }
    }

    fn main_window_visible(&self) -> bool {
        matches!(self.main_visible_at, Some(at) if Instant::now() >= at)
    }

    fn dialog_visible(&self) -> bool {
        if !self.dialog_open {
            return false;
        }
        match self.dialog_closes_at {
            Some(at) => Instant::now() < at,
            None => true,
        }
    }
}

pub struct FakeSund {
    config: FakeSundConfig,
    state: Arc<Mutex<FakeState>>,
    resolve_attempts: AtomicUsize,
}

impl FakeSund {
    pub fn new(config: FakeSundConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(FakeState::default())),
            resolve_attempts: AtomicUsize::new(0),
        }
    }

    /// How many single probes the backend has answered.
    pub fn resolve_attempts(&self) -> usize {
        self.resolve_attempts.load(Ordering::SeqCst)
    }

    fn control(&self, id: FakeControlId) -> Control {
        Control::new(Box::new(FakeControl {
            state: Arc::clone(&self.state),
            config: self.config.clone(),
            id,
        }))
    }
}

impl UiBackend for FakeSund {
    fn launch(&self, _app_path: &Path) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        state.launched_at = Some(Instant::now());
        Ok(())
    }

    fn try_resolve(
        &self,
        descriptor: &ControlDescriptor,
        _scope: Option<&Control>,
    ) -> Result<Option<Control>, AutomationError> {
        self.resolve_attempts.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let automation_id = descriptor.attributes.get("AutomationId").cloned();
        let name = descriptor.attributes.get("Name").cloned();

        let id = match (descriptor.kind, automation_id.as_deref()) {
            (ControlKind::Window, Some("frmLogin"))
                if state.login_window_visible(&self.config) =>
            {
                Some(FakeControlId::LoginWindow)
            }
            (ControlKind::Edit, Some("textBoxLogin"))
                if state.login_window_visible(&self.config) =>
            {
                Some(FakeControlId::UsernameBox)
            }
            (ControlKind::Edit, Some("textBoxPassword"))
                if state.login_window_visible(&self.config) =>
            {
                Some(FakeControlId::PasswordBox)
            }
            (ControlKind::Window, Some("frmClient")) if state.main_window_visible() => {
                Some(FakeControlId::MainWindow)
            }
            (ControlKind::Edit, Some("TextBoxChildCPR")) if state.search_visible => {
                Some(FakeControlId::SearchBox)
            }
            (ControlKind::Window, Some("frmViewBase")) if state.dialog_visible() => {
                Some(FakeControlId::PrintDialog)
            }
            (ControlKind::Pane, Some("buttonPrintToDocumentStore"))
                if state.dialog_visible() =>
            {
                Some(FakeControlId::StoreButton)
            }
            (ControlKind::ListItem, None) => match name {
                Some(wanted) if state.results.iter().any(|r| *r == wanted) => {
                    Some(FakeControlId::ResultRow(wanted))
                }
                _ => None,
            },
            (ControlKind::TabItem, None) => match (&state.open_tab, name) {
                (Some(open), Some(wanted)) if *open == wanted => {
                    Some(FakeControlId::PatientTab(wanted))
                }
                _ => None,
            },
            _ => None,
        };

        drop(state);
        Ok(id.map(|id| self.control(id)))
    }
}

#[derive(Clone, PartialEq)]
enum FakeControlId {
    LoginWindow,
    UsernameBox,
    PasswordBox,
    MainWindow,
    SearchBox,
    ResultRow(String),
    PatientTab(String),
    PrintDialog,
    StoreButton,
}

struct FakeControl {
    state: Arc<Mutex<FakeState>>,
    config: FakeSundConfig,
    id: FakeControlId,
}

impl ControlImpl for FakeControl {
    fn name(&self) -> Option<String> {
        match &self.id {
            FakeControlId::ResultRow(name) | FakeControlId::PatientTab(name) => {
                Some(name.clone())
            }
            _ => None,
        }
    }

    fn automation_id(&self) -> Option<String> {
        let id = match self.id {
            FakeControlId::LoginWindow => "frmLogin",
            FakeControlId::UsernameBox => "textBoxLogin",
            FakeControlId::PasswordBox => "textBoxPassword",
            FakeControlId::MainWindow => "frmClient",
            FakeControlId::SearchBox => "TextBoxChildCPR",
            FakeControlId::PrintDialog => "frmViewBase",
            FakeControlId::StoreButton => "buttonPrintToDocumentStore",
            FakeControlId::ResultRow(_) | FakeControlId::PatientTab(_) => return None,
        };
        Some(id.to_string())
    }

    fn focus(&self) -> Result<(), AutomationError> {
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        match self.id {
            FakeControlId::UsernameBox => state.typed_username = text.to_string(),
            FakeControlId::PasswordBox => state.typed_password = text.to_string(),
            FakeControlId::SearchBox => state.search_text = text.to_string(),
            _ => {
                return Err(AutomationError::PlatformError(
                    "control does not accept text".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn press_key(&self, keys: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        match (&self.id, keys) {
            (FakeControlId::PasswordBox, "{Enter}") => {
                if state.typed_username == VALID_USER && state.typed_password == VALID_PASSWORD {
                    state.main_visible_at = Some(Instant::now() + self.config.main_window_delay);
                }
            }
            (FakeControlId::SearchBox, "{Enter}") => {
                if let Some(patient) = &self.config.patient {
                    if state.search_text == *patient {
                        let patient = patient.clone();
                        state.results.push(patient);
                    }
                }
            }
            (FakeControlId::MainWindow, "{Ctrl}o") => state.search_visible = true,
            (FakeControlId::MainWindow, "{Ctrl}{Shift}p") => state.dialog_open = true,
            _ => {}
        }
        Ok(())
    }

    fn click(&self) -> Result<(), AutomationError> {
        if self.id == FakeControlId::StoreButton && !self.config.dialog_sticks {
            let mut state = self.state.lock().unwrap();
            state.dialog_closes_at = Some(Instant::now() + self.config.store_delay);
        }
        Ok(())
    }

    fn double_click(&self) -> Result<(), AutomationError> {
        if let FakeControlId::ResultRow(name) = &self.id {
            let mut state = self.state.lock().unwrap();
            state.open_tab = Some(name.replace('-', ""));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Counting archive double. Answers come from the scripted queue, falling
/// back to the configured default once the queue is empty.
pub struct FakeArchive {
    answers: Mutex<VecDeque<bool>>,
    default_answer: bool,
    calls: AtomicUsize,
}

impl FakeArchive {
    pub fn always(answer: bool) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            default_answer: answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn scripted(answers: impl IntoIterator<Item = bool>, default_answer: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            default_answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentArchive for FakeArchive {
    async fn journal_stored(
        &self,
        _cpr_digits: &str,
        _filename: &str,
    ) -> Result<bool, AutomationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap();
        Ok(answers.pop_front().unwrap_or(self.default_answer))
    }
}
