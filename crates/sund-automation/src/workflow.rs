//! The journal workflow against the Solteq Sund client, one typestate per
//! session phase. Each transition waits for the control it needs, drives it,
//! and hands back the next phase; a wait that runs out of budget aborts the
//! run. Sequencing mistakes (opening a patient before signing in, storing a
//! journal with no dialog open) do not compile.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, instrument};

use crate::archive::{journal_filename, wait_for_journal, DocumentArchive, VERIFY_TIMEOUT};
use crate::backend::{Control, UiBackend};
use crate::descriptor::ControlDescriptor;
use crate::errors::AutomationError;
use crate::patient::Cpr;
use crate::wait::{poll_until, PollOptions, EXTENDED_WAIT_TIMEOUT};

// Control identifiers of the Solteq Sund client.
const LOGIN_WINDOW_ID: &str = "frmLogin";
const USERNAME_BOX_ID: &str = "textBoxLogin";
const PASSWORD_BOX_ID: &str = "textBoxPassword";
const MAIN_WINDOW_ID: &str = "frmClient";
const PATIENT_SEARCH_BOX_ID: &str = "TextBoxChildCPR";
const PRINT_DIALOG_ID: &str = "frmViewBase";
const STORE_BUTTON_ID: &str = "buttonPrintToDocumentStore";

// Key chords the client binds.
const OPEN_PATIENT_SEARCH: &str = "{Ctrl}o";
const PRINT_JOURNAL: &str = "{Ctrl}{Shift}p";
const SUBMIT: &str = "{Enter}";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Entry point: owns the accessibility backend and the poll settings shared
/// by every wait in the workflow.
#[derive(Clone)]
pub struct SolteqSund {
    backend: Arc<dyn UiBackend>,
    poll: PollOptions,
}

impl SolteqSund {
    /// Backend for the current platform.
    pub fn new() -> Result<Self, AutomationError> {
        Ok(Self::with_backend(crate::platforms::create_backend()?))
    }

    /// Inject a backend. Tests drive the workflow through a scripted fake.
    pub fn with_backend(backend: Arc<dyn UiBackend>) -> Self {
        Self {
            backend,
            poll: PollOptions::default(),
        }
    }

    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// Step 1: start the client process. No readiness confirmation; the
    /// sign-in wait absorbs startup latency.
    #[instrument(skip(self))]
    pub fn launch(self, app_path: &Path) -> Result<Launched, AutomationError> {
        info!(path = %app_path.display(), "launching Solteq Sund");
        self.backend.launch(app_path)?;
        Ok(Launched { app: self })
    }

    /// Wait for a descriptor to resolve, with the given budget.
    pub async fn wait_for(
        &self,
        descriptor: &ControlDescriptor,
        scope: Option<&Control>,
        timeout: Duration,
    ) -> Result<Control, AutomationError> {
        debug!(%descriptor, ?timeout, "waiting for control");
        let options = PollOptions {
            timeout,
            ..self.poll
        };
        poll_until(options, || self.backend.try_resolve(descriptor, scope))
            .await?
            .ok_or_else(|| AutomationError::ControlNotFound {
                descriptor: descriptor.to_string(),
                timeout,
            })
    }

    /// Wait for a descriptor to stop resolving, with the given budget.
    pub async fn wait_gone(
        &self,
        descriptor: &ControlDescriptor,
        scope: Option<&Control>,
        timeout: Duration,
    ) -> Result<(), AutomationError> {
        debug!(%descriptor, ?timeout, "waiting for control to disappear");
        let options = PollOptions {
            timeout,
            ..self.poll
        };
        let gone = poll_until(options, || {
            Ok::<_, AutomationError>(match self.backend.try_resolve(descriptor, scope)? {
                Some(_) => None,
                None => Some(()),
            })
        })
        .await?;
        match gone {
            Some(()) => Ok(()),
            None => Err(AutomationError::ControlStillPresent {
                descriptor: descriptor.to_string(),
                timeout,
            }),
        }
    }

    async fn wait_for_default(
        &self,
        descriptor: &ControlDescriptor,
        scope: Option<&Control>,
    ) -> Result<Control, AutomationError> {
        self.wait_for(descriptor, scope, self.poll.timeout).await
    }
}

/// The client process has been started; no window is held yet.
pub struct Launched {
    app: SolteqSund,
}

impl Launched {
    /// Step 2: wait for the login window, enter the credentials, submit, and
    /// wait (extended budget) for the main client window, which becomes the
    /// session window.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn sign_in(self, credentials: &Credentials) -> Result<LoggedIn, AutomationError> {
        let login_window = self
            .app
            .wait_for_default(
                &ControlDescriptor::window()
                    .automation_id(LOGIN_WINDOW_ID)
                    .depth(2),
                None,
            )
            .await?;
        login_window.focus()?;

        let username_box = self
            .app
            .wait_for_default(
                &ControlDescriptor::edit().automation_id(USERNAME_BOX_ID).depth(8),
                Some(&login_window),
            )
            .await?;
        username_box.type_text(&credentials.username)?;

        let password_box = self
            .app
            .wait_for_default(
                &ControlDescriptor::edit().automation_id(PASSWORD_BOX_ID).depth(8),
                Some(&login_window),
            )
            .await?;
        password_box.type_text(&credentials.password)?;
        password_box.press_key(SUBMIT)?;

        let window = self
            .app
            .wait_for(
                &ControlDescriptor::window()
                    .automation_id(MAIN_WINDOW_ID)
                    .depth(2),
                None,
                EXTENDED_WAIT_TIMEOUT,
            )
            .await?;
        info!("signed in, main client window is up");
        Ok(LoggedIn {
            app: self.app,
            window,
        })
    }
}

/// Signed in; holds the main client window as the session window.
pub struct LoggedIn {
    app: SolteqSund,
    window: Control,
}

impl std::fmt::Debug for LoggedIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggedIn").finish_non_exhaustive()
    }
}

impl LoggedIn {
    pub fn window(&self) -> &Control {
        &self.window
    }

    /// Step 3: open the patient search, look the patient up by CPR, activate
    /// the matching result row, and confirm the patient tab opened.
    #[instrument(skip_all, fields(patient = %cpr))]
    pub async fn open_patient(self, cpr: &Cpr) -> Result<PatientOpen, AutomationError> {
        self.window.press_key(OPEN_PATIENT_SEARCH)?;

        let search_box = self
            .app
            .wait_for_default(
                &ControlDescriptor::edit()
                    .automation_id(PATIENT_SEARCH_BOX_ID)
                    .depth(8),
                Some(&self.window),
            )
            .await?;
        search_box.focus()?;
        search_box.type_text(cpr.as_entered())?;
        search_box.press_key(SUBMIT)?;

        // Exact name match on the identifier as entered.
        let row = self
            .app
            .wait_for_default(
                &ControlDescriptor::list_item()
                    .name(cpr.as_entered())
                    .depth(12),
                Some(&self.window),
            )
            .await?;
        row.double_click()?;

        // The tab label carries the identifier with the hyphen stripped.
        self.app
            .wait_for_default(
                &ControlDescriptor::tab_item().name(cpr.digits()).depth(4),
                Some(&self.window),
            )
            .await?;
        info!("patient record open");
        Ok(PatientOpen {
            app: self.app,
            window: self.window,
            cpr: cpr.clone(),
        })
    }
}

/// A patient record tab is open in the session window.
pub struct PatientOpen {
    app: SolteqSund,
    window: Control,
    cpr: Cpr,
}

impl std::fmt::Debug for PatientOpen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientOpen")
            .field("cpr", &self.cpr)
            .finish_non_exhaustive()
    }
}

impl PatientOpen {
    pub fn window(&self) -> &Control {
        &self.window
    }

    /// Step 4a: trigger journal generation and wait for the print dialog.
    #[instrument(skip_all)]
    pub async fn open_print_dialog(self) -> Result<PrintDialog, AutomationError> {
        self.window.press_key(PRINT_JOURNAL)?;
        let dialog = self
            .app
            .wait_for_default(
                &ControlDescriptor::window()
                    .automation_id(PRINT_DIALOG_ID)
                    .depth(2),
                None,
            )
            .await?;
        Ok(PrintDialog {
            app: self.app,
            window: self.window,
            cpr: self.cpr,
            dialog,
        })
    }

    /// Step 4: generate the journal, store it to the document archive, and
    /// verify through the archive that a finalized row exists for today's
    /// filename. The archive is never queried if the UI part fails.
    pub async fn create_journal(
        self,
        archive: &dyn DocumentArchive,
    ) -> Result<PatientOpen, AutomationError> {
        let patient = self.open_print_dialog().await?.store_to_archive().await?;

        let filename = journal_filename(Local::now().date_naive());
        let digits = patient.cpr.digits();
        if !wait_for_journal(archive, &digits, &filename, VERIFY_TIMEOUT).await? {
            return Err(AutomationError::DocumentNotStored {
                filename,
                cpr: digits,
            });
        }
        info!(%filename, "journal stored and finalized");
        Ok(patient)
    }
}

/// The print dialog is up; the journal has not been stored yet.
pub struct PrintDialog {
    app: SolteqSund,
    window: Control,
    cpr: Cpr,
    dialog: Control,
}

impl PrintDialog {
    /// Step 4b: activate the store-to-archive control and wait (extended
    /// budget) for the dialog to go away.
    #[instrument(skip_all)]
    pub async fn store_to_archive(self) -> Result<PatientOpen, AutomationError> {
        let store_button = self
            .app
            .wait_for_default(
                &ControlDescriptor::pane().automation_id(STORE_BUTTON_ID).depth(8),
                Some(&self.dialog),
            )
            .await?;
        store_button.click()?;

        self.app
            .wait_gone(
                &ControlDescriptor::window()
                    .automation_id(PRINT_DIALOG_ID)
                    .depth(2),
                None,
                EXTENDED_WAIT_TIMEOUT,
            )
            .await?;
        debug!("print dialog closed");
        Ok(PatientOpen {
            app: self.app,
            window: self.window,
            cpr: self.cpr,
        })
    }
}
