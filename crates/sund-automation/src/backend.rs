use std::path::Path;

use crate::descriptor::ControlDescriptor;
use crate::errors::AutomationError;

/// Platform seam for the accessibility layer.
///
/// Implementations perform exactly one non-blocking resolution attempt per
/// `try_resolve` call; the bounded wait in [`crate::wait`] owns all waiting.
/// An implementation that waits internally would compound its own timeout
/// with the outer poll budget, so the existence probe must use a zero
/// internal wait.
pub trait UiBackend: Send + Sync {
    /// Start the target application by filesystem path. No readiness
    /// confirmation; the next wait absorbs startup latency.
    fn launch(&self, app_path: &Path) -> Result<(), AutomationError>;

    /// Resolve a descriptor against the current accessibility tree,
    /// searching below `scope` (or the desktop root when `None`).
    /// Returns `Ok(None)` when no matching control currently exists.
    fn try_resolve(
        &self,
        descriptor: &ControlDescriptor,
        scope: Option<&Control>,
    ) -> Result<Option<Control>, AutomationError>;
}

/// Operations on a resolved control, implemented per platform.
pub trait ControlImpl: Send + Sync {
    fn name(&self) -> Option<String>;
    fn automation_id(&self) -> Option<String>;
    fn focus(&self) -> Result<(), AutomationError>;
    fn type_text(&self, text: &str) -> Result<(), AutomationError>;
    /// Send a key chord in `{Ctrl}o` / `{Enter}` syntax.
    fn press_key(&self, keys: &str) -> Result<(), AutomationError>;
    fn click(&self) -> Result<(), AutomationError>;
    fn double_click(&self) -> Result<(), AutomationError>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handle to a control that existed at the moment it was resolved. There is
/// no staleness protection: the underlying element may vanish at any point
/// after resolution, and operations then fail with a platform error.
pub struct Control {
    inner: Box<dyn ControlImpl>,
}

impl Control {
    pub fn new(inner: Box<dyn ControlImpl>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> Option<String> {
        self.inner.name()
    }

    pub fn automation_id(&self) -> Option<String> {
        self.inner.automation_id()
    }

    pub fn focus(&self) -> Result<(), AutomationError> {
        self.inner.focus()
    }

    pub fn type_text(&self, text: &str) -> Result<(), AutomationError> {
        self.inner.type_text(text)
    }

    pub fn press_key(&self, keys: &str) -> Result<(), AutomationError> {
        self.inner.press_key(keys)
    }

    pub fn click(&self) -> Result<(), AutomationError> {
        self.inner.click()
    }

    pub fn double_click(&self) -> Result<(), AutomationError> {
        self.inner.double_click()
    }

    /// Access the platform implementation, for backend-internal downcasts.
    pub fn as_any(&self) -> &dyn std::any::Any {
        self.inner.as_any()
    }
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("automation_id", &self.inner.automation_id())
            .field("name", &self.inner.name())
            .finish()
    }
}
