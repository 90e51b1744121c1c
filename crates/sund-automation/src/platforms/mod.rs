use std::sync::Arc;

use crate::backend::UiBackend;
use crate::errors::AutomationError;

#[cfg(target_os = "windows")]
pub mod windows;

/// Create the accessibility backend for the current platform.
pub fn create_backend() -> Result<Arc<dyn UiBackend>, AutomationError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsBackend::new()?))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(AutomationError::UnsupportedPlatform(
            "the Solteq Sund client is a Windows application".to_string(),
        ))
    }
}
