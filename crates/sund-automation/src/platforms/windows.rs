//! Windows backend over UI Automation.
//!
//! Resolution builds a matcher per probe with `timeout(0)`: the matcher must
//! not wait on its own, the bounded poll above owns the entire budget.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use uiautomation::controls::ControlType;
use uiautomation::inputs::Mouse;
use uiautomation::UIAutomation;

use crate::backend::{Control, ControlImpl, UiBackend};
use crate::descriptor::{ControlDescriptor, ControlKind};
use crate::errors::AutomationError;

// COM interface pointers are apartment-bound; the workflow is strictly
// sequential so access is never concurrent.
struct ThreadSafeAutomation(UIAutomation);
unsafe impl Send for ThreadSafeAutomation {}
unsafe impl Sync for ThreadSafeAutomation {}

struct ThreadSafeWinControl(Arc<uiautomation::UIElement>);
unsafe impl Send for ThreadSafeWinControl {}
unsafe impl Sync for ThreadSafeWinControl {}

pub struct WindowsBackend {
    automation: ThreadSafeAutomation,
}

impl WindowsBackend {
    pub fn new() -> Result<Self, AutomationError> {
        let automation = UIAutomation::new()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))?;
        Ok(Self {
            automation: ThreadSafeAutomation(automation),
        })
    }
}

fn control_type_of(kind: ControlKind) -> ControlType {
    match kind {
        ControlKind::Window => ControlType::Window,
        ControlKind::Pane => ControlType::Pane,
        ControlKind::Button => ControlType::Button,
        ControlKind::Edit => ControlType::Edit,
        ControlKind::ListItem => ControlType::ListItem,
        ControlKind::TabItem => ControlType::TabItem,
    }
}

impl UiBackend for WindowsBackend {
    fn launch(&self, app_path: &Path) -> Result<(), AutomationError> {
        Command::new(app_path)
            .spawn()
            .map_err(|e| {
                AutomationError::PlatformError(format!(
                    "failed to start '{}': {e}",
                    app_path.display()
                ))
            })
            .map(|_| ())
    }

    fn try_resolve(
        &self,
        descriptor: &ControlDescriptor,
        scope: Option<&Control>,
    ) -> Result<Option<Control>, AutomationError> {
        let root = match scope {
            Some(control) => {
                let inner = control
                    .as_any()
                    .downcast_ref::<WindowsControl>()
                    .ok_or_else(|| {
                        AutomationError::PlatformError(
                            "scope control does not belong to the Windows backend".to_string(),
                        )
                    })?;
                (*inner.element.0).clone()
            }
            None => self
                .automation
                .0
                .get_root_element()
                .map_err(|e| AutomationError::PlatformError(e.to_string()))?,
        };

        let attributes = descriptor.attributes.clone();
        let matcher = self
            .automation
            .0
            .create_matcher()
            .from_ref(&root)
            .control_type(control_type_of(descriptor.kind))
            .filter_fn(Box::new(move |e: &uiautomation::UIElement| {
                for (key, expected) in &attributes {
                    let actual = match key.as_str() {
                        "AutomationId" => e.get_automation_id().unwrap_or_default(),
                        "Name" => e.get_name().unwrap_or_default(),
                        _ => return Ok(false),
                    };
                    if actual != *expected {
                        return Ok(false);
                    }
                }
                Ok(true)
            }))
            .depth(descriptor.search_depth)
            .timeout(0);

        // The matcher reports "no match yet" as an error; that is the
        // negative probe result, not a failure.
        match matcher.find_first() {
            Ok(element) => Ok(Some(Control::new(Box::new(WindowsControl {
                element: ThreadSafeWinControl(Arc::new(element)),
            })))),
            Err(_) => Ok(None),
        }
    }
}

struct WindowsControl {
    element: ThreadSafeWinControl,
}

impl ControlImpl for WindowsControl {
    fn name(&self) -> Option<String> {
        self.element.0.get_name().ok()
    }

    fn automation_id(&self) -> Option<String> {
        self.element.0.get_automation_id().ok()
    }

    fn focus(&self) -> Result<(), AutomationError> {
        self.element
            .0
            .set_focus()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn type_text(&self, text: &str) -> Result<(), AutomationError> {
        self.element
            .0
            .send_text(text, 10)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn press_key(&self, keys: &str) -> Result<(), AutomationError> {
        self.element
            .0
            .send_keys(keys, 10)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn click(&self) -> Result<(), AutomationError> {
        self.element
            .0
            .click()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn double_click(&self) -> Result<(), AutomationError> {
        let point = self
            .element
            .0
            .get_clickable_point()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))?
            .ok_or_else(|| {
                AutomationError::PlatformError("no clickable point on element".to_string())
            })?;
        Mouse::default()
            .double_click(point)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
