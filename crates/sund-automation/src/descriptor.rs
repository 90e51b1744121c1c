use std::collections::BTreeMap;
use std::fmt;

/// The control roles this workflow touches. Platform backends map these onto
/// their native control-type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Window,
    Pane,
    Button,
    Edit,
    ListItem,
    TabItem,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlKind::Window => "Window",
            ControlKind::Pane => "Pane",
            ControlKind::Button => "Button",
            ControlKind::Edit => "Edit",
            ControlKind::ListItem => "ListItem",
            ControlKind::TabItem => "TabItem",
        };
        f.write_str(name)
    }
}

/// Describes one control in the target application's accessibility tree:
/// a control kind, a set of identifying attributes, and how deep below the
/// search root to look. Descriptors are built per wait call and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub kind: ControlKind,
    pub attributes: BTreeMap<String, String>,
    pub search_depth: u32,
}

impl ControlDescriptor {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            search_depth: 1,
        }
    }

    pub fn window() -> Self {
        Self::new(ControlKind::Window)
    }

    pub fn pane() -> Self {
        Self::new(ControlKind::Pane)
    }

    pub fn button() -> Self {
        Self::new(ControlKind::Button)
    }

    pub fn edit() -> Self {
        Self::new(ControlKind::Edit)
    }

    pub fn list_item() -> Self {
        Self::new(ControlKind::ListItem)
    }

    pub fn tab_item() -> Self {
        Self::new(ControlKind::TabItem)
    }

    /// Match on the native automation id (`AutomationId` on Windows).
    pub fn automation_id(mut self, id: impl Into<String>) -> Self {
        self.attributes.insert("AutomationId".into(), id.into());
        self
    }

    /// Match on the accessible name. Exact comparison.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert("Name".into(), name.into());
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.search_depth = depth;
        self
    }
}

impl fmt::Display for ControlDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.kind)?;
        let mut first = true;
        for (key, value) in &self.attributes {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        write!(f, "] depth={}", self.search_depth)
    }
}
