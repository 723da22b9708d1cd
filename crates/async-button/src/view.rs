use std::rc::Rc;

use crate::environment::Environment;

/// Reference to an icon the host's renderer can resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icon {
    /// Icon from the platform's built-in symbol set.
    System(String),
    /// Icon from the application's bundled resources.
    Resource(String),
}

impl Icon {
    pub fn system(name: impl Into<String>) -> Self {
        Self::System(name.into())
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self::Resource(name.into())
    }
}

/// Renderer-neutral value tree describing what the control shows.
///
/// The control only ever produces small trees: a label (plain text or
/// text-plus-icon) and a placeholder, which defaults to [`View::Spinner`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Empty,
    Text(String),
    Label { title: String, icon: Icon },
    /// Indeterminate progress indicator.
    Spinner,
}

impl View {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn label(title: impl Into<String>, icon: Icon) -> Self {
        Self::Label {
            title: title.into(),
            icon,
        }
    }
}

/// Produces a view on demand, resolving localized content against the
/// environment it is rendered in.
pub type ViewFactory = Rc<dyn Fn(&Environment) -> View>;

/// Pointer events the control understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Up,
    Cancel,
}
