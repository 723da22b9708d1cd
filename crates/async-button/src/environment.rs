use std::rc::Rc;

use async_button_core::{MutableState, RuntimeHandle};
use indexmap::IndexMap;

use crate::transition::Transition;

/// Key → display-string table used to resolve localized label keys.
///
/// Entries keep insertion order so catalog dumps stay diffable.
#[derive(Clone, Debug, Default)]
pub struct StringCatalog {
    entries: IndexMap<String, String>,
}

impl StringCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Missing keys resolve to the key itself, so unlocalized builds stay
    /// legible.
    pub fn resolve(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ambient inputs the host supplies to a control.
///
/// `enabled` gates the control regardless of its running state; the string
/// catalog backs localized labels; the transition is the fixed-speed fade
/// applied when the label and placeholder swap.
#[derive(Clone)]
pub struct Environment {
    enabled: MutableState<bool>,
    strings: Rc<StringCatalog>,
    transition: Transition,
}

impl Environment {
    pub fn new(runtime: &RuntimeHandle) -> Self {
        Self {
            enabled: MutableState::with_runtime(true, runtime.clone()),
            strings: Rc::new(StringCatalog::default()),
            transition: Transition::default(),
        }
    }

    pub fn with_strings(mut self, strings: StringCatalog) -> Self {
        self.strings = Rc::new(strings);
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.value()
    }

    /// The underlying cell, for hosts that bind the flag elsewhere.
    pub fn enabled_state(&self) -> MutableState<bool> {
        self.enabled.clone()
    }

    pub fn localize(&self, key: &str) -> String {
        self.strings.resolve(key)
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }
}
