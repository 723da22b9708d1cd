use std::future::Future;
use std::rc::Rc;

use async_button_core::{MutableState, RuntimeHandle, TaskScope};

use crate::button::{ActionFn, AsyncButton};
use crate::environment::Environment;
use crate::options::ActionOptions;
use crate::view::{Icon, View, ViewFactory};

/// Assembles an [`AsyncButton`].
///
/// Only the action and a label are required; the placeholder defaults to a
/// spinner and every option defaults to enabled. The label conveniences
/// (plain text, localized key, either with an icon) all funnel into the one
/// [`AsyncButtonBuilder::label`] seam.
pub struct AsyncButtonBuilder {
    runtime: RuntimeHandle,
    action: Option<ActionFn>,
    label: Option<ViewFactory>,
    placeholder: ViewFactory,
    options: ActionOptions,
    external_run: Option<MutableState<bool>>,
    environment: Option<Environment>,
}

impl AsyncButtonBuilder {
    pub(crate) fn new(runtime: &RuntimeHandle) -> Self {
        Self {
            runtime: runtime.clone(),
            action: None,
            label: None,
            placeholder: Rc::new(|_| View::Spinner),
            options: ActionOptions::all(),
            external_run: None,
            environment: None,
        }
    }

    /// The asynchronous operation the control wraps.
    pub fn action<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(TaskScope) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.action = Some(Rc::new(move |scope| Box::pin(action(scope))));
        self
    }

    /// Label from an arbitrary view factory.
    pub fn label(mut self, label: impl Fn(&Environment) -> View + 'static) -> Self {
        self.label = Some(Rc::new(label));
        self
    }

    /// Label from a plain string.
    pub fn label_text(self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.label(move |_| View::text(title.clone()))
    }

    /// Label from a localized string key, resolved against the environment's
    /// string catalog at render time.
    pub fn label_localized(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.label(move |environment| View::text(environment.localize(&key)))
    }

    /// Label from a plain string and an icon.
    pub fn label_text_with_icon(self, title: impl Into<String>, icon: Icon) -> Self {
        let title = title.into();
        self.label(move |_| View::label(title.clone(), icon.clone()))
    }

    /// Label from a localized string key and an icon.
    pub fn label_localized_with_icon(self, key: impl Into<String>, icon: Icon) -> Self {
        let key = key.into();
        self.label(move |environment| View::label(environment.localize(&key), icon.clone()))
    }

    /// View shown in place of the label while the action runs. Defaults to a
    /// spinner.
    pub fn placeholder(mut self, placeholder: impl Fn(&Environment) -> View + 'static) -> Self {
        self.placeholder = Rc::new(placeholder);
        self
    }

    pub fn options(mut self, options: ActionOptions) -> Self {
        self.options = options;
        self
    }

    /// Caller-owned run binding: set it to `true` to trigger the action
    /// programmatically, observe it returning to `false` on completion.
    pub fn run_binding(mut self, binding: MutableState<bool>) -> Self {
        self.external_run = Some(binding);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn build(self) -> AsyncButton {
        let action = self.action.expect("AsyncButton requires an action");
        let label = self.label.expect("AsyncButton requires a label");
        let environment = self
            .environment
            .unwrap_or_else(|| Environment::new(&self.runtime));
        AsyncButton::from_parts(
            self.runtime,
            self.options,
            action,
            label,
            self.placeholder,
            environment,
            self.external_run,
        )
    }
}
