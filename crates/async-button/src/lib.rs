#![doc = r"A button control that wraps an asynchronous operation.

The control tracks its own busy state, optionally disables itself while the
operation runs, and swaps its label for a placeholder view once the
operation outlives a 150 ms debounce window, so short operations never
flicker a spinner. An optional caller-owned run binding can trigger the
operation programmatically and observe its completion.

Built on the reactive cells and cooperative runtime from
`async-button-core`; hosts drive it from their own event loop and render
from [`ButtonFrame`] snapshots."]

pub mod builder;
pub mod button;
pub mod environment;
pub mod options;
pub mod transition;
pub mod view;

pub use builder::AsyncButtonBuilder;
pub use button::{ActionFn, AsyncButton, BoxedAction, ButtonFrame, PLACEHOLDER_DELAY_MILLIS};
pub use environment::{Environment, StringCatalog};
pub use options::ActionOptions;
pub use transition::{Easing, Transition};
pub use view::{Icon, PointerEventKind, View};
