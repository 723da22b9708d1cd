use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_button::{
    ActionOptions, AsyncButton, Environment, Icon, PointerEventKind, StringCatalog, View,
    PLACEHOLDER_DELAY_MILLIS,
};
use async_button_core::{sleep, MutableState};
use async_button_testing::TestLoop;

/// Button whose action sleeps for `duration_millis`, counting invocations.
fn timed_button(
    test_loop: &TestLoop,
    duration_millis: u64,
    options: ActionOptions,
    external: Option<MutableState<bool>>,
    invocations: Rc<Cell<usize>>,
) -> AsyncButton {
    let handle = test_loop.handle();
    let mut builder = AsyncButton::builder(&handle)
        .label_text("Save")
        .options(options)
        .action({
            let handle = handle.clone();
            move |_scope| {
                invocations.set(invocations.get() + 1);
                let handle = handle.clone();
                async move {
                    sleep(&handle, Duration::from_millis(duration_millis)).await;
                }
            }
        });
    if let Some(external) = external {
        builder = builder.run_binding(external);
    }
    builder.build()
}

#[test]
fn action_runs_once_per_rising_edge() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        500,
        ActionOptions::all(),
        None,
        invocations.clone(),
    );

    button.activate();
    test_loop.pump();
    assert_eq!(invocations.get(), 1);
    assert!(button.is_running());

    // Second rising edge only after the first cycle fully completed.
    test_loop.advance(500);
    assert!(!button.is_running());
    button.activate();
    test_loop.pump();
    assert_eq!(invocations.get(), 2);
}

#[test]
fn reactivation_while_running_is_ignored() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    // No DISABLE_BUTTON, so the control stays enabled and activate() reaches
    // the run state; the change gate alone must absorb it.
    let button = timed_button(
        &test_loop,
        1_000,
        ActionOptions::empty(),
        None,
        invocations.clone(),
    );

    button.activate();
    test_loop.pump();
    test_loop.advance(200);
    button.activate();
    button.activate();
    test_loop.advance(200);
    assert_eq!(invocations.get(), 1);
}

#[test]
fn state_resets_after_completion() {
    let test_loop = TestLoop::new();
    let external = MutableState::with_runtime(false, test_loop.handle());
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        300,
        ActionOptions::all(),
        Some(external.clone()),
        invocations.clone(),
    );

    button.activate();
    test_loop.pump();
    assert!(button.is_running());
    assert!(external.value(), "binding mirrors the rising edge");

    test_loop.advance(300);
    assert!(!button.is_running());
    assert!(!button.is_placeholder_visible());
    assert!(!external.value());
}

#[test]
fn placeholder_respects_show_placeholder_option() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let options = ActionOptions::all().difference(ActionOptions::SHOW_PLACEHOLDER);
    let button = timed_button(&test_loop, 1_000, options, None, invocations);

    button.activate();
    test_loop.pump();
    test_loop.advance(600);
    assert!(button.is_running());
    assert!(!button.is_placeholder_visible());
    test_loop.advance(400);
    assert!(!button.is_running());
}

#[test]
fn short_actions_never_show_placeholder() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(&test_loop, 100, ActionOptions::all(), None, invocations);

    button.activate();
    test_loop.pump();
    // One coarse advance past both deadlines: completion at 100 ms must win
    // over the debounce at 150 ms.
    test_loop.advance(400);
    assert!(!button.is_running());
    assert!(!button.is_placeholder_visible());
}

#[test]
fn placeholder_appears_at_debounce_deadline() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(&test_loop, 1_000, ActionOptions::all(), None, invocations);

    button.activate();
    test_loop.pump();

    test_loop.advance(PLACEHOLDER_DELAY_MILLIS - 1);
    assert!(!button.is_placeholder_visible());
    test_loop.advance(1);
    assert!(button.is_placeholder_visible());

    test_loop.advance(1_000 - PLACEHOLDER_DELAY_MILLIS);
    assert!(!button.is_placeholder_visible(), "reset on completion");
}

#[test]
fn external_binding_triggers_action() {
    let test_loop = TestLoop::new();
    let external = MutableState::with_runtime(false, test_loop.handle());
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        200,
        ActionOptions::all(),
        Some(external.clone()),
        invocations.clone(),
    );

    external.set(true);
    test_loop.pump();
    assert_eq!(invocations.get(), 1);
    assert!(button.is_running());

    test_loop.advance(200);
    assert!(!external.value(), "binding resets when the action finishes");
    assert_eq!(invocations.get(), 1);
}

#[test]
fn external_binding_set_true_while_running_is_idempotent() {
    let test_loop = TestLoop::new();
    let external = MutableState::with_runtime(false, test_loop.handle());
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        500,
        ActionOptions::all(),
        Some(external.clone()),
        invocations.clone(),
    );

    button.activate();
    test_loop.pump();
    external.set(true);
    external.set(true);
    test_loop.advance(100);
    assert_eq!(invocations.get(), 1);
    assert!(button.is_running());
}

#[test]
fn external_binding_false_cancels_run() {
    let test_loop = TestLoop::new();
    let external = MutableState::with_runtime(false, test_loop.handle());
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        1_000,
        ActionOptions::all(),
        Some(external.clone()),
        invocations.clone(),
    );

    button.activate();
    test_loop.pump();
    test_loop.advance(200);
    assert!(button.is_placeholder_visible());

    external.set(false);
    assert!(!button.is_running());
    assert!(!button.is_placeholder_visible());

    // The cancelled cycle's deadline passing must not resurrect anything.
    test_loop.advance(2_000);
    assert_eq!(invocations.get(), 1);
    assert!(!button.is_running());

    // A fresh rising edge starts a fresh cycle.
    external.set(true);
    test_loop.pump();
    assert_eq!(invocations.get(), 2);
}

#[test]
fn disable_button_option_disables_while_running() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        600,
        ActionOptions::all(),
        None,
        invocations.clone(),
    );

    assert!(button.is_enabled());
    button.activate();
    test_loop.pump();
    for _ in 0..3 {
        assert!(!button.is_enabled());
        button.activate();
        test_loop.advance(150);
    }
    test_loop.advance(150);
    assert!(!button.is_running());
    assert!(button.is_enabled());

    // Disabled activation attempts while running never queued anything.
    assert_eq!(invocations.get(), 1);
}

#[test]
fn without_disable_option_enabled_follows_ambient_flag_only() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        500,
        ActionOptions::empty() | ActionOptions::SHOW_PLACEHOLDER,
        None,
        invocations,
    );

    button.activate();
    test_loop.pump();
    assert!(button.is_running());
    assert!(button.is_enabled(), "running alone must not disable");

    button.environment().set_enabled(false);
    assert!(!button.is_enabled());
    button.environment().set_enabled(true);
    assert!(button.is_enabled());
}

#[test]
fn activation_is_ignored_while_ambient_disabled() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        100,
        ActionOptions::all(),
        None,
        invocations.clone(),
    );

    button.environment().set_enabled(false);
    button.activate();
    test_loop.advance(500);
    assert_eq!(invocations.get(), 0);
    assert!(!button.is_running());
}

#[test]
fn two_second_operation_end_to_end() {
    let test_loop = TestLoop::new();
    let external = MutableState::with_runtime(false, test_loop.handle());
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        2_000,
        ActionOptions::all(),
        Some(external.clone()),
        invocations.clone(),
    );

    button.activate();
    test_loop.pump();
    assert!(button.is_running());
    assert!(!button.is_placeholder_visible());

    test_loop.advance(150);
    assert!(button.is_placeholder_visible());
    assert!(button.is_running());

    test_loop.advance(850);
    assert!(button.is_running(), "still running at the 1 s mark");
    assert!(button.is_placeholder_visible());

    test_loop.advance(1_000);
    assert!(!button.is_running());
    assert!(!button.is_placeholder_visible());
    assert!(!external.value());
    assert_eq!(invocations.get(), 1);
}

#[test]
fn pointer_press_and_release_activates() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        100,
        ActionOptions::all(),
        None,
        invocations.clone(),
    );

    button.dispatch_pointer(PointerEventKind::Up);
    assert_eq!(invocations.get(), 0, "release without press is ignored");

    button.dispatch_pointer(PointerEventKind::Down);
    button.dispatch_pointer(PointerEventKind::Cancel);
    button.dispatch_pointer(PointerEventKind::Up);
    assert_eq!(invocations.get(), 0, "cancelled press is ignored");

    button.dispatch_pointer(PointerEventKind::Down);
    button.dispatch_pointer(PointerEventKind::Up);
    assert_eq!(invocations.get(), 1);
}

#[test]
fn frame_swaps_label_for_placeholder_while_visible() {
    let test_loop = TestLoop::new();
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(&test_loop, 1_000, ActionOptions::all(), None, invocations);

    let frame = button.frame();
    assert_eq!(frame.content, View::text("Save"));
    assert_eq!(frame.content_opacity, 1.0);
    assert!(frame.overlay.is_none());
    assert!(frame.enabled);

    button.activate();
    test_loop.pump();
    test_loop.advance(200);

    let frame = button.frame();
    assert_eq!(frame.content_opacity, 0.0);
    assert_eq!(frame.overlay, Some(View::Spinner), "default placeholder");
    assert!(!frame.enabled);
}

#[test]
fn localized_label_resolves_through_catalog() {
    let test_loop = TestLoop::new();
    let handle = test_loop.handle();
    let environment = Environment::new(&handle)
        .with_strings(StringCatalog::new().with("upload.title", "Upload"));
    let button = AsyncButton::builder(&handle)
        .label_localized_with_icon("upload.title", Icon::system("arrow.up.circle"))
        .environment(environment)
        .action(|_scope| async {})
        .build();

    assert_eq!(
        button.frame().content,
        View::label("Upload", Icon::system("arrow.up.circle"))
    );
}

#[test]
fn dropping_the_button_cancels_the_run_and_resets_the_binding() {
    let test_loop = TestLoop::new();
    let external = MutableState::with_runtime(false, test_loop.handle());
    let invocations = Rc::new(Cell::new(0));
    let button = timed_button(
        &test_loop,
        1_000,
        ActionOptions::all(),
        Some(external.clone()),
        invocations.clone(),
    );

    button.activate();
    test_loop.pump();
    test_loop.advance(200);
    assert!(external.value());

    drop(button);
    assert!(!external.value(), "teardown must reset the binding");

    test_loop.advance(2_000);
    assert_eq!(invocations.get(), 1);
}
