//! Drives one async button against the std runtime without a renderer:
//! activates it, then pumps and logs every visible state transition until
//! the wrapped operation finishes.
//!
//! Run with `RUST_LOG=debug cargo run -p headless-demo`.

use std::thread;
use std::time::Duration;

use async_button::{ActionOptions, AsyncButton, Environment, Icon, StringCatalog};
use async_button_core::{sleep, MutableState};
use async_button_runtime_std::StdRuntime;
use log::info;

fn main() {
    env_logger::init();

    let runtime = StdRuntime::new();
    let handle = runtime.runtime_handle();

    let external = MutableState::with_runtime(false, handle.clone());
    let environment = Environment::new(&handle)
        .with_strings(StringCatalog::new().with("upload.title", "Upload"));

    let button = AsyncButton::builder(&handle)
        .label_localized_with_icon("upload.title", Icon::system("arrow.up.circle"))
        .options(ActionOptions::all())
        .run_binding(external.clone())
        .environment(environment)
        .action({
            let handle = handle.clone();
            move |_scope| {
                let handle = handle.clone();
                async move {
                    info!("upload started");
                    sleep(&handle, Duration::from_secs(2)).await;
                    info!("upload finished");
                }
            }
        })
        .build();

    button.activate();

    let mut last = (false, false, true);
    while button.is_running() || handle.has_pending_work(runtime.now_millis()) {
        runtime.pump();
        let current = (
            button.is_running(),
            button.is_placeholder_visible(),
            button.is_enabled(),
        );
        if current != last {
            info!(
                "running={} placeholder={} enabled={}",
                current.0, current.1, current.2
            );
            last = current;
        }
        thread::sleep(Duration::from_millis(10));
    }

    let frame = button.frame();
    info!(
        "settled: content={:?} overlay={:?} enabled={}",
        frame.content, frame.overlay, frame.enabled
    );
    assert!(!external.value(), "binding must reset after completion");
}
