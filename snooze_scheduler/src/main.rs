//! Snooze scheduler demo session
//!
//! Drives the three-stage entry UI with simulated button presses and
//! shows the resulting POST to the feed server.

use std::cell::RefCell;
use std::rc::Rc;

use button_events::Buttons;
use sim_host::{SimButtons, SimNetworkDriver, SimTextDisplay, SimulatedHost};
use snooze_scheduler::{SnoozeScheduler, BUTTON_COMMIT, BUTTON_DECREMENT, BUTTON_INCREMENT};

const SNOOZE_URL: &str = "http://beacon.local/api/snooze";

fn main() {
    println!("=== Beacon Snooze Scheduler Demo ===\n");

    let host = Rc::new(SimulatedHost::new());
    let (net, script) = SimNetworkDriver::new();
    let (display, display_log) = SimTextDisplay::new();
    let (board, board_handle) = SimButtons::new(3);
    host.register_driver(Box::new(net));
    host.register_driver(Box::new(display));
    host.register_driver(Box::new(board));
    script.enqueue_body(b"\"Success\"");

    let scheduler = Rc::new(RefCell::new(SnoozeScheduler::new(SNOOZE_URL)));
    if !scheduler.borrow().drivers_present(&*host) {
        println!("No network or led matrix driver");
        return;
    }

    println!("1. Wiring the buttons...");
    let buttons = Buttons::new();
    let subscription = {
        let handler_host = Rc::clone(&host);
        let scheduler = Rc::clone(&scheduler);
        buttons
            .subscribe(host.as_ref(), move |event| {
                // Events delivered while an earlier press is still being
                // handled (e.g. during the submission wait) are dropped.
                let Ok(mut scheduler) = scheduler.try_borrow_mut() else {
                    return;
                };
                match scheduler.handle_button(&*handler_host, event) {
                    Ok(Some(payload)) => println!("   submitted {payload:?} to the server"),
                    Ok(None) => {}
                    Err(error) => println!("   press failed: {error}"),
                }
            })
            .expect("button subscription")
    };
    for button in [BUTTON_INCREMENT, BUTTON_DECREMENT, BUTTON_COMMIT] {
        buttons.enable_interrupt(&*host, button).expect("enable button");
    }
    println!("   [ok]\n");

    println!("2. Entering \"snooze for 5 minutes\"...");
    for _ in 0..5 {
        board_handle.tap(&*host, BUTTON_INCREMENT);
    }
    board_handle.tap(&*host, BUTTON_COMMIT); // commit the value
    board_handle.tap(&*host, BUTTON_INCREMENT); // seconds -> minutes
    board_handle.tap(&*host, BUTTON_COMMIT); // commit the unit
    board_handle.tap(&*host, BUTTON_COMMIT); // confirm
    host.run_until_idle();
    println!();

    println!("3. What the badge did:");
    for shown in display_log.shown() {
        let mode = if shown.repeat { "scroll" } else { "once" };
        println!("   display ({mode}): {:?}", shown.text);
    }
    for request in script.requests() {
        let payload = request.payload.as_deref().unwrap_or(b"");
        println!(
            "   POST {} body {:?}",
            request.url,
            String::from_utf8_lossy(payload)
        );
    }
    println!("   grants balanced: {}\n", host.grants_balanced());

    drop(subscription);
    println!("=== Demo Complete ===");
}
