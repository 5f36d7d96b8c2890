//! Alert watcher demo session
//!
//! Runs the watcher against a simulated badge: a scripted feed, an LED
//! matrix, buttons and a buzzer. Pressing button A starts a short watch
//! run, exactly like holding the real badge.

use std::cell::RefCell;
use std::rc::Rc;

use alert_watcher::{AlertWatcher, WATCH_BUTTON};
use button_events::Buttons;
use driver_abi::Duration;
use sim_host::{SimButtons, SimBuzzer, SimNetworkDriver, SimTextDisplay, SimulatedHost};

const FEED_URL: &str = "http://beacon.local/api/notifications";

fn main() {
    println!("=== Beacon Alert Watcher Demo ===\n");

    let host = Rc::new(SimulatedHost::new());
    let (net, script) = SimNetworkDriver::new();
    let (display, display_log) = SimTextDisplay::new();
    let (board, board_handle) = SimButtons::new(3);
    let (buzzer, tone_log) = SimBuzzer::new();
    host.register_driver(Box::new(net));
    host.register_driver(Box::new(display));
    host.register_driver(Box::new(board));
    host.register_driver(Box::new(buzzer));

    println!("1. Scripting the notification feed...");
    script.enqueue_body(br#"{"name":"homework","notification":"DO YOUR HOMEWORK","timestamp":1660000000}"#);
    script.enqueue_body(b"null");
    println!("   [ok] one notification queued, then silence\n");

    let watcher = Rc::new(RefCell::new(
        AlertWatcher::new(FEED_URL).with_poll_interval(Duration::from_secs(10)),
    ));
    if !watcher.borrow().drivers_present(&*host) {
        println!("No network or led matrix driver");
        return;
    }

    println!("2. Wiring button A to a three-poll watch run...");
    let buttons = Buttons::new();
    let subscription = {
        let handler_host = Rc::clone(&host);
        let watcher = Rc::clone(&watcher);
        buttons
            .subscribe(host.as_ref(), move |event| {
                if !event.pressed || event.index != WATCH_BUTTON {
                    return;
                }
                // Button events delivered while a watch run is suspended
                // in its wait are dropped, not queued.
                let Ok(mut watcher) = watcher.try_borrow_mut() else {
                    return;
                };
                match watcher.watch(&*handler_host, 3) {
                    Ok(raised) => println!("   watch run raised {} alert(s)", raised.len()),
                    Err(error) => println!("   watch run failed: {error}"),
                }
            })
            .expect("button subscription")
    };
    buttons.enable_interrupt(&*host, WATCH_BUTTON).expect("enable button A");
    println!("   [ok]\n");

    println!("3. Pressing button A...");
    board_handle.tap(&*host, WATCH_BUTTON);
    host.run_until_idle();
    println!();

    println!("4. What the badge did:");
    for shown in display_log.shown() {
        println!("   display: {:?} ({}ms/char)", shown.text, shown.char_delay_ms);
    }
    println!("   jingle: {} notes", tone_log.tones().len());
    for alert in watcher.borrow().recent(5) {
        println!("   alert {} ({}) at {:?}", alert.id, alert.name, alert.raised_at);
    }
    println!("   feed polls: {}", script.request_count());
    println!("   grants balanced: {}\n", host.grants_balanced());

    drop(subscription);
    println!("=== Demo Complete ===");
}
