//! # Snooze Scheduler
//!
//! Button-driven entry of a snooze interval, posted to the feed server.
//!
//! The user commits the entry in three stages: first the numeric value
//! (A increments, B decrements), then the unit (seconds / minutes /
//! hours / days), then a final confirmation. The current entry scrolls
//! on the LED matrix after every press; the final commit posts
//! `"<value><unit>^"` (`"5m^"` for five minutes) and resets the
//! entry.

use button_events::ButtonEvent;
use driver_abi::{DriverHost, Duration};
use led_matrix_text::{DisplayError, TextDisplay};
use net_request::{NetworkClient, RequestError};
use thiserror::Error;

/// The button that increments the current stage's value
pub const BUTTON_INCREMENT: u32 = 0;

/// The button that decrements the current stage's value
pub const BUTTON_DECREMENT: u32 = 1;

/// The touch button that commits the current stage
pub const BUTTON_COMMIT: u32 = 2;

/// Scroll speed of the entry preview
pub const ENTRY_CHAR_DELAY: Duration = Duration::from_millis(900);

/// Which part of the entry is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStage {
    /// Editing the numeric value
    Value,
    /// Editing the interval unit
    Unit,
    /// Entry armed; the next commit submits
    Confirm,
}

/// Snooze interval unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    /// The payload character for this unit
    pub fn symbol(&self) -> char {
        match self {
            IntervalUnit::Seconds => 's',
            IntervalUnit::Minutes => 'm',
            IntervalUnit::Hours => 'h',
            IntervalUnit::Days => 'd',
        }
    }

    /// The next coarser unit, clamped at days
    pub fn coarser(&self) -> Self {
        match self {
            IntervalUnit::Seconds => IntervalUnit::Minutes,
            IntervalUnit::Minutes => IntervalUnit::Hours,
            IntervalUnit::Hours => IntervalUnit::Days,
            IntervalUnit::Days => IntervalUnit::Days,
        }
    }

    /// The next finer unit, clamped at seconds
    pub fn finer(&self) -> Self {
        match self {
            IntervalUnit::Seconds => IntervalUnit::Seconds,
            IntervalUnit::Minutes => IntervalUnit::Seconds,
            IntervalUnit::Hours => IntervalUnit::Minutes,
            IntervalUnit::Days => IntervalUnit::Hours,
        }
    }
}

/// The three-stage snooze entry state machine
///
/// Pure state; knows nothing about buttons, displays or the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnoozeComposer {
    value: i32,
    unit: IntervalUnit,
    stage: EntryStage,
}

impl SnoozeComposer {
    /// Creates a fresh entry: value 0, seconds, editing the value
    pub fn new() -> Self {
        Self {
            value: 0,
            unit: IntervalUnit::Seconds,
            stage: EntryStage::Value,
        }
    }

    /// Current numeric value
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Current interval unit
    pub fn unit(&self) -> IntervalUnit {
        self.unit
    }

    /// Current entry stage
    pub fn stage(&self) -> EntryStage {
        self.stage
    }

    /// Steps the current stage's value up
    ///
    /// The value is unbounded in both directions; the unit clamps at
    /// days. A confirmed entry ignores adjustment.
    pub fn increment(&mut self) {
        match self.stage {
            EntryStage::Value => self.value += 1,
            EntryStage::Unit => self.unit = self.unit.coarser(),
            EntryStage::Confirm => {}
        }
    }

    /// Steps the current stage's value down
    pub fn decrement(&mut self) {
        match self.stage {
            EntryStage::Value => self.value -= 1,
            EntryStage::Unit => self.unit = self.unit.finer(),
            EntryStage::Confirm => {}
        }
    }

    /// Commits the current stage
    ///
    /// Advances value → unit → confirm; committing a confirmed entry
    /// returns the rendered payload. The entry stays armed until
    /// [`reset`], so a failed submission can be retried.
    ///
    /// [`reset`]: SnoozeComposer::reset
    pub fn commit(&mut self) -> Option<String> {
        match self.stage {
            EntryStage::Value => {
                self.stage = EntryStage::Unit;
                None
            }
            EntryStage::Unit => {
                self.stage = EntryStage::Confirm;
                None
            }
            EntryStage::Confirm => Some(self.render()),
        }
    }

    /// Renders the entry in the server's payload format
    pub fn render(&self) -> String {
        format!("{}{}^", self.value, self.unit.symbol())
    }

    /// Discards the entry
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SnoozeComposer {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a scheduler interaction failed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The snooze POST failed
    #[error("snooze submission failed: {0}")]
    Request(#[from] RequestError),

    /// The entry preview could not be displayed
    #[error("entry display failed: {0}")]
    Display(#[from] DisplayError),
}

/// Wires the composer to the display and the feed server
pub struct SnoozeScheduler {
    snooze_url: String,
    composer: SnoozeComposer,
    client: NetworkClient,
    display: TextDisplay,
}

impl SnoozeScheduler {
    /// Creates a scheduler posting to `snooze_url`
    pub fn new(snooze_url: impl Into<String>) -> Self {
        Self {
            snooze_url: snooze_url.into(),
            composer: SnoozeComposer::new(),
            client: NetworkClient::new(),
            display: TextDisplay::new(),
        }
    }

    /// True when both drivers the scheduler needs are present
    pub fn drivers_present<H: DriverHost>(&self, host: &H) -> bool {
        self.client.is_available(host) && self.display.is_available(host)
    }

    /// Current composer state, for inspection
    pub fn composer(&self) -> &SnoozeComposer {
        &self.composer
    }

    /// Reacts to one button edge
    ///
    /// Returns the submitted payload when this press completed the
    /// entry. Releases are ignored.
    pub fn handle_button<H: DriverHost>(
        &mut self,
        host: &H,
        event: ButtonEvent,
    ) -> Result<Option<String>, ScheduleError> {
        if !event.pressed {
            return Ok(None);
        }
        match event.index {
            BUTTON_INCREMENT => self.composer.increment(),
            BUTTON_DECREMENT => self.composer.decrement(),
            BUTTON_COMMIT => {
                if let Some(payload) = self.composer.commit() {
                    // On failure the entry stays armed; the user can
                    // commit again to retry.
                    self.client.post(host, &self.snooze_url, payload.as_bytes())?;
                    self.composer.reset();
                    self.display.clear(host)?;
                    return Ok(Some(payload));
                }
            }
            _ => return Ok(None),
        }
        self.display
            .scroll(host, &self.composer.render(), ENTRY_CHAR_DELAY)?;
        Ok(None)
    }
}
