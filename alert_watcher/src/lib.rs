//! # Alert Watcher
//!
//! Polls the notification feed and raises an alert for every fresh
//! entry: the notification text runs across the LED matrix once and the
//! notification jingle plays. Raised alerts are kept in a bounded
//! history for inspection.
//!
//! The watcher treats a non-success feed completion as "nothing new"
//! (the feed driver answers that way whenever no notification falls in
//! its polling window) and only surfaces errors for failures of the
//! request machinery itself.

use std::collections::VecDeque;
use std::fmt;

use button_events::ButtonError;
use buzzer_tones::{notes, Buzzer, Melody, ToneError};
use driver_abi::{DriverHost, Duration, Instant};
use led_matrix_text::{DisplayError, TextDisplay};
use net_request::{NetworkClient, RequestError};
use notification_feed::{parse_entry, FeedEntry, FeedError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of alerts kept in history
pub const MAX_ALERT_HISTORY: usize = 100;

/// Default pause between feed polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default pause between displayed characters
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(400);

/// The button that starts a watch run
pub const WATCH_BUTTON: u32 = 0;

/// Unique identifier for a raised alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(Uuid);

impl AlertId {
    /// Creates a new alert ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an AlertId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alert:{}", self.0)
    }
}

/// One alert raised from a feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier
    pub id: AlertId,
    /// Feed entry name
    pub name: String,
    /// Notification text shown on the matrix
    pub message: String,
    /// Host time when the alert was raised
    pub raised_at: Instant,
}

/// Why a watch operation failed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchError {
    /// The feed request machinery failed
    #[error("feed request failed: {0}")]
    Request(#[from] RequestError),

    /// The feed answered with an undecodable body
    #[error("feed body undecodable: {0}")]
    Feed(#[from] FeedError),

    /// The alert text could not be displayed
    #[error("alert display failed: {0}")]
    Display(#[from] DisplayError),

    /// The alert jingle could not be played
    #[error("alert jingle failed: {0}")]
    Jingle(#[from] ToneError),

    /// Button wiring failed
    #[error("button setup failed: {0}")]
    Buttons(#[from] ButtonError),
}

/// The notification jingle
///
/// G4–C4 eighths framing two sixteenths, at 95 bpm.
pub fn notification_jingle() -> Melody {
    Melody::new(95)
        .with_note(notes::G4, 8)
        .with_note(notes::C4, 8)
        .with_note(notes::DS4, 16)
        .with_note(notes::F4, 16)
        .with_note(notes::G4, 8)
        .with_note(notes::C4, 8)
}

/// Polls the notification feed and raises alerts
pub struct AlertWatcher {
    feed_url: String,
    poll_interval: Duration,
    char_delay: Duration,
    client: NetworkClient,
    display: TextDisplay,
    buzzer: Buzzer,
    jingle: Melody,
    history: VecDeque<Alert>,
}

impl AlertWatcher {
    /// Creates a watcher polling `feed_url`
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            char_delay: DEFAULT_CHAR_DELAY,
            client: NetworkClient::new(),
            display: TextDisplay::new(),
            buzzer: Buzzer::new(),
            jingle: notification_jingle(),
            history: VecDeque::new(),
        }
    }

    /// Overrides the pause between polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// True when both drivers the watcher needs are present
    ///
    /// The buzzer is optional: alerts are raised silently without it.
    pub fn drivers_present<H: DriverHost>(&self, host: &H) -> bool {
        self.client.is_available(host) && self.display.is_available(host)
    }

    /// Polls the feed once
    ///
    /// Returns the raised alert, or `None` when the feed had nothing
    /// new.
    pub fn poll_once<H: DriverHost>(&mut self, host: &H) -> Result<Option<Alert>, WatchError> {
        let body = match self.client.get(host, &self.feed_url) {
            Ok(body) => body,
            Err(RequestError::Remote(_)) => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        match parse_entry(&body)? {
            None => Ok(None),
            Some(entry) => self.raise(host, entry).map(Some),
        }
    }

    /// Polls the feed `polls` times, sleeping the poll interval between
    ///
    /// Returns every alert raised during the run.
    pub fn watch<H: DriverHost>(
        &mut self,
        host: &H,
        polls: usize,
    ) -> Result<Vec<Alert>, WatchError> {
        let mut raised = Vec::new();
        for _ in 0..polls {
            if let Some(alert) = self.poll_once(host)? {
                raised.push(alert);
            }
            host.sleep(self.poll_interval);
        }
        Ok(raised)
    }

    /// Returns the most recent alerts, newest first
    pub fn recent(&self, count: usize) -> Vec<&Alert> {
        self.history.iter().rev().take(count).collect()
    }

    /// Number of alerts raised so far (bounded by history capacity)
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn raise<H: DriverHost>(&mut self, host: &H, entry: FeedEntry) -> Result<Alert, WatchError> {
        let alert = Alert {
            id: AlertId::new(),
            name: entry.name,
            message: entry.notification,
            raised_at: host.now(),
        };

        if self.buzzer.is_available(host) {
            self.jingle.play(host, &self.buzzer)?;
        }
        self.display.display_once(host, &alert.message, self.char_delay)?;

        if self.history.len() == MAX_ALERT_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(alert.clone());
        Ok(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_types::StatusCode;
    use sim_host::{
        DisplayLog, NetworkScript, SimBuzzer, SimNetworkDriver, SimTextDisplay, SimulatedHost,
        ToneLog,
    };

    const FEED_URL: &str = "http://feed.local/api/notifications";

    fn badge_host() -> (SimulatedHost, NetworkScript, DisplayLog, ToneLog) {
        let host = SimulatedHost::new();
        let (net, script) = SimNetworkDriver::new();
        let (display, display_log) = SimTextDisplay::new();
        let (buzzer, tone_log) = SimBuzzer::new();
        host.register_driver(Box::new(net));
        host.register_driver(Box::new(display));
        host.register_driver(Box::new(buzzer));
        (host, script, display_log, tone_log)
    }

    #[test]
    fn test_poll_raises_alert_from_entry() {
        let (host, script, display_log, tone_log) = badge_host();
        script.enqueue_body(br#"{"name":"homework","notification":"DO YOUR HOMEWORK","timestamp":1}"#);

        let mut watcher = AlertWatcher::new(FEED_URL);
        let alert = watcher.poll_once(&host).unwrap().unwrap();

        assert_eq!(alert.name, "homework");
        assert_eq!(alert.message, "DO YOUR HOMEWORK");
        assert_eq!(watcher.history_len(), 1);

        let shown = display_log.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].text, "DO YOUR HOMEWORK");
        assert!(!shown[0].repeat);

        // The jingle has six notes.
        assert_eq!(tone_log.tones().len(), 6);
        assert!(host.grants_balanced());
    }

    #[test]
    fn test_poll_with_empty_feed_raises_nothing() {
        let (host, script, display_log, tone_log) = badge_host();
        script.enqueue_body(b"null");

        let mut watcher = AlertWatcher::new(FEED_URL);
        assert_eq!(watcher.poll_once(&host).unwrap(), None);

        // No scripted response at all: the driver reports no content.
        assert_eq!(watcher.poll_once(&host).unwrap(), None);

        assert_eq!(watcher.history_len(), 0);
        assert!(display_log.shown().is_empty());
        assert!(tone_log.tones().is_empty());
    }

    #[test]
    fn test_poll_with_malformed_body() {
        let (host, script, _display_log, _tone_log) = badge_host();
        script.enqueue_body(b"<html>gateway timeout</html>");

        let mut watcher = AlertWatcher::new(FEED_URL);
        assert!(matches!(
            watcher.poll_once(&host),
            Err(WatchError::Feed(FeedError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_poll_passes_feed_failures_through_as_quiet() {
        let (host, script, _display_log, _tone_log) = badge_host();
        script.enqueue_response(StatusCode::new(500), b"");

        let mut watcher = AlertWatcher::new(FEED_URL);
        assert_eq!(watcher.poll_once(&host).unwrap(), None);
    }

    #[test]
    fn test_watch_sleeps_between_polls() {
        let (host, script, _display_log, _tone_log) = badge_host();
        script.enqueue_body(br#"{"name":"n","notification":"x","timestamp":1}"#);

        let mut watcher =
            AlertWatcher::new(FEED_URL).with_poll_interval(Duration::from_secs(10));
        let start = host.now();
        let raised = watcher.watch(&host, 3).unwrap();

        assert_eq!(raised.len(), 1);
        // Three poll intervals, plus whatever the jingle's note pauses
        // added while the alert was raised.
        let elapsed = host.now().duration_since(start);
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(31));
        assert_eq!(script.request_count(), 3);
    }

    #[test]
    fn test_alert_is_raised_silently_without_buzzer() {
        let host = SimulatedHost::new();
        let (net, script) = SimNetworkDriver::new();
        let (display, display_log) = SimTextDisplay::new();
        host.register_driver(Box::new(net));
        host.register_driver(Box::new(display));
        script.enqueue_body(br#"{"name":"n","notification":"quiet","timestamp":1}"#);

        let mut watcher = AlertWatcher::new(FEED_URL);
        assert!(watcher.drivers_present(&host));
        let alert = watcher.poll_once(&host).unwrap().unwrap();
        assert_eq!(alert.message, "quiet");
        assert_eq!(display_log.shown().len(), 1);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let (host, script, _display_log, _tone_log) = badge_host();
        script.enqueue_body(br#"{"name":"first","notification":"1","timestamp":1}"#);
        script.enqueue_body(br#"{"name":"second","notification":"2","timestamp":2}"#);

        let mut watcher = AlertWatcher::new(FEED_URL);
        watcher.poll_once(&host).unwrap();
        watcher.poll_once(&host).unwrap();

        let recent = watcher.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "second");
    }
}
