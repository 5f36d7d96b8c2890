//! # LED-Matrix Text Client
//!
//! Client for the LED-matrix text driver: shows a string letter by
//! letter, either once or scrolling repeatedly until replaced.
//!
//! A one-shot display is a full request lifecycle (grant the text,
//! subscribe, command, wait for the driver to finish, revoke). A
//! scrolling display deliberately leaves its text grant active, since
//! the driver keeps reading it while it scrolls; the grant is replaced
//! by the next `scroll` call or released by `clear`.

use driver_abi::scoped::{ReadGrant, Subscription};
use driver_abi::{Completion, DriverHost, Duration};
use driver_abi::{CommandError, GrantError, SubscribeError};
use driver_types::{ChannelId, CommandId, DriverNum, StatusCode};
use thiserror::Error;

/// The LED-matrix text driver's platform number
pub const TEXT_DRIVER: DriverNum = DriverNum::new(0xa0000);

/// Read slot carrying the text to display
pub const TEXT_CHANNEL: ChannelId = ChannelId::new(TEXT_DRIVER, 0);

/// Subscription slot for display completion
pub const COMPLETION_CHANNEL: ChannelId = ChannelId::new(TEXT_DRIVER, 0);

/// Command showing the granted text (arg0 = per-char delay ms, arg1 = repeat flag)
pub const SHOW: CommandId = CommandId::new(1);

/// Command blanking the matrix
pub const CLEAR: CommandId = CommandId::new(2);

const REPEAT_OFF: u32 = 0;
const REPEAT_ON: u32 = 1;

/// Why a display operation failed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayError {
    /// The text grant was refused by the host
    #[error("text grant refused: {0}")]
    Grant(#[from] GrantError),

    /// The completion subscription was refused by the host
    #[error("completion subscription refused: {0}")]
    Subscribe(#[from] SubscribeError),

    /// The display command was rejected by the driver
    #[error("display command rejected: {0}")]
    Command(#[from] CommandError),

    /// The driver completed the display with a non-success status
    #[error("display completed with {0}")]
    Remote(StatusCode),
}

/// Client for the LED-matrix text driver
#[derive(Debug, Default)]
pub struct TextDisplay;

impl TextDisplay {
    /// Creates a display client
    pub fn new() -> Self {
        Self
    }

    /// Probes whether the display driver is present
    pub fn is_available<H: DriverHost>(&self, host: &H) -> bool {
        host.driver_present(TEXT_DRIVER)
    }

    /// Shows `text` once, blocking until the last character has faded
    ///
    /// `char_delay` is the pause between consecutive characters.
    pub fn display_once<H: DriverHost>(
        &self,
        host: &H,
        text: &str,
        char_delay: Duration,
    ) -> Result<(), DisplayError> {
        // A leftover scrolling grant would occupy the slot.
        host.revoke_read(TEXT_CHANNEL);

        let _text_grant = ReadGrant::establish(host, TEXT_CHANNEL, text.as_bytes())?;
        let completion = Completion::new();
        let _subscription = Subscription::register(host, COMPLETION_CHANNEL, completion.upcall())?;

        host.issue_command(TEXT_DRIVER, SHOW, char_delay.as_millis() as u32, REPEAT_OFF)?;
        let outcome = host.wait(&completion);

        if outcome.status.is_success() {
            Ok(())
        } else {
            Err(DisplayError::Remote(outcome.status))
        }
    }

    /// Starts scrolling `text` repeatedly and returns immediately
    ///
    /// The text grant stays active so the driver can keep reading it;
    /// it is replaced by the next `scroll`/`display_once` and released
    /// by [`clear`].
    ///
    /// [`clear`]: TextDisplay::clear
    pub fn scroll<H: DriverHost>(
        &self,
        host: &H,
        text: &str,
        char_delay: Duration,
    ) -> Result<(), DisplayError> {
        host.revoke_read(TEXT_CHANNEL);
        host.grant_read(TEXT_CHANNEL, text.as_bytes())?;

        if let Err(error) =
            host.issue_command(TEXT_DRIVER, SHOW, char_delay.as_millis() as u32, REPEAT_ON)
        {
            host.revoke_read(TEXT_CHANNEL);
            return Err(error.into());
        }
        Ok(())
    }

    /// Blanks the matrix and releases any scrolling text grant
    pub fn clear<H: DriverHost>(&self, host: &H) -> Result<(), DisplayError> {
        let completion = Completion::new();
        let _subscription = Subscription::register(host, COMPLETION_CHANNEL, completion.upcall())?;

        let result = host.issue_command(TEXT_DRIVER, CLEAR, 0, 0);
        host.revoke_read(TEXT_CHANNEL);
        result?;

        let outcome = host.wait(&completion);
        if outcome.status.is_success() {
            Ok(())
        } else {
            Err(DisplayError::Remote(outcome.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_host::{DisplayLog, SimTextDisplay, SimulatedHost};

    fn display_host() -> (SimulatedHost, DisplayLog) {
        let host = SimulatedHost::new();
        let (driver, log) = SimTextDisplay::new();
        host.register_driver(Box::new(driver));
        (host, log)
    }

    #[test]
    fn test_display_once_completes_and_releases() {
        let (host, log) = display_host();
        let display = TextDisplay::new();

        display
            .display_once(&host, "DO YOUR HOMEWORK", Duration::from_millis(400))
            .unwrap();

        let shown = log.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].text, "DO YOUR HOMEWORK");
        assert!(!shown[0].repeat);
        assert_eq!(shown[0].char_delay_ms, 400);
        assert_eq!(host.active_grant_count(), 0);
        assert_eq!(host.active_subscription_count(), 0);
    }

    #[test]
    fn test_scroll_keeps_the_text_granted() {
        let (host, log) = display_host();
        let display = TextDisplay::new();

        display
            .scroll(&host, "5m^", Duration::from_millis(900))
            .unwrap();

        assert!(log.current().unwrap().repeat);
        assert_eq!(host.active_grant_count(), 1);
    }

    #[test]
    fn test_scroll_replaces_previous_text() {
        let (host, log) = display_host();
        let display = TextDisplay::new();

        display.scroll(&host, "1s^", Duration::from_millis(900)).unwrap();
        display.scroll(&host, "2s^", Duration::from_millis(900)).unwrap();

        assert_eq!(log.current().unwrap().text, "2s^");
        assert_eq!(host.active_grant_count(), 1);
        assert_eq!(log.shown().len(), 2);
    }

    #[test]
    fn test_clear_releases_the_scroll_grant() {
        let (host, log) = display_host();
        let display = TextDisplay::new();

        display.scroll(&host, "5m^", Duration::from_millis(900)).unwrap();
        display.clear(&host).unwrap();

        assert_eq!(log.current(), None);
        assert_eq!(host.active_grant_count(), 0);
        assert!(host.grants_balanced());
    }

    #[test]
    fn test_display_without_driver() {
        let host = SimulatedHost::new();
        let display = TextDisplay::new();
        assert!(!display.is_available(&host));
        assert_eq!(
            display.display_once(&host, "X", Duration::ZERO),
            Err(DisplayError::Grant(GrantError::DriverAbsent))
        );
    }
}
