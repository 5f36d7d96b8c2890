//! # Buzzer Tones
//!
//! Client for the buzzer driver, plus a small melody type for playing
//! note sequences with musical timing.
//!
//! A melody note pairs a frequency with a divider of the whole note:
//! `8` is an eighth note, `4` a quarter, and a negative divider marks a
//! dotted note (its duration is stretched by half). Each note sounds
//! for 90% of its duration, leaving a 10% pause so consecutive notes of
//! the same pitch stay distinguishable.

use driver_abi::scoped::Subscription;
use driver_abi::{CommandError, Completion, DriverHost, Duration, SubscribeError};
use driver_types::{ChannelId, CommandId, DriverNum, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The buzzer driver's platform number
pub const BUZZER_DRIVER: DriverNum = DriverNum::new(0x90000);

/// Subscription slot for tone completion
pub const COMPLETION_CHANNEL: ChannelId = ChannelId::new(BUZZER_DRIVER, 0);

/// Command playing a tone (arg0 = frequency Hz, arg1 = duration ms)
pub const PLAY_TONE: CommandId = CommandId::new(1);

/// Fraction of each note's duration that actually sounds, in percent
const SUSTAIN_PERCENT: u64 = 90;

/// Note frequencies, fourth octave plus the C above
pub mod notes {
    pub const C4: u32 = 262;
    pub const CS4: u32 = 277;
    pub const D4: u32 = 294;
    pub const DS4: u32 = 311;
    pub const E4: u32 = 330;
    pub const F4: u32 = 349;
    pub const FS4: u32 = 370;
    pub const G4: u32 = 392;
    pub const GS4: u32 = 415;
    pub const A4: u32 = 440;
    pub const AS4: u32 = 466;
    pub const B4: u32 = 494;
    pub const C5: u32 = 523;
}

/// Why a tone operation failed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToneError {
    /// The completion subscription was refused by the host
    #[error("tone subscription refused: {0}")]
    Subscribe(#[from] SubscribeError),

    /// The tone command was rejected by the driver
    #[error("tone command rejected: {0}")]
    Command(#[from] CommandError),

    /// The driver completed the tone with a non-success status
    #[error("tone completed with {0}")]
    Remote(StatusCode),
}

/// Client for the buzzer driver
#[derive(Debug, Default)]
pub struct Buzzer;

impl Buzzer {
    /// Creates a buzzer client
    pub fn new() -> Self {
        Self
    }

    /// Probes whether the buzzer driver is present
    pub fn is_available<H: DriverHost>(&self, host: &H) -> bool {
        host.driver_present(BUZZER_DRIVER)
    }

    /// Plays one tone, blocking until it finishes
    pub fn tone_sync<H: DriverHost>(
        &self,
        host: &H,
        frequency_hz: u32,
        duration: Duration,
    ) -> Result<(), ToneError> {
        let completion = Completion::new();
        let _subscription = Subscription::register(host, COMPLETION_CHANNEL, completion.upcall())?;

        host.issue_command(
            BUZZER_DRIVER,
            PLAY_TONE,
            frequency_hz,
            duration.as_millis() as u32,
        )?;
        let outcome = host.wait(&completion);

        if outcome.status.is_success() {
            Ok(())
        } else {
            Err(ToneError::Remote(outcome.status))
        }
    }
}

/// One note of a melody
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Pitch in Hz
    pub frequency_hz: u32,
    /// Divider of the whole note; negative marks a dotted note
    pub divider: i32,
}

/// A note sequence with a tempo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Melody {
    tempo_bpm: u32,
    notes: Vec<Note>,
}

impl Melody {
    /// Creates an empty melody at the given tempo
    pub fn new(tempo_bpm: u32) -> Self {
        Self {
            tempo_bpm,
            notes: Vec::new(),
        }
    }

    /// Appends a note
    pub fn with_note(mut self, frequency_hz: u32, divider: i32) -> Self {
        self.notes.push(Note {
            frequency_hz,
            divider,
        });
        self
    }

    /// Returns the notes in playback order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns the duration of one note, honoring dotted dividers
    fn note_duration(&self, note: &Note) -> Duration {
        // Four beats to the whole note.
        let whole_note_ms = (60_000 * 4) / u64::from(self.tempo_bpm);
        let duration_ms = match note.divider {
            0 => 0,
            d if d > 0 => whole_note_ms / d as u64,
            d => whole_note_ms / d.unsigned_abs() as u64 * 3 / 2,
        };
        Duration::from_millis(duration_ms)
    }

    /// Plays the melody, blocking until the last note
    pub fn play<H: DriverHost>(&self, host: &H, buzzer: &Buzzer) -> Result<(), ToneError> {
        for note in &self.notes {
            let duration = self.note_duration(note);
            let sustain = Duration::from_millis(duration.as_millis() * SUSTAIN_PERCENT / 100);
            buzzer.tone_sync(host, note.frequency_hz, sustain)?;
            host.sleep(duration - sustain);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_host::{SimBuzzer, SimulatedHost, Tone, ToneLog};

    fn buzzer_host() -> (SimulatedHost, ToneLog) {
        let host = SimulatedHost::new();
        let (driver, log) = SimBuzzer::new();
        host.register_driver(Box::new(driver));
        (host, log)
    }

    #[test]
    fn test_tone_sync_round_trip() {
        let (host, log) = buzzer_host();
        let buzzer = Buzzer::new();

        buzzer
            .tone_sync(&host, notes::A4, Duration::from_millis(120))
            .unwrap();

        assert_eq!(
            log.tones(),
            vec![Tone {
                frequency_hz: 440,
                duration_ms: 120
            }]
        );
        assert_eq!(host.active_subscription_count(), 0);
    }

    #[test]
    fn test_melody_note_durations() {
        // At 120 bpm the whole note is 2000 ms.
        let melody = Melody::new(120)
            .with_note(notes::C4, 4)
            .with_note(notes::D4, -8);
        let quarter = melody.note_duration(&melody.notes()[0]);
        let dotted_eighth = melody.note_duration(&melody.notes()[1]);
        assert_eq!(quarter, Duration::from_millis(500));
        assert_eq!(dotted_eighth, Duration::from_millis(375));
    }

    #[test]
    fn test_melody_plays_all_notes_with_sustain() {
        let (host, log) = buzzer_host();
        let buzzer = Buzzer::new();

        // At 95 bpm the whole note is 2526 ms; an eighth is 315 ms.
        let melody = Melody::new(95)
            .with_note(notes::G4, 8)
            .with_note(notes::C4, 8);
        melody.play(&host, &buzzer).unwrap();

        let tones = log.tones();
        assert_eq!(tones.len(), 2);
        assert_eq!(tones[0].frequency_hz, notes::G4);
        assert_eq!(tones[0].duration_ms, 315 * 90 / 100);
        assert_eq!(tones[1].frequency_hz, notes::C4);
    }

    #[test]
    fn test_buzzer_absent() {
        let host = SimulatedHost::new();
        let buzzer = Buzzer::new();
        assert!(!buzzer.is_available(&host));
        assert_eq!(
            buzzer.tone_sync(&host, notes::C4, Duration::from_millis(10)),
            Err(ToneError::Subscribe(SubscribeError::DriverAbsent))
        );
    }
}
