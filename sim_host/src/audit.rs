//! Host operation audit trail
//!
//! Simulation-only logging for test verification: every boundary
//! operation is recorded in order with its simulated timestamp, so tests
//! can prove properties like "every grant was revoked before the call
//! returned" instead of trusting the code under test.

use driver_abi::Instant;
use driver_types::{ChannelId, ChannelKind, CommandId, DriverNum, UpcallArgs};

/// One boundary operation observed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A memory grant was established
    GrantEstablished {
        channel: ChannelId,
        kind: ChannelKind,
        bytes: usize,
    },
    /// A memory grant was revoked
    GrantRevoked { channel: ChannelId, kind: ChannelKind },
    /// An upcall subscription was registered
    Subscribed { channel: ChannelId },
    /// An upcall subscription was cancelled
    Unsubscribed { channel: ChannelId },
    /// A command reached the host (accepted or rejected)
    CommandIssued {
        driver: DriverNum,
        command: CommandId,
        accepted: bool,
    },
    /// An upcall was delivered to a subscribed handler
    UpcallDelivered { channel: ChannelId, args: UpcallArgs },
}

/// An audit event with its simulated timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: Instant,
    pub event: HostEvent,
}

/// Chronological record of boundary operations
#[derive(Debug, Default)]
pub struct HostAuditLog {
    records: Vec<AuditRecord>,
}

impl HostAuditLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Appends an event at the given simulated time
    pub fn record(&mut self, timestamp: Instant, event: HostEvent) {
        self.records.push(AuditRecord { timestamp, event });
    }

    /// Returns all records in order
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Counts events matching a predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&HostEvent) -> bool,
    {
        self.records
            .iter()
            .filter(|record| predicate(&record.event))
            .count()
    }

    /// Number of grant establishments recorded
    pub fn grants_established(&self) -> usize {
        self.count(|event| matches!(event, HostEvent::GrantEstablished { .. }))
    }

    /// Number of grant revocations recorded
    pub fn grants_revoked(&self) -> usize {
        self.count(|event| matches!(event, HostEvent::GrantRevoked { .. }))
    }

    /// True if establishments and revocations pair up exactly
    pub fn grants_balanced(&self) -> bool {
        self.grants_established() == self.grants_revoked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driver_types::DriverNum;

    fn channel() -> ChannelId {
        ChannelId::new(DriverNum::new(0xa0001), 0)
    }

    #[test]
    fn test_empty_log_is_balanced() {
        let log = HostAuditLog::new();
        assert_eq!(log.records().len(), 0);
        assert!(log.grants_balanced());
    }

    #[test]
    fn test_grant_counting() {
        let mut log = HostAuditLog::new();
        log.record(
            Instant::EPOCH,
            HostEvent::GrantEstablished {
                channel: channel(),
                kind: ChannelKind::ReadGrant,
                bytes: 16,
            },
        );
        assert_eq!(log.grants_established(), 1);
        assert_eq!(log.grants_revoked(), 0);
        assert!(!log.grants_balanced());

        log.record(
            Instant::EPOCH,
            HostEvent::GrantRevoked {
                channel: channel(),
                kind: ChannelKind::ReadGrant,
            },
        );
        assert!(log.grants_balanced());
    }

    #[test]
    fn test_count_with_predicate() {
        let mut log = HostAuditLog::new();
        log.record(Instant::EPOCH, HostEvent::Subscribed { channel: channel() });
        log.record(
            Instant::EPOCH,
            HostEvent::Unsubscribed { channel: channel() },
        );
        let subscribes = log.count(|event| matches!(event, HostEvent::Subscribed { .. }));
        assert_eq!(subscribes, 1);
    }
}
