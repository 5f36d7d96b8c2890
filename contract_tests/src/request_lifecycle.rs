//! Request lifecycle contracts
//!
//! The core guarantees of the network request client, exercised over a
//! fully populated badge.

#[cfg(test)]
mod tests {
    use crate::test_board::badge;
    use button_events::Buttons;
    use driver_types::{ChannelKind, StatusCode};
    use net_request::{
        NetworkClient, RequestError, PAYLOAD_CHANNEL, RESPONSE_CHANNEL, URL_CHANNEL,
    };
    use sim_host::{FaultPlan, HostEvent, HostFault, SimNetworkDriver, SimulatedHost};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn establishments(host: &SimulatedHost, kind: ChannelKind) -> usize {
        host.audit_snapshot()
            .iter()
            .filter(|record| {
                matches!(record.event, HostEvent::GrantEstablished { kind: k, .. } if k == kind)
            })
            .count()
    }

    fn revocations(host: &SimulatedHost, kind: ChannelKind) -> usize {
        host.audit_snapshot()
            .iter()
            .filter(|record| {
                matches!(record.event, HostEvent::GrantRevoked { kind: k, .. } if k == kind)
            })
            .count()
    }

    #[test]
    fn test_get_hello_within_capacity() {
        let board = badge();
        board.network.enqueue_body(b"hello");

        let client = NetworkClient::new();
        let body = client.get(board.host.as_ref(), "http://x/").unwrap();
        assert_eq!(body, b"hello");

        // Both grants were established and revoked exactly once each.
        assert_eq!(establishments(&board.host, ChannelKind::ReadGrant), 1);
        assert_eq!(revocations(&board.host, ChannelKind::ReadGrant), 1);
        assert_eq!(establishments(&board.host, ChannelKind::WriteGrant), 1);
        assert_eq!(revocations(&board.host, ChannelKind::WriteGrant), 1);
        assert_eq!(board.host.active_subscription_count(), 0);

        // The lock is free again.
        board.network.enqueue_body(b"again");
        assert_eq!(client.get(board.host.as_ref(), "http://x/").unwrap(), b"again");
    }

    #[test]
    fn test_get_while_awaiting_is_rejected_and_first_completes() {
        let board = badge();
        board.network.enqueue_body(b"hello");

        let client = Rc::new(NetworkClient::new());
        let overlap: Rc<RefCell<Option<Result<Vec<u8>, RequestError>>>> =
            Rc::new(RefCell::new(None));

        // Button A fires while the first request is suspended in its
        // wait; its handler attempts a second request on the same
        // client.
        let buttons = Buttons::new();
        let subscription = {
            let host = Rc::clone(&board.host);
            let client = Rc::clone(&client);
            let slot = Rc::clone(&overlap);
            buttons
                .subscribe(board.host.as_ref(), move |event| {
                    if event.pressed {
                        *slot.borrow_mut() = Some(client.get(&*host, "http://x/overlap"));
                    }
                })
                .unwrap()
        };
        buttons.enable_interrupt(board.host.as_ref(), 0).unwrap();
        board.buttons.press(&board.host, 0);

        let body = client.get(board.host.as_ref(), "http://x/").unwrap();
        assert_eq!(body, b"hello");

        // The overlapping attempt got `Busy` and left no trace: one
        // request's worth of grants, and only one observed request.
        assert_eq!(*overlap.borrow(), Some(Err(RequestError::Busy)));
        assert_eq!(board.network.request_count(), 1);
        assert!(board.host.grants_balanced());
        drop(subscription);
    }

    #[test]
    fn test_post_payload_grant_failure_scenario() {
        let host = SimulatedHost::new().with_fault_plan(FaultPlan::new().with_fault(
            HostFault::RejectGrantsOn {
                channel: PAYLOAD_CHANNEL,
                kind: ChannelKind::ReadGrant,
                count: 1,
            },
        ));
        let (net, network) = SimNetworkDriver::new();
        host.register_driver(Box::new(net));

        let client = NetworkClient::new();
        assert_eq!(
            client.post(&host, "http://x/", b"body"),
            Err(RequestError::Grant(driver_abi::GrantError::Refused))
        );

        // The URL grant and inbound buffer grant that did succeed were
        // both revoked.
        let url_revokes = host
            .audit_snapshot()
            .iter()
            .filter(|record| {
                matches!(
                    record.event,
                    HostEvent::GrantRevoked {
                        channel,
                        kind: ChannelKind::ReadGrant,
                    } if channel == URL_CHANNEL
                )
            })
            .count();
        let response_revokes = host
            .audit_snapshot()
            .iter()
            .filter(|record| {
                matches!(
                    record.event,
                    HostEvent::GrantRevoked {
                        channel,
                        kind: ChannelKind::WriteGrant,
                    } if channel == RESPONSE_CHANNEL
                )
            })
            .count();
        assert_eq!(url_revokes, 1);
        assert_eq!(response_revokes, 1);
        assert!(host.grants_balanced());

        // The lock is free for the next call.
        network.enqueue_body(b"");
        assert!(client.post(&host, "http://x/", b"body").is_ok());
    }

    #[test]
    fn test_truncation_passthrough() {
        let board = badge();
        board
            .network
            .enqueue_body(b"a response far longer than the tiny buffer");

        let client = NetworkClient::with_capacity(8);
        let body = client.get(board.host.as_ref(), "http://x/").unwrap();

        assert_eq!(body.len(), 8);
        assert_eq!(body, b"a respon");
        assert!(board.host.grants_balanced());
    }

    #[test]
    fn test_resource_balance_across_every_failure_branch() {
        let plans: Vec<FaultPlan> = vec![
            FaultPlan::new().with_fault(HostFault::RejectGrantsOn {
                channel: RESPONSE_CHANNEL,
                kind: ChannelKind::WriteGrant,
                count: 1,
            }),
            FaultPlan::new().with_fault(HostFault::RejectGrantsOn {
                channel: URL_CHANNEL,
                kind: ChannelKind::ReadGrant,
                count: 1,
            }),
            FaultPlan::new().with_fault(HostFault::RejectGrantsOn {
                channel: PAYLOAD_CHANNEL,
                kind: ChannelKind::ReadGrant,
                count: 1,
            }),
            FaultPlan::new().with_fault(HostFault::RejectSubscribes { count: 1 }),
            FaultPlan::new().with_fault(HostFault::RejectCommands { count: 1 }),
        ];

        for plan in plans {
            let host = SimulatedHost::new().with_fault_plan(plan.clone());
            let (net, _script) = SimNetworkDriver::new();
            host.register_driver(Box::new(net));

            let client = NetworkClient::new();
            let _ = client.get(&host, "http://x/");
            let _ = client.post(&host, "http://x/", b"body");

            assert!(host.grants_balanced(), "unbalanced under {plan:?}");
            assert_eq!(host.active_grant_count(), 0, "leaked grant under {plan:?}");
            assert_eq!(
                host.active_subscription_count(),
                0,
                "leaked subscription under {plan:?}"
            );
        }
    }

    #[test]
    fn test_post_remote_failure_exposes_no_bytes() {
        let board = badge();
        board
            .network
            .enqueue_response(StatusCode::new(500), b"secret acknowledgement");

        let client = NetworkClient::new();
        let result = client.post(board.host.as_ref(), "http://x/", b"5m^");
        assert_eq!(result, Err(RequestError::Remote(StatusCode::new(500))));

        // Pass/fail is all a POST ever yields; the inbound buffer was
        // revoked and discarded.
        assert!(board.host.grants_balanced());
        assert_eq!(board.host.active_grant_count(), 0);
    }
}
