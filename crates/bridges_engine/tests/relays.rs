mod support;

use bridges_engine::ServiceError;
use pretty_assertions::assert_eq;
use support::*;

#[tokio::test]
async fn ipv6_relays_are_bracketed() {
    init_logging();
    let fakes = Fakes {
        relays: FakeRelayDirectory::new(vec![Reply::now(Ok(vec![
            relay("2001:db8::1", 443, "AB12"),
            relay("5.6.7.8", 9001, "CD34"),
        ]))]),
        ..Fakes::default()
    };
    let mut session = fakes.session();
    let observers = session.observe();

    session.request_relay_bridges(true).await.unwrap();

    assert_eq!(
        *observers.relay_bridges.borrow(),
        vec![
            "[2001:db8::1]:443 AB12".to_string(),
            "5.6.7.8:9001 CD34".to_string(),
        ]
    );
    assert_eq!(fakes.relays.calls(), vec![true]);
    assert_eq!(*observers.errors.borrow(), None);
}

#[tokio::test]
async fn ipv4_relays_are_plain() {
    init_logging();
    let fakes = Fakes {
        relays: FakeRelayDirectory::new(vec![Reply::now(Ok(vec![relay("1.2.3.4", 443, "AB12")]))]),
        ..Fakes::default()
    };
    let mut session = fakes.session();
    let observers = session.observe();

    session.request_relay_bridges(false).await.unwrap();

    assert_eq!(
        *observers.relay_bridges.borrow(),
        vec!["1.2.3.4:443 AB12".to_string()]
    );
    assert_eq!(fakes.relays.calls(), vec![false]);
}

#[tokio::test]
async fn failure_message_goes_to_error_channel() {
    init_logging();
    let fakes = Fakes {
        relays: FakeRelayDirectory::new(vec![Reply::now(Err(ServiceError::failed(
            "relay directory unreachable",
        )))]),
        ..Fakes::default()
    };
    let mut session = fakes.session();
    let observers = session.observe();

    session.request_relay_bridges(false).await.unwrap();

    assert_eq!(
        *observers.errors.borrow(),
        Some("relay directory unreachable".to_string())
    );
    assert!(observers.relay_bridges.borrow().is_empty());
}

#[tokio::test]
async fn failures_without_message_and_cancellations_stay_silent() {
    init_logging();
    let fakes = Fakes {
        relays: FakeRelayDirectory::new(vec![
            Reply::now(Err(ServiceError::Unexplained)),
            Reply::now(Err(ServiceError::Cancelled)),
        ]),
        ..Fakes::default()
    };
    let mut session = fakes.session();
    let observers = session.observe();

    session.request_relay_bridges(false).await.unwrap();
    session.request_relay_bridges(false).await.unwrap();

    assert_eq!(*observers.errors.borrow(), None);
    assert!(observers.relay_bridges.borrow().is_empty());
    assert_eq!(fakes.relays.calls().len(), 2);
}

#[tokio::test]
async fn new_request_cancels_the_previous_one() {
    init_logging();
    let (slow, open) = Reply::gated(Ok(vec![relay("1.1.1.1", 443, "OLD")]));
    let fakes = Fakes {
        relays: FakeRelayDirectory::new(vec![
            slow,
            Reply::now(Ok(vec![relay("2.2.2.2", 443, "NEW")])),
        ]),
        ..Fakes::default()
    };
    let mut session = fakes.session();
    let observers = session.observe();

    let first = session.request_relay_bridges(false);
    settle().await;
    let second = session.request_relay_bridges(false);
    second.await.unwrap();
    first.await.unwrap();
    let _ = open.send(());
    settle().await;

    assert_eq!(
        *observers.relay_bridges.borrow(),
        vec!["2.2.2.2:443 NEW".to_string()]
    );
}

#[tokio::test]
async fn cancelled_request_publishes_nothing() {
    init_logging();
    let (slow, open) = Reply::gated(Err(ServiceError::failed("too late")));
    let fakes = Fakes {
        relays: FakeRelayDirectory::new(vec![slow]),
        ..Fakes::default()
    };
    let mut session = fakes.session();
    let observers = session.observe();

    let request = session.request_relay_bridges(true);
    settle().await;
    session.cancel_requesting_relay_bridges();
    request.await.unwrap();
    let _ = open.send(());
    settle().await;

    assert_eq!(*observers.errors.borrow(), None);
    assert!(observers.relay_bridges.borrow().is_empty());
}
