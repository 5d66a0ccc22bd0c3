//! Executor Tests
//!
//! Tests for the dispatch/retry loop against a scripted transport. Time is
//! paused so deadlines and backoff run deterministically.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use mcbp_core::context::RetryReason;
use mcbp_core::operations::{
    poll_until, poll_until_persisted, ExistsRequest, Executor, GetRequest, HelloRequest,
    NoopRequest, Router, SaslListMechsRequest, StaticRouter,
};
use mcbp_core::protocol::commands::{HelloFeature, ObserveStatus};
use mcbp_core::protocol::{ClientOpcode, Frame, KeyValueStatus, Magic};
use mcbp_core::retry::RetryStrategy;
use mcbp_core::testing::{observe_value, respond_to, ScriptedReply, ScriptedTransport};
use mcbp_core::{Config, DispatchError, DocumentId, ErrorKind, McbpError};

const NODE: &str = "node-1:11210";

fn executor(replies: Vec<ScriptedReply>) -> Executor<ScriptedTransport, StaticRouter> {
    Executor::new(
        ScriptedTransport::new(replies),
        StaticRouter::new(NODE),
        Config::default(),
    )
    .unwrap()
}

fn doc(key: &str) -> DocumentId {
    DocumentId::in_default_collection("default", key)
}

fn get_hit(value: &[u8]) -> ScriptedReply {
    ScriptedReply::Respond {
        status: KeyValueStatus::Success,
        extras: 7u32.to_be_bytes().to_vec(),
        key: Vec::new(),
        value: value.to_vec(),
    }
}

fn observed(key: &str, byte: u8) -> ScriptedReply {
    ScriptedReply::Respond {
        status: KeyValueStatus::Success,
        extras: Vec::new(),
        key: Vec::new(),
        value: observe_value(3, key.as_bytes(), byte, 0xabcd),
    }
}

struct NoRoute;

impl Router for NoRoute {
    fn route(&self, _partition: u16) -> Option<String> {
        None
    }
}

// =============================================================================
// Success and Retry Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_get_success_first_attempt() {
    let executor = executor(vec![get_hit(b"hello")]);
    let response = executor
        .execute(&GetRequest::new(doc("k"), 3), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.flags, 7);
    assert_eq!(&response.value[..], b"hello");
    assert_eq!(response.ctx.retry_attempts(), 0);
    assert_eq!(response.ctx.last_dispatched_to(), Some(NODE));

    let dispatched = executor.transport().dispatched();
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].0, NODE);
    assert_eq!(dispatched[0].1.vbucket_or_status, 3);
    assert_eq!(&dispatched[0].1.key[..], b"k");
    assert_eq!(response.ctx.opaque(), dispatched[0].1.opaque);
}

#[tokio::test(start_paused = true)]
async fn test_not_my_vbucket_then_success() {
    let executor = executor(vec![
        ScriptedReply::Status(KeyValueStatus::NotMyVbucket),
        get_hit(b"v"),
    ]);
    let response = executor
        .execute(&GetRequest::new(doc("k"), 0), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.ctx.retry_attempts(), 1);
    assert!(response.ctx.retried_because_of(RetryReason::KvNotMyVbucket));
    assert_eq!(executor.transport().dispatch_count(), 2);

    // Every attempt carries a fresh opaque.
    let dispatched = executor.transport().dispatched();
    assert_ne!(dispatched[0].1.opaque, dispatched[1].1.opaque);
}

#[tokio::test(start_paused = true)]
async fn test_locked_retried_until_deadline() {
    let executor = executor(vec![
        ScriptedReply::Status(KeyValueStatus::Locked),
        ScriptedReply::Status(KeyValueStatus::Locked),
        ScriptedReply::Status(KeyValueStatus::Locked),
    ]);
    let request = GetRequest::new(doc("k"), 0).with_timeout(Duration::from_millis(20));
    let response = executor.execute(&request, &CancellationToken::new()).await;

    // Backoff 1ms, 10ms, then 50ms would pass the 20ms deadline.
    assert_eq!(response.ctx.outcome(), Err(ErrorKind::UnambiguousTimeout));
    assert_eq!(response.ctx.retry_attempts(), 3);
    assert_eq!(executor.transport().dispatch_count(), 3);
    assert!(response.ctx.retried_because_of(RetryReason::KvLocked));
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_terminal() {
    let executor = executor(vec![ScriptedReply::Status(KeyValueStatus::NotFound)]);
    let response = executor
        .execute(&GetRequest::new(doc("missing"), 0), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::DocumentNotFound));
    assert_eq!(response.ctx.retry_attempts(), 0);
    assert_eq!(response.ctx.status(), Some(KeyValueStatus::NotFound));
    assert!(matches!(
        response.ctx.ensure_success(),
        Err(McbpError::Operation(ErrorKind::DocumentNotFound))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_strategy_none_stops_on_first_failure() {
    let executor = executor(vec![ScriptedReply::Status(KeyValueStatus::NotMyVbucket)]);
    let request = GetRequest::new(doc("k"), 0).with_retry_strategy(RetryStrategy::None);
    let response = executor.execute(&request, &CancellationToken::new()).await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::ServiceNotAvailable));
    assert_eq!(response.ctx.retry_attempts(), 0);
    assert_eq!(response.ctx.terminal_reason(), Some(RetryReason::KvNotMyVbucket));
}

#[tokio::test(start_paused = true)]
async fn test_non_idempotent_socket_closed_not_retried() {
    let executor = executor(vec![ScriptedReply::Fail(DispatchError::ConnectionClosed)]);
    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 0), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::RequestCanceled));
    assert_eq!(
        response.ctx.terminal_reason(),
        Some(RetryReason::SocketClosedWhileInFlight)
    );
    assert_eq!(response.ctx.retry_attempts(), 0);
    assert_eq!(executor.transport().dispatch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_idempotent_socket_closed_retried() {
    let executor = executor(vec![
        ScriptedReply::Fail(DispatchError::ConnectionClosed),
        get_hit(b"v"),
    ]);
    let response = executor
        .execute(&GetRequest::new(doc("k"), 0), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert!(response
        .ctx
        .retried_because_of(RetryReason::SocketClosedWhileInFlight));
}

#[tokio::test(start_paused = true)]
async fn test_no_route_retries_until_timeout() {
    let executor = Executor::new(
        ScriptedTransport::default(),
        NoRoute,
        Config::builder().kv_timeout_ms(100).build(),
    )
    .unwrap();
    let response = executor
        .execute(&GetRequest::new(doc("k"), 0), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::UnambiguousTimeout));
    assert!(response.ctx.retried_because_of(RetryReason::NodeNotAvailable));
    assert_eq!(response.ctx.last_dispatched_to(), None);
    assert_eq!(executor.transport().dispatch_count(), 0);
}

// =============================================================================
// Timeout Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_idempotent_timeout_is_unambiguous() {
    let executor = executor(vec![ScriptedReply::Hang]);
    let request = GetRequest::new(doc("k"), 0).with_timeout(Duration::from_millis(100));
    let response = executor.execute(&request, &CancellationToken::new()).await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::UnambiguousTimeout));
    assert_eq!(response.ctx.last_dispatched_to(), Some(NODE));
}

#[tokio::test(start_paused = true)]
async fn test_non_idempotent_in_flight_timeout_is_ambiguous() {
    let executor = executor(vec![ScriptedReply::Hang]);
    let request = ExistsRequest::new(doc("k"), 0).with_timeout(Duration::from_millis(100));
    let response = executor.execute(&request, &CancellationToken::new()).await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::AmbiguousTimeout));
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_dispatch() {
    let executor = executor(vec![get_hit(b"v")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let response = executor.execute(&GetRequest::new(doc("k"), 0), &cancel).await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::RequestCanceled));
    assert_eq!(executor.transport().dispatch_count(), 0);
    assert!(matches!(response.ctx.ensure_success(), Err(McbpError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_backoff_after_in_flight_attempt() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let executor = executor(vec![
        ScriptedReply::Custom(Box::new(move |request| {
            trigger.cancel();
            respond_to(request, KeyValueStatus::TemporaryFailure, &[], &[], &[])
        })),
        get_hit(b"never sent"),
    ]);

    let response = executor.execute(&GetRequest::new(doc("k"), 0), &cancel).await;

    // The in-flight attempt finished but no retry was scheduled for it.
    assert_eq!(response.ctx.outcome(), Err(ErrorKind::RequestCanceled));
    assert_eq!(response.ctx.retry_attempts(), 0);
    assert!(response.ctx.retry_reasons().is_empty());
    assert_eq!(executor.transport().dispatch_count(), 1);
    assert_eq!(executor.transport().remaining(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_after_cancellation_is_discarded() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let executor = executor(vec![ScriptedReply::Custom(Box::new(move |request| {
        trigger.cancel();
        respond_to(request, KeyValueStatus::Success, &7u32.to_be_bytes(), &[], b"v")
    }))]);

    let response = executor.execute(&GetRequest::new(doc("k"), 0), &cancel).await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::RequestCanceled));
    assert!(response.value.is_empty());
    assert_eq!(response.flags, 0);
    assert_eq!(executor.transport().dispatch_count(), 1);
    assert!(matches!(
        response.ctx.ensure_success(),
        Err(McbpError::Cancelled)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_retryable_failure_after_cancellation_records_no_retry() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let executor = executor(vec![
        ScriptedReply::Custom(Box::new(move |request| {
            trigger.cancel();
            respond_to(request, KeyValueStatus::NotMyVbucket, &[], &[], &[])
        })),
        observed("k", 0x00),
    ]);

    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 3), &cancel)
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::RequestCanceled));
    assert_eq!(response.ctx.retry_attempts(), 0);
    assert!(!response.ctx.retried_because_of(RetryReason::KvNotMyVbucket));
    assert_eq!(executor.transport().dispatch_count(), 1);
    assert_eq!(executor.transport().remaining(), 1);
}

// =============================================================================
// Correlation Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_opaque_mismatch_is_protocol_error() {
    let executor = executor(vec![
        ScriptedReply::Custom(Box::new(|request| {
            let mut reply = respond_to(request, KeyValueStatus::Success, &[0, 0, 0, 0], &[], b"v");
            reply.opaque = request.opaque.wrapping_add(1);
            reply
        })),
        get_hit(b"v"),
    ]);
    let response = executor
        .execute(&GetRequest::new(doc("k"), 0), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::ProtocolError));
    assert_eq!(response.ctx.retry_attempts(), 0);
    assert_eq!(executor.transport().dispatch_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_response_rejected() {
    let executor = Executor::new(
        ScriptedTransport::new(vec![get_hit(&[b'x'; 64])]),
        StaticRouter::new(NODE),
        Config::builder().max_body_size(32).build(),
    )
    .unwrap();
    let response = executor
        .execute(&GetRequest::new(doc("k"), 0), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::ProtocolError));
}

#[tokio::test(start_paused = true)]
async fn test_local_address_recorded() {
    let executor = Executor::new(
        ScriptedTransport::new(vec![get_hit(b"v")]).with_local_address("10.1.1.1:5000"),
        StaticRouter::new(NODE),
        Config::default(),
    )
    .unwrap();
    let response = executor
        .execute(&GetRequest::new(doc("k"), 0), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.last_dispatched_from(), Some("10.1.1.1:5000"));
}

// =============================================================================
// Existence Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_exists_not_found() {
    let executor = executor(vec![ScriptedReply::Status(KeyValueStatus::NotFound)]);
    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 3), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.status, ObserveStatus::NotFound);
    assert!(!response.exists());
}

#[tokio::test(start_paused = true)]
async fn test_exists_persisted() {
    let executor = executor(vec![observed("k", 0x01)]);
    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 3), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.status, ObserveStatus::Persisted);
    assert!(response.exists());
    assert_eq!(response.cas, 0xabcd);
    assert_eq!(response.partition_id, 3);

    let dispatched = executor.transport().dispatched();
    let (_, request) = &dispatched[0];
    assert_eq!(
        &request.value[..],
        &[0x00, 0x03, 0x00, 0x01, b'k'][..]
    );
}

#[tokio::test(start_paused = true)]
async fn test_exists_logically_deleted_is_an_answer() {
    let executor = executor(vec![observed("k", 0x81)]);
    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 3), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.status, ObserveStatus::LogicallyDeleted);
    assert!(!response.exists());
}

#[tokio::test(start_paused = true)]
async fn test_exists_unknown_observe_byte_is_protocol_error() {
    let executor = executor(vec![observed("k", 0x42)]);
    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 3), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::ProtocolError));
    assert_eq!(response.status, ObserveStatus::Invalid);
    assert!(!response.exists());
}

#[tokio::test(start_paused = true)]
async fn test_exists_other_key_is_protocol_error() {
    let executor = executor(vec![observed("other", 0x00)]);
    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 3), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::ProtocolError));
}

#[tokio::test(start_paused = true)]
async fn test_exists_retries_topology_change() {
    let executor = executor(vec![
        ScriptedReply::Status(KeyValueStatus::NotMyVbucket),
        observed("k", 0x00),
    ]);
    let response = executor
        .execute(&ExistsRequest::new(doc("k"), 3), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.status, ObserveStatus::Found);
    assert_eq!(response.ctx.retry_attempts(), 1);
}

// =============================================================================
// Observe Poll Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_poll_until_persisted() {
    let executor = executor(vec![
        observed("k", 0x00),
        observed("k", 0x00),
        observed("k", 0x01),
    ]);
    let response = poll_until_persisted(
        &executor,
        &ExistsRequest::new(doc("k"), 3),
        Duration::from_secs(1),
        &CancellationToken::new(),
    )
    .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.status, ObserveStatus::Persisted);
    assert_eq!(executor.transport().dispatch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_times_out_with_last_snapshot() {
    let executor = executor((0..5).map(|_| observed("k", 0x00)).collect());
    let response = poll_until(
        &executor,
        &ExistsRequest::new(doc("k"), 3),
        Duration::from_millis(120),
        &CancellationToken::new(),
        |status| status == ObserveStatus::Persisted,
    )
    .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::UnambiguousTimeout));
    assert!(response.ctx.is_recontextualized());
    assert_eq!(response.ctx.recontextualized_from(), None);
    assert_eq!(response.status, ObserveStatus::Found);
    assert_eq!(executor.transport().dispatch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_stops_on_failure() {
    let executor = executor(vec![
        observed("k", 0x00),
        ScriptedReply::Status(KeyValueStatus::AuthError),
    ]);
    let response = poll_until_persisted(
        &executor,
        &ExistsRequest::new(doc("k"), 3),
        Duration::from_secs(1),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::AuthenticationFailure));
    assert!(!response.ctx.is_recontextualized());
}

// =============================================================================
// Scripted Helper Tests
// =============================================================================

#[test]
fn test_respond_to_echoes_correlation() {
    let mut request = Frame::new(Magic::Request, ClientOpcode::Get);
    request.opaque = 42;

    let reply = respond_to(&request, KeyValueStatus::NotFound, &[], &[], b"");
    assert_eq!(reply.magic, Magic::Response);
    assert_eq!(reply.opcode, ClientOpcode::Get);
    assert_eq!(reply.opaque, 42);
    assert_eq!(reply.status(), KeyValueStatus::NotFound);
}

#[test]
fn test_observe_value_layout() {
    let value = observe_value(7, b"ab", 0x01, 9);
    assert_eq!(&value[..6], &[0, 7, 0, 2, b'a', b'b']);
    assert_eq!(value[6], 0x01);
    assert_eq!(&value[7..], &9u64.to_be_bytes());
}

// =============================================================================
// Negotiation Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_sasl_listing_failure_is_authentication_failure() {
    let executor = executor(vec![ScriptedReply::Status(KeyValueStatus::AuthError)]);
    let response = executor
        .execute(&SaslListMechsRequest::default(), &CancellationToken::new())
        .await;

    assert_eq!(response.ctx.outcome(), Err(ErrorKind::AuthenticationFailure));
    assert_eq!(response.ctx.recontextualized_from(), Some(ErrorKind::ProtocolError));
    assert!(response.supported_mechs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hello_uses_configured_user_agent() {
    let executor = executor(vec![ScriptedReply::Respond {
        status: KeyValueStatus::Success,
        extras: Vec::new(),
        key: Vec::new(),
        value: vec![0x00, 0x12],
    }]);
    let request = HelloRequest::from_config(
        executor.config(),
        vec![HelloFeature::Collections, HelloFeature::Xerror],
    );
    let response = executor.execute(&request, &CancellationToken::new()).await;

    assert!(response.ctx.is_success());
    assert!(response.supports(HelloFeature::Collections));
    assert!(!response.supports(HelloFeature::Xerror));

    let dispatched = executor.transport().dispatched();
    let (_, sent) = &dispatched[0];
    assert!(sent.key.starts_with(b"mcbp-core/"));
    assert_eq!(&sent.value[..], &[0x00, 0x12, 0x00, 0x07]);
}

#[tokio::test(start_paused = true)]
async fn test_hello_not_my_vbucket_is_retried() {
    let executor = executor(vec![
        ScriptedReply::Status(KeyValueStatus::NotMyVbucket),
        ScriptedReply::Respond {
            status: KeyValueStatus::Success,
            extras: Vec::new(),
            key: Vec::new(),
            value: vec![0x00, 0x12],
        },
    ]);
    let request = HelloRequest::from_config(executor.config(), vec![HelloFeature::Collections]);
    let response = executor.execute(&request, &CancellationToken::new()).await;

    assert!(response.ctx.is_success());
    assert_eq!(response.ctx.retry_attempts(), 1);
    assert!(response.ctx.retried_because_of(RetryReason::KvNotMyVbucket));
    assert!(response.supports(HelloFeature::Collections));
    assert_eq!(executor.transport().dispatch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_noop_round_trip() {
    let executor = executor(vec![ScriptedReply::Status(KeyValueStatus::Success)]);
    let response = executor
        .execute(&NoopRequest::default(), &CancellationToken::new())
        .await;

    assert!(response.ctx.is_success());
    assert_eq!(response.server_duration, None);
}

#[test]
fn test_invalid_config_rejected() {
    let result = Executor::new(
        ScriptedTransport::default(),
        StaticRouter::new(NODE),
        Config::builder().observe_poll_interval_ms(0).build(),
    );

    assert!(matches!(result, Err(McbpError::Config(_))));
}
