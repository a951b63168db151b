use vigilis::error::{ConfigError, ServerError};
use vigilis::{Outcome, ServerBuilder, Service};

use std::time::Duration;

/// Service that never completes a request; only construction matters
/// here.
struct Nop;

impl Service for Nop {
    fn respond(&self, _request: &[u8]) -> Outcome {
        Outcome::Incomplete
    }
}

#[test]
fn build_rejects_zero_worker_threads() {
    let result = ServerBuilder::new(0).worker_threads(0).service(Nop).build();
    assert!(matches!(
        result,
        Err(ServerError::Config(ConfigError::ZeroWorkerThreads))
    ));
}

#[test]
fn build_rejects_zero_queue_capacity() {
    let result = ServerBuilder::new(0).queue_capacity(0).service(Nop).build();
    assert!(matches!(
        result,
        Err(ServerError::Config(ConfigError::ZeroQueueCapacity))
    ));
}

#[test]
fn build_rejects_zero_max_connections() {
    let result = ServerBuilder::new(0).max_connections(0).service(Nop).build();
    assert!(matches!(
        result,
        Err(ServerError::Config(ConfigError::ZeroMaxConnections))
    ));
}

#[test]
fn build_rejects_zero_max_events() {
    let result = ServerBuilder::new(0).max_events(0).service(Nop).build();
    assert!(matches!(
        result,
        Err(ServerError::Config(ConfigError::ZeroMaxEvents))
    ));
}

#[test]
fn build_rejects_sub_second_tick() {
    let result = ServerBuilder::new(0)
        .tick_interval(Duration::from_millis(500))
        .service(Nop)
        .build();
    assert!(matches!(
        result,
        Err(ServerError::Config(ConfigError::TickIntervalTooShort))
    ));
}

#[test]
fn build_requires_a_service() {
    let result = ServerBuilder::new(0).build();
    assert!(matches!(
        result,
        Err(ServerError::Config(ConfigError::MissingService))
    ));
}
