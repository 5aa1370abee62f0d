//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use framegraph::pipeline::{PipelineBridge, SinkMessage};
use std::time::{Duration, Instant};

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(2)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Receive messages until `pred` matches one, or the timeout expires.
pub fn wait_for<F>(bridge: &PipelineBridge, mut pred: F) -> Option<SinkMessage>
where
    F: FnMut(&SinkMessage) -> bool,
{
    let deadline = Instant::now() + test_timeout();
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match bridge.recv_timeout(remaining) {
            Some(msg) if pred(&msg) => return Some(msg),
            Some(_) => continue,
            None => return None,
        }
    }
    None
}
