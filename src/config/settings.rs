//! Engine settings sections.
//!
//! # Main Types
//!
//! - [`PipelineSettings`] - Frame rate, fault policy and channel sizes
//! - [`LoggingConfig`] - Log filter and optional rolling log file
//! - [`FaultPolicy`] - What a computation fault does to the rest of a frame

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default frame rate in Hz
pub const DEFAULT_FRAME_RATE_HZ: u32 = 30;

/// Default channel capacity for commands (frontend → pipeline)
pub const DEFAULT_COMMAND_CAPACITY: usize = 256;

/// Default channel capacity for messages (pipeline → frontend).
/// 10,000 messages is several seconds of output at typical frame rates.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 10_000;

/// Default log filter when neither config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_FILTER: &str = "info,framegraph=debug";

/// How a computation fault affects the frame it happens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// The first fault ends the frame. Nodes that already ran keep their
    /// results until the next frame.
    #[default]
    AbortFrame,
    /// A fault skips only the entry node that hit it. Other entry nodes still
    /// run; nodes that faulted are not retried in the same frame.
    IsolateEntry,
}

impl std::fmt::Display for FaultPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultPolicy::AbortFrame => write!(f, "abort_frame"),
            FaultPolicy::IsolateEntry => write!(f, "isolate_entry"),
        }
    }
}

/// Pipeline runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Target frames per second for the frame driver (0 = unthrottled)
    pub frame_rate_hz: u32,

    pub fault_policy: FaultPolicy,

    /// Bounded command queue size
    pub command_capacity: usize,

    /// Bounded message queue size
    pub message_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
            fault_policy: FaultPolicy::default(),
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
        }
    }
}

impl PipelineSettings {
    /// Clamp values that would make the driver unusable.
    pub fn sanitized(mut self) -> Self {
        self.command_capacity = self.command_capacity.max(1);
        self.message_capacity = self.message_capacity.max(1);
        self
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string. `RUST_LOG` overrides it when set.
    pub filter: String,

    /// Directory for daily-rolling log files; no file logging when unset
    pub directory: Option<PathBuf>,

    /// Log file name prefix
    pub file_prefix: String,

    /// Include ANSI colors in console output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            directory: None,
            file_prefix: "framegraph.log".to_string(),
            ansi: true,
        }
    }
}
