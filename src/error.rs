use thiserror::Error;

/// Everything that can go wrong on a single emission call.
///
/// None of these are fatal to the process: the public API converts them into
/// a `false` return after logging. The worst outcome is one missing message.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The raw value does not fall into any supported unit range
    /// (seconds / millis / micros / nanos between 1971 and 2100).
    #[error("timestamp {0} is outside every supported unit range (1971..=2100)")]
    InvalidTimestamp(i64),

    /// A required field was missing or empty.
    #[error("invalid message field: {0}")]
    Encoding(String),

    /// JSON serialization failed. Should not happen for well-typed input.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The datagram could not be handed to the OS.
    #[error("transport send failed: {0}")]
    Transport(#[from] std::io::Error),
}
