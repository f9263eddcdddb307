//! Process-local telemetry emission client.
//!
//! Application code reports marks, counters, gauges, notifications, and
//! lifecycle events (registrations, heartbeats) to a collector daemon on the
//! same host, one JSON object per UDP datagram. Delivery is best effort:
//! nothing here retries, blocks on an ack, or raises past the API boundary.
//!
//! A single background loop drives self-reporting: a built-in heartbeat plus
//! any recurring jobs the host registers via `schedule_recurring`.

pub mod client;
pub mod error;
pub mod identity;
pub mod message;
pub mod scheduler;
pub mod timestamp;
pub mod transport;

// Re-export specific items if needed for convenient access
pub use client::{ClientConfig, TelemetryClient, CLIENT_HEARTBEAT, DEFAULT_PORT};
pub use error::TelemetryError;
pub use scheduler::Tier;
