use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use crate::error::TelemetryError;
use crate::identity::Identity;
use crate::message::{self, Message};
use crate::scheduler::{Scheduler, Tier};
use crate::transport::{Sink, UdpSink};

/// Default destination port of the co-located collector daemon.
pub const DEFAULT_PORT: u16 = 8125;

/// `app` label the built-in heartbeat job stamps on its own messages, so the
/// daemon can tell the client's liveness signal apart from host traffic.
pub const CLIENT_HEARTBEAT: &str = "client_heartbeat";

/// Tier the built-in heartbeat is registered at.
const HEARTBEAT_TIER: Tier = Tier::Minute;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Emitting application's name. Defaults to the executable's file stem.
    pub app_name: Option<String>,
    /// Collector daemon port. Override before the first send.
    pub port: u16,
    /// Whether `start` seeds the built-in heartbeat job.
    pub heartbeat: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            app_name: None,
            port: DEFAULT_PORT,
            heartbeat: true,
        }
    }
}

struct Inner {
    identity: Identity,
    sink: Box<dyn Sink>,
    port: AtomicU16,
    scheduler: Arc<Scheduler>,
    heartbeat: bool,
}

/// The emission client. One instance per process, constructed by the entry
/// point and passed (cloned, it is a cheap handle) to wherever stats
/// originate.
///
/// Every emission operation returns a success flag and never panics or
/// propagates an error: a failed call means one lost message, nothing more.
/// The daemon's absence detection is the backstop, not this client.
#[derive(Clone)]
pub struct TelemetryClient {
    inner: Arc<Inner>,
}

impl TelemetryClient {
    /// Client with the real UDP transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_sink(config, Box::new(UdpSink::new()))
    }

    /// Client with a caller-supplied sink. Used by tests to swap the UDP
    /// transport for an in-process log without changing any field-level
    /// behavior.
    pub fn with_sink(config: ClientConfig, sink: Box<dyn Sink>) -> Self {
        TelemetryClient {
            inner: Arc::new(Inner {
                identity: Identity::new(config.app_name),
                sink,
                port: AtomicU16::new(config.port),
                scheduler: Arc::new(Scheduler::new()),
                heartbeat: config.heartbeat,
            }),
        }
    }

    /// Spawns the background scheduler loop and seeds the built-in heartbeat
    /// job. Call once from within a tokio runtime; the loop runs for the
    /// remaining life of the process.
    pub fn start(&self) {
        if self.inner.heartbeat {
            let client = self.clone();
            self.inner.scheduler.add_job(HEARTBEAT_TIER, move || {
                let mut labels = HashMap::new();
                labels.insert("app".to_string(), CLIENT_HEARTBEAT.to_string());
                client.heartbeat(Some(&labels));
            });
        }
        tracing::info!(
            "telemetry client started (app={}, port={})",
            self.inner.identity.app_name(),
            self.port()
        );
        tokio::spawn(Arc::clone(&self.inner.scheduler).run());
    }

    /// Records that something happened at a point in time.
    pub fn mark(
        &self,
        name: &str,
        timestamp: Option<i64>,
        labels: Option<&HashMap<String, String>>,
    ) -> bool {
        self.emit(message::mark(name, timestamp, labels, &self.inner.identity))
    }

    /// Adds `increment` to the named counter.
    pub fn counter(
        &self,
        name: &str,
        timestamp: Option<i64>,
        increment: f64,
        labels: Option<&HashMap<String, String>>,
    ) -> bool {
        self.emit(message::counter(
            name,
            timestamp,
            increment,
            labels,
            &self.inner.identity,
        ))
    }

    /// Reports the current value of the named gauge.
    pub fn gauge(
        &self,
        name: &str,
        timestamp: Option<i64>,
        value: f64,
        labels: Option<&HashMap<String, String>>,
    ) -> bool {
        self.emit(message::gauge(
            name,
            timestamp,
            value,
            labels,
            &self.inner.identity,
        ))
    }

    /// Notifies the daemon of a problem in the application.
    pub fn notify(&self, text: &str, labels: Option<&HashMap<String, String>>) -> bool {
        self.emit(message::notification(text, labels, &self.inner.identity))
    }

    /// Registers a daemon-side plugin. `interval` is in seconds.
    pub fn register_plugin(
        &self,
        path: &str,
        args: &str,
        name: &str,
        interval: f64,
        labels: Option<&HashMap<String, String>>,
    ) -> bool {
        self.emit(message::register_plugin(
            path,
            args,
            name,
            interval,
            labels,
            &self.inner.identity,
        ))
    }

    /// Registers the application with the daemon.
    pub fn register_service(&self, labels: Option<&HashMap<String, String>>) -> bool {
        self.emit(message::register_service(labels, &self.inner.identity))
    }

    /// Sends a liveness signal.
    pub fn heartbeat(&self, labels: Option<&HashMap<String, String>>) -> bool {
        self.emit(message::heartbeat(labels, &self.inner.identity))
    }

    /// Registers a recurring job, e.g. to report a statistic at a fixed
    /// interval. The callback runs on the background loop and must not
    /// block indefinitely or it starves every other job.
    pub fn schedule_recurring(&self, tier: Tier, job: impl Fn() + Send + Sync + 'static) {
        self.inner.scheduler.add_job(tier, job);
    }

    /// Overrides the application name used for the `app` label.
    pub fn set_app_name(&self, name: &str) {
        self.inner.identity.set_app_name(name);
    }

    pub fn app_name(&self) -> String {
        self.inner.identity.app_name()
    }

    pub fn port(&self) -> u16 {
        self.inner.port.load(Ordering::Relaxed)
    }

    pub fn set_port(&self, port: u16) {
        self.inner.port.store(port, Ordering::Relaxed);
    }

    /// The shared scheduler, exposed so callers (and tests) can drive it
    /// directly.
    pub fn scheduler(&self) -> Arc<Scheduler> {
        Arc::clone(&self.inner.scheduler)
    }

    fn emit(&self, encoded: Result<Message, TelemetryError>) -> bool {
        let msg = match encoded {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("dropping message: {}", e);
                return false;
            }
        };
        match serde_json::to_vec(&msg) {
            Ok(payload) => self.inner.sink.send(&payload, self.port()),
            Err(e) => {
                tracing::warn!("dropping message: {}", TelemetryError::Serialize(e));
                false
            }
        }
    }
}
