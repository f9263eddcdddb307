use std::net::UdpSocket;
use std::sync::{Arc, Mutex};

/// Where encoded messages go. Exactly two implementations exist: the real
/// UDP sink and an in-process log for tests. Both honor the same contract:
/// one payload in, `true`/`false` out, nothing thrown past the boundary.
pub trait Sink: Send + Sync {
    fn send(&self, payload: &[u8], port: u16) -> bool;
}

/// Fire-and-forget datagram sink. One fresh socket per call, one packet to
/// `127.0.0.1:<port>`, no retry, no ack. The socket is released on every
/// exit path by drop.
#[derive(Debug, Default)]
pub struct UdpSink;

impl UdpSink {
    pub fn new() -> Self {
        UdpSink
    }

    fn try_send(payload: &[u8], port: u16) -> std::io::Result<()> {
        let socket = UdpSocket::bind(("127.0.0.1", 0))?;
        socket.send_to(payload, ("127.0.0.1", port))?;
        Ok(())
    }
}

impl Sink for UdpSink {
    fn send(&self, payload: &[u8], port: u16) -> bool {
        match Self::try_send(payload, port) {
            Ok(()) => true,
            Err(e) => {
                // Best effort: the caller loses one message, nothing else.
                tracing::warn!("udp send to 127.0.0.1:{} failed: {}", port, e);
                false
            }
        }
    }
}

/// Test-mode sink: decodes each payload and appends it to an ordered log.
/// Clones share the same log, so tests keep a handle and hand another to
/// the client.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    log: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, in send order.
    pub fn messages(&self) -> Vec<serde_json::Value> {
        self.log.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.log.lock() {
            guard.clear();
        }
    }
}

impl Sink for MemorySink {
    fn send(&self, payload: &[u8], _port: u16) -> bool {
        match serde_json::from_slice(payload) {
            Ok(value) => {
                if let Ok(mut guard) = self.log.lock() {
                    guard.push(value);
                }
                true
            }
            Err(e) => {
                tracing::warn!("memory sink received non-JSON payload: {}", e);
                false
            }
        }
    }
}
