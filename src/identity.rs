use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Who is emitting. Stamped into every outbound message as the
/// `app`/`pid`/`tid` labels.
///
/// `pid` is read once and immutable. `app_name` is resolved at construction
/// (explicit config value, or the executable's file stem as a convenience
/// default) and can be overridden at any time; last write wins and is seen
/// by all subsequent encodings. The task id is per-call, see `current_tid`.
#[derive(Debug)]
pub struct Identity {
    pid: u32,
    app_name: RwLock<String>,
}

impl Identity {
    pub fn new(app_name: Option<String>) -> Self {
        let name = app_name.unwrap_or_else(default_app_name);
        Identity {
            pid: std::process::id(),
            app_name: RwLock::new(name),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn app_name(&self) -> String {
        match self.app_name.read() {
            Ok(guard) => guard.clone(),
            // A poisoned lock still holds a valid name.
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_app_name(&self, name: &str) {
        match self.app_name.write() {
            Ok(mut guard) => *guard = name.to_string(),
            Err(poisoned) => *poisoned.into_inner() = name.to_string(),
        }
    }
}

fn default_app_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

static NEXT_TID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static TID: u64 = NEXT_TID.fetch_add(1, Ordering::Relaxed);
}

/// Small unique id for the calling OS thread, assigned on first use.
/// Stable for the thread's lifetime, never zero.
pub fn current_tid() -> u64 {
    TID.with(|t| *t)
}
