use std::env;
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Holds the env mutex and wipes every `RECASTER_` variable on both entry
/// and drop, so envy-based tests cannot observe each other's state.
pub struct EnvGuard {
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn wipe() {
        for (key, _) in env::vars() {
            if key.starts_with("RECASTER_") {
                env::remove_var(key);
            }
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        Self::wipe();
    }
}

pub fn with_recaster_env<'a>(vars: impl IntoIterator<Item = (&'a str, &'a str)>) -> EnvGuard {
    let lock = ENV_LOCK.lock().expect("Failed to lock env mutex");
    EnvGuard::wipe();
    for (k, v) in vars {
        env::set_var(k, v);
    }
    EnvGuard { _lock: lock }
}
