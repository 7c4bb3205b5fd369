//! Process-wide claim on the engine session.
//!
//! The native library keeps a single global client, so at most one
//! [`SessionGuard`] exists at a time. The flag is released when the guard
//! drops.

use crate::error::{XlateError, XlateResult};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Held by whoever owns the engine session.
#[derive(Debug)]
pub struct SessionGuard {
    _private: (),
}

impl SessionGuard {
    /// Claims the session, or fails with [`XlateError::SessionActive`] while
    /// another guard is alive.
    pub fn acquire() -> XlateResult<Self> {
        if SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(XlateError::SessionActive);
        }
        debug!("Claimed dataplane session");
        Ok(Self { _private: () })
    }

    pub fn is_held() -> bool {
        SESSION_ACTIVE.load(Ordering::Acquire)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        SESSION_ACTIVE.store(false, Ordering::Release);
        debug!("Released dataplane session");
    }
}
