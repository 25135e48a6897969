//! # Session State
//!
//! Shared handle to the single active [`SaleSession`].
//!
//! ## Thread Safety
//! The session sits behind `Arc<Mutex<T>>` so the stats task and the
//! command loop can share the controller. Every access goes through
//! [`SessionState::with_session`] / [`SessionState::with_session_mut`],
//! which keep the lock for the duration of one closure, never across an
//! `.await`.

use std::sync::{Arc, Mutex, PoisonError};

use pharma_core::SaleSession;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<SaleSession>>,
}

impl SessionState {
    /// Creates state holding an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SaleSession) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Runs `f` with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SaleSession) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    /// A copy of the current session, for work that has to await.
    pub fn snapshot(&self) -> SaleSession {
        self.with_session(SaleSession::clone)
    }

    pub fn reset(&self) {
        self.with_session_mut(SaleSession::reset);
    }

    /// Resets only if the session still equals `expected`.
    ///
    /// Returns `false` when something replaced or changed the session
    /// after `expected` was taken; that newer state is kept.
    pub fn reset_if_unchanged(&self, expected: &SaleSession) -> bool {
        self.with_session_mut(|session| {
            if session == expected {
                session.reset();
                true
            } else {
                false
            }
        })
    }
}
