// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::adapter::{ObjectAdapter, StepContext, StepOutcome};
use crate::model::{LockHandle, ObjectDescriptor, SessionState};

use super::LifecycleError;

/// How a lock attempt ended when it did not error.
#[derive(Debug)]
pub enum LockAcquisition {
    /// The lock was granted; the handle is bound to the lock-response session.
    Granted(LockHandle),
    /// The adapter has no lock operation for this kind.
    Unsupported(SessionState),
}

/// Acquires and releases lock handles, enforcing the one-token-one-release
/// contract: a handle is bound here to the session returned *by* the lock
/// call, release consumes the handle (so releasing twice does not compile),
/// and preconditions are checked before any network call is made.
#[derive(Debug, Default)]
pub struct LockCoordinator;

impl LockCoordinator {
    pub fn new() -> Self {
        Self
    }

    pub async fn acquire(
        &self,
        adapter: &dyn ObjectAdapter,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<LockAcquisition, LifecycleError> {
        let step = adapter.lock(ctx, descriptor, session).await?;
        let (outcome, session) = step.into_parts();
        match outcome {
            StepOutcome::Done(grant) => {
                if !session.is_established() {
                    return Err(LifecycleError::InvalidLockResponse);
                }
                let handle = LockHandle::new(grant.into_token(), session);
                tracing::debug!(object = %descriptor, "lock acquired");
                Ok(LockAcquisition::Granted(handle))
            }
            StepOutcome::Skipped => Ok(LockAcquisition::Unsupported(session)),
        }
    }

    /// Releases one handle using its owning session, never any other session
    /// in scope. The handle is consumed whether or not the remote call
    /// succeeds; it must not be reconstructed afterwards.
    pub async fn release(
        &self,
        adapter: &dyn ObjectAdapter,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        handle: LockHandle,
    ) -> Result<SessionState, LifecycleError> {
        if !handle.owning_session().is_established() {
            return Err(LifecycleError::LockState {
                message: "lock handle is not bound to an established session".to_owned(),
            });
        }
        let next = adapter.unlock(ctx, descriptor, handle).await?;
        tracing::debug!(object = %descriptor, "lock released");
        Ok(next)
    }
}
