// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::adapter::{
    CheckVerdict, Creation, ObjectAdapter, StepContext, StepOutcome, Validation,
};
use crate::model::{
    ActivationResult, LifecycleState, ObjectDescriptor, ObjectPayload, SessionState,
};

use super::coordinator::{LockAcquisition, LockCoordinator};
use super::{
    LifecycleError, LifecycleFailure, LifecycleReport, RunOptions, RunOutcome, SkipReason,
    StepName,
};

/// Drives the generic state machine over one `ObjectAdapter`.
///
/// Steps run strictly sequentially; step N's request always carries the
/// SessionState produced by step N-1's response. Once a lock is granted the
/// run enters a region where cleanup is mandatory: unlock is attempted exactly
/// once on both the success and failure paths, and a cleanup failure is
/// attached as secondary context, never replacing the primary error.
#[derive(Debug, Default)]
pub struct LifecycleOrchestrator {
    coordinator: LockCoordinator,
}

impl LifecycleOrchestrator {
    pub fn new() -> Self {
        Self {
            coordinator: LockCoordinator::new(),
        }
    }

    /// Cancellation is not supported mid-step. A caller-level timeout should
    /// wrap individual forward steps rather than this whole future: cancelling
    /// `run` at an await point would skip the unlock cleanup, and leaving the
    /// remote object locked is worse than a late cleanup call.
    pub async fn run(
        &self,
        ctx: &StepContext<'_>,
        adapter: &dyn ObjectAdapter,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        options: &RunOptions,
    ) -> Result<LifecycleReport, LifecycleFailure> {
        let mut steps: Vec<StepName> = Vec::new();
        let mut state = LifecycleState::Unvalidated;

        // Transport gating is local and runs before any remote call.
        if options.mutates() && descriptor.ensure_transport().is_err() {
            return Err(fail(LifecycleError::TransportRejected {
                package: descriptor.package().as_str().to_owned(),
            }));
        }

        let mut session = match options.session() {
            Some(session) => session.clone(),
            None => ctx.connection().handshake().await.map_err(|err| {
                fail(LifecycleError::NetworkFailure {
                    message: err.to_string(),
                })
            })?,
        };

        if options.validate() {
            let step = adapter
                .validate(ctx, descriptor, payload, session)
                .await
                .map_err(fail)?;
            let (outcome, next) = step.into_parts();
            session = next;
            match outcome {
                StepOutcome::Done(Validation::Accepted) => {
                    steps.push(StepName::Validate);
                    state = LifecycleState::Validated;
                }
                StepOutcome::Done(Validation::AlreadyExists) => {
                    steps.push(StepName::Validate);
                    return Ok(skip_report(LifecycleState::Validated, steps, session));
                }
                StepOutcome::Skipped => {}
            }
        }

        if options.create() {
            let step = adapter
                .create(ctx, descriptor, payload, session)
                .await
                .map_err(fail)?;
            let (outcome, next) = step.into_parts();
            session = next;
            match outcome {
                StepOutcome::Done(Creation::Created) => {
                    steps.push(StepName::Create);
                    state = LifecycleState::Created;
                }
                StepOutcome::Done(Creation::AlreadyExists) => {
                    steps.push(StepName::Create);
                    return Ok(skip_report(state, steps, session));
                }
                StepOutcome::Skipped => {}
            }
        }

        if options.needs_lock() {
            match self
                .coordinator
                .acquire(adapter, ctx, descriptor, session.clone())
                .await
                .map_err(fail)?
            {
                LockAcquisition::Unsupported(next) => {
                    session = next;
                }
                LockAcquisition::Granted(handle) => {
                    steps.push(StepName::Lock);
                    state = LifecycleState::Locked;
                    // Every subsequent step rebinds to the lock-response
                    // session, not the one that requested the lock.
                    session = handle.owning_session().clone();

                    let forward = self
                        .locked_steps(
                            ctx,
                            adapter,
                            descriptor,
                            payload,
                            options,
                            &mut steps,
                            &mut state,
                            &mut session,
                            &handle,
                        )
                        .await;

                    // Cleanup phase: runs on the success and the failure path.
                    let cleanup = self
                        .coordinator
                        .release(adapter, ctx, descriptor, handle)
                        .await;
                    steps.push(StepName::Unlock);

                    match (forward, cleanup) {
                        (Ok(()), Ok(next)) => {
                            session = next;
                            state = LifecycleState::Unlocked;
                        }
                        (Ok(()), Err(error)) => {
                            return Err(fail(error));
                        }
                        (Err(primary), Ok(_)) => {
                            return Err(fail(primary));
                        }
                        (Err(primary), Err(cleanup_error)) => {
                            tracing::warn!(
                                object = %descriptor,
                                error = %cleanup_error,
                                "unlock cleanup failed"
                            );
                            return Err(LifecycleFailure::new(
                                primary,
                                LifecycleState::Failed,
                                Some(cleanup_error.to_string()),
                            ));
                        }
                    }
                }
            }
        }

        let mut activation: Option<ActivationResult> = None;
        if options.activate() {
            let step = adapter
                .activate(ctx, descriptor, session.clone())
                .await
                .map_err(fail)?;
            let (outcome, next) = step.into_parts();
            session = next;
            if let StepOutcome::Done(result) = outcome {
                steps.push(StepName::Activate);
                if !result.is_success() {
                    return Err(fail(LifecycleError::ActivationFailed {
                        object: descriptor.to_string(),
                        messages: result.messages().to_vec(),
                    }));
                }
                state = LifecycleState::Activated;
                activation = Some(result);
            }
        }

        Ok(LifecycleReport::new(
            RunOutcome::Completed,
            state,
            steps,
            activation,
            session,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    async fn locked_steps(
        &self,
        ctx: &StepContext<'_>,
        adapter: &dyn ObjectAdapter,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        options: &RunOptions,
        steps: &mut Vec<StepName>,
        state: &mut LifecycleState,
        session: &mut SessionState,
        handle: &crate::model::LockHandle,
    ) -> Result<(), LifecycleError> {
        if options.delete() {
            let step = adapter
                .delete(ctx, descriptor, session.clone(), handle)
                .await?;
            let (outcome, next) = step.into_parts();
            *session = next;
            if matches!(outcome, StepOutcome::Done(())) {
                steps.push(StepName::Delete);
                *state = LifecycleState::Modified;
            }
            return Ok(());
        }

        if options.update() {
            let step = adapter
                .update(ctx, descriptor, payload, session.clone(), handle)
                .await?;
            let (outcome, next) = step.into_parts();
            *session = next;
            if matches!(outcome, StepOutcome::Done(())) {
                steps.push(StepName::Update);
                *state = LifecycleState::Modified;
            }
        }

        if options.check() {
            let step = adapter.check(ctx, descriptor, session.clone()).await?;
            let (outcome, next) = step.into_parts();
            *session = next;
            if let StepOutcome::Done(verdict) = outcome {
                steps.push(StepName::Check);
                *state = LifecycleState::Modified;
                if verdict == CheckVerdict::AlreadyChecked {
                    tracing::debug!(object = %descriptor, "object reported as already checked");
                }
            }
        }

        Ok(())
    }
}

fn fail(error: LifecycleError) -> LifecycleFailure {
    LifecycleFailure::new(error, LifecycleState::Failed, None)
}

fn skip_report(
    state: LifecycleState,
    steps: Vec<StepName>,
    session: SessionState,
) -> LifecycleReport {
    LifecycleReport::new(
        RunOutcome::Skipped {
            reason: SkipReason::AlreadyExists,
        },
        state,
        steps,
        None,
        session,
    )
}
