// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;

use crate::model::{
    ActivationResult, LockHandle, ObjectDescriptor, ObjectKind, ObjectPayload, SessionState,
};
use crate::orchestrator::LifecycleError;

use super::{wire, Creation, LockGrant, ObjectSource, Step, StepContext, Validation};

/// Function containers. A fresh container holds no source of its own;
/// activating it typically only generates scaffolding includes, which is a
/// valid terminal state. Update and check stay at their skip defaults.
pub struct FunctionGroupAdapter;

#[async_trait]
impl super::ObjectAdapter for FunctionGroupAdapter {
    fn kind(&self) -> ObjectKind {
        ObjectKind::FunctionGroup
    }

    async fn validate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Validation>, LifecycleError> {
        wire::validate_object(ctx, descriptor, wire::creation_basics(descriptor, payload), session)
            .await
    }

    async fn create(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Creation>, LifecycleError> {
        wire::create_object(ctx, descriptor, wire::creation_basics(descriptor, payload), session)
            .await
    }

    async fn read(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<ObjectSource>, LifecycleError> {
        wire::read_object(ctx, descriptor, session).await
    }

    async fn lock(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<LockGrant>, LifecycleError> {
        wire::lock_object(ctx, descriptor, session).await
    }

    async fn unlock(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        handle: LockHandle,
    ) -> Result<SessionState, LifecycleError> {
        wire::unlock_object(ctx, descriptor, handle).await
    }

    async fn activate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<ActivationResult>, LifecycleError> {
        wire::activate_object(ctx, descriptor, session).await
    }

    async fn delete(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
        lock: &LockHandle,
    ) -> Result<Step<()>, LifecycleError> {
        wire::delete_object(ctx, descriptor, session, lock).await
    }
}
