// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;
use serde_json::Value;

use crate::model::{
    ActivationResult, LockHandle, ObjectDescriptor, ObjectKind, ObjectPayload, SessionState,
};
use crate::orchestrator::LifecycleError;

use super::{
    wire, CheckVerdict, Creation, LockGrant, ObjectSource, Step, StepContext, Validation,
};

/// Classes: source-carrying, syntax-checkable objects.
pub struct ClassAdapter;

fn class_body(descriptor: &ObjectDescriptor, payload: &ObjectPayload) -> Value {
    let mut body = wire::creation_basics(descriptor, payload);
    if let Some(superclass) = payload.attributes().get("superclass") {
        body["superclass"] = superclass.clone();
    }
    body
}

#[async_trait]
impl super::ObjectAdapter for ClassAdapter {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Class
    }

    async fn validate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Validation>, LifecycleError> {
        wire::validate_object(ctx, descriptor, class_body(descriptor, payload), session).await
    }

    async fn create(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Creation>, LifecycleError> {
        wire::create_object(ctx, descriptor, class_body(descriptor, payload), session).await
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

    async fn update(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
        lock: &LockHandle,
    ) -> Result<Step<()>, LifecycleError> {
        // A run without new source has nothing to apply.
        let Some(source) = payload.source() else {
            return Ok(Step::skipped(session));
        };
        wire::update_source(ctx, descriptor, source, session, lock).await
    }

    async fn check(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<CheckVerdict>, LifecycleError> {
        wire::check_object(ctx, descriptor, session).await
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::class_body;
    use crate::model::{ObjectDescriptor, ObjectKind, ObjectPayload, PackageName};

    #[test]
    fn body_carries_optional_superclass() {
        let descriptor = ObjectDescriptor::new(
            "ZCL_ORDER",
            ObjectKind::Class,
            PackageName::new("$TMP").expect("valid package"),
            None,
        )
        .expect("valid descriptor");

        let body = class_body(&descriptor, &ObjectPayload::empty());
        assert!(body.get("superclass").is_none());

        let payload = ObjectPayload::empty().with_attribute("superclass", json!("ZCL_BASE"));
        let body = class_body(&descriptor, &payload);
        assert_eq!(body["superclass"], "ZCL_BASE");
    }
}
