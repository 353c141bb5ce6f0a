// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::model::{LockHandle, ObjectDescriptor, ObjectKind, ObjectPayload, SessionState};
use crate::orchestrator::LifecycleError;

use super::{wire, Creation, LockGrant, ObjectSource, Step, StepContext, Validation};

/// Packages: organizational containers. No content to update, nothing to
/// check, and activation does not apply; update/check/activate stay at their
/// skip defaults.
pub struct PackageAdapter;

fn package_body(descriptor: &ObjectDescriptor, payload: &ObjectPayload) -> Value {
    let mut body = wire::creation_basics(descriptor, payload);
    body["software_component"] = payload
        .attributes()
        .get("software_component")
        .cloned()
        .unwrap_or_else(|| json!("LOCAL"));
    body
}

#[async_trait]
impl super::ObjectAdapter for PackageAdapter {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Package
    }

    async fn validate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Validation>, LifecycleError> {
        wire::validate_object(ctx, descriptor, package_body(descriptor, payload), session).await
    }

    async fn create(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Creation>, LifecycleError> {
        wire::create_object(ctx, descriptor, package_body(descriptor, payload), session).await
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
    use super::package_body;
    use crate::model::{ObjectDescriptor, ObjectKind, ObjectPayload, PackageName};

    #[test]
    fn body_defaults_to_local_software_component() {
        let descriptor = ObjectDescriptor::new(
            "ZORDERS",
            ObjectKind::Package,
            PackageName::new("$TMP").expect("valid package"),
            None,
        )
        .expect("valid descriptor");
        let body = package_body(&descriptor, &ObjectPayload::empty());
        assert_eq!(body["software_component"], "LOCAL");
    }
}
