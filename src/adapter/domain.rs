// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::model::{
    ActivationResult, LockHandle, ObjectDescriptor, ObjectKind, ObjectPayload, SessionState,
};
use crate::orchestrator::LifecycleError;

use super::{
    wire, Creation, LockGrant, ObjectSource, Step, StepContext, Validation,
};

/// Domains: typed value ranges. Content is an attribute record (data type,
/// length, decimals), not source text.
pub struct DomainAdapter;

fn domain_body(descriptor: &ObjectDescriptor, payload: &ObjectPayload) -> Value {
    let mut body = wire::creation_basics(descriptor, payload);
    let attributes = payload.attributes();
    body["data_type"] = attributes
        .get("data_type")
        .cloned()
        .unwrap_or_else(|| json!("CHAR"));
    body["length"] = attributes.get("length").cloned().unwrap_or_else(|| json!(1));
    body["decimals"] = attributes.get("decimals").cloned().unwrap_or_else(|| json!(0));
    body
}

#[async_trait]
impl super::ObjectAdapter for DomainAdapter {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Domain
    }

    async fn validate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Validation>, LifecycleError> {
        wire::validate_object(ctx, descriptor, domain_body(descriptor, payload), session).await
    }

    async fn create(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Creation>, LifecycleError> {
        wire::create_object(ctx, descriptor, domain_body(descriptor, payload), session).await
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
        wire::update_attributes(ctx, descriptor, domain_body(descriptor, payload), session, lock)
            .await
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

    use super::domain_body;
    use crate::model::{ObjectDescriptor, ObjectKind, ObjectPayload, PackageName};

    #[test]
    fn body_defaults_to_a_char_1_domain() {
        let descriptor = ObjectDescriptor::new(
            "Z_FLAG",
            ObjectKind::Domain,
            PackageName::new("$TMP").expect("valid package"),
            None,
        )
        .expect("valid descriptor");
        let body = domain_body(&descriptor, &ObjectPayload::empty());
        assert_eq!(body["data_type"], "CHAR");
        assert_eq!(body["length"], 1);
        assert_eq!(body["decimals"], 0);
    }

    #[test]
    fn body_prefers_payload_attributes() {
        let descriptor = ObjectDescriptor::new(
            "Z_AMOUNT",
            ObjectKind::Domain,
            PackageName::new("$TMP").expect("valid package"),
            None,
        )
        .expect("valid descriptor");
        let payload = ObjectPayload::empty()
            .with_attribute("data_type", json!("DEC"))
            .with_attribute("length", json!(13))
            .with_attribute("decimals", json!(2));
        let body = domain_body(&descriptor, &payload);
        assert_eq!(body["data_type"], "DEC");
        assert_eq!(body["length"], 13);
        assert_eq!(body["decimals"], 2);
    }
}
