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

/// Data elements: semantic field types referencing a domain, with field labels.
pub struct DataElementAdapter;

fn data_element_body(descriptor: &ObjectDescriptor, payload: &ObjectPayload) -> Value {
    let mut body = wire::creation_basics(descriptor, payload);
    let attributes = payload.attributes();
    if let Some(domain) = attributes.get("domain") {
        body["domain"] = domain.clone();
    }
    body["label"] = attributes
        .get("label")
        .cloned()
        .unwrap_or_else(|| json!(payload.description().unwrap_or_default()));
    body
}

#[async_trait]
impl super::ObjectAdapter for DataElementAdapter {
    fn kind(&self) -> ObjectKind {
        ObjectKind::DataElement
    }

    async fn validate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Validation>, LifecycleError> {
        wire::validate_object(ctx, descriptor, data_element_body(descriptor, payload), session)
            .await
    }

    async fn create(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Creation>, LifecycleError> {
        wire::create_object(ctx, descriptor, data_element_body(descriptor, payload), session).await
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
        wire::update_attributes(
            ctx,
            descriptor,
            data_element_body(descriptor, payload),
            session,
            lock,
        )
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

    use super::data_element_body;
    use crate::model::{ObjectDescriptor, ObjectKind, ObjectPayload, PackageName};

    #[test]
    fn body_references_its_domain_and_label() {
        let descriptor = ObjectDescriptor::new(
            "Z_ORDER_ID",
            ObjectKind::DataElement,
            PackageName::new("$TMP").expect("valid package"),
            None,
        )
        .expect("valid descriptor");
        let payload = ObjectPayload::empty()
            .with_description("Order number")
            .with_attribute("domain", json!("Z_ORDER_DOM"));
        let body = data_element_body(&descriptor, &payload);
        assert_eq!(body["domain"], "Z_ORDER_DOM");
        assert_eq!(body["label"], "Order number");
    }
}
