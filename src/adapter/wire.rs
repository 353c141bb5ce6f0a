// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared wire plumbing for the kind adapters.
//!
//! Endpoint layout is uniform: `/api/v1/repository/<collection>` for create,
//! `/<name>/lock|source|check|unlock` for object-scoped actions, and one
//! repository-wide `/activation` endpoint. Adapters differ only in payload
//! templates and in which operations exist for their kind.

use serde_json::{json, Value};

use crate::model::{
    parse_activation, parse_messages, ActivationResult, LockHandle, LockToken, ObjectDescriptor,
    ObjectPayload, SessionState, Severity,
};
use crate::orchestrator::LifecycleError;
use crate::remote::{RemoteError, RemoteRequest, RemoteResponse};

use super::{CheckVerdict, Creation, LockGrant, ObjectSource, Step, StepContext, Validation};

pub(crate) const API_ROOT: &str = "/api/v1/repository";

pub(crate) fn collection_path(descriptor: &ObjectDescriptor) -> String {
    format!("{API_ROOT}/{}", descriptor.kind().collection())
}

pub(crate) fn object_path(descriptor: &ObjectDescriptor) -> String {
    format!("{}/{}", collection_path(descriptor), descriptor.name())
}

/// Base creation body shared by every kind; adapters extend it.
pub(crate) fn creation_basics(descriptor: &ObjectDescriptor, payload: &ObjectPayload) -> Value {
    json!({
        "name": descriptor.name(),
        "package": descriptor.package().as_str(),
        "description": payload.description().unwrap_or_default(),
    })
}

fn with_transport(mut request: RemoteRequest, descriptor: &ObjectDescriptor) -> RemoteRequest {
    if let Some(transport) = descriptor.transport() {
        request = request.with_query("transport", transport.as_str());
    }
    request
}

async fn call(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    request: RemoteRequest,
    session: &SessionState,
) -> Result<(RemoteResponse, SessionState), RemoteError> {
    ctx.connection().execute(&request, session).await.map_err(|err| {
        tracing::debug!(object = %descriptor, error = %err, "remote step failed");
        err
    })
}

fn map_remote_error(err: RemoteError, descriptor: &ObjectDescriptor) -> LifecycleError {
    match err.status() {
        Some(404) => LifecycleError::NotFound {
            object: descriptor.to_string(),
        },
        Some(423) => LifecycleError::LockConflict {
            object: descriptor.to_string(),
            message: err.to_string(),
        },
        _ => LifecycleError::NetworkFailure {
            message: err.to_string(),
        },
    }
}

/// Structured-status detection with a documented fallback: responses that omit
/// the `status` field are matched on message text, and only on these fixed
/// phrases. The fallback is fragile and locale-dependent by nature; the
/// structured field always wins when present.
fn body_status(body: &Value) -> Option<&str> {
    body.get("status").and_then(Value::as_str)
}

pub(crate) fn already_exists(body: &Value) -> bool {
    match body_status(body) {
        Some(status) => status.eq_ignore_ascii_case("already_exists"),
        None => message_contains(body, "already exists"),
    }
}

pub(crate) fn already_checked(body: &Value) -> bool {
    match body_status(body) {
        Some(status) => status.eq_ignore_ascii_case("already_checked"),
        None => message_contains(body, "already checked"),
    }
}

fn message_contains(body: &Value, needle: &str) -> bool {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        if message.to_lowercase().contains(needle) {
            return true;
        }
    }
    parse_messages(body.get("messages").unwrap_or(&Value::Null))
        .iter()
        .any(|message| message.text().to_lowercase().contains(needle))
}

/// Fails fast unless the response surfaces `lock_handle` plus refreshed
/// session fields; omission of either is a contract violation.
pub(crate) fn parse_lock_grant(response: &RemoteResponse) -> Result<LockGrant, LifecycleError> {
    if !response.refreshed_session() {
        return Err(LifecycleError::InvalidLockResponse);
    }
    let token = response
        .body()
        .get("lock_handle")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let token = LockToken::new(token).map_err(|_| LifecycleError::InvalidLockResponse)?;
    Ok(LockGrant::new(token))
}

pub(crate) async fn validate_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    body: Value,
    session: SessionState,
) -> Result<Step<Validation>, LifecycleError> {
    let request = RemoteRequest::post(format!("{}/validation", collection_path(descriptor)))
        .with_body(body);
    match call(ctx, descriptor, request, &session).await {
        Ok((response, next)) => {
            if already_exists(response.body()) {
                return Ok(Step::done(Validation::AlreadyExists, next));
            }
            Ok(Step::done(Validation::Accepted, next))
        }
        Err(err) if err.status() == Some(409) => Ok(Step::done(Validation::AlreadyExists, session)),
        Err(err) => match err.status() {
            Some(400) => Err(LifecycleError::ValidationFailed {
                object: descriptor.to_string(),
                reason: err.to_string(),
            }),
            _ => Err(map_remote_error(err, descriptor)),
        },
    }
}

pub(crate) async fn create_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    body: Value,
    session: SessionState,
) -> Result<Step<Creation>, LifecycleError> {
    let request = with_transport(
        RemoteRequest::post(collection_path(descriptor)).with_body(body),
        descriptor,
    );
    match call(ctx, descriptor, request, &session).await {
        Ok((response, next)) => {
            if already_exists(response.body()) {
                return Ok(Step::done(Creation::AlreadyExists, next));
            }
            Ok(Step::done(Creation::Created, next))
        }
        Err(err) if err.status() == Some(409) => Ok(Step::done(Creation::AlreadyExists, session)),
        Err(err) => Err(map_remote_error(err, descriptor)),
    }
}

pub(crate) async fn lock_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    session: SessionState,
) -> Result<Step<LockGrant>, LifecycleError> {
    let request =
        RemoteRequest::post(format!("{}/lock", object_path(descriptor))).with_query("access", "modify");
    let (response, next) = call(ctx, descriptor, request, &session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;
    let grant = parse_lock_grant(&response)?;
    Ok(Step::done(grant, next))
}

pub(crate) async fn update_source(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    source: &str,
    session: SessionState,
    lock: &LockHandle,
) -> Result<Step<()>, LifecycleError> {
    let request = with_transport(
        RemoteRequest::put(format!("{}/source", object_path(descriptor)))
            .with_query("lock_handle", lock.token().as_str())
            .with_body(json!({ "source": source })),
        descriptor,
    );
    let (_, next) = call(ctx, descriptor, request, &session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;
    Ok(Step::done((), next))
}

pub(crate) async fn update_attributes(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    body: Value,
    session: SessionState,
    lock: &LockHandle,
) -> Result<Step<()>, LifecycleError> {
    let request = with_transport(
        RemoteRequest::put(object_path(descriptor))
            .with_query("lock_handle", lock.token().as_str())
            .with_body(body),
        descriptor,
    );
    let (_, next) = call(ctx, descriptor, request, &session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;
    Ok(Step::done((), next))
}

pub(crate) async fn check_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    session: SessionState,
) -> Result<Step<CheckVerdict>, LifecycleError> {
    let request = RemoteRequest::post(format!("{}/check", object_path(descriptor)));
    let (response, next) = call(ctx, descriptor, request, &session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;

    if already_checked(response.body()) {
        return Ok(Step::done(CheckVerdict::AlreadyChecked, next));
    }

    let messages = parse_messages(response.body().get("messages").unwrap_or(&Value::Null));
    let errors: Vec<&str> = messages
        .iter()
        .filter(|message| message.severity() == Severity::Error)
        .map(|message| message.text())
        .collect();
    if !errors.is_empty() {
        return Err(LifecycleError::ValidationFailed {
            object: descriptor.to_string(),
            reason: errors.join("; "),
        });
    }
    Ok(Step::done(CheckVerdict::Passed, next))
}

pub(crate) async fn unlock_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    handle: LockHandle,
) -> Result<SessionState, LifecycleError> {
    let (token, owning_session) = handle.into_parts();
    let request = RemoteRequest::post(format!("{}/unlock", object_path(descriptor)))
        .with_query("lock_handle", token.as_str());
    let (_, next) = call(ctx, descriptor, request, &owning_session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;
    Ok(next)
}

pub(crate) async fn activate_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    session: SessionState,
) -> Result<Step<ActivationResult>, LifecycleError> {
    let request = RemoteRequest::post(format!("{API_ROOT}/activation")).with_body(json!({
        "name": descriptor.name(),
        "kind": descriptor.kind().as_str(),
        "package": descriptor.package().as_str(),
    }));
    let (response, next) = call(ctx, descriptor, request, &session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;
    Ok(Step::done(parse_activation(response.body()), next))
}

pub(crate) async fn delete_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    session: SessionState,
    lock: &LockHandle,
) -> Result<Step<()>, LifecycleError> {
    let request = with_transport(
        RemoteRequest::delete(object_path(descriptor))
            .with_query("lock_handle", lock.token().as_str()),
        descriptor,
    );
    let (_, next) = call(ctx, descriptor, request, &session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;
    Ok(Step::done((), next))
}

pub(crate) async fn read_object(
    ctx: &StepContext<'_>,
    descriptor: &ObjectDescriptor,
    session: SessionState,
) -> Result<Step<ObjectSource>, LifecycleError> {
    let request = RemoteRequest::get(object_path(descriptor));
    let (response, next) = call(ctx, descriptor, request, &session)
        .await
        .map_err(|err| map_remote_error(err, descriptor))?;
    let body = response.body();
    let source = ObjectSource::new(
        descriptor.name(),
        descriptor.kind(),
        descriptor.package().as_str(),
        body.get("description")
            .and_then(Value::as_str)
            .map(str::to_owned),
        body.get("source").and_then(Value::as_str).map(str::to_owned),
    );
    Ok(Step::done(source, next))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        already_checked, already_exists, collection_path, creation_basics, object_path,
        parse_lock_grant,
    };
    use crate::model::{ObjectDescriptor, ObjectKind, ObjectPayload, PackageName};
    use crate::orchestrator::LifecycleError;
    use crate::remote::RemoteResponse;

    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new(
            "Z_DATE",
            ObjectKind::Domain,
            PackageName::new("$TMP").expect("valid package"),
            None,
        )
        .expect("valid descriptor")
    }

    #[test]
    fn paths_follow_the_collection_layout() {
        let descriptor = descriptor();
        assert_eq!(collection_path(&descriptor), "/api/v1/repository/domains");
        assert_eq!(object_path(&descriptor), "/api/v1/repository/domains/Z_DATE");
    }

    #[test]
    fn creation_basics_carry_name_package_description() {
        let payload = ObjectPayload::empty().with_description("date domain");
        let body = creation_basics(&descriptor(), &payload);
        assert_eq!(body["name"], "Z_DATE");
        assert_eq!(body["package"], "$TMP");
        assert_eq!(body["description"], "date domain");
    }

    #[test]
    fn structured_status_wins_over_message_text() {
        assert!(already_exists(&json!({ "status": "already_exists" })));
        assert!(already_exists(&json!({ "status": "ALREADY_EXISTS" })));
        // Status present and different: the message text must not override it.
        assert!(!already_exists(&json!({
            "status": "created",
            "message": "object already exists",
        })));
    }

    #[test]
    fn message_fallback_matches_only_without_status() {
        assert!(already_exists(&json!({ "message": "Object Z_DATE already exists" })));
        assert!(already_exists(&json!({
            "messages": [{ "severity": "W", "text": "name already exists in package" }],
        })));
        assert!(!already_exists(&json!({ "message": "created" })));

        assert!(already_checked(&json!({ "status": "already_checked" })));
        assert!(already_checked(&json!({ "message": "object was already checked" })));
        assert!(!already_checked(&json!({ "message": "check passed" })));
    }

    #[test]
    fn lock_grant_requires_handle_and_session() {
        let valid = RemoteResponse::new(
            200,
            json!({ "lock_handle": "H4F2" }),
            Some("csrf-2".to_owned()),
            Vec::new(),
        );
        let grant = parse_lock_grant(&valid).expect("valid grant");
        assert_eq!(grant.into_token().as_str(), "H4F2");

        let no_session = RemoteResponse::new(200, json!({ "lock_handle": "H4F2" }), None, Vec::new());
        let err = parse_lock_grant(&no_session).expect_err("missing session");
        assert_eq!(err, LifecycleError::InvalidLockResponse);
        assert_eq!(
            err.to_string(),
            "Lock response does not contain valid session information"
        );

        let no_handle =
            RemoteResponse::new(200, json!({}), Some("csrf-2".to_owned()), Vec::new());
        assert_eq!(
            parse_lock_grant(&no_handle).expect_err("missing handle"),
            LifecycleError::InvalidLockResponse
        );
    }
}
