// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::adapter::{self, StepContext, StepOutcome};
use crate::model::{
    LockHandle, LockToken, ObjectDescriptor, ObjectKind, ObjectPayload, PackageName,
    SessionHandoff, SessionState, TransportId,
};
use crate::orchestrator::{
    LifecycleError, LifecycleFailure, LifecycleOrchestrator, LockAcquisition, LockCoordinator,
};
use crate::remote::Connection;

use super::types::*;

#[derive(Debug, Default)]
struct ServerState {
    session_serial: u64,
    /// Issued lock handles: token → owning session. An unlock must redeem its
    /// token here first; a second unlock with the same token is rejected
    /// before any network call.
    locks: BTreeMap<String, SessionState>,
}

#[derive(Clone)]
pub struct ProteusMcp {
    connection: Arc<Connection>,
    orchestrator: Arc<LifecycleOrchestrator>,
    state: Arc<Mutex<ServerState>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ProteusMcp {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection: Arc::new(connection),
            orchestrator: Arc::new(LifecycleOrchestrator::new()),
            state: Arc::new(Mutex::new(ServerState::default())),
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    async fn next_session_id(&self) -> String {
        let mut state = self.state.lock().await;
        state.session_serial += 1;
        format!("session-{}", state.session_serial)
    }

    /// Adopts the caller-provided session or performs a fresh handshake.
    async fn resolve_session(
        &self,
        handoff: Option<&SessionHandoff>,
    ) -> Result<(String, SessionState), CallToolResult> {
        match handoff {
            Some(handoff) => Ok((handoff.session_id.clone(), handoff.to_state())),
            None => match self.connection.handshake().await {
                Ok(session) => Ok((self.next_session_id().await, session)),
                Err(err) => Err(error_result(&LifecycleError::NetworkFailure {
                    message: err.to_string(),
                })),
            },
        }
    }

    /// Open a session against the configured destination and return the
    /// handoff shape to thread through subsequent tool calls.
    #[tool(name = "session.open")]
    async fn session_open(&self) -> Result<CallToolResult, ErrorData> {
        match self.connection.handshake().await {
            Ok(session) => {
                let session_id = self.next_session_id().await;
                success_result(&SessionOpenResponse {
                    session: SessionHandoff::new(session_id, &session),
                })
            }
            Err(err) => Ok(error_result(&LifecycleError::NetworkFailure {
                message: err.to_string(),
            })),
        }
    }

    /// Read one object's metadata and source; never locks.
    #[tool(name = "object.read")]
    async fn object_read(
        &self,
        params: Parameters<ReadObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let ReadObjectParams {
            object_name,
            object_type,
            package,
            session,
        } = params.0;
        let descriptor = parse_descriptor(&object_name, &object_type, &package, None)?;
        let (session_id, current) = match self.resolve_session(session.as_ref()).await {
            Ok(resolved) => resolved,
            Err(result) => return Ok(result),
        };

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        match adapter.read(&ctx, &descriptor, current).await {
            Ok(step) => {
                let (outcome, next) = step.into_parts();
                match outcome {
                    StepOutcome::Done(source) => success_result(&ReadObjectResponse {
                        object_name: source.name().to_owned(),
                        object_type: source.kind().as_str().to_owned(),
                        package: source.package().to_owned(),
                        description: source.description().map(str::to_owned),
                        source: source.source().map(str::to_owned),
                        session: SessionHandoff::new(session_id, &next),
                    }),
                    StepOutcome::Skipped => Ok(error_result(&LifecycleError::Unsupported {
                        message: format!("kind '{}' does not support read", descriptor.kind()),
                    })),
                }
            }
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Create one object. An already-existing object is reported as a
    /// non-error skip, not a failure.
    #[tool(name = "object.create")]
    async fn object_create(
        &self,
        params: Parameters<CreateObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let CreateObjectParams {
            object_name,
            object_type,
            package,
            transport,
            description,
            attributes,
            session,
        } = params.0;
        let descriptor =
            parse_descriptor(&object_name, &object_type, &package, transport.as_deref())?;
        if descriptor.ensure_transport().is_err() {
            return Ok(error_result(&LifecycleError::TransportRejected {
                package: descriptor.package().as_str().to_owned(),
            }));
        }
        let payload = build_payload(description, None, attributes);
        let (session_id, current) = match self.resolve_session(session.as_ref()).await {
            Ok(resolved) => resolved,
            Err(result) => return Ok(result),
        };

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        match adapter.create(&ctx, &descriptor, &payload, current).await {
            Ok(step) => {
                let (outcome, next) = step.into_parts();
                let already_exists =
                    matches!(outcome, StepOutcome::Done(adapter::Creation::AlreadyExists));
                success_result(&CreateObjectResponse {
                    created: matches!(outcome, StepOutcome::Done(adapter::Creation::Created)),
                    already_exists,
                    session: SessionHandoff::new(session_id, &next),
                })
            }
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Lock one object for modification. The returned lock handle is
    /// single-use and bound server-side to the lock-response session.
    #[tool(name = "object.lock")]
    async fn object_lock(
        &self,
        params: Parameters<LockObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let LockObjectParams {
            object_name,
            object_type,
            package,
            session,
        } = params.0;
        let descriptor = parse_descriptor(&object_name, &object_type, &package, None)?;
        let (session_id, current) = match self.resolve_session(session.as_ref()).await {
            Ok(resolved) => resolved,
            Err(result) => return Ok(result),
        };

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        let coordinator = LockCoordinator::new();
        match coordinator.acquire(adapter.as_ref(), &ctx, &descriptor, current).await {
            Ok(LockAcquisition::Granted(handle)) => {
                let (token, owning_session) = handle.into_parts();
                let response = LockObjectResponse {
                    lock_handle: token.as_str().to_owned(),
                    session: SessionHandoff::new(session_id, &owning_session),
                };
                self.state
                    .lock()
                    .await
                    .locks
                    .insert(token.into_string(), owning_session);
                success_result(&response)
            }
            Ok(LockAcquisition::Unsupported(_)) => Ok(error_result(&LifecycleError::Unsupported {
                message: format!("kind '{}' does not support locking", descriptor.kind()),
            })),
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Unlock one object. The lock handle is redeemed exactly once; a second
    /// call with the same handle is rejected before any network call. The
    /// unlock request is issued with the session the lock call returned.
    #[tool(name = "object.unlock")]
    async fn object_unlock(
        &self,
        params: Parameters<UnlockObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let UnlockObjectParams {
            object_name,
            object_type,
            package,
            lock_handle,
        } = params.0;
        let descriptor = parse_descriptor(&object_name, &object_type, &package, None)?;

        let Some(owning_session) = self.state.lock().await.locks.remove(&lock_handle) else {
            return Ok(error_result(&LifecycleError::LockState {
                message: format!("lock handle '{lock_handle}' is unknown or already redeemed"),
            }));
        };
        let token = match LockToken::new(lock_handle) {
            Ok(token) => token,
            Err(err) => {
                return Ok(error_result(&LifecycleError::LockState {
                    message: err.to_string(),
                }))
            }
        };

        let session_id = self.next_session_id().await;
        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        let coordinator = LockCoordinator::new();
        let handle = LockHandle::new(token, owning_session);
        match coordinator
            .release(adapter.as_ref(), &ctx, &descriptor, handle)
            .await
        {
            Ok(next) => success_result(&UnlockObjectResponse {
                unlocked: true,
                session: SessionHandoff::new(session_id, &next),
            }),
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Apply new content to a locked object. Must reference a lock handle
    /// issued by `object.lock`.
    #[tool(name = "object.update")]
    async fn object_update(
        &self,
        params: Parameters<UpdateObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let UpdateObjectParams {
            object_name,
            object_type,
            package,
            lock_handle,
            transport,
            source,
            attributes,
            session,
        } = params.0;
        let descriptor =
            parse_descriptor(&object_name, &object_type, &package, transport.as_deref())?;
        let payload = build_payload(None, source, attributes);

        let Some(owning_session) = self.state.lock().await.locks.get(&lock_handle).cloned() else {
            return Ok(error_result(&LifecycleError::LockState {
                message: format!("lock handle '{lock_handle}' is unknown or already redeemed"),
            }));
        };
        let token = match LockToken::new(lock_handle) {
            Ok(token) => token,
            Err(err) => {
                return Ok(error_result(&LifecycleError::LockState {
                    message: err.to_string(),
                }))
            }
        };
        let handle = LockHandle::new(token, owning_session);

        // The caller threads the latest session; without one, the lock's
        // owning session is by definition the newest this object has seen.
        let (session_id, current) = match session {
            Some(handoff) => (handoff.session_id.clone(), handoff.to_state()),
            None => (
                self.next_session_id().await,
                handle.owning_session().clone(),
            ),
        };

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        match adapter
            .update(&ctx, &descriptor, &payload, current, &handle)
            .await
        {
            Ok(step) => {
                let (outcome, next) = step.into_parts();
                success_result(&UpdateObjectResponse {
                    updated: matches!(outcome, StepOutcome::Done(())),
                    session: SessionHandoff::new(session_id, &next),
                })
            }
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Run the remote consistency check. "Already checked" is success.
    #[tool(name = "object.check")]
    async fn object_check(
        &self,
        params: Parameters<CheckObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let CheckObjectParams {
            object_name,
            object_type,
            package,
            session,
        } = params.0;
        let descriptor = parse_descriptor(&object_name, &object_type, &package, None)?;
        let (session_id, current) = match self.resolve_session(session.as_ref()).await {
            Ok(resolved) => resolved,
            Err(result) => return Ok(result),
        };

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        match adapter.check(&ctx, &descriptor, current).await {
            Ok(step) => {
                let (outcome, next) = step.into_parts();
                let verdict = match outcome {
                    StepOutcome::Done(adapter::CheckVerdict::Passed) => "passed",
                    StepOutcome::Done(adapter::CheckVerdict::AlreadyChecked) => "already_checked",
                    StepOutcome::Skipped => {
                        return Ok(error_result(&LifecycleError::Unsupported {
                            message: format!(
                                "kind '{}' does not support checking",
                                descriptor.kind()
                            ),
                        }))
                    }
                };
                success_result(&CheckObjectResponse {
                    verdict: verdict.to_owned(),
                    session: SessionHandoff::new(session_id, &next),
                })
            }
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Activate one object and classify the result.
    #[tool(name = "object.activate")]
    async fn object_activate(
        &self,
        params: Parameters<ActivateObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let ActivateObjectParams {
            object_name,
            object_type,
            package,
            session,
        } = params.0;
        let descriptor = parse_descriptor(&object_name, &object_type, &package, None)?;
        let (session_id, current) = match self.resolve_session(session.as_ref()).await {
            Ok(resolved) => resolved,
            Err(result) => return Ok(result),
        };

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        match adapter.activate(&ctx, &descriptor, current).await {
            Ok(step) => {
                let (outcome, next) = step.into_parts();
                match outcome {
                    StepOutcome::Done(result) if result.is_success() => {
                        success_result(&ActivateObjectResponse {
                            activation: ActivationView::from_result(&result),
                            session: SessionHandoff::new(session_id, &next),
                        })
                    }
                    StepOutcome::Done(result) => {
                        Ok(error_result(&LifecycleError::ActivationFailed {
                            object: descriptor.to_string(),
                            messages: result.messages().to_vec(),
                        }))
                    }
                    StepOutcome::Skipped => Ok(error_result(&LifecycleError::Unsupported {
                        message: format!(
                            "kind '{}' does not support activation",
                            descriptor.kind()
                        ),
                    })),
                }
            }
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Delete a locked object. Must reference a lock handle issued by
    /// `object.lock`; unlock separately afterwards.
    #[tool(name = "object.delete")]
    async fn object_delete(
        &self,
        params: Parameters<DeleteObjectParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let DeleteObjectParams {
            object_name,
            object_type,
            package,
            lock_handle,
            transport,
            session,
        } = params.0;
        let descriptor =
            parse_descriptor(&object_name, &object_type, &package, transport.as_deref())?;
        if descriptor.ensure_transport().is_err() {
            return Ok(error_result(&LifecycleError::TransportRejected {
                package: descriptor.package().as_str().to_owned(),
            }));
        }

        let Some(owning_session) = self.state.lock().await.locks.get(&lock_handle).cloned() else {
            return Ok(error_result(&LifecycleError::LockState {
                message: format!("lock handle '{lock_handle}' is unknown or already redeemed"),
            }));
        };
        let token = match LockToken::new(lock_handle) {
            Ok(token) => token,
            Err(err) => {
                return Ok(error_result(&LifecycleError::LockState {
                    message: err.to_string(),
                }))
            }
        };
        let handle = LockHandle::new(token, owning_session);

        let (session_id, current) = match session {
            Some(handoff) => (handoff.session_id.clone(), handoff.to_state()),
            None => (
                self.next_session_id().await,
                handle.owning_session().clone(),
            ),
        };

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        match adapter.delete(&ctx, &descriptor, current, &handle).await {
            Ok(step) => {
                let (outcome, next) = step.into_parts();
                success_result(&DeleteObjectResponse {
                    deleted: matches!(outcome, StepOutcome::Done(())),
                    session: SessionHandoff::new(session_id, &next),
                })
            }
            Err(error) => Ok(error_result(&error)),
        }
    }

    /// Run the full lifecycle state machine for one object: validate, create,
    /// lock, update, check, unlock, activate, with unlock guaranteed once a
    /// lock was granted, even when a later step fails.
    #[tool(name = "lifecycle.run")]
    async fn lifecycle_run(
        &self,
        params: Parameters<LifecycleRunParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let LifecycleRunParams {
            object_name,
            object_type,
            package,
            transport,
            description,
            source,
            attributes,
            operation,
            activate,
            session,
        } = params.0;
        let descriptor =
            parse_descriptor(&object_name, &object_type, &package, transport.as_deref())?;
        let payload = build_payload(description, source, attributes);

        let mut options = match operation.as_deref().unwrap_or("provision") {
            "provision" => crate::orchestrator::RunOptions::provision(),
            "modify" => crate::orchestrator::RunOptions::modify(),
            "delete" => crate::orchestrator::RunOptions::delete_object(),
            other => {
                return Err(ErrorData::invalid_params(
                    format!("unknown operation '{other}' (expected provision, modify or delete)"),
                    Some(serde_json::json!({ "operation": other })),
                ))
            }
        };
        if activate == Some(false) {
            options = options.without_activate();
        }
        if !descriptor.kind().activatable() {
            options = options.without_activate();
        }
        if !descriptor.kind().checkable() {
            options = options.without_check();
        }

        let session_id = match &session {
            Some(handoff) => handoff.session_id.clone(),
            None => self.next_session_id().await,
        };
        if let Some(handoff) = session {
            options = options.with_session(handoff.to_state());
        }

        let adapter = adapter::for_kind(descriptor.kind());
        let ctx = StepContext::new(&self.connection);
        match self
            .orchestrator
            .run(&ctx, adapter.as_ref(), &descriptor, &payload, &options)
            .await
        {
            Ok(report) => {
                let (outcome, skip_reason) = match report.outcome() {
                    crate::orchestrator::RunOutcome::Completed => ("completed", None),
                    crate::orchestrator::RunOutcome::Skipped { reason } => {
                        ("skipped", Some(reason.as_str().to_owned()))
                    }
                };
                success_result(&LifecycleRunResponse {
                    outcome: outcome.to_owned(),
                    skip_reason,
                    state: report.state().as_str().to_owned(),
                    steps: report
                        .steps()
                        .iter()
                        .map(|step| step.as_str().to_owned())
                        .collect(),
                    activation: report.activation().map(ActivationView::from_result),
                    session: SessionHandoff::new(session_id, report.session()),
                })
            }
            Err(failure) => Ok(run_failure_result(&failure)),
        }
    }
}

#[tool_handler]
impl ServerHandler for ProteusMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Proteus development-object lifecycle server (tools: session.open, object.read, object.create, object.lock, object.update, object.check, object.unlock, object.activate, object.delete, lifecycle.run). Thread the returned session handoff into subsequent calls; lock handles are single-use."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn parse_descriptor(
    object_name: &str,
    object_type: &str,
    package: &str,
    transport: Option<&str>,
) -> Result<ObjectDescriptor, ErrorData> {
    let kind: ObjectKind = object_type.parse().map_err(
        |err: crate::model::ParseObjectKindError| {
            ErrorData::invalid_params(
                err.to_string(),
                Some(serde_json::json!({ "object_type": object_type })),
            )
        },
    )?;
    let package = PackageName::new(package).map_err(|err| {
        ErrorData::invalid_params(err.to_string(), Some(serde_json::json!({ "package": package })))
    })?;
    let transport = match transport {
        Some(value) => Some(TransportId::new(value).map_err(|err| {
            ErrorData::invalid_params(
                format!("invalid transport: {err}"),
                Some(serde_json::json!({ "transport": value })),
            )
        })?),
        None => None,
    };
    ObjectDescriptor::new(object_name, kind, package, transport).map_err(|err| {
        ErrorData::invalid_params(
            err.to_string(),
            Some(serde_json::json!({ "object_name": object_name })),
        )
    })
}

fn build_payload(
    description: Option<String>,
    source: Option<String>,
    attributes: Option<BTreeMap<String, serde_json::Value>>,
) -> ObjectPayload {
    let mut payload = ObjectPayload::empty();
    if let Some(description) = description {
        payload = payload.with_description(description);
    }
    if let Some(source) = source {
        payload = payload.with_source(source);
    }
    if let Some(attributes) = attributes {
        for (key, value) in attributes {
            payload = payload.with_attribute(key, value);
        }
    }
    payload
}

fn success_result<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(value).map_err(|err| {
        ErrorData::internal_error(format!("cannot serialize response: {err}"), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn failure_result(failure: &ToolFailure) -> CallToolResult {
    let text =
        serde_json::to_string_pretty(failure).unwrap_or_else(|_| failure.error.clone());
    CallToolResult::error(vec![Content::text(text)])
}

fn error_result(error: &LifecycleError) -> CallToolResult {
    failure_result(&ToolFailure {
        error: error.to_string(),
        kind: error.kind().to_owned(),
        state: None,
        cleanup: None,
    })
}

fn run_failure_result(failure: &LifecycleFailure) -> CallToolResult {
    failure_result(&ToolFailure {
        error: failure.error().to_string(),
        kind: failure.error().kind().to_owned(),
        state: Some(failure.state().as_str().to_owned()),
        cleanup: failure.cleanup().map(str::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use super::{build_payload, parse_descriptor};
    use crate::model::ObjectKind;

    #[test]
    fn descriptor_parsing_validates_each_field() {
        let descriptor =
            parse_descriptor("Z_DATE", "domain", "$TMP", None).expect("valid descriptor");
        assert_eq!(descriptor.kind(), ObjectKind::Domain);
        assert_eq!(descriptor.name(), "Z_DATE");

        assert!(parse_descriptor("Z_DATE", "report", "$TMP", None).is_err());
        assert!(parse_descriptor("1BAD", "domain", "$TMP", None).is_err());
        assert!(parse_descriptor("Z_DATE", "domain", "bad package", None).is_err());
        assert!(parse_descriptor("Z_DATE", "domain", "ZBASIS", Some("has space")).is_err());
    }

    #[test]
    fn payload_building_collects_all_parts() {
        let attributes = [("length".to_owned(), serde_json::json!(10))]
            .into_iter()
            .collect();
        let payload = build_payload(
            Some("a description".to_owned()),
            Some("class z_obj definition.".to_owned()),
            Some(attributes),
        );
        assert_eq!(payload.description(), Some("a description"));
        assert_eq!(payload.source(), Some("class z_obj definition."));
        assert_eq!(payload.attributes()["length"], serde_json::json!(10));
    }
}
