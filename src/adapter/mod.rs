// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-object-kind adapters.
//!
//! The orchestrator is generic; everything kind-specific (endpoint paths,
//! payload templates, which steps exist at all) lives behind `ObjectAdapter`.
//! An adapter that leaves an optional operation at its default tells the
//! orchestrator to skip that step for this object kind.

mod class;
mod data_element;
mod domain;
mod function_group;
mod interface;
mod package;
mod view;
pub(crate) mod wire;

use async_trait::async_trait;

use crate::model::{
    ActivationResult, LockHandle, LockToken, ObjectDescriptor, ObjectKind, ObjectPayload,
    SessionState,
};
use crate::orchestrator::LifecycleError;
use crate::remote::Connection;

pub use class::ClassAdapter;
pub use data_element::DataElementAdapter;
pub use domain::DomainAdapter;
pub use function_group::FunctionGroupAdapter;
pub use interface::InterfaceAdapter;
pub use package::PackageAdapter;
pub use view::ViewAdapter;

/// Explicit context threaded into every step; never a process-wide singleton,
/// so concurrent invocations cannot cross-contaminate session state.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    connection: &'a Connection,
}

impl<'a> StepContext<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &'a Connection {
        self.connection
    }
}

/// Result of one adapter step: what happened plus the successor SessionState
/// the next step must use.
#[derive(Debug)]
pub struct Step<T> {
    outcome: StepOutcome<T>,
    session: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome<T> {
    Done(T),
    Skipped,
}

impl<T> Step<T> {
    pub fn done(value: T, session: SessionState) -> Self {
        Self {
            outcome: StepOutcome::Done(value),
            session,
        }
    }

    pub fn skipped(session: SessionState) -> Self {
        Self {
            outcome: StepOutcome::Skipped,
            session,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn into_parts(self) -> (StepOutcome<T>, SessionState) {
        (self.outcome, self.session)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckVerdict {
    Passed,
    /// The remote system reports the object as already checked in this
    /// activation cycle; treated as success, not error.
    AlreadyChecked,
}

/// What a successful lock call yields before the coordinator binds it to the
/// lock-response session.
#[derive(Debug, PartialEq, Eq)]
pub struct LockGrant {
    token: LockToken,
}

impl LockGrant {
    pub fn new(token: LockToken) -> Self {
        Self { token }
    }

    pub fn into_token(self) -> LockToken {
        self.token
    }
}

/// Read-only view of one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSource {
    name: String,
    kind: ObjectKind,
    package: String,
    description: Option<String>,
    source: Option<String>,
}

impl ObjectSource {
    pub fn new(
        name: impl Into<String>,
        kind: ObjectKind,
        package: impl Into<String>,
        description: Option<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            package: package.into(),
            description,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// The four-to-nine remote operations for one object kind.
///
/// Every operation takes the current SessionState by value and returns the
/// successor inside its `Step`; a default implementation marks the operation
/// as absent for the kind, which the orchestrator treats as "skip this step".
/// Unlock takes the `LockHandle` by value: it is consumed, and the request is
/// issued with the handle's owning session, never any other session in scope.
#[async_trait]
pub trait ObjectAdapter: Send + Sync {
    fn kind(&self) -> ObjectKind;

    async fn validate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Validation>, LifecycleError> {
        let _ = (ctx, descriptor, payload);
        Ok(Step::skipped(session))
    }

    async fn create(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Creation>, LifecycleError>;

    async fn read(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<ObjectSource>, LifecycleError> {
        let _ = (ctx, descriptor);
        Ok(Step::skipped(session))
    }

    async fn lock(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<LockGrant>, LifecycleError>;

    async fn update(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        payload: &ObjectPayload,
        session: SessionState,
        lock: &LockHandle,
    ) -> Result<Step<()>, LifecycleError> {
        let _ = (ctx, descriptor, payload, lock);
        Ok(Step::skipped(session))
    }

    async fn check(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<CheckVerdict>, LifecycleError> {
        let _ = (ctx, descriptor);
        Ok(Step::skipped(session))
    }

    async fn unlock(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        handle: LockHandle,
    ) -> Result<SessionState, LifecycleError>;

    async fn activate(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<ActivationResult>, LifecycleError> {
        let _ = (ctx, descriptor);
        Ok(Step::skipped(session))
    }

    async fn delete(
        &self,
        ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
        lock: &LockHandle,
    ) -> Result<Step<()>, LifecycleError> {
        let _ = (ctx, descriptor, lock);
        Ok(Step::skipped(session))
    }
}

/// The production adapter for one object kind.
pub fn for_kind(kind: ObjectKind) -> Box<dyn ObjectAdapter> {
    match kind {
        ObjectKind::Domain => Box::new(DomainAdapter),
        ObjectKind::DataElement => Box::new(DataElementAdapter),
        ObjectKind::Class => Box::new(ClassAdapter),
        ObjectKind::Interface => Box::new(InterfaceAdapter),
        ObjectKind::FunctionGroup => Box::new(FunctionGroupAdapter),
        ObjectKind::View => Box::new(ViewAdapter),
        ObjectKind::Package => Box::new(PackageAdapter),
    }
}

#[cfg(test)]
mod tests {
    use super::{for_kind, Step, StepOutcome};
    use crate::model::{ObjectKind, SessionState};

    #[test]
    fn registry_covers_every_kind() {
        for kind in ObjectKind::ALL {
            assert_eq!(for_kind(kind).kind(), kind);
        }
    }

    #[test]
    fn step_round_trips_value_and_session() {
        let session = SessionState::new();
        let step = Step::done(7u32, session.clone());
        let (outcome, returned) = step.into_parts();
        assert_eq!(outcome, StepOutcome::Done(7));
        assert_eq!(returned, session);

        let step: Step<u32> = Step::skipped(session.clone());
        let (outcome, returned) = step.into_parts();
        assert_eq!(outcome, StepOutcome::Skipped);
        assert_eq!(returned, session);
    }
}
