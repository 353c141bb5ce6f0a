// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! A programmable fake adapter for exercising the orchestrator without a
//! remote system.
//!
//! Every call records the step and the anti-forgery token of the session it
//! observed, and every successful call returns a freshly numbered session, so
//! tests can assert exactly which session each step was given.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::adapter::{
    CheckVerdict, Creation, LockGrant, ObjectAdapter, ObjectSource, Step, StepContext, Validation,
};
use crate::model::{
    ActivationResult, LockHandle, LockToken, ObjectDescriptor, ObjectKind, ObjectPayload,
    SessionState,
};
use crate::orchestrator::{LifecycleError, StepName};

/// How one scripted step behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepBehavior {
    Succeed,
    /// Validate/Create report the object as pre-existing.
    AlreadyExists,
    /// Check reports the object as already checked.
    AlreadyChecked,
    /// The step fails with a network failure carrying this message.
    Fail(String),
    /// The step fails with a lock conflict.
    Conflict(String),
    /// The step fails with not-found.
    Missing,
}

/// What one recorded call observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub step: StepName,
    /// Token of the session the step was invoked with (for unlock: the
    /// handle's owning session).
    pub observed: String,
    /// Token of the session the step returned, when it returned one.
    pub returned: Option<String>,
}

pub struct ScriptedAdapter {
    kind: ObjectKind,
    behaviors: BTreeMap<StepName, StepBehavior>,
    activation: ActivationResult,
    calls: Mutex<Vec<RecordedCall>>,
    serial: AtomicU64,
}

impl ScriptedAdapter {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            behaviors: BTreeMap::new(),
            activation: ActivationResult::new(true, true, false, Vec::new()),
            calls: Mutex::new(Vec::new()),
            serial: AtomicU64::new(0),
        }
    }

    pub fn with_behavior(mut self, step: StepName, behavior: StepBehavior) -> Self {
        self.behaviors.insert(step, behavior);
        self
    }

    pub fn with_activation(mut self, activation: ActivationResult) -> Self {
        self.activation = activation;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn calls_for(&self, step: StepName) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.step == step)
            .collect()
    }

    /// The session token the given step returned, if it ran and succeeded.
    pub fn returned_by(&self, step: StepName) -> Option<String> {
        self.calls_for(step)
            .into_iter()
            .find_map(|call| call.returned)
    }

    fn behavior(&self, step: StepName) -> StepBehavior {
        self.behaviors
            .get(&step)
            .cloned()
            .unwrap_or(StepBehavior::Succeed)
    }

    fn next_session(&self) -> SessionState {
        let n = self.serial.fetch_add(1, Ordering::Relaxed) + 1;
        let mut cookies = BTreeMap::new();
        cookies.insert("route".to_owned(), format!("r-{n}"));
        SessionState::from_parts(format!("csrf-{n}"), cookies)
    }

    fn record(&self, step: StepName, observed: &str, returned: Option<&str>) {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(RecordedCall {
                step,
                observed: observed.to_owned(),
                returned: returned.map(str::to_owned),
            });
    }

    fn failure(
        &self,
        descriptor: &ObjectDescriptor,
        behavior: &StepBehavior,
    ) -> Option<LifecycleError> {
        match behavior {
            StepBehavior::Fail(message) => Some(LifecycleError::NetworkFailure {
                message: message.clone(),
            }),
            StepBehavior::Conflict(message) => Some(LifecycleError::LockConflict {
                object: descriptor.to_string(),
                message: message.clone(),
            }),
            StepBehavior::Missing => Some(LifecycleError::NotFound {
                object: descriptor.to_string(),
            }),
            _ => None,
        }
    }
}

#[async_trait]
impl ObjectAdapter for ScriptedAdapter {
    fn kind(&self) -> ObjectKind {
        self.kind
    }

    async fn validate(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        _payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Validation>, LifecycleError> {
        let behavior = self.behavior(StepName::Validate);
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Validate, session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(StepName::Validate, session.csrf_token(), Some(next.csrf_token()));
        let outcome = if behavior == StepBehavior::AlreadyExists {
            Validation::AlreadyExists
        } else {
            Validation::Accepted
        };
        Ok(Step::done(outcome, next))
    }

    async fn create(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        _payload: &ObjectPayload,
        session: SessionState,
    ) -> Result<Step<Creation>, LifecycleError> {
        let behavior = self.behavior(StepName::Create);
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Create, session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(StepName::Create, session.csrf_token(), Some(next.csrf_token()));
        let outcome = if behavior == StepBehavior::AlreadyExists {
            Creation::AlreadyExists
        } else {
            Creation::Created
        };
        Ok(Step::done(outcome, next))
    }

    async fn read(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<ObjectSource>, LifecycleError> {
        let _ = session;
        let next = self.next_session();
        let source = ObjectSource::new(
            descriptor.name(),
            descriptor.kind(),
            descriptor.package().as_str(),
            None,
            Some("scripted source".to_owned()),
        );
        Ok(Step::done(source, next))
    }

    async fn lock(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<LockGrant>, LifecycleError> {
        let behavior = self.behavior(StepName::Lock);
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Lock, session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(StepName::Lock, session.csrf_token(), Some(next.csrf_token()));
        let token = LockToken::new(format!("lock-{}", next.csrf_token())).expect("valid token");
        Ok(Step::done(LockGrant::new(token), next))
    }

    async fn update(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        _payload: &ObjectPayload,
        session: SessionState,
        _lock: &LockHandle,
    ) -> Result<Step<()>, LifecycleError> {
        let behavior = self.behavior(StepName::Update);
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Update, session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(StepName::Update, session.csrf_token(), Some(next.csrf_token()));
        Ok(Step::done((), next))
    }

    async fn check(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<CheckVerdict>, LifecycleError> {
        let behavior = self.behavior(StepName::Check);
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Check, session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(StepName::Check, session.csrf_token(), Some(next.csrf_token()));
        let verdict = if behavior == StepBehavior::AlreadyChecked {
            CheckVerdict::AlreadyChecked
        } else {
            CheckVerdict::Passed
        };
        Ok(Step::done(verdict, next))
    }

    async fn unlock(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        handle: LockHandle,
    ) -> Result<SessionState, LifecycleError> {
        let behavior = self.behavior(StepName::Unlock);
        let (_, owning_session) = handle.into_parts();
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Unlock, owning_session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(
            StepName::Unlock,
            owning_session.csrf_token(),
            Some(next.csrf_token()),
        );
        Ok(next)
    }

    async fn activate(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
    ) -> Result<Step<ActivationResult>, LifecycleError> {
        let behavior = self.behavior(StepName::Activate);
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Activate, session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(StepName::Activate, session.csrf_token(), Some(next.csrf_token()));
        Ok(Step::done(self.activation.clone(), next))
    }

    async fn delete(
        &self,
        _ctx: &StepContext<'_>,
        descriptor: &ObjectDescriptor,
        session: SessionState,
        _lock: &LockHandle,
    ) -> Result<Step<()>, LifecycleError> {
        let behavior = self.behavior(StepName::Delete);
        if let Some(error) = self.failure(descriptor, &behavior) {
            self.record(StepName::Delete, session.csrf_token(), None);
            return Err(error);
        }
        let next = self.next_session();
        self.record(StepName::Delete, session.csrf_token(), Some(next.csrf_token()));
        Ok(Step::done((), next))
    }
}
