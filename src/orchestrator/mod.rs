// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The generic object-lifecycle state machine.
//!
//! `LifecycleOrchestrator::run` drives an `ObjectAdapter` through
//! validate → create → lock → update → check → unlock → activate, threading
//! the latest SessionState into every step and guaranteeing that a successful
//! lock is released exactly once, on the success path and on every failure
//! path.

mod coordinator;
mod engine;

use std::fmt;

pub use coordinator::{LockAcquisition, LockCoordinator};
pub use engine::LifecycleOrchestrator;

use crate::model::{ActivationMessage, ActivationResult, LifecycleState, SessionState};

/// One step of the fixed lifecycle ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StepName {
    Validate,
    Create,
    Lock,
    Update,
    Check,
    Unlock,
    Activate,
    Delete,
}

impl StepName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Create => "create",
            Self::Lock => "lock",
            Self::Update => "update",
            Self::Check => "check",
            Self::Unlock => "unlock",
            Self::Activate => "activate",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run terminated early without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyExists,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyExists => "already_exists",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Skipped { reason: SkipReason },
}

impl RunOutcome {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Which steps a run executes. The ordering is fixed; options only select.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    validate: bool,
    create: bool,
    update: bool,
    check: bool,
    activate: bool,
    delete: bool,
    session: Option<SessionState>,
}

impl RunOptions {
    /// Full provisioning: validate, create, apply content, check, activate.
    pub fn provision() -> Self {
        Self {
            validate: true,
            create: true,
            update: true,
            check: true,
            activate: true,
            delete: false,
            session: None,
        }
    }

    /// Modify an existing object: apply content, check, activate.
    pub fn modify() -> Self {
        Self {
            update: true,
            check: true,
            activate: true,
            ..Self::default()
        }
    }

    /// Remove an object: lock, delete, unlock.
    pub fn delete_object() -> Self {
        Self {
            delete: true,
            ..Self::default()
        }
    }

    /// Activation only, for objects that are inactive but current.
    pub fn activate_only() -> Self {
        Self {
            activate: true,
            ..Self::default()
        }
    }

    /// Reuses an established session instead of performing a fresh handshake.
    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = Some(session);
        self
    }

    pub fn without_check(mut self) -> Self {
        self.check = false;
        self
    }

    pub fn without_activate(mut self) -> Self {
        self.activate = false;
        self
    }

    pub fn validate(&self) -> bool {
        self.validate
    }

    pub fn create(&self) -> bool {
        self.create
    }

    pub fn update(&self) -> bool {
        self.update
    }

    pub fn check(&self) -> bool {
        self.check
    }

    pub fn activate(&self) -> bool {
        self.activate
    }

    pub fn delete(&self) -> bool {
        self.delete
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// Whether this run enters the locked region at all.
    pub fn needs_lock(&self) -> bool {
        self.update || self.check || self.delete
    }

    pub fn mutates(&self) -> bool {
        self.create || self.update || self.delete
    }
}

/// Successful (or skipped) run.
#[derive(Debug, Clone)]
pub struct LifecycleReport {
    outcome: RunOutcome,
    state: LifecycleState,
    steps: Vec<StepName>,
    activation: Option<ActivationResult>,
    session: SessionState,
}

impl LifecycleReport {
    pub(crate) fn new(
        outcome: RunOutcome,
        state: LifecycleState,
        steps: Vec<StepName>,
        activation: Option<ActivationResult>,
        session: SessionState,
    ) -> Self {
        Self {
            outcome,
            state,
            steps,
            activation,
            session,
        }
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn steps(&self) -> &[StepName] {
        &self.steps
    }

    pub fn activation(&self) -> Option<&ActivationResult> {
        self.activation.as_ref()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }
}

/// Failed run: the first error encountered, the state reached, and (when the
/// cleanup phase itself also failed) a secondary note that never replaces the
/// primary error.
#[derive(Debug)]
pub struct LifecycleFailure {
    error: LifecycleError,
    state: LifecycleState,
    cleanup: Option<String>,
}

impl LifecycleFailure {
    pub(crate) fn new(error: LifecycleError, state: LifecycleState, cleanup: Option<String>) -> Self {
        Self {
            error,
            state,
            cleanup,
        }
    }

    pub fn error(&self) -> &LifecycleError {
        &self.error
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn cleanup(&self) -> Option<&str> {
        self.cleanup.as_deref()
    }
}

impl fmt::Display for LifecycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(cleanup) = &self.cleanup {
            write!(f, " (cleanup also failed: {cleanup})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LifecycleFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The error taxonomy surfaced by lifecycle steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Bad name/package, or the remote validator rejected the descriptor.
    ValidationFailed { object: String, reason: String },
    /// The object is locked by another session.
    LockConflict { object: String, message: String },
    NotFound { object: String },
    /// Activation reported error-severity messages.
    ActivationFailed {
        object: String,
        messages: Vec<ActivationMessage>,
    },
    /// Missing/invalid transport request for a transportable package.
    TransportRejected { package: String },
    /// The remote call itself failed.
    NetworkFailure { message: String },
    /// The lock response omitted the lock handle or the refreshed session.
    InvalidLockResponse,
    /// Lock bookkeeping misuse, e.g. releasing an unknown or spent handle.
    LockState { message: String },
    /// No adapter (or adapter operation) exists for the request.
    Unsupported { message: String },
}

impl LifecycleError {
    /// Stable machine-readable tag for the tool-call boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "validation_failed",
            Self::LockConflict { .. } => "lock_conflict",
            Self::NotFound { .. } => "not_found",
            Self::ActivationFailed { .. } => "activation_failed",
            Self::TransportRejected { .. } => "transport_rejected",
            Self::NetworkFailure { .. } => "network_failure",
            Self::InvalidLockResponse => "invalid_lock_response",
            Self::LockState { .. } => "lock_state",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed { object, reason } => {
                write!(f, "validation of {object} failed: {reason}")
            }
            Self::LockConflict { object, message } => {
                write!(f, "{object} is locked by another session: {message}")
            }
            Self::NotFound { object } => write!(f, "{object} does not exist"),
            Self::ActivationFailed { object, messages } => {
                write!(f, "activation of {object} failed: ")?;
                let mut first = true;
                for message in messages {
                    if message.severity() == crate::model::Severity::Error {
                        if !first {
                            f.write_str("; ")?;
                        }
                        f.write_str(message.text())?;
                        first = false;
                    }
                }
                if first {
                    f.write_str("error messages present")?;
                }
                Ok(())
            }
            Self::TransportRejected { package } => {
                write!(
                    f,
                    "package '{package}' is transportable and requires a transport request"
                )
            }
            Self::NetworkFailure { message } => write!(f, "{message}"),
            Self::InvalidLockResponse => {
                f.write_str("Lock response does not contain valid session information")
            }
            Self::LockState { message } => write!(f, "lock state error: {message}"),
            Self::Unsupported { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for LifecycleError {}

#[cfg(test)]
mod option_tests {
    use super::{RunOptions, StepName};

    #[test]
    fn provision_enables_the_full_sequence() {
        let options = RunOptions::provision();
        assert!(options.validate());
        assert!(options.create());
        assert!(options.update());
        assert!(options.check());
        assert!(options.activate());
        assert!(!options.delete());
        assert!(options.needs_lock());
        assert!(options.mutates());
    }

    #[test]
    fn delete_only_locks_but_does_not_activate() {
        let options = RunOptions::delete_object();
        assert!(options.needs_lock());
        assert!(!options.activate());
        assert!(options.mutates());
    }

    #[test]
    fn activate_only_needs_no_lock() {
        let options = RunOptions::activate_only();
        assert!(!options.needs_lock());
        assert!(!options.mutates());
        assert!(options.activate());
    }

    #[test]
    fn step_names_are_stable() {
        assert_eq!(StepName::Unlock.as_str(), "unlock");
        assert_eq!(StepName::Validate.to_string(), "validate");
    }
}
