// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Workflow harness.
//!
//! A thin consumer of the orchestrator: runs a plan of lifecycle invocations
//! sequentially (each object is one independent invocation; sessions and lock
//! handles are never shared between them) and collects the per-object results.
//! Used for verification against live or scripted adapters.

pub mod script;

use std::collections::BTreeMap;

use crate::adapter::{ObjectAdapter, StepContext};
use crate::model::{LifecycleState, ObjectDescriptor, ObjectKind, ObjectPayload};
use crate::orchestrator::{
    LifecycleError, LifecycleFailure, LifecycleOrchestrator, LifecycleReport, RunOptions,
};

pub use script::{RecordedCall, ScriptedAdapter, StepBehavior};

/// One planned lifecycle invocation.
pub struct WorkflowItem {
    descriptor: ObjectDescriptor,
    payload: ObjectPayload,
    options: RunOptions,
}

impl WorkflowItem {
    pub fn new(descriptor: ObjectDescriptor, payload: ObjectPayload, options: RunOptions) -> Self {
        Self {
            descriptor,
            payload,
            options,
        }
    }

    pub fn descriptor(&self) -> &ObjectDescriptor {
        &self.descriptor
    }
}

#[derive(Default)]
pub struct WorkflowPlan {
    items: Vec<WorkflowItem>,
}

impl WorkflowPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, item: WorkflowItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(&self) -> &[WorkflowItem] {
        &self.items
    }
}

/// Resolves the adapter for one object kind.
pub trait AdapterRegistry {
    fn adapter_for(&self, kind: ObjectKind) -> Option<&dyn ObjectAdapter>;
}

/// The production registry: one wire adapter per kind.
pub struct RepositoryAdapters {
    adapters: BTreeMap<ObjectKind, Box<dyn ObjectAdapter>>,
}

impl RepositoryAdapters {
    pub fn new() -> Self {
        let mut adapters = BTreeMap::new();
        for kind in ObjectKind::ALL {
            adapters.insert(kind, crate::adapter::for_kind(kind));
        }
        Self { adapters }
    }
}

impl Default for RepositoryAdapters {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterRegistry for RepositoryAdapters {
    fn adapter_for(&self, kind: ObjectKind) -> Option<&dyn ObjectAdapter> {
        self.adapters.get(&kind).map(Box::as_ref)
    }
}

pub struct WorkflowEntry {
    object: String,
    result: Result<LifecycleReport, LifecycleFailure>,
}

impl WorkflowEntry {
    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn result(&self) -> &Result<LifecycleReport, LifecycleFailure> {
        &self.result
    }
}

#[derive(Default)]
pub struct WorkflowReport {
    entries: Vec<WorkflowEntry>,
}

impl WorkflowReport {
    pub fn entries(&self) -> &[WorkflowEntry] {
        &self.entries
    }

    pub fn completed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(&entry.result, Ok(report) if !report.outcome().is_skip()))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(&entry.result, Ok(report) if report.outcome().is_skip()))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.result.is_err())
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs workflow plans through the orchestrator.
#[derive(Debug, Default)]
pub struct WorkflowRunner {
    orchestrator: LifecycleOrchestrator,
    halt_on_failure: bool,
}

impl WorkflowRunner {
    pub fn new() -> Self {
        Self {
            orchestrator: LifecycleOrchestrator::new(),
            halt_on_failure: false,
        }
    }

    pub fn halt_on_failure(mut self, halt: bool) -> Self {
        self.halt_on_failure = halt;
        self
    }

    pub async fn run(
        &self,
        ctx: &StepContext<'_>,
        registry: &dyn AdapterRegistry,
        plan: &WorkflowPlan,
    ) -> WorkflowReport {
        let mut report = WorkflowReport::default();

        for item in plan.items() {
            let object = item.descriptor.to_string();
            let result = match registry.adapter_for(item.descriptor.kind()) {
                Some(adapter) => {
                    self.orchestrator
                        .run(ctx, adapter, &item.descriptor, &item.payload, &item.options)
                        .await
                }
                None => Err(LifecycleFailure::new(
                    LifecycleError::Unsupported {
                        message: format!(
                            "no adapter registered for kind '{}'",
                            item.descriptor.kind()
                        ),
                    },
                    LifecycleState::Failed,
                    None,
                )),
            };

            let halt = self.halt_on_failure && result.is_err();
            report.entries.push(WorkflowEntry { object, result });
            if halt {
                break;
            }
        }

        report
    }
}
