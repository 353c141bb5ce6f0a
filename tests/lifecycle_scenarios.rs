// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end lifecycle scenarios driven through the workflow harness against
//! scripted adapters; no network involved.

use std::collections::BTreeMap;

use proteus::adapter::{ObjectAdapter, StepContext};
use proteus::config::Config;
use proteus::model::{
    ActivationResult, ObjectDescriptor, ObjectKind, ObjectPayload, PackageName, SessionState,
};
use proteus::orchestrator::{LifecycleError, RunOptions, StepName};
use proteus::remote::Connection;
use proteus::workflow::{
    AdapterRegistry, ScriptedAdapter, StepBehavior, WorkflowItem, WorkflowPlan, WorkflowRunner,
};

struct ScriptedRegistry {
    adapter: ScriptedAdapter,
}

impl AdapterRegistry for ScriptedRegistry {
    fn adapter_for(&self, kind: ObjectKind) -> Option<&dyn ObjectAdapter> {
        if self.adapter.kind() == kind {
            Some(&self.adapter)
        } else {
            None
        }
    }
}

fn connection() -> Connection {
    Connection::new(&Config::new("http://127.0.0.1:1", "developer", "secret"))
        .expect("connection")
}

fn descriptor(kind: ObjectKind) -> ObjectDescriptor {
    ObjectDescriptor::new(
        "Z_OBJ",
        kind,
        PackageName::new("$TMP").expect("valid package"),
        None,
    )
    .expect("valid descriptor")
}

fn initial_session() -> SessionState {
    let mut cookies = BTreeMap::new();
    cookies.insert("route".to_owned(), "r-0".to_owned());
    SessionState::from_parts("csrf-0", cookies)
}

fn provision_item(kind: ObjectKind, payload: ObjectPayload) -> WorkflowItem {
    WorkflowItem::new(
        descriptor(kind),
        payload,
        RunOptions::provision().with_session(initial_session()),
    )
}

#[tokio::test]
async fn provision_completes_with_unlock_under_lock_session() {
    let connection = connection();
    let ctx = StepContext::new(&connection);
    let registry = ScriptedRegistry {
        adapter: ScriptedAdapter::new(ObjectKind::Class),
    };
    let plan = WorkflowPlan::new().push(provision_item(
        ObjectKind::Class,
        ObjectPayload::empty().with_source("class z_obj definition."),
    ));

    let report = WorkflowRunner::new().run(&ctx, &registry, &plan).await;

    assert!(report.is_success());
    assert_eq!(report.completed(), 1);
    assert_eq!(report.skipped(), 0);

    let lock_session = registry
        .adapter
        .returned_by(StepName::Lock)
        .expect("lock ran");
    let unlocks = registry.adapter.calls_for(StepName::Unlock);
    assert_eq!(unlocks.len(), 1);
    assert_eq!(unlocks[0].observed, lock_session);
}

#[tokio::test]
async fn existing_object_is_skipped_without_lock_traffic() {
    let connection = connection();
    let ctx = StepContext::new(&connection);
    let registry = ScriptedRegistry {
        adapter: ScriptedAdapter::new(ObjectKind::Domain)
            .with_behavior(StepName::Create, StepBehavior::AlreadyExists),
    };
    let plan = WorkflowPlan::new().push(provision_item(ObjectKind::Domain, ObjectPayload::empty()));

    let report = WorkflowRunner::new().run(&ctx, &registry, &plan).await;

    assert!(report.is_success());
    assert_eq!(report.skipped(), 1);
    assert!(registry.adapter.calls_for(StepName::Lock).is_empty());
    assert!(registry.adapter.calls_for(StepName::Update).is_empty());
    assert!(registry.adapter.calls_for(StepName::Unlock).is_empty());
}

#[tokio::test]
async fn update_failure_surfaces_after_unlock() {
    let connection = connection();
    let ctx = StepContext::new(&connection);
    let registry = ScriptedRegistry {
        adapter: ScriptedAdapter::new(ObjectKind::Class)
            .with_behavior(StepName::Update, StepBehavior::Fail("connection reset".to_owned())),
    };
    let plan = WorkflowPlan::new().push(provision_item(
        ObjectKind::Class,
        ObjectPayload::empty().with_source("class z_obj definition."),
    ));

    let report = WorkflowRunner::new().run(&ctx, &registry, &plan).await;

    assert_eq!(report.failed(), 1);
    let entry = &report.entries()[0];
    let failure = entry.result().as_ref().expect_err("update failed");
    assert!(matches!(
        failure.error(),
        LifecycleError::NetworkFailure { message } if message == "connection reset"
    ));

    let lock_session = registry
        .adapter
        .returned_by(StepName::Lock)
        .expect("lock ran");
    let unlocks = registry.adapter.calls_for(StepName::Unlock);
    assert_eq!(unlocks.len(), 1);
    assert_eq!(unlocks[0].observed, lock_session);
}

#[tokio::test]
async fn container_activation_counts_as_completed() {
    let connection = connection();
    let ctx = StepContext::new(&connection);
    let registry = ScriptedRegistry {
        adapter: ScriptedAdapter::new(ObjectKind::FunctionGroup)
            .with_activation(ActivationResult::new(false, false, true, Vec::new())),
    };
    let plan = WorkflowPlan::new().push(WorkflowItem::new(
        descriptor(ObjectKind::FunctionGroup),
        ObjectPayload::empty(),
        RunOptions::provision()
            .without_check()
            .with_session(initial_session()),
    ));

    let report = WorkflowRunner::new().run(&ctx, &registry, &plan).await;

    assert!(report.is_success());
    assert_eq!(report.completed(), 1);
    let entry = &report.entries()[0];
    let run = entry.result().as_ref().expect("run succeeded");
    let activation = run.activation().expect("activation result");
    assert!(activation.generated());
    assert!(activation.is_success());
}

#[tokio::test]
async fn halt_on_failure_stops_after_the_first_failed_object() {
    let connection = connection();
    let ctx = StepContext::new(&connection);
    let registry = ScriptedRegistry {
        adapter: ScriptedAdapter::new(ObjectKind::Class)
            .with_behavior(StepName::Lock, StepBehavior::Conflict("locked by USER2".to_owned())),
    };
    let source = ObjectPayload::empty().with_source("class z_obj definition.");
    let plan = WorkflowPlan::new()
        .push(provision_item(ObjectKind::Class, source.clone()))
        .push(provision_item(ObjectKind::Class, source));

    let report = WorkflowRunner::new()
        .halt_on_failure(true)
        .run(&ctx, &registry, &plan)
        .await;

    assert_eq!(report.entries().len(), 1);
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn missing_adapter_is_a_structured_failure() {
    let connection = connection();
    let ctx = StepContext::new(&connection);
    let registry = ScriptedRegistry {
        adapter: ScriptedAdapter::new(ObjectKind::Class),
    };
    let plan = WorkflowPlan::new().push(provision_item(ObjectKind::Domain, ObjectPayload::empty()));

    let report = WorkflowRunner::new().run(&ctx, &registry, &plan).await;

    assert_eq!(report.failed(), 1);
    let failure = report.entries()[0].result().as_ref().expect_err("no adapter");
    assert_eq!(failure.error().kind(), "unsupported");
}
