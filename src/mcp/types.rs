// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ActivationResult, SessionHandoff};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionOpenResponse {
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadObjectResponse {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub transport: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<BTreeMap<String, Value>>,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateObjectResponse {
    pub created: bool,
    pub already_exists: bool,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LockObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LockObjectResponse {
    pub lock_handle: String,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UnlockObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub lock_handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnlockObjectResponse {
    pub unlocked: bool,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub lock_handle: String,
    pub transport: Option<String>,
    pub source: Option<String>,
    pub attributes: Option<BTreeMap<String, Value>>,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateObjectResponse {
    pub updated: bool,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckObjectResponse {
    pub verdict: String,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ActivateObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageView {
    pub severity: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivationView {
    pub activated: bool,
    pub checked: bool,
    pub generated: bool,
    pub success: bool,
    pub messages: Vec<MessageView>,
}

impl ActivationView {
    pub fn from_result(result: &ActivationResult) -> Self {
        Self {
            activated: result.activated(),
            checked: result.checked(),
            generated: result.generated(),
            success: result.is_success(),
            messages: result
                .messages()
                .iter()
                .map(|message| MessageView {
                    severity: message.severity().as_str().to_owned(),
                    text: message.text().to_owned(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateObjectResponse {
    pub activation: ActivationView,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteObjectParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub lock_handle: String,
    pub transport: Option<String>,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteObjectResponse {
    pub deleted: bool,
    pub session: SessionHandoff,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LifecycleRunParams {
    pub object_name: String,
    pub object_type: String,
    pub package: String,
    pub transport: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub attributes: Option<BTreeMap<String, Value>>,
    /// "provision" (default), "modify", or "delete".
    pub operation: Option<String>,
    /// Defaults to true; set false to leave the object inactive.
    pub activate: Option<bool>,
    pub session: Option<SessionHandoff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleRunResponse {
    pub outcome: String,
    pub skip_reason: Option<String>,
    pub state: String,
    pub steps: Vec<String>,
    pub activation: Option<ActivationView>,
    pub session: SessionHandoff,
}

/// Error payload returned as tool-result data; never thrown across the
/// tool-call boundary.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolFailure {
    pub error: String,
    pub kind: String,
    pub state: Option<String>,
    pub cleanup: Option<String>,
}
