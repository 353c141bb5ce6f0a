// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Sessions, object descriptors, lock handles, lifecycle states, and activation results.

pub mod activation;
pub mod ids;
pub mod lock;
pub mod object;
pub mod session;
pub mod state;

pub use activation::{
    parse_activation, parse_messages, ActivationMessage, ActivationResult, Severity,
};
pub use ids::{Id, IdError, LockToken, TransportId};
pub use lock::LockHandle;
pub use object::{
    DescriptorError, ObjectDescriptor, ObjectKind, ObjectPayload, PackageName,
    ParseObjectKindError,
};
pub use session::{SessionHandoff, SessionState, SessionStateHandoff};
pub use state::LifecycleState;
