// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Remote repository transport.
//!
//! One network call at a time: `Connection::execute` attaches the current
//! SessionState to the outgoing request and returns the successor SessionState
//! found in the response. No retries, no business logic.

mod connection;
mod error;
mod request;

pub use connection::Connection;
pub use error::RemoteError;
pub use request::{Method, RemoteRequest, RemoteResponse};
