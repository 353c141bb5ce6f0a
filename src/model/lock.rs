// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::LockToken;
use super::session::SessionState;

/// Proof of exclusive edit rights to one object for one session.
///
/// `owning_session` is the SessionState returned *by* the lock call, not the
/// one used to request it; unlock must be issued with exactly this session.
/// The handle is deliberately not `Clone` and release consumes it, so a second
/// unlock with the same handle does not compile.
#[derive(Debug, PartialEq, Eq)]
pub struct LockHandle {
    token: LockToken,
    owning_session: SessionState,
}

impl LockHandle {
    pub fn new(token: LockToken, owning_session: SessionState) -> Self {
        Self {
            token,
            owning_session,
        }
    }

    pub fn token(&self) -> &LockToken {
        &self.token
    }

    pub fn owning_session(&self) -> &SessionState {
        &self.owning_session
    }

    pub fn into_parts(self) -> (LockToken, SessionState) {
        (self.token, self.owning_session)
    }
}
