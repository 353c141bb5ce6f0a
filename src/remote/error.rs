// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

/// Transport-level failure of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The call itself failed (DNS, connect, timeout, broken stream).
    Network { message: String },
    /// The remote system answered with a non-2xx status.
    Status { status: u16, message: String },
    /// The response arrived but does not carry what the contract requires.
    MalformedPayload {
        context: &'static str,
        message: String,
    },
    /// The configured base URL (or a path joined onto it) is not a valid URL.
    Url { message: String },
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { message } => write!(f, "network failure: {message}"),
            Self::Status { status, message } => {
                write!(f, "remote returned status {status}: {message}")
            }
            Self::MalformedPayload { context, message } => {
                write!(f, "malformed {context} response: {message}")
            }
            Self::Url { message } => write!(f, "invalid url: {message}"),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RemoteError;

    #[test]
    fn status_accessor_only_matches_status_errors() {
        let err = RemoteError::Status {
            status: 423,
            message: "locked".to_owned(),
        };
        assert_eq!(err.status(), Some(423));
        assert_eq!(
            RemoteError::Network {
                message: "timeout".to_owned()
            }
            .status(),
            None
        );
    }

    #[test]
    fn display_is_stable() {
        let err = RemoteError::MalformedPayload {
            context: "handshake",
            message: "no anti-forgery token".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "malformed handshake response: no anti-forgery token"
        );
    }
}
