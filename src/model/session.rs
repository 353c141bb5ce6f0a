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

/// Authentication/continuity state for one remote session.
///
/// Produced by the handshake and superseded wholesale by any later response
/// that carries session-affecting data. Holders thread the latest value
/// forward; two SessionStates are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    cookies: String,
    csrf_token: String,
    cookie_map: BTreeMap<String, String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            cookies: String::new(),
            csrf_token: String::new(),
            cookie_map: BTreeMap::new(),
        }
    }

    /// Builds a complete state from an anti-forgery token and a cookie map;
    /// the `Cookie` header string is derived from the map.
    pub fn from_parts(csrf_token: impl Into<String>, cookie_map: BTreeMap<String, String>) -> Self {
        let cookies = cookie_header(&cookie_map);
        Self {
            cookies,
            csrf_token: csrf_token.into(),
            cookie_map,
        }
    }

    pub fn cookies(&self) -> &str {
        &self.cookies
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn cookie_map(&self) -> &BTreeMap<String, String> {
        &self.cookie_map
    }

    pub fn is_established(&self) -> bool {
        !self.csrf_token.is_empty() || !self.cookie_map.is_empty()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

fn cookie_header(map: &BTreeMap<String, String>) -> String {
    let mut header = String::new();
    for (name, value) in map {
        if !header.is_empty() {
            header.push_str("; ");
        }
        header.push_str(name);
        header.push('=');
        header.push_str(value);
    }
    header
}

/// The session handoff shape accepted and produced by every tool call, so
/// callers can persist and replay a session across process boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandoff {
    pub session_id: String,
    pub session_state: SessionStateHandoff,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionStateHandoff {
    pub cookies: String,
    pub csrf_token: String,
    pub cookie_store: BTreeMap<String, String>,
}

impl SessionHandoff {
    pub fn new(session_id: impl Into<String>, state: &SessionState) -> Self {
        Self {
            session_id: session_id.into(),
            session_state: SessionStateHandoff {
                cookies: state.cookies().to_owned(),
                csrf_token: state.csrf_token().to_owned(),
                cookie_store: state.cookie_map().clone(),
            },
        }
    }

    pub fn to_state(&self) -> SessionState {
        SessionState::from_parts(
            self.session_state.csrf_token.clone(),
            self.session_state.cookie_store.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{SessionHandoff, SessionState};

    fn sample_state() -> SessionState {
        let mut cookies = BTreeMap::new();
        cookies.insert("route".to_owned(), "r1".to_owned());
        cookies.insert("sid".to_owned(), "abc".to_owned());
        SessionState::from_parts("token-1", cookies)
    }

    #[test]
    fn cookie_header_is_derived_from_map() {
        let state = sample_state();
        assert_eq!(state.cookies(), "route=r1; sid=abc");
    }

    #[test]
    fn empty_state_is_not_established() {
        assert!(!SessionState::new().is_established());
        assert!(sample_state().is_established());
    }

    #[test]
    fn handoff_round_trips_session_state() {
        let state = sample_state();
        let handoff = SessionHandoff::new("session-1", &state);
        assert_eq!(handoff.to_state(), state);
    }

    #[test]
    fn handoff_serializes_with_wire_field_names() {
        let handoff = SessionHandoff::new("session-1", &sample_state());
        let value = serde_json::to_value(&handoff).expect("serialize handoff");
        assert_eq!(value["sessionId"], "session-1");
        assert_eq!(value["sessionState"]["csrf_token"], "token-1");
        assert_eq!(value["sessionState"]["cookie_store"]["sid"], "abc");
        assert_eq!(value["sessionState"]["cookies"], "route=r1; sid=abc");
    }
}
