// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Classification of check/activate responses.
//!
//! The remote system reports activation as three booleans plus a message list
//! whose severities arrive either as full words ("error") or single letters
//! ("E"). Parsing is tolerant: absent fields default to `false`/empty.

use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Normalizes the wire severity; anything unrecognized is `Info`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "E" | "e" => Self::Error,
            "W" | "w" => Self::Warning,
            other if other.eq_ignore_ascii_case("error") => Self::Error,
            other if other.eq_ignore_ascii_case("warning") => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationMessage {
    severity: Severity,
    text: String,
}

impl ActivationMessage {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ActivationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.text)
    }
}

/// Outcome of one check/activate call, derived and read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationResult {
    activated: bool,
    checked: bool,
    generated: bool,
    messages: Vec<ActivationMessage>,
}

impl ActivationResult {
    pub fn new(
        activated: bool,
        checked: bool,
        generated: bool,
        messages: Vec<ActivationMessage>,
    ) -> Self {
        Self {
            activated,
            checked,
            generated,
            messages,
        }
    }

    pub fn activated(&self) -> bool {
        self.activated
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn generated(&self) -> bool {
        self.generated
    }

    pub fn messages(&self) -> &[ActivationMessage] {
        &self.messages
    }

    pub fn errors(&self) -> impl Iterator<Item = &ActivationMessage> {
        self.messages
            .iter()
            .filter(|message| message.severity() == Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// An activation succeeds when nothing was reported at error severity and
    /// either the object was activated and checked, or the call only generated
    /// scaffolding (an empty container is a valid terminal state).
    pub fn is_success(&self) -> bool {
        if self.has_errors() {
            return false;
        }
        (self.activated && self.checked) || self.generated
    }
}

/// Parses a raw check/activate response body.
///
/// Tolerates partially-populated payloads: a missing flag defaults to `false`
/// and a missing message list to empty.
pub fn parse_activation(body: &Value) -> ActivationResult {
    ActivationResult {
        activated: flag(body, "activated"),
        checked: flag(body, "checked"),
        generated: flag(body, "generated"),
        messages: parse_messages(body.get("messages").unwrap_or(&Value::Null)),
    }
}

/// Parses a message list; the severity key may be `severity` or `type`, the
/// text key `text` or `message`.
pub fn parse_messages(value: &Value) -> Vec<ActivationMessage> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| {
            let severity = entry
                .get("severity")
                .or_else(|| entry.get("type"))
                .and_then(Value::as_str)
                .map(Severity::from_label)
                .unwrap_or(Severity::Info);
            let text = entry
                .get("text")
                .or_else(|| entry.get("message"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            ActivationMessage::new(severity, text)
        })
        .collect()
}

fn flag(body: &Value, key: &str) -> bool {
    body.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_activation, ActivationMessage, ActivationResult, Severity};

    #[test]
    fn severity_normalizes_words_and_letters() {
        assert_eq!(Severity::from_label("E"), Severity::Error);
        assert_eq!(Severity::from_label("error"), Severity::Error);
        assert_eq!(Severity::from_label("Error"), Severity::Error);
        assert_eq!(Severity::from_label("W"), Severity::Warning);
        assert_eq!(Severity::from_label("warning"), Severity::Warning);
        assert_eq!(Severity::from_label("I"), Severity::Info);
        assert_eq!(Severity::from_label("success"), Severity::Info);
    }

    #[test]
    fn fully_successful_activation_is_success() {
        let result = ActivationResult::new(true, true, false, Vec::new());
        assert!(result.is_success());
        assert!(!result.has_errors());
    }

    #[test]
    fn error_messages_always_fail_regardless_of_flags() {
        let result = ActivationResult::new(
            true,
            true,
            true,
            vec![ActivationMessage::new(Severity::Error, "syntax error")],
        );
        assert!(!result.is_success());
    }

    #[test]
    fn generated_only_activation_is_success() {
        // An empty container that only generates scaffolding code.
        let result = ActivationResult::new(false, false, true, Vec::new());
        assert!(result.is_success());
    }

    #[test]
    fn inactive_unchecked_ungenerated_is_failure() {
        let result = ActivationResult::new(false, false, false, Vec::new());
        assert!(!result.is_success());
    }

    #[test]
    fn warnings_do_not_fail_activation() {
        let result = ActivationResult::new(
            true,
            true,
            false,
            vec![ActivationMessage::new(Severity::Warning, "obsolete syntax")],
        );
        assert!(result.is_success());
    }

    #[test]
    fn parse_tolerates_partial_payloads() {
        let result = parse_activation(&json!({ "generated": true }));
        assert!(result.generated());
        assert!(!result.activated());
        assert!(!result.checked());
        assert!(result.messages().is_empty());
    }

    #[test]
    fn parse_reads_letter_severities_and_message_key() {
        let result = parse_activation(&json!({
            "activated": true,
            "checked": true,
            "messages": [
                { "type": "E", "message": "field LENGTH missing" },
                { "severity": "warning", "text": "name is not namespaced" },
                { "text": "generated include" },
            ],
        }));
        let severities: Vec<_> = result
            .messages()
            .iter()
            .map(|message| message.severity())
            .collect();
        assert_eq!(
            severities,
            vec![Severity::Error, Severity::Warning, Severity::Info]
        );
        assert_eq!(result.messages()[0].text(), "field LENGTH missing");
        assert!(!result.is_success());
    }

    #[test]
    fn parse_of_non_array_messages_is_empty() {
        let result = parse_activation(&json!({ "activated": true, "messages": "none" }));
        assert!(result.messages().is_empty());
    }
}
