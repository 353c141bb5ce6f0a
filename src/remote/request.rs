// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One outgoing remote call, independent of any session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RemoteRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// One incoming remote answer, with the session-affecting header data the
/// Connection extracted alongside the decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    status: u16,
    body: Value,
    csrf_token: Option<String>,
    cookies: Vec<(String, String)>,
}

impl RemoteResponse {
    pub fn new(
        status: u16,
        body: Value,
        csrf_token: Option<String>,
        cookies: Vec<(String, String)>,
    ) -> Self {
        Self {
            status,
            body,
            csrf_token,
            cookies,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    /// Whether this response carries session-affecting data at all.
    pub fn refreshed_session(&self) -> bool {
        self.csrf_token.is_some() || !self.cookies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Method, RemoteRequest, RemoteResponse};

    #[test]
    fn request_builder_collects_query_and_body() {
        let request = RemoteRequest::post("/api/v1/repository/domains/Z_DATE/lock")
            .with_query("access", "modify")
            .with_body(json!({ "reason": "edit" }));
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.query(), &[("access".to_owned(), "modify".to_owned())]);
        assert_eq!(request.body(), Some(&json!({ "reason": "edit" })));
    }

    #[test]
    fn response_reports_session_refresh() {
        let bare = RemoteResponse::new(200, json!({}), None, Vec::new());
        assert!(!bare.refreshed_session());

        let token = RemoteResponse::new(200, json!({}), Some("t".to_owned()), Vec::new());
        assert!(token.refreshed_session());

        let cookie = RemoteResponse::new(
            200,
            json!({}),
            None,
            vec![("sid".to_owned(), "1".to_owned())],
        );
        assert!(cookie.refreshed_session());
    }
}
