// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, COOKIE, SET_COOKIE};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::model::SessionState;

use super::error::RemoteError;
use super::request::{Method, RemoteRequest, RemoteResponse};

const SESSION_PATH: &str = "/api/v1/session";
const CSRF_HEADER: &str = "x-csrf-token";
const CSRF_FETCH: &str = "fetch";
const TENANT_HEADER: &str = "x-repository-tenant";

/// Performs one network call at a time against the remote repository.
///
/// The Connection owns no session: the caller supplies the current
/// SessionState with every call and adopts the returned successor. Cookies are
/// managed explicitly because SessionState is part of the wire contract, so
/// the underlying client's cookie store stays disabled.
pub struct Connection {
    http: reqwest::Client,
    base: Url,
    authorization: String,
    tenant: Option<String>,
}

impl Connection {
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let base = Url::parse(config.base_url()).map_err(|err| RemoteError::Url {
            message: format!("{}: {err}", config.base_url()),
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()?;
        let authorization = format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", config.username(), config.password()))
        );
        Ok(Self {
            http,
            base,
            authorization,
            tenant: config.tenant().map(str::to_owned),
        })
    }

    /// Initial handshake: fetches the anti-forgery token and session cookies.
    pub async fn handshake(&self) -> Result<SessionState, RemoteError> {
        let url = self.join(SESSION_PATH)?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
            .header(CSRF_HEADER, CSRF_FETCH)
            .headers(self.tenant_headers())
            .send()
            .await?;

        let status = response.status();
        let csrf_token = header_value(response.headers().get(CSRF_HEADER));
        let cookies = collect_cookies(response.headers());
        let body = decode_body(response.text().await?);

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: status_message(&body),
            });
        }

        let Some(csrf_token) = csrf_token else {
            return Err(RemoteError::MalformedPayload {
                context: "handshake",
                message: "response carries no anti-forgery token".to_owned(),
            });
        };

        Ok(SessionState::from_parts(csrf_token, cookies.into_iter().collect()))
    }

    /// Executes one call with the given session attached and returns the
    /// response together with the successor SessionState. The successor equals
    /// the input unless the response carries session-affecting data, in which
    /// case it fully replaces it for the remainder of the sequence. Never
    /// retries; non-2xx statuses surface as `RemoteError::Status`.
    pub async fn execute(
        &self,
        request: &RemoteRequest,
        session: &SessionState,
    ) -> Result<(RemoteResponse, SessionState), RemoteError> {
        let url = self.join(request.path())?;
        let mut builder = match request.method() {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };

        builder = builder
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
            .headers(self.tenant_headers());
        if !session.csrf_token().is_empty() {
            builder = builder.header(CSRF_HEADER, session.csrf_token());
        }
        if !session.cookies().is_empty() {
            builder = builder.header(COOKIE, session.cookies());
        }
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let csrf_token = header_value(response.headers().get(CSRF_HEADER));
        let cookies = collect_cookies(response.headers());
        let body = decode_body(response.text().await?);

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: status_message(&body),
            });
        }

        let response = RemoteResponse::new(status.as_u16(), body, csrf_token, cookies);
        let next = successor_session(session, &response);
        tracing::debug!(
            method = request.method().as_str(),
            path = request.path(),
            status = response.status(),
            refreshed = response.refreshed_session(),
            "remote call"
        );
        Ok((response, next))
    }

    fn join(&self, path: &str) -> Result<Url, RemoteError> {
        self.base.join(path).map_err(|err| RemoteError::Url {
            message: format!("{path}: {err}"),
        })
    }

    fn tenant_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(tenant) = &self.tenant {
            if let Ok(value) = HeaderValue::from_str(tenant) {
                headers.insert(TENANT_HEADER, value);
            }
        }
        headers
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

/// Builds the successor SessionState for one response. A response without
/// session-affecting data leaves the session untouched; otherwise the result
/// is a complete replacement state (current cookie map with the response's
/// cookies applied, token replaced when present).
fn successor_session(current: &SessionState, response: &RemoteResponse) -> SessionState {
    if !response.refreshed_session() {
        return current.clone();
    }

    let mut cookie_map = current.cookie_map().clone();
    for (name, value) in response.cookies() {
        cookie_map.insert(name.clone(), value.clone());
    }
    let csrf_token = response
        .csrf_token()
        .unwrap_or_else(|| current.csrf_token())
        .to_owned();
    SessionState::from_parts(csrf_token, cookie_map)
}

fn collect_cookies(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect()
}

/// Extracts `name=value` from a `Set-Cookie` header, ignoring attributes.
fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_owned(), value.trim().to_owned()))
}

fn header_value(value: Option<&HeaderValue>) -> Option<String> {
    value.and_then(|v| v.to_str().ok()).map(str::to_owned)
}

fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn status_message(body: &Value) -> String {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| match body {
            Value::String(text) => text.clone(),
            Value::Null => "no response body".to_owned(),
            other => other.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        decode_body, parse_set_cookie, status_message, successor_session, Connection,
    };
    use crate::config::Config;
    use crate::model::SessionState;
    use crate::remote::RemoteResponse;

    fn session() -> SessionState {
        SessionState::from_parts(
            "token-1",
            [("sid".to_owned(), "abc".to_owned())].into_iter().collect(),
        )
    }

    #[test]
    fn successor_is_identical_without_session_data() {
        let current = session();
        let response = RemoteResponse::new(200, json!({}), None, Vec::new());
        assert_eq!(successor_session(&current, &response), current);
    }

    #[test]
    fn successor_replaces_token_and_applies_cookies() {
        let current = session();
        let response = RemoteResponse::new(
            200,
            json!({}),
            Some("token-2".to_owned()),
            vec![("route".to_owned(), "r9".to_owned())],
        );
        let next = successor_session(&current, &response);
        assert_eq!(next.csrf_token(), "token-2");
        assert_eq!(next.cookie_map().get("sid").map(String::as_str), Some("abc"));
        assert_eq!(next.cookie_map().get("route").map(String::as_str), Some("r9"));
        assert_ne!(next, current);
    }

    #[test]
    fn successor_keeps_token_when_only_cookies_change() {
        let current = session();
        let response = RemoteResponse::new(
            200,
            json!({}),
            None,
            vec![("sid".to_owned(), "def".to_owned())],
        );
        let next = successor_session(&current, &response);
        assert_eq!(next.csrf_token(), "token-1");
        assert_eq!(next.cookie_map().get("sid").map(String::as_str), Some("def"));
    }

    #[test]
    fn set_cookie_parsing_ignores_attributes() {
        assert_eq!(
            parse_set_cookie("sid=abc; Path=/; HttpOnly"),
            Some(("sid".to_owned(), "abc".to_owned()))
        );
        assert_eq!(
            parse_set_cookie("route=r1"),
            Some(("route".to_owned(), "r1".to_owned()))
        );
        assert_eq!(parse_set_cookie("=value; Path=/"), None);
        assert_eq!(parse_set_cookie("no-equals-sign"), None);
    }

    #[test]
    fn body_decoding_falls_back_to_text() {
        assert_eq!(decode_body(String::new()), serde_json::Value::Null);
        assert_eq!(decode_body("{\"a\":1}".to_owned()), json!({ "a": 1 }));
        assert_eq!(
            decode_body("plain text".to_owned()),
            serde_json::Value::String("plain text".to_owned())
        );
    }

    #[test]
    fn status_message_prefers_structured_fields() {
        assert_eq!(status_message(&json!({ "message": "locked" })), "locked");
        assert_eq!(status_message(&json!({ "error": "denied" })), "denied");
        assert_eq!(status_message(&serde_json::Value::Null), "no response body");
    }

    #[test]
    fn connection_rejects_invalid_base_url() {
        let config = Config::new("not a url", "developer", "secret");
        assert!(Connection::new(&config).is_err());
    }
}
