//! Stateless client for the remote matchmaking backend.
//!
//! Four idempotent request/response operations, each a plain GET with a
//! fixed 10 second timeout and no retry — the caller decides whether a
//! failure is worth retrying. The client is blocking by design: it is
//! called from the UI's thread of control, never from the connection's
//! event context.

use std::time::Duration;

use serde_json::Value;

use crate::error::{CompanionError, Result};
use crate::lobby::JoinRequest;

/// Fixed timeout applied to every remote call.
const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Marker the backend embeds in a 404 body for unknown identities.
const NOT_FOUND_MARKER: &str = "User not found";

const AUTH_PATH: &str = "/auth";
const OTP_PATH: &str = "/otp";
const VERSION_PATH: &str = "/client_version";
const JOIN_MATCH_PATH: &str = "/joinmatch";

/// Outcome of an [`authenticate`](RemoteClient::authenticate) call.
///
/// Distinguishes the definitive "this identity is not registered"
/// answer from transient failures that a caller may retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The backend accepted the identity.
    Registered,
    /// The backend definitively does not know this identity (404 with
    /// the not-found marker). Retrying will not help.
    NotRegistered,
    /// The backend answered with some other non-200 status; treat as
    /// transient/unknown rather than definitive.
    Indeterminate {
        /// The status the backend returned.
        status: u16,
    },
}

/// Blocking request/response wrapper for the remote backend.
///
/// Safe to call from any thread. Holds no session state.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a client for the backend at `base_url`
    /// (e.g. `"https://rust.gameras.gr"`).
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::RemoteRequest`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .map_err(|e| CompanionError::RemoteRequest(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Check whether a stored identity token is registered.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::RemoteRequest`] on network failure or
    /// timeout. Non-200 responses are not errors; they map to
    /// [`AuthOutcome`] variants.
    pub fn authenticate(&self, discord_id: &str) -> Result<AuthOutcome> {
        let response = self.get(AUTH_PATH, &[("discord_id", discord_id)])?;
        let status = response.status().as_u16();
        tracing::debug!(status, "auth response");

        if status == 200 {
            return Ok(AuthOutcome::Registered);
        }
        if status == 404 {
            let body = self.read_text(response)?;
            if body.contains(NOT_FOUND_MARKER) {
                return Ok(AuthOutcome::NotRegistered);
            }
        }
        Ok(AuthOutcome::Indeterminate { status })
    }

    /// Redeem a one-time registration code for a credential token.
    ///
    /// Success requires a 200 status and a non-empty body; the trimmed
    /// body is the token.
    ///
    /// # Errors
    ///
    /// - [`CompanionError::RemoteStatus`] for non-200 responses.
    /// - [`CompanionError::MalformedResponse`] for an empty body.
    /// - [`CompanionError::RemoteRequest`] on network failure.
    pub fn redeem_code(&self, code: &str, summoner_display: &str) -> Result<String> {
        let response = self.get(
            OTP_PATH,
            &[("otp_pass", code.trim()), ("summonersname", summoner_display)],
        )?;
        let status = response.status().as_u16();
        tracing::debug!(status, "otp response");

        if status != 200 {
            return Err(CompanionError::RemoteStatus { status });
        }
        let body = self.read_text(response)?;
        let token = body.trim();
        if token.is_empty() {
            return Err(CompanionError::MalformedResponse {
                detail: "empty credential token".into(),
            });
        }
        Ok(token.to_string())
    }

    /// Fetch the latest published client version string.
    ///
    /// # Errors
    ///
    /// - [`CompanionError::RemoteStatus`] for non-200 responses.
    /// - [`CompanionError::MalformedResponse`] if the body is not
    ///   JSON `{"version": ...}`.
    /// - [`CompanionError::RemoteRequest`] on network failure.
    pub fn fetch_latest_version(&self) -> Result<String> {
        let response = self.get(VERSION_PATH, &[])?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(CompanionError::RemoteStatus { status });
        }
        let body: Value = response
            .json()
            .map_err(|e| CompanionError::MalformedResponse {
                detail: format!("version body is not JSON: {e}"),
            })?;
        body.get("version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CompanionError::MalformedResponse {
                detail: "version body has no 'version' field".into(),
            })
    }

    /// Exchange a match password for a [`JoinRequest`].
    ///
    /// The backend answers with `"{name}#{tag},{credential}"`.
    ///
    /// # Errors
    ///
    /// - [`CompanionError::RemoteStatus`] for non-200 responses.
    /// - [`CompanionError::MalformedResponse`] when the body is empty
    ///   or missing a separator.
    /// - [`CompanionError::RemoteRequest`] on network failure.
    pub fn join_match(&self, password: &str) -> Result<JoinRequest> {
        let response = self.get(JOIN_MATCH_PATH, &[("password", password.trim())])?;
        let status = response.status().as_u16();
        tracing::debug!(status, "joinmatch response");

        if status != 200 {
            return Err(CompanionError::RemoteStatus { status });
        }
        let body = self.read_text(response)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(CompanionError::MalformedResponse {
                detail: "empty join-match body".into(),
            });
        }
        JoinRequest::parse(body)
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::blocking::Response> {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .map_err(|e| CompanionError::RemoteRequest(e.to_string()))
    }

    fn read_text(&self, response: reqwest::blocking::Response) -> Result<String> {
        response
            .text()
            .map_err(|e| CompanionError::RemoteRequest(e.to_string()))
    }
}
