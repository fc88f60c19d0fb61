//! Lobby discovery and the join sequence.
//!
//! Given a [`JoinRequest`] obtained from the remote backend, the
//! sequencer lists the custom lobbies visible to the local client,
//! picks the one owned by the target identity, and issues the join
//! call. The whole sequence runs inside the connection's execution
//! context — schedule it through the dispatcher, e.g. via
//! [`CompanionBridge::join_lobby`](crate::CompanionBridge::join_lobby).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dispatcher::JobContext;
use crate::error::{CompanionError, Result};
use crate::session::SummonerIdentity;
use crate::transport::Method;

/// Path listing the custom lobbies visible to the local client.
pub const AVAILABLE_LOBBIES_PATH: &str = "/lol-lobby/v2/lobby/custom/available";

/// Join endpoint for a specific custom lobby.
fn custom_join_path(lobby_id: &str) -> String {
    format!("/lol-lobby/v2/lobby/custom/{lobby_id}/join")
}

/// A request to join a specific player's lobby, produced by
/// [`RemoteClient::join_match`](crate::RemoteClient::join_match) and
/// consumed exactly once by [`join_lobby`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    /// Display name of the lobby owner to join.
    pub target_name: String,
    /// Tag line of the lobby owner.
    pub target_tag: String,
    /// Lobby password issued by the backend.
    pub credential: String,
}

impl JoinRequest {
    /// Parse the backend's `"{name}#{tag},{credential}"` body.
    ///
    /// Splits on the first `,`, then the left part on the first `#`.
    ///
    /// # Errors
    ///
    /// Returns [`CompanionError::MalformedResponse`] when either
    /// separator is missing.
    pub fn parse(body: &str) -> Result<Self> {
        let (identity, credential) =
            body.split_once(',')
                .ok_or_else(|| CompanionError::MalformedResponse {
                    detail: "join-match body has no ',' separator".into(),
                })?;
        let (name, tag) =
            identity
                .split_once('#')
                .ok_or_else(|| CompanionError::MalformedResponse {
                    detail: "join-match identity has no '#' separator".into(),
                })?;
        Ok(Self {
            target_name: name.to_string(),
            target_tag: tag.to_string(),
            credential: credential.to_string(),
        })
    }
}

/// Read-only projection of a custom lobby as listed by the local
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyDescriptor {
    /// Lobby identifier, used in the join path. The endpoint emits a
    /// JSON number here; both number and string are accepted.
    #[serde(deserialize_with = "lobby_id")]
    pub id: String,
    /// Owner identity as the client renders it, e.g. `"Ana #NA1"`.
    #[serde(default)]
    pub owner_display_name: String,
}

fn lobby_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "lobby id must be a number or string, got {other}"
        ))),
    }
}

/// Body of the custom-lobby join call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinBody<'a> {
    as_spectator: bool,
    password: &'a str,
}

/// Pick the lobby owned by `name`/`tag` from a listing.
///
/// Exact match first: the owner display identity equals
/// `"{name} #{tag}"` case-insensitively — the client renders owner
/// names with a space before the `#`. If no lobby matches exactly, fall
/// back to a prefix match on `"{name}#"` (no space), also
/// case-insensitive.
pub fn select_lobby<'a>(
    lobbies: &'a [LobbyDescriptor],
    name: &str,
    tag: &str,
) -> Option<&'a LobbyDescriptor> {
    let exact = format!("{name} #{tag}").to_lowercase();
    if let Some(lobby) = lobbies
        .iter()
        .find(|l| l.owner_display_name.to_lowercase() == exact)
    {
        return Some(lobby);
    }

    let prefix = format!("{name}#").to_lowercase();
    lobbies
        .iter()
        .find(|l| l.owner_display_name.to_lowercase().starts_with(&prefix))
}

/// Execute the join sequence against the live connection.
///
/// Must run inside the connection's execution context; the outcome
/// travels back to the caller on the dispatcher's result channel.
///
/// # Errors
///
/// - [`CompanionError::LobbyNotFound`] when no visible lobby matches.
/// - [`CompanionError::JoinFailed`] when the join call is rejected;
///   the message comes from the error body, defaulting to
///   `"Unknown error"`.
/// - [`CompanionError::Transport`] when a local call fails outright.
pub async fn join_lobby(ctx: &JobContext, request: JoinRequest) -> Result<SummonerIdentity> {
    let listing = ctx
        .api
        .request(Method::Get, AVAILABLE_LOBBIES_PATH, None)
        .await?;
    let lobbies: Vec<LobbyDescriptor> = listing.json()?;

    tracing::debug!(
        count = lobbies.len(),
        target = %format!("{}#{}", request.target_name, request.target_tag),
        "matching visible custom lobbies"
    );

    let Some(target) = select_lobby(&lobbies, &request.target_name, &request.target_tag) else {
        return Err(CompanionError::LobbyNotFound {
            name: request.target_name,
            tag: request.target_tag,
        });
    };

    let body = serde_json::to_value(JoinBody {
        as_spectator: false,
        password: &request.credential,
    })?;
    let response = ctx
        .api
        .request(Method::Post, &custom_join_path(&target.id), Some(body))
        .await?;

    if response.status == 200 {
        tracing::info!(
            owner = %target.owner_display_name,
            "joined custom lobby"
        );
        Ok(SummonerIdentity {
            name: request.target_name,
            tag: request.target_tag,
        })
    } else {
        let message = response
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        Err(CompanionError::JoinFailed { message })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn lobby(id: &str, owner: &str) -> LobbyDescriptor {
        LobbyDescriptor {
            id: id.into(),
            owner_display_name: owner.into(),
        }
    }

    #[test]
    fn parse_splits_on_first_separators() {
        let request = JoinRequest::parse("Ana#NA1,abc123").unwrap();
        assert_eq!(request.target_name, "Ana");
        assert_eq!(request.target_tag, "NA1");
        assert_eq!(request.credential, "abc123");
    }

    #[test]
    fn parse_keeps_extra_separators_in_the_tail() {
        // Only the first ',' and the first '#' split.
        let request = JoinRequest::parse("Ana#NA#1,abc,123").unwrap();
        assert_eq!(request.target_tag, "NA#1");
        assert_eq!(request.credential, "abc,123");
    }

    #[test]
    fn parse_without_comma_is_malformed() {
        let err = JoinRequest::parse("malformed").unwrap_err();
        assert!(matches!(err, CompanionError::MalformedResponse { .. }));
    }

    #[test]
    fn parse_without_hash_is_malformed() {
        let err = JoinRequest::parse("AnaNA1,abc123").unwrap_err();
        assert!(matches!(err, CompanionError::MalformedResponse { .. }));
    }

    #[test]
    fn exact_match_requires_the_embedded_space() {
        let lobbies = vec![lobby("1", "Ana #NA1"), lobby("2", "Bob #EUW")];
        let hit = select_lobby(&lobbies, "Ana", "NA1").unwrap();
        assert_eq!(hit.id, "1");
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let lobbies = vec![lobby("1", "ANA #na1")];
        assert!(select_lobby(&lobbies, "ana", "NA1").is_some());
    }

    #[test]
    fn prefix_match_kicks_in_when_no_exact_entry() {
        let lobbies = vec![lobby("7", "Ana#NA1-smurf")];
        let hit = select_lobby(&lobbies, "Ana", "NA1-smurf").unwrap();
        assert_eq!(hit.id, "7");
    }

    #[test]
    fn exact_match_wins_over_prefix_match() {
        let lobbies = vec![lobby("1", "Ana#NA1extra"), lobby("2", "Ana #NA1")];
        let hit = select_lobby(&lobbies, "Ana", "NA1").unwrap();
        assert_eq!(hit.id, "2");
    }

    #[test]
    fn no_match_returns_none() {
        let lobbies = vec![lobby("1", "Someone #Else")];
        assert!(select_lobby(&lobbies, "Ana", "NA1").is_none());
    }

    #[test]
    fn descriptor_accepts_numeric_id() {
        let json = r#"{"id": 42, "ownerDisplayName": "Ana #NA1"}"#;
        let descriptor: LobbyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.id, "42");
        assert_eq!(descriptor.owner_display_name, "Ana #NA1");
    }

    #[test]
    fn descriptor_missing_owner_defaults_to_empty() {
        let json = r#"{"id": "9"}"#;
        let descriptor: LobbyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.owner_display_name, "");
    }

    #[test]
    fn join_body_wire_format() {
        let body = serde_json::to_value(JoinBody {
            as_spectator: false,
            password: "pin",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"asSpectator": false, "password": "pin"})
        );
    }
}
