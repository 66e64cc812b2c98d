//! The application keys plugin: the authorization workflow an application
//! uses to obtain an api key, and management of already issued keys.
//!
//! The workflow is:
//!
//! 1. [Client::probe_workflow_support] to check the plugin is enabled.
//! 2. [Client::start_authorization] to open a request; show the user the
//!    returned [AuthorizationResponse::auth_dialog].
//! 3. [Client::poll_decision] on a fixed interval until a decision arrives.
//!    OctoPrint drops requests that are not polled for 5 seconds.
//!
//! A logged-in user may answer a request with [Client::decide].

use reqwest::{header::LOCATION, Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    client::{decode, unexpected_status},
    route::Route,
    Client, Error, Result,
};

/// Body of a request starting the authorization workflow.
#[derive(Clone, Debug, Serialize)]
struct AuthorizationRequest<'a> {
    /// Application identifier, compared case insensitively by the server.
    app: &'a str,

    /// User the request is restricted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

/// Server acknowledgment of a started authorization request.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorizationResponse {
    /// Application token used to poll for the decision.
    pub app_token: String,

    /// Url of a dedicated dialog where the user can log in and answer the
    /// request.
    pub auth_dialog: Url,
}

/// An authorization request waiting for a decision.
///
/// Pass it to [Client::poll_decision] as often as needed; polling never
/// changes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAuthorizationDecision {
    /// Poll endpoint, as named by the `Location` header of the response.
    pub endpoint: String,

    /// The server's acknowledgment of the request.
    pub response: AuthorizationResponse,
}

/// Final outcome of an authorization request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// The user granted access; `api_key` is the new application key.
    Granted {
        /// The issued application key.
        api_key: String,
    },

    /// The user denied access, or the request expired.
    Denied,
}

#[derive(Clone, Debug, Deserialize)]
struct KeyResponse {
    api_key: String,
}

#[derive(Clone, Copy, Debug, Serialize)]
struct DecisionRequest {
    decision: bool,
}

/// Command understood by the application keys api.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKeyCommandKind {
    /// Revoke an existing key.
    Revoke,

    /// Generate a new key for an application.
    Generate,
}

/// Body of a `POST api/plugin/appkeys` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationKeyCommand {
    /// What to do.
    pub command: ApplicationKeyCommandKind,

    /// The key to revoke, or the application identifier to generate a key
    /// for.
    pub key: String,
}

/// Existing application keys and pending requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListResponse {
    /// Issued application keys.
    #[serde(default)]
    pub keys: Vec<KeyListEntry>,

    /// Requests still waiting for a decision.
    #[serde(default)]
    pub pending: Vec<PendingListEntry>,
}

/// An issued application key.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyListEntry {
    /// Api key
    pub api_key: String,

    /// Application identifier
    pub app_id: String,

    /// User ID of the key's owner
    pub user_id: String,
}

/// An authorization request waiting for a decision.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PendingListEntry {
    /// Application identifier
    pub app_id: String,

    /// User ID of the user who can grant or deny the request, if restricted.
    pub user_id: Option<String>,

    /// Token to grant or deny the request with.
    pub user_token: String,
}

impl Client {
    /// Probe for support of the authorization workflow.
    ///
    /// `false` means the plugin is disabled or not installed; fall back to
    /// having the user copy an api key by hand.
    pub async fn probe_workflow_support(&self) -> Result<bool> {
        let route = Route::ProbeWorkflowSupport;
        let response = self.send(self.request(Method::GET, route)?).await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(unexpected_status(route, status)),
        }
    }

    /// Start the authorization workflow for `application_id`.
    ///
    /// `application_id` is shown to the user and compared case
    /// insensitively, so `My App` and `my APP` are the same application.
    /// When `user` is set only that user is offered the request.
    pub async fn start_authorization(
        &self,
        application_id: &str,
        user: Option<&str>,
    ) -> Result<PendingAuthorizationDecision> {
        tracing::debug!(app = application_id, user = ?user, "starting authorization");

        let route = Route::RequestAppKey;
        let body = AuthorizationRequest {
            app: application_id,
            user,
        };
        let response = self.send(self.request(Method::POST, route)?.json(&body)).await?;
        if response.status() != StatusCode::CREATED {
            return Err(unexpected_status(route, response.status()));
        }

        let endpoint = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                tracing::warn!("authorization response without a usable Location header");
                Error::InvalidResponse
            })?;

        Ok(PendingAuthorizationDecision {
            endpoint,
            response: decode(response).await?,
        })
    }

    /// Poll once for the decision on a pending authorization request.
    ///
    /// Returns `None` while no decision has been made. A request the server
    /// no longer knows about (denied, or expired after not being polled) is
    /// [AuthorizationDecision::Denied].
    pub async fn poll_decision(
        &self,
        pending: &PendingAuthorizationDecision,
    ) -> Result<Option<AuthorizationDecision>> {
        let route = Route::PollAppKeyRequestDecision {
            app_token: &pending.response.app_token,
        };
        let response = self.send(self.request(Method::GET, route)?).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(Some(AuthorizationDecision::Denied)),
            StatusCode::ACCEPTED => Ok(None),
            StatusCode::OK => {
                let key: KeyResponse = decode(response).await?;
                Ok(Some(AuthorizationDecision::Granted { api_key: key.api_key }))
            }
            status => Err(unexpected_status(route, status)),
        }
    }

    /// Grant (`allow`) or deny an existing authorization request, as the
    /// user identified by `user_token`.
    pub async fn decide(&self, user_token: &str, allow: bool) -> Result<()> {
        let route = Route::DecideExistingRequest { user_token };
        let body = DecisionRequest { decision: allow };
        let response = self.send(self.request(Method::POST, route)?.json(&body)).await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::BAD_REQUEST => Err(Error::BadRequest),
            status => Err(unexpected_status(route, status)),
        }
    }

    /// Fetch the application keys and pending requests of the current user,
    /// or of every user when `all_users` is set (requires admin rights).
    pub async fn list_application_keys(&self, all_users: bool) -> Result<ListResponse> {
        self.get_json(if all_users {
            Route::ApplicationKeysForAllUsers
        } else {
            Route::ApplicationKeys
        })
        .await
    }

    /// Revoke an application key. Admins may revoke any user's key.
    pub async fn revoke_application_key(&self, key: &str) -> Result<()> {
        self.application_keys_command(ApplicationKeyCommandKind::Revoke, key).await
    }

    /// Generate a new application key for the current user.
    pub async fn generate_application_key(&self, application_id: &str) -> Result<()> {
        self.application_keys_command(ApplicationKeyCommandKind::Generate, application_id)
            .await
    }

    async fn application_keys_command(&self, command: ApplicationKeyCommandKind, key: &str) -> Result<()> {
        let route = Route::ApplicationKeys;
        let body = ApplicationKeyCommand {
            command,
            key: key.to_owned(),
        };
        let response = self.send(self.request(Method::POST, route)?.json(&body)).await?;
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::FORBIDDEN => Err(Error::InvalidCredentials),
            status => Err(unexpected_status(route, status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_authorization_request_omits_missing_user() {
        let body = serde_json::to_value(AuthorizationRequest {
            app: "MyApp",
            user: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "app": "MyApp" }));

        let body = serde_json::to_value(AuthorizationRequest {
            app: "MyApp",
            user: Some("alice"),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "app": "MyApp", "user": "alice" }));
    }

    #[test]
    fn test_deserialize_authorization_response() {
        let response: AuthorizationResponse =
            serde_json::from_str(r#"{ "app_token": "abc123", "auth_dialog": "https://host/auth" }"#).unwrap();
        assert_eq!(response.app_token, "abc123");
        assert_eq!(response.auth_dialog.as_str(), "https://host/auth");
    }

    #[test]
    fn test_deserialize_authorization_response_bad_url() {
        let result =
            serde_json::from_str::<AuthorizationResponse>(r#"{ "app_token": "abc123", "auth_dialog": "not a url" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_key_command() {
        let body = serde_json::to_value(ApplicationKeyCommand {
            command: ApplicationKeyCommandKind::Revoke,
            key: "XYZ".to_owned(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "command": "revoke", "key": "XYZ" }));
    }

    #[test]
    fn test_deserialize_list_response() {
        let list: ListResponse = serde_json::from_str(
            r#"{
                "keys": [
                    { "api_key": "aabbccdd", "app_id": "Slicer", "user_id": "alice" }
                ],
                "pending": [
                    { "app_id": "Phone", "user_id": null, "user_token": "t0k3n" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            list,
            ListResponse {
                keys: vec![KeyListEntry {
                    api_key: "aabbccdd".to_owned(),
                    app_id: "Slicer".to_owned(),
                    user_id: "alice".to_owned(),
                }],
                pending: vec![PendingListEntry {
                    app_id: "Phone".to_owned(),
                    user_id: None,
                    user_token: "t0k3n".to_owned(),
                }],
            }
        );
    }
}
