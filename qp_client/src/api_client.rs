//! HTTP API client for the quantum poker server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quantum_poker::game::entities::LobbySnapshot;

/// API client for the auth and lobby REST surface.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
}

/// The authenticated user as the server reports it.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
struct CreateLobbyRequest {
    name: String,
    max_players: u8,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            access_token: None,
        }
    }

    /// Adopt a previously issued token (e.g. from the credential store).
    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    /// The current access token, if authenticated.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Register a new user, then log in for a token.
    pub async fn register(
        &mut self,
        username: String,
        email: String,
        password: String,
    ) -> Result<()> {
        let request = RegisterRequest {
            username: username.clone(),
            email,
            password: password.clone(),
        };

        let response = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&request)
            .send()
            .await
            .context("failed to send register request")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error response: {}", e));
            anyhow::bail!("registration failed: {}", error_text);
        }

        self.login(username, password).await
    }

    /// Log in with username and password.
    pub async fn login(&mut self, username: String, password: String) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await
            .context("failed to send login request")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error response: {}", e));
            anyhow::bail!("login failed: {}", error_text);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("failed to parse login response")?;

        self.access_token = Some(token.access_token);
        Ok(())
    }

    /// The authenticated user's identity; also validates a stored token.
    pub async fn me(&self) -> Result<UserResponse> {
        let token = self.access_token.as_ref().context("not authenticated")?;

        let response = self
            .client
            .get(format!("{}/api/auth/me", self.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .context("failed to fetch current user")?;

        if !response.status().is_success() {
            anyhow::bail!("session token rejected: {}", response.status());
        }

        response.json().await.context("failed to parse current user")
    }

    /// List all open lobbies.
    pub async fn list_lobbies(&self) -> Result<Vec<LobbySnapshot>> {
        let response = self
            .client
            .get(format!("{}/api/lobbies", self.base_url))
            .send()
            .await
            .context("failed to list lobbies")?;

        response.json().await.context("failed to parse lobby list")
    }

    /// Create a lobby and return its public snapshot.
    pub async fn create_lobby(&self, name: String, max_players: u8) -> Result<LobbySnapshot> {
        let token = self.access_token.as_ref().context("not authenticated")?;

        let response = self
            .client
            .post(format!("{}/api/lobbies", self.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .json(&CreateLobbyRequest { name, max_players })
            .send()
            .await
            .context("failed to send create-lobby request")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("failed to read error response: {}", e));
            anyhow::bail!("create lobby failed: {}", error_text);
        }

        response.json().await.context("failed to parse created lobby")
    }

    /// The websocket URL for a lobby's push channel, carrying the token as
    /// the transport requires.
    pub fn websocket_url(&self, lobby_id: &str) -> Result<String> {
        let token = self.access_token.as_ref().context("not authenticated")?;

        let ws_base = self
            .base_url
            .replace("http://", "ws://")
            .replace("https://", "wss://");
        Ok(format!("{}/ws/{}?token={}", ws_base, lobby_id, token))
    }
}
