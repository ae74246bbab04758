//! OAuth 2.0 installed-app flow for Google APIs.
//!
//! Authorization uses the code flow with PKCE and a loopback redirect: a
//! one-shot HTTP listener on an OS-assigned localhost port receives Google's
//! redirect, and the code it carries is exchanged for tokens. The state
//! parameter is checked on the way back.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::{GoogleConfig, OAuthCredentials};
use super::tokens::TokenInfo;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// PKCE verifier length in bytes, before encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long to wait for the browser to come back.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Client for Google's authorization and token endpoints.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
    token_url: String,
}

impl OAuthClient {
    /// Creates a new OAuth client with the given credentials.
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            credentials,
            http_client,
            token_url: GoogleConfig::GOOGLE_TOKEN_URL.to_string(),
        })
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Runs the interactive consent flow and returns fresh tokens.
    ///
    /// The consent URL is opened in the default browser and also printed to
    /// stderr for headless sessions. Blocks until the redirect arrives or
    /// the callback timeout elapses.
    pub async fn authorize(&self, scopes: &[String]) -> ProviderResult<TokenInfo> {
        let pkce = PkceFlow::new();

        let listener = TcpListener::bind("127.0.0.1:0").map_err(|e| {
            ProviderError::internal(format!("failed to bind loopback listener: {}", e))
        })?;
        let port = listener
            .local_addr()
            .map_err(|e| ProviderError::internal(format!("failed to read listener port: {}", e)))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{}/", port);
        debug!(port, "loopback listener ready");

        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, scopes);

        eprintln!("Please visit this URL to authorize this application:\n\n{}\n", auth_url);
        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
        }

        let callback = wait_for_callback(listener)?;
        if callback.state.as_deref() != Some(pkce.state.as_str()) {
            return Err(ProviderError::unauthenticated(
                "OAuth state mismatch in redirect",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&callback.code, &pkce.verifier, &redirect_uri, scopes)
            .await
    }

    /// Redeems a refresh token for a new access token.
    ///
    /// Returns the access token and its lifetime in seconds.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<(String, Option<i64>)> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.token_request(&params, "token refresh").await?;
        info!("refreshed access token");
        Ok((response.access_token, response.expires_in))
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> ProviderResult<TokenInfo> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.token_request(&params, "token exchange").await?;

        // Google echoes the granted scopes; fall back to what was asked for
        let granted = match response.scope {
            Some(ref scope) if !scope.trim().is_empty() => {
                scope.split_whitespace().map(str::to_string).collect()
            }
            _ => scopes.to_vec(),
        };

        info!("obtained tokens");
        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            granted,
        )
        .with_client(
            &self.credentials.client_id,
            &self.credentials.client_secret,
            &self.token_url,
        ))
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| ProviderError::transport(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::unauthenticated(format!(
                "{} failed ({}): {}",
                what, status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(format!("invalid token response: {}", e)))
    }
}

/// Query parameters Google appends to the redirect.
#[derive(Debug, Default, PartialEq, Eq)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// A successful redirect.
#[derive(Debug, PartialEq, Eq)]
struct Callback {
    code: String,
    state: Option<String>,
}

impl CallbackParams {
    /// Parses the target of an HTTP request line, e.g. `/?code=..&state=..`.
    fn from_request_target(target: &str) -> Self {
        let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
        let mut params = Self::default();

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            match key {
                "code" => params.code = Some(value),
                "state" => params.state = Some(value),
                "error" => params.error = Some(value),
                _ => {}
            }
        }

        params
    }

    fn into_result(self) -> ProviderResult<Callback> {
        if let Some(error) = self.error {
            return Err(ProviderError::unauthenticated(format!(
                "authorization denied: {}",
                error
            )));
        }
        match self.code {
            Some(code) => Ok(Callback {
                code,
                state: self.state,
            }),
            None => Err(ProviderError::unauthenticated(
                "missing authorization code in callback",
            )),
        }
    }
}

/// Accepts connections until one carries the redirect, or times out.
fn wait_for_callback(listener: TcpListener) -> ProviderResult<Callback> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => error!("failed to accept connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(ProviderError::unauthenticated("timed out waiting for OAuth redirect"))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(ProviderError::internal("callback listener stopped"))
        }
    }
}

/// Answers one request. Returns `None` for requests that are not the
/// redirect (favicon requests and the like).
fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<Callback>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return None;
    };

    let params = CallbackParams::from_request_target(target);
    if params.code.is_none() && params.error.is_none() {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        return None;
    }

    let response: &[u8] = if params.error.is_some() {
        b"HTTP/1.1 400 Bad Request\r\nContent-Type: text/plain\r\n\r\n\
        Authorization failed. You can close this window."
    } else {
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n\
        The authentication flow has completed. You may close this window."
    };
    let _ = stream.write_all(response);
    let _ = stream.flush();

    Some(params.into_result())
}

/// PKCE verifier, challenge and state for one authorization attempt.
#[derive(Debug)]
pub struct PkceFlow {
    /// The code verifier.
    pub verifier: String,
    /// SHA-256 of the verifier, base64url encoded.
    pub challenge: String,
    /// Random state echoed back in the redirect.
    pub state: String,
}

impl PkceFlow {
    /// Creates a new PKCE flow with random verifier and state.
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = Self::compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    fn compute_challenge(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }

    /// Builds the Google consent URL.
    ///
    /// Offline access with forced consent so a refresh token is always issued.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}
