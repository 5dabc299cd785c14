//! OAuth 2.0 authorization-code flow for Google APIs.
//!
//! The flow builds an authorization URL (with a PKCE S256 challenge), opens
//! it in the user's browser, obtains the authorization code through a
//! pluggable [`CodeAcquirer`], and exchanges the code for an access/refresh
//! token pair. Refreshing an expired access token goes through the same
//! token endpoint.
//!
//! Two acquirers are provided:
//!
//! - [`ConsolePrompt`]: the user pastes the code into the terminal. Blocks
//!   without timeout; this is a one-time foreground setup step.
//! - [`LoopbackListener`]: a localhost HTTP listener receives the redirect,
//!   verifies the CSRF state, and answers the browser with a small HTML page.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::credentials::GoogleCredentials;
use crate::error::{GoogleError, GoogleResult};
use crate::tokens::TokenSet;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// PKCE code verifier length in bytes, before base64 encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long the loopback listener waits for the browser redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// How the one-time authorization code reaches the flow.
///
/// Implementations present `auth_url` to the user (the flow has already
/// tried to open a browser) and return the code Google hands back.
pub trait CodeAcquirer: Send + Sync {
    /// The redirect URI the authorization request should use, when this
    /// acquirer dictates one. `None` means use the URI registered in the
    /// client credentials.
    fn redirect_uri(&self) -> GoogleResult<Option<String>>;

    /// Blocks until the authorization code is available.
    ///
    /// `expected_state` is the CSRF state embedded in `auth_url`; acquirers
    /// that can observe the redirect must verify it.
    fn acquire(&self, auth_url: &str, expected_state: &str) -> GoogleResult<String>;
}

/// Reads the authorization code from one line of standard input.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl CodeAcquirer for ConsolePrompt {
    fn redirect_uri(&self) -> GoogleResult<Option<String>> {
        Ok(None)
    }

    fn acquire(&self, auth_url: &str, _expected_state: &str) -> GoogleResult<String> {
        println!("Authorize this app by visiting this url:\n\n{}\n", auth_url);
        print!("Enter the code from that page here: ");
        std::io::stdout().flush()?;

        let mut code = String::new();
        std::io::stdin().read_line(&mut code)?;
        let code = code.trim().to_string();

        if code.is_empty() {
            return Err(GoogleError::Auth(
                "no authorization code entered".to_string(),
            ));
        }
        Ok(code)
    }
}

/// Receives the authorization code on a localhost HTTP callback.
#[derive(Debug)]
pub struct LoopbackListener {
    port_range: (u16, u16),
    bound: Mutex<Option<TcpListener>>,
}

impl LoopbackListener {
    /// Creates a listener that will bind a port in `port_range`.
    pub fn new(port_range: (u16, u16)) -> Self {
        Self {
            port_range,
            bound: Mutex::new(None),
        }
    }

    fn bind(&self) -> GoogleResult<u16> {
        for port in self.port_range.0..=self.port_range.1 {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                debug!("bound loopback listener on port {}", port);
                *self.bound.lock().unwrap() = Some(listener);
                return Ok(port);
            }
        }
        Err(GoogleError::Auth(format!(
            "no available port in range {}-{}",
            self.port_range.0, self.port_range.1
        )))
    }

    /// Waits for the redirect and extracts `(code, state)` from it.
    fn wait_for_callback(listener: TcpListener) -> GoogleResult<(String, String)> {
        let (tx, rx) = mpsc::channel();

        // Accept in a separate thread so the wait can time out.
        let _handle = thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        if let Some(result) = Self::handle_callback(stream) {
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
                Err(GoogleError::Auth("authorization callback timeout".to_string()))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(GoogleError::Auth("callback channel disconnected".to_string()))
            }
        }
    }

    fn handle_callback(mut stream: TcpStream) -> Option<GoogleResult<(String, String)>> {
        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).is_err() {
            return None;
        }

        // GET /callback?code=...&state=... HTTP/1.1
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 || parts[0] != "GET" {
            return None;
        }
        let path = parts[1];
        if !path.starts_with("/callback") {
            return None;
        }

        let query_start = path.find('?').map(|i| i + 1).unwrap_or(path.len());
        let mut code = None;
        let mut state = None;
        let mut denied = None;

        for param in path[query_start..].split('&') {
            let mut kv = param.splitn(2, '=');
            if let (Some(key), Some(value)) = (kv.next(), kv.next()) {
                let value = urlencoding::decode(value).unwrap_or_default().into_owned();
                match key {
                    "code" => code = Some(value),
                    "state" => state = Some(value),
                    "error" => denied = Some(value),
                    _ => {}
                }
            }
        }

        let response = if denied.is_some() || code.is_none() {
            "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
            <html><body><h1>Authorization Failed</h1>\
            <p>You can close this window.</p></body></html>"
        } else {
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
            <html><body><h1>Authorization Successful</h1>\
            <p>You can close this window and return to the terminal.</p></body></html>"
        };
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();

        if let Some(reason) = denied {
            return Some(Err(GoogleError::Auth(format!(
                "authorization denied: {}",
                reason
            ))));
        }
        match (code, state) {
            (Some(c), Some(s)) => Some(Ok((c, s))),
            (Some(c), None) => Some(Ok((c, String::new()))),
            _ => Some(Err(GoogleError::Auth(
                "missing authorization code in callback".to_string(),
            ))),
        }
    }
}

impl CodeAcquirer for LoopbackListener {
    fn redirect_uri(&self) -> GoogleResult<Option<String>> {
        let port = self.bind()?;
        Ok(Some(format!("http://127.0.0.1:{}/callback", port)))
    }

    fn acquire(&self, _auth_url: &str, expected_state: &str) -> GoogleResult<String> {
        let listener = self.bound.lock().unwrap().take().ok_or_else(|| {
            GoogleError::Auth("loopback listener was not bound".to_string())
        })?;

        let (code, state) = Self::wait_for_callback(listener)?;
        if state != expected_state {
            return Err(GoogleError::Auth(
                "authorization state mismatch".to_string(),
            ));
        }
        Ok(code)
    }
}

/// PKCE challenge material for one authorization attempt (RFC 7636).
#[derive(Debug)]
pub struct PkceChallenge {
    /// The code verifier (high-entropy random string).
    pub verifier: String,
    /// The S256 challenge derived from the verifier.
    pub challenge: String,
    /// Random state for CSRF protection.
    pub state: String,
}

impl PkceChallenge {
    /// Creates fresh random challenge material.
    pub fn new() -> Self {
        let verifier = Self::random_b64(CODE_VERIFIER_LENGTH);
        let challenge = Self::compute_challenge(&verifier);
        let state = Self::random_b64(16);
        Self {
            verifier,
            challenge,
            state,
        }
    }

    fn random_b64(len: usize) -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    fn compute_challenge(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }

    /// Builds the authorization URL for the given client and scopes.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        let scope = scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceChallenge {
    fn default() -> Self {
        Self::new()
    }
}

/// The OAuth flow: authorization, code exchange, and token refresh.
#[derive(Debug)]
pub struct OAuthFlow {
    credentials: GoogleCredentials,
    http_client: reqwest::Client,
}

impl OAuthFlow {
    /// Creates a flow for the given client credentials.
    pub fn new(credentials: GoogleCredentials, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");
        Self {
            credentials,
            http_client,
        }
    }

    /// Runs the interactive authorization flow and returns the token pair.
    ///
    /// Opens the browser to Google's consent page (printing the URL as a
    /// fallback), waits for the code via `acquirer`, then exchanges it.
    pub async fn authorize(
        &self,
        scopes: &[String],
        acquirer: &dyn CodeAcquirer,
    ) -> GoogleResult<TokenSet> {
        let pkce = PkceChallenge::new();
        let redirect_uri = acquirer
            .redirect_uri()?
            .unwrap_or_else(|| self.credentials.redirect_uri.clone());

        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, scopes);

        info!("starting authorization flow, opening browser");
        debug!("authorization URL: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nPlease open this URL in your browser:\n\n{}\n", auth_url);
        }

        let code = acquirer.acquire(&auth_url, &pkce.state)?;

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&code, &pkce.verifier, &redirect_uri).await
    }

    /// Exchanges an authorization code for a token pair.
    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> GoogleResult<TokenSet> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::Network(format!("token exchange request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GoogleError::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(GoogleError::Auth(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| GoogleError::InvalidResponse(format!("invalid token response: {}", e)))?;

        info!("obtained token pair");
        Ok(TokenSet::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
        ))
    }

    /// Refreshes an expired access token.
    ///
    /// Returns the new access token and its lifetime in seconds.
    pub async fn refresh_token(&self, refresh_token: &str) -> GoogleResult<(String, Option<i64>)> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::Network(format!("token refresh request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GoogleError::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(GoogleError::Auth(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| GoogleError::InvalidResponse(format!("invalid token response: {}", e)))?;

        info!("refreshed access token");
        Ok((token_response.access_token, token_response.expires_in))
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}
