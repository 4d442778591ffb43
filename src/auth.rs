//! OAuth access for the storage API.
//!
//! A token file is reused across runs. An expired token is refreshed when a
//! refresh token is available; otherwise the installed-app consent flow runs
//! against a loopback redirect and the new token is written back.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::ports::FileSystem;

/// Read-only Drive scope.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Consent endpoint assumed for token files written without one.
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Tokens expiring within this many seconds are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

const CONSENT_PAGE: &str =
    "<html><body>Authorization complete. You may close this window.</body></html>";

/// OAuth client registration, as downloaded from the cloud console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Consent endpoint.
    pub auth_uri: String,
    /// Token endpoint.
    pub token_uri: String,
}

/// Top-level shape of the credentials file (`installed` or `web` client).
#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parses a downloaded credentials file.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or has no client section.
    pub fn parse(json: &str) -> Result<Self, String> {
        let file: SecretsFile =
            serde_json::from_str(json).map_err(|e| format!("Invalid credentials file: {e}"))?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "Credentials file has no \"installed\" or \"web\" client".to_string())
    }

    /// Builds the OAuth client for this registration. Client credentials
    /// travel in the request body, as installed-app clients expect.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is not a valid URL.
    pub fn oauth_client(&self) -> Result<BasicClient, String> {
        let auth_url = AuthUrl::new(self.auth_uri.clone())
            .map_err(|e| format!("Invalid consent endpoint {}: {e}", self.auth_uri))?;
        let token_url = TokenUrl::new(self.token_uri.clone())
            .map_err(|e| format!("Invalid token endpoint {}: {e}", self.token_uri))?;
        Ok(BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody))
    }
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

/// Token persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Long-lived token used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When `access_token` stops being valid.
    pub expires_at: DateTime<Utc>,
    /// Consent endpoint of the issuing client.
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    /// Token endpoint used for refreshes.
    pub token_uri: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    /// Builds the token to persist from a token endpoint response, keeping
    /// `previous_refresh` when the endpoint did not issue a new refresh token.
    #[must_use]
    pub fn from_response(
        response: &BasicTokenResponse,
        secrets: &ClientSecrets,
        previous_refresh: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let lifetime = response
            .expires_in()
            .and_then(|d| i64::try_from(d.as_secs()).ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response
                .refresh_token()
                .map(|t| t.secret().clone())
                .or(previous_refresh),
            expires_at: now + Duration::seconds(lifetime),
            auth_uri: secrets.auth_uri.clone(),
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: response.scopes().map_or_else(
                || vec![DRIVE_READONLY_SCOPE.to_string()],
                |scopes| scopes.iter().map(|s| s.to_string()).collect(),
            ),
        }
    }

    /// Returns `true` if the access token is still usable at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }

    /// Returns `true` if the token can be refreshed without user interaction.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Client registration that issued this token.
    #[must_use]
    pub fn client_secrets(&self) -> ClientSecrets {
        ClientSecrets {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: self.auth_uri.clone(),
            token_uri: self.token_uri.clone(),
        }
    }
}

/// Builds the consent URL the user opens in a browser, with a fresh random
/// `state` that the redirect must echo back.
#[must_use]
pub fn consent_url(client: &BasicClient) -> (String, CsrfToken) {
    let (url, state) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(DRIVE_READONLY_SCOPE.to_string()))
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .url();
    (url.to_string(), state)
}

/// Extracts the authorization code from the redirect's HTTP request line.
///
/// # Errors
///
/// Returns an error if the request is malformed, carries an OAuth error,
/// the `state` does not match, or no code is present.
pub fn parse_redirect(
    request_line: &str,
    expected_state: &CsrfToken,
) -> Result<AuthorizationCode, String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| format!("Malformed redirect request: {request_line:?}"))?;
    let url = Url::parse("http://127.0.0.1")
        .and_then(|base| base.join(target))
        .map_err(|e| format!("Malformed redirect target {target:?}: {e}"))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => return Err(format!("Authorization was denied: {value}")),
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state.secret().as_str()) {
        return Err("Authorization redirect state mismatch".to_string());
    }
    code.map(AuthorizationCode::new)
        .ok_or_else(|| "Authorization redirect carried no code".to_string())
}

fn describe_token_error<RE>(e: &RequestTokenError<RE, BasicErrorResponse>) -> String
where
    RE: std::error::Error + 'static,
{
    match e {
        RequestTokenError::ServerResponse(response) => format!("endpoint rejected it: {response}"),
        RequestTokenError::Request(inner) => format!("request failed: {inner}"),
        other => other.to_string(),
    }
}

/// Obtains access tokens, persisting them through the `FileSystem` port.
pub struct Authenticator<'a> {
    fs: &'a dyn FileSystem,
    credentials_path: PathBuf,
    token_path: PathBuf,
}

impl<'a> Authenticator<'a> {
    /// Creates an authenticator for the given credentials and token files.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, credentials_path: &Path, token_path: &Path) -> Self {
        Self {
            fs,
            credentials_path: credentials_path.to_path_buf(),
            token_path: token_path.to_path_buf(),
        }
    }

    /// Returns a usable access token, refreshing or re-consenting as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the consent flow fails or the token file cannot
    /// be written.
    pub async fn access_token(&self) -> Result<String, String> {
        let now = Utc::now();
        let stored = self.load_token();

        if let Some(token) = &stored {
            if token.is_fresh(now) {
                debug!(path = %self.token_path.display(), "using stored token");
                return Ok(token.access_token.clone());
            }
        }

        let refreshed = match stored {
            Some(token) if token.can_refresh() => match self.refresh(&token).await {
                Ok(fresh) => Some(fresh),
                Err(e) => {
                    warn!(error = %e, "token refresh failed, falling back to consent");
                    None
                }
            },
            _ => None,
        };

        let token = match refreshed {
            Some(token) => token,
            None => self.consent().await?,
        };
        self.save_token(&token)?;
        Ok(token.access_token)
    }

    /// Reads the token file; an unreadable or corrupt file counts as absent.
    fn load_token(&self) -> Option<StoredToken> {
        if !self.fs.exists(&self.token_path) {
            return None;
        }
        let parsed: Result<StoredToken, String> = self
            .fs
            .read_to_string(&self.token_path)
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()));
        match parsed {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(
                    path = %self.token_path.display(),
                    error = %e,
                    "ignoring unreadable token file"
                );
                None
            }
        }
    }

    fn save_token(&self, token: &StoredToken) -> Result<(), String> {
        let json = serde_json::to_string_pretty(token)
            .map_err(|e| format!("Failed to serialize token: {e}"))?;
        self.fs
            .write(&self.token_path, &json)
            .map_err(|e| format!("Failed to write token file {}: {e}", self.token_path.display()))
    }

    fn load_secrets(&self) -> Result<ClientSecrets, String> {
        let json = self.fs.read_to_string(&self.credentials_path).map_err(|e| {
            format!("Failed to read credentials file {}: {e}", self.credentials_path.display())
        })?;
        ClientSecrets::parse(&json)
    }

    async fn refresh(&self, token: &StoredToken) -> Result<StoredToken, String> {
        info!("refreshing access token");
        let secrets = token.client_secrets();
        let client = secrets.oauth_client()?;
        let refresh_token = token.refresh_token.clone().unwrap_or_default();
        let response = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.clone()))
            .request_async(async_http_client)
            .await
            .map_err(|e| format!("Token refresh failed, {}", describe_token_error(&e)))?;
        Ok(StoredToken::from_response(&response, &secrets, Some(refresh_token), Utc::now()))
    }

    async fn consent(&self) -> Result<StoredToken, String> {
        let secrets = self.load_secrets()?;
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| format!("Failed to bind loopback listener: {e}"))?;
        let port = listener
            .local_addr()
            .map_err(|e| format!("Failed to read loopback address: {e}"))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{port}/");
        let client = secrets.oauth_client()?.set_redirect_uri(
            RedirectUrl::new(redirect_uri.clone())
                .map_err(|e| format!("Invalid redirect {redirect_uri}: {e}"))?,
        );

        let (url, state) = consent_url(&client);
        println!("Please visit this URL to authorize this application:");
        println!("{url}");

        let (mut stream, _) = listener
            .accept()
            .await
            .map_err(|e| format!("Failed to accept authorization redirect: {e}"))?;
        let mut request_line = String::new();
        BufReader::new(&mut stream)
            .read_line(&mut request_line)
            .await
            .map_err(|e| format!("Failed to read authorization redirect: {e}"))?;
        let reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{CONSENT_PAGE}",
            CONSENT_PAGE.len()
        );
        if let Err(e) = stream.write_all(reply.as_bytes()).await {
            debug!(error = %e, "failed to answer authorization redirect");
        }

        let code = parse_redirect(request_line.trim_end(), &state)?;
        let response = client
            .exchange_code(code)
            .request_async(async_http_client)
            .await
            .map_err(|e| format!("Token exchange failed, {}", describe_token_error(&e)))?;
        info!("authorization complete");
        Ok(StoredToken::from_response(&response, &secrets, None, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFs;
    use tokio::io::AsyncReadExt;
    use tokio::task::JoinHandle;

    const SECRETS: &str = r#"{
        "installed": {
            "client_id": "client-123.apps.googleusercontent.com",
            "project_id": "syllabi",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost"]
        }
    }"#;

    fn token(expires_at: DateTime<Utc>, refresh: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: "ya29.access".into(),
            refresh_token: refresh.map(String::from),
            expires_at,
            auth_uri: DEFAULT_AUTH_URI.into(),
            token_uri: "https://oauth2.googleapis.com/token".into(),
            client_id: "client".into(),
            client_secret: "secret".into(),
            scopes: vec![DRIVE_READONLY_SCOPE.into()],
        }
    }

    fn token_file(token: &StoredToken) -> MemFs {
        MemFs::new().with_file("token.json", &serde_json::to_string(token).unwrap())
    }

    fn saved_token(fs: &MemFs) -> StoredToken {
        serde_json::from_str(&fs.contents("token.json").unwrap()).unwrap()
    }

    /// Answers a single request on a loopback token endpoint and yields the
    /// form body it received.
    async fn token_endpoint(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/token", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(&mut stream);
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut form = vec![0; content_length];
            reader.read_exact(&mut form).await.unwrap();

            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8(form).unwrap()
        });
        (url, handle)
    }

    #[test]
    fn secrets_parse_installed_client() {
        let secrets = ClientSecrets::parse(SECRETS).unwrap();
        assert_eq!(secrets.client_id, "client-123.apps.googleusercontent.com");
        assert_eq!(secrets.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn secrets_without_client_section_are_rejected() {
        let err = ClientSecrets::parse(r#"{"other": {}}"#).unwrap_err();
        assert!(err.contains("no \"installed\" or \"web\" client"));
    }

    #[test]
    fn invalid_token_endpoint_is_rejected() {
        let mut secrets = ClientSecrets::parse(SECRETS).unwrap();
        secrets.token_uri = "not a url".into();
        let err = secrets.oauth_client().unwrap_err();
        assert!(err.contains("Invalid token endpoint not a url"));
    }

    #[test]
    fn freshness_honours_margin() {
        let now = Utc::now();
        assert!(token(now + Duration::minutes(10), None).is_fresh(now));
        assert!(!token(now + Duration::seconds(30), None).is_fresh(now));
        assert!(!token(now - Duration::minutes(1), None).is_fresh(now));
    }

    #[test]
    fn refresh_requires_non_empty_refresh_token() {
        let now = Utc::now();
        assert!(token(now, Some("1//refresh")).can_refresh());
        assert!(!token(now, Some("")).can_refresh());
        assert!(!token(now, None).can_refresh());
    }

    #[test]
    fn token_file_without_auth_uri_uses_default() {
        let json = r#"{
            "access_token": "a",
            "expires_at": "2026-03-01T10:00:00Z",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "c",
            "client_secret": "s"
        }"#;
        let stored: StoredToken = serde_json::from_str(json).unwrap();
        assert_eq!(stored.auth_uri, DEFAULT_AUTH_URI);
        assert!(stored.refresh_token.is_none());
    }

    #[test]
    fn consent_url_carries_client_scope_and_state() {
        let client = ClientSecrets::parse(SECRETS)
            .unwrap()
            .oauth_client()
            .unwrap()
            .set_redirect_uri(RedirectUrl::new("http://127.0.0.1:8765/".into()).unwrap());
        let (url, state) = consent_url(&client);
        let parsed = Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert_eq!(pairs["client_id"], "client-123.apps.googleusercontent.com");
        assert_eq!(pairs["scope"], DRIVE_READONLY_SCOPE);
        assert_eq!(pairs["redirect_uri"], "http://127.0.0.1:8765/");
        assert_eq!(&pairs["state"], state.secret());
        assert_eq!(pairs["access_type"], "offline");
    }

    #[test]
    fn consent_urls_use_distinct_states() {
        let client = ClientSecrets::parse(SECRETS).unwrap().oauth_client().unwrap();
        let (_, first) = consent_url(&client);
        let (_, second) = consent_url(&client);
        assert_ne!(first.secret(), second.secret());
    }

    #[test]
    fn redirect_yields_code_when_state_matches() {
        let state = CsrfToken::new("abc".into());
        let code =
            parse_redirect("GET /?state=abc&code=4%2F0Ab&scope=x HTTP/1.1", &state).unwrap();
        assert_eq!(code.secret(), "4/0Ab");
    }

    #[test]
    fn redirect_rejects_state_mismatch() {
        let state = CsrfToken::new("abc".into());
        let err = parse_redirect("GET /?state=evil&code=1 HTTP/1.1", &state).unwrap_err();
        assert!(err.contains("state mismatch"));
    }

    #[test]
    fn redirect_surfaces_denial() {
        let state = CsrfToken::new("abc".into());
        let err =
            parse_redirect("GET /?error=access_denied&state=abc HTTP/1.1", &state).unwrap_err();
        assert!(err.contains("access_denied"));
    }

    #[test]
    fn redirect_rejects_garbage() {
        assert!(parse_redirect("", &CsrfToken::new("abc".into())).is_err());
    }

    #[test]
    fn token_response_keeps_previous_refresh_token() {
        let secrets = ClientSecrets::parse(SECRETS).unwrap();
        let now = Utc::now();
        let response: BasicTokenResponse = serde_json::from_str(
            r#"{"access_token": "new", "expires_in": 3599, "token_type": "Bearer"}"#,
        )
        .unwrap();

        let stored = StoredToken::from_response(&response, &secrets, Some("1//old".into()), now);

        assert_eq!(stored.access_token, "new");
        assert_eq!(stored.refresh_token.as_deref(), Some("1//old"));
        assert_eq!(stored.expires_at, now + Duration::seconds(3599));
        assert_eq!(stored.scopes, vec![DRIVE_READONLY_SCOPE.to_string()]);
        assert_eq!(stored.client_id, secrets.client_id);
    }

    #[tokio::test]
    async fn fresh_stored_token_is_reused_without_network() {
        let fs = token_file(&token(Utc::now() + Duration::hours(1), Some("1//refresh")));
        let auth = Authenticator::new(&fs, Path::new("credentials.json"), Path::new("token.json"));

        assert_eq!(auth.access_token().await.unwrap(), "ya29.access");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_rewritten() {
        let (url, request) = token_endpoint(
            "200 OK",
            r#"{"access_token": "ya29.fresh", "token_type": "Bearer", "expires_in": 3599}"#,
        )
        .await;
        let mut expired = token(Utc::now() - Duration::minutes(5), Some("1//keep"));
        expired.token_uri = url.clone();
        let fs = token_file(&expired);
        let auth = Authenticator::new(&fs, Path::new("credentials.json"), Path::new("token.json"));

        let before = Utc::now();
        assert_eq!(auth.access_token().await.unwrap(), "ya29.fresh");

        let form = request.await.unwrap();
        assert!(form.contains("grant_type=refresh_token"), "form: {form}");
        assert!(form.contains("refresh_token=1%2F%2Fkeep"), "form: {form}");
        assert!(form.contains("client_id=client"), "form: {form}");

        let saved = saved_token(&fs);
        assert_eq!(saved.access_token, "ya29.fresh");
        assert_eq!(saved.refresh_token.as_deref(), Some("1//keep"));
        assert_eq!(saved.token_uri, url);
        assert!(saved.expires_at >= before + Duration::seconds(3599));
        assert!(saved.is_fresh(Utc::now()));
    }

    #[tokio::test]
    async fn rejected_refresh_falls_back_to_consent() {
        let (url, request) = token_endpoint(
            "400 Bad Request",
            r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#,
        )
        .await;
        let mut expired = token(Utc::now() - Duration::minutes(5), Some("1//revoked"));
        expired.token_uri = url;
        let fs = token_file(&expired);
        let auth = Authenticator::new(&fs, Path::new("credentials.json"), Path::new("token.json"));

        let err = auth.access_token().await.unwrap_err();

        assert!(request.await.unwrap().contains("refresh_token=1%2F%2Frevoked"));
        assert!(err.contains("Failed to read credentials file credentials.json"), "err: {err}");
        assert_eq!(saved_token(&fs), expired);
    }

    #[tokio::test]
    async fn expired_token_without_refresh_goes_to_consent() {
        let expired = token(Utc::now() - Duration::minutes(5), None);
        let fs = token_file(&expired);
        let auth = Authenticator::new(&fs, Path::new("credentials.json"), Path::new("token.json"));

        let err = auth.access_token().await.unwrap_err();

        assert!(err.contains("Failed to read credentials file credentials.json"), "err: {err}");
        assert_eq!(saved_token(&fs), expired);
    }

    #[tokio::test]
    async fn consent_without_credentials_file_fails() {
        let fs = MemFs::new();
        let auth = Authenticator::new(&fs, Path::new("credentials.json"), Path::new("token.json"));

        let err = auth.access_token().await.unwrap_err();
        assert!(err.contains("Failed to read credentials file credentials.json"));
        assert!(fs.contents("token.json").is_none());
    }
}
