//! OAuth implicit-grant login.
//!
//! The identity provider returns the token in the URL fragment, which a
//! browser never sends to a server. The loopback listener therefore answers
//! the first redirect with a tiny relay page that re-requests the same path
//! with the fragment moved into the query string, and reads the token from
//! that second request.

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use crate::config::{self, AppConfig};
use crate::error::{AssistError, AssistResult};
use crate::launch::LaunchParams;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

const MAX_REQUEST_LINE: usize = 16 * 1024;

/// Tokens this close to expiry are not reused.
const EXPIRY_MARGIN_SECS: i64 = 60;

const RELAY_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Signing in...</title></head>
<body>
<p id="msg">Completing sign-in...</p>
<script>
  var fragment = window.location.hash.substring(1);
  if (fragment) {
    window.location.replace(window.location.pathname + '?' + fragment);
  } else {
    document.getElementById('msg').textContent =
      'No access token was returned. Close this tab and retry from the agent assist panel.';
  }
</script>
</body></html>"#;

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Signed in</title></head>
<body><h2>Signed in</h2><p>You can close this tab and return to the agent assist panel.</p></body>
</html>"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Sign-in failed</title></head>
<body><h2>Sign-in failed</h2><p>ERROR_DETAILS</p></body>
</html>"#;

// ─── Grant ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitGrant {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub state: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Grant(ImplicitGrant),
    Denied(String),
    /// Redirect landed without a query: the token is still in the fragment.
    NeedsRelay,
    NotFound,
}

/// Build the provider's authorize URL carrying `params` as opaque state.
pub fn authorize_url(config: &AppConfig, params: &LaunchParams) -> AssistResult<String> {
    if config.client_id.trim().is_empty() {
        return Err(AssistError::Auth(
            "no OAuth client id configured (set client_id in config.toml)".into(),
        ));
    }
    let base = format!("{}/oauth/authorize", config.login_base_url());
    let url = Url::parse_with_params(
        &base,
        &[
            ("response_type", "token"),
            ("client_id", config.client_id.trim()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", params.encode_state().as_str()),
        ],
    )
    .map_err(|e| AssistError::Auth(format!("invalid login URL {}: {}", base, e)))?;
    Ok(url.into())
}

/// The redirect URI must be plain http on a loopback host so the panel can
/// listen on it. Returns the bind address and the expected request path.
fn loopback_target(redirect_uri: &str) -> AssistResult<(String, String)> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| AssistError::Auth(format!("invalid redirect URI '{}': {}", redirect_uri, e)))?;
    let host = url.host_str().unwrap_or_default();
    let is_loopback = matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1");
    if url.scheme() != "http" || !is_loopback {
        return Err(AssistError::Auth(format!(
            "redirect URI '{}' must be an http://localhost address",
            redirect_uri
        )));
    }
    let port = url.port_or_known_default().unwrap_or(80);
    let bind_host = if host == "localhost" { "127.0.0.1" } else { host };
    Ok((format!("{}:{}", bind_host, port), url.path().to_string()))
}

fn parse_callback(target: &str, expected_path: &str) -> Callback {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };
    if path != expected_path {
        return Callback::NotFound;
    }
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Callback::NeedsRelay;
    };

    let mut access_token = None;
    let mut expires_in = None;
    let mut state = String::new();
    let mut error = None;
    let mut error_description = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "access_token" => access_token = Some(value.into_owned()),
            "expires_in" => expires_in = value.parse::<i64>().ok(),
            "state" => state = value.into_owned(),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Callback::Denied(match error_description {
            Some(desc) => format!("{}: {}", error, desc),
            None => error,
        });
    }
    match access_token {
        Some(access_token) if !access_token.is_empty() => Callback::Grant(ImplicitGrant {
            access_token,
            expires_in,
            state,
        }),
        _ => Callback::Denied("redirect did not include an access token".into()),
    }
}

// ─── Login flow ──────────────────────────────────────────────────────

/// Open the browser on the authorize URL and wait for the redirect.
pub async fn run_implicit_grant(
    config: &AppConfig,
    params: &LaunchParams,
) -> AssistResult<ImplicitGrant> {
    let auth_url = authorize_url(config, params)?;
    let (bind_addr, path) = loopback_target(&config.redirect_uri)?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AssistError::Auth(format!("cannot listen on {}: {}", bind_addr, e)))?;
    info!("Waiting for login redirect on {}{}", bind_addr, path);

    open_browser(&auth_url);
    wait_for_grant(listener, &path).await
}

async fn wait_for_grant(listener: TcpListener, expected_path: &str) -> AssistResult<ImplicitGrant> {
    let accept_loop = async {
        loop {
            let (mut stream, _addr) = listener
                .accept()
                .await
                .map_err(|e| AssistError::Auth(format!("accept failed: {}", e)))?;

            let target = match read_request_target(&mut stream).await {
                Ok(target) => target,
                Err(e) => {
                    warn!("Ignoring unreadable login request: {}", e);
                    continue;
                }
            };

            match parse_callback(&target, expected_path) {
                Callback::Grant(grant) => {
                    respond(&mut stream, "200 OK", SUCCESS_HTML).await;
                    return Ok(grant);
                }
                Callback::Denied(reason) => {
                    let page = ERROR_HTML.replace("ERROR_DETAILS", &escape_html(&reason));
                    respond(&mut stream, "200 OK", &page).await;
                    return Err(AssistError::Auth(reason));
                }
                Callback::NeedsRelay => respond(&mut stream, "200 OK", RELAY_HTML).await,
                Callback::NotFound => respond(&mut stream, "404 Not Found", "").await,
            }
        }
    };

    tokio::time::timeout(LOGIN_TIMEOUT, accept_loop)
        .await
        .map_err(|_| AssistError::Auth("timed out waiting for the login redirect".into()))?
}

/// Reads until the request line is complete; the token can push it past a
/// single segment.
async fn read_request_target(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    let line_end = loop {
        if let Some(pos) = buf.windows(2).position(|w| w == b"\r\n") {
            break pos;
        }
        if buf.len() >= MAX_REQUEST_LINE {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "request line too long",
            ));
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    // "GET /email?access_token=... HTTP/1.1"
    let line = String::from_utf8_lossy(&buf[..line_end]);
    Ok(line.split_whitespace().nth(1).unwrap_or("").to_string())
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn open_browser(url: &str) {
    #[cfg(windows)]
    {
        let _ = std::process::Command::new("cmd")
            .args(["/c", "start", "", url])
            .spawn();
    }
    #[cfg(target_os = "macos")]
    {
        let _ = std::process::Command::new("open").arg(url).spawn();
    }
    #[cfg(all(not(windows), not(target_os = "macos")))]
    {
        let _ = std::process::Command::new("xdg-open").arg(url).spawn();
    }
}

// ─── Token cache ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCache {
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

pub fn token_path() -> PathBuf {
    config::config_dir().join("token.toml")
}

impl TokenCache {
    pub fn from_grant(grant: &ImplicitGrant) -> Option<Self> {
        grant.expires_in.map(|secs| Self {
            access_token: grant.access_token.clone(),
            expires_at: Utc::now().timestamp() + secs,
        })
    }

    pub fn is_fresh(&self, now: i64) -> bool {
        !self.access_token.is_empty() && self.expires_at - EXPIRY_MARGIN_SECS > now
    }

    /// A cached token that is still usable, if any.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let cache: Self = toml::from_str(&content).ok()?;
        cache.is_fresh(Utc::now().timestamp()).then_some(cache)
    }

    pub fn save_to(&self, path: &Path) {
        match toml::to_string(self) {
            Ok(content) => {
                if let Err(e) = std::fs::write(path, content) {
                    warn!("Failed to persist token: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize token: {}", e),
        }
    }

    pub fn clear_at(path: &Path) {
        if std::fs::remove_file(path).is_ok() {
            info!("Cleared persisted access token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LaunchParams {
        LaunchParams {
            conversation_id: "conv-1".into(),
            language: "es".into(),
        }
    }

    #[test]
    fn authorize_url_carries_state() {
        let mut cfg = AppConfig::default();
        cfg.client_id = "client-42".into();
        cfg.region = "usw2.pure.cloud".into();
        let url = Url::parse(&authorize_url(&cfg, &params()).unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("login.usw2.pure.cloud"));
        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".into(), "token".into())));
        assert!(pairs.contains(&("client_id".into(), "client-42".into())));
        let state = pairs.iter().find(|(k, _)| k == "state").unwrap();
        assert_eq!(LaunchParams::decode_state(&state.1).unwrap(), params());
    }

    #[test]
    fn authorize_url_requires_client_id() {
        let err = authorize_url(&AppConfig::default(), &params()).unwrap_err();
        assert!(err.is_blocking());
    }

    #[test]
    fn redirect_must_be_loopback_http() {
        assert_eq!(
            loopback_target("http://localhost:8085/email").unwrap(),
            ("127.0.0.1:8085".to_string(), "/email".to_string())
        );
        assert!(loopback_target("https://assist.example.com/email").is_err());
        assert!(loopback_target("http://assist.example.com/email").is_err());
    }

    #[test]
    fn callback_variants() {
        assert_eq!(parse_callback("/email", "/email"), Callback::NeedsRelay);
        assert_eq!(parse_callback("/favicon.ico", "/email"), Callback::NotFound);
        assert_eq!(
            parse_callback("/email?error=access_denied&error_description=nope", "/email"),
            Callback::Denied("access_denied: nope".into())
        );
        assert!(matches!(
            parse_callback("/email?state=x", "/email"),
            Callback::Denied(_)
        ));
        assert_eq!(
            parse_callback(
                "/email?access_token=tok&expires_in=86399&token_type=bearer&state=%7B%7D",
                "/email"
            ),
            Callback::Grant(ImplicitGrant {
                access_token: "tok".into(),
                expires_in: Some(86399),
                state: "{}".into(),
            })
        );
    }

    #[test]
    fn token_freshness_respects_margin() {
        let cache = TokenCache {
            access_token: "t".into(),
            expires_at: 1_000,
        };
        assert!(cache.is_fresh(900));
        assert!(!cache.is_fresh(950));
        assert!(!TokenCache {
            access_token: String::new(),
            expires_at: i64::MAX
        }
        .is_fresh(0));
    }

    async fn get(addr: std::net::SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target).as_bytes())
            .await
            .unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn request_line_split_across_segments_is_read_whole() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let token = "t".repeat(3000);
        let expected = format!("/email?access_token={}&state=s", token);

        let target = expected.clone();
        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target);
            let (head, tail) = request.as_bytes().split_at(40);
            stream.write_all(head).await.unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            stream.write_all(tail).await.unwrap();
        });

        let (mut stream, _) = listener.accept().await.unwrap();
        assert_eq!(read_request_target(&mut stream).await.unwrap(), expected);
        client.await.unwrap();
    }

    #[tokio::test]
    async fn listener_relays_fragment_then_accepts_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = params().encode_state();
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("access_token", "abc")
            .append_pair("expires_in", "60")
            .append_pair("state", &state)
            .finish();

        let client = tokio::spawn(async move {
            let relay = get(addr, "/email").await;
            assert!(relay.contains("location.hash"));
            let missing = get(addr, "/favicon.ico").await;
            assert!(missing.starts_with("HTTP/1.1 404"));
            get(addr, &format!("/email?{}", query)).await
        });

        let grant = wait_for_grant(listener, "/email").await.unwrap();
        assert_eq!(grant.access_token, "abc");
        assert_eq!(LaunchParams::decode_state(&grant.state).unwrap(), params());
        assert!(client.await.unwrap().contains("Signed in"));
    }
}
