//! Credential-flow helpers
//!
//! Each helper decorates an [`EffectiveRequest`] from a positional
//! parameter list. They are invoked by adapters, never by the traversal
//! engine directly; flows that need their own network round trip (session
//! token, OAuth2, JWT, OneLogin) perform it here and leave a bearer header
//! or client on the request.

use crate::error::{Error, Result};
use crate::request::EffectiveRequest;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Header / Querystring Schemes
// ============================================================================

/// Basic username/password auth.
///
/// Params: `[0]` username, `[1]` password.
pub fn basic_auth(mut request: EffectiveRequest, params: &[String]) -> Result<EffectiveRequest> {
    if params.len() < 2 {
        return Err(Error::auth("Basic auth requires a username and password"));
    }
    let token = BASE64.encode(format!("{}:{}", params[0], params[1]));
    let value = HeaderValue::from_str(&format!("Basic {token}"))
        .map_err(|e| Error::auth(format!("Invalid basic credentials: {e}")))?;
    request.headers.insert(reqwest::header::AUTHORIZATION, value);
    Ok(request)
}

/// Custom header auth from an alternating key/value list.
///
/// Params: `[x]` header key, `[x+1]` header value, repeated. Identical
/// key/value pairs already present are not duplicated.
pub fn custom_header_auth(
    mut request: EffectiveRequest,
    params: &[String],
) -> Result<EffectiveRequest> {
    if params.len() % 2 != 0 {
        return Err(Error::auth(
            "Invalid header params - must have a value for every key",
        ));
    }
    for pair in params.chunks(2) {
        let name = HeaderName::from_bytes(pair[0].as_bytes())
            .map_err(|e| Error::auth(format!("Invalid header name '{}': {e}", pair[0])))?;
        let value = HeaderValue::from_str(&pair[1])
            .map_err(|e| Error::auth(format!("Invalid header value for '{}': {e}", pair[0])))?;
        let duplicate = request.headers.get_all(&name).iter().any(|v| *v == value);
        if !duplicate {
            request.headers.append(name, value);
        }
    }
    Ok(request)
}

/// Custom querystring auth from an alternating key/value list.
///
/// Params: `[x]` parameter key, `[x+1]` parameter value, repeated.
/// Identical key/value pairs already on the URL are not duplicated.
pub fn custom_querystring_auth(
    mut request: EffectiveRequest,
    params: &[String],
) -> Result<EffectiveRequest> {
    if params.len() % 2 != 0 {
        return Err(Error::auth(
            "Invalid querystring params - must have a value for every key",
        ));
    }
    for pair in params.chunks(2) {
        let duplicate = request
            .url
            .query_pairs()
            .any(|(k, v)| k == pair[0].as_str() && v == pair[1].as_str());
        if !duplicate {
            request.url.query_pairs_mut().append_pair(&pair[0], &pair[1]);
        }
    }
    Ok(request)
}

/// Custom headers on top of Basic auth.
///
/// Params: `[0]` username, `[1]` password, then alternating header
/// key/value pairs.
pub fn custom_header_and_basic_auth(
    request: EffectiveRequest,
    params: &[String],
) -> Result<EffectiveRequest> {
    if params.len() < 2 {
        return Err(Error::auth("Basic auth requires a username and password"));
    }
    let request = basic_auth(request, &params[..2])?;
    custom_header_auth(request, &params[2..])
}

// ============================================================================
// Session Token
// ============================================================================

/// Session token auth: POST a login body, extract the token by dotted
/// path, and install it as a header.
///
/// Params: `[0]` dotted path to the token in the login response,
/// `[1]` header key, `[2]` header value prefix (e.g. `"token "`),
/// `[3]` session token URL, then alternating login body key/value pairs.
pub async fn session_token_auth(
    request: EffectiveRequest,
    params: &[String],
) -> Result<EffectiveRequest> {
    if params.len() < 4 {
        return Err(Error::auth(
            "Session auth requires token path, header key, prefix, and URL",
        ));
    }
    if params[4..].len() % 2 != 0 {
        return Err(Error::auth(
            "Invalid session params - must have a value for every key",
        ));
    }

    let mut body: HashMap<&str, &str> = HashMap::new();
    for pair in params[4..].chunks(2) {
        body.insert(&pair[0], &pair[1]);
    }

    let client = reqwest::Client::new();
    let response = client.post(&params[3]).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::auth(format!(
            "Expected session response status 2xx, got {}",
            status.as_u16()
        )));
    }

    let payload: Value = response.json().await?;
    let token = extract_token(&payload, &params[0]).ok_or_else(|| {
        Error::auth(format!("No session token found at path '{}'", params[0]))
    })?;

    let header_params = vec![params[1].clone(), format!("{}{token}", params[2])];
    custom_header_auth(request, &header_params)
}

/// Walk a dotted path through a JSON value and return the first string
/// encountered along it.
fn extract_token(payload: &Value, path: &str) -> Option<String> {
    let mut current = payload;
    for segment in path.split('.') {
        match current.get(segment)? {
            Value::String(s) => return Some(s.clone()),
            other => current = other,
        }
    }
    None
}

// ============================================================================
// OAuth2 Client Credentials
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Two-legged OAuth2 client-credentials auth.
///
/// Params: `[0]` client id, `[1]` client secret, `[2]` scopes (csv),
/// `[3]` token URL, `[4]` extra token endpoint params
/// (`key:value` entries separated by commas).
pub async fn oauth2_client_credentials_auth(
    mut request: EffectiveRequest,
    params: &[String],
) -> Result<EffectiveRequest> {
    if params.len() < 5 {
        return Err(Error::auth("OAuth2 auth requires five parameters"));
    }

    let mut form: Vec<(String, String)> = vec![
        ("grant_type".to_string(), "client_credentials".to_string()),
        ("client_id".to_string(), params[0].clone()),
        ("client_secret".to_string(), params[1].clone()),
    ];
    if !params[2].is_empty() {
        form.push(("scope".to_string(), params[2].replace(',', " ")));
    }
    for entry in params[4].split(',').filter(|e| !e.is_empty()) {
        let Some(split) = entry.find(':') else {
            return Err(Error::auth("Invalid OAuth2 endpoint params"));
        };
        form.push((entry[..split].to_string(), entry[split + 1..].to_string()));
    }

    let client = reqwest::Client::new();
    let response = client.post(&params[3]).form(&form).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::auth(format!(
            "OAuth2 token request failed with status {}",
            status.as_u16()
        )));
    }
    let token: TokenResponse = response.json().await?;

    let header_params = vec![
        "Authorization".to_string(),
        format!("Bearer {}", token.access_token),
    ];
    request.client = Some(client);
    custom_header_auth(request, &header_params)
}

// ============================================================================
// JWT Bearer
// ============================================================================

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Service-account style JWT bearer auth.
///
/// Signs an RS256 assertion and exchanges it at the token URL for a
/// bearer token.
///
/// Params: `[0]` issuer email, `[1]` private key (PEM), `[2]` private key
/// id, `[3]` scopes (csv), `[4]` token URL.
pub async fn jwt_auth(
    mut request: EffectiveRequest,
    params: &[String],
) -> Result<EffectiveRequest> {
    if params.len() < 5 {
        return Err(Error::auth("JWT auth requires five parameters"));
    }

    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        iss: &params[0],
        scope: params[3].replace(',', " "),
        aud: &params[4],
        iat: now,
        exp: now + 3600,
    };
    let mut header = Header::new(Algorithm::RS256);
    if !params[2].is_empty() {
        header.kid = Some(params[2].clone());
    }
    let key = EncodingKey::from_rsa_pem(params[1].as_bytes())
        .map_err(|e| Error::auth(format!("Invalid JWT private key: {e}")))?;
    let assertion =
        encode(&header, &claims, &key).map_err(|e| Error::auth(format!("JWT signing failed: {e}")))?;

    let form = [
        ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
        ("assertion", assertion.as_str()),
    ];
    let client = reqwest::Client::new();
    let response = client.post(&params[4]).form(&form).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::auth(format!(
            "JWT token request failed with status {}",
            status.as_u16()
        )));
    }
    let token: TokenResponse = response.json().await?;

    let header_params = vec![
        "Authorization".to_string(),
        format!("Bearer {}", token.access_token),
    ];
    request.client = Some(client);
    custom_header_auth(request, &header_params)
}

// ============================================================================
// OneLogin
// ============================================================================

#[derive(Debug, Serialize)]
struct OneloginRequest<'a> {
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct OneloginData {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OneloginTokens {
    data: Vec<OneloginData>,
}

/// OneLogin client-credentials grant.
///
/// Params: `[0]` client id, `[1]` client secret, `[2]` token URL.
pub async fn onelogin_auth(
    request: EffectiveRequest,
    params: &[String],
) -> Result<EffectiveRequest> {
    if params.len() < 3 {
        return Err(Error::auth("OneLogin auth requires three parameters"));
    }

    let client = reqwest::Client::new();
    let response = client
        .post(&params[2])
        .header("Content-Type", "application/json")
        .header("Accept", "application/json")
        .header(
            "Authorization",
            format!("client_id:{}, client_secret:{}", params[0], params[1]),
        )
        .json(&OneloginRequest {
            grant_type: "client_credentials",
        })
        .send()
        .await?;
    let status = response.status();
    if status.as_u16() != 200 {
        return Err(Error::auth(format!(
            "Expected 200 from OneLogin, got {}",
            status.as_u16()
        )));
    }

    let tokens: OneloginTokens = response.json().await?;
    let token = tokens
        .data
        .first()
        .ok_or_else(|| Error::auth("OneLogin token response carried no data"))?;

    let header_params = vec![
        "Authorization".to_string(),
        format!("bearer {}", token.access_token),
    ];
    custom_header_auth(request, &header_params)
}
