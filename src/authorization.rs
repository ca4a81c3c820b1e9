// the engine runs once per viewer request, before any cache/origin work, so
// it must stay pure: no I/O, no locks, no mutable state beyond the read-only
// `ProtectionConfig` snapshot loaded at startup. everything here is a plain
// function over its arguments, which also makes it trivially parallel (one
// invocation per in-flight request, nothing shared but an immutable map).

use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;

use base64::Engine;
use secrecy::ExposeSecret;
use secrecy::Secret;

use crate::domain::ProtectionConfig;

pub mod middleware;

/// Username/password pair carried by a `Basic` Authorization header.
///
/// The username is parsed (it sits before the first `:`) but never takes part
/// in any decision; only the password is compared.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

/// Everything that can go wrong while reading a `Basic` Authorization header.
///
/// None of these are faults: a header that fails to parse is an expected user
/// error and simply counts as "no valid credentials" (-> challenge).
#[derive(thiserror::Error, Debug)]
pub enum BasicAuthError {
    #[error("the authorization scheme was not 'Basic'")]
    UnsupportedScheme,
    #[error("the credential payload was not valid base64")]
    InvalidBase64(#[source] base64::DecodeError),
    #[error("the decoded credentials were not valid UTF-8")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),
    #[error("the decoded credentials were missing the ':' delimiter")]
    MissingDelimiter,
}

/// Parse a raw `Authorization` header value as `Basic <base64(user:pass)>`.
///
/// Kept separate from the matching/decision logic because this is the most
/// failure-prone piece; it is a pure function and is tested on its own.
///
/// The split is on the -first- `:`, so passwords may themselves contain
/// colons; usernames may not (RFC 7617 makes the same call).
pub fn basic_credentials(header_value: &str) -> Result<Credentials, BasicAuthError> {
    let encoded = header_value
        .strip_prefix("Basic ")
        .ok_or(BasicAuthError::UnsupportedScheme)?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(BasicAuthError::InvalidBase64)?;
    let decoded = String::from_utf8(decoded).map_err(BasicAuthError::InvalidUtf8)?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or(BasicAuthError::MissingDelimiter)?;

    Ok(Credentials {
        username: username.to_string(),
        password: Secret::new(password.to_string()),
    })
}

/// Map a request path to the top-level folder it lives under, if any.
///
/// The candidate is the first non-empty `/`-separated segment, so `/docs`,
/// `/docs/a/b.pdf` and (by explicit choice) `//docs/x` all classify to `docs`.
/// The root `/` and bare top-level files (`/index.html`) have no candidate and
/// are never protected. Matching elsewhere is exact and case-sensitive; no
/// normalisation happens here.
pub fn protected_folder(path: &str) -> Option<&str> {
    path.split('/').find(|segment| !segment.is_empty())
}

/// The challenge data needed to produce a 401. Only the realm varies.
#[derive(Debug, PartialEq)]
pub struct Challenge {
    realm: String,
}

impl Challenge {
    pub fn new(realm: &str) -> Self {
        Self {
            realm: realm.to_string(),
        }
    }

    /// Value for the `WWW-Authenticate` header. The realm was validated at
    /// config load (printable ASCII, no quotes), so no escaping is needed.
    pub fn www_authenticate(&self) -> String {
        format!(r#"Basic realm="{}""#, self.realm)
    }
}

/// Outcome of the authorization pipeline: either the request continues
/// unmodified, or it is short-circuited with a credential challenge. There is
/// deliberately no third "error" variant -- faults are absorbed by `guard`.
#[derive(Debug, PartialEq)]
pub enum Decision {
    Allow,
    Deny(Challenge),
}

/// The decision pipeline: classify the path, look up the folder, check the
/// supplied credentials.
///
/// The contract, in order:
/// 1. no candidate folder, or candidate not configured -> `Allow`,
///    unconditionally (header content is irrelevant)
/// 2. protected folder, missing or unparseable header -> `Deny`
/// 3. protected folder, parsed credentials -> compare the password verbatim
///    against the configured one; the username is never inspected
#[tracing::instrument(name = "Authorizing request", skip(authorization, protection))]
fn decide(
    path: &str,
    authorization: Option<&str>,
    protection: &ProtectionConfig,
) -> Decision {
    let Some(folder) = protected_folder(path) else {
        return Decision::Allow;
    };
    let Some(expected) = protection.password_for(folder) else {
        return Decision::Allow;
    };

    let challenge = Challenge::new(protection.realm());
    let Some(header_value) = authorization else {
        tracing::debug!(folder, "missing credentials for protected folder");
        return Decision::Deny(challenge);
    };

    match basic_credentials(header_value) {
        // note: plain (non-constant-time) comparison; the contract is exact
        // byte equality, and the passwords are static deploy-time values
        Ok(creds) if creds.password.expose_secret() == expected.expose_secret() => {
            tracing::debug!(folder, username = %creds.username, "credentials accepted");
            Decision::Allow
        }
        Ok(_) => {
            tracing::debug!(folder, "wrong password for protected folder");
            Decision::Deny(challenge)
        }
        Err(e) => {
            tracing::debug!(folder, error = %e, "unparseable authorization header");
            Decision::Deny(challenge)
        }
    }
}

/// Fail-open boundary around the decision pipeline.
///
/// Availability of unprotected content must never regress because of a bug in
/// the protection logic, so any panic escaping the pipeline is converted to
/// `Allow` -- protection degrades to "off", not to an outage. The asymmetry is
/// deliberate: a fault here can only widen public exposure, never produce a
/// spurious `Deny`.
fn guard(pipeline: impl FnOnce() -> Decision) -> Decision {
    match catch_unwind(AssertUnwindSafe(pipeline)) {
        Ok(decision) => decision,
        Err(_) => {
            tracing::error!("authorization pipeline panicked; failing open");
            Decision::Allow
        }
    }
}

/// The engine's single entry point: `(path, Authorization header, config) ->
/// Decision`, with the fail-open boundary already applied.
///
/// Deterministic for fixed inputs and side-effect-free; repeated invocations
/// always yield the identical decision.
pub fn authorize(
    path: &str,
    authorization: Option<&str>,
    protection: &ProtectionConfig,
) -> Decision {
    guard(|| decide(path, authorization, protection))
}
