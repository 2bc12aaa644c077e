//! Authenticated principals and the bearer-token authority that vouches for them.
//!
//! Tokens are `base64(payload).base64(hmac_sha256(payload))` where the payload is
//! `role|id|exp|username`. Callers never see ambient "current user" state: every core
//! operation receives the [`Principal`] explicitly.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::AuthConfig;
use crate::evaluation::domain::{CompanyId, EmployeeId};

type HmacSha256 = Hmac<Sha256>;

/// Role carried by a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Company,
    Employee,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Company => "company",
            Role::Employee => "employee",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "company" => Some(Role::Company),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }
}

/// The authenticated caller of a core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    Company {
        company_id: CompanyId,
        username: String,
    },
    Employee {
        employee_id: EmployeeId,
        username: String,
    },
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Company { .. } => Role::Company,
            Principal::Employee { .. } => Role::Employee,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Principal::Company { username, .. } | Principal::Employee { username, .. } => {
                username
            }
        }
    }

    fn raw_id(&self) -> i64 {
        match self {
            Principal::Company { company_id, .. } => company_id.0,
            Principal::Employee { employee_id, .. } => employee_id.0,
        }
    }
}

/// Rejections raised while resolving a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid credential")]
    InvalidCredential,
    #[error("credential expired")]
    Expired,
    #[error("credential refers to an unknown {0}")]
    UnknownPrincipal(&'static str),
    #[error("token lifetime overflows the expiry timestamp")]
    LifetimeOverflow,
}

/// Resolves a bearer credential into a principal.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, bearer: &str) -> Result<Principal, IdentityError>;
}

/// HMAC-SHA256 token issuer/verifier.
#[derive(Clone)]
pub struct TokenAuthority {
    key: Vec<u8>,
    ttl: Duration,
}

impl TokenAuthority {
    pub fn new(key: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token_secret.as_bytes().to_vec(), config.token_ttl())
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, IdentityError> {
        self.issue_at(principal, Utc::now())
    }

    pub fn issue_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<String, IdentityError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or(IdentityError::LifetimeOverflow)?
            .timestamp();
        let payload = format!(
            "{}|{}|{}|{}",
            principal.role().label(),
            principal.raw_id(),
            exp,
            principal.username()
        );
        let signature = self.sign(payload.as_bytes())?;
        Ok(format!(
            "{}.{}",
            general_purpose::STANDARD.encode(payload.as_bytes()),
            general_purpose::STANDARD.encode(signature)
        ))
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, IdentityError> {
        let (encoded_payload, encoded_signature) = token
            .trim()
            .split_once('.')
            .ok_or(IdentityError::InvalidCredential)?;
        let payload = general_purpose::STANDARD
            .decode(encoded_payload)
            .map_err(|_| IdentityError::InvalidCredential)?;
        let signature = general_purpose::STANDARD
            .decode(encoded_signature)
            .map_err(|_| IdentityError::InvalidCredential)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| IdentityError::InvalidCredential)?;

        let payload = String::from_utf8(payload).map_err(|_| IdentityError::InvalidCredential)?;
        let mut pieces = payload.splitn(4, '|');
        let role = pieces
            .next()
            .and_then(Role::parse)
            .ok_or(IdentityError::InvalidCredential)?;
        let id = pieces
            .next()
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or(IdentityError::InvalidCredential)?;
        let exp = pieces
            .next()
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or(IdentityError::InvalidCredential)?;
        let username = pieces
            .next()
            .filter(|name| !name.is_empty())
            .ok_or(IdentityError::InvalidCredential)?
            .to_string();

        if now.timestamp() > exp {
            return Err(IdentityError::Expired);
        }

        Ok(match role {
            Role::Company => Principal::Company {
                company_id: CompanyId(id),
                username,
            },
            Role::Employee => Principal::Employee {
                employee_id: EmployeeId(id),
                username,
            },
        })
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn mac(&self) -> Result<HmacSha256, IdentityError> {
        HmacSha256::new_from_slice(&self.key).map_err(|_| IdentityError::InvalidCredential)
    }
}

impl IdentityProvider for TokenAuthority {
    fn authenticate(&self, bearer: &str) -> Result<Principal, IdentityError> {
        self.verify_at(bearer, Utc::now())
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn authority() -> TokenAuthority {
        TokenAuthority::new(b"test-secret".to_vec(), Duration::minutes(30))
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 24, 15, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn company() -> Principal {
        Principal::Company {
            company_id: CompanyId(7),
            username: "tech_corp".to_string(),
        }
    }

    #[test]
    fn issued_tokens_verify_within_ttl() {
        let authority = authority();
        let token = authority.issue_at(&company(), issued_at()).expect("token");

        let principal = authority
            .verify_at(&token, issued_at() + Duration::minutes(29))
            .expect("token still valid");
        assert_eq!(principal, company());
        assert_eq!(principal.role(), Role::Company);
    }

    #[test]
    fn usernames_may_contain_separators() {
        let authority = authority();
        let employee = Principal::Employee {
            employee_id: EmployeeId(3),
            username: "john|doe".to_string(),
        };
        let token = authority.issue_at(&employee, issued_at()).expect("token");
        let principal = authority.verify_at(&token, issued_at()).expect("valid");
        assert_eq!(principal.username(), "john|doe");
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let authority = authority();
        let token = authority.issue_at(&company(), issued_at()).expect("token");

        assert_eq!(
            authority.verify_at(&token, issued_at() + Duration::minutes(31)),
            Err(IdentityError::Expired)
        );
    }

    #[test]
    fn tampered_payload_fails_signature_check() {
        let authority = authority();
        let token = authority.issue_at(&company(), issued_at()).expect("token");
        let (_, signature) = token.split_once('.').expect("two segments");
        let forged_payload = general_purpose::STANDARD.encode("company|8|9999999999|tech_corp");
        let forged = format!("{forged_payload}.{signature}");

        assert_eq!(
            authority.verify_at(&forged, issued_at()),
            Err(IdentityError::InvalidCredential)
        );
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let other = TokenAuthority::new(b"other-secret".to_vec(), Duration::minutes(30));
        let token = other.issue_at(&company(), issued_at()).expect("token");

        assert_eq!(
            authority().verify_at(&token, issued_at()),
            Err(IdentityError::InvalidCredential)
        );
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let authority = authority();
        for token in ["", "no-dot", "!!!.???", "YWJj.YWJj"] {
            assert_eq!(
                authority.verify_at(token, issued_at()),
                Err(IdentityError::InvalidCredential),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn lifetimes_past_the_calendar_are_refused() {
        let authority = TokenAuthority::new(b"test-secret".to_vec(), Duration::weeks(52));
        assert_eq!(
            authority.issue_at(&company(), DateTime::<Utc>::MAX_UTC),
            Err(IdentityError::LifetimeOverflow)
        );
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
