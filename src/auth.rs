//! Identity gating.
//!
//! Sign-in happens at the gateway in front of this service. The gateway
//! forwards the user's claims as `x-campus-*` request metadata and signs them
//! with a shared HMAC key. Every RPC turns that metadata into a [`Caller`].

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tonic::metadata::{MetadataMap, MetadataValue};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const USER_ID_HEADER: &str = "x-campus-user-id";
pub const EMAIL_HEADER: &str = "x-campus-email";
pub const NAME_HEADER: &str = "x-campus-name";
/// Binary form of the name header for names outside printable ASCII
pub const NAME_BIN_HEADER: &str = "x-campus-name-bin";
pub const ROLE_HEADER: &str = "x-campus-role";
pub const TIMESTAMP_HEADER: &str = "x-campus-timestamp";
pub const SIGNATURE_HEADER: &str = "x-campus-signature";

/// Name recorded for registrations when the identity carries none
const ANONYMOUS_NAME: &str = "Any";

/// Raw identity claims as forwarded by the gateway
#[derive(Debug, Clone, Default)]
pub struct IdentityClaims {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: Option<String>,
    pub timestamp: i64,
    pub signature: String,
}

impl IdentityClaims {
    /// Read claims from gRPC request metadata. Missing values become empty.
    ///
    /// Non-ASCII names must arrive as UTF-8 in `x-campus-name-bin`; a name
    /// header that is not printable ASCII is rejected.
    pub fn from_metadata(metadata: &MetadataMap) -> AppResult<Self> {
        let read = |key: &str| {
            metadata
                .get(key)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let role = read(ROLE_HEADER);

        Ok(Self {
            user_id: read(USER_ID_HEADER),
            email: read(EMAIL_HEADER),
            full_name: read_name(metadata)?,
            role: if role.is_empty() { None } else { Some(role) },
            timestamp: read(TIMESTAMP_HEADER).parse().unwrap_or(0),
            signature: read(SIGNATURE_HEADER),
        })
    }

    /// Write claims into request metadata (clients and tests)
    pub fn write_metadata(&self, metadata: &mut MetadataMap) -> AppResult<()> {
        let mut insert = |key: &'static str, value: &str| -> AppResult<()> {
            let value = value
                .parse()
                .map_err(|_| AppError::Validation(format!("Invalid {} value", key)))?;
            metadata.insert(key, value);
            Ok(())
        };

        insert(USER_ID_HEADER, &self.user_id)?;
        insert(EMAIL_HEADER, &self.email)?;
        if self.full_name.is_ascii() {
            insert(NAME_HEADER, &self.full_name)?;
        }
        if let Some(role) = &self.role {
            insert(ROLE_HEADER, role)?;
        }
        insert(TIMESTAMP_HEADER, &self.timestamp.to_string())?;
        insert(SIGNATURE_HEADER, &self.signature)?;

        if !self.full_name.is_ascii() {
            metadata.insert_bin(NAME_BIN_HEADER, MetadataValue::from_bytes(self.full_name.as_bytes()));
        }
        Ok(())
    }
}

fn read_name(metadata: &MetadataMap) -> AppResult<String> {
    if let Some(value) = metadata.get_bin(NAME_BIN_HEADER) {
        let bytes = value
            .to_bytes()
            .map_err(|_| AppError::Unauthorized(format!("Malformed {}", NAME_BIN_HEADER)))?;
        let name = String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Unauthorized(format!("{} must be UTF-8", NAME_BIN_HEADER)))?;
        return Ok(name.trim().to_string());
    }

    match metadata.get(NAME_HEADER) {
        None => Ok(String::new()),
        Some(value) => value.to_str().map(|s| s.trim().to_string()).map_err(|_| {
            AppError::Unauthorized(format!(
                "{} must be printable ASCII; send other names in {}",
                NAME_HEADER, NAME_BIN_HEADER
            ))
        }),
    }
}

/// Authenticated user making a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: Option<String>,
    is_admin: bool,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Name shown on registration lists
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            ANONYMOUS_NAME
        } else {
            &self.full_name
        }
    }

    pub fn require_admin(&self, message: &str) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(message.to_string()))
        }
    }
}

/// Create the message the gateway signs
pub fn create_auth_message(user_id: &str, email: &str, role: Option<&str>, timestamp: i64) -> String {
    format!(
        "campus_auth:{}:{}:{}:{}",
        user_id,
        email,
        role.unwrap_or(""),
        timestamp
    )
}

/// Sign claims with the shared key, returning lowercase hex
pub fn sign_identity(secret: &str, claims: &IdentityClaims) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(format!("Invalid identity secret: {}", e)))?;
    let message = create_auth_message(&claims.user_id, &claims.email, claims.role.as_deref(), claims.timestamp);
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies gateway identity claims against the configured policy
#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    config: AuthConfig,
}

impl IdentityVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Authenticate a request's metadata at the current time
    pub fn caller_from_metadata(&self, metadata: &MetadataMap) -> AppResult<Caller> {
        let claims = IdentityClaims::from_metadata(metadata)?;
        self.verify(&claims, chrono::Utc::now().timestamp())
    }

    /// Verify claims as of `now` (Unix seconds)
    pub fn verify(&self, claims: &IdentityClaims, now: i64) -> AppResult<Caller> {
        if claims.user_id.is_empty() {
            return Err(AppError::Unauthorized("Missing user id".to_string()));
        }

        if claims.email.is_empty() {
            return Err(AppError::Unauthorized("Missing email".to_string()));
        }

        match self.verify_signature(claims, now) {
            Ok(()) => {}
            Err(e) if self.config.allow_unsigned => {
                debug!("Accepting unsigned identity for {} in development: {}", claims.user_id, e);
            }
            Err(e) => return Err(e),
        }

        self.check_email_domain(&claims.email)?;

        let is_admin = claims.role.as_deref() == Some(self.config.admin_role.as_str());

        Ok(Caller {
            user_id: claims.user_id.clone(),
            email: claims.email.clone(),
            full_name: claims.full_name.clone(),
            role: claims.role.clone(),
            is_admin,
        })
    }

    /// Checks that:
    /// 1. The timestamp is within the freshness window
    /// 2. The signature matches the claims
    fn verify_signature(&self, claims: &IdentityClaims, now: i64) -> AppResult<()> {
        let max_age = u64::try_from(self.config.identity_max_age_secs).unwrap_or(0);
        if now.abs_diff(claims.timestamp) > max_age {
            return Err(AppError::Unauthorized("Identity timestamp expired".to_string()));
        }

        if claims.signature.is_empty() {
            return Err(AppError::Unauthorized("Signature required".to_string()));
        }

        let signature = hex::decode(&claims.signature)
            .map_err(|_| AppError::Unauthorized("Malformed signature".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(self.config.identity_secret.as_bytes())
            .map_err(|e| AppError::Config(format!("Invalid identity secret: {}", e)))?;
        let message = create_auth_message(&claims.user_id, &claims.email, claims.role.as_deref(), claims.timestamp);
        mac.update(message.as_bytes());

        mac.verify_slice(&signature)
            .map_err(|_| AppError::Unauthorized("Invalid signature".to_string()))
    }

    fn check_email_domain(&self, email: &str) -> AppResult<()> {
        let suffix = format!("@{}", self.config.allowed_email_domain);
        if email.to_lowercase().ends_with(&suffix) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Only {} accounts may use this service",
                suffix
            )))
        }
    }
}
