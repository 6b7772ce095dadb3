//! Time-bucketed anti-forgery tokens.
//!
//! A token is a truncated HMAC-SHA256 over `tick|action|user`, where `tick`
//! counts half-lifetimes since the epoch. Verification accepts the current
//! tick and the one before it, so a token stays valid for at least half and
//! at most the full lifetime.

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use sha2::Sha256;
use tracing::debug;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Action every admin RPC call is signed for.
pub const NONCE_ACTION: &str = "codesnip_nonce";

const DEFAULT_LIFETIME_SECS: i64 = 24 * 60 * 60;
const TOKEN_BYTES: usize = 10;

/// Which tick a verified token was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceAge {
    /// Issued in the current half-lifetime.
    Fresh,
    /// Issued in the previous half-lifetime.
    Aging,
}

#[derive(Clone)]
pub struct NonceSigner {
    keyed: HmacSha256,
    lifetime_secs: i64,
}

impl NonceSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        let keyed = HmacSha256::new_from_slice(secret).map_err(|_| AuthError::EmptySecret)?;
        Ok(Self {
            keyed,
            lifetime_secs: DEFAULT_LIFETIME_SECS,
        })
    }

    /// Signer with a per-process secret. Tokens do not survive a restart.
    pub fn random() -> Result<Self, AuthError> {
        let mut secret = Vec::with_capacity(32);
        secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
        secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
        Self::new(secret)
    }

    /// Lifetimes shorter than two seconds are raised to two.
    pub fn with_lifetime(mut self, lifetime_secs: i64) -> Self {
        self.lifetime_secs = lifetime_secs.max(2);
        self
    }

    pub fn issue(&self, action: &str, user: &str) -> String {
        self.issue_at(action, user, Timestamp::now())
    }

    pub fn issue_at(&self, action: &str, user: &str, now: Timestamp) -> String {
        let tag = self.mac(self.tick(now), action, user).finalize().into_bytes();
        hex::encode(&tag[..TOKEN_BYTES])
    }

    pub fn verify(&self, token: &str, action: &str, user: &str) -> Result<NonceAge, AuthError> {
        self.verify_at(token, action, user, Timestamp::now())
    }

    pub fn verify_at(
        &self,
        token: &str,
        action: &str,
        user: &str,
        now: Timestamp,
    ) -> Result<NonceAge, AuthError> {
        let provided = hex::decode(token.trim()).map_err(|_| AuthError::InvalidNonce)?;
        if provided.len() != TOKEN_BYTES {
            return Err(AuthError::InvalidNonce);
        }

        let tick = self.tick(now);
        for (age, tick) in [(NonceAge::Fresh, tick), (NonceAge::Aging, tick - 1)] {
            if self.mac(tick, action, user).verify_truncated_left(&provided).is_ok() {
                return Ok(age);
            }
        }

        debug!(action, user, "nonce rejected");
        Err(AuthError::InvalidNonce)
    }

    fn tick(&self, now: Timestamp) -> i64 {
        let half = self.lifetime_secs / 2;
        let secs = now.as_second();
        secs / half + i64::from(secs % half != 0)
    }

    fn mac(&self, tick: i64, action: &str, user: &str) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(format!("{tick}|{action}|{user}").as_bytes());
        mac
    }
}

impl std::fmt::Debug for NonceSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceSigner")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}
