//! UUID v4 identifier issuer.

use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::{Builder, Uuid, Variant};

static FALLBACK_CALLS: AtomicU64 = AtomicU64::new(0);
static FALLBACK_WARNED: AtomicBool = AtomicBool::new(false);

/// Where the 128 random bits come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomSource {
    /// OS secure random source, falling back to [`RandomSource::Fallback`] on error.
    #[default]
    Secure,
    /// Per-call seeded `fastrand` generator.
    ///
    /// NOT cryptographic: ids from this source are unique in practice but
    /// carry no collision-resistance or unpredictability guarantee.
    Fallback,
}

/// Issues hyphenated, lowercase UUID v4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdIssuer {
    source: RandomSource,
}

impl IdIssuer {
    pub const fn new(source: RandomSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> RandomSource {
        self.source
    }

    /// Issue a new identifier.
    pub fn issue(&self) -> String {
        let bytes = match self.source {
            RandomSource::Secure => secure_bytes().unwrap_or_else(|err| {
                if !FALLBACK_WARNED.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        error = %err,
                        "Secure random source unavailable, issuing ids from non-cryptographic fallback"
                    );
                }
                fallback_bytes()
            }),
            RandomSource::Fallback => fallback_bytes(),
        };
        Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string()
    }
}

/// Issue an identifier from the default (secure) source.
pub fn generate_id() -> String {
    IdIssuer::default().issue()
}

/// True when `s` is a lowercase, hyphenated RFC 4122 version 4 UUID.
pub fn is_uuid_v4(s: &str) -> bool {
    match Uuid::try_parse(s) {
        Ok(id) => {
            id.get_version_num() == 4
                && id.get_variant() == Variant::RFC4122
                && id.hyphenated().to_string() == s
        }
        Err(_) => false,
    }
}

fn secure_bytes() -> Result<[u8; 16], rand::Error> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

fn fallback_bytes() -> [u8; 16] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let call = FALLBACK_CALLS.fetch_add(1, Ordering::Relaxed);
    let seed = nanos ^ call.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    fastrand::Rng::with_seed(seed).u128(..).to_le_bytes()
}
