//! bcrypt password hashing and verification
//!
//! [`hash`] turns a secret into a self-describing [`HashRecord`] with a fresh
//! random salt; [`verify`] checks a secret against a stored record. A wrong
//! secret is `Ok(false)`; a corrupt record is [`HashError::MalformedRecord`].
//!
//! ```no_run
//! let record = passhash::hash("correct-horse-battery-staple", 10)?;
//! assert!(passhash::verify("correct-horse-battery-staple", &record)?);
//! assert!(!passhash::verify("wrong-password", &record)?);
//! # Ok::<(), passhash::HashError>(())
//! ```

pub mod compare;
pub mod config;
pub mod errors;
pub mod hasher;
pub mod offload;
pub mod record;
pub mod telemetry;

pub use errors::{HashError, HashResult};
pub use hasher::{PasswordHasher, DEFAULT_COST, DEFAULT_MIN_COST, MAX_SECRET_LEN};
pub use record::{Algorithm, HashRecord};

/// Hash `secret` at `cost` with the default policy (minimum cost 10, `$2b$`)
pub fn hash<S: AsRef<[u8]>>(secret: S, cost: u32) -> HashResult<HashRecord> {
    PasswordHasher::default().hash(secret, cost)
}

/// Check `secret` against a parsed record
pub fn verify<S: AsRef<[u8]>>(secret: S, record: &HashRecord) -> HashResult<bool> {
    PasswordHasher::default().verify(secret, record)
}

/// Check `secret` against a record in its encoded string form
pub fn verify_encoded<S: AsRef<[u8]>>(secret: S, encoded: &str) -> HashResult<bool> {
    PasswordHasher::default().verify_encoded(secret, encoded)
}
