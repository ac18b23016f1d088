// Password hashing and verification over the bcrypt primitive

use crate::compare::constant_time_eq;
use crate::config::HasherSettings;
use crate::errors::{HashError, HashResult};
use crate::record::{
    Algorithm, HashRecord, DIGEST_LEN, PRIMITIVE_MAX_COST, PRIMITIVE_MIN_COST, SALT_LEN,
};
use crate::telemetry;
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

/// Longest secret bcrypt consumes; anything longer would be silently truncated
pub const MAX_SECRET_LEN: usize = 72;

/// Lowest cost accepted by a default hasher
pub const DEFAULT_MIN_COST: u32 = 10;

/// Cost used when nothing else is configured
pub const DEFAULT_COST: u32 = 10;

/// Stateless bcrypt hasher
///
/// Holds only policy (minimum cost, revision for new records); the cost of
/// each record is chosen per call. Cheap to copy and safe to share between
/// threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    min_cost: u32,
    algorithm: Algorithm,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            min_cost: DEFAULT_MIN_COST,
            algorithm: Algorithm::Bcrypt2b,
        }
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hasher from validated settings
    pub fn from_settings(settings: &HasherSettings) -> HashResult<Self> {
        Ok(Self::new()
            .with_min_cost(settings.min_cost)?
            .with_algorithm(settings.algorithm))
    }

    /// Change the minimum accepted cost; bounded by the primitive's own limits
    pub fn with_min_cost(mut self, min_cost: u32) -> HashResult<Self> {
        if !(PRIMITIVE_MIN_COST..=PRIMITIVE_MAX_COST).contains(&min_cost) {
            return Err(HashError::InvalidCost {
                cost: min_cost,
                min: PRIMITIVE_MIN_COST,
                max: PRIMITIVE_MAX_COST,
            });
        }
        self.min_cost = min_cost;
        Ok(self)
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn min_cost(&self) -> u32 {
        self.min_cost
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Hash a secret with a fresh random salt
    ///
    /// Blocks for the duration of the derivation, which grows as 2^cost.
    /// Async callers should use [`PasswordHasher::hash_async`] instead.
    ///
    /// # Errors
    /// - `InvalidInput` if the secret is empty or longer than 72 bytes
    /// - `InvalidCost` if `cost` is outside `min_cost..=31`
    /// - `PrimitiveFailure` if the OS entropy source or bcrypt fails
    #[instrument(skip(self, secret), fields(algorithm = %self.algorithm))]
    pub fn hash<S: AsRef<[u8]>>(&self, secret: S, cost: u32) -> HashResult<HashRecord> {
        let result = self.hash_secret(secret.as_ref(), cost);

        match &result {
            Ok(_) => {
                telemetry::record_hash("ok", cost);
                debug!("Secret hashed");
            }
            Err(e) => {
                telemetry::record_hash(e.kind(), cost);
                if matches!(e, HashError::PrimitiveFailure(_)) {
                    error!(error = %e, "Failed to hash secret");
                } else {
                    warn!(error = %e, "Rejected hash request");
                }
            }
        }

        result
    }

    /// Check a secret against a stored record
    ///
    /// Returns `Ok(false)` on mismatch. The stored cost is honoured even when
    /// it is below this hasher's `min_cost`, so legacy records stay usable.
    #[instrument(
        skip(self, secret, record),
        fields(algorithm = %record.algorithm(), cost = record.cost())
    )]
    pub fn verify<S: AsRef<[u8]>>(&self, secret: S, record: &HashRecord) -> HashResult<bool> {
        let result = verify_record(secret.as_ref(), record);
        observe_verify(&result);
        result
    }

    /// Parse `encoded` and check `secret` against it
    ///
    /// A record that fails to parse is reported as `MalformedRecord`, never as
    /// a mismatch.
    #[instrument(skip(self, secret, encoded))]
    pub fn verify_encoded<S: AsRef<[u8]>>(&self, secret: S, encoded: &str) -> HashResult<bool> {
        match HashRecord::parse(encoded) {
            Ok(record) => self.verify(secret, &record),
            Err(e) => {
                let result = Err(e);
                observe_verify(&result);
                result
            }
        }
    }

    /// Whether a record should be re-hashed at `cost` after a successful verify
    pub fn needs_rehash(&self, record: &HashRecord, cost: u32) -> bool {
        record.cost() != cost || record.algorithm() != self.algorithm
    }

    fn hash_secret(&self, secret: &[u8], cost: u32) -> HashResult<HashRecord> {
        self.check_cost(cost)?;
        check_secret(secret)?;
        if secret.is_empty() {
            return Err(HashError::InvalidInput(
                "secret must not be empty".to_string(),
            ));
        }

        let salt = generate_salt()?;
        let started = Instant::now();
        let digest = derive_digest(secret, cost, salt)?;
        telemetry::record_hash_duration(cost, started.elapsed().as_secs_f64());

        Ok(HashRecord::from_parts(self.algorithm, cost, salt, digest))
    }

    fn check_cost(&self, cost: u32) -> HashResult<()> {
        if !(self.min_cost..=PRIMITIVE_MAX_COST).contains(&cost) {
            return Err(HashError::InvalidCost {
                cost,
                min: self.min_cost,
                max: PRIMITIVE_MAX_COST,
            });
        }
        Ok(())
    }
}

fn check_secret(secret: &[u8]) -> HashResult<()> {
    if secret.len() > MAX_SECRET_LEN {
        return Err(HashError::InvalidInput(format!(
            "secret is {} bytes, maximum is {}",
            secret.len(),
            MAX_SECRET_LEN
        )));
    }
    Ok(())
}

fn verify_record(secret: &[u8], record: &HashRecord) -> HashResult<bool> {
    check_secret(secret)?;

    let derived = derive_digest(secret, record.cost(), *record.salt())?;
    Ok(constant_time_eq(&derived, record.digest()))
}

fn observe_verify(result: &HashResult<bool>) {
    match result {
        Ok(true) => {
            telemetry::record_verify("match");
            debug!("Secret matches record");
        }
        Ok(false) => {
            telemetry::record_verify("mismatch");
            debug!("Secret does not match record");
        }
        Err(e) => {
            telemetry::record_verify(e.kind());
            warn!(error = %e, "Verification failed");
        }
    }
}

fn generate_salt() -> HashResult<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| HashError::PrimitiveFailure(format!("entropy source unavailable: {}", e)))?;
    Ok(salt)
}

/// Run bcrypt and pull the encoded digest back out of its output
fn derive_digest(secret: &[u8], cost: u32, salt: [u8; SALT_LEN]) -> HashResult<[u8; DIGEST_LEN]> {
    let parts = bcrypt::hash_with_salt(secret, cost, salt)?;
    let encoded = parts.format_for_version(bcrypt::Version::TwoB);

    HashRecord::parse(&encoded)
        .map(|record| *record.digest())
        .map_err(|e| HashError::PrimitiveFailure(format!("unexpected bcrypt output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost the primitive allows; keeps unit tests fast
    const TEST_COST: u32 = 4;

    fn test_hasher() -> PasswordHasher {
        PasswordHasher::new()
            .with_min_cost(TEST_COST)
            .expect("Failed to lower min cost")
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = test_hasher();
        let record = hasher.hash("hunter2", TEST_COST).expect("Failed to hash");

        assert_eq!(record.cost(), TEST_COST);
        assert_eq!(record.algorithm(), Algorithm::Bcrypt2b);
        assert!(hasher.verify("hunter2", &record).unwrap());
        assert!(!hasher.verify("hunter3", &record).unwrap());
    }

    #[test]
    fn test_salts_are_unique() {
        let hasher = test_hasher();
        let first = hasher.hash("same_secret", TEST_COST).unwrap();
        let second = hasher.hash("same_secret", TEST_COST).unwrap();

        assert_ne!(first.salt(), second.salt());
        assert_ne!(first.to_string(), second.to_string());
        assert!(hasher.verify("same_secret", &first).unwrap());
        assert!(hasher.verify("same_secret", &second).unwrap());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let result = test_hasher().hash("", TEST_COST);
        assert!(matches!(result, Err(HashError::InvalidInput(_))));
    }

    #[test]
    fn test_secret_length_limit() {
        let hasher = test_hasher();
        let longest = vec![b'a'; MAX_SECRET_LEN];
        let record = hasher.hash(&longest, TEST_COST).expect("72 bytes should hash");
        assert!(hasher.verify(&longest, &record).unwrap());

        let too_long = vec![b'a'; MAX_SECRET_LEN + 1];
        assert!(matches!(
            hasher.hash(&too_long, TEST_COST),
            Err(HashError::InvalidInput(_))
        ));
        assert!(matches!(
            hasher.verify(&too_long, &record),
            Err(HashError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_cost_bounds() {
        let hasher = PasswordHasher::new();
        assert!(matches!(
            hasher.hash("secret", 9),
            Err(HashError::InvalidCost { cost: 9, min: 10, max: 31 })
        ));
        assert!(matches!(
            hasher.hash("secret", 32),
            Err(HashError::InvalidCost { cost: 32, .. })
        ));
        assert!(PasswordHasher::new().with_min_cost(3).is_err());
        assert!(PasswordHasher::new().with_min_cost(32).is_err());
    }

    #[test]
    fn test_empty_secret_verifies_foreign_record() {
        // Other bcrypt implementations accept an empty password
        let foreign = bcrypt::hash("", TEST_COST).expect("Failed to hash with bcrypt");
        let hasher = PasswordHasher::new();

        assert!(hasher.verify_encoded("", &foreign).unwrap());
        assert!(!hasher.verify_encoded("x", &foreign).unwrap());

        let record = test_hasher().hash("x", TEST_COST).unwrap();
        assert!(!hasher.verify("", &record).unwrap());
    }

    #[test]
    fn test_noncanonical_digest_is_malformed() {
        // Last digest character differs only in its unused low bits
        let encoded = "$2b$10$jkhDPw3UMfCZK9cAetaPaeZCjOkkBJ/eBkuNp5KNPpbe5XWCZt1sH";
        let result = PasswordHasher::new().verify_encoded("senha123", encoded);
        assert!(matches!(result, Err(HashError::MalformedRecord(_))));
    }

    #[test]
    fn test_known_vector() {
        let hasher = PasswordHasher::new();
        let encoded = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        assert!(hasher.verify_encoded("U*U", encoded).unwrap());
        assert!(!hasher.verify_encoded("U*U*", encoded).unwrap());
    }

    #[test]
    fn test_binary_secret() {
        let hasher = test_hasher();
        let secret = [0xffu8, 0x00, 0x80, 0x7f, 0x01];
        let record = hasher.hash(secret, TEST_COST).unwrap();
        assert!(hasher.verify(secret, &record).unwrap());
        assert!(!hasher.verify([0xffu8, 0x00, 0x80, 0x7f], &record).unwrap());
    }

    #[test]
    fn test_verify_encoded_malformed() {
        let result = PasswordHasher::new().verify_encoded("secret", "$2b$10$tooshort");
        assert!(matches!(result, Err(HashError::MalformedRecord(_))));
    }

    #[test]
    fn test_configured_algorithm_is_written() {
        let hasher = test_hasher().with_algorithm(Algorithm::Bcrypt2y);
        let record = hasher.hash("secret", TEST_COST).unwrap();
        assert!(record.to_string().starts_with("$2y$04$"));
        assert!(hasher.verify("secret", &record).unwrap());
    }

    #[test]
    fn test_needs_rehash() {
        let hasher = test_hasher();
        let record = hasher.hash("secret", TEST_COST).unwrap();

        assert!(!hasher.needs_rehash(&record, TEST_COST));
        assert!(hasher.needs_rehash(&record, TEST_COST + 1));
        assert!(hasher
            .with_algorithm(Algorithm::Bcrypt2a)
            .needs_rehash(&record, TEST_COST));
    }

    #[test]
    fn test_from_settings() {
        let settings = HasherSettings {
            default_cost: 12,
            min_cost: 11,
            algorithm: Algorithm::Bcrypt2a,
        };
        let hasher = PasswordHasher::from_settings(&settings).unwrap();
        assert_eq!(hasher.min_cost(), 11);
        assert_eq!(hasher.algorithm(), Algorithm::Bcrypt2a);
    }
}
