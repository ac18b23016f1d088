// Self-describing bcrypt hash records
//
// Encoding: `$<algorithm>$<cost>$<salt><digest>`, the modular crypt format
// shared by every bcrypt implementation, so stored records stay verifiable
// across builds and across languages.

use crate::errors::{HashError, HashResult};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw salt length in bytes
pub const SALT_LEN: usize = 16;

/// Stored digest length in bytes (bcrypt encodes 23 of its 24 output bytes)
pub const DIGEST_LEN: usize = 23;

/// Lowest cost the bcrypt primitive accepts
pub const PRIMITIVE_MIN_COST: u32 = 4;

/// Highest cost the bcrypt primitive accepts
pub const PRIMITIVE_MAX_COST: u32 = 31;

const ENCODED_SALT_LEN: usize = 22;
const ENCODED_DIGEST_LEN: usize = 31;

/// bcrypt's base64 dialect: `./A-Za-z0-9`, no padding.
///
/// Unused trailing bits must be zero, so every record has exactly one
/// encoding and a corrupted final character cannot decode to a valid digest.
const BCRYPT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// bcrypt revision identifier carried in the record prefix
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "2a")]
    Bcrypt2a,
    #[default]
    #[serde(rename = "2b")]
    Bcrypt2b,
    #[serde(rename = "2y")]
    Bcrypt2y,
}

impl Algorithm {
    /// Identifier as it appears between the first two `$` signs
    pub fn id(&self) -> &'static str {
        match self {
            Self::Bcrypt2a => "2a",
            Self::Bcrypt2b => "2b",
            Self::Bcrypt2y => "2y",
        }
    }

    pub(crate) fn version(&self) -> bcrypt::Version {
        match self {
            Self::Bcrypt2a => bcrypt::Version::TwoA,
            Self::Bcrypt2b => bcrypt::Version::TwoB,
            Self::Bcrypt2y => bcrypt::Version::TwoY,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2a" => Ok(Self::Bcrypt2a),
            "2b" => Ok(Self::Bcrypt2b),
            "2y" => Ok(Self::Bcrypt2y),
            // 2x marks hashes from the sign-extension bug in crypt_blowfish;
            // they cannot be reproduced here.
            "2x" => Err(HashError::MalformedRecord(
                "unsupported algorithm '2x'".to_string(),
            )),
            other => Err(HashError::MalformedRecord(format!(
                "unknown algorithm '{}'",
                other
            ))),
        }
    }
}

/// Parsed, immutable password hash record
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HashRecord {
    algorithm: Algorithm,
    cost: u32,
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl HashRecord {
    pub(crate) fn from_parts(
        algorithm: Algorithm,
        cost: u32,
        salt: [u8; SALT_LEN],
        digest: [u8; DIGEST_LEN],
    ) -> Self {
        Self {
            algorithm,
            cost,
            salt,
            digest,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Work factor; the primitive runs 2^cost key-expansion rounds
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Parse an encoded record, failing with `MalformedRecord`
    pub fn parse(encoded: &str) -> HashResult<Self> {
        encoded.parse()
    }
}

fn malformed(reason: impl Into<String>) -> HashError {
    HashError::MalformedRecord(reason.into())
}

fn parse_cost(raw: &str) -> HashResult<u32> {
    if raw.len() != 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(format!("cost must be two digits, got '{}'", raw)));
    }

    let cost: u32 = raw
        .parse()
        .map_err(|_| malformed(format!("invalid cost '{}'", raw)))?;

    if !(PRIMITIVE_MIN_COST..=PRIMITIVE_MAX_COST).contains(&cost) {
        return Err(malformed(format!(
            "cost {} outside {}..={}",
            cost, PRIMITIVE_MIN_COST, PRIMITIVE_MAX_COST
        )));
    }

    Ok(cost)
}

fn decode_fixed<const N: usize>(field: &str, encoded: &str) -> HashResult<[u8; N]> {
    let bytes = BCRYPT_BASE64
        .decode(encoded)
        .map_err(|e| malformed(format!("invalid {} encoding: {}", field, e)))?;

    bytes
        .try_into()
        .map_err(|_| malformed(format!("{} has wrong length", field)))
}

impl FromStr for HashRecord {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('$')
            .ok_or_else(|| malformed("missing leading '$'"))?;

        let mut fields = rest.splitn(3, '$');
        let algorithm_id = fields.next().unwrap_or_default();
        let cost = fields
            .next()
            .ok_or_else(|| malformed("missing cost field"))?;
        let payload = fields
            .next()
            .ok_or_else(|| malformed("missing salt and digest"))?;

        let algorithm: Algorithm = algorithm_id.parse()?;
        let cost = parse_cost(cost)?;

        // Length check on bytes is only meaningful for ASCII input, and it
        // keeps the split below on a char boundary.
        if !payload.is_ascii() {
            return Err(malformed("salt and digest must be ASCII"));
        }
        if payload.len() != ENCODED_SALT_LEN + ENCODED_DIGEST_LEN {
            return Err(malformed(format!(
                "expected {} characters of salt and digest, got {}",
                ENCODED_SALT_LEN + ENCODED_DIGEST_LEN,
                payload.len()
            )));
        }

        let (salt, digest) = payload.split_at(ENCODED_SALT_LEN);

        Ok(Self {
            algorithm,
            cost,
            salt: decode_fixed("salt", salt)?,
            digest: decode_fixed("digest", digest)?,
        })
    }
}

impl TryFrom<&str> for HashRecord {
    type Error = HashError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for HashRecord {
    type Error = HashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashRecord> for String {
    fn from(record: HashRecord) -> Self {
        record.to_string()
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}{}",
            self.algorithm,
            self.cost,
            BCRYPT_BASE64.encode(self.salt),
            BCRYPT_BASE64.encode(self.digest)
        )
    }
}

impl fmt::Debug for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashRecord").field(&self.to_string()).finish()
    }
}
