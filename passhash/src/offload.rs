// Async wrappers that move bcrypt work onto tokio's blocking pool
//
// A derivation cannot be interrupted. Dropping one of these futures detaches
// the blocking task, which still runs to completion; its result is discarded.

use crate::errors::{HashError, HashResult};
use crate::hasher::PasswordHasher;
use crate::record::HashRecord;
use tokio::task::{spawn_blocking, JoinError};
use tracing::{error, instrument};

fn join_failure(e: JoinError) -> HashError {
    error!(error = %e, "Blocking hash task did not complete");
    HashError::PrimitiveFailure(format!("blocking task failed: {}", e))
}

impl PasswordHasher {
    /// [`PasswordHasher::hash`] on a blocking worker thread
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self, secret))]
    pub async fn hash_async<S>(&self, secret: S, cost: u32) -> HashResult<HashRecord>
    where
        S: AsRef<[u8]> + Send + 'static,
    {
        let hasher = *self;
        spawn_blocking(move || hasher.hash(secret, cost))
            .await
            .map_err(join_failure)?
    }

    /// [`PasswordHasher::verify`] on a blocking worker thread
    #[instrument(skip(self, secret, record))]
    pub async fn verify_async<S>(&self, secret: S, record: HashRecord) -> HashResult<bool>
    where
        S: AsRef<[u8]> + Send + 'static,
    {
        let hasher = *self;
        spawn_blocking(move || hasher.verify(secret, &record))
            .await
            .map_err(join_failure)?
    }
}
