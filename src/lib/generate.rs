//! Secret generators used to fill in empty must-create variables.

use std::{future::Future, pin::Pin};

use base64::Engine;
use rand::{RngCore, rngs::OsRng};

#[cfg(feature = "tracing")]
use tracing::trace;

const DEFAULT_SECRET_BYTES: usize = 32;

/// Future returned by [`SecretGenerator::generate`].
pub type GenerateFuture = Pin<Box<dyn Future<Output = Result<String, GenerateError>> + Send>>;

/// Produces a value for a variable that must not stay empty.
///
/// Several invocations may be in flight at once, in any order.
pub trait SecretGenerator: Send + Sync {
  fn generate(&self, name: &str) -> GenerateFuture;
}

impl<F, Fut> SecretGenerator for F
where
  F: Fn(&str) -> Fut + Send + Sync,
  Fut: Future<Output = Result<String, GenerateError>> + Send + 'static,
{
  fn generate(&self, name: &str) -> GenerateFuture {
    Box::pin(self(name))
  }
}

/// Random bytes from the OS, base64 encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSecret {
  pub bytes: usize,
}

impl Default for RandomSecret {
  fn default() -> Self {
    Self {
      bytes: DEFAULT_SECRET_BYTES,
    }
  }
}

impl RandomSecret {
  pub fn new(bytes: usize) -> Self {
    Self { bytes }
  }

  fn encode_fresh(&self, name: &str) -> Result<String, GenerateError> {
    let mut buf = vec![0u8; self.bytes];
    OsRng
      .try_fill_bytes(&mut buf)
      .map_err(|err| GenerateError::Failed {
        name: name.to_string(),
        reason: err.to_string(),
      })?;

    #[cfg(feature = "tracing")]
    trace!("Generated {} random bytes for {}", self.bytes, name);

    Ok(base64::engine::general_purpose::STANDARD.encode(buf))
  }
}

impl SecretGenerator for RandomSecret {
  fn generate(&self, name: &str) -> GenerateFuture {
    let result = self.encode_fresh(name);
    Box::pin(async move { result })
  }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
  /// The generator has no rule for this variable
  #[error("No generator for variable: {0}")]
  Unsupported(String),
  #[error("Failed to generate {name}: {reason}")]
  Failed { name: String, reason: String },
}
