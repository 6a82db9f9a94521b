//! Filling in empty must-create variables.
//!
//! Every selected variable gets its own generator invocation and all of them
//! run concurrently. Values are applied to the file as soon as their
//! invocation finishes. The first failure aborts whatever is still running;
//! values that were already applied stay applied.

use std::{
  collections::{BTreeMap, HashSet},
  sync::Arc,
};

use tokio::task::{JoinError, JoinSet};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::{
  generate::{GenerateError, SecretGenerator},
  parse::{EnvFile, EnvFileError},
};

/// Generates values for every variable in `must_create` whose value is empty.
///
/// Returns the generated values by name. Variables that already hold a value
/// are neither touched nor reported.
pub async fn resolve_missing(
  must_create: &HashSet<String>,
  generator: Arc<dyn SecretGenerator>,
  file: &mut EnvFile<'_>,
) -> Result<BTreeMap<String, String>, ResolveError> {
  let mut tasks = JoinSet::new();

  for var in file.variables() {
    if !must_create.contains(&var.name) || !var.value.is_empty() {
      continue;
    }

    #[cfg(feature = "tracing")]
    trace!("Dispatching generator for {}", var.name);

    let name = var.name.clone();
    let pending = generator.generate(&name);
    tasks.spawn(async move { (name, pending.await) });
  }

  #[cfg(feature = "tracing")]
  debug!("Waiting on {} generator invocations", tasks.len());

  let mut updated = BTreeMap::new();

  // Dropping `tasks` on an early return aborts the invocations still running.
  while let Some(joined) = tasks.join_next().await {
    let (name, generated) = joined?;
    let value = generated?;

    #[cfg(feature = "tracing")]
    trace!("Applying generated value for {}", name);

    file.set_value(&name, value.clone())?;
    updated.insert(name, value);
  }

  Ok(updated)
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
  #[error("Generator error: {0}")]
  Generate(#[from] GenerateError),
  /// A generator task panicked or was cancelled
  #[error("Generator task failed: {0}")]
  Task(#[from] JoinError),
  #[error("Could not apply generated value: {0}")]
  File(#[from] EnvFileError),
}
