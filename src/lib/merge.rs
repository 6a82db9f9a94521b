//! Reconciliation of an existing env file against its template.
//!
//! The template supplies the shape of the result (line order, comments, the
//! set of variables) and the existing file supplies the values. Variables that
//! only one side knows about are reported as added or removed.

use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::parse::EnvFile;

/// Outcome of [`merge`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergeResult<'a> {
  pub merged: EnvFile<'a>,
  /// Present in the template only, with the template's value.
  pub added: BTreeMap<String, String>,
  /// Present in the existing file only, with the existing value.
  pub removed: BTreeMap<String, String>,
}

/// Merges `existing` into `template`.
///
/// Without an existing file the template is returned as is and nothing is
/// reported as added or removed, since there is no previous state to compare with.
pub fn merge<'a>(existing: Option<EnvFile<'a>>, template: EnvFile<'a>) -> MergeResult<'a> {
  let Some(existing) = existing else {
    #[cfg(feature = "tracing")]
    debug!("No existing file, using template verbatim");

    return MergeResult {
      merged: template,
      ..Default::default()
    };
  };

  let removed = vars_not_in_other(&existing, &template);
  let added = vars_not_in_other(&template, &existing);

  #[cfg(feature = "tracing")]
  debug!(
    added = added.len(),
    removed = removed.len(),
    "Computed variable diff"
  );

  let mut merged = template;
  // Names missing from the template are the removed ones and are skipped.
  for var in existing.variables() {
    if merged.set_value(&var.name, var.value.clone()).is_ok() {
      #[cfg(feature = "tracing")]
      trace!("Keeping existing value for {}", var.name);
    }
  }

  MergeResult {
    merged,
    added,
    removed,
  }
}

fn vars_not_in_other(main: &EnvFile, other: &EnvFile) -> BTreeMap<String, String> {
  main
    .variables()
    .filter(|var| !other.contains(&var.name))
    .map(|var| (var.name.clone(), var.value.to_string()))
    .collect()
}
