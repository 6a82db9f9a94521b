//! Environment file synchronization functionality.
//!
//! This module wires parsing, merging and secret generation into a single run
//! over a target env file and its template.
//!
//! # Sync Logic
//!
//! The sync process:
//! 1. Reads the target file (if it exists) and the template file
//! 2. Takes the template as the base structure:
//!    - Variables known to both keep the target file's value
//!    - Variables only in the template are reported as added
//!    - Variables only in the target file are reported as removed and dropped
//! 3. Generates values for empty must-create variables
//! 4. Writes the result back to the target file, unless running in status mode
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotenv_sync::generate::RandomSecret;
//! use dotenv_sync::sync::{EnvSync, EnvSyncConfig, RunOptions};
//! use std::collections::HashSet;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), dotenv_sync::sync::EnvSyncError> {
//! let config = EnvSyncConfig::new(
//!     ".env",
//!     HashSet::from(["SECRET_KEY".to_string()]),
//!     Arc::new(RandomSecret::default()),
//! )
//! .with_options(&RunOptions { status: true });
//!
//! let report = EnvSync::run(config).await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

use std::{
  collections::{BTreeMap, HashSet},
  ffi::OsString,
  fmt,
  path::{Path, PathBuf},
  sync::Arc,
};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::{
  generate::SecretGenerator,
  merge::merge,
  parse::EnvFile,
  resolve::{ResolveError, resolve_missing},
};

const TEMPLATE_SUFFIX: &str = ".example";

/// Options that change what a run does rather than what it runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
  /// Only report what would change, never write.
  pub status: bool,
}

/// Anything that can decide the [`RunOptions`] for a run, typically a command-line parser.
pub trait OptionsSource {
  fn run_options(&self) -> RunOptions;
}

impl OptionsSource for RunOptions {
  fn run_options(&self) -> RunOptions {
    *self
  }
}

/// Everything a run needs.
pub struct EnvSyncConfig {
  /// The env file to reconcile and write.
  pub env_file: PathBuf,
  /// The template the env file is reconciled against.
  pub template_file: PathBuf,
  /// Variables that get a generated value when empty.
  pub must_create: HashSet<String>,
  pub generator: Arc<dyn SecretGenerator>,
  pub options: RunOptions,
}

impl EnvSyncConfig {
  /// Creates a config whose template is `env_file` with `.example` appended.
  pub fn new(
    env_file: impl Into<PathBuf>,
    must_create: HashSet<String>,
    generator: Arc<dyn SecretGenerator>,
  ) -> Self {
    let env_file = env_file.into();
    let template_file = template_path_for(&env_file);

    Self {
      env_file,
      template_file,
      must_create,
      generator,
      options: RunOptions::default(),
    }
  }

  pub fn with_template(mut self, template_file: impl Into<PathBuf>) -> Self {
    self.template_file = template_file.into();
    self
  }

  pub fn with_options(mut self, source: &dyn OptionsSource) -> Self {
    self.options = source.run_options();
    self
  }
}

fn template_path_for(env_file: &Path) -> PathBuf {
  let mut path = OsString::from(env_file.as_os_str());
  path.push(TEMPLATE_SUFFIX);
  PathBuf::from(path)
}

/// Main synchronization service for environment files.
pub struct EnvSync;

impl EnvSync {
  /// Runs a full load, merge, resolve and write cycle.
  ///
  /// Returns an error if the template file doesn't exist. In status mode
  /// everything is computed but nothing is written.
  pub async fn run(config: EnvSyncConfig) -> Result<SyncReport, EnvSyncError> {
    #[cfg(feature = "tracing")]
    info!("Starting env sync");

    let EnvSyncConfig {
      env_file,
      template_file,
      must_create,
      generator,
      options,
    } = config;

    #[cfg(feature = "tracing")]
    debug!(?env_file, ?template_file, ?options, "Resolved run config");

    let env_exists = tokio::fs::try_exists(&env_file)
      .await
      .map_err(EnvSyncError::ExistenceCheck)?;

    if !tokio::fs::try_exists(&template_file)
      .await
      .map_err(EnvSyncError::ExistenceCheck)?
    {
      return Err(EnvSyncError::TemplateNotFound(template_file));
    }

    let (local_str, template_str) = tokio::try_join!(
      async {
        if env_exists {
          tokio::fs::read_to_string(&env_file)
            .await
            .map(Some)
            .map_err(EnvSyncError::LocalIo)
        } else {
          Ok(None)
        }
      },
      async {
        tokio::fs::read_to_string(&template_file)
          .await
          .map_err(EnvSyncError::TemplateIo)
      },
    )?;

    let local = local_str.as_deref().map(EnvFile::from);
    let template = EnvFile::from(template_str.as_str());

    let merged = merge(local, template);

    #[cfg(feature = "tracing")]
    {
      for (name, value) in &merged.added {
        info!("Added {}={}", name, value);
      }
      for (name, value) in &merged.removed {
        info!("Removed {}={}", name, value);
      }
    }

    let mut file = merged.merged;
    let updated = resolve_missing(&must_create, generator, &mut file).await?;

    let written = if options.status {
      #[cfg(feature = "tracing")]
      debug!("Status mode, not writing {:?}", env_file);
      false
    } else {
      file.compile();
      Self::update_local(&file, &env_file).await?;
      true
    };

    Ok(SyncReport {
      env_file,
      created: !env_exists,
      status: options.status,
      added: merged.added,
      removed: merged.removed,
      updated,
      written,
    })
  }

  /// Writes the synchronized content back to the local file.
  async fn update_local(local: &EnvFile<'_>, local_path: &Path) -> Result<(), EnvSyncError> {
    #[cfg(feature = "tracing")]
    debug!("Writing synced content to {:?}", local_path);

    tokio::fs::write(local_path, local.serialize())
      .await
      .map_err(EnvSyncError::Write)?;

    #[cfg(feature = "tracing")]
    info!("Sync completed successfully");

    Ok(())
  }
}

/// What a run found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
  pub env_file: PathBuf,
  /// The env file did not exist and was built from the template.
  pub created: bool,
  pub status: bool,
  pub added: BTreeMap<String, String>,
  pub removed: BTreeMap<String, String>,
  /// Values generated for empty must-create variables.
  pub updated: BTreeMap<String, String>,
  pub written: bool,
}

impl fmt::Display for SyncReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = self.env_file.display();

    if self.created {
      writeln!(f, "{} does not exist, copying from template", name)?;
    }

    if self.status {
      writeln!(f, "Showing status of {}", name)?;
    } else {
      writeln!(f, "Configuring {}", name)?;
    }

    if !self.added.is_empty() {
      writeln!(f, "  Added Variables")?;
      for (key, value) in &self.added {
        writeln!(f, "    {}={}", key, value)?;
      }
    }

    if !self.removed.is_empty() {
      writeln!(f, "  Removed Variables")?;
      for (key, value) in &self.removed {
        writeln!(f, "    {}={}", key, value)?;
      }
    }

    if self.updated.is_empty() {
      writeln!(f, "  nothing to configure")?;
    } else {
      for (key, value) in &self.updated {
        writeln!(f, "  {}: {}", key, value)?;
      }
    }

    Ok(())
  }
}

/// Errors that can occur during environment file synchronization.
#[derive(Debug, thiserror::Error)]
pub enum EnvSyncError {
  /// Error checking whether a file exists
  #[error("Could not check file existence: {0}")]
  ExistenceCheck(std::io::Error),
  /// Error reading the local environment file
  #[error("Local file IO error: {0}")]
  LocalIo(std::io::Error),
  /// Error reading the template file
  #[error("Template file IO error: {0}")]
  TemplateIo(std::io::Error),
  /// Template file does not exist
  #[error("Template file not found: {0}")]
  TemplateNotFound(PathBuf),
  /// A missing value could not be generated
  #[error("Could not generate missing values: {0}")]
  Resolve(#[from] ResolveError),
  /// Error writing the synchronized content
  #[error("Write error: {0}")]
  Write(std::io::Error),
}
