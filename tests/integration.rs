use dotenv_sync::generate::{GenerateError, RandomSecret, SecretGenerator};
use dotenv_sync::sync::{EnvSync, EnvSyncConfig, EnvSyncError, RunOptions};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn fixed(value: &'static str) -> Arc<dyn SecretGenerator> {
  Arc::new(move |_: &str| async move { Ok::<_, GenerateError>(value.to_string()) })
}

fn must_create(names: &[&str]) -> HashSet<String> {
  names.iter().map(|name| name.to_string()).collect()
}

#[tokio::test]
async fn test_sync_integration() {
  let temp_dir = TempDir::new().unwrap();

  let local_path = temp_dir.path().join(".env");
  let template_path = temp_dir.path().join(".env.example");

  let local_content = "# my local notes
API_KEY=secret123
DB_HOST=localhost
LEGACY=old
SECRET_KEY=
";
  let template_content = "# Database configuration
DB_HOST=production.example.com
DB_PORT=5432

# API
API_KEY=
SECRET_KEY=
NEW_VAR=default
";

  fs::write(&local_path, local_content).unwrap();
  fs::write(&template_path, template_content).unwrap();

  let config = EnvSyncConfig::new(
    local_path.clone(),
    must_create(&["SECRET_KEY", "API_KEY"]),
    fixed("generated"),
  );

  let report = EnvSync::run(config).await.unwrap();

  let synced_content = fs::read_to_string(&local_path).unwrap();
  let expected = "# Database configuration
DB_HOST=localhost
DB_PORT=5432

# API
API_KEY=secret123
SECRET_KEY=generated
NEW_VAR=default
";

  assert_eq!(synced_content, expected);
  assert!(report.written);
  assert!(!report.created);
  assert_eq!(report.added.keys().collect::<Vec<_>>(), ["DB_PORT", "NEW_VAR"]);
  assert_eq!(report.removed.keys().collect::<Vec<_>>(), ["LEGACY"]);
  assert_eq!(report.updated.keys().collect::<Vec<_>>(), ["SECRET_KEY"]);
}

#[tokio::test]
async fn test_first_run_copies_template() {
  let temp_dir = TempDir::new().unwrap();

  let local_path = temp_dir.path().join(".env");
  let template_path = temp_dir.path().join(".env.example");

  fs::write(&template_path, "# App\nA=1\nSECRET_KEY=\n").unwrap();

  let config = EnvSyncConfig::new(
    local_path.clone(),
    must_create(&["SECRET_KEY"]),
    Arc::new(RandomSecret::default()),
  );

  let report = EnvSync::run(config).await.unwrap();

  assert!(report.created);
  assert!(report.added.is_empty());
  assert!(report.removed.is_empty());

  let secret = report.updated.get("SECRET_KEY").unwrap();
  assert!(!secret.is_empty());

  let synced_content = fs::read_to_string(&local_path).unwrap();
  assert_eq!(synced_content, format!("# App\nA=1\nSECRET_KEY={}\n", secret));
}

#[tokio::test]
async fn test_status_mode_does_not_write() {
  let temp_dir = TempDir::new().unwrap();

  let local_path = temp_dir.path().join(".env");
  let template_path = temp_dir.path().join("template.env");

  let local_content = "A=existing\nC=2\n";
  fs::write(&local_path, local_content).unwrap();
  fs::write(&template_path, "A=\nB=new\nSECRET=\n").unwrap();

  let config = EnvSyncConfig::new(local_path.clone(), must_create(&["SECRET"]), fixed("xyz"))
    .with_template(template_path)
    .with_options(&RunOptions { status: true });

  let report = EnvSync::run(config).await.unwrap();

  assert!(report.status);
  assert!(!report.written);
  assert_eq!(report.added.get("B").map(String::as_str), Some("new"));
  assert_eq!(report.removed.get("C").map(String::as_str), Some("2"));
  assert_eq!(report.updated.get("SECRET").map(String::as_str), Some("xyz"));

  assert_eq!(fs::read_to_string(&local_path).unwrap(), local_content);
}

#[tokio::test]
async fn test_status_mode_first_run_creates_nothing() {
  let temp_dir = TempDir::new().unwrap();

  let local_path = temp_dir.path().join(".env");
  fs::write(temp_dir.path().join(".env.example"), "A=1\n").unwrap();

  let config = EnvSyncConfig::new(local_path.clone(), HashSet::new(), fixed("unused"))
    .with_options(&RunOptions { status: true });

  let report = EnvSync::run(config).await.unwrap();

  assert!(report.created);
  assert!(!local_path.exists());
}

#[tokio::test]
async fn test_generator_failure_skips_write() {
  let temp_dir = TempDir::new().unwrap();

  let local_path = temp_dir.path().join(".env");
  let template_path = temp_dir.path().join(".env.example");

  let local_content = "TOKEN=\n";
  fs::write(&local_path, local_content).unwrap();
  fs::write(&template_path, "TOKEN=\n").unwrap();

  let failing: Arc<dyn SecretGenerator> = Arc::new(|name: &str| {
    let name = name.to_string();
    async move {
      Err::<String, _>(GenerateError::Failed {
        name,
        reason: "vault unreachable".to_string(),
      })
    }
  });

  let config = EnvSyncConfig::new(local_path.clone(), must_create(&["TOKEN"]), failing);

  let result = EnvSync::run(config).await;

  assert!(matches!(result, Err(EnvSyncError::Resolve(_))));
  assert_eq!(fs::read_to_string(&local_path).unwrap(), local_content);
}
