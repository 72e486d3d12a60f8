use logs_transmitter::config::{generate::generate_starter_config, load_config, StorageBackend};
use logs_transmitter::ingest::Batch;
use logs_transmitter::storage::open_storage;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_generated_config_is_valid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, generate_starter_config()).unwrap();

    let config = load_config(&config_path).expect("Generated config should be valid");

    assert_eq!(config.server.listen, "127.0.0.1:7245");
    assert_eq!(config.server.max_body_bytes, 16 * 1024 * 1024);
    assert_eq!(config.storage.backend, StorageBackend::Duckdb);
    let path = config.storage.path.unwrap();
    assert!(!path.starts_with("~"));
    assert!(path.ends_with("batches.duckdb"));
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_config(&temp_dir.path().join("absent.yml"));

    let err = result.unwrap_err().to_string();
    assert!(err.contains("absent.yml"), "error should name the file: {err}");
}

#[test]
fn test_malformed_yaml_names_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.yml");
    fs::write(&config_path, "server: [unclosed\n").unwrap();

    let err = load_config(&config_path).unwrap_err().to_string();
    assert!(err.contains("broken.yml"), "error should name the file: {err}");
}

#[test]
fn test_validation_errors_are_collected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(
        &config_path,
        r#"
server:
  listen: not-an-address
  max_body_bytes: 0
storage:
  backend: duckdb
"#,
    )
    .unwrap();

    let err = load_config(&config_path).unwrap_err().to_string();
    assert!(err.contains("listen"), "{err}");
    assert!(err.contains("max_body_bytes"), "{err}");
    assert!(err.contains("path"), "{err}");
}

#[tokio::test]
async fn test_duckdb_batches_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("data").join("batches.duckdb");
    let config_path = temp_dir.path().join("config.yml");
    fs::write(
        &config_path,
        format!(
            "storage:\n  backend: duckdb\n  path: {}\n",
            db_path.display()
        ),
    )
    .unwrap();
    let config = load_config(&config_path).unwrap();

    let mut batch = Batch::new();
    batch.push_line("not json");
    let id = batch.id;

    {
        let storage = open_storage(&config.storage).unwrap();
        storage.init_schema().await.unwrap();
        storage.write_batch(&batch).await.unwrap();
    }
    assert!(db_path.exists());

    let storage = open_storage(&config.storage).unwrap();
    storage.init_schema().await.unwrap();
    let stored = storage.get_batch(id).await.unwrap().unwrap();
    assert_eq!(stored.entries, batch.entries);
    assert!(!stored.expected_schema);
}
