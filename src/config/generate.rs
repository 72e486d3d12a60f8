pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# LOGS-TRANSMITTER CONFIGURATION
# =============================================================================
# Receives newline-delimited JSON arrays of log lines from a log shipper
# (for example a Vector `http` sink with `encoding.codec: json`) and stores
# one batch per request.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/logs-transmitter/config.yml
#   3. /etc/logs-transmitter/config.yml
#
# Values may reference environment variables with the $env{...} syntax.

# =============================================================================
# HTTP SERVER
# =============================================================================
# POST /api/logs    ingest a request body, one batch per request
# GET  /api/source  stored messages, newest batch first
# GET  /health      liveness

server:
  listen: 127.0.0.1:7245
  # Set to 0.0.0.0:7245 to accept requests from other hosts
  # Requests larger than this are rejected with 413
  max_body_bytes: 16777216

# =============================================================================
# STORAGE
# =============================================================================
# backend: 'duckdb' (file on disk) or 'memory' (lost on shutdown)

storage:
  backend: duckdb
  path: ~/.local/share/logs-transmitter/batches.duckdb
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, StorageBackend};

    #[test]
    fn test_starter_config_is_valid() {
        let starter = generate_starter_config();
        assert!(starter.contains("$env{"));

        let config = parse_config(&starter).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Duckdb);
        assert_eq!(config.server.listen, "127.0.0.1:7245");
    }
}
