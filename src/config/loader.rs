use std::path::Path;

use config::{Config, File, FileFormat};
use eyre::{Context, Result};

use crate::config::models::RoutingConfig;

/// Load a routing configuration from a file using the config crate.
/// Supports multiple formats: YAML, JSON, TOML, etc.
pub async fn load_routing_config(config_path: &str) -> Result<RoutingConfig> {
    load_routing_config_sync(config_path)
}

/// Load a routing configuration synchronously.
pub fn load_routing_config_sync(config_path: &str) -> Result<RoutingConfig> {
    let config_path = Path::new(config_path);

    // Determine file format based on extension
    let format = match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some("toml") => FileFormat::Toml,
        Some("ini") => FileFormat::Ini,
        _ => FileFormat::Yaml, // Default to YAML
    };

    let settings = Config::builder()
        .add_source(File::new(
            config_path
                .to_str()
                .ok_or_else(|| eyre::eyre!("Invalid UTF-8 path: {}", config_path.display()))?,
            format,
        ))
        .build()
        .with_context(|| format!("Failed to build config from {}", config_path.display()))?;

    let routing_config: RoutingConfig = settings.try_deserialize().with_context(|| {
        format!(
            "Failed to deserialize config from {}",
            config_path.display()
        )
    })?;

    Ok(routing_config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[tokio::test]
    async fn test_load_yaml_config() {
        let yaml_content = r#"
routes:
  - path: "/users/:id"
    methods: ["GET"]
    handler: "users.show"
  - path: "/items"
    methods: ["GET", "POST"]
    handler: "items"
    host: "api.example.com"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = load_routing_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].path, "/users/:id");
        assert_eq!(config.routes[1].host.as_deref(), Some("api.example.com"));
    }

    #[tokio::test]
    async fn test_load_json_config() {
        let json_content = r#"
{
  "routes": [
    {
      "path": "/archives/:year[/:month=1]",
      "methods": ["GET"],
      "handler": "archives.index",
      "https_only": true
    }
  ]
}
"#;

        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{}", json_content).unwrap();

        let config = load_routing_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.routes.len(), 1);
        assert!(config.routes[0].https_only);
    }

    #[tokio::test]
    async fn test_load_toml_config() {
        let toml_content = r#"
[[routes]]
path = "/health"
methods = ["GET"]
handler = "health.live"
"#;

        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_routing_config(temp_file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].handler, "health.live");
    }
}
