use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Connection string, `scheme://[user[:pass]@]host[:port]/dbname`
    pub url: String,

    // TLS configuration
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// Extra root certificate (PEM), empty for none
    #[serde(default)]
    pub ca_cert_path: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("settee/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            insecure_skip_verify: false,
            ca_cert_path: String::new(),
            user_agent: default_user_agent(),
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"url": "http://localhost:5984/mydb"}"#).unwrap();
        assert_eq!(config.url, "http://localhost:5984/mydb");
        assert!(!config.insecure_skip_verify);
        assert!(config.ca_cert_path.is_empty());
        assert!(config.user_agent.starts_with("settee/"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("settee-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"url": "https://db.example.com/mail", "insecure_skip_verify": true}"#,
        )
        .unwrap();

        let config = ClientConfig::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.url, "https://db.example.com/mail");
        assert!(config.insecure_skip_verify);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ClientConfig::load("/nonexistent/settee.json").is_err());
    }
}
