//! CLI configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Cart policy overrides come from an optional TOML file; any field
//! it leaves out keeps its default. Money fields in that file are in cents.
//!
//! ```toml
//! max_unique_items = 5
//!
//! [promotions]
//! same_seller_bps = 1500
//! ```

use std::env;
use std::path::{Path, PathBuf};

use checkout_core::CartPolicy;
use checkout_db::DbConfig;

pub const DEFAULT_DATABASE_PATH: &str = "./checkout.db";
pub const DEFAULT_LOG_FILTER: &str = "info,checkout=debug,sqlx=warn";

/// Checkout CLI configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size (default: 5)
    pub max_connections: u32,

    /// TOML file overriding cart policy fields
    pub policy_file: Option<PathBuf>,

    /// Log filter directive, falls back to RUST_LOG
    pub log_filter: Option<String>,
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = CheckoutConfig {
            database_path: lookup("CHECKOUT_DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),

            max_connections: lookup("CHECKOUT_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CHECKOUT_MAX_CONNECTIONS".to_string()))?,

            policy_file: lookup("CHECKOUT_POLICY_FILE").map(PathBuf::from),

            log_filter: lookup("CHECKOUT_LOG"),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "CHECKOUT_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }

    /// Cart policy, with the policy file applied when one is configured.
    pub fn policy(&self) -> Result<CartPolicy, ConfigError> {
        match &self.policy_file {
            Some(path) => load_policy(path),
            None => Ok(CartPolicy::default()),
        }
    }
}

/// Reads a policy file and validates the merged result.
pub fn load_policy(path: &Path) -> Result<CartPolicy, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingRequired(path.display().to_string()));
    }

    let policy: CartPolicy = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()?
        .try_deserialize()?;

    policy
        .validate()
        .map_err(|e| ConfigError::InvalidPolicy(e.to_string()))?;

    Ok(policy)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Policy file could not be read: {0}")]
    PolicyFile(#[from] config::ConfigError),

    #[error("Invalid cart policy: {0}")]
    InvalidPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::Money;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn policy_file(name: &str, body: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("checkout-{}-{name}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./checkout.db"));
        assert_eq!(config.max_connections, 5);
        assert!(config.policy_file.is_none());
        assert!(config.log_filter.is_none());
        assert_eq!(config.policy().unwrap(), CartPolicy::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = CheckoutConfig::from_lookup(lookup(&[
            ("CHECKOUT_DATABASE_PATH", "/tmp/cart.db"),
            ("CHECKOUT_MAX_CONNECTIONS", "2"),
            ("CHECKOUT_LOG", "warn"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/cart.db"));
        assert_eq!(config.db_config().max_connections, 2);
        assert_eq!(config.log_filter.as_deref(), Some("warn"));
    }

    #[test]
    fn test_bad_pool_size() {
        for value in ["many", "0", "-1"] {
            let err =
                CheckoutConfig::from_lookup(lookup(&[("CHECKOUT_MAX_CONNECTIONS", value)]))
                    .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(_)));
        }
    }

    #[test]
    fn test_policy_file_overrides_some_fields() {
        let path = policy_file(
            "partial",
            "max_unique_items = 4\n\n[promotions]\nsame_seller_bps = 1500\n",
        );

        let policy = load_policy(&path).unwrap();
        assert_eq!(policy.max_unique_items, 4);
        assert_eq!(policy.promotions.same_seller_bps, 1500);
        assert_eq!(policy.max_total_quantity, 30);
        assert_eq!(policy.promotions.category_id, 3003);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_policy_file_money_in_cents() {
        let path = policy_file("money", "max_cart_price = 100000\n");

        let policy = load_policy(&path).unwrap();
        assert_eq!(policy.max_cart_price, Money::from_major_minor(1_000, 0));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let path = policy_file("invalid", "[promotions]\nsame_seller_bps = 20000\n");

        let err = load_policy(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPolicy(_)));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_policy_file() {
        let err = load_policy(Path::new("/nonexistent/checkout-policy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }
}
