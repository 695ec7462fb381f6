//! Settings structs and loading logic.
//!
//! All settings have sensible defaults and can be overridden via
//! configuration files or environment variables.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Chain RPC connection and retry configuration.
    pub rpc: ChainSettings,
    /// Flag Registry contract configuration.
    pub contracts: ContractSettings,
    /// Scoring model artifact locations.
    pub model: ModelSettings,
    /// HTTP API server configuration.
    pub api: ApiSettings,
    /// Broadcast Hub (WebSocket) configuration.
    pub hub: HubSettings,
    /// Monitor Coordinator timing configuration.
    pub coordinator: CoordinatorSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Metrics configuration.
    pub metrics: MetricsSettings,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// Files are loaded in this order (later overrides earlier):
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (if it exists)
    /// 3. `SOMNIA__SECTION__FIELD`-prefixed environment variables
    /// 4. The flat, historically-named environment variables called out in
    ///    the external interface (`SOMNIA_RPC_URL`, `PORT`, `MODEL_PATH`, ...)
    ///
    /// # Errors
    /// Returns `ConfigError` if configuration is invalid or cannot be loaded.
    pub fn load(environment: &str) -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());

        let builder = Config::builder()
            .set_default("rpc.url", "http://localhost:8545")?
            .set_default("rpc.chain_id", 1)?
            .set_default("rpc.private_key", Option::<String>::None)?
            .set_default("rpc.max_attempts", 3)?
            .set_default("rpc.retry_base_ms", 250)?
            .set_default("rpc.retry_max_delay_ms", 8000)?
            .set_default("rpc.request_timeout_ms", 30_000)?
            .set_default("contracts.flag_registry_address", Option::<String>::None)?
            .set_default("contracts.confirmations", 2)?
            .set_default("contracts.gas_limit_fallback", 500_000)?
            .set_default("model.model_path", Option::<String>::None)?
            .set_default("model.scaler_path", Option::<String>::None)?
            .set_default("model.features_path", Option::<String>::None)?
            .set_default("model.blacklist_path", Option::<String>::None)?
            .set_default("api.host", "0.0.0.0")?
            .set_default("api.port", 8080)?
            .set_default("api.cors_origins", vec!["http://localhost:5173"])?
            .set_default("api.rate_limit_max", 100)?
            .set_default("api.body_size_limit", 1_048_576)?
            .set_default("hub.max_subs_per_conn", 50)?
            .set_default("hub.heartbeat_interval_ms", 30_000)?
            .set_default("hub.connection_timeout_ms", 300_000)?
            .set_default("hub.rate_limit_window_ms", 60_000)?
            .set_default("hub.rate_limit_max_messages", 100)?
            .set_default("hub.idle_reaper_interval_ms", 60_000)?
            .set_default("coordinator.block_poll_interval_ms", 4000)?
            .set_default("coordinator.wallet_poll_interval_ms", 2000)?
            .set_default("coordinator.batch_interval_ms", 2000)?
            .set_default("coordinator.buffer_cap_per_wallet", 1000)?
            .set_default("coordinator.batch_sub_batch_size", 10)?
            .set_default("coordinator.batch_inter_batch_delay_ms", 1000)?
            .set_default("coordinator.breaker_trip_threshold", 5)?
            .set_default("coordinator.breaker_cooldown_ms", 60_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.file_path", Option::<String>::None)?
            .set_default("metrics.enabled", true)?
            .set_default("metrics.host", "0.0.0.0")?
            .set_default("metrics.port", 9090)?
            .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(File::with_name(&format!("{config_dir}/{environment}")).required(false))
            .add_source(
                Environment::with_prefix("SOMNIA")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut settings: Self = builder.build()?.try_deserialize()?;
        settings.apply_flat_env_overrides();
        Ok(settings)
    }

    /// Apply the flat, historically-named environment variables from the
    /// external interface on top of whatever the layered config produced.
    ///
    /// These predate the `SOMNIA__SECTION__FIELD` convention and are kept
    /// for compatibility with the collaborators that still set them.
    fn apply_flat_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SOMNIA_RPC_URL") {
            self.rpc.url = v;
        }
        if let Ok(v) = std::env::var("SOMNIA_CHAIN_ID") {
            if let Ok(n) = v.parse() {
                self.rpc.chain_id = n;
            }
        }
        if let Ok(v) = std::env::var("PRIVATE_KEY") {
            self.rpc.private_key = Some(v);
        }
        if let Ok(v) = std::env::var("CONTRACT_ADDRESS") {
            self.contracts.flag_registry_address = Some(v);
        }
        if let Ok(v) = std::env::var("MODEL_PATH") {
            self.model.model_path = Some(v);
        }
        if let Ok(v) = std::env::var("SCALER_PATH") {
            self.model.scaler_path = Some(v);
        }
        if let Ok(v) = std::env::var("FEATURES_PATH") {
            self.model.features_path = Some(v);
        }
        if let Ok(v) = std::env::var("BLACKLIST_PATH") {
            self.model.blacklist_path = Some(v);
        }
        if let Ok(v) = std::env::var("PORT") {
            if let Ok(n) = v.parse() {
                self.api.port = n;
            }
        }
        if let Ok(v) = std::env::var("CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = std::env::var("RATE_LIMIT_MAX") {
            if let Ok(n) = v.parse() {
                self.api.rate_limit_max = n;
            }
        }
        if let Ok(v) = std::env::var("BODY_SIZE_LIMIT") {
            if let Ok(n) = v.parse() {
                self.api.body_size_limit = n;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("BLOCK_POLL_INTERVAL_MS") {
            if let Ok(n) = v.parse() {
                self.coordinator.block_poll_interval_ms = n;
            }
        }
        if let Ok(v) = std::env::var("WALLET_POLL_INTERVAL_MS") {
            if let Ok(n) = v.parse() {
                self.coordinator.wallet_poll_interval_ms = n;
            }
        }
        if let Ok(v) = std::env::var("CHAIN_MAX_ATTEMPTS") {
            if let Ok(n) = v.parse() {
                self.rpc.max_attempts = n;
            }
        }
        if let Ok(v) = std::env::var("CHAIN_RETRY_BASE_MS") {
            if let Ok(n) = v.parse() {
                self.rpc.retry_base_ms = n;
            }
        }
        if let Ok(v) = std::env::var("BATCH_INTERVAL_MS") {
            if let Ok(n) = v.parse() {
                self.coordinator.batch_interval_ms = n;
            }
        }
        if let Ok(v) = std::env::var("METRICS_PORT") {
            if let Ok(n) = v.parse() {
                self.metrics.port = n;
            }
        }
    }

    /// Validate settings and return any validation error messages.
    ///
    /// # Errors
    /// Returns a list of human-readable validation error messages.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.rpc.url.is_empty() {
            errors.push("rpc.url cannot be empty".into());
        }
        if self.rpc.chain_id == 0 {
            errors.push("rpc.chain_id must be non-zero".into());
        }
        if self.rpc.max_attempts == 0 {
            errors.push("rpc.max_attempts must be non-zero".into());
        }

        if self.api.port == 0 {
            errors.push("api.port must be non-zero".into());
        }
        if self.api.rate_limit_max == 0 {
            errors.push("api.rate_limit_max must be non-zero".into());
        }

        if self.hub.max_subs_per_conn == 0 {
            errors.push("hub.max_subs_per_conn must be non-zero".into());
        }
        if self.hub.rate_limit_max_messages == 0 {
            errors.push("hub.rate_limit_max_messages must be non-zero".into());
        }

        if self.coordinator.buffer_cap_per_wallet == 0 {
            errors.push("coordinator.buffer_cap_per_wallet must be non-zero".into());
        }
        if self.coordinator.batch_sub_batch_size == 0 {
            errors.push("coordinator.batch_sub_batch_size must be non-zero".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether on-chain writes are possible (a private key was configured).
    #[must_use]
    pub fn has_signer(&self) -> bool {
        self.rpc.private_key.is_some()
    }

    /// Whether the Flag Registry is configured.
    #[must_use]
    pub fn has_flag_registry(&self) -> bool {
        self.contracts.flag_registry_address.is_some()
    }
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSettings {
    /// HTTP JSON-RPC endpoint URL.
    pub url: String,
    /// Expected chain id, validated against the endpoint at startup.
    pub chain_id: u64,
    /// Hex-encoded private key. Absent implies read-only operation.
    pub private_key: Option<String>,
    /// Maximum retry attempts for a retryable RPC error.
    pub max_attempts: u32,
    /// Base delay for exponential backoff, in milliseconds.
    pub retry_base_ms: u64,
    /// Maximum backoff delay, in milliseconds.
    pub retry_max_delay_ms: u64,
    /// Per-call request timeout, in milliseconds.
    pub request_timeout_ms: u64,
}

impl ChainSettings {
    /// Base retry delay as a `Duration`.
    #[must_use]
    pub const fn retry_base(&self) -> Duration {
        Duration::from_millis(self.retry_base_ms)
    }

    /// Maximum retry delay as a `Duration`.
    #[must_use]
    pub const fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Flag Registry contract configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractSettings {
    /// Flag Registry contract address. Absent disables flagging endpoints.
    pub flag_registry_address: Option<String>,
    /// Confirmations to wait for after submitting a write.
    pub confirmations: u64,
    /// Gas limit used when estimation fails.
    pub gas_limit_fallback: u64,
}

/// Scoring model artifact locations.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Path to the ONNX model file.
    pub model_path: Option<String>,
    /// Path to the feature scaler (mean/stddev per feature).
    pub scaler_path: Option<String>,
    /// Path to the ordered feature-name list the model expects.
    pub features_path: Option<String>,
    /// Path to the address blacklist.
    pub blacklist_path: Option<String>,
}

/// HTTP API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Maximum requests per window per client, for the HTTP surface.
    pub rate_limit_max: u32,
    /// Maximum accepted request body size, in bytes.
    pub body_size_limit: usize,
}

impl ApiSettings {
    /// Socket address string, e.g. `0.0.0.0:8080`.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Broadcast Hub (WebSocket) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    /// Maximum wallet subscriptions per connection.
    pub max_subs_per_conn: usize,
    /// Heartbeat broadcast interval, in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Idle connection timeout, in milliseconds.
    pub connection_timeout_ms: u64,
    /// Rate-limit sliding window width, in milliseconds.
    pub rate_limit_window_ms: u64,
    /// Maximum messages accepted per connection per window.
    pub rate_limit_max_messages: u32,
    /// Idle-reaper sweep interval, in milliseconds.
    pub idle_reaper_interval_ms: u64,
}

impl HubSettings {
    /// Heartbeat interval as a `Duration`.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Connection timeout as a `Duration`.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// Rate-limit window as a `Duration`.
    #[must_use]
    pub const fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    /// Idle-reaper sweep interval as a `Duration`.
    #[must_use]
    pub const fn idle_reaper_interval(&self) -> Duration {
        Duration::from_millis(self.idle_reaper_interval_ms)
    }
}

/// Monitor Coordinator timing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorSettings {
    /// Block-polling tick interval, in milliseconds.
    pub block_poll_interval_ms: u64,
    /// Per-wallet polling tick interval, in milliseconds.
    pub wallet_poll_interval_ms: u64,
    /// Periodic batch-scoring interval, in milliseconds.
    pub batch_interval_ms: u64,
    /// Maximum events buffered per wallet before the oldest is evicted.
    pub buffer_cap_per_wallet: usize,
    /// Wallets processed per sub-batch in `batch_start`.
    pub batch_sub_batch_size: usize,
    /// Delay between sub-batches, in milliseconds.
    pub batch_inter_batch_delay_ms: u64,
    /// Consecutive ingestion failures before a wallet's circuit breaker trips.
    pub breaker_trip_threshold: u32,
    /// Cooldown before a tripped breaker auto-resets, in milliseconds.
    pub breaker_cooldown_ms: u64,
}

impl CoordinatorSettings {
    /// Block-polling interval as a `Duration`.
    #[must_use]
    pub const fn block_poll_interval(&self) -> Duration {
        Duration::from_millis(self.block_poll_interval_ms)
    }

    /// Per-wallet polling interval as a `Duration`.
    #[must_use]
    pub const fn wallet_poll_interval(&self) -> Duration {
        Duration::from_millis(self.wallet_poll_interval_ms)
    }

    /// Batch interval as a `Duration`.
    #[must_use]
    pub const fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    /// Inter-batch delay as a `Duration`.
    #[must_use]
    pub const fn batch_inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_inter_batch_delay_ms)
    }

    /// Breaker cooldown as a `Duration`.
    #[must_use]
    pub const fn breaker_cooldown(&self) -> Duration {
        Duration::from_millis(self.breaker_cooldown_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Log format (json, pretty).
    pub format: String,
    /// Optional file path for a non-blocking file sink.
    pub file_path: Option<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Whether the Prometheus exporter is enabled.
    pub enabled: bool,
    /// Host to bind the metrics server to.
    pub host: String,
    /// Port for the metrics server.
    pub port: u16,
}

impl MetricsSettings {
    /// Socket address string for the metrics server.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        Settings {
            rpc: ChainSettings {
                url: "http://localhost:8545".into(),
                chain_id: 1,
                private_key: None,
                max_attempts: 3,
                retry_base_ms: 250,
                retry_max_delay_ms: 8000,
                request_timeout_ms: 30_000,
            },
            contracts: ContractSettings {
                flag_registry_address: None,
                confirmations: 2,
                gas_limit_fallback: 500_000,
            },
            model: ModelSettings {
                model_path: None,
                scaler_path: None,
                features_path: None,
                blacklist_path: None,
            },
            api: ApiSettings {
                host: "0.0.0.0".into(),
                port: 8080,
                cors_origins: vec![],
                rate_limit_max: 100,
                body_size_limit: 1_048_576,
            },
            hub: HubSettings {
                max_subs_per_conn: 50,
                heartbeat_interval_ms: 30_000,
                connection_timeout_ms: 300_000,
                rate_limit_window_ms: 60_000,
                rate_limit_max_messages: 100,
                idle_reaper_interval_ms: 60_000,
            },
            coordinator: CoordinatorSettings {
                block_poll_interval_ms: 4000,
                wallet_poll_interval_ms: 2000,
                batch_interval_ms: 2000,
                buffer_cap_per_wallet: 1000,
                batch_sub_batch_size: 10,
                batch_inter_batch_delay_ms: 1000,
                breaker_trip_threshold: 5,
                breaker_cooldown_ms: 60_000,
            },
            logging: LoggingSettings {
                level: "info".into(),
                format: "json".into(),
                file_path: None,
            },
            metrics: MetricsSettings {
                enabled: true,
                host: "0.0.0.0".into(),
                port: 9090,
            },
        }
    }

    #[test]
    fn rpc_durations() {
        let settings = valid_settings();
        assert_eq!(settings.rpc.retry_base(), Duration::from_millis(250));
        assert_eq!(
            settings.coordinator.batch_interval(),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn api_socket_addr() {
        let settings = valid_settings();
        assert_eq!(settings.api.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn validation_passes_for_defaults() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn validation_catches_zero_max_attempts() {
        let mut settings = valid_settings();
        settings.rpc.max_attempts = 0;
        let errors = settings.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("max_attempts")));
    }

    #[test]
    fn validation_catches_zero_port() {
        let mut settings = valid_settings();
        settings.api.port = 0;
        let errors = settings.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("api.port")));
    }

    #[test]
    fn no_signer_by_default() {
        assert!(!valid_settings().has_signer());
    }
}
