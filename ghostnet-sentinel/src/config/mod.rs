//! Configuration loading and validation for Ghostnet Sentinel.
//!
//! Settings are resolved from four layers, in increasing order of precedence:
//! 1. Built-in defaults.
//! 2. `config/default.toml`.
//! 3. `config/{environment}.toml` (if present).
//! 4. Environment variables, both generically (`SOMNIA__SECTION__FIELD`) and
//!    via the handful of flat, historically-named variables the spec calls
//!    out directly (`SOMNIA_RPC_URL`, `PORT`, `MODEL_PATH`, ...).
//!
//! # Example
//!
//! ```ignore
//! use ghostnet_sentinel::config::Settings;
//!
//! let settings = Settings::load("production")?;
//! println!("RPC URL: {}", settings.rpc.url);
//! ```

mod settings;

pub use settings::{
    ApiSettings, ChainSettings, CoordinatorSettings, ContractSettings, HubSettings,
    LoggingSettings, MetricsSettings, ModelSettings, Settings,
};
