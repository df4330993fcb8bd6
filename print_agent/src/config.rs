use std::{env, path::PathBuf, time::Duration};

use dpa_common::{helpers::parse_boolean_flag, Secret, VendorId};
use log::*;
use woo_tools::WooConfig;

use crate::errors::AgentError;

pub const DEFAULT_CHECK_INTERVAL_SECS: i64 = 60;
pub const MIN_CHECK_INTERVAL_SECS: i64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HISTORY_SIZE: usize = 100;
const DEFAULT_PRINTER_ID: &str = "default";
const DEFAULT_DATA_DIR: &str = "./data";
const LEDGER_FILE: &str = "processed_orders.json";
const HISTORY_FILE: &str = "history.json";
const SPOOL_DIR: &str = "spool";

#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// The base url of the store, e.g. "https://market.example".
    pub api_url: String,
    pub username: String,
    pub password: Secret<String>,
    /// The vendor whose orders are printed. When empty, the agent tries to work it out from the credentials.
    pub vendor_id: VendorId,
    /// Seconds between polls. Use [`AgentConfig::poll_interval`] rather than reading this directly.
    pub check_interval: i64,
    pub printer_id: String,
    /// Where the processed-order ledger, the order history and the print spool live.
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
    pub history_size: usize,
    /// Skip the connection check on start-up.
    pub skip_preflight: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_url: String::default(),
            username: String::default(),
            password: Secret::default(),
            vendor_id: VendorId::default(),
            check_interval: DEFAULT_CHECK_INTERVAL_SECS,
            printer_id: DEFAULT_PRINTER_ID.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            history_size: DEFAULT_HISTORY_SIZE,
            skip_preflight: false,
        }
    }
}

impl AgentConfig {
    pub fn new(api_url: &str, username: &str, password: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            username: username.to_string(),
            password: Secret::new(password.to_string()),
            ..Default::default()
        }
    }

    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any `DPA_*` variable source. Missing or invalid values are logged and replaced by
    /// their defaults; missing credentials are left empty and caught by [`AgentConfig::validate_credentials`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let get = |name: &str| lookup(name).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let api_url = get("DPA_API_URL").unwrap_or_else(|| {
            error!("🪛️ DPA_API_URL is not set. Please set it to the base URL of your store.");
            String::default()
        });
        let username = get("DPA_USERNAME").unwrap_or_else(|| {
            error!("🪛️ DPA_USERNAME is not set. Please set it to the store account used for the API.");
            String::default()
        });
        let password = Secret::new(get("DPA_PASSWORD").unwrap_or_else(|| {
            error!("🪛️ DPA_PASSWORD is not set. Please set it to the API (application) password.");
            String::default()
        }));
        let vendor_id = get("DPA_VENDOR_ID").map(VendorId::from).unwrap_or_else(|| {
            info!("🪛️ DPA_VENDOR_ID is not set. The agent will try to detect the vendor from the store credentials.");
            VendorId::default()
        });
        let check_interval = get("DPA_CHECK_INTERVAL")
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for DPA_CHECK_INTERVAL. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS);
        let printer_id = get("DPA_PRINTER_ID").unwrap_or_else(|| {
            warn!("🪛️ DPA_PRINTER_ID is not set, using '{DEFAULT_PRINTER_ID}'");
            DEFAULT_PRINTER_ID.to_string()
        });
        let data_dir = get("DPA_DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
            info!("🪛️ DPA_DATA_DIR is not set. Using {DEFAULT_DATA_DIR}");
            PathBuf::from(DEFAULT_DATA_DIR)
        });
        let request_timeout = get("DPA_REQUEST_TIMEOUT")
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for DPA_REQUEST_TIMEOUT. {e}"))
                    .ok()
            })
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        let history_size = get("DPA_HISTORY_SIZE")
            .and_then(|s| {
                s.parse::<usize>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for DPA_HISTORY_SIZE. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_HISTORY_SIZE);
        let skip_preflight = parse_boolean_flag(get("DPA_SKIP_PREFLIGHT"), false);
        Self {
            api_url,
            username,
            password,
            vendor_id,
            check_interval,
            printer_id,
            data_dir,
            request_timeout,
            history_size,
            skip_preflight,
        }
    }

    /// Fails fast, before any network call, if the store credentials are incomplete.
    pub fn validate_credentials(&self) -> Result<(), AgentError> {
        self.woo_config().validate().map_err(|e| AgentError::ConfigurationError(e.to_string()))
    }

    /// The effective polling period. Non-positive values fall back to the default and anything below the minimum is
    /// raised to it.
    pub fn poll_interval(&self) -> Duration {
        let secs = match self.check_interval {
            s if s <= 0 => DEFAULT_CHECK_INTERVAL_SECS,
            s if s < MIN_CHECK_INTERVAL_SECS => {
                warn!("🪛️ Check interval of {s}s is too short. Using {MIN_CHECK_INTERVAL_SECS}s instead.");
                MIN_CHECK_INTERVAL_SECS
            },
            s => s,
        };
        Duration::from_secs(secs.unsigned_abs())
    }

    pub fn woo_config(&self) -> WooConfig {
        WooConfig {
            api_url: self.api_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            request_timeout: self.request_timeout,
        }
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn spool_dir(&self) -> PathBuf {
        self.data_dir.join(SPOOL_DIR)
    }
}
