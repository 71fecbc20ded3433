use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub business_rules: BusinessRules,
    pub submission: SubmissionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Orders above this subtotal (cents) ship free at checkout.
    pub free_shipping_threshold_cents: i64,
    /// Flat tax applied to the subtotal at checkout; omit for none.
    #[serde(default)]
    pub tax_rate: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    #[serde(default = "default_phase_timeout")]
    pub phase_timeout_seconds: u64,
}

fn default_phase_timeout() -> u64 {
    10
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `BAZAAR_SUBMISSION__PHASE_TIMEOUT_SECONDS=5`
            .add_source(config::Environment::with_prefix("BAZAAR").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
