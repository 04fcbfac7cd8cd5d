use std::{env, net::IpAddr};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_LISTEN_IP: &str = "0.0.0.0";
const DEFAULT_LISTEN_PORT: u16 = 8080;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub listen_ip: IpAddr,
    pub listen_port: u16,
}

impl Settings {
    /// Defaults, overlaid by an optional `config/<RUN_MODE>` file, overlaid
    /// by `EXPORTER_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "default".into());

        let builder = Config::builder()
            .set_default("listen_ip", DEFAULT_LISTEN_IP.to_string())?
            .set_default("listen_port", DEFAULT_LISTEN_PORT.to_string())?
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("exporter"))
            .build()?;

        builder.try_deserialize()
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn Settings__new__defaults_without_config_file() {
        let settings = Settings::new().unwrap();
        assert_eq!(settings.listen_ip.to_string(), DEFAULT_LISTEN_IP);
        assert_eq!(settings.listen_port, DEFAULT_LISTEN_PORT);
    }
}
