//! Configuration management

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub mqtt: Option<MqttConfig>,
}

fn default_port() -> u16 {
    8080
}

/// Broker the zigbee2mqtt bridge publishes to
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_base_topic")]
    pub base_topic: String,
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_base_topic() -> String {
    "zigbee2mqtt".to_string()
}

const APP_DIR_NAME: &str = "zigbee-dashboard";

/// Get config directory (XDG_CONFIG_HOME or platform default)
pub fn get_config_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("ZD_CONFIG_DIR") {
        return std::path::PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return std::path::PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Ok(home) = std::env::var("HOME") {
            return std::path::PathBuf::from(home)
                .join(".config")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return std::path::PathBuf::from(appdata).join(APP_DIR_NAME);
        }
    }

    std::path::PathBuf::from(".")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let mut builder = ::config::Config::builder()
        .set_default("port", 8080)?
        // Optional config.{toml,json,yaml} in the config dir
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // ZD_PORT, ZD_MQTT__HOST, ZD_MQTT__BASE_TOPIC, ...
        .add_source(
            ::config::Environment::with_prefix("ZD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    // Precedence: ZD_PORT > PORT > config > default
    if std::env::var("ZD_PORT").is_err() {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder.set_override("port", port_num as i64)?;
            }
        }
    }

    let config = builder.build()?;

    Ok(config.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for key in [
            "ZD_PORT",
            "PORT",
            "ZD_MQTT__HOST",
            "ZD_MQTT__PORT",
            "ZD_MQTT__BASE_TOPIC",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        clear_env();
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        env::set_var("ZD_CONFIG_DIR", temp_dir.path());

        let config = load_config().expect("config should load");

        env::remove_var("ZD_CONFIG_DIR");

        assert_eq!(config.port, 8080);
        assert!(config.mqtt.is_none());
    }

    #[test]
    #[serial]
    fn test_mqtt_host_env_enables_mqtt() {
        clear_env();
        env::set_var("ZD_CONFIG_DIR", "/tmp/zd-test-nonexistent");
        env::set_var("ZD_MQTT__HOST", "broker.local");

        let config = load_config().expect("config should load");

        env::remove_var("ZD_MQTT__HOST");
        env::remove_var("ZD_CONFIG_DIR");

        let mqtt = config.mqtt.expect("mqtt should be configured");
        assert_eq!(mqtt.host, "broker.local");
        assert_eq!(mqtt.port, 1883);
        assert_eq!(mqtt.base_topic, "zigbee2mqtt");
        assert!(mqtt.username.is_none());
    }

    #[test]
    #[serial]
    fn test_nested_mqtt_env_keys_use_single_prefix_underscore() {
        clear_env();
        env::set_var("ZD_CONFIG_DIR", "/tmp/zd-test-nonexistent");
        env::set_var("ZD_MQTT__HOST", "single.local");
        env::set_var("ZD_MQTT__PORT", "1884");
        env::set_var("ZD_MQTT__BASE_TOPIC", "z2m");

        let config = load_config().expect("config should load");

        clear_env();
        env::remove_var("ZD_CONFIG_DIR");

        let mqtt = config.mqtt.expect("ZD_MQTT__HOST should configure mqtt");
        assert_eq!(mqtt.host, "single.local");
        assert_eq!(mqtt.port, 1884);
        assert_eq!(mqtt.base_topic, "z2m");
    }

    #[test]
    #[serial]
    fn test_config_file_is_read() {
        clear_env();
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            temp_dir.path().join("config.toml"),
            "port = 9090\n\n[mqtt]\nhost = \"10.0.0.2\"\nbase_topic = \"z2m\"\n",
        )
        .expect("write config");
        env::set_var("ZD_CONFIG_DIR", temp_dir.path());

        let config = load_config().expect("config should load");

        env::remove_var("ZD_CONFIG_DIR");

        assert_eq!(config.port, 9090);
        let mqtt = config.mqtt.expect("mqtt from file");
        assert_eq!(mqtt.host, "10.0.0.2");
        assert_eq!(mqtt.base_topic, "z2m");
    }

    #[test]
    #[serial]
    fn test_port_env_fallback() {
        clear_env();
        env::set_var("ZD_CONFIG_DIR", "/tmp/zd-test-nonexistent");
        env::set_var("PORT", "3000");

        let config = load_config().expect("config should load");

        env::remove_var("PORT");
        env::remove_var("ZD_CONFIG_DIR");

        assert_eq!(config.port, 3000, "PORT env var should set config.port");
    }

    #[test]
    #[serial]
    fn test_zd_port_takes_precedence_over_port() {
        clear_env();
        env::set_var("ZD_CONFIG_DIR", "/tmp/zd-test-nonexistent");
        env::set_var("ZD_PORT", "5000");
        env::set_var("PORT", "3000");

        let config = load_config().expect("config should load");

        clear_env();
        env::remove_var("ZD_CONFIG_DIR");

        assert_eq!(config.port, 5000, "ZD_PORT should take precedence over PORT");
    }

    #[test]
    #[serial]
    fn test_invalid_port_uses_default() {
        clear_env();
        env::set_var("ZD_CONFIG_DIR", "/tmp/zd-test-nonexistent");
        env::set_var("PORT", "not-a-number");

        let config = load_config().expect("config should load");

        env::remove_var("PORT");
        env::remove_var("ZD_CONFIG_DIR");

        assert_eq!(config.port, 8080, "Invalid PORT should fall back to default");
    }

    #[test]
    #[serial]
    fn test_config_dir_override() {
        env::set_var("ZD_CONFIG_DIR", "/srv/zd");
        let dir = get_config_dir();
        env::remove_var("ZD_CONFIG_DIR");
        assert_eq!(dir, std::path::PathBuf::from("/srv/zd"));
    }
}
