//! Tests for validated configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::gateway::Addressing;

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, write_default_config};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["ethcfg"];
    full_args.extend(args);
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod default_values {
    use super::*;
    use crate::config::defaults;

    #[test]
    fn empty_input_uses_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(config.store_path, defaults::store_path());
        assert_eq!(config.addressing, Addressing::PerInterface);
        assert!(config.interfaces.is_empty());
        assert_eq!(config.probe.target().host, "www.google.com");
        assert_eq!(config.probe.target().port, 80);
        assert_eq!(config.probe.timeout(), Duration::from_millis(2000));
        assert_eq!(config.config_interval, Duration::from_secs(2));
        assert_eq!(config.probe_interval, Duration::from_secs(5));
        assert_eq!(
            config.link_paths.resolv_conf,
            PathBuf::from(defaults::RESOLV_CONF)
        );
        assert!(!config.verbose);
    }

    #[test]
    fn display_summarizes() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();
        let text = config.to_string();

        assert!(text.contains("addressing: per-interface"));
        assert!(text.contains("interfaces: discover"));
        assert!(text.contains("www.google.com:80"));
    }
}

mod precedence {
    use super::*;

    #[test]
    fn cli_overrides_toml() {
        let toml = toml(
            r#"
            [gateway]
            store = "/toml/profiles.json"
            interfaces = ["eth9"]

            [probe]
            host = "toml.example.com"
            timeout_ms = 900

            [monitor]
            config_interval = 30
        "#,
        );
        let cli = cli(&[
            "--store",
            "/cli/profiles.json",
            "--manage",
            "eth0",
            "--probe-host",
            "cli.example.com",
            "--config-interval",
            "7",
        ]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.store_path, PathBuf::from("/cli/profiles.json"));
        assert_eq!(config.interfaces, vec!["eth0"]);
        assert_eq!(config.probe.target().host, "cli.example.com");
        assert_eq!(config.probe.timeout(), Duration::from_millis(900));
        assert_eq!(config.config_interval, Duration::from_secs(7));
    }

    #[test]
    fn toml_overrides_defaults() {
        let toml = toml(
            r#"
            [gateway]
            addressing = "legacy"
            interfaces = ["eth0", "eth1", "eth0"]

            [link]
            resolv_conf = "/tmp/resolv.conf"
            lease_dir = ""

            [probe]
            port = 443

            [monitor]
            probe_interval = 60
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.addressing, Addressing::Legacy);
        assert_eq!(config.interfaces, vec!["eth0", "eth1"]);
        assert_eq!(
            config.link_paths.resolv_conf,
            PathBuf::from("/tmp/resolv.conf")
        );
        assert_eq!(config.link_paths.lease_dir, None);
        assert_eq!(config.probe.target().port, 443);
        assert_eq!(config.probe_interval, Duration::from_secs(60));
    }

    #[test]
    fn legacy_flag_enables_legacy() {
        let config = ValidatedConfig::from_raw(&cli(&["--legacy-addressing"]), None).unwrap();

        assert_eq!(config.addressing, Addressing::Legacy);
    }

    #[test]
    fn toml_legacy_survives_without_flag() {
        let toml = toml("[gateway]\naddressing = \"legacy\"");

        let config = ValidatedConfig::from_raw(&cli(&["list"]), Some(&toml)).unwrap();

        assert_eq!(config.addressing, Addressing::Legacy);
    }

    #[test]
    fn home_is_expanded_in_store_path() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let toml = toml("[gateway]\nstore = \"~/ethcfg/profiles.json\"");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.store_path, home.join("ethcfg/profiles.json"));
    }
}

mod validation {
    use super::*;

    #[test]
    fn zero_config_interval_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--config-interval", "0"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "config_interval",
                ..
            })
        ));
    }

    #[test]
    fn zero_probe_interval_rejected() {
        let toml = toml("[monitor]\nprobe_interval = 0");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "probe_interval",
                ..
            })
        ));
    }

    #[test]
    fn zero_probe_timeout_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--probe-timeout", "0"]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "probe_timeout",
                ..
            })
        ));
    }

    #[test]
    fn empty_probe_host_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--probe-host", "  "]), None);

        assert!(matches!(result, Err(ConfigError::InvalidProbeTarget { .. })));
    }

    #[test]
    fn zero_probe_port_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--probe-port", "0"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidProbeTarget { .. })));
    }

    #[test]
    fn unknown_addressing_rejected() {
        let toml = toml("[gateway]\naddressing = \"sometimes\"");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidAddressing { value }) if value == "sometimes"
        ));
    }

    #[test]
    fn malformed_interface_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--manage", "eth 0"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidInterface { .. })));
    }
}

mod loading {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn load_reads_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[probe]\nhost = \"file.example.com\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ValidatedConfig::load(&cli(&["--config", &path])).unwrap();

        assert_eq!(config.probe.target().host, "file.example.com");
    }

    #[test]
    fn load_without_config_file() {
        let config = ValidatedConfig::load(&cli(&[])).unwrap();

        assert_eq!(config.probe_interval, Duration::from_secs(5));
    }

    #[test]
    fn load_missing_file_fails() {
        let result = ValidatedConfig::load(&cli(&["--config", "/nonexistent/ethcfg.toml"]));

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn load_invalid_toml_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[probe\nhost =").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let result = ValidatedConfig::load(&cli(&["--config", &path]));

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn written_template_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ethcfg.toml");

        write_default_config(&path).unwrap();
        let config =
            ValidatedConfig::load(&cli(&["--config", path.to_str().unwrap()])).unwrap();

        assert_eq!(config.config_interval, Duration::from_secs(2));
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("ethcfg.toml");

        let result = write_default_config(&path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}
