//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();

        assert!(config.gateway.store.is_none());
        assert!(config.gateway.interfaces.is_empty());
        assert!(config.probe.host.is_none());
        assert!(config.monitor.config_interval.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [gateway]
            store = "~/profiles.json"
            addressing = "legacy"
            interfaces = ["eth0", "eth1"]

            [link]
            resolv_conf = "/tmp/resolv.conf"
            lease_dir = ""

            [probe]
            host = "example.com"
            port = 443
            timeout_ms = 750

            [monitor]
            config_interval = 3
            probe_interval = 15
        "#;

        let config = TomlConfig::parse(toml).unwrap();

        assert_eq!(config.gateway.store.as_deref(), Some("~/profiles.json"));
        assert_eq!(config.gateway.addressing.as_deref(), Some("legacy"));
        assert_eq!(config.gateway.interfaces, vec!["eth0", "eth1"]);
        assert_eq!(config.link.resolv_conf.as_deref(), Some("/tmp/resolv.conf"));
        assert_eq!(config.link.lease_dir.as_deref(), Some(""));
        assert_eq!(config.probe.host.as_deref(), Some("example.com"));
        assert_eq!(config.probe.port, Some(443));
        assert_eq!(config.probe.timeout_ms, Some(750));
        assert_eq!(config.monitor.config_interval, Some(3));
        assert_eq!(config.monitor.probe_interval, Some(15));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let toml = r#"
            [probe]
            hostname = "example.com"
        "#;

        assert!(TomlConfig::parse(toml).is_err());
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(TomlConfig::parse("[proxy]\nhost = \"x\"").is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(TomlConfig::parse("[probe]\nport = \"eighty\"").is_err());
    }
}

mod loading {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[monitor]\nprobe_interval = 9").unwrap();

        let config = TomlConfig::load(file.path()).unwrap();

        assert_eq!(config.monitor.probe_interval, Some(9));
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = TomlConfig::load(std::path::Path::new("/nonexistent/ethcfg.toml"));

        assert!(matches!(
            result,
            Err(crate::config::ConfigError::FileRead { .. })
        ));
    }
}

mod template {
    use super::*;

    #[test]
    fn template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(config.monitor.config_interval, Some(2));
        assert_eq!(config.monitor.probe_interval, Some(5));
    }

    #[test]
    fn template_documents_every_section() {
        let template = default_config_template();

        for section in ["[gateway]", "[link]", "[probe]", "[monitor]"] {
            assert!(template.contains(section), "missing {section}");
        }
    }
}
