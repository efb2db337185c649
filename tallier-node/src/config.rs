//! Tallier process configuration (spec §10): a typed settings struct populated from a layered
//! source — a config file overlaid by CLI flags/environment variables, in the style this corpus
//! uses for its services (`config` + `clap`, e.g. `NillionNetwork-nilvm`'s `node_config::Config`).
//! Per-election parameters (`D`, `p`, candidates, …) are not here; they live in the election
//! record and arrive at runtime through the persistence layer.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

/// CLI entry point: the only required argument is the path to a settings file; every field in
/// it can also be supplied as an environment variable (`TALLIER_<FIELD>`), which `clap`'s `env`
/// attribute resolves before the file is even read for the path itself.
#[derive(Parser, Debug)]
#[command(name = "tallierd", about = "A tallier process in a secure-voting clique")]
pub struct Cli {
    /// Path to this tallier's settings file (TOML/JSON/YAML; format is sniffed by extension).
    #[arg(long, env = "TALLIER_CONFIG")]
    pub config: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub ca_path: PathBuf,
    /// The logical peer name presented during TLS verification (spec §10: peers are addressed
    /// by IP, so hostname checking is relaxed to one fixed name shared by every tallier).
    pub peer_domain: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> LogSettings {
        LogSettings {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Connection parameters for the store the orchestrator talks to. Opaque to the core (spec §6);
/// this process only needs enough to dial it, not to interpret its schema.
#[derive(Clone, Debug, Deserialize)]
pub struct PersistenceSettings {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub self_id: u8,
    pub listen_addr: SocketAddr,
    pub tls: TlsSettings,
    pub persistence: PersistenceSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl Settings {
    /// Load settings from `path`, overlaid by any `TALLIER__<SECTION>__<FIELD>` environment
    /// variable (double underscores delimit nested fields, mirroring this corpus's own
    /// `node-config` loader).
    pub fn load(path: PathBuf) -> Result<Settings, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("TALLIER").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_toml(toml: &str) -> Settings {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn log_defaults_apply_when_the_section_is_absent() {
        let settings = load_toml(
            r#"
            self_id = 0
            listen_addr = "127.0.0.1:9000"

            [tls]
            cert_path = "cert.pem"
            key_path = "key.pem"
            ca_path = "ca.pem"
            peer_domain = "tallier.local"

            [persistence]
            url = "postgres://localhost/tallier"
            "#,
        );
        assert_eq!(settings.self_id, 0);
        assert_eq!(settings.log.level, "info");
        assert!(!settings.log.json);
    }

    #[test]
    fn an_explicit_log_section_overrides_the_defaults() {
        let settings = load_toml(
            r#"
            self_id = 2
            listen_addr = "0.0.0.0:9443"

            [tls]
            cert_path = "cert.pem"
            key_path = "key.pem"
            ca_path = "ca.pem"
            peer_domain = "tallier.local"

            [persistence]
            url = "postgres://localhost/tallier"

            [log]
            level = "debug"
            json = true
            "#,
        );
        assert_eq!(settings.self_id, 2);
        assert_eq!(settings.log.level, "debug");
        assert!(settings.log.json);
    }
}
