//! Run configuration for the harness.
//!
//! A [`HarnessConfig`] is built once per run from an optional TOML file plus
//! command-line overrides, validated, and then only ever handed out by shared
//! reference. It is the single source of truth for how the server and every
//! client are invoked:
//!
//! - [`HarnessConfig`] - Root configuration (endpoint, content root, commands)
//! - [`FixtureConfig`] - Which files in the content root become clients
//! - [`ReadinessConfig`] - How the server is probed before clients launch
//! - [`ShutdownConfig`] - Settle delay and server exit escalation
//! - [`LogConfig`] - Optional capture of child output

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::error::{HarnessError, Result};
use crate::reliability::retry::RetryConfig;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent the run.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Which server variant the configured arguments describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerVariant {
    /// Serves one connection at a time; receives no client limit.
    Iterative,
    /// Readiness-driven event loop bounded by `max_clients`.
    Multiplexed { max_clients: u16 },
}

impl std::fmt::Display for ServerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iterative => write!(f, "iterative"),
            Self::Multiplexed { max_clients } => write!(f, "multiplexed (max {max_clients})"),
        }
    }
}

/// xferload.toml configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarnessConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,
    #[serde(default = "default_max_transfer_size")]
    pub max_transfer_size: u64,
    /// Present only for the multiplexed server.
    #[serde(default)]
    pub max_clients: Option<u16>,
    /// Server argv prefix; positional arguments are appended.
    #[serde(default)]
    pub server: Vec<String>,
    /// Client argv prefix; positional arguments are appended.
    #[serde(default)]
    pub client: Vec<String>,
    #[serde(default)]
    pub fixtures: FixtureConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    #[serde(default)]
    pub logs: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FixtureConfig {
    /// File extension without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// Connect to the server port until it accepts.
    Tcp,
    /// Launch clients immediately after spawning the server.
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_probe_kind")]
    pub probe: ProbeKind,
    #[serde(default = "default_probe_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_probe_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_probe_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_probe_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShutdownConfig {
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// 0 waits for the server indefinitely.
    #[serde(default = "default_exit_timeout_ms")]
    pub exit_timeout_ms: u64,
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LogConfig {
    /// Directory receiving one log file per child; stdio is inherited when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_address() -> String {
    constants::DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    constants::DEFAULT_PORT
}

fn default_content_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_transfer_size() -> u64 {
    constants::DEFAULT_MAX_TRANSFER_SIZE
}

fn default_extension() -> String {
    constants::DEFAULT_FIXTURE_EXTENSION.to_string()
}

fn default_probe_kind() -> ProbeKind {
    ProbeKind::Tcp
}

fn default_probe_max_retries() -> u32 {
    constants::DEFAULT_PROBE_MAX_RETRIES
}

fn default_probe_initial_delay_ms() -> u64 {
    constants::DEFAULT_PROBE_INITIAL_DELAY_MS
}

fn default_probe_max_delay_ms() -> u64 {
    constants::DEFAULT_PROBE_MAX_DELAY_MS
}

fn default_probe_connect_timeout_ms() -> u64 {
    constants::DEFAULT_PROBE_CONNECT_TIMEOUT_MS
}

fn default_settle_ms() -> u64 {
    constants::DEFAULT_SETTLE_MS
}

fn default_exit_timeout_ms() -> u64 {
    constants::DEFAULT_EXIT_TIMEOUT_MS
}

fn default_stop_grace_ms() -> u64 {
    constants::DEFAULT_STOP_GRACE_MS
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            probe: default_probe_kind(),
            max_retries: default_probe_max_retries(),
            initial_delay_ms: default_probe_initial_delay_ms(),
            max_delay_ms: default_probe_max_delay_ms(),
            connect_timeout_ms: default_probe_connect_timeout_ms(),
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            exit_timeout_ms: default_exit_timeout_ms(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            content_root: default_content_root(),
            max_transfer_size: default_max_transfer_size(),
            max_clients: None,
            server: Vec::new(),
            client: Vec::new(),
            fixtures: FixtureConfig::default(),
            readiness: ReadinessConfig::default(),
            shutdown: ShutdownConfig::default(),
            logs: LogConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub content_root: Option<PathBuf>,
    pub max_transfer_size: Option<u64>,
    pub max_clients: Option<u16>,
    pub server: Option<Vec<String>>,
    pub client: Option<Vec<String>>,
    pub extension: Option<String>,
    pub settle_ms: Option<u64>,
    pub exit_timeout_ms: Option<u64>,
    pub no_readiness: bool,
    pub logs_dir: Option<PathBuf>,
}

/// Timing of the shutdown sequence, derived from [`ShutdownConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownPolicy {
    pub settle: Duration,
    /// `None` joins the server without a deadline.
    pub exit_timeout: Option<Duration>,
    pub stop_grace: Duration,
}

impl HarnessConfig {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] if the file cannot be read or
    /// contains invalid TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HarnessError::config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            HarnessError::config(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Load and override the configuration without validating it.
    ///
    /// With no explicit path, `xferload.toml` in the working directory is used
    /// when it exists; otherwise defaults apply. Returns the normalization
    /// warnings alongside the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] if an existing file cannot be loaded.
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<(Self, Vec<String>)> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None if Path::new(constants::DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from(constants::DEFAULT_CONFIG_FILE)?
            },
            None => Self::default(),
        };

        config.apply(overrides);
        let warnings = config.normalize();
        Ok((config, warnings))
    }

    /// Resolve, override, normalize and validate the configuration for a run.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when loading or validation fails.
    pub fn build(path: Option<&Path>, overrides: ConfigOverrides) -> Result<(Self, ValidationResult)> {
        let (config, mut warnings) = Self::resolve(path, overrides)?;
        let mut result = config.validate()?;
        warnings.append(&mut result.warnings);

        Ok((config, ValidationResult { warnings }))
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(address) = overrides.address {
            self.address = address;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(root) = overrides.content_root {
            self.content_root = root;
        }
        if let Some(size) = overrides.max_transfer_size {
            self.max_transfer_size = size;
        }
        if let Some(max_clients) = overrides.max_clients {
            self.max_clients = Some(max_clients);
        }
        if let Some(server) = overrides.server {
            self.server = server;
        }
        if let Some(client) = overrides.client {
            self.client = client;
        }
        if let Some(extension) = overrides.extension {
            self.fixtures.extension = extension;
        }
        if let Some(settle_ms) = overrides.settle_ms {
            self.shutdown.settle_ms = settle_ms;
        }
        if let Some(exit_timeout_ms) = overrides.exit_timeout_ms {
            self.shutdown.exit_timeout_ms = exit_timeout_ms;
        }
        if overrides.no_readiness {
            self.readiness.probe = ProbeKind::None;
        }
        if let Some(dir) = overrides.logs_dir {
            self.logs.dir = Some(dir);
        }
    }

    /// Strip a leading dot from the fixture extension.
    fn normalize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(stripped) = self.fixtures.extension.strip_prefix('.') {
            warnings.push(format!(
                "fixture extension '{}' has a leading dot, using '{stripped}'",
                self.fixtures.extension
            ));
            self.fixtures.extension = stripped.to_string();
        }
        warnings
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] listing every problem found:
    /// - Empty server or client command
    /// - Address that is not an IP address, port 0
    /// - Zero `max_transfer_size` or `max_clients`
    /// - Empty or path-like fixture extension
    /// - Missing or non-directory content root
    /// - Zero readiness retries when probing is enabled
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Executables
        if self.server.first().is_none_or(String::is_empty) {
            errors.push("server command cannot be empty".to_string());
        }
        if self.client.first().is_none_or(String::is_empty) {
            errors.push("client command cannot be empty".to_string());
        }

        // 2. Endpoint
        if self.address.parse::<IpAddr>().is_err() {
            errors.push(format!(
                "address '{}' is not a valid IP address",
                self.address
            ));
        }
        if self.port == 0 {
            errors.push("port cannot be 0. Use a valid port number (1-65535)".to_string());
        } else if self.port < 1024 {
            warnings.push(format!(
                "port {} is a system/privileged port (< 1024)",
                self.port
            ));
        }

        // 3. Transfer parameters
        if self.max_transfer_size == 0 {
            errors.push("max_transfer_size cannot be 0".to_string());
        }
        if self.max_clients == Some(0) {
            errors.push("max_clients cannot be 0 (omit it for the iterative server)".to_string());
        }

        // 4. Fixtures
        let ext = &self.fixtures.extension;
        if ext.is_empty() {
            errors.push("fixture extension cannot be empty".to_string());
        } else if ext.contains('/') || ext.contains('\\') {
            errors.push(format!(
                "fixture extension '{ext}' cannot contain a path separator"
            ));
        }

        // 5. Content root
        if !self.content_root.exists() {
            errors.push(format!(
                "content root does not exist: {}",
                self.content_root.display()
            ));
        } else if !self.content_root.is_dir() {
            errors.push(format!(
                "content root is not a directory: {}",
                self.content_root.display()
            ));
        }

        // 6. Readiness
        if self.readiness.probe == ProbeKind::Tcp && self.readiness.max_retries == 0 {
            errors.push("readiness.max_retries cannot be 0 when probing is enabled".to_string());
        }

        if !errors.is_empty() {
            return Err(HarnessError::config(format!(
                "validation failed:\n  - {}",
                errors.join("\n  - ")
            )));
        }

        Ok(ValidationResult { warnings })
    }

    #[must_use]
    pub const fn server_variant(&self) -> ServerVariant {
        match self.max_clients {
            Some(max_clients) => ServerVariant::Multiplexed { max_clients },
            None => ServerVariant::Iterative,
        }
    }

    /// Positional server arguments: address, port, content root, [max clients].
    #[must_use]
    pub fn server_args(&self) -> Vec<String> {
        let mut args = vec![
            self.address.clone(),
            self.port.to_string(),
            self.content_root.to_string_lossy().into_owned(),
        ];
        if let Some(max_clients) = self.max_clients {
            args.push(max_clients.to_string());
        }
        args
    }

    /// Positional client arguments: address, port, file name, max transfer size.
    #[must_use]
    pub fn client_args(&self, file_name: &str) -> Vec<String> {
        vec![
            self.address.clone(),
            self.port.to_string(),
            file_name.to_string(),
            self.max_transfer_size.to_string(),
        ]
    }

    /// Socket the readiness probe connects to.
    ///
    /// Wildcard bind addresses are probed through the loopback interface of
    /// the same family.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] if `address` is not an IP address.
    pub fn probe_target(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .address
            .parse()
            .map_err(|_| HarnessError::config(format!("invalid address '{}'", self.address)))?;

        let ip = match ip {
            IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            other => other,
        };

        Ok(SocketAddr::new(ip, self.port))
    }

    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::from(&self.readiness)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness.connect_timeout_ms)
    }

    #[must_use]
    pub const fn shutdown_policy(&self) -> ShutdownPolicy {
        ShutdownPolicy {
            settle: Duration::from_millis(self.shutdown.settle_ms),
            exit_timeout: match self.shutdown.exit_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            stop_grace: Duration::from_millis(self.shutdown.stop_grace_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_config(root: &Path) -> HarnessConfig {
        HarnessConfig {
            content_root: root.to_path_buf(),
            server: vec!["build/multiplex_server.o".to_string()],
            client: vec!["build/client.o".to_string()],
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml_str = r#"
server = ["build/iterative_server.o"]
client = ["build/client.o"]
"#;
        let config: HarnessConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.address, constants::DEFAULT_ADDRESS);
        assert_eq!(config.port, constants::DEFAULT_PORT);
        assert_eq!(config.max_transfer_size, constants::DEFAULT_MAX_TRANSFER_SIZE);
        assert_eq!(config.max_clients, None);
        assert_eq!(config.fixtures.extension, "pdf");
        assert_eq!(config.readiness.probe, ProbeKind::Tcp);
        assert_eq!(config.shutdown.settle_ms, 1000);
        assert!(config.logs.dir.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
address = "127.0.0.1"
port = 55002
content_root = "/srv/books"
max_transfer_size = 4096
max_clients = 100
server = ["build/multiplex_server.o"]
client = ["sh", "-c", "exec build/client.o \"$@\"", "client"]

[fixtures]
extension = "txt"

[readiness]
probe = "none"
max_retries = 3

[shutdown]
settle_ms = 10
exit_timeout_ms = 0
stop_grace_ms = 100

[logs]
dir = "target/logs"
"#;
        let config: HarnessConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.port, 55002);
        assert_eq!(config.max_clients, Some(100));
        assert_eq!(config.client.len(), 4);
        assert_eq!(config.fixtures.extension, "txt");
        assert_eq!(config.readiness.probe, ProbeKind::None);
        assert_eq!(config.readiness.max_retries, 3);
        assert_eq!(
            config.readiness.initial_delay_ms,
            constants::DEFAULT_PROBE_INITIAL_DELAY_MS
        );
        assert_eq!(config.shutdown_policy().exit_timeout, None);
        assert_eq!(config.logs.dir, Some(PathBuf::from("target/logs")));
    }

    #[test]
    fn test_validate_valid_config() {
        let dir = tempdir().unwrap();
        let result = valid_config(dir.path()).validate().unwrap();
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_missing_content_root() {
        let dir = tempdir().unwrap();
        let config = valid_config(&dir.path().join("nope"));
        let err = config.validate().unwrap_err();
        assert!(err.is_pre_launch());
        assert!(err.to_string().contains("content root does not exist"));
    }

    #[test]
    fn test_validate_content_root_not_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("book.pdf");
        fs::write(&file, b"%PDF").unwrap();

        let err = valid_config(&file).validate().unwrap_err().to_string();
        assert!(err.contains("not a directory"));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let dir = tempdir().unwrap();
        let config = HarnessConfig {
            address: "localhost:1".to_string(),
            port: 0,
            max_transfer_size: 0,
            max_clients: Some(0),
            content_root: dir.path().to_path_buf(),
            ..HarnessConfig::default()
        };

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server command"));
        assert!(err.contains("client command"));
        assert!(err.contains("not a valid IP address"));
        assert!(err.contains("port cannot be 0"));
        assert!(err.contains("max_transfer_size"));
        assert!(err.contains("max_clients"));
    }

    #[test]
    fn test_validate_privileged_port_warns() {
        let dir = tempdir().unwrap();
        let config = HarnessConfig {
            port: 80,
            ..valid_config(dir.path())
        };
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
        assert!(result.warnings[0].contains("privileged"));
    }

    #[test]
    fn test_validate_extension_with_separator() {
        let dir = tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.fixtures.extension = "a/pdf".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("path separator"));
    }

    #[test]
    fn test_build_applies_overrides_and_normalizes() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("xferload.toml");
        fs::write(
            &config_path,
            r#"
port = 6000
server = ["server-bin"]
client = ["client-bin"]
"#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            port: Some(7000),
            content_root: Some(dir.path().to_path_buf()),
            max_clients: Some(8),
            extension: Some(".txt".to_string()),
            no_readiness: true,
            ..ConfigOverrides::default()
        };

        let (config, validation) = HarnessConfig::build(Some(&config_path), overrides).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.fixtures.extension, "txt");
        assert_eq!(config.readiness.probe, ProbeKind::None);
        assert_eq!(
            config.server_variant(),
            ServerVariant::Multiplexed { max_clients: 8 }
        );
        assert!(validation.warnings.iter().any(|w| w.contains("leading dot")));
    }

    #[test]
    fn test_resolve_does_not_validate() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("xferload.toml");
        fs::write(&config_path, "content_root = \"/does/not/exist\"\n").unwrap();

        let (config, warnings) =
            HarnessConfig::resolve(Some(&config_path), ConfigOverrides::default()).unwrap();
        assert!(config.server.is_empty());
        assert!(warnings.is_empty());
        assert!(HarnessConfig::build(Some(&config_path), ConfigOverrides::default()).is_err());
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("bad.toml");
        fs::write(&config_path, "port = \"not a number").unwrap();

        let err = HarnessConfig::load_from(&config_path).unwrap_err().to_string();
        assert!(err.contains("failed to parse config file"));
    }

    #[test]
    fn test_server_args_by_variant() {
        let dir = tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.address = "127.0.0.1".to_string();
        config.port = 55002;

        let iterative = config.server_args();
        assert_eq!(iterative.len(), 3);
        assert_eq!(iterative[0], "127.0.0.1");
        assert_eq!(iterative[1], "55002");
        assert_eq!(config.server_variant(), ServerVariant::Iterative);

        config.max_clients = Some(100);
        let multiplexed = config.server_args();
        assert_eq!(multiplexed.len(), 4);
        assert_eq!(multiplexed[3], "100");
    }

    #[test]
    fn test_client_args_order() {
        let config = HarnessConfig {
            address: "10.0.0.1".to_string(),
            port: 4000,
            max_transfer_size: 1024,
            ..HarnessConfig::default()
        };
        assert_eq!(
            config.client_args("a.pdf"),
            vec!["10.0.0.1", "4000", "a.pdf", "1024"]
        );
    }

    #[test]
    fn test_probe_target_maps_wildcard_to_loopback() {
        let config = HarnessConfig::default();
        assert_eq!(
            config.probe_target().unwrap(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), constants::DEFAULT_PORT)
        );

        let config = HarnessConfig {
            address: "::".to_string(),
            ..HarnessConfig::default()
        };
        assert!(config.probe_target().unwrap().ip().is_loopback());

        let config = HarnessConfig {
            address: "192.168.1.20".to_string(),
            ..HarnessConfig::default()
        };
        assert_eq!(config.probe_target().unwrap().ip().to_string(), "192.168.1.20");
    }

    #[test]
    fn test_shutdown_policy_defaults() {
        let policy = HarnessConfig::default().shutdown_policy();
        assert_eq!(policy.settle, Duration::from_secs(1));
        assert_eq!(policy.exit_timeout, Some(Duration::from_secs(30)));
        assert_eq!(policy.stop_grace, Duration::from_secs(5));
    }
}
