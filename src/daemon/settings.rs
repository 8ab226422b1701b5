//! Daemon launch settings and their command-line rendering.
//!
//! Settings start from the daemon defaults and are overridden key by key.
//! Order is kept: defaults first, then new keys in the order they were set.
//! A setting whose value is `false` is left off the command line.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Setting keys the daemon is known to accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ApiAddr,
    HostAddr,
    RpcAddr,
    AuthenticateApi,
    DisableApiSecurity,
    SiaprimeDirectory,
    /// Passed through unchanged.
    Other(String),
}

impl SettingKey {
    pub fn as_str(&self) -> &str {
        match self {
            SettingKey::ApiAddr => "api-addr",
            SettingKey::HostAddr => "host-addr",
            SettingKey::RpcAddr => "rpc-addr",
            SettingKey::AuthenticateApi => "authenticate-api",
            SettingKey::DisableApiSecurity => "disable-api-security",
            SettingKey::SiaprimeDirectory => "siaprime-directory",
            SettingKey::Other(key) => key,
        }
    }
}

impl From<&str> for SettingKey {
    fn from(key: &str) -> Self {
        match key {
            "api-addr" => SettingKey::ApiAddr,
            "host-addr" => SettingKey::HostAddr,
            "rpc-addr" => SettingKey::RpcAddr,
            "authenticate-api" => SettingKey::AuthenticateApi,
            "disable-api-security" => SettingKey::DisableApiSecurity,
            "siaprime-directory" => SettingKey::SiaprimeDirectory,
            other => SettingKey::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A setting value as it appears after `=` on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Int(n) => write!(f, "{}", n),
            FlagValue::Float(n) => write!(f, "{}", n),
            FlagValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<u16> for FlagValue {
    fn from(value: u16) -> Self {
        FlagValue::Int(value.into())
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Text(value)
    }
}

impl From<&Path> for FlagValue {
    fn from(value: &Path) -> Self {
        FlagValue::Text(value.display().to_string())
    }
}

impl From<PathBuf> for FlagValue {
    fn from(value: PathBuf) -> Self {
        FlagValue::from(value.as_path())
    }
}

/// Settings for launching the daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSettings {
    entries: Vec<(SettingKey, FlagValue)>,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            entries: vec![
                (SettingKey::ApiAddr, "localhost:4280".into()),
                (SettingKey::HostAddr, ":4282".into()),
                (SettingKey::RpcAddr, ":4281".into()),
                (SettingKey::AuthenticateApi, false.into()),
                (SettingKey::DisableApiSecurity, false.into()),
            ],
        }
    }
}

impl ProcessSettings {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place or appending a new key.
    pub fn set(&mut self, key: impl Into<SettingKey>, value: impl Into<FlagValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder form of [`ProcessSettings::set`].
    pub fn with(mut self, key: impl Into<SettingKey>, value: impl Into<FlagValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn api_addr(self, addr: impl Into<String>) -> Self {
        self.with(SettingKey::ApiAddr, FlagValue::Text(addr.into()))
    }

    pub fn host_addr(self, addr: impl Into<String>) -> Self {
        self.with(SettingKey::HostAddr, FlagValue::Text(addr.into()))
    }

    pub fn rpc_addr(self, addr: impl Into<String>) -> Self {
        self.with(SettingKey::RpcAddr, FlagValue::Text(addr.into()))
    }

    pub fn authenticate_api(self, enabled: bool) -> Self {
        self.with(SettingKey::AuthenticateApi, enabled)
    }

    pub fn disable_api_security(self, disabled: bool) -> Self {
        self.with(SettingKey::DisableApiSecurity, disabled)
    }

    pub fn siaprime_directory(self, dir: impl AsRef<Path>) -> Self {
        self.with(SettingKey::SiaprimeDirectory, dir.as_ref())
    }

    pub fn get(&self, key: impl Into<SettingKey>) -> Option<&FlagValue> {
        let key = key.into();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// The daemon's data directory, when one is set.
    pub fn directory(&self) -> Option<PathBuf> {
        self.get(SettingKey::SiaprimeDirectory)
            .map(|v| PathBuf::from(v.to_string()))
    }

    /// The address the daemon API will listen on.
    pub fn api_address(&self) -> Option<String> {
        match self.get(SettingKey::ApiAddr) {
            Some(FlagValue::Bool(false)) | None => None,
            Some(v) => Some(v.to_string()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SettingKey, &FlagValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Render the command line: `--key=value` per setting, skipping `false`.
    pub fn flags(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, value)| *value != FlagValue::Bool(false))
            .map(|(key, value)| format!("--{}={}", key, value))
            .collect()
    }
}

impl Serialize for ProcessSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

/// Deserializes as overrides on top of the defaults, in document order.
impl<'de> Deserialize<'de> for ProcessSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SettingsVisitor)
    }
}

struct SettingsVisitor;

impl<'de> Visitor<'de> for SettingsVisitor {
    type Value = ProcessSettings;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a table of daemon settings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ProcessSettings, A::Error> {
        let mut settings = ProcessSettings::default();
        while let Some((key, value)) = map.next_entry::<String, FlagValue>()? {
            settings.set(key.as_str(), value);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        assert_eq!(
            ProcessSettings::default().flags(),
            vec![
                "--api-addr=localhost:4280",
                "--host-addr=:4282",
                "--rpc-addr=:4281",
            ]
        );
    }

    #[test]
    fn test_false_omits_flag() {
        let flags = ProcessSettings::new().authenticate_api(false).flags();
        assert!(!flags.iter().any(|f| f.starts_with("--authenticate-api")));
    }

    #[test]
    fn test_true_renders_literal() {
        let flags = ProcessSettings::new().authenticate_api(true).flags();
        assert!(flags.contains(&"--authenticate-api=true".to_string()));
        // overriding keeps the default's position
        assert_eq!(flags[3], "--authenticate-api=true");
    }

    #[test]
    fn test_unknown_keys_pass_through_in_order() {
        let flags = ProcessSettings::new()
            .with("modules", "cgtw")
            .with("max-peers", 64i64)
            .with("no-bootstrap", true)
            .with("profile", false)
            .flags();
        assert_eq!(
            &flags[3..],
            &["--modules=cgtw", "--max-peers=64", "--no-bootstrap=true"]
        );
    }

    #[test]
    fn test_directory_is_also_a_flag() {
        let settings = ProcessSettings::new().siaprime_directory("/var/lib/spd");
        assert_eq!(settings.directory(), Some(PathBuf::from("/var/lib/spd")));
        assert!(settings
            .flags()
            .contains(&"--siaprime-directory=/var/lib/spd".to_string()));
    }

    #[test]
    fn test_api_address_disabled_by_false() {
        assert_eq!(
            ProcessSettings::new().api_address(),
            Some("localhost:4280".to_string())
        );
        let off = ProcessSettings::new().with("api-addr", false);
        assert_eq!(off.api_address(), None);
        assert!(off.flags().iter().all(|f| !f.starts_with("--api-addr")));
    }

    #[test]
    fn test_deserialize_overrides_defaults() {
        let toml = r#"
api-addr = "127.0.0.1:9980"
authenticate-api = true
modules = "gctwr"
"#;
        let settings: ProcessSettings = toml::from_str(toml).unwrap();
        assert_eq!(
            settings.flags(),
            vec![
                "--api-addr=127.0.0.1:9980",
                "--host-addr=:4282",
                "--rpc-addr=:4281",
                "--authenticate-api=true",
                "--modules=gctwr",
            ]
        );
    }

    #[test]
    fn test_serialize_round_trips_through_toml() {
        let settings = ProcessSettings::new().rpc_addr(":9981").with("modules", "cg");
        let text = toml::to_string(&settings).unwrap();
        let parsed: ProcessSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
