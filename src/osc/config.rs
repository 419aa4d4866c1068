//! OSC configuration — listen port and address mappings.

use serde::{Deserialize, Serialize};

use super::mapping::{OscMapping, OscTarget};

/// OSC configuration, the `osc:` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscConfig {
    /// UDP port to listen on.
    #[serde(default = "default_port")]
    pub listen_port: u16,
    /// Mapping rules from OSC addresses to ControlEvents.
    #[serde(default = "OscConfig::default_mappings")]
    pub mappings: Vec<OscMapping>,
}

fn default_port() -> u16 {
    9000
}

impl OscConfig {
    /// Default mappings: /eval, /volume, /rate, /reset.
    fn default_mappings() -> Vec<OscMapping> {
        [
            ("/eval", OscTarget::Eval),
            ("/volume", OscTarget::Volume),
            ("/rate", OscTarget::Rate),
            ("/reset", OscTarget::ResetTime),
        ]
        .into_iter()
        .map(|(address, target)| OscMapping {
            address_pattern: address.to_string(),
            target,
        })
        .collect()
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            listen_port: default_port(),
            mappings: Self::default_mappings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = OscConfig::default();
        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.mappings.len(), 4);
        assert_eq!(config.mappings[0].address_pattern, "/eval");
        assert_eq!(config.mappings[0].target, OscTarget::Eval);
    }

    #[test]
    fn serialize_deserialize() {
        let config = OscConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: OscConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.listen_port, 9000);
        assert_eq!(parsed.mappings.len(), config.mappings.len());
    }

    #[test]
    fn custom_config_deserialize() {
        let yaml = r#"
listen_port: 57120
mappings:
  - address_pattern: "/bytebeat/eval"
    target: Eval
"#;
        let config: OscConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listen_port, 57120);
        assert_eq!(config.mappings.len(), 1);
        assert_eq!(config.mappings[0].target, OscTarget::Eval);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: OscConfig = serde_yaml::from_str("listen_port: 9100").unwrap();
        assert_eq!(config.listen_port, 9100);
        assert_eq!(config.mappings.len(), 4);
    }
}
