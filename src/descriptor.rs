//! Canonical, scheme-agnostic representation of one proxy endpoint.

use serde::{Deserialize, Deserializer, Serialize};

/// Protocol family a descriptor belongs to.
///
/// The wire name matches the share-link vocabulary, so `Shadowsocks`
/// serializes as `"ss"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProtocolFamily {
    #[serde(rename = "vless")]
    Vless,
    #[default]
    #[serde(rename = "vmess")]
    Vmess,
    #[serde(rename = "trojan")]
    Trojan,
    #[serde(rename = "ss")]
    Shadowsocks,
}

impl ProtocolFamily {
    /// Outbound protocol name used in the rendered client configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vless => "vless",
            Self::Vmess => "vmess",
            Self::Trojan => "trojan",
            Self::Shadowsocks => "ss",
        }
    }
}

/// Normalized connection descriptor produced by link parsing.
///
/// Field names use the share-link JSON vocabulary (`ps`, `add`, `id`, ...) so
/// a raw vmess payload deserializes straight into this type, and the
/// persisted working set keeps the shape subscription tooling expects.
///
/// All fields are strings; an empty string marks a field absent from the link
/// syntax. A descriptor is created once per parsed line, is immutable
/// thereafter, and flows through exactly one verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDescriptor {
    /// Display label, percent-decoded.
    #[serde(rename = "ps")]
    pub remark: String,
    /// Server host.
    #[serde(rename = "add")]
    pub address: String,
    /// Server port. Kept as a string because ss links may omit it and vmess
    /// payloads carry it as either a number or a string.
    #[serde(rename = "port", deserialize_with = "string_or_number")]
    pub port: String,
    /// Credential UUID (vless/vmess) or URI username (trojan).
    #[serde(rename = "id")]
    pub user_id: String,
    /// Legacy vmess alterId, "0" unless the link says otherwise.
    #[serde(rename = "aid", deserialize_with = "string_or_number")]
    pub alter_id: String,
    /// Transport type, e.g. "tcp" or "ws".
    #[serde(rename = "net")]
    pub network: String,
    /// Host header for websocket-style transports.
    pub host: String,
    /// Path for websocket-style transports.
    pub path: String,
    /// TLS mode: "tls", "none" or empty.
    #[serde(rename = "tls")]
    pub security: String,
    /// TLS server name indication.
    pub sni: String,
    /// TLS ALPN list, comma separated.
    pub alpn: String,
    /// Cipher identifier (shadowsocks only).
    pub method: String,
    /// Password (shadowsocks/trojan credential material).
    pub password: String,
    /// Protocol family tag.
    #[serde(rename = "protocol")]
    pub family: ProtocolFamily,
}

impl Default for ConfigDescriptor {
    fn default() -> Self {
        Self {
            remark: String::new(),
            address: String::new(),
            port: String::new(),
            user_id: String::new(),
            alter_id: "0".to_string(),
            network: String::new(),
            host: String::new(),
            path: String::new(),
            security: String::new(),
            sni: String::new(),
            alpn: String::new(),
            method: String::new(),
            password: String::new(),
            family: ProtocolFamily::default(),
        }
    }
}

/// Accept a JSON number, string or null for fields like `port` and `aid`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => n.to_string(),
        Some(Raw::Text(s)) => s,
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_vmess_payload_with_numeric_port() {
        let descriptor: ConfigDescriptor =
            serde_json::from_str(r#"{"ps": "node", "add": "1.2.3.4", "port": 443, "id": "uuid"}"#)
                .unwrap();
        assert_eq!(descriptor.remark, "node");
        assert_eq!(descriptor.address, "1.2.3.4");
        assert_eq!(descriptor.port, "443");
        assert_eq!(descriptor.user_id, "uuid");
        assert_eq!(descriptor.alter_id, "0");
        assert_eq!(descriptor.family, ProtocolFamily::Vmess);
    }

    #[test]
    fn test_deserialize_string_port_and_aid() {
        let descriptor: ConfigDescriptor =
            serde_json::from_str(r#"{"add": "h", "port": "8080", "aid": 2}"#).unwrap();
        assert_eq!(descriptor.port, "8080");
        assert_eq!(descriptor.alter_id, "2");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let descriptor: ConfigDescriptor =
            serde_json::from_str(r#"{"v": "2", "type": "none", "add": "h"}"#).unwrap();
        assert_eq!(descriptor.address, "h");
    }

    #[test]
    fn test_shadowsocks_family_wire_name() {
        let descriptor = ConfigDescriptor {
            family: ProtocolFamily::Shadowsocks,
            ..Default::default()
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["protocol"], "ss");
    }
}
