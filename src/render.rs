//! Client configuration rendering.
//!
//! Builds the full JSON document the proxy-client process is launched with:
//! a local SOCKS inbound, one outbound aimed at the descriptor's endpoint,
//! and an unconditional freedom pass-through outbound.

use crate::config::VerifierConfig;
use crate::descriptor::ConfigDescriptor;
use crate::error::RenderError;

use serde_json::{json, Value};

/// Render a descriptor into a client configuration document.
///
/// Numeric fields are coerced before anything reaches the external process:
/// an absent or non-numeric port or alterId is a `RenderError`, classifying
/// the descriptor as not working instead of crashing the run.
pub fn render_client_config(
    descriptor: &ConfigDescriptor,
    config: &VerifierConfig,
) -> Result<Value, RenderError> {
    if descriptor.address.is_empty() {
        return Err(RenderError::MissingAddress);
    }
    let port: u16 = descriptor
        .port
        .parse()
        .map_err(|_| RenderError::InvalidPort(descriptor.port.clone()))?;
    let alter_id: u32 = descriptor
        .alter_id
        .parse()
        .map_err(|_| RenderError::InvalidAlterId(descriptor.alter_id.clone()))?;

    let network = if descriptor.network.is_empty() {
        "tcp"
    } else {
        descriptor.network.as_str()
    };
    let security = if descriptor.security.is_empty() {
        "none"
    } else {
        descriptor.security.as_str()
    };

    Ok(json!({
        "inbounds": [
            {
                "port": config.inbound_port,
                "protocol": "socks",
                "sniffing": {"enabled": true, "destOverride": ["http", "tls"]},
                "settings": {"auth": "noauth", "udp": true}
            }
        ],
        "outbounds": [
            {
                "protocol": descriptor.family.as_str(),
                "settings": {
                    "vnext": [
                        {
                            "address": &descriptor.address,
                            "port": port,
                            "users": [
                                {
                                    "id": &descriptor.user_id,
                                    "alterId": alter_id,
                                    "security": "auto"
                                }
                            ]
                        }
                    ]
                },
                "streamSettings": {
                    "network": network,
                    "security": security,
                    "tlsSettings": {"allowInsecure": true, "sni": &descriptor.sni},
                    "wsSettings": {
                        "path": &descriptor.path,
                        "headers": {"Host": &descriptor.host}
                    }
                }
            },
            {"protocol": "freedom", "settings": {}}
        ]
    }))
}
