//! Share-link parsing.
//!
//! Four independent parsers, one per scheme, each a pure total function from
//! a raw link string to a descriptor or a typed failure. The four schemes
//! encode materially different serializations (URI query, JSON over base64,
//! colon-delimited over base64 or plain text), so they stay separate rather
//! than behind one unified parser.

use crate::descriptor::{ConfigDescriptor, ProtocolFamily};
use crate::error::ParseError;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Link scheme recognized by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScheme {
    Vless,
    Vmess,
    Trojan,
    Shadowsocks,
}

impl LinkScheme {
    /// Detect the scheme of a raw line by its literal prefix.
    pub fn detect(line: &str) -> Option<Self> {
        if line.starts_with("vless://") {
            Some(Self::Vless)
        } else if line.starts_with("vmess://") {
            Some(Self::Vmess)
        } else if line.starts_with("trojan://") {
            Some(Self::Trojan)
        } else if line.starts_with("ss://") {
            Some(Self::Shadowsocks)
        } else {
            None
        }
    }

    /// Parse a link with the parser matching this scheme.
    pub fn parse(self, link: &str) -> Result<ConfigDescriptor, ParseError> {
        match self {
            Self::Vless => parse_vless(link),
            Self::Vmess => parse_vmess(link),
            Self::Trojan => parse_trojan(link),
            Self::Shadowsocks => parse_shadowsocks(link),
        }
    }
}

impl fmt::Display for LinkScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vless => "vless",
            Self::Vmess => "vmess",
            Self::Trojan => "trojan",
            Self::Shadowsocks => "ss",
        })
    }
}

fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// Shared URI-shaped parsing for vless and trojan links.
///
/// Username becomes the credential, host/port the endpoint, the
/// percent-decoded fragment the remark. Missing query keys yield empty
/// strings, not absence.
fn parse_uri_link(link: &str, family: ProtocolFamily) -> Result<ConfigDescriptor, ParseError> {
    let url = Url::parse(link)?;
    let address = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or(ParseError::MissingHost)?
        .to_string();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let param = |key: &str| query.get(key).cloned().unwrap_or_default();

    Ok(ConfigDescriptor {
        remark: percent_decode(url.fragment().unwrap_or("")),
        address,
        port: url.port().map(|p| p.to_string()).unwrap_or_default(),
        user_id: url.username().to_string(),
        network: param("type"),
        host: param("host"),
        path: param("path"),
        security: param("security"),
        sni: param("sni"),
        alpn: param("alpn"),
        family,
        ..ConfigDescriptor::default()
    })
}

/// Parse a `vless://` link.
pub fn parse_vless(link: &str) -> Result<ConfigDescriptor, ParseError> {
    parse_uri_link(link, ProtocolFamily::Vless)
}

/// Parse a `trojan://` link.
///
/// Identical to vless except trojan links do not carry usable ALPN, so the
/// field is always empty.
pub fn parse_trojan(link: &str) -> Result<ConfigDescriptor, ParseError> {
    let mut descriptor = parse_uri_link(link, ProtocolFamily::Trojan)?;
    descriptor.alpn = String::new();
    Ok(descriptor)
}

/// Parse a `vmess://` link: a base64-encoded JSON object whose own keys
/// become the descriptor's fields.
pub fn parse_vmess(link: &str) -> Result<ConfigDescriptor, ParseError> {
    let payload = link
        .strip_prefix("vmess://")
        .ok_or(ParseError::UnrecognizedScheme)?;
    let decoded = String::from_utf8(STANDARD.decode(payload.trim())?)?;
    Ok(serde_json::from_str(&decoded)?)
}

/// Parse an `ss://` link.
///
/// The `#` remark separator is mandatory. The body is either fully
/// base64-encoded (`method:password@server:port` after decoding) or plain
/// text with the same shape; the plain form may omit the port.
pub fn parse_shadowsocks(link: &str) -> Result<ConfigDescriptor, ParseError> {
    let (body, remark) = link.split_once('#').ok_or(ParseError::MissingRemark)?;
    let body = body
        .strip_prefix("ss://")
        .ok_or(ParseError::UnrecognizedScheme)?;

    let (method, password, address, port) = if !body.contains('@') {
        let decoded = String::from_utf8(STANDARD.decode(body)?)?;
        let (method, rest) = decoded
            .split_once(':')
            .ok_or(ParseError::MalformedCredentials)?;
        let (password, endpoint) = rest
            .split_once('@')
            .ok_or(ParseError::MalformedCredentials)?;
        let (address, port) = endpoint
            .split_once(':')
            .ok_or(ParseError::MalformedCredentials)?;
        (
            method.to_string(),
            password.to_string(),
            address.to_string(),
            port.to_string(),
        )
    } else {
        let (method, rest) = body
            .split_once(':')
            .ok_or(ParseError::MalformedCredentials)?;
        let (password, endpoint) = rest
            .split_once('@')
            .ok_or(ParseError::MalformedCredentials)?;
        let (address, port) = match endpoint.split_once(':') {
            Some((address, port)) => (address.to_string(), port.to_string()),
            None => (endpoint.to_string(), String::new()),
        };
        (method.to_string(), password.to_string(), address, port)
    };

    Ok(ConfigDescriptor {
        remark: percent_decode(remark),
        address,
        port,
        method,
        password,
        family: ProtocolFamily::Shadowsocks,
        ..ConfigDescriptor::default()
    })
}
