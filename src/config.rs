//! # Server Keys and Client Registry
//!
//! Startup configuration: the server's ECDSA keypair and the static
//! mapping from client serial identifiers to provisioned public keys.
//! Both are created once, shared read-only across all sessions, and never
//! mutated after load.
//!
//! The config format is plain `key=value` lines with `#` comments:
//!
//! ```text
//! server_privkey_hex=<64 hex chars>
//! client.<serial>.pubkey_hex=<66 hex chars, compressed>
//! ```
//!
//! Malformed lines are logged and skipped; a missing file falls back to
//! demo defaults.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::pubkey33_from_priv;
use crate::error::{ProtocolError, ProtocolResult};
use crate::{Point33, MAX_SERIAL_LEN, POINT_LEN, PRIV_LEN};

// DEMO ONLY: never ship fixed private keys.
const DEMO_SERVER_PRIVKEY_HEX: &str =
    "0000000000000000000000000000000000000000000000000000000000000001";
const DEMO_CLIENT_SERIAL: &str = "DEMO-SERIAL-0001";
const DEMO_CLIENT_PUBKEY_HEX: &str =
    "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

fn parse_hex_array<const N: usize>(value: &str) -> ProtocolResult<[u8; N]> {
    let bytes = hex::decode(value)
        .map_err(|e| ProtocolError::Config(format!("invalid hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| ProtocolError::Config(format!("expected {N} bytes, got {}", b.len())))
}

/// The server's long-lived ECDSA keypair
///
/// The private scalar is scrubbed from memory on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ServerKeys {
    pub server_priv: [u8; PRIV_LEN],
    pub server_pub: Point33,
}

impl ServerKeys {
    /// Build a keypair from a private scalar, deriving the public key.
    pub fn from_priv(server_priv: [u8; PRIV_LEN]) -> ProtocolResult<Self> {
        let server_pub = pubkey33_from_priv(&server_priv)?;
        Ok(Self {
            server_priv,
            server_pub,
        })
    }

    fn from_hex(value: &str) -> ProtocolResult<Self> {
        Self::from_priv(parse_hex_array::<PRIV_LEN>(value)?)
    }
}

/// Static serial → compressed-pubkey mapping, read-only after load
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Point33>,
}

impl ClientRegistry {
    pub fn insert(&mut self, serial: String, pubkey: Point33) {
        self.clients.insert(serial, pubkey);
    }

    pub fn lookup(&self, serial: &str) -> Option<&Point33> {
        self.clients.get(serial)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Complete server-side startup configuration
pub struct ServerConfig {
    pub keys: ServerKeys,
    pub registry: ClientRegistry,
}

impl ServerConfig {
    /// Demo keypair and registry used when no config file is present.
    pub fn demo() -> Self {
        let keys = ServerKeys::from_hex(DEMO_SERVER_PRIVKEY_HEX)
            .expect("demo server key is valid");
        let mut registry = ClientRegistry::default();
        registry.insert(
            DEMO_CLIENT_SERIAL.to_owned(),
            parse_hex_array::<POINT_LEN>(DEMO_CLIENT_PUBKEY_HEX).expect("demo client key is valid"),
        );
        Self { keys, registry }
    }

    /// Load configuration from `path`, falling back to demo defaults when
    /// the file is missing. Parse errors skip the offending line.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                warn!(path = %path.display(), "config not found, using demo defaults");
                return Self::demo();
            }
        };
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Self {
        let mut cfg = Self::demo();

        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if key == "server_privkey_hex" {
                match ServerKeys::from_hex(value) {
                    Ok(keys) => cfg.keys = keys,
                    Err(e) => warn!(line = idx + 1, "config parse error for key={key}: {e}"),
                }
            } else if let Some(serial) = key
                .strip_prefix("client.")
                .and_then(|rest| rest.strip_suffix(".pubkey_hex"))
            {
                if serial.is_empty() || serial.len() > MAX_SERIAL_LEN {
                    warn!(line = idx + 1, "config parse error for key={key}: serial must be 1..63 bytes");
                    continue;
                }
                match parse_hex_array::<POINT_LEN>(value) {
                    Ok(pubkey) => cfg.registry.insert(serial.to_owned(), pubkey),
                    Err(e) => warn!(line = idx + 1, "config parse error for key={key}: {e}"),
                }
            }
        }

        cfg
    }
}

/// Client-side configuration for the demo client binary
pub struct ClientConfig {
    pub serial_id: String,
    pub client_priv: [u8; PRIV_LEN],
    pub server_pub: Point33,
}

impl ClientConfig {
    /// Demo identity matching the server's default registry entry.
    pub fn demo() -> Self {
        let mut client_priv = [0u8; PRIV_LEN];
        client_priv[PRIV_LEN - 1] = 2;
        Self {
            serial_id: DEMO_CLIENT_SERIAL.to_owned(),
            client_priv,
            server_pub: pubkey33_from_priv(&parse_hex_array::<PRIV_LEN>(DEMO_SERVER_PRIVKEY_HEX).expect("demo key"))
                .expect("demo server key is valid"),
        }
    }

    /// Load the client identity from `path`, falling back to the demo
    /// identity when the file is missing.
    pub fn load(path: &Path) -> ProtocolResult<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                warn!(path = %path.display(), "client config not found, using demo identity");
                return Ok(Self::demo());
            }
        };

        let mut kv = HashMap::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                kv.insert(key.trim().to_owned(), value.trim().to_owned());
            }
        }

        let get = |key: &str| -> ProtocolResult<&String> {
            kv.get(key)
                .ok_or_else(|| ProtocolError::Config(format!("missing required key: {key}")))
        };

        let serial_id = get("client_serial_id")?.clone();
        if serial_id.is_empty() || serial_id.len() > MAX_SERIAL_LEN {
            return Err(ProtocolError::Config(
                "client_serial_id must be 1..63 bytes".into(),
            ));
        }
        let client_priv = parse_hex_array::<PRIV_LEN>(get("client_privkey_hex")?)?;
        let server_pub = parse_hex_array::<POINT_LEN>(get("server_pubkey_hex")?)?;

        Ok(Self {
            serial_id,
            client_priv,
            server_pub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_defaults() {
        let cfg = ServerConfig::demo();
        assert_eq!(
            hex::encode(cfg.keys.server_pub),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(cfg.registry.len(), 1);
        let demo_pub = cfg.registry.lookup(DEMO_CLIENT_SERIAL).unwrap();
        assert_eq!(hex::encode(demo_pub), DEMO_CLIENT_PUBKEY_HEX);
    }

    #[test]
    fn test_demo_client_matches_demo_registry() {
        let server = ServerConfig::demo();
        let client = ClientConfig::demo();
        let derived = pubkey33_from_priv(&client.client_priv).unwrap();
        assert_eq!(
            server.registry.lookup(&client.serial_id).unwrap(),
            &derived
        );
        assert_eq!(client.server_pub, server.keys.server_pub);
    }

    #[test]
    fn test_parse_overrides_and_adds() {
        let raw = "\
# comment line
server_privkey_hex=0000000000000000000000000000000000000000000000000000000000000003

client.UNIT-1.pubkey_hex=0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798
";
        let cfg = ServerConfig::parse(raw);
        assert_eq!(
            cfg.keys.server_pub,
            pubkey33_from_priv(&{
                let mut p = [0u8; PRIV_LEN];
                p[PRIV_LEN - 1] = 3;
                p
            })
            .unwrap()
        );
        // Demo entry stays; the configured client is added alongside it.
        assert_eq!(cfg.registry.len(), 2);
        assert!(cfg.registry.lookup("UNIT-1").is_some());
        assert!(cfg.registry.lookup(DEMO_CLIENT_SERIAL).is_some());
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let raw = "\
not a key value line
server_privkey_hex=zzzz
client.TOOSHORT.pubkey_hex=0102
client..pubkey_hex=0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798
";
        let cfg = ServerConfig::parse(raw);
        // Everything malformed: demo defaults survive untouched.
        assert_eq!(
            hex::encode(cfg.keys.server_pub),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(cfg.registry.len(), 1);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let cfg = ServerConfig::load(Path::new("/nonexistent/server.conf"));
        assert_eq!(cfg.registry.len(), 1);

        let client = ClientConfig::load(Path::new("/nonexistent/client.conf")).unwrap();
        assert_eq!(client.serial_id, DEMO_CLIENT_SERIAL);
    }
}
