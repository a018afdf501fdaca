//! Device fingerprint: a stable per-host identity for diagnostics and
//! licensing display.
//!
//! The code is the first 64 bits of a SHA-256 digest over a canonical JSON
//! rendering of host attributes, as 16 uppercase hex characters. Only
//! physical-looking network interfaces contribute: loopback addresses and
//! all-zero hardware addresses are skipped.
//!
//! The fingerprint is not bound to the stored credential.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sysinfo::{Networks, System};
use thiserror::Error;
use tracing::warn;

/// Number of digest bytes kept in a machine code.
const CODE_BYTES: usize = 8;

/// Prefix marking a fallback code that is not stable across calls.
pub const FALLBACK_PREFIX: &str = "TEMP-";

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to collect host attributes: {0}")]
    Collection(String),

    #[error("Failed to serialize host attributes: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AddressFamily {
    IPv4,
    IPv6,
}

/// One address of a network interface, as enumerated by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub mac: String,
    pub family: AddressFamily,
    /// Loopback / host-internal address
    pub internal: bool,
}

impl InterfaceAddress {
    fn contributes(&self) -> bool {
        !self.internal && !is_zero_mac(&self.mac)
    }
}

fn is_zero_mac(mac: &str) -> bool {
    mac.chars().filter(|c| *c != ':' && *c != '-').all(|c| c == '0')
}

/// Everything the machine code is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttributes {
    /// `None` when the hostname is not valid UTF-8; serialized as null.
    pub hostname: Option<String>,
    pub platform: String,
    pub arch: String,
    /// In logical CPU enumeration order
    pub cpu_models: Vec<String>,
    /// Bytes
    pub total_memory: u64,
    pub interfaces: Vec<InterfaceAddress>,
}

impl HostAttributes {
    /// Read the attributes of the current host.
    pub fn collect() -> Result<Self, FingerprintError> {
        let hostname = hostname::get()
            .map_err(|e| FingerprintError::Collection(format!("hostname: {}", e)))?
            .into_string()
            .ok();

        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();
        let cpu_models = sys.cpus().iter().map(|cpu| cpu.brand().to_string()).collect();

        let networks = Networks::new_with_refreshed_list();
        let mut interfaces = Vec::new();
        for (name, data) in networks.list() {
            let mac = data.mac_address().to_string();
            for ip in data.ip_networks() {
                interfaces.push(InterfaceAddress {
                    name: name.clone(),
                    mac: mac.clone(),
                    family: if ip.addr.is_ipv4() {
                        AddressFamily::IPv4
                    } else {
                        AddressFamily::IPv6
                    },
                    internal: ip.addr.is_loopback(),
                });
            }
        }

        Ok(Self {
            hostname,
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_models,
            total_memory: sys.total_memory(),
            interfaces,
        })
    }

    /// Interfaces that feed the fingerprint, in a stable order.
    pub fn contributing_interfaces(&self) -> Vec<&InterfaceAddress> {
        let mut contributing: Vec<_> = self.interfaces.iter().filter(|i| i.contributes()).collect();
        contributing.sort_by(|a, b| {
            (&a.name, a.family, &a.mac).cmp(&(&b.name, b.family, &b.mac))
        });
        contributing.dedup();
        contributing
    }
}

#[derive(Serialize)]
struct CanonicalInterface<'a> {
    name: &'a str,
    mac: &'a str,
    family: AddressFamily,
}

/// Field order here is the canonical order of the hashed text.
#[derive(Serialize)]
struct CanonicalHost<'a> {
    hostname: Option<&'a str>,
    platform: &'a str,
    arch: &'a str,
    cpus: &'a [String],
    total_memory: u64,
    network: Vec<CanonicalInterface<'a>>,
}

/// Derive the 16-character machine code for `attrs`.
pub fn machine_code(attrs: &HostAttributes) -> Result<String, FingerprintError> {
    let canonical = CanonicalHost {
        hostname: attrs.hostname.as_deref(),
        platform: &attrs.platform,
        arch: &attrs.arch,
        cpus: &attrs.cpu_models,
        total_memory: attrs.total_memory,
        network: attrs
            .contributing_interfaces()
            .into_iter()
            .map(|i| CanonicalInterface {
                name: &i.name,
                mac: &i.mac,
                family: i.family,
            })
            .collect(),
    };

    let text = serde_json::to_string(&canonical)?;
    Ok(truncated_digest(text.as_bytes()))
}

/// An unstable code from hostname and time, for when collection fails.
pub fn fallback_code(hostname: &str, at: DateTime<Utc>) -> String {
    let seed = format!("{}{}", hostname, at.timestamp_millis());
    format!("{}{}", FALLBACK_PREFIX, truncated_digest(seed.as_bytes()))
}

fn truncated_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode_upper(&digest[..CODE_BYTES])
}

/// The machine identity, tagged with whether it can be relied on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentity {
    Stable(String),
    /// Differs on every call; never store it as a device key.
    Fallback(String),
}

impl DeviceIdentity {
    pub fn code(&self) -> &str {
        match self {
            DeviceIdentity::Stable(code) | DeviceIdentity::Fallback(code) => code,
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, DeviceIdentity::Stable(_))
    }
}

/// Compute the identity of the current host.
pub fn device_identity() -> DeviceIdentity {
    match HostAttributes::collect().and_then(|attrs| machine_code(&attrs)) {
        Ok(code) => DeviceIdentity::Stable(code),
        Err(e) => {
            warn!(error = %e, "Falling back to temporary machine code");
            let hostname = hostname::get()
                .map(|h| h.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown-host".to_string());
            DeviceIdentity::Fallback(fallback_code(&hostname, Utc::now()))
        }
    }
}
