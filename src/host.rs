//! Host information provider.
//!
//! Handlers never touch the operating system directly; they go through a
//! [`HostInfo`] so tests can substitute [`FixedHost`].

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::Serialize;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use time::OffsetDateTime;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::HostError;

/// Address family of an interface record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum AddressFamily {
    /// IPv4 address.
    #[serde(rename = "IPv4")]
    V4,
    /// IPv6 address.
    #[serde(rename = "IPv6")]
    V6,
}

/// One address bound to a network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InterfaceAddress {
    /// Assigned address.
    pub address: String,
    /// Network mask.
    pub netmask: String,
    /// Address family.
    pub family: AddressFamily,
    /// Loopback / not reachable externally.
    pub internal: bool,
    /// Address with prefix length, e.g. `10.0.0.5/24`.
    pub cidr: String,
}

impl InterfaceAddress {
    /// Build a record from an address and its netmask.
    pub fn new(ip: IpAddr, netmask: IpAddr, internal: bool) -> Self {
        let (family, prefix) = match netmask {
            IpAddr::V4(mask) => (
                AddressFamily::V4,
                mask.octets().iter().map(|b| b.count_ones()).sum::<u32>(),
            ),
            IpAddr::V6(mask) => (
                AddressFamily::V6,
                mask.segments().iter().map(|s| s.count_ones()).sum::<u32>(),
            ),
        };

        Self {
            address: ip.to_string(),
            netmask: netmask.to_string(),
            family,
            internal,
            cidr: format!("{ip}/{prefix}"),
        }
    }
}

/// Interface name to its address records.
pub type NetworkInterfaces = BTreeMap<String, Vec<InterfaceAddress>>;

/// Point-in-time read of host metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    /// Host name.
    pub hostname: String,
    /// CPU architecture identifier (`x64`, `arm64`, ...).
    pub arch: String,
    /// Platform identifier (`linux`, `darwin`, `win32`, ...).
    pub platform: String,
    /// Logical CPU count, at least 1.
    pub cpus: usize,
    /// Total physical memory in bytes.
    pub total_memory: u64,
    /// Network interfaces.
    pub network_interfaces: NetworkInterfaces,
}

/// Read-only access to host metadata.
pub trait HostInfo: Send + Sync {
    /// Current host name.
    fn hostname(&self) -> Result<String, HostError>;

    /// Full snapshot of host metadata.
    fn snapshot(&self) -> Result<HostSnapshot, HostError>;

    /// Current wall-clock time.
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Architecture identifier for a Rust target arch.
pub fn arch_name(target_arch: &str) -> &str {
    match target_arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Platform identifier for a Rust target OS.
pub fn platform_name(target_os: &str) -> &str {
    match target_os {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Reads metadata from the running operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    /// Create a new system host provider.
    pub fn new() -> Self {
        Self
    }

    fn network_interfaces() -> Result<NetworkInterfaces, HostError> {
        let mut interfaces = NetworkInterfaces::new();

        for iface in if_addrs::get_if_addrs().map_err(HostError::Interfaces)? {
            let internal = iface.is_loopback();
            let record = match &iface.addr {
                if_addrs::IfAddr::V4(v4) => {
                    InterfaceAddress::new(IpAddr::V4(v4.ip), IpAddr::V4(v4.netmask), internal)
                }
                if_addrs::IfAddr::V6(v6) => {
                    InterfaceAddress::new(IpAddr::V6(v6.ip), IpAddr::V6(v6.netmask), internal)
                }
            };
            interfaces.entry(iface.name).or_default().push(record);
        }

        Ok(interfaces)
    }
}

impl HostInfo for SystemHost {
    fn hostname(&self) -> Result<String, HostError> {
        let name = hostname::get().map_err(HostError::Hostname)?;
        Ok(name.to_string_lossy().into_owned())
    }

    fn snapshot(&self) -> Result<HostSnapshot, HostError> {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );

        let snapshot = HostSnapshot {
            hostname: self.hostname()?,
            arch: arch_name(std::env::consts::ARCH).to_string(),
            platform: platform_name(std::env::consts::OS).to_string(),
            cpus: sys.cpus().len().max(1),
            total_memory: sys.total_memory(),
            network_interfaces: Self::network_interfaces()?,
        };

        debug!(
            hostname = %snapshot.hostname,
            cpus = snapshot.cpus,
            total_memory = snapshot.total_memory,
            interfaces = snapshot.network_interfaces.len(),
            "Collected host snapshot"
        );

        Ok(snapshot)
    }
}

/// Host provider returning fixed values, for tests.
#[derive(Debug, Clone)]
pub struct FixedHost {
    /// Snapshot returned by every call.
    pub snapshot: HostSnapshot,
    /// Time returned by [`HostInfo::now`].
    pub now: OffsetDateTime,
}

impl FixedHost {
    /// A small, deterministic host: `node-01`, 4 CPUs, 8 GiB, loopback only.
    pub fn sample() -> Self {
        let mut interfaces = NetworkInterfaces::new();
        interfaces.insert(
            "lo".to_string(),
            vec![InterfaceAddress::new(
                IpAddr::from([127, 0, 0, 1]),
                IpAddr::from([255, 0, 0, 0]),
                true,
            )],
        );

        Self {
            snapshot: HostSnapshot {
                hostname: "node-01".to_string(),
                arch: "x64".to_string(),
                platform: "linux".to_string(),
                cpus: 4,
                total_memory: 8 * 1024 * 1024 * 1024,
                network_interfaces: interfaces,
            },
            now: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

impl HostInfo for FixedHost {
    fn hostname(&self) -> Result<String, HostError> {
        Ok(self.snapshot.hostname.clone())
    }

    fn snapshot(&self) -> Result<HostSnapshot, HostError> {
        Ok(self.snapshot.clone())
    }

    fn now(&self) -> OffsetDateTime {
        self.now
    }
}
