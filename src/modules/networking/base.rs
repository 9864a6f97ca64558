//! Host name, hosts file, DNS, DHCP and time servers

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::{read_optional, Module};
use crate::nix::{AttrSet, Value};
use crate::parsers::{parse_hosts, parse_ini, parse_resolv};
use crate::system::SystemAccess;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

const DISABLE_IPV6_PATH: &str = "/proc/sys/net/ipv6/conf/all/disable_ipv6";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingIr {
    pub host_name: Option<String>,
    pub enable_ipv6: bool,
    pub hosts: IndexMap<String, Vec<String>>,
    pub nameservers: Vec<String>,
    pub search: Vec<String>,
    pub domain: Option<String>,
    #[serde(rename = "useDHCP")]
    pub use_dhcp: bool,
    pub use_networkd: bool,
    pub time_servers: Vec<String>,
}

impl Default for NetworkingIr {
    fn default() -> Self {
        Self {
            host_name: None,
            enable_ipv6: true,
            hosts: IndexMap::new(),
            nameservers: Vec::new(),
            search: Vec::new(),
            domain: None,
            use_dhcp: false,
            use_networkd: false,
            time_servers: Vec::new(),
        }
    }
}

pub struct Networking;

/// Drop the loopback entries every distribution writes, keeping custom ones.
fn filter_hosts(
    hosts: IndexMap<String, Vec<String>>,
    host_name: Option<&str>,
) -> IndexMap<String, Vec<String>> {
    let mut filtered = IndexMap::new();
    for (address, mut names) in hosts {
        let loopback = address == "127.0.0.1" || address == "::1";
        if loopback && names.len() == 1 && names[0] == "localhost" {
            continue;
        }
        if address == "127.0.0.1" || address == "127.0.1.1" {
            if let Some(host) = host_name {
                names.retain(|n| n != host);
                if names.is_empty() {
                    continue;
                }
            }
        }
        filtered.insert(address, names);
    }
    filtered
}

impl Module for Networking {
    type Ir = NetworkingIr;

    fn name(&self) -> &'static str {
        "networking"
    }

    fn category(&self) -> &'static str {
        "networking"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<NetworkingIr, ScribeError> {
        let mut ir = NetworkingIr::default();

        if let Some(text) = read_optional(system, "/etc/hostname")? {
            let name = text.trim();
            if !name.is_empty() {
                ir.host_name = Some(name.to_string());
            }
        }

        if let Some(text) = read_optional(system, DISABLE_IPV6_PATH)? {
            ir.enable_ipv6 = text.trim() != "1";
        }

        if let Some(text) = read_optional(system, "/etc/hosts")? {
            ir.hosts = filter_hosts(parse_hosts(&text), ir.host_name.as_deref());
        }

        if let Some(text) = read_optional(system, "/etc/resolv.conf")? {
            let resolv = parse_resolv(&text);
            if !resolv.is_dynamic {
                ir.nameservers = resolv.nameservers;
                ir.search = resolv.search;
                ir.domain = resolv.domain;
            }
        }

        ir.use_dhcp = system.units().is_enabled("dhcpcd");
        ir.use_networkd = system.units().is_enabled("systemd-networkd");

        if let Some(text) = read_optional(system, "/etc/systemd/timesyncd.conf")? {
            match parse_ini(&text, true) {
                Ok(config) => {
                    if let Some(ntp) = config.get("Time").and_then(|t| t.get("NTP")) {
                        ir.time_servers = ntp.split_whitespace().map(str::to_string).collect();
                    }
                }
                Err(e) => warn!(error = %e, "Failed to parse /etc/systemd/timesyncd.conf"),
            }
        }

        Ok(ir)
    }

    fn map(&self, ir: NetworkingIr) -> Option<OptionBlock> {
        let mut networking = AttrSet::new();

        if let Some(host) = ir.host_name {
            networking.insert("hostName".into(), Value::from(host));
        }
        if !ir.enable_ipv6 {
            networking.insert("enableIPv6".into(), Value::Bool(false));
        }
        if !ir.hosts.is_empty() {
            let hosts: AttrSet = ir
                .hosts
                .into_iter()
                .map(|(address, names)| (address, Value::from(names)))
                .collect();
            networking.insert("hosts".into(), Value::Attrs(hosts));
        }
        if !ir.nameservers.is_empty() {
            networking.insert("nameservers".into(), Value::from(ir.nameservers));
        }
        if !ir.search.is_empty() {
            networking.insert("search".into(), Value::from(ir.search));
        }
        if let Some(domain) = ir.domain {
            networking.insert("domain".into(), Value::from(domain));
        }
        if ir.use_dhcp {
            networking.insert("useDHCP".into(), Value::Bool(true));
        }
        if ir.use_networkd {
            networking.insert("useNetworkd".into(), Value::Bool(true));
        }
        if !ir.time_servers.is_empty() {
            networking.insert("timeServers".into(), Value::from(ir.time_servers));
        }

        if networking.is_empty() {
            return None;
        }
        let mut block = OptionBlock::new("networking", "Basic networking configuration");
        block.set("networking", networking);
        Some(block)
    }
}
