//! `/etc/hosts` and `/etc/resolv.conf`

use indexmap::IndexMap;
use serde::Serialize;

/// Address → host names, in file order. Repeated addresses accumulate names.
pub fn parse_hosts(text: &str) -> IndexMap<String, Vec<String>> {
    let mut hosts: IndexMap<String, Vec<String>> = IndexMap::new();
    for line in text.lines() {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let Some(address) = fields.next() else {
            continue;
        };
        let names = hosts.entry(address.to_string()).or_default();
        for name in fields {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    hosts.retain(|_, names| !names.is_empty());
    hosts
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvConf {
    pub nameservers: Vec<String>,
    pub search: Vec<String>,
    pub domain: Option<String>,
    /// Written by a resolver daemon rather than by hand.
    pub is_dynamic: bool,
}

const DYNAMIC_MARKERS: [&str; 4] = [
    "Generated by",
    "systemd-resolved",
    "resolvconf",
    "managed by",
];

pub fn parse_resolv(text: &str) -> ResolvConf {
    let mut conf = ResolvConf {
        is_dynamic: text
            .lines()
            .filter(|l| l.trim_start().starts_with('#'))
            .any(|l| DYNAMIC_MARKERS.iter().any(|m| l.contains(m))),
        ..ResolvConf::default()
    };

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("nameserver") => {
                if let Some(server) = fields.next() {
                    if server == "127.0.0.53" {
                        conf.is_dynamic = true;
                    }
                    conf.nameservers.push(server.to_string());
                }
            }
            Some("search") => conf.search = fields.map(str::to_string).collect(),
            Some("domain") => conf.domain = fields.next().map(str::to_string),
            _ => {}
        }
    }
    conf
}
