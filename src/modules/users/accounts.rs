//! Normal user accounts

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::{read_optional, Module};
use crate::nix::{AttrSet, Value};
use crate::parsers::{parse_group, parse_passwd, parse_shadow, parse_subids};
use crate::system::SystemAccess;
use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Lowest uid given to normal users.
pub const FIRST_NORMAL_UID: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRange {
    pub start: u64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIr {
    pub uid: u32,
    pub gid: u32,
    pub description: String,
    pub home: String,
    pub shell: String,
    pub group: String,
    pub extra_groups: Vec<String>,
    pub hashed_password: Option<String>,
    pub expires: Option<u64>,
    pub authorized_keys: Vec<String>,
    pub sub_uid_ranges: Vec<IdRange>,
    pub sub_gid_ranges: Vec<IdRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsersIr {
    pub users: IndexMap<String, UserIr>,
}

pub struct Users;

/// Shell package for a login shell path.
fn shell_package(shell: &str) -> Option<&'static str> {
    ["bash", "zsh", "fish"]
        .into_iter()
        .find(|name| shell.contains(name))
}

/// Days since the epoch as `YYYY-MM-DD`.
fn epoch_days_to_date(days: u64) -> String {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_days(Days::new(days)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| days.to_string())
}

impl Module for Users {
    type Ir = UsersIr;

    fn name(&self) -> &'static str {
        "users"
    }

    fn category(&self) -> &'static str {
        "users"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<UsersIr, ScribeError> {
        let mut users = IndexMap::new();
        let Some(passwd) = read_optional(system, "/etc/passwd")? else {
            return Ok(UsersIr { users });
        };

        for entry in parse_passwd(&passwd)? {
            if entry.uid < FIRST_NORMAL_UID || entry.name == "nobody" {
                continue;
            }
            let description = entry.gecos.split(',').next().unwrap_or_default().to_string();
            users.insert(
                entry.name,
                UserIr {
                    uid: entry.uid,
                    gid: entry.gid,
                    description,
                    home: entry.home,
                    shell: entry.shell,
                    ..UserIr::default()
                },
            );
        }

        // Root-only; a refusal surfaces as an elevation request.
        if let Some(shadow) = read_optional(system, "/etc/shadow")? {
            for entry in parse_shadow(&shadow)? {
                if let Some(user) = users.get_mut(&entry.name) {
                    if entry.has_password() {
                        user.hashed_password = Some(entry.hash.clone());
                    }
                    user.expires = entry.expires;
                }
            }
        }

        let groups = match read_optional(system, "/etc/group")? {
            Some(text) => parse_group(&text)?,
            None => Vec::new(),
        };
        let group_names: HashMap<u32, &str> =
            groups.iter().map(|g| (g.gid, g.name.as_str())).collect();
        for (name, user) in users.iter_mut() {
            user.group = group_names.get(&user.gid).unwrap_or(&"users").to_string();
            user.extra_groups = groups
                .iter()
                .filter(|g| g.name != user.group && g.members.iter().any(|m| m == name))
                .map(|g| g.name.clone())
                .collect();
        }

        for (path, is_uid) in [("/etc/subuid", true), ("/etc/subgid", false)] {
            let Some(text) = read_optional(system, path)? else {
                continue;
            };
            for range in parse_subids(&text)? {
                if let Some(user) = users.get_mut(&range.name) {
                    let id_range = IdRange {
                        start: range.start,
                        count: range.count,
                    };
                    if is_uid {
                        user.sub_uid_ranges.push(id_range);
                    } else {
                        user.sub_gid_ranges.push(id_range);
                    }
                }
            }
        }

        for user in users.values_mut() {
            let path = Path::new(&user.home).join(".ssh/authorized_keys");
            if !system.path_exists(&path) {
                continue;
            }
            match system.read_file(&path) {
                Ok(text) => {
                    user.authorized_keys = text
                        .lines()
                        .map(str::trim)
                        .filter(|k| !k.is_empty() && !k.starts_with('#'))
                        .map(str::to_string)
                        .collect();
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to read authorized keys"),
            }
        }

        Ok(UsersIr { users })
    }

    fn map(&self, ir: UsersIr) -> Option<OptionBlock> {
        if ir.users.is_empty() {
            return None;
        }
        let mut block = OptionBlock::new("users", "User accounts and subordinate ID ranges");
        let mut users = AttrSet::new();
        let mut shells = AttrSet::new();

        for (name, info) in ir.users {
            let mut user = AttrSet::new();
            user.insert("isNormalUser".into(), Value::Bool(true));
            user.insert("uid".into(), Value::from(info.uid));
            user.insert("description".into(), Value::from(info.description));
            user.insert("home".into(), Value::from(info.home));
            user.insert("group".into(), Value::from(info.group));
            if !info.extra_groups.is_empty() {
                user.insert("extraGroups".into(), Value::from(info.extra_groups));
            }
            if let Some(hash) = info.hashed_password {
                user.insert("hashedPassword".into(), Value::from(hash));
            }
            if let Some(days) = info.expires {
                user.insert("expires".into(), Value::from(epoch_days_to_date(days)));
            }
            if let Some(shell) = shell_package(&info.shell) {
                user.insert("shell".into(), Value::literal(format!("pkgs.{}", shell)));
                shells.insert(format!("programs.{}.enable", shell), Value::Bool(true));
                block.add_argument("pkgs");
            }
            if !info.authorized_keys.is_empty() {
                user.insert(
                    "openssh.authorizedKeys.keys".into(),
                    Value::from(info.authorized_keys),
                );
            }
            let ranges = |ranges: Vec<IdRange>, start_key: &str| -> Value {
                Value::List(
                    ranges
                        .into_iter()
                        .map(|r| {
                            Value::attrs_from([
                                (start_key, Value::Int(r.start as i64)),
                                ("count", Value::Int(r.count as i64)),
                            ])
                        })
                        .collect(),
                )
            };
            if !info.sub_uid_ranges.is_empty() {
                user.insert("subUidRanges".into(), ranges(info.sub_uid_ranges, "startUid"));
            }
            if !info.sub_gid_ranges.is_empty() {
                user.insert("subGidRanges".into(), ranges(info.sub_gid_ranges, "startGid"));
            }
            users.insert(name, Value::Attrs(user));
        }

        block.set("users.users", users);
        block.extend(shells);
        Some(block)
    }
}
