//! Account databases: `/etc/passwd`, `/etc/group`, `/etc/shadow`,
//! `/etc/subuid` and `/etc/subgid`

use crate::error::ParseError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home: String,
    pub shell: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    pub name: String,
    pub gid: u32,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShadowEntry {
    pub name: String,
    pub hash: String,
    /// Account expiry, in days since the epoch.
    pub expires: Option<u64>,
}

impl ShadowEntry {
    /// Whether the hash field holds an actual password hash rather than a lock
    /// marker (`!`, `*`, empty).
    pub fn has_password(&self) -> bool {
        self.hash.starts_with('$')
    }
}

/// One `name:start:count` line of a sub-id file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubIdRange {
    pub name: String,
    pub start: u64,
    pub count: u64,
}

fn records(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.split(':').collect()))
}

fn field_error(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::Accounts {
        line,
        message: message.into(),
    }
}

fn number<T: std::str::FromStr>(line: usize, name: &str, value: &str) -> Result<T, ParseError> {
    value
        .parse()
        .map_err(|_| field_error(line, format!("invalid {} '{}'", name, value)))
}

pub fn parse_passwd(text: &str) -> Result<Vec<PasswdEntry>, ParseError> {
    records(text)
        .map(|(line, fields)| {
            if fields.len() < 7 {
                return Err(field_error(line, "expected 7 fields"));
            }
            Ok(PasswdEntry {
                name: fields[0].to_string(),
                uid: number(line, "uid", fields[2])?,
                gid: number(line, "gid", fields[3])?,
                gecos: fields[4].to_string(),
                home: fields[5].to_string(),
                shell: fields[6].to_string(),
            })
        })
        .collect()
}

pub fn parse_group(text: &str) -> Result<Vec<GroupEntry>, ParseError> {
    records(text)
        .map(|(line, fields)| {
            if fields.len() < 4 {
                return Err(field_error(line, "expected 4 fields"));
            }
            Ok(GroupEntry {
                name: fields[0].to_string(),
                gid: number(line, "gid", fields[2])?,
                members: fields[3]
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
        })
        .collect()
}

pub fn parse_shadow(text: &str) -> Result<Vec<ShadowEntry>, ParseError> {
    records(text)
        .map(|(line, fields)| {
            if fields.len() < 2 {
                return Err(field_error(line, "expected at least 2 fields"));
            }
            let expires = match fields.get(7).map(|f| f.trim()) {
                Some(f) if !f.is_empty() => Some(number(line, "expiry", f)?),
                _ => None,
            };
            Ok(ShadowEntry {
                name: fields[0].to_string(),
                hash: fields[1].to_string(),
                expires,
            })
        })
        .collect()
}

pub fn parse_subids(text: &str) -> Result<Vec<SubIdRange>, ParseError> {
    records(text)
        .map(|(line, fields)| {
            if fields.len() < 3 {
                return Err(field_error(line, "expected 3 fields"));
            }
            Ok(SubIdRange {
                name: fields[0].to_string(),
                start: number(line, "start", fields[1])?,
                count: number(line, "count", fields[2])?,
            })
        })
        .collect()
}
