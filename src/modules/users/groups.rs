//! Non-system user groups

use crate::document::OptionBlock;
use crate::error::ScribeError;
use crate::modules::users::accounts::FIRST_NORMAL_UID;
use crate::modules::{read_optional, Module};
use crate::nix::{AttrSet, Value};
use crate::parsers::parse_group;
use crate::system::SystemAccess;
use indexmap::IndexMap;
use serde::Serialize;

const OVERFLOW_GID: u32 = 65534;
const SKIPPED: [&str; 3] = ["nogroup", "nobody", "nixbld"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupIr {
    pub gid: u32,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupsIr {
    pub groups: IndexMap<String, GroupIr>,
}

pub struct Groups;

impl Module for Groups {
    type Ir = GroupsIr;

    fn name(&self) -> &'static str {
        "groups"
    }

    fn category(&self) -> &'static str {
        "users"
    }

    fn scan(&self, system: &dyn SystemAccess) -> Result<GroupsIr, ScribeError> {
        let Some(text) = read_optional(system, "/etc/group")? else {
            return Ok(GroupsIr::default());
        };

        let groups = parse_group(&text)?
            .into_iter()
            .filter(|g| g.gid >= FIRST_NORMAL_UID && g.gid != OVERFLOW_GID)
            .filter(|g| !SKIPPED.contains(&g.name.as_str()))
            .map(|g| {
                (
                    g.name,
                    GroupIr {
                        gid: g.gid,
                        members: g.members,
                    },
                )
            })
            .collect();
        Ok(GroupsIr { groups })
    }

    fn map(&self, ir: GroupsIr) -> Option<OptionBlock> {
        if ir.groups.is_empty() {
            return None;
        }
        let groups: AttrSet = ir
            .groups
            .into_iter()
            .map(|(name, group)| {
                let mut attrs = AttrSet::new();
                attrs.insert("gid".into(), Value::from(group.gid));
                if !group.members.is_empty() {
                    attrs.insert("members".into(), Value::from(group.members));
                }
                (name, Value::Attrs(attrs))
            })
            .collect();

        let mut block = OptionBlock::new("groups", "Existing user groups");
        block.set("users.groups", groups);
        Some(block)
    }
}
