//! Option blocks: the unit of output a module produces

use crate::document::Asset;
use crate::nix::{AttrSet, NixWriter, Value};
use std::collections::BTreeSet;

/// A described group of attributes, the function arguments they need, and the
/// assets they reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionBlock {
    pub name: String,
    pub description: String,
    arguments: BTreeSet<String>,
    data: AttrSet,
    assets: BTreeSet<Asset>,
}

impl OptionBlock {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Set `key` to `value`, registering every asset the value contains.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        value.visit_assets(&mut |asset| {
            self.assets.insert(asset.clone());
        });
        self.data.insert(key.into(), value);
        self
    }

    /// Set every entry of `data`.
    pub fn extend(&mut self, data: AttrSet) -> &mut Self {
        for (key, value) in data {
            self.set(key, value);
        }
        self
    }

    /// Declare a function argument (`pkgs`, `lib`, ...) the attributes refer to.
    pub fn add_argument(&mut self, argument: impl Into<String>) -> &mut Self {
        self.arguments.insert(argument.into());
        self
    }

    /// Register an asset not referenced from any value.
    pub fn register_asset(&mut self, asset: Asset) -> &mut Self {
        self.assets.insert(asset);
        self
    }

    pub fn arguments(&self) -> &BTreeSet<String> {
        &self.arguments
    }

    pub fn data(&self) -> &AttrSet {
        &self.data
    }

    pub fn assets(&self) -> &BTreeSet<Asset> {
        &self.assets
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Description comment, then every attribute followed by a blank line.
    pub fn render(&self, writer: &mut NixWriter) {
        if !self.description.is_empty() {
            writer.write_comment(&self.description);
        }
        writer.write_dict(&self.data);
    }
}
