//! Generation driver
//!
//! Runs every enabled module against a [`SystemContext`], groups the resulting
//! blocks into a document tree for the configured modularization level, and
//! saves it.

use crate::config::GenerationConfig;
use crate::document::{ModularizationLevel, NixFile, OptionBlock, SavedFile};
use crate::error::ScribeError;
use crate::modules::{builtin_modules, DynModule};
use crate::nix::WriterOptions;
use crate::system::SystemContext;
use dialoguer::Confirm;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened to one module during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum ModuleStatus {
    Generated,
    NothingToConfigure,
    Disabled,
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOutcome {
    pub name: &'static str,
    pub category: &'static str,
    pub status: ModuleStatus,
}

/// Result of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub level: ModularizationLevel,
    pub outcomes: Vec<ModuleOutcome>,
    pub saved: SavedFile,
}

impl GenerationReport {
    pub fn generated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ModuleStatus::Generated)
            .count()
    }
}

/// A block together with the module that produced it.
struct Generated {
    module: &'static str,
    category: &'static str,
    block: OptionBlock,
}

pub struct Scribe {
    config: GenerationConfig,
    modules: Vec<Box<dyn DynModule>>,
}

impl Scribe {
    /// A driver over the built-in modules.
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_modules(config, builtin_modules())
    }

    pub fn with_modules(config: GenerationConfig, modules: Vec<Box<dyn DynModule>>) -> Self {
        Self { config, modules }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Scan the system, build the document tree and save it.
    pub fn generate(&self, system: &mut SystemContext) -> Result<GenerationReport, ScribeError> {
        let (outcomes, generated) = self.run_modules(system)?;
        let root = self.assemble(generated);

        let options = if self.config.comments {
            WriterOptions::default()
        } else {
            WriterOptions::without_comments()
        };
        let saved = root.save_with(
            &self.config.output_path,
            self.config.modularization,
            options,
            &*system,
        )?;

        Ok(GenerationReport {
            level: self.config.modularization,
            outcomes,
            saved,
        })
    }

    fn run_modules(
        &self,
        system: &mut SystemContext,
    ) -> Result<(Vec<ModuleOutcome>, Vec<Generated>), ScribeError> {
        let mut outcomes = Vec::with_capacity(self.modules.len());
        let mut generated = Vec::new();
        let mut declined = false;

        for module in &self.modules {
            let (name, category) = (module.name(), module.category());
            if self.config.disabled_modules.contains(name) {
                debug!(module = name, "Module disabled");
                outcomes.push(ModuleOutcome {
                    name,
                    category,
                    status: ModuleStatus::Disabled,
                });
                continue;
            }

            let mut result = module.generate(&*system);
            let refusal = result
                .as_ref()
                .err()
                .filter(|e| e.is_elevation_request())
                .map(|e| e.to_string());
            if let Some(refusal) = refusal {
                if !declined && !system.use_sudo() {
                    if self.escalate(name, &refusal, system)? {
                        result = module.generate(&*system);
                    } else {
                        declined = true;
                    }
                }
            }

            let status = match result {
                Ok(Some(block)) => {
                    generated.push(Generated {
                        module: name,
                        category,
                        block,
                    });
                    ModuleStatus::Generated
                }
                Ok(None) => ModuleStatus::NothingToConfigure,
                Err(e) if e.is_elevation_request() => {
                    warn!(module = name, error = %e, "Skipping module, elevated access required");
                    ModuleStatus::Skipped(e.to_string())
                }
                Err(e) => return Err(e),
            };
            info!(module = name, status = ?status, "Module finished");
            outcomes.push(ModuleOutcome {
                name,
                category,
                status,
            });
        }
        Ok((outcomes, generated))
    }

    /// Offer to enable sudo after a refused access. Only interactive runs ask.
    fn escalate(
        &self,
        module: &str,
        refusal: &str,
        system: &mut SystemContext,
    ) -> Result<bool, ScribeError> {
        if !self.config.interactive {
            return Ok(false);
        }
        let prompt = format!("{} (module '{}'). Retry with sudo?", refusal, module);
        let accepted = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| ScribeError::Prompt(e.to_string()))?;
        if !accepted {
            return Ok(false);
        }
        match system.verify_sudo() {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Could not obtain sudo");
                Ok(false)
            }
        }
    }

    /// Arrange generated blocks into the document tree for the configured level.
    fn assemble(&self, generated: Vec<Generated>) -> NixFile {
        let mut root = NixFile::new(&self.config.root_name, &self.config.description);

        match self.config.modularization {
            ModularizationLevel::SingleFile => {
                for item in generated {
                    root.add_block(item.block);
                }
            }
            ModularizationLevel::HighLevel => {
                for (category, items) in by_category(generated) {
                    let mut file = NixFile::new(category, "");
                    for item in items {
                        file.add_block(item.block);
                    }
                    root.add_import(file);
                }
            }
            ModularizationLevel::ComponentLevel => {
                for (category, items) in by_category(generated) {
                    let mut file = NixFile::new(category, "");
                    for item in items {
                        let mut component = NixFile::new(item.module, "");
                        component.add_block(item.block);
                        file.add_import(component);
                    }
                    root.add_import(file);
                }
            }
        }

        for import in &self.config.extra_imports {
            root.add_import(import.as_str());
        }
        root
    }
}

/// Group by category, keeping first-seen order.
fn by_category(generated: Vec<Generated>) -> IndexMap<&'static str, Vec<Generated>> {
    let mut groups: IndexMap<&'static str, Vec<Generated>> = IndexMap::new();
    for item in generated {
        groups.entry(item.category).or_default().push(item);
    }
    groups
}
