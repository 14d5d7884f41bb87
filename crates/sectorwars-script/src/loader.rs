//! RON configuration loader

use crate::error::{Error, Result};
use crate::schema::faction::{FactionDef, FactionDefs};
use sectorwars_core::{EconomyConfig, FactionId, FactionRelation, Stance};
use std::fs;
use std::path::{Path, PathBuf};

/// Loaded economy data
#[derive(Debug, Clone, Default)]
pub struct EconomyDefs {
    /// Validated configuration, relation table merged from the factions
    pub config: EconomyConfig,
    /// Faction definitions by ID
    pub factions: FactionDefs,
}

impl EconomyDefs {
    /// Get a faction definition
    pub fn get_faction(&self, id: &FactionId) -> Option<&FactionDef> {
        self.factions.get(id)
    }
}

/// Top-level shape of a faction file
#[derive(serde::Deserialize)]
struct FactionFile {
    factions: Vec<FactionDef>,
}

/// Loader for RON economy files
pub struct Loader {
    economy: Option<EconomyConfig>,
    factions: FactionDefs,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            economy: None,
            factions: FactionDefs::new(),
        }
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.load_named_str(filename, &content)?;
        tracing::info!(path = %path.display(), "economy data loaded");
        Ok(())
    }

    /// Route file content to the faction or economy parser
    ///
    /// Files named after factions are always faction files. Any other file
    /// is a faction file only if it has a top-level `factions` list.
    fn load_named_str(&mut self, filename: &str, content: &str) -> Result<()> {
        if filename.contains("faction") {
            return self.load_factions_str(content);
        }
        match ron::from_str::<FactionFile>(content) {
            Ok(file) => self.add_factions(file.factions),
            Err(_) => self.load_economy_str(content),
        }
    }

    /// Load the balancing tables from a RON string
    ///
    /// Omitted sections and fields keep their built-in values.
    pub fn load_economy_str(&mut self, content: &str) -> Result<()> {
        if self.economy.is_some() {
            return Err(Error::DuplicateDefinition("economy config".to_string()));
        }
        let config: EconomyConfig = ron::from_str(content)?;
        self.economy = Some(config);
        Ok(())
    }

    /// Load faction definitions from a RON string
    pub fn load_factions_str(&mut self, content: &str) -> Result<()> {
        let file: FactionFile = ron::from_str(content)?;
        self.add_factions(file.factions)
    }

    fn add_factions(&mut self, factions: Vec<FactionDef>) -> Result<()> {
        for faction in factions {
            if faction.id.as_str().is_empty() {
                return Err(Error::MissingField(format!("id of faction {:?}", faction.name)));
            }
            let id = faction.id.clone();
            if self.factions.contains_key(&id) {
                return Err(Error::DuplicateDefinition(id.to_string()));
            }
            tracing::debug!(faction = %id, strict = faction.strict, "faction defined");
            self.factions.insert(id, faction);
        }
        Ok(())
    }

    /// Load all RON files from a directory, in file name order
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Merge factions into the configuration and validate the result
    pub fn finish(self) -> Result<EconomyDefs> {
        let mut config = self.economy.unwrap_or_default();
        if !self.factions.is_empty() {
            config.reputation.relations = relations_from(&self.factions)?;
            config.reputation.strict_factions = self
                .factions
                .values()
                .filter(|f| f.strict)
                .map(|f| f.id.clone())
                .collect();
        }
        config.validate()?;
        tracing::info!(
            factions = self.factions.len(),
            relations = config.reputation.relations.len(),
            "economy config ready"
        );
        Ok(EconomyDefs {
            config,
            factions: self.factions,
        })
    }

    /// Faction definitions loaded so far
    pub fn factions(&self) -> &FactionDefs {
        &self.factions
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and validate every RON file under `dir`
pub fn load_config(dir: impl AsRef<Path>) -> Result<EconomyConfig> {
    let mut loader = Loader::new();
    loader.load_directory(dir)?;
    Ok(loader.finish()?.config)
}

/// Build the symmetric relation table from per-faction ally/enemy lists
///
/// A relation may be declared from either side (or both) but never with
/// two different stances.
fn relations_from(factions: &FactionDefs) -> Result<Vec<FactionRelation>> {
    let mut relations: Vec<FactionRelation> = Vec::new();
    for faction in factions.values() {
        let declared = faction
            .allies
            .iter()
            .map(|other| (other, Stance::Ally))
            .chain(faction.enemies.iter().map(|other| (other, Stance::Enemy)));
        for (other, stance) in declared {
            if other == &faction.id {
                return Err(Error::InvalidSchema(format!(
                    "faction {} lists itself as ally or enemy",
                    faction.id
                )));
            }
            if !factions.contains_key(other) {
                return Err(Error::UnknownFaction {
                    referenced: other.to_string(),
                    by: faction.id.to_string(),
                });
            }
            let existing = relations
                .iter()
                .find(|r| r.counterpart(&faction.id) == Some(other));
            match existing {
                Some(r) if r.stance != stance => {
                    return Err(Error::InvalidSchema(format!(
                        "factions {} and {} are declared both ally and enemy",
                        faction.id, other
                    )));
                }
                Some(_) => {}
                None => relations.push(FactionRelation::new(
                    faction.id.clone(),
                    other.clone(),
                    stance,
                )),
            }
        }
    }
    Ok(relations)
}
