//! Resolution pipeline: reads data files, resolves capacity references,
//! builds the facility catalog.
//!
//! A data directory holds `facilities.{ron,toml,json}` and, optionally,
//! `capacities.{ron,toml,json}`. When capacities are declared, every grant
//! and consume must name one of them; otherwise the capacity names are taken
//! from the facilities as written.

use crate::schema::{CapacityData, CapacityDefData, FacilityData};
use outpost_core::catalog::{Catalog, CatalogBuilder, CatalogError, FacilityType};
use outpost_core::floorplan::Floorplan;
use outpost_core::grid::Footprint;
use outpost_core::ledger::CapacityLedger;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// Every game needs exactly one facility type marked `access_lift`.
    #[error("no access lift declared in {file}")]
    MissingAccessLift { file: PathBuf },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for `{base_name}.ron`, `.toml` or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at
/// `toml_key` from the top-level table. RON and JSON hold a bare list.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let mut table: toml::Table =
                toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table.remove(toml_key).ok_or_else(|| {
                parse_error(path, format!("missing key '{toml_key}' in TOML file"))
            })?;
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Fail with `UnresolvedRef` if `name` was never declared.
pub fn resolve_name(
    names: &HashSet<String>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<(), DataLoadError> {
    if names.contains(name) {
        Ok(())
    } else {
        Err(DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind,
        })
    }
}

/// Fail with `DuplicateName` if `name` is already declared.
pub fn check_duplicate(
    names: &HashSet<String>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if names.contains(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// Everything a game needs to create floorplans.
#[derive(Debug, Clone)]
pub struct GameData {
    pub catalog: Arc<Catalog>,
    /// Capacity names in declaration order, or sorted when inferred.
    pub capacities: Vec<String>,
}

impl GameData {
    /// A ledger with a zeroed entry for every known capacity.
    pub fn new_ledger(&self) -> CapacityLedger {
        CapacityLedger::with_capacities(self.capacities.iter().cloned())
    }

    /// An empty floorplan sharing this catalog.
    pub fn new_floorplan(&self) -> Floorplan {
        Floorplan::with_ledger(self.catalog.clone(), self.new_ledger())
    }
}

/// Load facility and capacity definitions from a data directory.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let declared = match find_data_file(dir, "capacities")? {
        Some(path) => Some(load_capacities(&path)?),
        None => None,
    };

    let facilities_path = require_data_file(dir, "facilities")?;
    let facilities: Vec<FacilityData> = deserialize_list(&facilities_path, "facilities")?;

    let mut builder = CatalogBuilder::new();
    let mut names = HashSet::new();
    let mut referenced = BTreeSet::new();

    for data in &facilities {
        check_duplicate(&names, &data.name, &facilities_path)?;
        names.insert(data.name.clone());

        for cap in data.grants.iter().chain(&data.consumes) {
            if let Some((declared_names, _)) = &declared {
                resolve_name(declared_names, cap.capacity(), &facilities_path, "capacity")?;
            }
            referenced.insert(cap.capacity().to_string());
        }

        builder.register(facility_type(data))?;
    }

    let catalog = builder.build()?;
    if catalog.access_lift().is_none() {
        return Err(DataLoadError::MissingAccessLift {
            file: facilities_path,
        });
    }

    let capacities = match declared {
        Some((_, order)) => order,
        None => referenced.into_iter().collect(),
    };

    log::info!(
        "loaded {} facility types and {} capacities from {}",
        catalog.len(),
        capacities.len(),
        dir.display()
    );

    Ok(GameData {
        catalog: Arc::new(catalog),
        capacities,
    })
}

/// Capacity names as a set and in declaration order.
fn load_capacities(path: &Path) -> Result<(HashSet<String>, Vec<String>), DataLoadError> {
    let defs: Vec<CapacityDefData> = deserialize_list(path, "capacities")?;
    let mut names = HashSet::new();
    let mut order = Vec::with_capacity(defs.len());
    for def in defs {
        check_duplicate(&names, &def.name, path)?;
        names.insert(def.name.clone());
        order.push(def.name);
    }
    Ok((names, order))
}

fn facility_type(data: &FacilityData) -> FacilityType {
    let footprint = Footprint::new(data.footprint.width, data.footprint.height);
    let mut ty = FacilityType::new(data.name.clone(), footprint)
        .with_build_duration(data.build_seconds)
        .with_costs(data.build_cost, data.scrap_revenue);
    if data.access_lift {
        ty = ty.access_lift();
    } else if data.unique {
        ty = ty.base_unique();
    }
    ty = data
        .grants
        .iter()
        .fold(ty, |ty, cap: &CapacityData| ty.granting(cap.capacity(), cap.amount()));
    data.consumes
        .iter()
        .fold(ty, |ty, cap| ty.consuming(cap.capacity(), cap.amount()))
}

// ===========================================================================
// Tests
// ===========================================================================
