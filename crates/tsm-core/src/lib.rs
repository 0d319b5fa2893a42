//! tsm-core: export pipeline for Tiberian Sun unit mods
//!
//! This crate keeps to a small surface:
//! - ini reader/writer that preserves section order and normalizes type lists
//! - injector writing mod units into rules and art documents
//! - MIX archive writer (and index reader) for the game's container format
//! - rule-based validator gating the export
//! - export orchestration and zip packaging
//!
pub mod config;
pub mod error;
pub mod export;
pub mod ini;
pub mod inject;
pub mod json;
pub mod mix;
pub mod model;
pub mod validate;

pub use config::ExportOptions;
pub use error::{Error, Result};
pub use export::{
    AssetSource, DirSource, ExportArtifacts, ExportControl, Stage, collect_assets, export_mod,
    write_package,
};
pub use ini::{ConfigDocument, next_index, parse as parse_config, stringify as stringify_config};
pub use inject::{InjectEvent, add_art_definitions, add_unit_definitions, inject_type_list_entries};
pub use mix::{MixArchive, MixIndex, build_archive, mix_hash};
pub use model::{ArtOverrides, Category, Faction, Foundation, ModUnit, RenderType, RulesOverrides};
pub use validate::{Severity, ValidationIssue, run_validation};
