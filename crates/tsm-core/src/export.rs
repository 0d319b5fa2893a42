//! Export pipeline: validate, inject, serialize, fetch assets, pack.
//!
//! Nothing is fetched until validation reports zero errors. Cancellation is
//! checked before each stage; a stage that has started runs to completion.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::FileOptions;

use crate::config::ExportOptions;
use crate::error::{Error, Result};
use crate::ini::{self, Banner};
use crate::inject::{
    InjectEvent, add_art_definitions_with, add_unit_definitions_with,
    inject_type_list_entries_with,
};
use crate::json::report_json;
use crate::mix::MixArchive;
use crate::model::ModUnit;
use crate::validate::{ValidationIssue, error_count, run_validation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Parse,
    Inject,
    Serialize,
    FetchAssets,
    Pack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Validate => "validate",
            Stage::Parse => "parse",
            Stage::Inject => "inject",
            Stage::Serialize => "serialize",
            Stage::FetchAssets => "fetch-assets",
            Stage::Pack => "pack",
        };
        f.write_str(s)
    }
}

/// Where referenced asset files come from.
pub trait AssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

impl AssetSource for HashMap<String, Vec<u8>> {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.get(path).cloned().ok_or_else(|| Error::AssetNotFound {
            path: path.to_string(),
            tried: Vec::new(),
        })
    }
}

/// Reads assets below `root`, retrying under `root/<namespace>/` when the
/// primary read fails.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    fallback_namespace: Option<String>,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fallback_namespace: None,
        }
    }

    pub fn with_fallback(mut self, namespace: Option<String>) -> Self {
        self.fallback_namespace = namespace;
        self
    }

    fn candidates(&self, path: &str) -> Vec<PathBuf> {
        let rel = path.trim_start_matches(['/', '\\']);
        let mut out = vec![self.root.join(rel)];
        if let Some(ns) = &self.fallback_namespace {
            out.push(self.root.join(ns).join(rel));
        }
        out
    }
}

impl AssetSource for DirSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let tried = self.candidates(path);
        for candidate in &tried {
            match fs::read(candidate) {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    tracing::debug!(path = %candidate.display(), error = %e, "asset read failed")
                }
            }
        }
        Err(Error::AssetNotFound {
            path: path.to_string(),
            tried,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Cache,
    Expansion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Path as given on the unit.
    pub path: String,
    /// Entry name inside the archive.
    pub name: String,
    pub kind: ArchiveKind,
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Files the units reference, routed to their archive. Repeated names within
/// one archive are kept once, first occurrence wins.
pub fn collect_assets(units: &[ModUnit]) -> Vec<AssetRef> {
    let mut out: Vec<AssetRef> = Vec::new();
    for unit in units {
        let f = &unit.files;
        let routed = [
            (&f.sprite, ArchiveKind::Cache),
            (&f.icon, ArchiveKind::Cache),
            (&f.buildup, ArchiveKind::Cache),
            (&f.voxel, ArchiveKind::Expansion),
            (&f.voxel_anim, ArchiveKind::Expansion),
            (&f.turret, ArchiveKind::Expansion),
            (&f.barrel, ArchiveKind::Expansion),
        ];
        for (path, kind) in routed {
            let Some(path) = path.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
                continue;
            };
            let name = base_name(path);
            if out
                .iter()
                .any(|a| a.kind == kind && a.name.eq_ignore_ascii_case(name))
            {
                continue;
            }
            out.push(AssetRef {
                path: path.to_string(),
                name: name.to_string(),
                kind,
            });
        }
    }
    out
}

/// Caller hooks for one export run.
#[derive(Default)]
pub struct ExportControl<'a> {
    pub cancel: Option<&'a AtomicBool>,
    pub on_stage: Option<&'a mut dyn FnMut(Stage)>,
    pub on_event: Option<&'a mut dyn FnMut(&InjectEvent)>,
}

#[derive(Debug, Clone)]
pub struct ExportArtifacts {
    pub rules_name: String,
    pub rules: String,
    pub art_name: String,
    pub art: String,
    /// `(file name, archive bytes)`; an archive with nothing routed to it is omitted.
    pub archives: Vec<(String, Vec<u8>)>,
    /// Warnings and infos that did not block the export.
    pub issues: Vec<ValidationIssue>,
    pub report: Option<String>,
}

impl ExportArtifacts {
    /// Every generated file as `(name, contents)`.
    pub fn files(&self) -> Vec<(&str, &[u8])> {
        let mut out: Vec<(&str, &[u8])> = vec![
            (self.rules_name.as_str(), self.rules.as_bytes()),
            (self.art_name.as_str(), self.art.as_bytes()),
        ];
        for (name, bytes) in &self.archives {
            out.push((name.as_str(), bytes.as_slice()));
        }
        if let Some(report) = &self.report {
            out.push((REPORT_NAME, report.as_bytes()));
        }
        out
    }
}

pub const REPORT_NAME: &str = "validation_report.json";

pub fn export_mod(
    units: &[ModUnit],
    rules_base: &str,
    art_base: &str,
    source: &dyn AssetSource,
    options: &ExportOptions,
    control: ExportControl<'_>,
) -> Result<ExportArtifacts> {
    let ExportControl {
        cancel,
        mut on_stage,
        mut on_event,
    } = control;
    let mut enter = |stage: Stage| -> Result<()> {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            tracing::info!(%stage, "export cancelled");
            return Err(Error::Cancelled { stage });
        }
        tracing::info!(%stage, "export stage");
        if let Some(f) = on_stage.as_mut() {
            f(stage);
        }
        Ok(())
    };
    let mut notify = |e: &InjectEvent| {
        if let Some(f) = on_event.as_mut() {
            f(e);
        }
    };

    enter(Stage::Validate)?;
    let issues = run_validation(units);
    let errors = error_count(&issues);
    if errors > 0 {
        tracing::warn!(errors, "validation blocked the export");
        return Err(Error::ValidationFailed { errors });
    }

    enter(Stage::Parse)?;
    let rules = ini::parse(rules_base);
    let art = ini::parse(art_base);

    enter(Stage::Inject)?;
    let rules = inject_type_list_entries_with(rules, units, &mut notify);
    let rules = add_unit_definitions_with(rules, units, &mut notify);
    let art = add_art_definitions_with(art, units, &mut notify);

    enter(Stage::Serialize)?;
    let banner = Banner::now(&options.tool_name);
    let rules = ini::stringify_with(&rules, &banner);
    let art = ini::stringify_with(&art, &banner);
    let report = if options.include_report {
        Some(report_json(&issues)?)
    } else {
        None
    };

    enter(Stage::FetchAssets)?;
    let mut cache: Vec<(String, Vec<u8>)> = Vec::new();
    let mut expansion: Vec<(String, Vec<u8>)> = Vec::new();
    for asset in collect_assets(units) {
        let bytes = source.fetch(&asset.path)?;
        match asset.kind {
            ArchiveKind::Cache => cache.push((asset.name, bytes)),
            ArchiveKind::Expansion => expansion.push((asset.name, bytes)),
        }
    }

    enter(Stage::Pack)?;
    let mut archives = Vec::new();
    for (name, files) in [
        (&options.cache_archive, cache),
        (&options.expansion_archive, expansion),
    ] {
        if files.is_empty() {
            tracing::debug!(archive = %name, "no files routed, archive omitted");
            continue;
        }
        let mix = MixArchive::build(&files)?;
        tracing::info!(
            archive = %name,
            entries = mix.entries().len(),
            bytes = mix.as_bytes().len(),
            "archive built"
        );
        archives.push((name.clone(), mix.into_bytes()));
    }

    Ok(ExportArtifacts {
        rules_name: options.rules_file_name.clone(),
        rules,
        art_name: options.art_file_name.clone(),
        art,
        archives,
        issues,
        report,
    })
}

/// Zip the skeleton tree and the generated files into `dest`. Generated files
/// take precedence over skeleton files with the same name.
pub fn write_package(
    dest: &Path,
    artifacts: &ExportArtifacts,
    skeleton: Option<&Path>,
) -> Result<()> {
    let generated = artifacts.files();
    let file = fs::File::create(dest)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    if let Some(base) = skeleton {
        for entry in WalkDir::new(base).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            let Ok(rel) = path.strip_prefix(base) else {
                continue;
            };
            if rel.as_os_str().is_empty() {
                continue;
            }
            let name = rel.to_string_lossy().replace('\\', "/");
            if path.is_dir() {
                zip.add_directory(name, options)?;
                continue;
            }
            if generated.iter().any(|(g, _)| g.eq_ignore_ascii_case(&name)) {
                tracing::debug!(file = %name, "skeleton file replaced by generated output");
                continue;
            }
            zip.start_file(name, options)?;
            zip.write_all(&fs::read(path)?)?;
        }
    }

    for (name, contents) in &generated {
        zip.start_file(*name, options)?;
        zip.write_all(contents)?;
    }
    zip.finish()?;
    tracing::info!(path = %dest.display(), files = generated.len(), "package written");
    Ok(())
}
