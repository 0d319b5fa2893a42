//! Pre-export checks on mod units.
//!
//! Rules are plain `(id, severity, check)` rows. Only `Error` issues block an
//! export; suggestions are offered to the caller and never applied here.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{Category, Faction, Foundation, ModUnit, RenderType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Unit attribute an issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    InternalName,
    Prerequisite,
    Owner,
    TechLevel,
    VoxelFiles,
    Cameo,
    Cost,
    Strength,
    Foundation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub pass: bool,
    pub message: Option<String>,
    pub suggestion: Option<String>,
    pub auto_fix: bool,
    pub field: Option<Field>,
}

impl Outcome {
    fn pass() -> Self {
        Self {
            pass: true,
            ..Self::default()
        }
    }
    fn fail(field: Field, message: impl Into<String>) -> Self {
        Self {
            pass: false,
            message: Some(message.into()),
            field: Some(field),
            ..Self::default()
        }
    }
    fn suggest(mut self, value: impl Into<String>) -> Self {
        self.suggestion = Some(value.into());
        self
    }
    fn auto_fix(mut self) -> Self {
        self.auto_fix = true;
        self
    }
}

pub struct Rule {
    pub id: &'static str,
    pub severity: Severity,
    pub check: fn(&ModUnit) -> Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub unit_id: String,
    pub unit_name: String,
    pub rule_id: &'static str,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub auto_fix: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

/// Ids shipped with the base game.
pub const BASE_GAME_IDS: &[&str] = &[
    // infantry
    "E1", "E2", "E3", "E4", "MEDIC", "ENGINEER", "JUMPJET", "GHOST", "CYBORG", "CYC2", "MUTANT",
    "MWMN", "MUTANT3", "TRATOS", "OXANNA", "SLAV", "UMAGON", "CHAMSPY", "DOGGIE", "VISSML",
    "VISLRG", "CIV1", "CIV2", "CIV3", "CTECH", "WEEDGUY", "MHIJACK",
    // vehicles
    "APC", "HVR", "SMECH", "BIKE", "BGGY", "SAPC", "SUBTANK", "MMCH", "HMEC", "ART2", "REPAIR",
    "TTNK", "STNK", "LPST", "HARV", "WEED", "MCV", "TRUCKA", "TRUCKB", "SONIC", "JUGG",
    "GGHUNT", "MOBILEEMP", "FV", "LIMPET",
    // aircraft
    "ORCA", "ORCAB", "ORCATRAN", "TRNSPORT", "SCRIN", "APACHE", "ORCAFRAG", "FIREBOMB",
    "DSHP", "ORCASTRK",
    // structures
    "GACNST", "NACNST", "GAPOWR", "NAPOWR", "NAAPWR", "GAPILE", "NAHAND", "GAWEAP", "NAWEAP",
    "GAREFN", "NAREFN", "GAHPAD", "NAHPAD", "GARADR", "NARADR", "GATECH", "NATECH", "GADEPT",
    "GAPLUG", "NATMPL", "NASTLH", "NAMISL", "GAWALL", "NAWALL", "GAGATE", "NAGATE", "GACTWR",
    "GAVULC", "GAROCK", "NAOBEL", "NALASR", "NASAM", "GAFIRE", "GASPOT", "GACSPH", "NAFLAT",
    "NAWAST", "GAICBM", "GAARTY",
];

const MISTAKEN_PREREQUISITES: [&str; 5] = ["BARRACKS", "GABARR", "TENT", "REFINERY", "FACTORY"];

static INTERNAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)^[A-Z0-9]{1,8}$").expect("internal name pattern compiles")
});

pub const RULES: &[Rule] = &[
    Rule {
        id: "internal-name-format",
        severity: Severity::Error,
        check: check_internal_name,
    },
    Rule {
        id: "name-collision",
        severity: Severity::Warning,
        check: check_name_collision,
    },
    Rule {
        id: "prerequisite-validity",
        severity: Severity::Error,
        check: check_prerequisite,
    },
    Rule {
        id: "owner-exists",
        severity: Severity::Error,
        check: check_owner,
    },
    Rule {
        id: "tech-level-valid",
        severity: Severity::Warning,
        check: check_tech_level,
    },
    Rule {
        id: "voxel-files-required",
        severity: Severity::Error,
        check: check_voxel_files,
    },
    Rule {
        id: "cameo-naming",
        severity: Severity::Info,
        check: check_cameo,
    },
    Rule {
        id: "cost-zero",
        severity: Severity::Warning,
        check: check_cost,
    },
    Rule {
        id: "strength-zero",
        severity: Severity::Error,
        check: check_strength,
    },
    Rule {
        id: "foundation-valid",
        severity: Severity::Error,
        check: check_foundation,
    },
];

fn check_internal_name(unit: &ModUnit) -> Outcome {
    let name = unit.internal_name.as_str();
    if name.is_empty() {
        return Outcome::fail(Field::InternalName, "internal name is required");
    }
    if INTERNAL_NAME.is_match(name) {
        return Outcome::pass();
    }
    let fixed: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(8)
        .collect();
    let out = Outcome::fail(
        Field::InternalName,
        format!("internal name '{name}' must be 1-8 letters or digits"),
    );
    if fixed.is_empty() {
        out
    } else {
        out.suggest(fixed).auto_fix()
    }
}

fn check_name_collision(unit: &ModUnit) -> Outcome {
    let id = unit.section_id();
    if !BASE_GAME_IDS.contains(&id.as_str()) {
        return Outcome::pass();
    }
    let head: String = id.chars().take(5).collect();
    Outcome::fail(
        Field::InternalName,
        format!("'{id}' replaces a base game unit"),
    )
    .suggest(format!("{head}X"))
}

fn check_prerequisite(unit: &ModUnit) -> Outcome {
    let Some(prereq) = unit.rules_overrides.prerequisite.as_deref() else {
        return Outcome::pass();
    };
    let token = prereq.trim().to_ascii_uppercase();
    if !MISTAKEN_PREREQUISITES.contains(&token.as_str()) {
        return Outcome::pass();
    }
    let gdi = unit.faction == Faction::Gdi;
    let suggestion = match (unit.category, gdi) {
        (Category::Infantry, true) => "GAPILE",
        (Category::Infantry, false) => "NAHAND",
        (_, true) => "GAWEAP",
        (_, false) => "NAWEAP",
    };
    Outcome::fail(
        Field::Prerequisite,
        format!("prerequisite '{prereq}' is not a building id the game knows"),
    )
    .suggest(suggestion)
    .auto_fix()
}

fn check_owner(unit: &ModUnit) -> Outcome {
    let blank = unit
        .rules_overrides
        .owner
        .as_deref()
        .is_none_or(|o| o.trim().is_empty());
    if !blank {
        return Outcome::pass();
    }
    Outcome::fail(Field::Owner, "no owner set; nobody can build this unit")
        .suggest(unit.faction.as_str())
        .auto_fix()
}

fn check_tech_level(unit: &ModUnit) -> Outcome {
    match unit.tech_level {
        -1 => Outcome::fail(Field::TechLevel, "tech level -1 makes the unit unbuildable"),
        t if t > 10 => {
            Outcome::fail(Field::TechLevel, format!("tech level {t} is above 10")).suggest("10")
        }
        _ => Outcome::pass(),
    }
}

fn check_voxel_files(unit: &ModUnit) -> Outcome {
    if unit.render_type != RenderType::Voxel {
        return Outcome::pass();
    }
    let missing = |p: &Option<String>| p.as_deref().is_none_or(|s| s.trim().is_empty());
    if missing(&unit.files.voxel) || missing(&unit.files.voxel_anim) {
        return Outcome::fail(
            Field::VoxelFiles,
            "voxel units need both a body (.vxl) and an animation (.hva) file",
        );
    }
    Outcome::pass()
}

fn check_cameo(unit: &ModUnit) -> Outcome {
    let Some(cameo) = unit.art_overrides.cameo.as_deref() else {
        return Outcome::pass();
    };
    let convention = unit.cameo_convention();
    if cameo == convention {
        return Outcome::pass();
    }
    Outcome::fail(
        Field::Cameo,
        format!("cameo '{cameo}' does not follow the <id>ICON convention"),
    )
    .suggest(convention)
}

fn check_cost(unit: &ModUnit) -> Outcome {
    if unit.cost > 0 {
        return Outcome::pass();
    }
    Outcome::fail(Field::Cost, format!("cost {} makes the unit free", unit.cost))
}

fn check_strength(unit: &ModUnit) -> Outcome {
    if unit.strength > 0 {
        return Outcome::pass();
    }
    Outcome::fail(Field::Strength, "strength must be above 0").suggest("200")
}

fn check_foundation(unit: &ModUnit) -> Outcome {
    let listed = unit
        .foundation
        .as_deref()
        .is_some_and(|f| Foundation::ALL.iter().any(|ok| ok.as_str() == f));
    if unit.category != Category::Structure || listed {
        return Outcome::pass();
    }
    let message = match unit.foundation.as_deref() {
        None => "structures need a foundation".to_string(),
        Some(f) => format!("foundation '{f}' is not a supported size"),
    };
    Outcome::fail(Field::Foundation, message).suggest("3x2")
}

/// Run every rule against every unit; one issue per failing pair.
pub fn run_validation(units: &[ModUnit]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for unit in units {
        for rule in RULES {
            let outcome = (rule.check)(unit);
            if outcome.pass {
                continue;
            }
            issues.push(ValidationIssue {
                unit_id: unit.id.clone(),
                unit_name: unit.internal_name.clone(),
                rule_id: rule.id,
                severity: rule.severity,
                message: outcome.message.unwrap_or_else(|| rule.id.to_string()),
                suggestion: outcome.suggestion,
                auto_fix: outcome.auto_fix,
                field: outcome.field,
            });
        }
    }
    tracing::debug!(units = units.len(), issues = issues.len(), "validation finished");
    issues
}

pub fn error_count(issues: &[ValidationIssue]) -> usize {
    issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count()
}

/// True when nothing blocks the export.
pub fn is_exportable(issues: &[ValidationIssue]) -> bool {
    error_count(issues) == 0
}
