use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    #[default]
    #[serde(rename = "GDI")]
    Gdi,
    Nod,
    Mutant,
    Neutral,
}

impl Faction {
    pub fn as_str(self) -> &'static str {
        match self {
            Faction::Gdi => "GDI",
            Faction::Nod => "Nod",
            Faction::Mutant => "Mutant",
            Faction::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit category. `Unknown` catches anything the persistence layer sends that
/// the exporter has no type list for; injection skips such units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Infantry,
    Vehicle,
    Aircraft,
    Structure,
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Ordered type-list section the category registers into.
    pub fn type_list(self) -> Option<&'static str> {
        match self {
            Category::Infantry => Some("InfantryTypes"),
            Category::Vehicle => Some("VehicleTypes"),
            Category::Aircraft => Some("AircraftTypes"),
            Category::Structure => Some("BuildingTypes"),
            Category::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderType {
    #[default]
    Sprite,
    Voxel,
}

/// Structure footprint. Only these nine sizes are accepted by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Foundation {
    F2x2,
    F2x3,
    F3x2,
    F3x3,
    F4x2,
    F4x3,
    F2x4,
    F3x4,
    F5x5,
}

impl Foundation {
    pub const ALL: [Foundation; 9] = [
        Foundation::F2x2,
        Foundation::F2x3,
        Foundation::F3x2,
        Foundation::F3x3,
        Foundation::F4x2,
        Foundation::F4x3,
        Foundation::F2x4,
        Foundation::F3x4,
        Foundation::F5x5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Foundation::F2x2 => "2x2",
            Foundation::F2x3 => "2x3",
            Foundation::F3x2 => "3x2",
            Foundation::F3x3 => "3x3",
            Foundation::F4x2 => "4x2",
            Foundation::F4x3 => "4x3",
            Foundation::F2x4 => "2x4",
            Foundation::F3x4 => "3x4",
            Foundation::F5x5 => "5x5",
        }
    }
}

impl FromStr for Foundation {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Foundation::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported foundation '{s}'"))
    }
}

/// Asset paths referenced by a unit. Contents are opaque to the exporter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderFiles {
    pub sprite: Option<String>,
    pub icon: Option<String>,
    pub voxel: Option<String>,
    pub voxel_anim: Option<String>,
    pub turret: Option<String>,
    pub barrel: Option<String>,
    pub buildup: Option<String>,
}

/// Rules attributes a user may pin explicitly. A present field always wins
/// over the category default; `extra` is written through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RulesOverrides {
    pub name: Option<String>,
    pub tech_level: Option<i32>,
    pub strength: Option<i32>,
    pub speed: Option<i32>,
    pub cost: Option<i32>,
    pub sight: Option<i32>,
    pub armor: Option<String>,
    pub points: Option<i32>,
    pub owner: Option<String>,
    pub prerequisite: Option<String>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub elite: Option<String>,
    #[serde(deserialize_with = "de_flag")]
    pub crushable: Option<bool>,
    #[serde(deserialize_with = "de_flag")]
    pub crusher: Option<bool>,
    #[serde(deserialize_with = "de_flag")]
    pub turret: Option<bool>,
    pub locomotor: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, RawValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ArtOverrides {
    pub cameo: Option<String>,
    pub sequence: Option<String>,
    #[serde(deserialize_with = "de_flag")]
    pub voxel: Option<bool>,
    #[serde(flatten)]
    pub extra: IndexMap<String, RawValue>,
}

/// Free-form override value as it arrives from the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Flag(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    pub fn to_ini(&self) -> String {
        match self {
            RawValue::Flag(b) => yes_no(*b).to_string(),
            RawValue::Int(n) => n.to_string(),
            RawValue::Float(f) => f.to_string(),
            RawValue::Text(s) => s.trim().to_string(),
        }
    }
}

pub fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

// Accepts JSON booleans as well as the ini spellings yes/no/true/false.
fn de_flag<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }
    match Option::<Flag>::deserialize(d)? {
        None => Ok(None),
        Some(Flag::Bool(b)) => Ok(Some(b)),
        Some(Flag::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Ok(Some(true)),
            "no" | "false" | "0" => Ok(Some(false)),
            "" => Ok(None),
            other => Err(serde::de::Error::custom(format!(
                "expected yes/no, found '{other}'"
            ))),
        },
    }
}

/// A user-authored unit. Never mutated by the exporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModUnit {
    pub id: String,
    pub internal_name: String,
    pub display_name: String,
    pub faction: Faction,
    pub category: Category,
    pub cost: i32,
    pub strength: i32,
    pub speed: i32,
    pub tech_level: i32,
    pub render_type: RenderType,
    pub files: RenderFiles,
    pub foundation: Option<String>,
    pub power: i32,
    pub power_drain: i32,
    pub build_category: Option<String>,
    pub is_factory: bool,
    pub has_bib: bool,
    pub rules_overrides: RulesOverrides,
    pub art_overrides: ArtOverrides,
}

impl ModUnit {
    pub fn new(internal_name: &str, category: Category) -> Self {
        Self {
            internal_name: internal_name.to_string(),
            display_name: internal_name.to_string(),
            category,
            ..Self::default()
        }
    }

    /// Section name and type-list value used in the game configs.
    pub fn section_id(&self) -> String {
        self.internal_name.to_ascii_uppercase()
    }

    /// Conventional cameo name: first four characters of the id plus `ICON`.
    pub fn cameo_convention(&self) -> String {
        let head: String = self.internal_name.chars().take(4).collect();
        format!("{head}ICON")
            .to_ascii_uppercase()
            .chars()
            .take(8)
            .collect()
    }

    pub fn foundation(&self) -> Option<Foundation> {
        self.foundation.as_deref().and_then(|f| f.parse().ok())
    }
}
