//! Order-preserving reader/writer for the game's ini dialect.
//!
//! Only what the game's loader understands is supported: `[Section]` headers,
//! `Key=Value` lines and `;` comments. Anything else is dropped on parse.

use indexmap::IndexMap;

pub type Section = IndexMap<String, String>;

/// Sections whose numeric keys form an ordered list of unit ids.
pub const TYPE_LISTS: [&str; 4] = [
    "InfantryTypes",
    "VehicleTypes",
    "AircraftTypes",
    "BuildingTypes",
];

const LINE_END: &str = "\r\n";

pub fn is_type_list(name: &str) -> bool {
    TYPE_LISTS.contains(&name)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    // first-seen order; sections added through `replace_section` are not
    // recorded here and serialize after the ordered ones
    order: Vec<String>,
    sections: IndexMap<String, Section>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section_order(&self) -> &[String] {
        &self.order
    }

    /// All section names in emission order.
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.order.iter().map(String::as_str).collect();
        for name in self.sections.keys() {
            if !self.order.iter().any(|o| o == name) {
                names.push(name);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.get_mut(name)
    }

    /// Open (or reopen) a section, recording it in section order exactly once.
    pub fn ensure_section(&mut self, name: &str) -> &mut Section {
        if !self.order.iter().any(|o| o == name) {
            self.order.push(name.to_string());
        }
        self.sections.entry(name.to_string()).or_default()
    }

    /// Replace a section wholesale. An existing section keeps its position;
    /// a new one is appended after every ordered section.
    pub fn replace_section(&mut self, name: &str, section: Section) {
        self.sections.insert(name.to_string(), section);
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key).map(String::as_str)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.ensure_section(section)
            .insert(key.to_string(), value.into());
    }

    pub fn next_index(&self, section: &str) -> usize {
        self.sections.get(section).map(next_index).unwrap_or(0)
    }

    /// True if any key of `section` maps to exactly `value`.
    pub fn has_value(&self, section: &str, value: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| s.values().any(|v| v == value))
    }
}

/// Numeric key as used by type lists: ASCII digits only.
pub fn numeric_key(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// One past the largest numeric key, or 0 when there is none.
pub fn next_index(section: &Section) -> usize {
    section
        .keys()
        .filter_map(|k| numeric_key(k))
        .max()
        .map_or(0, |m| m + 1)
}

pub fn parse(text: &str) -> ConfigDocument {
    let mut doc = ConfigDocument::new();
    let mut current: Option<String> = None;
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(rest) = line.strip_prefix('[') {
            // a bracket line without `]` is malformed and leaves the open section as is
            if let Some(end) = rest.find(']') {
                let name = rest[..end].trim();
                if !name.is_empty() {
                    doc.ensure_section(name);
                    current = Some(name.to_string());
                }
            }
            continue;
        }
        let Some(section) = current.as_deref() else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.split(';').next().unwrap_or_default().trim();
        doc.set(section, key, value);
    }
    doc
}

/// Banner written at the top of every generated file.
#[derive(Debug, Clone)]
pub struct Banner {
    pub tool: String,
    pub generated: String,
}

impl Banner {
    pub fn now(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            generated: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

pub fn stringify(doc: &ConfigDocument) -> String {
    stringify_with(doc, &Banner::now("tsm"))
}

pub fn stringify_with(doc: &ConfigDocument, banner: &Banner) -> String {
    let mut out = String::new();
    let rule = "-".repeat(60);
    for line in [
        format!("; {rule}"),
        format!("; Generated by {}", banner.tool),
        format!("; {}", banner.generated),
        format!("; {rule}"),
    ] {
        out.push_str(&line);
        out.push_str(LINE_END);
    }
    out.push_str(LINE_END);

    for name in doc.section_names() {
        let Some(section) = doc.section(name) else {
            continue;
        };
        out.push_str(&format!("[{name}]{LINE_END}"));
        if is_type_list(name) {
            write_pairs(&mut out, &normalize_type_list(section));
        } else {
            write_pairs(&mut out, section);
        }
        out.push_str(LINE_END);
    }
    out
}

fn write_pairs(out: &mut String, section: &Section) {
    for (k, v) in section {
        out.push_str(&format!("{k}={v}{LINE_END}"));
    }
}

/// Dedup and reindex a type list: numeric entries in index order, repeated
/// values dropped, re-keyed from 0; other keys follow untouched.
pub fn normalize_type_list(section: &Section) -> Section {
    let mut numbered: Vec<(usize, &String)> = section
        .iter()
        .filter_map(|(k, v)| numeric_key(k).map(|i| (i, v)))
        .collect();
    numbered.sort_by_key(|(i, _)| *i);

    let mut seen: Vec<&str> = Vec::with_capacity(numbered.len());
    for (_, v) in numbered {
        if !seen.contains(&v.as_str()) {
            seen.push(v);
        }
    }

    let mut out: Section = seen
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v.to_string()))
        .collect();
    for (k, v) in section {
        if numeric_key(k).is_none() {
            out.insert(k.clone(), v.clone());
        }
    }
    out
}
