use tsm_core::model::{Category, Faction, ModUnit, RenderType};
use tsm_core::validate::{self, Field, Severity, ValidationIssue, run_validation};

fn valid_unit(name: &str, category: Category) -> ModUnit {
    let mut u = ModUnit::new(name, category);
    u.cost = 300;
    u.strength = 200;
    u.tech_level = 2;
    u.rules_overrides.owner = Some("GDI".to_string());
    if category == Category::Structure {
        u.foundation = Some("2x2".to_string());
    }
    u
}

fn issue<'a>(issues: &'a [ValidationIssue], rule: &str) -> Option<&'a ValidationIssue> {
    issues.iter().find(|i| i.rule_id == rule)
}

#[test]
fn clean_units_produce_no_issues() {
    let units = [
        valid_unit("TSTUNIT", Category::Infantry),
        valid_unit("tank1", Category::Vehicle),
        valid_unit("gdipp2", Category::Structure),
    ];
    assert!(run_validation(&units).is_empty());
}

#[test]
fn broken_unit_reports_every_failing_rule() {
    let mut u = ModUnit::new("", Category::Infantry);
    u.id = "u-1".to_string();
    u.strength = 0;
    u.cost = 0;
    let issues = run_validation(&[u]);
    assert!(issues.len() >= 4);
    for rule in ["internal-name-format", "strength-zero", "cost-zero", "owner-exists"] {
        let found = issue(&issues, rule).unwrap_or_else(|| panic!("missing {rule}"));
        assert_eq!(found.unit_id, "u-1");
    }
    let name = issue(&issues, "internal-name-format").unwrap();
    assert_eq!(name.severity, Severity::Error);
    assert_eq!(name.suggestion, None);
    assert!(!name.auto_fix);
    assert_eq!(issue(&issues, "strength-zero").unwrap().suggestion.as_deref(), Some("200"));
    assert_eq!(issue(&issues, "cost-zero").unwrap().severity, Severity::Warning);
    assert!(!validate::is_exportable(&issues));
}

#[test]
fn malformed_internal_name_gets_mechanical_fix() {
    let issues = run_validation(&[valid_unit("my-unit_long", Category::Infantry)]);
    let i = issue(&issues, "internal-name-format").unwrap();
    assert_eq!(i.suggestion.as_deref(), Some("MYUNITLO"));
    assert!(i.auto_fix);
    assert_eq!(i.field, Some(Field::InternalName));
}

#[test]
fn internal_names_must_be_plain_ascii() {
    for name in ["\u{17F}", "TANK\u{212A}", "\u{C9}1"] {
        let issues = run_validation(&[valid_unit(name, Category::Infantry)]);
        let i = issue(&issues, "internal-name-format")
            .unwrap_or_else(|| panic!("{name:?} passed the name check"));
        assert_eq!(i.severity, Severity::Error);
        assert!(!validate::is_exportable(&issues));
    }
    let issues = run_validation(&[valid_unit("TANK\u{212A}", Category::Vehicle)]);
    assert_eq!(
        issue(&issues, "internal-name-format").unwrap().suggestion.as_deref(),
        Some("TANK")
    );
    let plain = run_validation(&[valid_unit("tank1", Category::Vehicle)]);
    assert!(issue(&plain, "internal-name-format").is_none());
}

#[test]
fn base_game_ids_draw_a_collision_warning() {
    let issues = run_validation(&[valid_unit("medic", Category::Infantry)]);
    let i = issue(&issues, "name-collision").unwrap();
    assert_eq!(i.severity, Severity::Warning);
    assert_eq!(i.suggestion.as_deref(), Some("MEDICX"));

    let issues = run_validation(&[valid_unit("ENGINEER", Category::Infantry)]);
    assert_eq!(
        issue(&issues, "name-collision").unwrap().suggestion.as_deref(),
        Some("ENGINX")
    );
    assert!(validate::is_exportable(&issues));
}

#[test]
fn common_prerequisite_mistakes_are_corrected_per_faction() {
    let mut inf = valid_unit("tstunit", Category::Infantry);
    inf.rules_overrides.prerequisite = Some("barracks".to_string());
    let mut tank = valid_unit("tank1", Category::Vehicle);
    tank.faction = Faction::Nod;
    tank.rules_overrides.prerequisite = Some("FACTORY".to_string());
    let mut fine = valid_unit("tank2", Category::Vehicle);
    fine.rules_overrides.prerequisite = Some("GAWEAP".to_string());

    let issues = run_validation(&[inf, tank, fine]);
    let prereq: Vec<_> = issues
        .iter()
        .filter(|i| i.rule_id == "prerequisite-validity")
        .collect();
    assert_eq!(prereq.len(), 2);
    assert_eq!(prereq[0].suggestion.as_deref(), Some("GAPILE"));
    assert_eq!(prereq[1].suggestion.as_deref(), Some("NAWEAP"));
    assert!(prereq.iter().all(|i| i.auto_fix));
}

#[test]
fn blank_owner_suggests_the_unit_faction() {
    let mut u = valid_unit("tstunit", Category::Infantry);
    u.faction = Faction::Nod;
    u.rules_overrides.owner = Some("  ".to_string());
    let issues = run_validation(&[u]);
    let i = issue(&issues, "owner-exists").unwrap();
    assert_eq!(i.suggestion.as_deref(), Some("Nod"));
    assert!(i.auto_fix);
}

#[test]
fn tech_level_bounds() {
    let mut hidden = valid_unit("hidden1", Category::Infantry);
    hidden.tech_level = -1;
    let mut high = valid_unit("high1", Category::Infantry);
    high.tech_level = 12;
    let mut ok = valid_unit("ok1", Category::Infantry);
    ok.tech_level = 10;

    let issues = run_validation(&[hidden, high, ok]);
    let tech: Vec<_> = issues
        .iter()
        .filter(|i| i.rule_id == "tech-level-valid")
        .collect();
    assert_eq!(tech.len(), 2);
    assert_eq!(tech[0].unit_name, "hidden1");
    assert_eq!(tech[0].suggestion, None);
    assert_eq!(tech[1].suggestion.as_deref(), Some("10"));
}

#[test]
fn voxel_units_need_body_and_animation() {
    let mut u = valid_unit("tank1", Category::Vehicle);
    u.render_type = RenderType::Voxel;
    u.files.voxel = Some("tank1.vxl".to_string());
    let issues = run_validation(&[u.clone()]);
    assert_eq!(
        issue(&issues, "voxel-files-required").unwrap().field,
        Some(Field::VoxelFiles)
    );

    u.files.voxel_anim = Some("tank1.hva".to_string());
    assert!(issue(&run_validation(&[u]), "voxel-files-required").is_none());
}

#[test]
fn cameo_convention_is_informational() {
    let mut u = valid_unit("tstunit", Category::Infantry);
    u.art_overrides.cameo = Some("FOOBAR".to_string());
    let issues = run_validation(&[u.clone()]);
    let i = issue(&issues, "cameo-naming").unwrap();
    assert_eq!(i.severity, Severity::Info);
    assert_eq!(i.suggestion.as_deref(), Some("TSTUICON"));
    assert!(validate::is_exportable(&issues));

    u.art_overrides.cameo = Some("tstuicon".to_string());
    assert_eq!(
        issue(&run_validation(&[u.clone()]), "cameo-naming")
            .unwrap()
            .suggestion
            .as_deref(),
        Some("TSTUICON")
    );

    u.art_overrides.cameo = Some("TSTUICON".to_string());
    assert!(run_validation(&[u]).is_empty());
}

#[test]
fn structures_need_a_legal_foundation() {
    let mut missing = valid_unit("bld1", Category::Structure);
    missing.foundation = None;
    let mut odd = valid_unit("bld2", Category::Structure);
    odd.foundation = Some("6x6".to_string());
    let mut good = valid_unit("bld3", Category::Structure);
    good.foundation = Some("5x5".to_string());
    let mut loose = valid_unit("bld4", Category::Structure);
    loose.foundation = Some(" 2X2 ".to_string());
    let vehicle = valid_unit("tank1", Category::Vehicle);

    let issues = run_validation(&[missing, odd, good, loose, vehicle]);
    let names: Vec<&str> = issues
        .iter()
        .filter(|i| i.rule_id == "foundation-valid")
        .map(|i| i.unit_name.as_str())
        .collect();
    assert_eq!(names, ["bld1", "bld2", "bld4"]);
    assert!(
        issues
            .iter()
            .all(|i| i.suggestion.as_deref() == Some("3x2"))
    );
}

#[test]
fn report_serializes_camel_case() {
    let mut u = valid_unit("tstunit", Category::Infantry);
    u.strength = -5;
    let issues = run_validation(&[u]);
    let json = tsm_core::json::report_json(&issues).unwrap();
    assert!(json.contains("\"ruleId\": \"strength-zero\""));
    assert!(json.contains("\"severity\": \"error\""));
    assert!(json.contains("\"autoFix\": false"));
    assert!(json.contains("\"field\": \"strength\""));
}
