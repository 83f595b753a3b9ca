//! Corpus scan and category reporters over the fixture corpus.

use std::fs;
use std::path::{Path, PathBuf};

use songlint::data::corpus::scan_song_folder;
use songlint::data::reference::ReferenceStore;
use songlint::data::validate::{DefectCategory, SongDiagnosis};
use songlint::report::{
    classify_utility, defect_rows, report_invalid_notes, report_missing_palette_skills,
    report_unknown_abilities, report_unknown_notes, run_reports, UtilityVerdict,
    ALL_VALID_MESSAGE,
};
use songlint::verify::{run_verify, VerifyConfig};

fn fixture_path(parts: &[&str]) -> PathBuf {
    let mut path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    for part in parts {
        path = path.join(part);
    }
    path
}

fn load_refs() -> ReferenceStore {
    ReferenceStore::load(
        fixture_path(&["reference", "allSkills.json"]),
        &[
            fixture_path(&["reference", "abilityInfoApi.json"]),
            fixture_path(&["reference", "abilityInfoCustom.json"]),
        ],
        fixture_path(&["reference", "paletteSkillLookup.json"]),
    )
    .expect("fixture reference tables should load")
}

fn scan_fixture_songs(refs: &ReferenceStore) -> Vec<SongDiagnosis> {
    scan_song_folder(fixture_path(&["songs"]), refs).expect("fixture songs should scan")
}

/// Copy the fixture songs into a scratch folder so deletion can be exercised.
fn scratch_songs() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for entry in fs::read_dir(fixture_path(&["songs"])).expect("fixture songs") {
        let entry = entry.expect("dir entry");
        fs::copy(entry.path(), dir.path().join(entry.file_name())).expect("copy fixture");
    }
    dir
}

fn render<F>(report: F) -> (bool, String)
where
    F: FnOnce(&mut Vec<u8>) -> std::io::Result<bool>,
{
    let mut out = Vec::new();
    let found = report(&mut out).expect("report should write");
    (found, String::from_utf8(out).expect("utf-8 report"))
}

fn diagnosis<'a>(diagnoses: &'a [SongDiagnosis], file_name: &str) -> &'a SongDiagnosis {
    diagnoses
        .iter()
        .find(|d| d.file_name == file_name)
        .unwrap_or_else(|| panic!("{file_name} should have a diagnosis"))
}

#[test]
fn scan_keeps_only_defective_songs_in_file_name_order() {
    let refs = load_refs();
    let diagnoses = scan_fixture_songs(&refs);
    let names: Vec<&str> = diagnoses.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "broken_notes.json",
            "mismatch.json",
            "palette_gap.json",
            "unknown_abilities.json"
        ]
    );
    for d in &diagnoses {
        assert!(d.file_path.ends_with(&d.file_name));
        assert!(d.has_defects());
    }
}

#[test]
fn overlay_only_abilities_and_weapon_swap_are_known() {
    let refs = load_refs();
    assert!(refs.has_ability(60));
    assert!(refs.has_ability(-2));
    assert_eq!(refs.ability(5).and_then(|a| a.asset_id), Some(100));
    assert_eq!(refs.ability(-2).and_then(|a| a.name.as_deref()), Some("Weapon Swap"));
}

#[test]
fn invalid_notes_report_counts_and_dumps_fields() {
    let refs = load_refs();
    let diagnoses = scan_fixture_songs(&refs);
    let (found, text) = render(|out| report_invalid_notes(&diagnoses, out));

    assert!(found);
    assert!(text.contains("[HIGHEST] Invalid Notes"));
    assert!(text.contains("1 song(s) contain 2 invalid note(s)."));
    assert!(text.contains("invalidReason: TIME IS BEFORE PREVIOUS NOTE: 1000"));
    assert!(text.contains("invalidReason: MISSING EXPECTED KEY: duration"));
    assert!(text.contains("overrideAuto: true"));
}

#[test]
fn missing_palette_report_breaks_down_every_slot() {
    let refs = load_refs();
    let diagnoses = scan_fixture_songs(&refs);
    let (found, text) = render(|out| report_missing_palette_skills(&diagnoses, &refs, out));

    assert!(found);
    assert!(text.contains("[HIGH] Missing Palette Skills"));
    assert!(text.contains("paletteId 5555 is not in the palette lookup"));
    assert!(text.contains("Palette Gap Firebrand"));
    assert!(text.contains("ability 7 (Smite Condition)"));
    assert!(text.contains("UNRESOLVED"));
    assert!(text.contains("empty / flex slot"));
}

#[test]
fn unknown_abilities_report_is_sorted_and_ends_with_skeleton() {
    let refs = load_refs();
    let diagnoses = scan_fixture_songs(&refs);
    let (found, text) = render(|out| report_unknown_abilities(&diagnoses, &refs, out));

    assert!(found);
    assert!(text.contains("[HIGH] Unknown Abilities"));
    let first = text.find("abilityId 77:").expect("77 listed");
    let second = text.find("abilityId 123456:").expect("123456 listed");
    assert!(first < second, "ids should be listed in ascending order");
    assert!(text.contains("abilityId 123456: 2 occurrence(s) in 1 song(s)"));
    assert!(text.contains("\"77\": { \"isNote\": false },"));
    assert!(text.contains("\"123456\": { \"isNote\": false }"));
    assert!(text.contains("nearby notes ["));
}

#[test]
fn unknown_notes_heuristics_classify_each_song() {
    let refs = load_refs();
    let diagnoses = scan_fixture_songs(&refs);
    let contemplation = refs.ability(8).expect("ability 8 known");

    assert_eq!(
        classify_utility(diagnosis(&diagnoses, "palette_gap.json"), contemplation, &refs),
        UtilityVerdict::PaletteGap {
            unresolved: vec![5555]
        }
    );
    assert_eq!(
        classify_utility(diagnosis(&diagnoses, "mismatch.json"), contemplation, &refs),
        UtilityVerdict::BuildMismatch {
            equipped: vec!["Smite Condition".to_string()]
        }
    );

    let mut out = Vec::new();
    let outcome = report_unknown_notes(&diagnoses, &refs, &mut out).expect("report should write");
    let text = String::from_utf8(out).expect("utf-8 report");

    assert!(outcome.found);
    assert_eq!(
        outcome.mismatch_candidates,
        vec![diagnosis(&diagnoses, "mismatch.json").file_path.clone()]
    );
    assert!(text.contains("[MEDIUM] Unknown Notes"));
    assert!(text.contains("Mismatched Willbender (mismatch.json): 2 ability id(s), 3 note(s)"));
    assert!(text.contains("Likely a palette lookup gap"));
    assert!(text.contains("Likely a build code / log mismatch"));
    assert!(text.contains("https://wiki.guildwars2.com/wiki/Symbolic_Avenger"));
    assert!(text.contains("hint    : Guardian: Symbolic Avenger"));
    assert!(text.contains("\"50\": { \"isNote\": false }"));
}

#[test]
fn declined_confirmation_deletes_nothing() {
    let scratch = scratch_songs();
    let refs = load_refs();
    let diagnoses = scan_song_folder(scratch.path(), &refs).expect("scan");

    let mut asked = 0;
    let mut decline = |files: &[PathBuf]| {
        asked += 1;
        assert_eq!(files.len(), 1);
        false
    };
    let mut out = Vec::new();
    let summary = run_reports(&diagnoses, &refs, Some(&mut decline), &mut out).expect("reports");

    assert_eq!(asked, 1);
    assert!(summary.deleted.is_empty());
    assert!(scratch.path().join("mismatch.json").exists());
    assert!(String::from_utf8(out).unwrap().contains("Nothing deleted."));
}

#[test]
fn confirmed_deletion_removes_each_mismatch_file_once() {
    let scratch = scratch_songs();
    let refs = load_refs();
    let diagnoses = scan_song_folder(scratch.path(), &refs).expect("scan");

    let mut accept = |_: &[PathBuf]| true;
    let mut out = Vec::new();
    let summary = run_reports(&diagnoses, &refs, Some(&mut accept), &mut out).expect("reports");

    assert!(summary.had_errors);
    assert_eq!(summary.categories, DefectCategory::ALL.to_vec());
    assert_eq!(summary.deleted, vec![scratch.path().join("mismatch.json")]);
    assert!(!scratch.path().join("mismatch.json").exists());
    // Songs with other defect types are never touched.
    assert!(scratch.path().join("palette_gap.json").exists());
    assert!(scratch.path().join("unknown_abilities.json").exists());
    assert!(scratch.path().join("broken_notes.json").exists());
}

#[test]
fn clean_corpus_reports_all_data_valid() {
    let scratch = tempfile::tempdir().expect("temp dir");
    for name in ["clean_firebrand.json", "revenant.json"] {
        fs::copy(fixture_path(&["songs", name]), scratch.path().join(name)).expect("copy");
    }
    let config = VerifyConfig {
        songs_dir: scratch.path().to_path_buf(),
        catalog_path: fixture_path(&["reference", "allSkills.json"]),
        ability_info_paths: vec![
            fixture_path(&["reference", "abilityInfoApi.json"]),
            fixture_path(&["reference", "abilityInfoCustom.json"]),
        ],
        palette_path: fixture_path(&["reference", "paletteSkillLookup.json"]),
        csv_path: None,
    };

    let mut out = Vec::new();
    let summary = run_verify(&config, None, &mut out).expect("verify");
    assert!(!summary.had_errors);
    assert_eq!(String::from_utf8(out).unwrap().trim(), ALL_VALID_MESSAGE);
}

#[test]
fn verify_writes_csv_rows_for_every_defect() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let csv_path = scratch.path().join("defects.csv");
    let config = VerifyConfig {
        songs_dir: fixture_path(&["songs"]),
        catalog_path: fixture_path(&["reference", "allSkills.json"]),
        ability_info_paths: vec![
            fixture_path(&["reference", "abilityInfoApi.json"]),
            fixture_path(&["reference", "abilityInfoCustom.json"]),
        ],
        palette_path: fixture_path(&["reference", "paletteSkillLookup.json"]),
        csv_path: Some(csv_path.clone()),
    };

    let mut out = Vec::new();
    let summary = run_verify(&config, None, &mut out).expect("verify");
    assert!(summary.had_errors);
    assert!(summary.deleted.is_empty());

    let refs = load_refs();
    let expected_rows = defect_rows(&scan_fixture_songs(&refs), &refs).len();
    let csv = fs::read_to_string(&csv_path).expect("csv written");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("file,song,category,severity,id,note_index,count,detail")
    );
    assert_eq!(lines.count(), expected_rows);
    assert!(csv.contains("mismatch.json,Mismatched Willbender,unknown_notes,MEDIUM,8,0,2,Contemplation of Purity"));
}

#[test]
fn missing_reference_table_aborts_the_run() {
    let config = VerifyConfig {
        songs_dir: fixture_path(&["songs"]),
        catalog_path: fixture_path(&["reference", "missing.json"]),
        ..VerifyConfig::default()
    };
    let mut out = Vec::new();
    let err = run_verify(&config, None, &mut out).expect_err("missing catalog should fail");
    assert!(err.to_string().contains("missing.json"));
    assert!(out.is_empty(), "no partial report on load failure");
}
