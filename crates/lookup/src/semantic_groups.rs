//! Fixed TUI → semantic group table.

use std::collections::HashSet;

use annot::Semantic;
use once_cell::sync::Lazy;

static DRUG: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "T053", "T109", "T110", "T114", "T115", "T116", "T118", "T119", "T121", "T122", "T123",
        "T124", "T125", "T126", "T127", "T129", "T130", "T131", "T195", "T196", "T197", "T200",
        "T203",
    ]
    .into_iter()
    .collect()
});

static DISO: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["T019", "T020", "T037", "T047", "T048", "T049", "T050", "T190", "T191"]
        .into_iter()
        .collect()
});

static FIND: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "T033", "T040", "T041", "T042", "T043", "T044", "T045", "T046", "T056", "T057", "T184",
    ]
    .into_iter()
    .collect()
});

static PROC: Lazy<HashSet<&'static str>> = Lazy::new(|| ["T060", "T061"].into_iter().collect());

static ACTIVITY: Lazy<HashSet<&'static str>> = Lazy::new(|| ["T058"].into_iter().collect());

static LAB: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["T034", "T059", "T201"].into_iter().collect());

static ANAT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["T021", "T022", "T023", "T024", "T025", "T026", "T029", "T030"]
        .into_iter()
        .collect()
});

/// Semantic group for one TUI.
pub fn semantic_group_of(tui: &str) -> Semantic {
    let tui = tui.to_uppercase();
    let tui = tui.as_str();
    if DRUG.contains(tui) {
        Semantic::Drug
    } else if DISO.contains(tui) {
        Semantic::Disorder
    } else if FIND.contains(tui) {
        Semantic::Finding
    } else if PROC.contains(tui) {
        Semantic::Procedure
    } else if ACTIVITY.contains(tui) {
        Semantic::Activity
    } else if LAB.contains(tui) {
        Semantic::Lab
    } else if ANAT.contains(tui) {
        Semantic::AnatomicalSite
    } else {
        Semantic::Unknown
    }
}

/// Response aspect string for a semantic group.
pub fn aspect_of(semantic: Semantic) -> &'static str {
    semantic.aspect()
}
