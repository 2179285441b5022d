use std::collections::BTreeSet;
use std::fs;

use panel_tools::ToolError;
use panel_tools::completeness::{GridSpec, check_directory, check_stems};
use tempfile::tempdir;

fn spec() -> GridSpec {
    GridSpec {
        country: "Germany".to_string(),
        entity_count: 2,
        start_year: 2019,
        end_year: 2020,
        group_count: 2,
        extensions: vec!["xlsx".to_string(), "xlsm".to_string()],
    }
}

#[test]
fn expected_grid_is_ordered_by_entity_year_group() {
    let stems = spec().expected_stems();
    assert_eq!(
        stems,
        [
            "Germany1-2019A",
            "Germany1-2019B",
            "Germany1-2020A",
            "Germany1-2020B",
            "Germany2-2019A",
            "Germany2-2019B",
            "Germany2-2020A",
            "Germany2-2020B",
        ]
    );
    assert_eq!(spec().expected_total(), 8);
}

#[test]
fn reports_missing_stems() {
    let present: BTreeSet<String> = ["Germany1-2019A", "Germany1-2019B", "Germany2-2020B", "extra"]
        .into_iter()
        .map(String::from)
        .collect();

    let report = check_stems(&spec(), &present).expect("valid spec");
    assert_eq!(report.expected_total, 8);
    assert_eq!(report.actual_count, 4);
    assert_eq!(
        report.missing,
        [
            "Germany1-2020A",
            "Germany1-2020B",
            "Germany2-2019A",
            "Germany2-2019B",
            "Germany2-2020A",
        ]
    );
    assert!(!report.is_complete());
}

#[test]
fn directory_check_counts_only_allowed_extensions() {
    let dir = tempdir().expect("temporary directory");
    for stem in spec().expected_stems() {
        fs::write(dir.path().join(format!("{stem}.xlsx")), b"").expect("fixture written");
    }
    fs::write(dir.path().join("Germany1-2019A.xlsm"), b"").expect("fixture written");
    fs::write(dir.path().join("readme.txt"), b"").expect("fixture written");

    let report = check_directory(dir.path(), &spec()).expect("checked");
    assert!(report.is_complete());
    assert_eq!(report.actual_count, 8);
}

#[test]
fn invalid_grids_are_rejected() {
    let mut reversed = spec();
    reversed.start_year = 2021;
    let mut no_entities = spec();
    no_entities.entity_count = 0;
    let mut too_many_groups = spec();
    too_many_groups.group_count = 27;

    for bad in [reversed, no_entities, too_many_groups] {
        let result = check_stems(&bad, &BTreeSet::new());
        assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
    }
}
