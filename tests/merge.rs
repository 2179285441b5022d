mod common;

use std::path::{Path, PathBuf};

use common::{MemorySource, data_sheet, entity_workbook, labels, request_table};
use panel_tools::config::RequestTableContract;
use panel_tools::grouping::{Group, build_groups};
use panel_tools::merge::merge_group;
use panel_tools::model::Workbook;
use panel_tools::{ToolError, ValidationKind};

fn single_group(paths: &[&str]) -> Group {
    let index = build_groups(paths.iter().map(PathBuf::from));
    assert_eq!(index.len(), 1, "fixture should form a single group");
    index.iter().next().cloned().expect("group present")
}

#[test]
fn appends_member_rows_after_template_rows() {
    let mut source = MemorySource::default();
    source.insert("in/DE1-2020A.xlsx", entity_workbook(1, &[("S1", &["t1", "t2"])]));
    source.insert("in/DE2-2020A.xlsx", entity_workbook(2, &[("S1", &["m1", "m2", "m3"])]));
    let group = single_group(&["in/DE1-2020A.xlsx", "in/DE2-2020A.xlsx"]);

    let outcome =
        merge_group(&group, &source, &RequestTableContract::default()).expect("merge succeeds");

    assert_eq!(labels(&outcome.workbook, "S1"), ["t1", "t2", "m1", "m2", "m3"]);
    assert_eq!(outcome.appended.len(), 1);
    assert_eq!(outcome.appended[0].sheet, "S1");
    assert_eq!(outcome.appended[0].rows, 3);
    assert_eq!(outcome.appended[0].columns, 2);
    assert_eq!(outcome.appended[0].entity, 2);
}

#[test]
fn members_are_visited_in_numeric_entity_order() {
    let mut source = MemorySource::default();
    source.insert("DE1-2020A.xlsx", entity_workbook(1, &[("S1", &["e1"])]));
    source.insert("DE2-2020A.xlsx", entity_workbook(2, &[("S1", &["e2"])]));
    source.insert("DE10-2020A.xlsx", entity_workbook(10, &[("S1", &["e10a", "e10b"])]));
    source.insert("DE3-2020A.xlsx", entity_workbook(3, &[("S1", &["e3"])]));
    // Lexicographic order would put 10 before 2.
    let group = single_group(&[
        "DE10-2020A.xlsx",
        "DE1-2020A.xlsx",
        "DE2-2020A.xlsx",
        "DE3-2020A.xlsx",
    ]);

    let outcome =
        merge_group(&group, &source, &RequestTableContract::default()).expect("merge succeeds");

    assert_eq!(
        labels(&outcome.workbook, "S1"),
        ["e1", "e2", "e3", "e10a", "e10b"]
    );
}

#[test]
fn multi_period_rows_go_to_the_same_named_sheet() {
    let mut source = MemorySource::default();
    source.insert(
        "DE1-2019-2020B.xlsx",
        entity_workbook(1, &[("Y2019", &["a19"]), ("Y2020", &["a20"])]),
    );
    // Member stores its sheets in a different order.
    let member = Workbook::from_sheets(vec![
        data_sheet("Y2020", &["b20x", "b20y"]),
        data_sheet("Y2019", &["b19"]),
        request_table(&["FDEALL2", "FDEALL2"]),
    ]);
    source.insert("DE2-2019-2020B.xlsx", member);
    let group = single_group(&["DE1-2019-2020B.xlsx", "DE2-2019-2020B.xlsx"]);

    let outcome =
        merge_group(&group, &source, &RequestTableContract::default()).expect("merge succeeds");

    assert_eq!(labels(&outcome.workbook, "Y2019"), ["a19", "b19"]);
    assert_eq!(labels(&outcome.workbook, "Y2020"), ["a20", "b20x", "b20y"]);
    let shapes: Vec<(&str, usize)> = outcome
        .appended
        .iter()
        .map(|sheet| (sheet.sheet.as_str(), sheet.rows))
        .collect();
    assert_eq!(shapes, [("Y2019", 1), ("Y2020", 2)]);
}

#[test]
fn request_sheet_and_extra_sheets_are_kept_but_not_appended() {
    let mut template = entity_workbook(1, &[("S1", &["t1"])]);
    template.push_sheet(data_sheet("Notes", &["keep"]));
    let mut source = MemorySource::default();
    source.insert("DE1-2020A.xlsx", template);
    source.insert("DE2-2020A.xlsx", entity_workbook(2, &[("S1", &["m1"])]));
    let group = single_group(&["DE1-2020A.xlsx", "DE2-2020A.xlsx"]);

    let outcome =
        merge_group(&group, &source, &RequestTableContract::default()).expect("merge succeeds");

    let names: Vec<&str> = outcome.workbook.sheet_names().collect();
    assert_eq!(names, ["S1", "REQUEST_TABLE", "Notes"]);
    assert_eq!(labels(&outcome.workbook, "Notes"), ["keep"]);
}

#[test]
fn group_without_entity_one_fails_with_missing_template() {
    let mut source = MemorySource::default();
    source.insert("DE2-2020A.xlsx", entity_workbook(2, &[("S1", &["m1"])]));
    let group = single_group(&["DE2-2020A.xlsx"]);

    let result = merge_group(&group, &source, &RequestTableContract::default());
    match result {
        Err(ToolError::MissingTemplate { group }) => assert_eq!(group, "DE-2020A"),
        other => panic!("expected missing template, got {other:?}"),
    }
}

#[test]
fn invalid_template_fails_the_group() {
    let mut source = MemorySource::default();
    source.insert("DE1-2020A.xlsx", entity_workbook(4, &[("S1", &["t1"])]));
    let group = single_group(&["DE1-2020A.xlsx"]);

    match merge_group(&group, &source, &RequestTableContract::default()) {
        Err(ToolError::Validation(err)) => {
            assert_eq!(err.kind(), ValidationKind::SeriesMismatch);
            assert_eq!(err.file(), Path::new("DE1-2020A.xlsx"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn series_mismatch_in_member_names_that_member() {
    let mut source = MemorySource::default();
    source.insert(
        "DE1-2019-2020B.xlsx",
        entity_workbook(1, &[("S1", &["a"]), ("S2", &["b"])]),
    );
    let bad_member = Workbook::from_sheets(vec![
        data_sheet("S1", &["c"]),
        data_sheet("S2", &["d"]),
        request_table(&["FDEALL2", "FDEALL3"]),
    ]);
    source.insert("DE2-2019-2020B.xlsx", bad_member);
    let group = single_group(&["DE1-2019-2020B.xlsx", "DE2-2019-2020B.xlsx"]);

    match merge_group(&group, &source, &RequestTableContract::default()) {
        Err(ToolError::Validation(err)) => {
            assert_eq!(err.kind(), ValidationKind::SeriesMismatch);
            assert_eq!(err.file(), Path::new("DE2-2019-2020B.xlsx"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn member_missing_a_template_sheet_fails_with_sheet_not_found() {
    let mut source = MemorySource::default();
    source.insert(
        "DE1-2019-2020B.xlsx",
        entity_workbook(1, &[("S1", &["a"]), ("S2", &["b"])]),
    );
    source.insert(
        "DE2-2019-2020B.xlsx",
        entity_workbook(2, &[("S1", &["c"]), ("Other", &["d"])]),
    );
    let group = single_group(&["DE1-2019-2020B.xlsx", "DE2-2019-2020B.xlsx"]);

    match merge_group(&group, &source, &RequestTableContract::default()) {
        Err(ToolError::SheetNotFound { file, sheet }) => {
            assert_eq!(file, Path::new("DE2-2019-2020B.xlsx"));
            assert_eq!(sheet, "S2");
        }
        other => panic!("expected missing sheet, got {other:?}"),
    }
}

#[test]
fn unreadable_member_fails_the_group() {
    let mut source = MemorySource::default();
    source.insert("DE1-2020A.xlsx", entity_workbook(1, &[("S1", &["a"])]));
    let group = single_group(&["DE1-2020A.xlsx", "DE2-2020A.xlsx"]);

    let result = merge_group(&group, &source, &RequestTableContract::default());
    assert!(matches!(result, Err(ToolError::MissingInput(_))));
}
