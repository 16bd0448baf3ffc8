//! Dropdown discovery across worksheets

use pretty_assertions::assert_eq;
use sheet_sweep::prelude::*;
use sheet_sweep::{find_validation_rules, ValidationKind};

fn addr(s: &str) -> CellAddress {
    CellAddress::parse(s).unwrap()
}

#[tokio::test]
async fn test_hidden_backend_sheet_with_open_range() {
    let book = MemoryWorkbook::new();
    let report = book.add_sheet("Extra Component Report");
    book.add_hidden_sheet("Backend");
    book.set_grid_limits("Backend", 2000, 40).unwrap();
    book.set_column("Backend", "AC1", &["Components", "Wing", "Wing", "Tail", "", " "])
        .unwrap();
    book.add_validation(
        "Extra Component Report",
        "B6",
        "ONE_OF_RANGE",
        &["=Backend!$AC$2:$AC"],
    )
    .unwrap();

    let values = load_dropdown_values(&book, &report, addr("B6"), DEFAULT_ROW_CEILING)
        .await
        .unwrap();
    assert_eq!(values.as_slice(), ["Wing", "Tail"]);
}

#[tokio::test]
async fn test_small_backend_grid_uses_sheet_projection() {
    let book = MemoryWorkbook::new();
    let report = book.add_sheet("Report");
    book.add_hidden_sheet("Lists");
    book.set_grid_limits("Lists", 20, 5).unwrap();
    book.set_column("Lists", "C2", &["Nose", "Wing", "Nose"]).unwrap();
    book.add_validation("Report", "B6", "ONE_OF_RANGE", &["='Lists'!C2:C"])
        .unwrap();

    // C2:C1000 exceeds the 20-row grid; the projection reads all of column C
    let values = load_dropdown_values(&book, &report, addr("B6"), DEFAULT_ROW_CEILING)
        .await
        .unwrap();
    assert_eq!(values.as_slice(), ["Nose", "Wing"]);
}

#[tokio::test]
async fn test_custom_ceiling_within_grid() {
    let book = MemoryWorkbook::new();
    let report = book.add_sheet("Report");
    book.add_hidden_sheet("Lists");
    book.set_grid_limits("Lists", 20, 5).unwrap();
    book.set_column("Lists", "C1", &["Header", "Nose", "Wing"]).unwrap();
    book.add_validation("Report", "B6", "ONE_OF_RANGE", &["=Lists!C2:C"])
        .unwrap();

    let values = load_dropdown_values(&book, &report, addr("B6"), 20).await.unwrap();
    assert_eq!(values.as_slice(), ["Nose", "Wing"]);
}

#[tokio::test]
async fn test_source_on_missing_sheet() {
    let book = MemoryWorkbook::new();
    let report = book.add_sheet("Report");
    book.add_validation("Report", "B6", "ONE_OF_RANGE", &["=Deleted!A1:A10"])
        .unwrap();

    let values = load_dropdown_values(&book, &report, addr("B6"), DEFAULT_ROW_CEILING)
        .await
        .unwrap();
    assert!(values.is_empty());
}

#[tokio::test]
async fn test_rules_are_listed_per_cell() {
    let book = MemoryWorkbook::new();
    let report = book.add_sheet("Report");
    book.add_validation("Report", "B6", "ONE_OF_RANGE", &["=Backend!A2:A"])
        .unwrap();
    book.add_validation("Report", "D6", "ONE_OF_LIST", &["Yes", "No"])
        .unwrap();
    book.add_validation("Report", "F6", "NUMBER_GREATER", &["0"])
        .unwrap();

    let rules = find_validation_rules(&book, &report, DEFAULT_ROW_CEILING)
        .await
        .unwrap();
    let kinds: Vec<(String, ValidationKind)> = rules
        .iter()
        .map(|r| (r.cell.to_string(), r.kind.clone()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("B6".to_string(), ValidationKind::OneOfRange),
            ("D6".to_string(), ValidationKind::OneOfList),
            ("F6".to_string(), ValidationKind::Other("NUMBER_GREATER".into())),
        ]
    );
}

#[tokio::test]
async fn test_visible_worksheets() {
    let book = MemoryWorkbook::new();
    book.add_sheet("Report");
    book.add_hidden_sheet("Backend");
    book.add_sheet("Summary");
    assert_eq!(
        list_visible_worksheets(&book).await.unwrap(),
        vec!["Report", "Summary"]
    );

    let hidden_only = MemoryWorkbook::new();
    hidden_only.add_hidden_sheet("A");
    hidden_only.add_hidden_sheet("B");
    assert_eq!(list_visible_worksheets(&hidden_only).await.unwrap(), vec!["A", "B"]);
}
