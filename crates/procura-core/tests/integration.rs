//! Integration tests for the ingest -> classify -> build -> match pipeline.
//!
//! Sources are in-memory bytes or hand-built raw tables, so these run
//! without poppler-utils or real workbook files.

use rust_decimal_macros::dec;

use procura_core::catalog::build_items;
use procura_core::error::ProcuraError;
use procura_core::images::ImageAssociationMap;
use procura_core::matching::MatchConfig;
use procura_core::model::{CellValue, RawRow, RawTable, SourceFormat};
use procura_core::rfp::{build_comparison, MatchOutcome, ProcurementItem, SupplierCatalog};
use procura_core::roles::{classify_columns, ColumnRole, RoleKeywords};
use procura_core::table::{normalize_table, NormalizerConfig, PLACEHOLDER_PREFIX};
use procura_core::{build_catalog_items, ingest_catalog, IngestOptions};

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Test 1: CSV ingestion end-to-end with the documented role priority
// ---------------------------------------------------------------------------
#[test]
fn csv_catalog_resolves_roles_in_documented_priority() {
    let csv = b"Product Code,Item Description,Rate (USD)\nA1,Queen Bed Frame,450.00\n";

    let report = ingest_catalog(
        csv,
        SourceFormat::Csv,
        "acme.csv",
        &IngestOptions::default(),
    )
    .unwrap();

    assert_eq!(report.catalog.items.len(), 1);
    let item = &report.catalog.items[0];

    // Column order plus role priority is deterministic: "Product Code"
    // matches the item keywords first, so it carries the item role;
    // "Item Description" then resolves as description, "Rate (USD)" as
    // price.
    assert_eq!(item.item_name, "A1");
    assert_eq!(item.description, "Queen Bed Frame");
    assert_eq!(item.price, Some(dec!(450.00)));
    assert!(item.price_available());
    assert_eq!(item.currency, "USD");
    assert!(report.skipped.is_empty());
}

// ---------------------------------------------------------------------------
// Test 2: price edge cases degrade per item, never per file
// ---------------------------------------------------------------------------
#[test]
fn unparseable_prices_degrade_to_on_request() {
    let csv = b"Item,Unit,Price\nQueen Bed Frame,pcs,\"$1,250.50\"\nNightstand,pcs,N/A\n";

    let report = ingest_catalog(
        csv,
        SourceFormat::Csv,
        "acme.csv",
        &IngestOptions::default(),
    )
    .unwrap();

    let items = &report.catalog.items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].price, Some(dec!(1250.50)));
    assert_eq!(items[1].price, None);
    assert!(!items[1].price_available());
}

// ---------------------------------------------------------------------------
// Test 3: classifier round trip is stable across build passes
// ---------------------------------------------------------------------------
#[test]
fn role_map_rederives_identically_after_build() {
    let csv = b"Item,Description,Spec,Unit,Price\nChair,Oak chair,EN 16139,pcs,45\n";
    let tables = procura_core::ingest::load_tables(
        csv,
        SourceFormat::Csv,
        "catalog.csv",
        &NormalizerConfig::default(),
    )
    .unwrap();

    let keywords = RoleKeywords::default();
    let before = classify_columns(&tables[0], &keywords);
    let _items = build_items(&tables[0], &before, "USD", None).unwrap();
    let after = classify_columns(&tables[0], &keywords);

    for role in ColumnRole::PRIORITY {
        assert_eq!(before.column(role), after.column(role));
    }
}

// ---------------------------------------------------------------------------
// Test 4: workbook-style sheets, one good and one without an item column
// ---------------------------------------------------------------------------
fn sheet_with_items() -> RawTable {
    let mut table = RawTable::new(
        "Furniture",
        (1..=3).map(|i| format!("{PLACEHOLDER_PREFIX}{i}")).collect(),
    );
    table.rows.push(RawRow::new(vec![
        text("ACME Trading Ltd."),
        CellValue::Empty,
        CellValue::Empty,
    ]));
    table.rows.push(RawRow::new(vec![
        text("Item"),
        text("Unit"),
        text("Price"),
    ]));
    table.rows.push(RawRow::new(vec![
        text("Queen Bed Frame"),
        text("pcs"),
        CellValue::Number(450.0),
    ]));
    table
}

fn sheet_without_item_column() -> RawTable {
    let mut table = RawTable::new(
        "Notes",
        vec!["Remark".to_string(), "Author".to_string()],
    );
    table
        .rows
        .push(RawRow::new(vec![text("call back in May"), text("GW")]));
    table
}

#[test]
fn bulk_import_reports_partial_success() {
    let config = NormalizerConfig::default();
    let tables = vec![
        normalize_table(sheet_with_items(), &config),
        normalize_table(sheet_without_item_column(), &config),
    ];

    let (items, skipped) =
        build_catalog_items(&tables, "suppliers.xlsx", None, &IngestOptions::default()).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_name, "Queen Bed Frame");
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].section, "Notes");
    assert_eq!(skipped[0].reason, "no item column detected");
}

#[test]
fn all_sections_without_item_column_reject_the_save() {
    let config = NormalizerConfig::default();
    let tables = vec![normalize_table(sheet_without_item_column(), &config)];

    let err = build_catalog_items(&tables, "suppliers.xlsx", None, &IngestOptions::default())
        .unwrap_err();
    assert!(matches!(err, ProcuraError::ItemColumnUnresolved { .. }));
}

#[test]
fn empty_source_is_no_items_found_not_an_error() {
    let tables = vec![RawTable::new("Sheet1", Vec::new())];
    let (items, skipped) =
        build_catalog_items(&tables, "empty.xlsx", None, &IngestOptions::default()).unwrap();
    assert!(items.is_empty());
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].reason, "no data rows");
}

// ---------------------------------------------------------------------------
// Test 5: image association joins on section + origin row
// ---------------------------------------------------------------------------
#[test]
fn images_join_by_sheet_and_origin_row() {
    let config = NormalizerConfig::default();
    let table = normalize_table(sheet_with_items(), &config);

    // "Queen Bed Frame" sat at original grid index 2, so its origin row
    // is 3; an image anchored there must land on it.
    let mut map = ImageAssociationMap::new();
    map.insert(
        ("Furniture".to_string(), 3),
        "images/Furniture_row3_1.png".into(),
    );

    let (items, _) = build_catalog_items(
        &[table],
        "suppliers.xlsx",
        Some(&map),
        &IngestOptions::default(),
    )
    .unwrap();

    assert_eq!(items[0].image_path, "images/Furniture_row3_1.png");
}

// ---------------------------------------------------------------------------
// Test 6: ingested catalogs feed the comparison and respect the floor
// ---------------------------------------------------------------------------
#[test]
fn comparison_over_ingested_catalog() {
    let csv =
        b"Item,Unit,Price\nKing Size Bed Premium,pcs,980.00\nQueen Bed Standard,pcs,450.00\n";
    let report = ingest_catalog(
        csv,
        SourceFormat::Csv,
        "acme.csv",
        &IngestOptions::default(),
    )
    .unwrap();

    let catalogs = vec![SupplierCatalog {
        supplier_id: "sup-1".into(),
        supplier_name: "ACME Trading".into(),
        items: report.catalog.items,
    }];

    let wanted = vec![ProcurementItem {
        name: "King Bed – Premium".into(),
        quantity: dec!(50),
        unit: "pcs".into(),
        specification: String::new(),
        target_price: None,
    }];

    let rows = build_comparison(&wanted, &catalogs, &MatchConfig::default());
    assert_eq!(rows.len(), 1);
    match &rows[0].cells[0].outcome {
        MatchOutcome::Matched { item, score } => {
            assert_eq!(item.item_name, "King Size Bed Premium");
            assert!(*score >= 0.55);
        }
        MatchOutcome::NoMatch => panic!("expected a match above the floor"),
    }
}
