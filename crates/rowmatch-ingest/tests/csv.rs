use std::io::Write;

use rowmatch_ingest::{read_dataset, read_dataset_from_reader};
use rowmatch_model::{Collection, Tabular};

#[test]
fn reads_headers_rows_and_missing_cells() {
    let data = "id,name,city\n1, Alice Smith ,Oslo\n2,,Bergen\n,,\n3,Bob\n";
    let dataset = read_dataset_from_reader(data.as_bytes(), "customers").unwrap();

    assert_eq!(dataset.name, "customers");
    assert_eq!(dataset.columns, vec!["id", "name", "city"]);
    assert_eq!(dataset.row_count(), 3);
    assert_eq!(dataset.cell(0, "name"), Some("Alice Smith"));
    assert_eq!(dataset.cell(1, "name"), None);
    assert_eq!(dataset.cell(2, "city"), None);

    let names = Collection::from_column(&dataset, "name").unwrap();
    let indices: Vec<usize> = names.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn reads_file_and_names_dataset_after_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "\u{feff}holder,balance").unwrap();
    writeln!(file, "\"Smith, Alice\",10").unwrap();
    drop(file);

    let dataset = read_dataset(&path).unwrap();
    assert_eq!(dataset.name, "accounts");
    assert_eq!(dataset.columns, vec!["holder", "balance"]);
    assert_eq!(dataset.cell(0, "holder"), Some("Smith, Alice"));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = read_dataset(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn header_inner_spacing_is_kept_for_selection() {
    let data = "Customer  Name,City\nAlice Smith,Oslo\n";
    let dataset = read_dataset_from_reader(data.as_bytes(), "customers").unwrap();
    assert_eq!(dataset.columns, vec!["Customer  Name", "City"]);
    assert_eq!(dataset.cell(0, "Customer  Name"), Some("Alice Smith"));
    assert!(Collection::from_column(&dataset, "Customer Name").is_err());
}
