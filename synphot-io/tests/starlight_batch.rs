//! STARLIGHT files through a stored filter set into a CSV table

use std::collections::BTreeMap;

use synphot::filters::store::{FilterColumns, FilterDocument};
use synphot::{FilterStore, JsonFilterStore, Photometer};
use synphot_io::{run_batch, SourceFormat, SourceInput};
use tempfile::tempdir;

const SYNTHESIS: &str = "\
 2.0E+00  [fobs_norm (in input units)]

## Synthetic spectrum (Best Model) ##l_obs f_obs f_syn wei
4  [Nl_obs]
  4000.0  1.0  1.0  1.0
  4001.0  1.0  1.0  1.0
  4002.0  1.0  1.0  1.0
  4003.0  1.0  1.0  1.0
";

fn filter_file(dir: &std::path::Path) -> std::path::PathBuf {
    let mut filters = BTreeMap::new();
    filters.insert(
        "blue".to_string(),
        FilterColumns {
            wl: vec![4000.0, 4001.0, 4002.0, 4003.0],
            transm: vec![0.5, 1.0, 1.0, 0.5],
        },
    );
    filters.insert(
        "red".to_string(),
        FilterColumns {
            wl: vec![7000.0, 7100.0],
            transm: vec![1.0, 1.0],
        },
    );
    let mut regions = BTreeMap::new();
    regions.insert("1".to_string(), filters);
    let mut doc: FilterDocument = BTreeMap::new();
    doc.insert("demo".to_string(), regions);

    let path = dir.join("filters.json");
    JsonFilterStore::save_document(&doc, &path).unwrap();
    path
}

#[test]
fn test_masked_sample_filled_from_model() {
    let dir = tempdir().unwrap();
    let store = JsonFilterStore::open(&filter_file(dir.path())).unwrap();
    let set = store.load_set("demo", "1").unwrap();

    // Flat 2e-17 spectrum, one sample flagged bad; the model agrees with it
    let masked = dir.path().join("masked.txt");
    std::fs::write(
        &masked,
        "4000.0 2.0 0.1 0\n4001.0 2.0 0.1 0\n4002.0 9.0 0.1 2\n4003.0 2.0 0.1 0\n",
    )
    .unwrap();
    let clean = dir.path().join("clean.txt");
    std::fs::write(
        &clean,
        "4000.0 2.0 0.1 0\n4001.0 2.0 0.1 0\n4002.0 2.0 0.1 0\n4003.0 2.0 0.1 0\n",
    )
    .unwrap();
    let synthesis = dir.path().join("masked.out");
    std::fs::write(&synthesis, SYNTHESIS).unwrap();

    let inputs = vec![
        SourceInput::with_model(&masked, &synthesis),
        SourceInput::new(&clean),
    ];
    let adapter = SourceFormat::Starlight.adapter();
    let table = run_batch(&Photometer::default(), &set, adapter.as_ref(), &inputs);

    let rows = table.rows();
    assert_eq!(table.filter_ids(), &["blue".to_string(), "red".to_string()]);
    assert_eq!(rows[0].id, "masked");
    assert_eq!(rows[1].id, "clean");

    let filled = rows[0].results[0].magnitude;
    let reference = rows[1].results[0].magnitude;
    assert!(filled.is_finite());
    assert!((filled - reference).abs() < 1e-9);
    assert!(!rows[0].results[1].is_measurable());

    let mut out = Vec::new();
    table.write_csv(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "id,blue,blue_err,red,red_err");
    assert!(lines[1].starts_with("masked,"));
    assert!(lines[1].ends_with(",inf,inf"));
}
