use lanechart::{Record, Severity, ingest::records_from_reader};

const FIXTURE: &str = include_str!("data/collisions_sample.csv");

fn records() -> Vec<Record> {
    records_from_reader(FIXTURE.as_bytes()).unwrap()
}

fn by_index(records: &[Record], index: u64) -> &Record {
    records
        .iter()
        .find(|r| r.index == index)
        .unwrap_or_else(|| panic!("no record with index {index}"))
}

#[test]
fn drops_non_pedestrian_involvements() {
    let records = records();
    // Row 2 is the driver side of collision 5001; everything else survives.
    assert_eq!(records.len(), 11);
    assert!(records.iter().all(|r| r.index != 2));
    // Both involvement rows of 5001 would share the number; only one is kept.
    assert_eq!(
        records.iter().filter(|r| r.accident_number == 5001).count(),
        1
    );
}

#[test]
fn actions_are_renamed_to_display_labels() {
    let records = records();
    assert_eq!(by_index(&records, 1).action, "Ran onto road");
    assert_eq!(
        by_index(&records, 5).action,
        "Crossing with no traffic control"
    );
    assert_eq!(
        by_index(&records, 6).action,
        "Crossing without right of way"
    );
    // Both walking directions fold into one display category.
    assert_eq!(by_index(&records, 8).action, "Walking along road");
    assert_eq!(by_index(&records, 9).action, "Walking along road");
    assert_eq!(by_index(&records, 12).action, "Behind parked vehicle");
}

#[test]
fn dates_parse_from_the_export_shape() {
    let records = records();
    let r = by_index(&records, 5);
    assert_eq!(r.year, Some(2006));
    assert_eq!(r.month, Some(6));
    assert_eq!(r.time, "2130");

    let bad = by_index(&records, 11);
    assert_eq!(bad.year, None);
    assert_eq!(bad.month, None);
    assert_eq!(bad.action, "On sidewalk or shoulder"); // row still kept
}

#[test]
fn severity_is_normalized() {
    let records = records();
    assert_eq!(by_index(&records, 1).severity, Severity::NonFatal);
    assert_eq!(by_index(&records, 10).severity, Severity::Fatal);
}

#[test]
fn quoted_fields_survive_the_csv_layer() {
    let records = records();
    let r = by_index(&records, 5);
    assert_eq!(r.district, "Toronto East York");
    assert_eq!(r.age_band, "45 to 49");
}
