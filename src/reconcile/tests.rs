use super::{partition_verified_first, Reconciler};
use crate::domain::asset::{AssetRecord, AssetStatus};
use crate::registry::Registry;
use crate::store::{SqliteStore, Store};
use crate::{catalog, ledger};

fn fixture() -> (SqliteStore, Registry) {
    let store = SqliteStore::open_in_memory().expect("store should open");
    (store, Registry::new("General"))
}

fn seed_catalog(store: &dyn Store, entries: &[(&str, &str)]) {
    let records: Vec<AssetRecord> = entries
        .iter()
        .map(|(tag, name)| AssetRecord::new(*tag, *name, AssetStatus::Absent))
        .collect();
    catalog::replace(store, &records).expect("catalog should write");
}

#[test]
fn untouched_catalog_appears_absent_in_catch_all() {
    let (store, registry) = fixture();
    seed_catalog(&store, &[("A1", "Chair"), ("A2", "Desk")]);

    let view = Reconciler::new(&store, &registry)
        .display_view("General")
        .expect("view should compute");
    assert_eq!(
        view,
        vec![
            AssetRecord::new("A1", "Chair", AssetStatus::Absent),
            AssetRecord::new("A2", "Desk", AssetStatus::Absent),
        ]
    );
}

#[test]
fn assets_claimed_elsewhere_leave_the_catch_all() {
    let (store, registry) = fixture();
    seed_catalog(&store, &[("A1", "Chair"), ("A2", "Desk")]);
    registry.add(&store, "Room1").expect("room should be added");
    ledger::save(
        &store,
        "Room1",
        &[AssetRecord::new("A1", "Chair", AssetStatus::Present)],
    )
    .expect("ledger should save");

    let engine = Reconciler::new(&store, &registry);
    let view = engine.display_view("General").expect("view should compute");
    assert_eq!(view, vec![AssetRecord::new("A2", "Desk", AssetStatus::Absent)]);

    let assigned = engine.assigned_elsewhere().expect("set should compute");
    assert!(assigned.contains("A1"));
    assert_eq!(assigned.len(), 1);
}

#[test]
fn catch_all_overrides_replace_master_entries_in_place() {
    let (store, registry) = fixture();
    seed_catalog(&store, &[("A1", "Chair"), ("A2", "Desk"), ("A3", "Lamp")]);
    ledger::save(
        &store,
        "General",
        &[AssetRecord::new("A2", "Desk", AssetStatus::Present)],
    )
    .expect("ledger should save");

    let view = Reconciler::new(&store, &registry)
        .display_view("General")
        .expect("view should compute");
    // A2 surfaces once, as the stored override, sorted into the verified group.
    assert_eq!(
        view,
        vec![
            AssetRecord::new("A2", "Desk", AssetStatus::Present),
            AssetRecord::new("A1", "Chair", AssetStatus::Absent),
            AssetRecord::new("A3", "Lamp", AssetStatus::Absent),
        ]
    );
}

#[test]
fn manual_extras_survive_with_an_empty_catalog() {
    let (store, registry) = fixture();
    ledger::save(
        &store,
        "General",
        &[AssetRecord::new("A3", "Extra Item", AssetStatus::Manual)],
    )
    .expect("ledger should save");

    let view = Reconciler::new(&store, &registry)
        .display_view("General")
        .expect("view should compute");
    assert_eq!(view, vec![AssetRecord::new("A3", "Extra Item", AssetStatus::Manual)]);
}

#[test]
fn manual_extras_group_with_verified_entries() {
    let (store, registry) = fixture();
    seed_catalog(&store, &[("A1", "Chair"), ("A2", "Desk")]);
    ledger::save(
        &store,
        "General",
        &[AssetRecord::new("A3", "Extra Item", AssetStatus::Manual)],
    )
    .expect("ledger should save");

    let view = Reconciler::new(&store, &registry)
        .display_view("General")
        .expect("view should compute");
    assert_eq!(
        view,
        vec![
            AssetRecord::new("A3", "Extra Item", AssetStatus::Manual),
            AssetRecord::new("A1", "Chair", AssetStatus::Absent),
            AssetRecord::new("A2", "Desk", AssetStatus::Absent),
        ]
    );
}

#[test]
fn non_catch_all_views_are_the_stored_ledger_verbatim() {
    let (store, registry) = fixture();
    seed_catalog(&store, &[("A1", "Chair")]);
    registry.add(&store, "Room1").expect("room should be added");
    let stored = vec![
        AssetRecord::new("B9", "Unsorted", AssetStatus::Present),
        AssetRecord::new("A1", "Chair", AssetStatus::Present),
    ];
    ledger::save(&store, "Room1", &stored).expect("ledger should save");

    let view = Reconciler::new(&store, &registry)
        .display_view("Room1")
        .expect("view should compute");
    assert_eq!(view, stored);
}

#[test]
fn duplicated_tag_across_rooms_surfaces_in_both_and_never_in_catch_all() {
    let (store, registry) = fixture();
    seed_catalog(&store, &[("A1", "Chair")]);
    registry.add(&store, "Room1").expect("room should be added");
    registry.add(&store, "Room2").expect("room should be added");
    let entry = AssetRecord::new("A1", "Chair", AssetStatus::Present);
    ledger::save(&store, "Room1", &[entry.clone()]).expect("ledger should save");
    ledger::save(&store, "Room2", &[entry.clone()]).expect("ledger should save");

    let engine = Reconciler::new(&store, &registry);
    assert_eq!(engine.display_view("Room1").expect("view"), vec![entry.clone()]);
    assert_eq!(engine.display_view("Room2").expect("view"), vec![entry]);
    assert!(engine.display_view("General").expect("view").is_empty());
}

#[test]
fn missing_reports_unconfirmed_catalog_entries_only() {
    let (store, registry) = fixture();
    seed_catalog(&store, &[("A1", "Chair"), ("A2", "Desk"), ("A3", "Lamp")]);
    registry.add(&store, "Room1").expect("room should be added");
    ledger::save(
        &store,
        "Room1",
        &[AssetRecord::new("A1", "Chair", AssetStatus::Present)],
    )
    .expect("ledger should save");
    ledger::save(
        &store,
        "General",
        &[AssetRecord::new("a2", "Desk", AssetStatus::Present)],
    )
    .expect("ledger should save");

    let missing = Reconciler::new(&store, &registry)
        .missing()
        .expect("missing should compute");
    assert_eq!(missing, vec![AssetRecord::new("A3", "Lamp", AssetStatus::Absent)]);
}

#[test]
fn partition_is_stable_within_groups() {
    let records = vec![
        AssetRecord::new("A1", "first absent", AssetStatus::Absent),
        AssetRecord::new("A2", "first present", AssetStatus::Present),
        AssetRecord::new("A3", "second absent", AssetStatus::Absent),
        AssetRecord::new("A4", "manual", AssetStatus::Manual),
        AssetRecord::new("A5", "second present", AssetStatus::Present),
    ];

    let sorted = partition_verified_first(records);
    let tags: Vec<&str> = sorted.iter().map(|record| record.tag.as_str()).collect();
    assert_eq!(tags, ["A2", "A4", "A5", "A1", "A3"]);
}
