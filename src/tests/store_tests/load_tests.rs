// src/tests/store_tests/load_tests.rs

use crate::domain::{CallLog, CallOutcome, NewCallLog, UNKNOWN_CITY};
use crate::store::LeadStore;
use crate::tests::utils::{ids, loaded_store, make_local, reopen, sample_leads, utc, FakeLeadsApi};

#[test]
fn load_normalizes_records_and_selects_first_area() {
    let (store, _api, local) = loaded_store(sample_leads());

    assert_eq!(store.leads().len(), 5);

    let contacted: Vec<bool> = store.leads().iter().map(|l| l.contacted).collect();
    assert_eq!(contacted, vec![true, false, true, false, true]);
    assert_eq!(store.lead("5").unwrap().city, UNKNOWN_CITY);

    assert_eq!(store.current_area(), Some("provo"));
    assert_eq!(local.current_area().as_deref(), Some("provo"));
}

#[test]
fn previously_selected_area_survives_load() {
    let local = make_local();
    local.set_current_area("austin").unwrap();

    let api = FakeLeadsApi::with_leads(sample_leads());
    let mut store = LeadStore::new(api, local);
    store.init();
    store.load();

    assert_eq!(store.current_area(), Some("austin"));
    assert_eq!(ids(&store.displayed_leads()), vec!["2"]);
}

#[test]
fn load_failure_is_reported_not_raised() {
    let api = FakeLeadsApi::with_leads(sample_leads());
    api.set_failing(true);
    let mut store = LeadStore::new(api, make_local());
    store.init();
    store.load();

    assert_eq!(store.error(), Some("API error 500: backend down"));
    assert!(store.leads().is_empty());
    assert_eq!(store.current_area(), None);
}

#[test]
fn malformed_record_fails_the_whole_load() {
    let mut records = sample_leads();
    records.push(serde_json::json!({"id": "6"}));
    let api = FakeLeadsApi::with_leads(records);
    let mut store = LeadStore::new(api, make_local());
    store.load();

    assert!(store.error().unwrap().contains("has no name"));
    assert!(store.leads().is_empty());
}

#[test]
fn persisted_call_logs_are_merged_on_load() {
    let local = make_local();
    let logged = CallLog::new(
        "2",
        NewCallLog::new(CallOutcome::FollowUpNextWeek, "asked for pricing"),
        utc(2024, 1, 10, 12),
    );
    local.save_call_logs_for("2", &[logged.clone()]).unwrap();
    local.save_call_logs_for("gone", &[logged.clone()]).unwrap();

    let api = FakeLeadsApi::with_leads(sample_leads());
    let store = reopen(&api, &local);

    assert_eq!(store.lead("2").unwrap().call_logs, vec![logged]);
    assert!(store.lead("1").unwrap().call_logs.is_empty());
}

#[test]
fn quiet_refresh_never_replaces_the_current_error() {
    let (mut store, api, _local) = loaded_store(sample_leads());

    api.set_failing(true);
    store.refresh_quietly();
    assert_eq!(store.error(), None);
    assert_eq!(store.leads().len(), 5);

    let _ = store.delete("1");
    let primary = store.error().map(str::to_string);
    assert!(primary.is_some());

    store.refresh_quietly();
    assert_eq!(store.error().map(str::to_string), primary);
}

#[test]
fn areas_partition_every_lead_exactly_once() {
    let (store, _api, _local) = loaded_store(sample_leads());
    let areas = store.areas();

    let names: Vec<(&str, &str)> = areas.iter().map(|a| (a.id.as_str(), a.name.as_str())).collect();
    assert_eq!(
        names,
        vec![("provo", "Provo"), ("austin", "Austin"), ("unknown", "Unknown")]
    );

    let mut all: Vec<String> = areas.iter().flat_map(|a| ids(&a.leads)).collect();
    all.sort();
    assert_eq!(all, vec!["1", "2", "3", "4", "5"]);
}
