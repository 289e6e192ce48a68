// src/tests/store_tests/mutation_tests.rs

use crate::domain::{CallOutcome, LeadPatch, NewCallLog, NewLead, UNKNOWN_CITY};
use crate::errors::DashError;
use crate::tests::utils::{loaded_store, reopen, sample_leads, utc};
use serde_json::{json, Value};

#[test]
fn create_appends_and_stores_blank_city_as_unknown() {
    let (mut store, api, _local) = loaded_store(sample_leads());

    let created = store
        .create(&NewLead {
            name: "Summit Solar".into(),
            phone: "555-0199".into(),
            city: Some("".into()),
            ..NewLead::default()
        })
        .expect("create should succeed");

    assert_eq!(created.city, UNKNOWN_CITY);
    assert_eq!(store.leads().len(), 6);
    assert_eq!(store.leads().last().unwrap().id, created.id);

    let sent = api.last_request().unwrap();
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.body.unwrap()["city"], Value::Null);
}

#[test]
fn create_failure_changes_nothing() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    api.set_failing(true);

    let err = store
        .create(&NewLead {
            name: "X".into(),
            phone: "1".into(),
            ..NewLead::default()
        })
        .unwrap_err();

    assert!(matches!(err, DashError::Api { status: 500, .. }));
    assert_eq!(store.leads().len(), 5);
    assert_eq!(store.error(), Some("API error 500: backend down"));
}

#[test]
fn update_sends_full_record_with_unknown_city_as_null() {
    let (mut store, api, _local) = loaded_store(sample_leads());

    let patch = LeadPatch {
        name: Some("Mystery Movers LLC".into()),
        ..LeadPatch::default()
    };
    let updated = store.update("5", &patch).unwrap();

    let sent = api.last_request().unwrap();
    assert_eq!(sent.method, "PUT");
    assert_eq!(sent.id.as_deref(), Some("5"));
    let body = sent.body.unwrap();
    assert_eq!(body["city"], Value::Null);
    assert_eq!(body["name"], "Mystery Movers LLC");
    assert_eq!(body["phone"], "555-015");
    assert!(body.get("call_logs").is_none());

    assert_eq!(updated.city, UNKNOWN_CITY);
    assert_eq!(store.lead("5").unwrap().name, "Mystery Movers LLC");
}

#[test]
fn update_failure_leaves_record_untouched() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    let before = store.lead("2").unwrap().clone();
    api.set_failing(true);

    let patch = LeadPatch {
        reviews: Some(999),
        ..LeadPatch::default()
    };
    assert!(store.update("2", &patch).is_err());

    assert_eq!(store.lead("2"), Some(&before));
    assert!(store.error().is_some());
}

#[test]
fn update_of_unknown_lead_never_reaches_backend() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    let sent_before = api.requests().len();

    let err = store.update("nope", &LeadPatch::contacted(true)).unwrap_err();

    assert!(matches!(err, DashError::NotFound(_)));
    assert_eq!(api.requests().len(), sent_before);
    assert_eq!(store.error(), Some("Not found: lead nope"));
}

#[test]
fn update_keeps_local_call_logs() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "voicemail"), utc(2024, 1, 10, 12))
        .unwrap();

    let patch = LeadPatch {
        website: Some(Some("https://peakplumbing.example".into())),
        ..LeadPatch::default()
    };
    let stored = store.update("1", &patch).unwrap();

    assert_eq!(stored.call_logs.len(), 1);
    assert_eq!(stored.website.as_deref(), Some("https://peakplumbing.example"));
    assert!(api.last_request().unwrap().body.unwrap().get("callLogs").is_none());
}

#[test]
fn delete_failure_keeps_the_lead() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    api.set_failing(true);

    assert!(store.delete("3").is_err());
    assert!(store.lead("3").is_some());
    assert_eq!(store.error(), Some("API error 500: backend down"));
}

#[test]
fn delete_removes_lead_and_its_call_logs() {
    let (mut store, api, local) = loaded_store(sample_leads());
    store
        .add_call_log("3", NewCallLog::new(CallOutcome::FollowUp72Hours, "busy"), utc(2024, 1, 10, 12))
        .unwrap();
    assert!(local.call_log_map().contains_key("3"));

    store.delete("3").unwrap();

    assert!(store.lead("3").is_none());
    assert!(api.record("3").is_none());
    assert!(!local.call_log_map().contains_key("3"));
    assert!(store.areas().iter().all(|a| a.leads.iter().all(|l| l.id != "3")));
}

#[test]
fn toggle_sends_only_the_contacted_field() {
    let (mut store, api, local) = loaded_store(sample_leads());

    assert!(store.toggle_contacted("2").unwrap());
    let sent = api.last_request().unwrap();
    assert_eq!(sent.body, Some(json!({"contacted": true})));
    assert!(store.lead("2").unwrap().contacted);

    assert!(!store.toggle_contacted("2").unwrap());
    assert_eq!(api.record("2").unwrap()["contacted"], json!(false));

    let reloaded = reopen(&api, &local);
    assert!(!reloaded.lead("2").unwrap().contacted);
}

#[test]
fn toggle_failure_keeps_flag() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    api.set_failing(true);

    assert!(store.toggle_contacted("2").is_err());
    assert!(!store.lead("2").unwrap().contacted);
}
