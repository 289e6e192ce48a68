// src/tests/store_tests/call_log_tests.rs

use crate::domain::{CallLogUpdate, CallOutcome, NewCallLog};
use crate::errors::DashError;
use crate::storage::local::KEY_CALL_LOGS;
use crate::store::LeadStore;
use crate::tests::utils::{ids, loaded_store, make_local, reopen, sample_leads, utc, FakeLeadsApi};
use serde_json::{json, Value};

#[test]
fn adding_a_call_marks_contacted_and_copies_the_note() {
    let (mut store, api, local) = loaded_store(sample_leads());
    let now = utc(2024, 1, 10, 12);

    let entry = store
        .add_call_log("2", NewCallLog::new(CallOutcome::FollowUp1Day, "wants a quote"), now)
        .unwrap();

    assert_eq!(entry.id, format!("call_{}", now.timestamp_millis()));
    assert_eq!(entry.next_follow_up, Some(utc(2024, 1, 11, 12)));

    let sent = api.last_request().unwrap();
    assert_eq!(sent.id.as_deref(), Some("2"));
    assert_eq!(sent.body, Some(json!({"contacted": true, "notes": "wants a quote"})));

    let lead = store.lead("2").unwrap();
    assert!(lead.contacted);
    assert_eq!(lead.notes.as_deref(), Some("wants a quote"));
    assert_eq!(lead.call_logs, vec![entry.clone()]);
    assert_eq!(local.call_log_map().get("2"), Some(&vec![entry]));
}

#[test]
fn failed_call_log_leaves_lead_and_storage_alone() {
    let (mut store, api, local) = loaded_store(sample_leads());
    api.set_failing(true);

    let err = store
        .add_call_log("2", NewCallLog::new(CallOutcome::FollowUp1Day, "x"), utc(2024, 1, 10, 12))
        .unwrap_err();

    assert!(matches!(err, DashError::Api { .. }));
    let lead = store.lead("2").unwrap();
    assert!(lead.call_logs.is_empty());
    assert!(!lead.contacted);
    assert!(local.call_log_map().is_empty());
}

#[test]
fn call_logs_survive_reload_and_stay_local() {
    let (mut store, api, local) = loaded_store(sample_leads());
    store
        .add_call_log("4", NewCallLog::new(CallOutcome::FollowUpNextMonth, "call after season"), utc(2024, 1, 31, 0))
        .unwrap();

    let record = api.record("4").unwrap();
    assert!(record.get("callLogs").is_none());
    assert!(record.get("call_logs").is_none());

    let reloaded = reopen(&api, &local);
    let logs = &reloaded.lead("4").unwrap().call_logs;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].next_follow_up, Some(utc(2024, 2, 29, 0)));
}

#[test]
fn outcome_only_edit_skips_the_backend() {
    let (mut store, api, local) = loaded_store(sample_leads());
    let entry = store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "n"), utc(2024, 1, 10, 12))
        .unwrap();
    let sent_before = api.requests().len();

    let edited = store
        .update_call_log(
            "1",
            &entry.id,
            CallLogUpdate {
                outcome: Some(CallOutcome::FollowUpNextWeek),
                notes: Some("n".into()),
            },
            utc(2024, 1, 12, 9),
        )
        .unwrap();

    assert_eq!(api.requests().len(), sent_before);
    assert_eq!(edited.outcome, CallOutcome::FollowUpNextWeek);
    assert_eq!(edited.next_follow_up, Some(utc(2024, 1, 19, 9)));
    assert_eq!(local.call_log_map()["1"][0].outcome, CallOutcome::FollowUpNextWeek);
}

#[test]
fn note_edit_updates_the_lead_remotely() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    let entry = store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "first"), utc(2024, 1, 10, 12))
        .unwrap();

    store
        .update_call_log(
            "1",
            &entry.id,
            CallLogUpdate {
                outcome: None,
                notes: Some("owner is Dana".into()),
            },
            utc(2024, 1, 11, 0),
        )
        .unwrap();

    let sent = api.last_request().unwrap();
    assert_eq!(sent.body, Some(json!({"notes": "owner is Dana"})));
    let lead = store.lead("1").unwrap();
    assert_eq!(lead.notes.as_deref(), Some("owner is Dana"));
    assert_eq!(lead.call_logs[0].next_follow_up, entry.next_follow_up);
}

#[test]
fn failed_note_edit_keeps_old_note() {
    let (mut store, api, _local) = loaded_store(sample_leads());
    let entry = store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "first"), utc(2024, 1, 10, 12))
        .unwrap();
    api.set_failing(true);

    let update = CallLogUpdate {
        outcome: Some(CallOutcome::FollowUp3Months),
        notes: Some("second".into()),
    };
    assert!(store.update_call_log("1", &entry.id, update, utc(2024, 1, 11, 0)).is_err());

    let kept = &store.lead("1").unwrap().call_logs[0];
    assert_eq!(kept.notes, "first");
    assert_eq!(kept.outcome, CallOutcome::FollowUp1Day);
}

#[test]
fn deleting_a_call_log_is_local_only() {
    let (mut store, api, local) = loaded_store(sample_leads());
    let entry = store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "x"), utc(2024, 1, 10, 12))
        .unwrap();
    let sent_before = api.requests().len();

    store.delete_call_log("1", &entry.id).unwrap();

    assert_eq!(api.requests().len(), sent_before);
    assert!(store.lead("1").unwrap().call_logs.is_empty());
    assert!(!local.call_log_map().contains_key("1"));

    let err = store.delete_call_log("1", &entry.id).unwrap_err();
    assert!(matches!(err, DashError::NotFound(_)));
}

#[test]
fn preview_follows_latest_call_date_not_insertion_order() {
    let (mut store, _api, _local) = loaded_store(sample_leads());
    store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "newer call"), utc(2024, 2, 1, 0))
        .unwrap();
    store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "backfilled older call"), utc(2024, 1, 1, 0))
        .unwrap();

    let lead = store.lead("1").unwrap();
    assert_eq!(lead.note_preview(), Some("newer call"));
    assert_eq!(lead.latest_call_log().unwrap().notes, "newer call");
}

#[test]
fn due_leads_end_to_end() {
    let (mut store, _api, _local) = loaded_store(sample_leads());
    let now = utc(2024, 3, 10, 12);

    // Single call whose follow-up was yesterday.
    let mut overdue = NewCallLog::new(CallOutcome::FollowUp1Day, "overdue");
    overdue.next_follow_up = Some(utc(2024, 3, 9, 12));
    store.add_call_log("1", overdue, utc(2024, 3, 1, 0)).unwrap();

    // Older call overdue, newer one rescheduled into the future.
    let mut old = NewCallLog::new(CallOutcome::FollowUp1Day, "old");
    old.next_follow_up = Some(utc(2024, 3, 1, 0));
    store.add_call_log("2", old, utc(2024, 2, 1, 0)).unwrap();
    let mut newer = NewCallLog::new(CallOutcome::FollowUp1Day, "newer");
    newer.next_follow_up = Some(utc(2024, 3, 11, 12));
    store.add_call_log("2", newer, utc(2024, 3, 8, 0)).unwrap();

    assert_eq!(ids(&store.due_leads(now)), vec!["1"]);
}

#[test]
fn unreadable_stored_log_does_not_cost_other_leads_their_history() {
    let api = FakeLeadsApi::with_leads(sample_leads());
    let local = make_local();
    local
        .set_item(
            KEY_CALL_LOGS,
            r#"{
                "1": [{"id": "call_1", "leadId": "1", "outcome": "follow_up_1_day",
                       "notes": "keep me", "callDate": "2024-01-10T12:00:00Z"}],
                "3": [{"id": "call_3", "leadId": "3", "outcome": "legacy_outcome",
                       "notes": "old format", "callDate": "2024-01-10T12:00:00Z"}]
            }"#,
        )
        .unwrap();

    let mut store = LeadStore::new(api.clone(), local.clone());
    store.init();
    store.load();
    assert_eq!(store.lead("1").unwrap().call_logs[0].notes, "keep me");
    assert!(store.lead("3").unwrap().call_logs.is_empty());

    store
        .add_call_log("2", NewCallLog::new(CallOutcome::FollowUp1Day, "new"), utc(2024, 2, 1, 9))
        .unwrap();

    let raw: Value = serde_json::from_str(&local.get_item(KEY_CALL_LOGS).unwrap().unwrap()).unwrap();
    assert_eq!(raw["1"][0]["notes"], "keep me");
    assert_eq!(raw["3"][0]["outcome"], "legacy_outcome");
    assert_eq!(raw["2"][0]["notes"], "new");

    let reloaded = reopen(&api, &local);
    assert_eq!(reloaded.lead("1").unwrap().call_logs.len(), 1);
}

#[test]
fn calls_logged_in_the_same_millisecond_stay_addressable() {
    let (mut store, _api, local) = loaded_store(sample_leads());
    let now = utc(2024, 1, 10, 12);

    let first = store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "first"), now)
        .unwrap();
    let second = store
        .add_call_log("1", NewCallLog::new(CallOutcome::FollowUp1Day, "second"), now)
        .unwrap();
    assert_ne!(first.id, second.id);

    store.delete_call_log("1", &second.id).unwrap();

    let logs = &store.lead("1").unwrap().call_logs;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].notes, "first");
    assert_eq!(local.call_log_map()["1"], vec![first]);
}
