//! End-to-end behaviour of the state machines fed with decoded backend traffic.

use pikreg_api_models::{ApiOutcome, DeleteResults, RecordId};
use pikreg_core::{
    AccountState, RunSignal, RunStatus, SequentialRun, Wizard, WizardEvent, parse_account_lines,
    reconcile_deletion, remove_rows,
};
use pikreg_events::{ActivationEvent, FrameDecoder};
use pikreg_test_support::fixtures::account_row;
use pikreg_test_support::sse::{sse_body, successful_run};
use serde_json::json;

fn decode_in_chunks(body: &str, chunk: usize) -> Vec<ActivationEvent> {
    let mut decoder = FrameDecoder::new();
    let mut events = Vec::new();
    for piece in body.as_bytes().chunks(chunk) {
        for frame in decoder.push(piece) {
            events.push(frame.expect("well-formed frame"));
        }
    }
    assert_eq!(decoder.finish(), 0);
    events
}

#[test]
fn three_account_run_reaches_full_progress() {
    let body = sse_body(&successful_run(&["a", "b", "c"]));
    let mut run = SequentialRun::new();
    run.start();

    let mut last_current = 0;
    let mut pairs = 0;
    let mut closed = false;
    for event in decode_in_chunks(&body, 7) {
        if matches!(event, ActivationEvent::Result { .. }) {
            pairs += 1;
        }
        let signal = run.apply(&event);
        assert!(run.progress().current >= last_current);
        last_current = run.progress().current;
        if signal == RunSignal::Close {
            closed = true;
            assert_eq!(pairs, 3);
        }
    }

    assert!(closed);
    let progress = run.progress();
    assert_eq!(progress.status, RunStatus::Completed);
    assert_eq!(progress.percent, 100);
    assert_eq!(progress.results.len(), 3);
    assert!(progress.results.iter().all(|r| r.is_success()));
    assert_eq!(progress.summary.as_deref(), Some("done"));
}

#[test]
fn cancelled_run_stops_growing() {
    let events = decode_in_chunks(&sse_body(&successful_run(&["a", "b", "c"])), 64);
    let mut run = SequentialRun::new();
    run.start();

    let mut iter = events.iter();
    for event in iter.by_ref() {
        run.apply(event);
        if run.progress().results.len() == 1 {
            break;
        }
    }
    assert!(run.cancel());
    for event in iter {
        assert_eq!(run.apply(event), RunSignal::Ignored);
    }
    assert_eq!(run.progress().status, RunStatus::Cancelled);
    assert_eq!(run.progress().results.len(), 1);
}

#[test]
fn malformed_frame_does_not_end_the_run() {
    let mut body = sse_body(&[json!({"status": "start", "total": 1})]);
    body.push_str("data: {not json}\n\n");
    body.push_str(&sse_body(&successful_run(&["a"])[2..]));

    let mut decoder = FrameDecoder::new();
    let mut run = SequentialRun::new();
    run.start();
    let mut failures = 0;
    for frame in decoder.push(body.as_bytes()) {
        match frame {
            Ok(event) => {
                run.apply(&event);
            }
            Err(_) => failures += 1,
        }
    }
    assert_eq!(failures, 1);
    assert_eq!(run.progress().status, RunStatus::Completed);
    assert_eq!(run.progress().results.len(), 1);
}

#[test]
fn single_account_registration_records_one_success() {
    let accounts = parse_account_lines("a@x.io----pw----cid----tok").expect("parse");
    let mut wizard = Wizard::new(accounts).expect("batch");
    for event in [
        WizardEvent::Begin,
        WizardEvent::Initialized,
        WizardEvent::CaptchaVerified,
        WizardEvent::CodeReceived("123456".into()),
        WizardEvent::Registered {
            message: Some("registered".into()),
        },
    ] {
        wizard.apply(&event).expect("legal transition");
    }

    assert!(wizard.is_finished());
    assert_eq!(wizard.entries().len(), 1);
    let successes = wizard
        .entries()
        .iter()
        .filter(|entry| matches!(entry.state, AccountState::Success { .. }))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(wizard.summary().succeeded, 1);
}

#[test]
fn partial_batch_delete_keeps_unconfirmed_row() {
    let mut rows: Vec<pikreg_api_models::Account> = (1..=3)
        .map(|id| serde_json::from_value(account_row(id, &format!("u{id}@x.io"), 0)).expect("row"))
        .collect();
    let selection: Vec<RecordId> = rows.iter().map(|row| row.id.clone()).collect();

    let outcome = ApiOutcome::<DeleteResults>::from_value(json!({
        "status": "partial",
        "message": "deleted 2, failed 1",
        "results": {"success": ["1", "2"], "failed": [{"id": 3, "reason": "denied"}]}
    }))
    .expect("outcome");

    let removed = reconcile_deletion(&selection, &outcome);
    remove_rows(&mut rows, &removed);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, RecordId::from("3"));
}
