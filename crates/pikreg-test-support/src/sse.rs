//! Builders for sequential-activation response bodies.

use serde_json::{Value, json};

/// One `data:` frame followed by the blank separator line.
#[must_use]
pub fn frame(event: &Value) -> String {
    format!("data: {event}\n\n")
}

/// Concatenated frames for `events`.
#[must_use]
pub fn sse_body(events: &[Value]) -> String {
    events.iter().map(frame).collect()
}

/// Events of a fully successful run over `accounts`.
///
/// `init`, `start`, then a `processing`/`result` pair per account with a
/// `delay` between accounts, then `complete`.
#[must_use]
pub fn successful_run(accounts: &[&str]) -> Vec<Value> {
    let total = accounts.len();
    let mut events = vec![
        json!({"status": "init", "message": "connected"}),
        json!({"status": "start", "total": total}),
    ];
    for (index, account) in accounts.iter().enumerate() {
        let current = index + 1;
        events.push(json!({
            "status": "processing",
            "current": current,
            "total": total,
            "account": account,
        }));
        events.push(json!({
            "status": "result",
            "current": current,
            "total": total,
            "account_result": {"account": account, "status": "success", "updated": true},
        }));
        if current < total {
            events.push(json!({"status": "delay", "seconds": 1.0}));
        }
    }
    events.push(json!({"status": "complete", "message": "done"}));
    events
}
