//! Filter, sort and delete bookkeeping for the table views.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, Utc};
use pikreg_api_models::{Account, ApiOutcome, DeleteResults, Proxy, RecordId};
use serde::{Deserialize, Serialize};

/// Rows addressable by a backend id.
pub trait Keyed {
    /// Row id.
    fn record_id(&self) -> &RecordId;
}

impl Keyed for Account {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl Keyed for Proxy {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

/// Sortable account columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountSort {
    /// Row creation time.
    Created,
    /// Activation count.
    #[default]
    Activations,
    /// Latest activation time.
    LastActivation,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

/// View parameters of the account table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountQuery {
    /// Case-insensitive email substring.
    pub search: Option<String>,
    /// Sort column.
    pub sort: AccountSort,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Parse a backend timestamp, either SQLite `YYYY-MM-DD HH:MM:SS` (UTC) or
/// RFC 3339.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn timestamp_key(raw: Option<&String>) -> i64 {
    raw.and_then(|value| parse_timestamp(value))
        .map_or(0, |moment| moment.timestamp_millis())
}

fn compare(a: &Account, b: &Account, sort: AccountSort) -> Ordering {
    match sort {
        AccountSort::Created => {
            timestamp_key(a.created_at.as_ref()).cmp(&timestamp_key(b.created_at.as_ref()))
        }
        AccountSort::Activations => a.activation_status.cmp(&b.activation_status),
        AccountSort::LastActivation => timestamp_key(a.last_activation_time.as_ref())
            .cmp(&timestamp_key(b.last_activation_time.as_ref())),
    }
}

/// Rows matching `query`, in display order.
///
/// Rows without a parseable timestamp sort as the oldest. Ties keep the
/// backend's order.
#[must_use]
pub fn apply_query<'a>(accounts: &'a [Account], query: &AccountQuery) -> Vec<&'a Account> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase);
    let mut rows: Vec<&Account> = accounts
        .iter()
        .filter(|account| {
            needle
                .as_deref()
                .is_none_or(|needle| account.email.to_lowercase().contains(needle))
        })
        .collect();
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort);
        match query.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    rows
}

/// Ids a delete response says were removed.
///
/// A batch breakdown is authoritative; without one, a success or partial
/// status removes everything requested. An error removes nothing.
#[must_use]
pub fn reconcile_deletion(
    requested: &[RecordId],
    outcome: &ApiOutcome<DeleteResults>,
) -> Vec<RecordId> {
    match outcome {
        ApiOutcome::Error { .. } => Vec::new(),
        ApiOutcome::Success { body, .. }
        | ApiOutcome::Partial { body, .. }
        | ApiOutcome::Info { body, .. } => match &body.results {
            Some(breakdown) => breakdown.success.clone(),
            None => requested.to_vec(),
        },
    }
}

/// Drop rows whose id is in `removed`; returns how many were dropped.
pub fn remove_rows<T: Keyed>(rows: &mut Vec<T>, removed: &[RecordId]) -> usize {
    let before = rows.len();
    rows.retain(|row| !removed.contains(row.record_id()));
    before - rows.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account(id: u32, email: &str, activations: u32, created: &str) -> Account {
        serde_json::from_value(json!({
            "id": id,
            "email": email,
            "activation_status": activations,
            "created_at": created,
        }))
        .expect("account")
    }

    fn ids(rows: &[&Account]) -> Vec<String> {
        rows.iter().map(|row| row.id.to_string()).collect()
    }

    #[test]
    fn timestamps_parse_in_both_formats() {
        let sqlite = parse_timestamp("2024-05-01 10:00:00").expect("sqlite");
        let rfc = parse_timestamp("2024-05-01T12:00:00+02:00").expect("rfc3339");
        assert_eq!(sqlite, rfc);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn default_query_sorts_by_activations_descending() {
        let rows = vec![
            account(1, "a@x.io", 1, "2024-01-01 00:00:00"),
            account(2, "b@x.io", 5, "2024-01-02 00:00:00"),
            account(3, "c@x.io", 3, "2024-01-03 00:00:00"),
        ];
        assert_eq!(ids(&apply_query(&rows, &AccountQuery::default())), ["2", "3", "1"]);
    }

    #[test]
    fn search_is_case_insensitive_and_sort_respects_direction() {
        let rows = vec![
            account(1, "Alice@x.io", 0, "2024-01-03 00:00:00"),
            account(2, "bob@x.io", 0, "2024-01-02 00:00:00"),
            account(3, "alicia@y.io", 0, "not a date"),
        ];
        let query = AccountQuery {
            search: Some(" ALI ".into()),
            sort: AccountSort::Created,
            direction: SortDirection::Asc,
        };
        assert_eq!(ids(&apply_query(&rows, &query)), ["3", "1"]);
    }

    #[test]
    fn partial_delete_removes_only_confirmed_ids() {
        let outcome = ApiOutcome::<DeleteResults>::from_value(json!({
            "status": "partial",
            "message": "2 of 3",
            "results": {"success": ["1", "2"], "failed": [{"id": "3", "reason": "denied"}]}
        }))
        .expect("outcome");
        let requested: Vec<RecordId> = ["1", "2", "3"].into_iter().map(RecordId::from).collect();
        let removed = reconcile_deletion(&requested, &outcome);

        let mut rows = vec![
            account(1, "a@x.io", 0, ""),
            account(2, "b@x.io", 0, ""),
            account(3, "c@x.io", 0, ""),
        ];
        assert_eq!(remove_rows(&mut rows, &removed), 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, RecordId::from("3"));
    }

    #[test]
    fn single_delete_success_removes_requested_id() {
        let outcome =
            ApiOutcome::<DeleteResults>::from_value(json!({"status": "success", "message": "ok"}))
                .expect("outcome");
        let requested = [RecordId::from("7")];
        assert_eq!(reconcile_deletion(&requested, &outcome), requested.to_vec());
    }

    #[test]
    fn failed_delete_removes_nothing() {
        let outcome = ApiOutcome::<DeleteResults>::Error {
            message: "denied".into(),
        };
        assert!(reconcile_deletion(&[RecordId::from("1")], &outcome).is_empty());
    }
}
