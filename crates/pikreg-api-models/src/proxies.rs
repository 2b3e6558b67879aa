//! Proxy pool bodies.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ids::RecordId;

fn flag_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or 0/1")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

const fn active_by_default() -> bool {
    true
}

/// One proxy pool row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    /// Row id.
    pub id: RecordId,
    /// Full proxy URL.
    #[serde(alias = "url")]
    pub proxy_url: String,
    /// `http`, `https` or `socks5`.
    #[serde(default)]
    pub protocol: String,
    /// Proxy host.
    #[serde(default)]
    pub host: String,
    /// Proxy port.
    #[serde(default)]
    pub port: u16,
    /// Whether the pool may hand this proxy out.
    #[serde(default = "active_by_default", deserialize_with = "flag_or_int")]
    pub is_active: bool,
    /// Latest measured response time, in seconds.
    #[serde(default)]
    pub response_time: Option<f64>,
    /// Successful checks.
    #[serde(default)]
    pub success_count: u64,
    /// Failed checks.
    #[serde(default)]
    pub fail_count: u64,
    /// Timestamp of the latest check.
    #[serde(default)]
    pub last_checked: Option<String>,
}

/// Payload of `GET /api/proxy/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyList {
    /// Pool rows.
    #[serde(default)]
    pub proxies: Vec<Proxy>,
}

/// Body of `POST /api/proxy/add` and `POST /api/proxy/test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyUrlRequest {
    /// Proxy URL.
    pub proxy_url: String,
}

/// Body of `POST /api/proxy/remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRemoveRequest {
    /// Row to remove.
    pub proxy_id: RecordId,
}

/// Result of probing one proxy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyCheck {
    /// Whether the check reached the target.
    #[serde(default)]
    pub success: bool,
    /// Round trip, in seconds.
    #[serde(default)]
    pub response_time: Option<f64>,
    /// HTTP status seen through the proxy.
    #[serde(default)]
    pub status_code: Option<u16>,
    /// Failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// Payload of `POST /api/proxy/test`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyTestReply {
    /// Check outcome.
    #[serde(default)]
    pub test_result: ProxyCheck,
}

/// Aggregate of `POST /api/proxy/test-all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyBatchReport {
    /// Proxies in the pool.
    #[serde(default)]
    pub total: usize,
    /// Proxies checked.
    #[serde(default)]
    pub tested: usize,
    /// Checks that succeeded.
    #[serde(default)]
    pub success: usize,
    /// Checks that failed.
    #[serde(default)]
    pub failed: usize,
    /// Per-proxy detail, passed through.
    #[serde(default)]
    pub details: Vec<Value>,
}

/// Payload of `POST /api/proxy/test-all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyBatchReply {
    /// Aggregate counts.
    #[serde(default)]
    pub results: ProxyBatchReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sqlite_rows_decode() {
        let list: ProxyList = serde_json::from_value(json!({
            "proxies": [{
                "id": 1,
                "proxy_url": "http://10.0.0.1:8080",
                "protocol": "http",
                "host": "10.0.0.1",
                "port": 8080,
                "is_active": 0,
                "response_time": null,
                "success_count": 4,
                "fail_count": 1
            }]
        }))
        .expect("list");
        let proxy = &list.proxies[0];
        assert!(!proxy.is_active);
        assert_eq!(proxy.port, 8080);
        assert_eq!(proxy.success_count, 4);
    }

    #[test]
    fn remove_body_sends_numeric_id() {
        assert_eq!(
            serde_json::to_value(ProxyRemoveRequest {
                proxy_id: "5".into()
            })
            .expect("json"),
            json!({"proxy_id": 5})
        );
    }
}
