// ============================
// crates/backend-lib/src/logging.rs
// ============================
//! Tracing setup and log redaction.
use serde_json::Value;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;

/// Service name attached to request spans
pub const SERVICE_NAME: &str = "saas-server";

const REDACTED: &str = "[REDACTED]";

/// Key fragments whose values never reach the logs
const SENSITIVE_KEYS: &[&str] = &["password", "token", "secret", "key", "authorization"];

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `settings.log_level`.
pub fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if settings.log_json {
        registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .try_init()?;
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()?;
    }
    Ok(())
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|fragment| key.contains(fragment))
}

/// Replace the values of credential-like keys, recursively
pub fn sanitize_log_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if is_sensitive(&k) {
                        (k, Value::String(REDACTED.to_string()))
                    } else {
                        (k, sanitize_log_value(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_log_value).collect()),
        other => other,
    }
}
