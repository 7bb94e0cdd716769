use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::layout::WEB_DIR;

/// Identity fields that are authoritative on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub app_id: String,
    pub app_name: String,
    pub web_dir: String,
}

impl AppIdentity {
    pub fn new(app_id: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_name: app_name.into(),
            web_dir: WEB_DIR.to_string(),
        }
    }
}

/// Keys that are set only when absent, so operator customizations survive.
pub const DEFAULTED_KEYS: [&str; 4] = ["bundledWebRuntime", "npmClient", "android", "ios"];

/// Keys guaranteed to be present after [`merge_config`].
pub const REQUIRED_KEYS: [&str; 7] = [
    "appId",
    "appName",
    "webDir",
    "bundledWebRuntime",
    "npmClient",
    "android",
    "ios",
];

/// Contents of `capacitor.config.json`
///
/// Held as an ordered key-value document rather than a fixed struct: keys the
/// tool does not know about must round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildConfig {
    entries: IndexMap<String, Value>,
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn app_id(&self) -> Option<&str> {
        self.get("appId").and_then(Value::as_str)
    }

    pub fn app_name(&self) -> Option<&str> {
        self.get("appName").and_then(Value::as_str)
    }

    pub fn web_dir(&self) -> Option<&str> {
        self.get("webDir").and_then(Value::as_str)
    }

    /// Force `webDir` to the canonical web directory.
    ///
    /// Returns the previous value when it differed.
    pub fn normalize_web_dir(&mut self) -> Option<Value> {
        let canonical = Value::String(WEB_DIR.to_string());
        match self.entries.insert("webDir".to_string(), canonical.clone()) {
            Some(previous) if previous != canonical => Some(previous),
            _ => None,
        }
    }
}

fn default_value(key: &str) -> Value {
    match key {
        "bundledWebRuntime" => Value::Bool(false),
        "npmClient" => Value::String("npm".to_string()),
        "android" => json!({
            "allowMixedContent": true,
            "webContentsDebuggingEnabled": true,
        }),
        "ios" => json!({ "minVersion": "13.0" }),
        _ => Value::Null,
    }
}

/// Merge the invocation's identity into an existing document (or an empty one).
///
/// `appId`, `appName` and `webDir` are always overwritten. The defaulted keys
/// are only filled in when missing. Everything else is kept as-is.
pub fn merge_config(existing: Option<BuildConfig>, identity: &AppIdentity) -> BuildConfig {
    let mut config = existing.unwrap_or_default();

    config.set("appId", Value::String(identity.app_id.clone()));
    config.set("appName", Value::String(identity.app_name.clone()));
    config.set("webDir", Value::String(identity.web_dir.clone()));

    for key in DEFAULTED_KEYS {
        if !config.contains_key(key) {
            config.set(key, default_value(key));
        }
    }

    config
}
