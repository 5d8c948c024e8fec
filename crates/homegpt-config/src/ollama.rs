use std::time::Duration;

use serde::{Deserialize, Deserializer};
use url::Url;

/// Explicit overrides for the inference backend client
///
/// Every field is optional. Unset fields fall through to the
/// `OLLAMA_BASE_URL` / `OLLAMA_MODEL` environment variables and then to
/// built-in defaults when the client is constructed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Backend base URL (e.g. `http://localhost:11434`)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Default model used by chat, ask and generate
    #[serde(default)]
    pub model: Option<String>,
    /// Per-call deadline, as milliseconds or a duration string (`"30s"`)
    #[serde(default, deserialize_with = "deserialize_timeout")]
    pub timeout: Option<Duration>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Millis(u64),
    Text(String),
}

fn deserialize_timeout<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<RawTimeout>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let duration = match raw {
        RawTimeout::Millis(ms) => Duration::from_millis(ms),
        RawTimeout::Text(s) => {
            duration_str::parse(&s).map_err(|e| serde::de::Error::custom(format!("invalid timeout '{s}': {e}")))?
        }
    };

    Ok(Some(duration))
}
