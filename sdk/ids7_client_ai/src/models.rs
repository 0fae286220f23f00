//! Records exchanged with the IDS7 AI API.
//!
//! Every record that comes back from the server implements [`Schema`] and is
//! validated before it reaches the caller. Only the fields the client relies
//! on are typed; everything else is kept in an `additional` or `fields` map
//! rather than dropped.

use ids7_client_core::error::Ids7Result;
use ids7_client_core::schema::{self, JsonPayload, Schema};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Server versions
// ---------------------------------------------------------------------------

/// Versions reported by the server's `/info` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    /// Version of the AI API.
    pub api_version: String,
    /// Version of the IDS7 software.
    pub software_version: String,
}

impl Schema for ApplicationInfo {
    const NAME: &'static str = "ApplicationInfo";
}

// ---------------------------------------------------------------------------
// Image info
// ---------------------------------------------------------------------------

/// Which optional sections to request from the image info endpoint.
///
/// Each flag adds its query parameter only when set; a cleared flag sends
/// nothing at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageInfoOptions {
    /// Adds `scope=extended`.
    pub extended: bool,
    /// Adds `includePHI=true`. The response may then contain patient data.
    pub phi: bool,
}

impl ImageInfoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the extended scope.
    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Request Protected Health Information.
    pub fn phi(mut self, phi: bool) -> Self {
        self.phi = phi;
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut params = Vec::new();
        if self.extended {
            params.push(("scope", "extended"));
        }
        if self.phi {
            params.push(("includePHI", "true"));
        }
        params
    }
}

/// Metadata describing a slide.
///
/// Only `id` is guaranteed. The rest of the document varies with the server
/// version and the requested options, so it is kept as sent and read through
/// accessors that return `None` for absent or differently shaped fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Server-assigned slide identifier.
    pub id: String,

    /// Every other field the server returned.
    #[serde(flatten)]
    pub additional: JsonPayload,
}

impl ImageInfo {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.additional.get(key)
    }

    /// A top-level field, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(serde_json::Value::as_str)
    }

    /// The `blocks` listing, each with its slides.
    ///
    /// Entries that are not block objects are skipped.
    pub fn blocks(&self) -> Vec<BlockInfo> {
        let Some(serde_json::Value::Array(blocks)) = self.get("blocks") else {
            return Vec::new();
        };
        blocks
            .iter()
            .filter_map(|block| serde_json::from_value(block.clone()).ok())
            .collect()
    }

    /// First slide of the first block, where the server describes the
    /// requested slide itself.
    pub fn slide(&self) -> Option<JsonPayload> {
        self.blocks()
            .into_iter()
            .find_map(|block| block.slides.into_iter().next())
    }
}

impl Schema for ImageInfo {
    const NAME: &'static str = "ImageInfo";
}

/// A tissue block entry of [`ImageInfo::blocks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Slides cut from this block.
    #[serde(default)]
    pub slides: Vec<JsonPayload>,

    /// Every other field of the block.
    #[serde(flatten)]
    pub fields: JsonPayload,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// An analysis result to submit to the server.
///
/// The field set is defined by the server's API contract; this type only
/// guarantees that the payload is a JSON object. It is sent exactly as built.
///
/// ```rust
/// use ids7_client_ai::models::AnalysisResult;
///
/// let result = AnalysisResult::new()
///     .with_field("score", 0.9)
///     .with_field("label", "tumor");
/// assert_eq!(result.get("score"), Some(&serde_json::json!(0.9)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(JsonPayload);

impl AnalysisResult {
    /// An empty result object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result from any value that serializes to a JSON object.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Ids7Result<Self> {
        schema::to_payload(value).map(Self)
    }

    /// Set a top-level field, replacing any previous value.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn as_payload(&self) -> &JsonPayload {
        &self.0
    }

    pub fn into_payload(self) -> JsonPayload {
        self.0
    }
}

impl From<JsonPayload> for AnalysisResult {
    fn from(payload: JsonPayload) -> Self {
        Self(payload)
    }
}

impl Schema for AnalysisResult {
    const NAME: &'static str = "AnalysisResult";
}

/// A result as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultResponse {
    /// Server-assigned result identifier.
    pub id: String,

    /// Every other field the server returned.
    #[serde(flatten)]
    pub fields: JsonPayload,
}

impl ResultResponse {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    /// Turn the stored result back into an editable [`AnalysisResult`].
    ///
    /// The identifier is dropped; pass it to `update_results` separately.
    pub fn into_result(self) -> AnalysisResult {
        AnalysisResult(self.fields)
    }
}

impl Schema for ResultResponse {
    const NAME: &'static str = "ResultResponse";
}
