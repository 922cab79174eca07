// src/pipeline/config.rs
use crate::error::AssemblyError;
use folio_template::RegionMarkers;
use folio_types::Mm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Space kept above the tallest run of a text slot.
pub const DEFAULT_TEXT_SLOT_PADDING: Mm = Mm(4.0);

/// Tunables for one [`Assembler`](crate::Assembler).
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes:
///
/// ```
/// use folio::AssemblyConfig;
///
/// let config = AssemblyConfig::from_json_str(r#"{ "render_timeout_ms": 30000 }"#).unwrap();
/// assert_eq!(config.render_timeout, Some(std::time::Duration::from_secs(30)));
/// assert!(config.compress_output);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Upper bound for each call into the rendering engine.
    #[serde(rename = "render_timeout_ms", with = "millis")]
    pub render_timeout: Option<Duration>,
    pub text_slot_padding: Mm,
    /// Delimiters of the repeated region in markup slots.
    pub markers: RegionMarkers,
    pub compress_output: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            render_timeout: None,
            text_slot_padding: DEFAULT_TEXT_SLOT_PADDING,
            markers: RegionMarkers::default(),
            compress_output: true,
        }
    }
}

impl AssemblyConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AssemblyError> {
        let config: AssemblyConfig = serde_json::from_str(json)
            .map_err(|e| AssemblyError::Config(format!("Failed to parse assembly config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.markers.open.is_empty() || self.markers.close.is_empty() {
            return Err(AssemblyError::Config(
                "Region markers must not be empty.".to_string(),
            ));
        }
        let padding = self.text_slot_padding.value();
        if padding.is_nan() || padding < 0.0 {
            return Err(AssemblyError::Config(format!(
                "Text slot padding must be a non-negative length, got {}.",
                self.text_slot_padding
            )));
        }
        if self.render_timeout == Some(Duration::ZERO) {
            return Err(AssemblyError::Config(
                "Render timeout must be greater than zero.".to_string(),
            ));
        }
        Ok(())
    }
}

/// `Option<Duration>` as whole milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
