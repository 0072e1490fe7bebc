//! Parser Configuration

use serde::{Deserialize, Serialize};

use crate::CssError;

/// Stylesheet parser configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Capacity of the parse buffer (bytes pulled from the stream per refill)
    pub buffer_size: usize,

    /// At-rule keyword introducing a keyframes block
    pub keyframes_keyword: String,

    /// Keyframe offsets closer than this are treated as the same keyframe
    pub keyframe_time_epsilon: f32,
}

impl ParserConfig {
    /// Check that the configuration can drive a parse
    pub fn validate(&self) -> Result<(), CssError> {
        if self.buffer_size == 0 {
            return Err(CssError::InvalidConfig("buffer_size must be non-zero".into()));
        }
        if self.keyframes_keyword.trim().is_empty() {
            return Err(CssError::InvalidConfig("keyframes_keyword must not be empty".into()));
        }
        if self.keyframe_time_epsilon.is_nan() || self.keyframe_time_epsilon < 0.0 {
            return Err(CssError::InvalidConfig(format!(
                "keyframe_time_epsilon must be non-negative, got {}",
                self.keyframe_time_epsilon
            )));
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            buffer_size: 4092,
            keyframes_keyword: "keyframes".to_string(),
            keyframe_time_epsilon: 0.0001,
        }
    }
}
