use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Closed vocabulary returned by the frame classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl EmotionLabel {
    /// Ordered the same way as the classifier's output classes.
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Sad,
        EmotionLabel::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| EngineError::InvalidEmotionLabel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_label_by_name() {
        for label in EmotionLabel::ALL {
            assert_eq!(label.as_str().parse::<EmotionLabel>(), Ok(label));
        }
    }

    #[test]
    fn rejects_labels_outside_vocabulary() {
        assert_eq!(
            "bored".parse::<EmotionLabel>(),
            Err(EngineError::InvalidEmotionLabel("bored".to_string()))
        );
        // Names are matched exactly.
        assert!("Happy".parse::<EmotionLabel>().is_err());
        assert!("".parse::<EmotionLabel>().is_err());
    }

    #[test]
    fn serializes_as_lowercase_name() {
        let json = serde_json::to_string(&EmotionLabel::Surprise).unwrap();
        assert_eq!(json, "\"surprise\"");
        let back: EmotionLabel = serde_json::from_str("\"sad\"").unwrap();
        assert_eq!(back, EmotionLabel::Sad);
    }
}
