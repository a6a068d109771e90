//! Data carried from the page to the generation service.

use serde::{Deserialize, Serialize};

/// Context read from the host page for one generation request.
///
/// Fields are empty when the page had nothing to offer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub sender_name: String,
    pub recipient_name: String,
    pub subject: String,
    pub body_text: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Auto,
    Professional,
    Casual,
    Friendly,
    Formal,
}

impl Tone {
    pub fn name(&self) -> &'static str {
        match self {
            Tone::Auto => "auto",
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
        }
    }

    pub fn all() -> [Tone; 5] {
        [
            Tone::Auto,
            Tone::Professional,
            Tone::Casual,
            Tone::Friendly,
            Tone::Formal,
        ]
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::all()
            .into_iter()
            .find(|tone| tone.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tone '{s}'"))
    }
}

/// Options chosen on the settings surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub tone: Tone,
    pub include_names: bool,
    pub include_signature: bool,
    pub keep_formatting: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            tone: Tone::Auto,
            include_names: true,
            include_signature: true,
            keep_formatting: false,
        }
    }
}

/// Wire body sent to the generation endpoint.
///
/// Optional fields are skipped entirely when extraction found nothing, so the
/// service never sees `null` or `""` for them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub email_content: String,
    pub tone: Tone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub include_names: bool,
    pub include_signature: bool,
    pub keep_formatting: bool,
}

impl GenerationRequest {
    pub fn new(extraction: &ExtractionResult, settings: GenerationSettings) -> Self {
        Self {
            email_content: extraction.body_text.clone(),
            tone: settings.tone,
            sender_name: non_empty(&extraction.sender_name),
            receiver_name: non_empty(&extraction.recipient_name),
            subject: non_empty(&extraction.subject),
            include_names: settings.include_names,
            include_signature: settings.include_signature,
            keep_formatting: settings.keep_formatting,
        }
    }

    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            tone: self.tone,
            include_names: self.include_names,
            include_signature: self.include_signature,
            keep_formatting: self.keep_formatting,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extraction_omits_optional_keys() {
        let request = GenerationRequest::new(&ExtractionResult::default(), Default::default());
        let json = request.to_json();
        let object = json.as_object().unwrap();

        assert_eq!(object["emailContent"], "");
        assert!(!object.contains_key("senderName"));
        assert!(!object.contains_key("receiverName"));
        assert!(!object.contains_key("subject"));
        assert_eq!(object["tone"], "auto");
    }

    #[test]
    fn settings_survive_request_round_trip() {
        let settings = GenerationSettings {
            tone: Tone::Casual,
            include_names: true,
            include_signature: false,
            keep_formatting: false,
        };
        let extraction = ExtractionResult {
            sender_name: "Ann".into(),
            recipient_name: String::new(),
            subject: "Lunch".into(),
            body_text: "Are you free?".into(),
        };

        let request = GenerationRequest::new(&extraction, settings);
        let encoded = serde_json::to_string(&request).unwrap();
        assert!(!encoded.contains("receiverName"));

        let decoded: GenerationRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.settings(), settings);
        assert_eq!(decoded.sender_name.as_deref(), Some("Ann"));
        assert_eq!(decoded.receiver_name, None);
    }

    #[test]
    fn tone_parses_case_insensitively() {
        assert_eq!("Formal".parse::<Tone>().unwrap(), Tone::Formal);
        assert!("sarcastic".parse::<Tone>().is_err());
    }
}
