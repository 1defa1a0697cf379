//! Tone handling and prompt construction.
//!
//! The prompt is a fixed task description followed by two tone lines:
//!
//! ```text
//! Tone: <tone string, verbatim>
//! Style: <style instruction>
//! ```
//!
//! The tone string appears on the `Tone:` line and nowhere else. Style
//! instructions and the task text are worded so they never repeat a tone
//! label.

use serde::Serialize;

/// Predefined reply tones offered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Excited,
    Happy,
    Sad,
    Romantic,
    Casual,
    Professional,
    Funny,
    Supportive,
    Sarcastic,
    Caring,
}

/// Tone substituted when the user supplies nothing usable
pub const DEFAULT_TONE: Tone = Tone::Casual;

const TASK_DESCRIPTION: &str = "\
You are an assistant that reads conversations and social media posts from images and writes a reply to them.

Instructions:
1. Carefully read and understand the conversation or post shown in the image.
2. Identify the last message or the main point that needs a response.
3. Write a reply that fits the context, using the tone given below.
4. Keep the reply natural and conversational.
5. Match the communication style of the people in the image.
";

const CLOSING: &str = "Please provide only the reply message, nothing else.";

const CUSTOM_STYLE: &str = "Write the reply in the tone named on the line above.";

impl Tone {
    /// All predefined tones, in display order
    pub const ALL: [Tone; 10] = [
        Tone::Excited,
        Tone::Happy,
        Tone::Sad,
        Tone::Romantic,
        Tone::Casual,
        Tone::Professional,
        Tone::Funny,
        Tone::Supportive,
        Tone::Sarcastic,
        Tone::Caring,
    ];

    /// Lowercase identifier used in forms and JSON
    pub fn name(&self) -> &'static str {
        match self {
            Tone::Excited => "excited",
            Tone::Happy => "happy",
            Tone::Sad => "sad",
            Tone::Romantic => "romantic",
            Tone::Casual => "casual",
            Tone::Professional => "professional",
            Tone::Funny => "funny",
            Tone::Supportive => "supportive",
            Tone::Sarcastic => "sarcastic",
            Tone::Caring => "caring",
        }
    }

    /// Capitalised label shown in the UI and embedded in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Excited => "Excited",
            Tone::Happy => "Happy",
            Tone::Sad => "Sad",
            Tone::Romantic => "Romantic",
            Tone::Casual => "Casual",
            Tone::Professional => "Professional",
            Tone::Funny => "Funny",
            Tone::Supportive => "Supportive",
            Tone::Sarcastic => "Sarcastic",
            Tone::Caring => "Caring",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Excited => "Respond with high energy, enthusiasm, and exclamation marks!",
            Tone::Happy => "Respond with positivity, warmth, and cheerfulness.",
            Tone::Sad => "Respond with empathy, understanding, and gentle sympathy.",
            Tone::Romantic => "Respond with affection, sweetness, and tender undertones.",
            Tone::Casual => "Respond in a relaxed, informal, and friendly manner.",
            Tone::Professional => "Respond formally, politely, and to the point.",
            Tone::Funny => "Respond with humor, wit, and playfulness.",
            Tone::Supportive => "Respond with encouragement and emotional reassurance.",
            Tone::Sarcastic => "Respond with dry irony and a knowing wink.",
            Tone::Caring => "Respond with genuine warmth and concern for the other person.",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_str(s: &str) -> Option<Self> {
        let needle = s.trim();
        Tone::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(needle))
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What the UI submitted: a predefined choice and an optional free-text override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToneSelection {
    pub preset: Option<Tone>,
    pub custom: Option<String>,
}

impl ToneSelection {
    pub fn preset(tone: Tone) -> Self {
        Self {
            preset: Some(tone),
            custom: None,
        }
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self {
            preset: None,
            custom: Some(text.into()),
        }
    }

    pub fn with_custom(mut self, text: impl Into<String>) -> Self {
        self.custom = Some(text.into());
        self
    }

    /// Pick the tone string to embed.
    ///
    /// Custom text wins whenever it has any non-whitespace content and is
    /// returned untouched. Otherwise the preset label is used, falling back to
    /// [`DEFAULT_TONE`].
    pub fn resolve(&self) -> String {
        match self.custom.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => self.preset.unwrap_or(DEFAULT_TONE).label().to_string(),
        }
    }
}

/// Build the instruction prompt for a tone string.
///
/// Strings matching a predefined tone (ignoring case and surrounding
/// whitespace) get that tone's style instruction. A blank tone is replaced by
/// [`DEFAULT_TONE`].
pub fn build_prompt(tone: &str) -> String {
    let (tone_line, style) = if tone.trim().is_empty() {
        (DEFAULT_TONE.label(), DEFAULT_TONE.instruction())
    } else {
        match Tone::from_str(tone) {
            Some(preset) => (tone, preset.instruction()),
            None => (tone, CUSTOM_STYLE),
        }
    };

    format!(
        "{}\nTone: {}\nStyle: {}\n\n{}",
        TASK_DESCRIPTION, tone_line, style, CLOSING
    )
}
