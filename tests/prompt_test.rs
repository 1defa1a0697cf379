//! Structure tests for generated prompts

use ai_commenter::{DEFAULT_TONE, Tone, ToneSelection, build_prompt};
use regex::Regex;

fn tone_line(prompt: &str) -> String {
    let re = Regex::new(r"(?m)^Tone: (.*)$").unwrap();
    let captures: Vec<_> = re.captures_iter(prompt).collect();
    assert_eq!(captures.len(), 1, "expected exactly one tone line");
    captures[0][1].to_string()
}

#[test]
fn test_funny_prompt_structure() {
    let prompt = build_prompt("Funny");

    assert_eq!(tone_line(&prompt), "Funny");
    assert!(Regex::new(r"(?m)^Style: .+$").unwrap().is_match(&prompt));
    assert!(prompt.ends_with("Please provide only the reply message, nothing else."));
    assert_eq!(prompt.matches("Funny").count(), 1);
}

#[test]
fn test_each_preset_label_embedded_once() {
    for tone in Tone::ALL {
        let prompt = build_prompt(tone.label());
        assert_eq!(tone_line(&prompt), tone.label());
        assert_eq!(
            prompt.matches(tone.label()).count(),
            1,
            "{} appears more than once",
            tone.label()
        );
    }
}

#[test]
fn test_custom_tone_embedded_verbatim() {
    let prompt = build_prompt("sarcastic but kind");

    assert_eq!(tone_line(&prompt), "sarcastic but kind");
    assert_eq!(prompt.matches("sarcastic but kind").count(), 1);
}

#[test]
fn test_selection_custom_overrides_preset() {
    // GIVEN: a preset choice plus free text
    let selection = ToneSelection::preset(Tone::Excited).with_custom("sarcastic but kind");

    // WHEN: the prompt is built from the resolved tone
    let prompt = build_prompt(&selection.resolve());

    // THEN: only the free text is embedded
    assert_eq!(tone_line(&prompt), "sarcastic but kind");
    assert!(!prompt.contains("Excited"));
}

#[test]
fn test_whitespace_custom_falls_back_to_preset() {
    let selection = ToneSelection::preset(Tone::Romantic).with_custom("  \t ");
    assert_eq!(tone_line(&build_prompt(&selection.resolve())), "Romantic");
}

#[test]
fn test_blank_tone_uses_default() {
    assert_eq!(tone_line(&build_prompt("")), DEFAULT_TONE.label());
    assert_eq!(tone_line(&build_prompt("   ")), DEFAULT_TONE.label());
}

#[test]
fn test_prompt_is_deterministic() {
    assert_eq!(build_prompt("Caring"), build_prompt("Caring"));
}
