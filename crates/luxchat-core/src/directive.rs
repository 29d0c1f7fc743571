//! System directive synthesis from a chatbot's trait profile.
//!
//! Maps the witty/formal/friendly scores and the purpose string into the
//! system-role instruction text injected ahead of the transcript on every
//! completion call. Pure string assembly: deterministic, no side effects,
//! always returns a string.

use luxchat_types::chatbot::TraitProfile;

/// Band threshold above which a trait reads as strongly expressed.
const HIGH_BAND: u8 = 70;

/// Band threshold below which a trait reads as suppressed.
const LOW_BAND: u8 = 40;

/// Purpose used when a chatbot has none configured.
const DEFAULT_PURPOSE: &str = "help users";

/// Synthesize the system directive for one completion call.
///
/// Each trait is classified into one of three bands -- strictly greater
/// than 70 is the high band, strictly below 40 the low band, everything
/// in between the moderate band -- and rendered as one sentence. A final
/// sentence states the assistant's purpose, defaulting to "help users"
/// when `purpose` is absent or blank.
pub fn synthesize(traits: &TraitProfile, purpose: Option<&str>) -> String {
    let mut sentences = Vec::with_capacity(5);

    sentences.push("You are a chat assistant embedded in a website widget.".to_string());

    sentences.push(banded_sentence(
        traits.witty(),
        "Be very witty and playful in your responses.",
        "Be moderately witty.",
        "Stay serious; avoid jokes.",
    ));

    sentences.push(banded_sentence(
        traits.formal(),
        "Use a very formal, professional tone.",
        "Keep a balanced, conversational tone.",
        "Use a casual, relaxed tone.",
    ));

    sentences.push(banded_sentence(
        traits.friendly(),
        "Be very warm and friendly.",
        "Be polite and approachable.",
        "Be reserved and matter-of-fact.",
    ));

    let purpose = match purpose.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => DEFAULT_PURPOSE,
    };
    sentences.push(format!("Your purpose is to {purpose}."));

    sentences.join(" ")
}

fn banded_sentence(score: u8, high: &str, moderate: &str, low: &str) -> String {
    if score > HIGH_BAND {
        high.to_string()
    } else if score < LOW_BAND {
        low.to_string()
    } else {
        moderate.to_string()
    }
}
