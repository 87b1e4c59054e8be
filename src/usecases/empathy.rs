//! Empathy overlay: wraps a reply with an opener and a gentle follow-up
//! when the user's message carries emotional cues.

use rand::Rng;
use rand::seq::SliceRandom;

pub const EMOTIONAL_CUES: &[&str] = &[
    "sad",
    "anxious",
    "overwhelmed",
    "tired",
    "depressed",
    "stressed",
    "lonely",
    "upset",
    "cry",
    "hurt",
    "exhausted",
    "pain",
    "dying",
    "help",
];

pub const EMPATHETIC_OPENERS: &[&str] = &[
    "I'm really glad you told me.",
    "That sounds like a lot to carry.",
    "I'm here with you.",
    "You're not overreacting. This matters.",
    "I hear you, and I'm here.",
    "It's okay to feel this way.",
];

pub const GENTLE_FOLLOWUPS: &[&str] = &[
    "Do you want to talk a bit more about it?",
    "Would it help to describe how today has been?",
    "I'm listening.",
    "Take your time, I'm here.",
    "Is there anything specific helping you cope right now?",
];

/// True if the raw input contains any emotional cue (case-insensitive).
pub fn is_emotional(text: &str) -> bool {
    let lower = text.to_lowercase();
    EMOTIONAL_CUES.iter().any(|cue| lower.contains(cue))
}

/// `opener`, blank line, `base`, blank line, `follow-up`.
pub fn add_empathy<R: Rng + ?Sized>(base: &str, rng: &mut R) -> String {
    let opener = EMPATHETIC_OPENERS.choose(rng).copied().unwrap_or_default();
    let followup = GENTLE_FOLLOWUPS.choose(rng).copied().unwrap_or_default();
    format!("{}\n\n{}\n\n{}", opener, base, followup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn detects_cues_case_insensitively() {
        assert!(is_emotional("I feel so ANXIOUS and tired"));
        assert!(is_emotional("everything hurts"));
        assert!(!is_emotional("what is pcos?"));
        assert!(!is_emotional("I have cramps"));
    }

    #[test]
    fn wraps_in_fixed_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let out = add_empathy("Base reply.", &mut rng);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 5);
        assert!(EMPATHETIC_OPENERS.contains(&lines[0]));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Base reply.");
        assert_eq!(lines[3], "");
        assert!(GENTLE_FOLLOWUPS.contains(&lines[4]));
    }
}
