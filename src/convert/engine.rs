//! Vowel-marker transform
//!
//! Every vowel is written twice with the marker sandwiched between the
//! two copies; all other characters pass through in order.

use serde::{Deserialize, Serialize};

use crate::state::Mode;

/// Vowels of the Azerbaijani alphabet, both cases listed explicitly
pub const VOWELS: &str = "aeəoöuüıiAEOUƏÖÜIİ";

/// Output of a single conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Converted text
    pub text: String,
    /// True iff at least one input character was a vowel
    pub had_vowel: bool,
}

/// Case-sensitive vowel membership test
pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

/// Convert `text` using the marker of `mode`
///
/// `custom_marker` is only consulted in [`Mode::Custom`]; absent or empty
/// values fall back to `"q"`.
pub fn convert(text: &str, mode: Mode, custom_marker: Option<&str>) -> ConversionResult {
    convert_with_marker(text, mode.marker(custom_marker))
}

/// Convert `text` with an arbitrary marker, which may be empty
pub fn convert_with_marker(text: &str, marker: &str) -> ConversionResult {
    let mut out = String::with_capacity(text.len() * 2);
    let mut had_vowel = false;

    for c in text.chars() {
        if is_vowel(c) {
            had_vowel = true;
            out.push(c);
            out.push_str(marker);
            out.push(c);
        } else {
            out.push(c);
        }
    }

    ConversionResult {
        text: out,
        had_vowel,
    }
}
