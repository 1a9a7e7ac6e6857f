//! Conversion engine for the Crow Language
//!
//! Inserts the active mode's marker around every vowel and provides a
//! spoken-form transform used before text-to-speech playback.

mod engine;
mod speech;

pub use engine::{convert, convert_with_marker, is_vowel, ConversionResult, VOWELS};
pub use speech::to_speech_form;
