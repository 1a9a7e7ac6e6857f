//! Spoken-form approximation of converted text

/// Rewrite converted text so a Turkish voice pronounces it closer to intent
///
/// Replaces the `q` marker with `g` and `ə` with `e`. Both targets are
/// eliminated in a single pass, so the transform is idempotent.
pub fn to_speech_form(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'q' => 'g',
            'ə' => 'e',
            other => other,
        })
        .collect()
}
