/// Characters that make up one "word" for speed purposes
pub const CHARS_PER_WORD: f64 = 5.0;

/// Words per minute for `chars` typed over `elapsed_secs` whole seconds.
///
/// Zero elapsed time yields 0 instead of an infinite or NaN rate.
pub fn words_per_minute(chars: usize, elapsed_secs: u64) -> u32 {
    match elapsed_secs {
        0 => 0,
        secs => {
            let minutes = secs as f64 / 60.0;
            let wpm = (chars as f64 / CHARS_PER_WORD) / minutes;

            if wpm.is_finite() {
                wpm.round() as u32
            } else {
                0
            }
        }
    }
}

/// Count index-wise mismatches between `typed` and the same prefix of `reference`
pub fn count_mismatches(reference: &str, typed: &str) -> usize {
    typed
        .chars()
        .zip(reference.chars())
        .filter(|(got, want)| got != want)
        .count()
}
