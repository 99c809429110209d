// src/classify.rs

//! Output classifier for the worker's stdout.
//!
//! The classifier is a side read: it never changes what gets forwarded. Each
//! chunk is fed to [`OutputClassifier::observe`]; chunks are split into lines
//! (partial lines are carried over to the next chunk), colour escapes are
//! stripped, and a line starting with `0 passing` latches
//! [`OutputClassifier::no_tests_found`] for the rest of the run.

use std::sync::LazyLock;

use regex::Regex;

/// `ESC [ <n>(;<n>)? (m|K)` colour / erase-line sequences.
static COLOR_CODES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B\[(?:[0-9]{1,2}(?:;[0-9]{1,2})?)?[mK]").expect("valid colour regex")
});

static NO_TESTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0 passing").expect("valid summary regex"));

/// Per-run stdout classifier.
#[derive(Debug, Default)]
pub struct OutputClassifier {
    pending: Vec<u8>,
    no_tests_found: bool,
}

impl OutputClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of raw stdout.
    pub fn observe(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.classify_line(&line);
        }
    }

    /// Flush a trailing partial line (stdout closed without a newline).
    pub fn finish(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.classify_line(&rest);
        }
    }

    /// Latched once a `0 passing` summary has been seen.
    pub fn no_tests_found(&self) -> bool {
        self.no_tests_found
    }

    fn classify_line(&mut self, raw: &[u8]) {
        if self.no_tests_found {
            return;
        }
        if is_no_tests_summary(&String::from_utf8_lossy(raw)) {
            self.no_tests_found = true;
        }
    }
}

/// Remove colour / erase-line escape sequences.
pub fn strip_color_codes(text: &str) -> String {
    COLOR_CODES.replace_all(text, "").into_owned()
}

/// True if `text`, once de-coloured and trimmed, starts with `0 passing`.
pub fn is_no_tests_summary(text: &str) -> bool {
    NO_TESTS.is_match(strip_color_codes(text).trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coloured_summary_matches_like_plain() {
        assert!(is_no_tests_summary("0 passing"));
        assert!(is_no_tests_summary("\x1B[32m0 passing\x1B[0m"));
        assert!(is_no_tests_summary("  \x1B[90m0 passing (3ms)\x1B[0m\n"));
    }

    #[test]
    fn other_counts_do_not_match() {
        assert!(!is_no_tests_summary("10 passing"));
        assert!(!is_no_tests_summary("3 passing (20ms)"));
        assert!(!is_no_tests_summary("  1 failing"));
        assert!(!is_no_tests_summary("tests: 0 passing"));
    }

    #[test]
    fn erase_line_sequence_is_stripped() {
        assert_eq!(strip_color_codes("\x1B[2K\x1B[1;32mok\x1B[0m"), "ok");
        assert_eq!(strip_color_codes("\x1B[K0 passing"), "0 passing");
    }

    #[test]
    fn latch_sets_on_summary_line_within_chunk() {
        let mut c = OutputClassifier::new();
        c.observe(b"\n  suite\n    \xE2\x9C\x93 nothing\n");
        assert!(!c.no_tests_found());

        c.observe(b"\n\n  0 passing (2ms)\n\n");
        assert!(c.no_tests_found());
    }

    #[test]
    fn latch_is_sticky() {
        let mut c = OutputClassifier::new();
        c.observe(b"0 passing\n");
        c.observe(b"5 passing\n");
        c.observe(b"0 passing\n");
        assert!(c.no_tests_found());
    }

    #[test]
    fn summary_split_across_chunks_is_detected() {
        let mut c = OutputClassifier::new();
        c.observe(b"  \x1B[32m0 pas");
        assert!(!c.no_tests_found());
        c.observe(b"sing\x1B[0m\n");
        assert!(c.no_tests_found());
    }

    #[test]
    fn trailing_partial_line_is_classified_on_finish() {
        let mut c = OutputClassifier::new();
        c.observe(b"0 passing");
        assert!(!c.no_tests_found());
        c.finish();
        assert!(c.no_tests_found());
    }
}
