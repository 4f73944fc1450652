//! Property-based tests for output classification

use atv_remote::output::RESPONSE_MARKER;
use atv_remote::{classify_stdout, OutputLine, StderrPolicy};
use proptest::prelude::*;

proptest! {
    /// Any line mentioning "error" in any casing is fatal
    #[test]
    fn prop_error_lines_are_fatal(before in "[a-z ]{0,10}", after in "[a-z ]{0,10}", upper in any::<bool>()) {
        let word = if upper { "ERROR" } else { "error" };
        let line = format!("{}{}{}{}", RESPONSE_MARKER, before, word, after);

        prop_assert!(classify_stdout(&line).is_fatal());
    }

    /// Plain responses keep their text minus the marker and surrounding whitespace
    #[test]
    fn prop_plain_responses_are_info(text in "[a-df-zA-DF-Z][a-df-zA-DF-Z0-9 ]{0,20}") {
        let line = format!("{}  {}  ", RESPONSE_MARKER, text);

        prop_assert_eq!(classify_stdout(&line), OutputLine::Info(text.trim().to_string()));
    }

    /// Whitespace-only lines are dropped
    #[test]
    fn prop_blank_lines_are_empty(padding in "[ \t]{0,10}", marker in any::<bool>()) {
        let line = if marker {
            format!("{}{}", RESPONSE_MARKER, padding)
        } else {
            padding
        };

        prop_assert_eq!(classify_stdout(&line), OutputLine::Empty);
    }

    /// Under the strict policy every stderr line is fatal
    #[test]
    fn prop_strict_stderr_is_always_fatal(line in ".{0,40}") {
        prop_assert!(StderrPolicy::Strict.classify(&line).is_fatal());
    }
}
