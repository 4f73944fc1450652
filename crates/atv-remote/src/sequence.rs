//! The "avada kedavra" reset gesture
//!
//! Pressing home twice opens the app switcher; swiping up repeatedly closes every
//! open app, and a final home press lands on the home screen with a known focus.
//! `atvremote` runs the tokens in order when they are passed as trailing
//! arguments, honouring `delay=<ms>` pseudo-commands between them.

use std::time::Duration;

/// Number of apps cycled past when nothing else is configured
pub const DEFAULT_RESET_APP_COUNT: usize = 20;

const OPENING: [&str; 4] = ["home", "delay=100", "home", "delay=800"];
const CLOSE_ONE_APP: [&str; 4] = ["up", "delay=50", "up", "delay=600"];
const CLOSING: &str = "home";

/// Build the reset token list for `app_count` apps.
///
/// The result always has `4 * app_count + 5` tokens.
pub fn avada_kedavra_sequence(app_count: usize) -> Vec<String> {
    let mut sequence = Vec::with_capacity(OPENING.len() + CLOSE_ONE_APP.len() * app_count + 1);
    sequence.extend(OPENING.iter().map(|token| token.to_string()));
    for _ in 0..app_count {
        sequence.extend(CLOSE_ONE_APP.iter().map(|token| token.to_string()));
    }
    sequence.push(CLOSING.to_string());
    sequence
}

/// Total time spent in `delay=<ms>` tokens; a lower bound for running `tokens`
pub fn sequence_delay<S: AsRef<str>>(tokens: &[S]) -> Duration {
    tokens
        .iter()
        .filter_map(|token| token.as_ref().strip_prefix("delay="))
        .filter_map(|ms| ms.parse::<u64>().ok())
        .map(Duration::from_millis)
        .sum()
}
