//! tvOS 18 input naming bug
//!
//! Pairing with tvOS 18 can store every app under the same name ("Input Source 1",
//! "Input Source 2", ...). When most configured names collapse to one base name
//! the device's config files are deleted so they are rebuilt on next start.

use std::collections::BTreeMap;
use std::sync::Arc;

use atv_remote::{Logger, PrefixLogger};

use crate::error::Result;
use crate::storage::{DeviceStorage, StorageFile};

/// Share of apps (in percent) with the same base name that triggers a reset
pub const SAME_NAME_THRESHOLD_PERCENT: u32 = 70;

/// What [`InputBugSolver::run`] found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputBugOutcome {
    /// `apps.json` does not exist yet
    NoAppsFile,
    /// `apps.json` holds no apps
    NoApps,
    /// Names are diverse enough
    Healthy { percentage: u32 },
    /// The config files were deleted
    Reset {
        percentage: u32,
        name: String,
        removed: Vec<StorageFile>,
    },
}

pub struct InputBugSolver<'a> {
    storage: &'a DeviceStorage,
    log: PrefixLogger,
}

impl<'a> InputBugSolver<'a> {
    pub fn new(storage: &'a DeviceStorage, logger: Arc<dyn Logger>) -> Self {
        Self {
            storage,
            log: PrefixLogger::new(logger, "tvOS 18 Input Bug Solver"),
        }
    }

    pub fn run(&self) -> Result<InputBugOutcome> {
        let Some(apps) = self.storage.apps()? else {
            self.log.debug("No apps.json exists until now. Exiting ...");
            return Ok(InputBugOutcome::NoAppsFile);
        };
        if apps.is_empty() {
            self.log.debug("apps.json is empty. Exiting ...");
            return Ok(InputBugOutcome::NoApps);
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for app in apps.values() {
            *counts.entry(strip_counter(&app.configured_name)).or_default() += 1;
        }

        self.log.debug("Counting of same app names:");
        let mut top: Option<(&str, usize)> = None;
        for (&name, &count) in &counts {
            self.log.debug(&format!("{}: {}", name, count));
            if top.map(|(_, best)| count > best).unwrap_or(true) {
                top = Some((name, count));
            }
        }
        let (name, count) = top.unwrap_or(("", 0));
        let percentage = (count as f64 / apps.len() as f64 * 100.0).round() as u32;

        if percentage < SAME_NAME_THRESHOLD_PERCENT {
            self.log.debug("Most inputs have no similar app name. Exiting ...");
            return Ok(InputBugOutcome::Healthy { percentage });
        }

        self.log.warn(&format!(
            "{}% of apps have a configured name that starts with \"{}\". This is likely caused by a bug in tvOS 18.",
            percentage, name
        ));
        self.log.warn(
            "To resolve this issue the configuration of the Apple TV will now be reset automatically. \
             This issue only occurs during the pairing process.",
        );

        let removed = self.storage.reset()?;
        self.log
            .success("The configuration of the Apple TV has successfully been reset.");

        Ok(InputBugOutcome::Reset {
            percentage,
            name: name.to_string(),
            removed,
        })
    }
}

/// Strip a trailing `<whitespace><digits>` counter, e.g. "Input Source 42" -> "Input Source"
pub fn strip_counter(name: &str) -> &str {
    let without_digits = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == name.len() {
        return name;
    }
    match without_digits.chars().last() {
        Some(c) if c.is_whitespace() => &without_digits[..without_digits.len() - c.len_utf8()],
        _ => name,
    }
}
