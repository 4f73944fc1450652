//! Property-based tests for the tvOS 18 input bug detector

use std::sync::Arc;

use atv_config::input_bug::strip_counter;
use atv_config::{AppConfig, AppConfigs, DeviceStorage, InputBugOutcome, InputBugSolver};
use atv_remote::RecordingLogger;
use proptest::prelude::*;

proptest! {
    /// Stripping removes exactly one trailing " <digits>" group
    #[test]
    fn prop_strip_counter(base in "[A-Za-z][A-Za-z ]{0,15}[A-Za-z]", counter in 0u32..10_000) {
        let name = format!("{} {}", base, counter);
        prop_assert_eq!(strip_counter(&name), base.as_str());
        prop_assert_eq!(strip_counter(&base), base.as_str());
    }

    /// Storage is reset exactly when at least 70% of names share a base name
    #[test]
    fn prop_reset_threshold(same in 1usize..20, distinct in 0usize..20) {
        let dir = tempfile::tempdir().unwrap();
        let storage = DeviceStorage::new(dir.path(), "AA:BB:CC:DD:EE:FF");
        let mut apps = AppConfigs::new();
        for i in 0..same {
            apps.insert(format!("input.{}", i), app(&format!("Input Source {}", i + 1)));
        }
        for i in 0..distinct {
            apps.insert(format!("app.{}", i), app(&format!("App{}", i)));
        }
        storage.save_apps(&apps).unwrap();

        let outcome = InputBugSolver::new(&storage, Arc::new(RecordingLogger::new())).run().unwrap();

        // "Input Source" always has the highest count, ties included
        let total = same + distinct;
        let percentage = (same as f64 / total as f64 * 100.0).round() as u32;
        if percentage >= 70 {
            let is_reset = matches!(outcome, InputBugOutcome::Reset { .. });
            prop_assert!(is_reset);
            prop_assert!(storage.apps().unwrap().is_none());
        } else {
            prop_assert_eq!(outcome, InputBugOutcome::Healthy { percentage });
        }
    }
}

fn app(name: &str) -> AppConfig {
    AppConfig {
        configured_name: name.to_string(),
        is_configured: 1,
        visibility_state: 0,
        identifier: 0,
    }
}
