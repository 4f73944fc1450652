// Output formatting and styling

use std::io::IsTerminal;

use atv_discovery::DeviceInfo;
use colored::Colorize;

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: std::io::stdout().is_terminal(),
        }
    }
}

impl OutputStyle {
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().underline().to_string()
        } else {
            title.to_string()
        }
    }

    /// One line per discovered device
    pub fn device(&self, device: &DeviceInfo) -> String {
        let name = if self.use_colors {
            device.name.bold().to_string()
        } else {
            device.name.clone()
        };
        format!(
            "{}  {}  {}  {} {}",
            name,
            device.address,
            device.mac.as_deref().unwrap_or("-"),
            device
                .model_name
                .as_deref()
                .or(device.model.as_deref())
                .unwrap_or("unknown model"),
            device.version.as_deref().unwrap_or(""),
        )
        .trim_end()
        .to_string()
    }
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    eprintln!("{}", OutputStyle::default().error(msg));
}

/// Print a success message to stdout
pub fn print_success(msg: &str) {
    println!("{}", OutputStyle::default().success(msg));
}

/// Print an info message to stdout
pub fn print_info(msg: &str) {
    println!("{}", OutputStyle::default().info(msg));
}

/// Print a warning to stderr
pub fn print_warning(msg: &str) {
    eprintln!("{}", OutputStyle::default().warning(msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_device_line() {
        let device = DeviceInfo {
            name: "Living Room".to_string(),
            address: "10.0.0.5".to_string(),
            identifier: None,
            mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
            model: Some("Gen4K".to_string()),
            model_name: Some("Apple TV 4K".to_string()),
            os: None,
            version: Some("17.4".to_string()),
        };

        assert_eq!(
            OutputStyle::plain().device(&device),
            "Living Room  10.0.0.5  AA:BB:CC:DD:EE:FF  Apple TV 4K 17.4"
        );
    }

    #[test]
    fn test_plain_messages() {
        let style = OutputStyle::plain();
        assert_eq!(style.success("done"), "✓ done");
        assert_eq!(style.warning("careful"), "⚠ careful");
    }
}
