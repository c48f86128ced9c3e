//! Output helpers for consistent CLI output.
//!
//! Status messages with colored prefixes, cargo style:
//!
//! ```rust,ignore
//! use aptly_plan::output::Output;
//!
//! Output::success("3 declarations valid");
//! Output::error("mirror 'x': repos is not an Array");
//! Output::info("Loading manifest...");
//! ```

use owo_colors::OwoColorize;

/// Standard output helper for consistent CLI formatting.
pub struct Output;

impl Output {
    /// Example: `✓ 3 declarations valid`
    pub fn success(msg: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), msg.as_ref());
    }

    /// Print an error message with a red X to stderr.
    pub fn error(msg: impl AsRef<str>) {
        eprintln!("{} {}", "✗".red().bold(), msg.as_ref().red());
    }

    pub fn warning(msg: impl AsRef<str>) {
        println!("{} {}", "⚠".yellow(), msg.as_ref());
    }

    /// Example: `→ Loading manifest...`
    pub fn info(msg: impl AsRef<str>) {
        println!("{} {}", "→".cyan(), msg.as_ref().dimmed());
    }

    pub fn subheader(msg: impl AsRef<str>) {
        println!("{}", msg.as_ref().bold());
    }

    /// Print a key-value pair with alignment.
    ///
    /// Example: `  command:      aptly repo create main`
    pub fn kv(key: impl AsRef<str>, value: impl AsRef<str>) {
        println!("  {:<12} {}", format!("{}:", key.as_ref()).cyan(), value.as_ref());
    }

    /// Example: `  → Run: aptly-plan apply --confirm`
    pub fn hint(msg: impl AsRef<str>) {
        println!("  {} {}", "→".cyan(), msg.as_ref());
    }

    /// Example: `[dry-run] Would apply 4 resources`
    pub fn dry_run(msg: impl AsRef<str>) {
        println!("{} {}", "[dry-run]".dimmed(), msg.as_ref().dimmed());
    }

    pub fn blank() {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_methods_dont_panic() {
        Output::success("test");
        Output::error("test");
        Output::warning("test");
        Output::info("test");
        Output::subheader("test");
        Output::hint("test");
        Output::dry_run("test");
        Output::kv("key", "value");
        Output::blank();
    }
}
