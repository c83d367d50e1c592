//! Terminal output with optional colors.

use super::formatter::CompressionSummary;
use super::formatter::OutputFormatter;
use super::formatter::SizeInfo;
use anyhow::Result;
use console::Term;
use console::style;
use filepack_core::Member;
use filepack_core::member::render_table;
use std::path::Path;

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Renders a byte count with a binary unit, one decimal above 1 KB.
fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Inserts thousands separators.
fn grouped(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    // Broken pipes are not worth failing a finished operation over.
    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn done(&self, message: &str) {
        if self.use_colors {
            self.line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            self.line(message);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_members(&self, path: &Path, members: &[Member]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if members.is_empty() {
            self.line(&format!("{} is empty", path.display()));
            return Ok(());
        }

        self.term.write_str(&render_table(members))?;
        let total: u64 = members.iter().map(|m| m.size).sum();
        self.line(&format!(
            "Total: {} members, {}",
            grouped(members.len()),
            human_size(total)
        ));

        if self.verbose {
            let stored: u64 = members.iter().filter_map(|m| m.compressed_size).sum();
            if stored > 0 {
                self.line(&format!("Stored: {}", human_size(stored)));
            }
        }
        Ok(())
    }

    fn format_added(&self, archive: &Path, name: &str) -> Result<()> {
        if !self.quiet {
            self.done(&format!("Added {name} to {}", archive.display()));
        }
        Ok(())
    }

    fn format_removed(&self, archive: &Path, name: &str) -> Result<()> {
        if !self.quiet {
            self.done(&format!("Removed {name} from {}", archive.display()));
        }
        Ok(())
    }

    fn format_extracted(
        &self,
        archive: &Path,
        output_dir: &Path,
        members: &[Member],
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.done("Extraction complete");
        self.line(&format!("  From:    {}", archive.display()));
        self.line(&format!("  Into:    {}", output_dir.display()));
        self.line(&format!(
            "  Members: {} ({})",
            grouped(members.len()),
            human_size(members.iter().map(|m| m.size).sum())
        ));
        if self.verbose {
            for member in members {
                self.line(&format!("    {}", member.name));
            }
        }
        Ok(())
    }

    fn format_compression(&self, summary: &CompressionSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let verb = if summary.operation == "compress" {
            "Compressed"
        } else {
            "Decompressed"
        };
        self.done(&format!(
            "{verb} {} -> {} ({})",
            summary.source.display(),
            summary.target.display(),
            summary.algorithm.name()
        ));
        self.line(&format!(
            "  {} -> {}",
            human_size(summary.source_size),
            human_size(summary.target_size)
        ));
        if self.verbose && summary.in_place {
            self.line(&format!("  Removed {}", summary.source.display()));
        }
        Ok(())
    }

    fn format_info(&self, info: &SizeInfo) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let title = format!("{} ({})", info.path.display(), info.algorithm.name());
        if self.use_colors {
            self.line(&style(title).bold().to_string());
        } else {
            self.line(&title);
        }
        self.line(&format!("  Compressed:   {}", human_size(info.compressed_size)));
        self.line(&format!("  Uncompressed: {}", human_size(info.uncompressed_size)));
        let ratio = info.ratio.map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
        self.line(&format!("  Ratio:        {ratio}"));
        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_size(3 << 30), "3.0 GB");
        assert_eq!(human_size(2048 << 40), "2048.0 TB");
    }

    #[test]
    fn test_grouped_digits() {
        assert_eq!(grouped(7), "7");
        assert_eq!(grouped(100), "100");
        assert_eq!(grouped(4096), "4,096");
        assert_eq!(grouped(12_345_678), "12,345,678");
    }
}
