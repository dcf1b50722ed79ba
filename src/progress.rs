//! Progress display module
//!
//! Styled status lines, progress indicators and the end-of-run summary.

use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Print the application banner
pub fn print_banner() {
    let banner = r#"
╔══════════════════════════════════════════════════════════════════════════════╗
║                                                                              ║
║                              AOSP-WORDLIST v1.0.0                            ║
║                                                                              ║
║          Frequency dumps -> AOSP keyboard combined wordlists                 ║
║                                                                              ║
╚══════════════════════════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner.green());
}

/// Marker shown in front of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Info,
    Success,
    Warning,
    Error,
    Bullet,
}

impl Status {
    fn marker(self) -> ColoredString {
        match self {
            Self::Info => "ℹ".cyan(),
            Self::Success => "✔".green(),
            Self::Warning => "⚠".yellow(),
            Self::Error => "✖".red(),
            Self::Bullet => "•".green(),
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            Self::Success => text.green(),
            Self::Warning => text.yellow(),
            Self::Error => text.red(),
            Self::Info | Self::Bullet => text.normal(),
        }
    }

    fn render(self, text: &str) -> String {
        format!("  {} {}", self.marker(), self.paint(text))
    }
}

/// Print a stage header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

pub fn print_info(text: &str) {
    println!("{}", Status::Info.render(text));
}

pub fn print_success(text: &str) {
    println!("{}", Status::Success.render(text));
}

pub fn print_warning(text: &str) {
    println!("{}", Status::Warning.render(text));
}

/// Errors go to stderr
pub fn print_error(text: &str) {
    eprintln!("{}", Status::Error.render(text));
}

pub fn print_bullet(text: &str) {
    println!("{}", Status::Bullet.render(text));
}

const TICK: Duration = Duration::from_millis(100);

fn ticking(pb: ProgressBar, style: ProgressStyle, msg: &str) -> ProgressBar {
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(TICK);
    pb
}

/// Progress bar counting words written
pub fn create_progress_bar(words: u64, msg: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.green/dim}] {human_pos}/{human_len} words {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▓░");

    ticking(ProgressBar::new(words), style, msg)
}

/// Spinner for the parse stage, whose line count is unknown up front
pub fn create_spinner(msg: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

    ticking(ProgressBar::new_spinner(), style, msg)
}

/// Counters for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub input_bytes: u64,
    pub total_lines: u64,
    pub skipped_lines: u64,
    pub malformed_lines: u64,
    pub distinct_words: u64,
    pub distinct_bigrams: u64,
    pub excluded_words: u64,
    pub rejected_words: u64,
    pub limited_words: u64,
    pub limited_bigrams: u64,
    pub words_written: u64,
    pub bigrams_written: u64,
    pub start_time: Instant,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self {
            input_bytes: 0,
            total_lines: 0,
            skipped_lines: 0,
            malformed_lines: 0,
            distinct_words: 0,
            distinct_bigrams: 0,
            excluded_words: 0,
            rejected_words: 0,
            limited_words: 0,
            limited_bigrams: 0,
            words_written: 0,
            bigrams_written: 0,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn lines_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_lines as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print final statistics
    pub fn print_summary(&self) {
        println!();
        println!("{}", "═".repeat(60).green());
        println!("{}", "                    WORDLIST COMPLETE".green().bold());
        println!("{}", "═".repeat(60).green());
        println!();

        println!("  {} {}", "Input size:     ".green(), ByteSize(self.input_bytes));
        println!("  {} {}", "Total lines:    ".green(), format_number(self.total_lines));
        println!("  {} {}", "Skipped lines:  ".green(), format_number(self.skipped_lines));
        if self.malformed_lines > 0 {
            println!(
                "  {} {}",
                "Malformed lines:".yellow(),
                format_number(self.malformed_lines).yellow()
            );
        }
        println!();

        println!("  {} {}", "Distinct words: ".green(), format_number(self.distinct_words));
        if self.distinct_bigrams > 0 {
            println!("  {} {}", "Distinct pairs: ".green(), format_number(self.distinct_bigrams));
        }
        println!("  {} {}", "Excluded:       ".yellow(), format_number(self.excluded_words));
        if self.rejected_words > 0 {
            println!("  {} {}", "Misspelled:     ".yellow(), format_number(self.rejected_words));
        }
        println!("  {} {}", "Over limit:     ".yellow(), format_number(self.limited_words));
        if self.limited_bigrams > 0 {
            println!("  {} {}", "Pairs dropped:  ".yellow(), format_number(self.limited_bigrams));
        }
        println!(
            "  {} {}",
            "Words written:  ".green().bold(),
            format_number(self.words_written).green().bold()
        );
        if self.bigrams_written > 0 {
            println!("  {} {}", "Bigrams written:".green(), format_number(self.bigrams_written));
        }

        println!();
        println!("  {} {}", "Duration:       ".green(), format_duration(self.elapsed()));
        println!("  {} {:.2} lines/sec", "Throughput:     ".green(), self.lines_per_second());
        println!();
        println!("{}", "═".repeat(60).green());
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Group digits in threes: `1234567` becomes `1,234,567`
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;

    let mut groups: Vec<&str> = Vec::with_capacity(digits.len() / 3 + 1);
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );
    groups.join(",")
}

/// Run time for the summary; sub-second runs are shown in milliseconds
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        0 => format!("{}ms", duration.as_millis()),
        1..=59 => format!("{:.1}s", duration.as_secs_f64()),
        60..=3599 => format!("{}m {}s", secs / 60, secs % 60),
        _ => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(123456), "123,456");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m");
    }

    #[test]
    fn test_status_lines_carry_text() {
        colored::control::set_override(false);
        assert_eq!(Status::Info.render("Encoding: UTF-8"), "  ℹ Encoding: UTF-8");
        assert_eq!(Status::Warning.render("Skipped 2 malformed lines"), "  ⚠ Skipped 2 malformed lines");
        colored::control::unset_override();
    }

    #[test]
    fn test_stats_start_empty() {
        let stats = PipelineStats::default();

        assert_eq!(stats.total_lines, 0);
        assert_eq!(stats.words_written, 0);
        assert!(stats.lines_per_second() >= 0.0);
    }
}
