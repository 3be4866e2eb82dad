//! Colored terminal output for the ragline CLI.

use owo_colors::OwoColorize;

/// Longest chunk preview printed by [`Output::hit`], in characters.
const PREVIEW_CHARS: usize = 160;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {} {}",
                "ragline".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
            println!("   {}\n", "Retrieval-augmented answers over your corpus".bright_white());
        } else {
            println!(
                "\n   ragline v{}\n   Retrieval-augmented answers over your corpus\n",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Printed to stderr.
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a step message (for multi-step operations)
    pub fn step(&self, step_num: u32, total: u32, message: &str) {
        if self.colored {
            println!(
                "  {} {}",
                format!("[{}/{}]", step_num, total).dimmed(),
                message.bright_white()
            );
        } else {
            println!("  [{}/{}] {}", step_num, total, message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// One ranked retrieval hit: rank, chunk id, distance and a text preview.
    pub fn hit(&self, rank: usize, id: usize, distance: f32, text: &str) {
        let preview = preview(text);
        if self.colored {
            println!(
                "  {} {} {}",
                format!("#{}", rank).bright_cyan().bold(),
                format!("chunk {}", id).dimmed(),
                format!("d={:.4}", distance).yellow()
            );
            println!("     {}", preview);
        } else {
            println!("  #{} chunk {} d={:.4}", rank, id, distance);
            println!("     {}", preview);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print text verbatim (used for TOML dumps)
    pub fn raw(&self, text: &str) {
        println!("{}", text);
    }
}

/// First line of `text`, cut to [`PREVIEW_CHARS`] characters.
fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let mut preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if preview.len() < text.len() {
        preview.push('…');
    }
    preview
}
