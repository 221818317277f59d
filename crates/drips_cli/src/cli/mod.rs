use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use drips_core::config::ConfigOverrides;
use drips_core::input::parse_daily_count;
use drips_core::model::{Direction, SortOption};

#[derive(Parser, Debug)]
#[command(name = "drips", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q error only)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task to the bank
    ///
    /// Example: drips add "Stretch for 5 minutes"
    Add { title: Option<String> },
    /// Remove a task from the bank and from today's list
    ///
    /// Example: drips delete 3
    Delete { id: String },
    /// Mark a task done for today, or undo it
    ///
    /// Example: drips toggle 3
    #[command(visible_alias = "done")]
    Toggle { id: String },
    /// Draw a new random list for today from the bank
    ///
    /// Example: drips generate 4
    Generate {
        /// Number of tasks to draw (defaults to the configured daily count)
        #[arg(allow_negative_numbers = true)]
        count: Option<i64>,
    },
    /// Move a task up or down in today's list
    ///
    /// Example: drips move 3 up
    Move {
        id: String,
        #[arg(value_enum)]
        direction: DirectionArg,
    },
    /// Set or clear the time of day for a task
    ///
    /// Example: drips schedule 3 14:30
    /// Example: drips schedule 3 --clear
    Schedule {
        id: String,
        #[arg(required_unless_present = "clear")]
        time: Option<String>,
        #[arg(long, conflicts_with = "time")]
        clear: bool,
    },
    /// Show the task bank
    ///
    /// Example: drips bank --sort most-used
    Bank {
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },
    /// Show today's list
    Today,
    /// Show completed tasks grouped by day
    Logbook,
    /// Render the condensed view used when embedded in another page
    ///
    /// Example: drips embed --report-height
    Embed {
        /// Emit a resize message with the rendered height on stderr
        #[arg(long)]
        report_height: bool,
    },
    /// Print the snippet a host page uses to embed the widget
    ///
    /// Example: drips embed-code https://drips.example.com
    EmbedCode { url: String },
    /// Remove the starter tasks from the bank and today's list
    ClearDefaults,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Up => Direction::Up,
            DirectionArg::Down => Direction::Down,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    MostUsed,
    RecentlyUsed,
    Alphabetical,
}

impl From<SortArg> for SortOption {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::MostUsed => SortOption::MostUsed,
            SortArg::RecentlyUsed => SortOption::RecentlyUsed,
            SortArg::Alphabetical => SortOption::Alphabetical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DailyCount,
    Sort,
    SeedStarterTasks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "daily_count" | "count" => ConfigOverrideTarget::DailyCount,
        "sort" => ConfigOverrideTarget::Sort,
        "seed_starter_tasks" | "seed" => ConfigOverrideTarget::SeedStarterTasks,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DailyCount => {
                let count = parse_daily_count(&parsed.value).map_err(|err| err.message().to_string())?;
                overrides.daily_count = Some(count);
            }
            ConfigOverrideTarget::Sort => overrides.sort = Some(parsed.value.parse()?),
            ConfigOverrideTarget::SeedStarterTasks => {
                let seed = match parsed.value.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" | "on" => true,
                    "false" | "no" | "0" | "off" => false,
                    _ => return Err("seed_starter_tasks must be true or false".to_string()),
                };
                overrides.seed_starter_tasks = Some(seed);
            }
        }
    }
    Ok(overrides)
}

/// Flags that only take effect when the process starts. An interactive
/// session has already installed logging and opened the store.
pub fn reject_startup_flags(cli: &Cli) -> Result<(), String> {
    if cli.verbose > 0 || cli.quiet > 0 {
        return Err("-v/-q only apply to single-command runs".to_string());
    }
    if collect_config_overrides(&cli.config_override)?
        .seed_starter_tasks
        .is_some()
    {
        return Err("seed_starter_tasks only applies to single-command runs".to_string());
    }
    Ok(())
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
