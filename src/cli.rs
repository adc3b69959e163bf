// CLI module - command-line argument parsing and handlers
//
// Provides subcommands for configuration and state management:
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR
// - config --path: Show config file path
// - history: Print recent notification history (or clear it)
// - report: Print derived metrics for the current plan

use crate::config::{Config, VERSION};
use crate::metrics::{self, TransactionFilter};
use crate::notifications::history::HistoryLog;
use crate::plan::PlanState;
use crate::storage::StateFiles;
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::Command;

/// Finpulse - budget alert engine
#[derive(Parser)]
#[command(name = "finpulse")]
#[command(version = VERSION)]
#[command(about = "Budget alert engine with email and desktop notifications", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Show or clear the notification history
    History {
        /// Delete all history entries
        #[arg(long)]
        clear: bool,

        /// Maximum number of entries to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Print derived metrics for the current plan
    Report {
        /// Number of months of cash flow to include
        #[arg(long, default_value_t = 3)]
        months: u32,
    },
}

/// Handle CLI commands. Returns true if a command was handled (exit after).
pub fn handle_cli() -> bool {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            show,
            reset,
            edit,
            path,
        }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else if reset {
                handle_config_reset();
            } else if edit {
                handle_config_edit();
            } else {
                // No flag provided, show help
                println!("Usage: finpulse config [--show|--reset|--edit|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                println!("  --path    Show config file path");
            }
            true
        }
        Some(Commands::History { clear, limit }) => {
            handle_history(clear, limit);
            true
        }
        Some(Commands::Report { months }) => {
            handle_report(months);
            true
        }
        None => false, // No subcommand, run the watcher
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("data_dir = {:?}", config.data_dir.display().to_string());
    println!("check_interval_secs = {}", config.check_interval_secs);
    println!();
    println!("[email]");
    println!("endpoint = {:?}", config.email.endpoint);
    println!("to = {:?}", config.email.to);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!(
        "file_dir = {:?}",
        config.logging.file_dir.display().to_string()
    );
    println!("file_prefix = {:?}", config.logging.file_prefix);

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() {
            eprintln!("Aborted.");
            return;
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return;
        }
    }

    // Create parent directory
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    // Write the default config (using Config's single source of truth)
    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    // Ensure config exists
    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    // Get editor from environment
    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            // Platform-specific fallback
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status();

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

fn open_state_files(config: &Config) -> StateFiles {
    match StateFiles::new(&config.data_dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error opening data directory: {}", e);
            std::process::exit(1);
        }
    }
}

fn handle_history(clear: bool, limit: usize) {
    let config = Config::from_env();
    let files = open_state_files(&config);

    let mut history = HistoryLog::load(files.history());

    if clear {
        history.clear();
        println!("Notification history cleared.");
        return;
    }

    if history.is_empty() {
        println!("No notifications recorded.");
        return;
    }

    for entry in history.get_all().iter().take(limit) {
        let status = if entry.sent { "sent" } else { "unsent" };
        let channels: Vec<&str> = entry
            .channels
            .iter()
            .map(|c| match c {
                crate::notifications::ChannelKind::Email => "email",
                crate::notifications::ChannelKind::Desktop => "desktop",
            })
            .collect();
        println!(
            "{}  [{}] {} - {} ({})",
            entry.created_at,
            status,
            entry.request.title,
            entry.request.message,
            if channels.is_empty() {
                "no channels".to_string()
            } else {
                channels.join(", ")
            }
        );
    }
}

fn handle_report(months: u32) {
    let config = Config::from_env();
    let files = open_state_files(&config);
    let plan = PlanState::load(&files.plan());
    let today = Utc::now().date_naive();

    println!("Monthly income:      ${:.2}", plan.monthly_income);
    println!(
        "Balance after bills: ${:.2}",
        metrics::total_balance(plan.monthly_income, &plan.bills)
    );

    let spending = metrics::top_spending(&plan.bills);
    if !spending.is_empty() {
        println!();
        println!("Top spending:");
        for entry in &spending {
            println!("  {:<20} ${:.2}", entry.category, entry.total);
        }
    }

    // Walk back (months - 1) whole months for the cash-flow window start.
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 1..months.max(1) {
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today);

    let series = metrics::monthly_cashflow(
        &plan.transactions,
        plan.monthly_income,
        &plan.split,
        start,
        today,
    );
    println!();
    println!("Cash flow:");
    for row in &series {
        println!(
            "  {}  in ${:.2}  out ${:.2}  net ${:.2}",
            row.month, row.income, row.expenses, row.net
        );
    }

    let highest = metrics::filter_transactions(&plan.transactions, TransactionFilter::Highest);
    if let Some(tx) = highest.first() {
        println!();
        println!(
            "Largest transaction: {} (${:.2} on {})",
            tx.description, tx.amount, tx.date
        );
    }
}
