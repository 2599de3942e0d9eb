//! Command-line interface for the court fetcher.
//!
//! Running without a subcommand starts the web server.

mod commands;

use clap::{Parser, Subcommand};

/// Court Data Fetcher
/// Searches the court's case status page and keeps an audit trail of every search
#[derive(Parser)]
#[command(name = "court-fetcher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web dashboard and JSON API
    #[command(alias = "web")]
    Serve,

    /// Create or migrate the database
    #[command(alias = "initdb")]
    InitDb {
        /// Insert sample cases when the database is empty
        #[arg(long)]
        sample: bool,
    },

    /// Show recent searches
    #[command(alias = "h")]
    History {
        /// Number of entries to show
        #[arg(long, short = 'n', default_value = "10")]
        limit: u64,
    },

    /// Search the court site and record the result
    #[command(alias = "s")]
    Search {
        /// Case type as listed on the court site, e.g. "Civil Appeal"
        case_type: String,
        /// Case number (digits only)
        case_number: String,
        /// Filing year
        filing_year: String,
    },

    /// Load the live search form and report whether a numeric CAPTCHA is readable
    CheckCaptcha,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
