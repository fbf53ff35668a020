use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "keyshelf")]
#[command(version, about = "Keyshelf - manage and check your API keys")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path for the local store (defaults to ~/.keyshelf/keyshelf.db)
    #[arg(long, global = true, env = "KEYSHELF_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// API key management
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Sign in to the hosted store
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// List stored keys, newest first, with values masked
    List {
        /// Show the plain value of this key (id or id prefix); repeatable
        #[arg(long, value_name = "ID")]
        reveal: Vec<String>,

        /// Show every value unmasked
        #[arg(long, conflicts_with = "reveal")]
        reveal_all: bool,
    },

    /// Store a new key
    Add {
        name: String,
        value: String,

        /// Key classification (defaults to "dev")
        #[arg(long = "type", value_name = "TYPE")]
        key_type: Option<String>,
    },

    /// Rename a key or replace its value
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        value: Option<String>,
    },

    /// Show a single key
    Show {
        id: String,

        /// Print the value unmasked
        #[arg(long)]
        reveal: bool,
    },

    /// Delete a key
    Remove { id: String },

    /// Check whether a key is stored
    Check { key: String },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password
    Login {
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "KEYSHELF_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account with email and password
    Signup {
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "KEYSHELF_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Print the URL that starts an OAuth sign-in
    Oauth {
        #[arg(default_value = "google")]
        provider: String,

        /// Where the provider redirects after sign-in
        #[arg(long)]
        redirect_to: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,
}
