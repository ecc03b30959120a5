use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "lolpub")]
#[command(about = "Publish markdown notes to omg.lol from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory holding the notes (defaults to LOLPUB_VAULT, then the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub vault: Option<PathBuf>,

    /// CLI profile name holding address, settings and token
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Post a status to status.lol
    Status {
        /// Status text (read from stdin or the editor when omitted)
        text: Vec<String>,
        /// Cross-post to Mastodon
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_mastodon")]
        mastodon: bool,
        /// Do not cross-post to Mastodon
        #[arg(long, action = ArgAction::SetTrue)]
        no_mastodon: bool,
    },
    /// Publish a note as a weblog entry
    Weblog {
        /// Note to publish
        file: PathBuf,
    },
    /// Publish or delete pastes
    Paste {
        #[command(subcommand)]
        command: PasteCommands,
    },
    /// Upload and manage some.pics pictures
    Pics {
        #[command(subcommand)]
        command: PicsCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Store or clear the omg.lol API token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum PasteCommands {
    /// Create or update the paste for a note
    Publish {
        /// Note to publish
        file: PathBuf,
        /// Paste title (prompted when the note has no paste yet)
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
        /// Make the paste listed
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "unlisted")]
        listed: bool,
        /// Make the paste unlisted
        #[arg(long, action = ArgAction::SetTrue)]
        unlisted: bool,
    },
    /// Delete the paste recorded in a note
    Delete {
        /// Note holding the paste metadata
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum PicsCommands {
    /// Upload one picture
    Upload {
        /// Image file inside the vault
        file: PathBuf,
        /// Picture description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Alt text (generated or the file name when omitted)
        #[arg(long, value_name = "TEXT")]
        alt: Option<String>,
        /// Comma separated tags (configured defaults when omitted)
        #[arg(long, value_name = "TAGS")]
        tags: Option<String>,
        /// Show the picture on the public gallery
        #[arg(long)]
        public: bool,
    },
    /// Upload the embedded images of a note and link them in place
    Embeds {
        /// Note with `![[image]]` embeds
        note: PathBuf,
        /// Only upload embeds on this line (numbered from 1)
        #[arg(long, value_name = "N")]
        line: Option<usize>,
    },
    /// Change the metadata of an uploaded picture
    Edit {
        /// Picture ID
        id: String,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New alt text
        #[arg(long, value_name = "TEXT")]
        alt: Option<String>,
        /// New comma separated tags
        #[arg(long, value_name = "TAGS")]
        tags: Option<String>,
        /// Show the picture on the public gallery
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "hidden")]
        public: bool,
        /// Hide the picture from the public gallery
        #[arg(long, action = ArgAction::SetTrue)]
        hidden: bool,
    },
    /// Show an uploaded picture
    Show {
        /// Picture ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// omg.lol address (without the @)
        #[arg(long, value_name = "NAME")]
        address: Option<String>,
        /// API base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print a profile as JSON
    Show,
    /// Set one profile value, e.g. `settings.pics.enabled true`
    Set {
        /// Dotted key inside the profile
        key: String,
        /// JSON value, or plain text for text fields
        value: String,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an API token in the keychain
    Login {
        /// omg.lol API token (read from stdin when omitted)
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
    },
    /// Show whether a token is available for the profile
    Status,
    /// Remove the stored token
    Logout,
}

/// Tri-state from a `--x` / `--no-x` flag pair.
pub const fn flag_pair(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}
