use crate::application::analytics::Metric;
use crate::domain::model::{NotificationFilter, ProjectStatus};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rinth")]
#[command(about = "A terminal dashboard for Modrinth publishers.")]
#[command(version)]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Choose color theme (dark, light)
    #[arg(short = 'T', long, global = true)]
    pub theme: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show your profile
    Me,

    /// Edit your profile
    EditProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },

    /// Show a user's public profile
    User { id: String },

    /// List projects (yours unless --user is given)
    Projects {
        #[arg(long)]
        user: Option<String>,
        /// Sort by this metric
        #[arg(short, long, value_enum, default_value_t = MetricArg::Downloads)]
        metric: MetricArg,
    },

    /// Inspect and edit a project
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Edit or delete versions
    #[command(subcommand)]
    Version(VersionCommand),

    /// Manage team members
    #[command(subcommand)]
    Team(TeamCommand),

    /// Notifications
    #[command(subcommand)]
    Notifications(NotificationCommand),

    /// Look up a user by exact username
    Search { username: String },

    /// Downloads, followers and revenue overview
    Analytics {
        #[arg(short, long, value_enum, default_value_t = MetricArg::Downloads)]
        metric: MetricArg,
    },

    /// Payout balance and history
    Payouts,

    /// Store an access token
    Login { token: String },

    /// Forget the stored access token
    Logout,

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Generate or edit the configuration file
    Config {
        /// Generate config sample
        #[arg(long)]
        generate: bool,
        /// Edit configuration file
        #[arg(long)]
        edit: bool,
    },

    /// Show status
    Status,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Show project details
    Show { id: String },

    /// Update project metadata (empty link values clear the link)
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Read the long description from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long)]
        client_side: Option<String>,
        #[arg(long)]
        server_side: Option<String>,
        #[arg(long)]
        license_id: Option<String>,
        #[arg(long)]
        license_url: Option<String>,
        #[arg(long)]
        issues_url: Option<String>,
        #[arg(long)]
        source_url: Option<String>,
        #[arg(long)]
        wiki_url: Option<String>,
        #[arg(long)]
        discord_url: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Upload a new icon
    Icon { id: String, file: PathBuf },

    /// Remove the icon
    DeleteIcon { id: String },

    /// Upload a gallery image
    GalleryAdd {
        id: String,
        file: PathBuf,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Remove a gallery image by its URL
    GalleryDelete { id: String, url: String },

    /// List versions
    Versions { id: String },

    /// Dependencies of the newest version
    Deps { id: String },

    /// List team members
    Members { id: String },
}

#[derive(Subcommand)]
pub enum VersionCommand {
    /// Edit version metadata
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        version_type: Option<String>,
        #[arg(long)]
        changelog: Option<String>,
        /// Comma separated, e.g. 1.20.1,1.20.4
        #[arg(long, value_delimiter = ',')]
        game_versions: Option<Vec<String>>,
        /// Comma separated, e.g. fabric,quilt
        #[arg(long, value_delimiter = ',')]
        loaders: Option<Vec<String>>,
    },

    /// Delete a version
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum TeamCommand {
    /// Invite a user (by exact username) as contributor
    Add { team_id: String, username: String },

    /// Change a member's role
    Role {
        team_id: String,
        user_id: String,
        role: String,
    },

    /// Remove a member
    Remove { team_id: String, user_id: String },
}

#[derive(Subcommand)]
pub enum NotificationCommand {
    /// List notifications
    List {
        #[arg(short, long, value_enum, default_value_t = FilterArg::Unread)]
        status: FilterArg,
    },

    /// Mark one notification as read
    Read { id: String },

    /// Mark every unread notification as read
    ReadAll,

    /// Delete a notification
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show current settings
    Show,

    /// Change a setting: language (en, ru), theme (dark, light), accent_color (#RRGGBB)
    Set { key: String, value: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Downloads,
    Followers,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Downloads => Metric::Downloads,
            MetricArg::Followers => Metric::Followers,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    Read,
    Unread,
    All,
}

impl From<FilterArg> for NotificationFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::Read => NotificationFilter::Read,
            FilterArg::Unread => NotificationFilter::Unread,
            FilterArg::All => NotificationFilter::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Draft,
    Archived,
    Unlisted,
}

impl From<StatusArg> for ProjectStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Draft => ProjectStatus::Draft,
            StatusArg::Archived => ProjectStatus::Archived,
            StatusArg::Unlisted => ProjectStatus::Unlisted,
        }
    }
}
