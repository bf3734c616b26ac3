use std::{borrow::Cow, fmt, io::IsTerminal, path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use logforth::filter::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "Campus", version, long_about = concat!("Campus command line client v", env!("CARGO_PKG_VERSION")))]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short, env = "CAMPUS_CONFIG_PATH", default_value = "./campus.toml")]
    pub config: PathBuf,
    /// Login name. Overrides session.username from the configuration.
    #[arg(long, short, env = "CAMPUS_USERNAME")]
    pub username: Option<String>,
    /// Password. Overrides session.password from the configuration.
    #[arg(long, short, env = "CAMPUS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Set the logging level.
    #[arg(long = "log", env = "CAMPUS_LOG", default_value_t = LogLevel::default())]
    pub log_level: LogLevel,
    /// Set the style of log output
    #[arg(long, env = "CAMPUS_LOG_STYLE", default_value_t = LogStyle::default())]
    pub log_style: LogStyle,
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn config(&self) -> anyhow::Result<Config> {
        let config = if self.config.exists() {
            Config::load(&self.config)?
        } else {
            Config::default()
        };

        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Browse and manage courses
    #[command(subcommand)]
    Courses(CourseCommand),
    /// Browse tasks and submissions
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Look up user profiles
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum CourseCommand {
    /// List every course
    List,
    /// Show one course
    Show { code: String },
    /// List the students of a course
    Students { code: String },
    /// List the instructors of a course
    Instructors { code: String },
    /// Enroll a user by email
    AddUser { code: String, email: String },
    /// Create a course from a JSON definition
    Create {
        /// JSON file with the course fields, in the API's camelCase naming
        definition: PathBuf,
        /// Cover banner image
        #[arg(long)]
        cover: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum TaskCommand {
    /// List the tasks of a course
    List { course: String },
    /// Show one task
    Show { course: String, id: String },
    /// List every submission for a task
    Submissions { course: String, id: String },
    /// Hand in files for a task
    Submit {
        course: String,
        id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum UserCommand {
    /// Show a user's profile
    Show { user_name: String },
    /// Search users by name or email
    Search { query: String },
    /// Replace your profile photo
    UploadPhoto { path: PathBuf },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogStyle {
    /// Colorized text, used as the default with TTY output
    Color,
    /// Standard text, used as the default with non-TTY output
    Text,
    /// JSON objects
    Json,
}

impl Default for LogStyle {
    fn default() -> Self {
        if std::io::stderr().is_terminal() {
            LogStyle::Color
        } else {
            LogStyle::Text
        }
    }
}

impl AsRef<str> for LogStyle {
    fn as_ref(&self) -> &str {
        match self {
            LogStyle::Color => "color",
            LogStyle::Text => "text",
            LogStyle::Json => "json",
        }
    }
}

impl fmt::Display for LogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum LogLevel {
    /// Disable logging
    Off,
    /// Only log errors
    Error,
    /// Log errors, and warnings
    Warn,
    /// Log errors, warnings, and info messages
    #[default]
    Info,
    /// Log errors, warnings, info, and debug messages
    Debug,
    /// Log errors, warnings, info, debug, and trace messages
    Trace,
}

impl LogLevel {
    pub fn env_filter(self) -> EnvFilter {
        let filter_str = match self {
            LogLevel::Off => Cow::Borrowed("off"),
            // Dependencies stay at 'warn', the workspace crates follow the selected level.
            level => Cow::Owned(format!(
                "warn,campus={level},gateway={level},services={level},config={level}"
            )),
        };

        EnvFilter::from_str(&filter_str).expect("These all are valid env filters.")
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
