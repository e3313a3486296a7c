use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "facegate",
    about = "Face-signature enrollment, authentication and resource authorization",
    version
)]
pub struct Cli {
    /// Emit structured JSON to stdout instead of human-readable logs
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (may be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Enroll (or re-enroll) a principal's reference face
    Enroll(EnrollArgs),
    /// Authenticate a principal against its enrolled face
    Authenticate(AuthenticateArgs),
    /// Decide whether a recognized face may access a resource
    Authorize(AuthorizeArgs),
    /// Recognize a face against every enrolled principal
    Recognize(RecognizeArgs),
    /// Enroll the admin on first use, authenticate the admin afterwards
    Admin(AdminArgs),
    /// Report whether a principal has an enrolled face
    Status(StatusArgs),
}

#[derive(Debug, Clone, Args)]
pub struct EnrollArgs {
    /// Principal to enroll (defaults to the configured admin principal)
    #[arg(long)]
    pub principal: Option<String>,

    /// JSON response of the face service's encode endpoint
    #[arg(long)]
    pub encoding: PathBuf,

    /// Override the encoding store directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct AuthenticateArgs {
    /// Principal to authenticate (defaults to the configured admin principal)
    #[arg(long)]
    pub principal: Option<String>,

    /// JSON response of the face service's encode endpoint for the probe image
    #[arg(long)]
    pub encoding: PathBuf,

    /// Similarity that must be strictly exceeded, in (0, 1]
    #[arg(long, value_parser = parse_unit_interval)]
    pub threshold: Option<f64>,

    /// Override the encoding store directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct AuthorizeArgs {
    /// Identifier of the resource being requested (e.g. a user profile id)
    #[arg(long)]
    pub resource: String,

    /// JSON response of the face service's recognize endpoint
    #[arg(long)]
    pub recognition: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct RecognizeArgs {
    /// JSON response of the face service's encode endpoint for the probe image
    #[arg(long)]
    pub encoding: PathBuf,

    /// Maximum euclidean distance for a registry match
    #[arg(long, value_parser = parse_positive)]
    pub tolerance: Option<f64>,

    /// Also authorize the recognized identity against this resource id
    #[arg(long)]
    pub resource: Option<String>,

    /// Override the encoding store directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct AdminArgs {
    /// JSON response of the face service's encode endpoint for the captured image
    #[arg(long)]
    pub encoding: PathBuf,

    /// Similarity that must be strictly exceeded, in (0, 1]
    #[arg(long, value_parser = parse_unit_interval)]
    pub threshold: Option<f64>,

    /// Override the encoding store directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Principal to inspect (defaults to the configured admin principal)
    #[arg(long)]
    pub principal: Option<String>,

    /// Override the encoding store directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl From<bool> for OutputMode {
    fn from(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from(self.json)
    }
}

fn parse_unit_interval(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|err| format!("'{raw}' is not a number: {err}"))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("{value} is outside (0, 1]"))
    }
}

fn parse_positive(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|err| format!("'{raw}' is not a number: {err}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a positive number"))
    }
}
