// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use dual_camera::app::AppModel;
use dual_camera::constants::{self, app_info, ui};
use dual_camera::i18n;
use std::path::PathBuf;
use std::time::Duration;

mod cli;

#[derive(Parser)]
#[command(name = "dual-camera")]
#[command(about = "Front and back camera side by side, one button for both photos")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras and the side each one is used for
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Take a front and back photo without opening a window
    Photo {
        /// Directory to save into (default: ~/Pictures/dual-camera)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Start the back camera as well (only the front one starts otherwise)
        #[arg(short, long)]
        both: bool,

        /// Time given to the sensors before capturing, in milliseconds
        #[arg(short, long, default_value_t = constants::CLI_WARMUP.as_millis() as u64)]
        warmup_ms: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=dual_camera=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    tracing::info!(
        version = app_info::version(),
        environment = app_info::runtime_environment(),
        "Starting dual-camera"
    );

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List { json }) => cli::list_cameras(json),
        Some(Commands::Photo {
            output_dir,
            both,
            warmup_ms,
        }) => Ok(cli::take_photo(
            output_dir,
            both,
            Duration::from_millis(warmup_ms),
        )?),
        None => run_gui(),
    }
}

fn run_gui() -> Result<(), Box<dyn std::error::Error>> {
    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Session starts, encoding and file writes run here, off the UI executor
    let runtime = tokio::runtime::Runtime::new()?;

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(ui::MIN_WINDOW_WIDTH)
            .min_height(ui::MIN_WINDOW_HEIGHT),
    );

    cosmic::app::run::<AppModel>(settings, runtime.handle().clone())?;

    Ok(())
}
