//! Command-line interface: one-shot generation and an interactive session

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::app::command::{Command, DownloadTarget, HELP};
use crate::app::{Controller, Quality};
use crate::backend::GeminiBackend;
use crate::config::Settings;
use crate::error::Result;
use crate::generation::GenerationClient;
use crate::response::FileHandler;
use crate::view;

#[derive(Debug, Parser)]
#[command(name = "image-creator", version, about = "Create character image variants with Gemini")]
pub struct Cli {
    /// Configuration file (defaults to config/default.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate four variants from the given images and save them
    Generate(GenerateArgs),
    /// Edit uploads and settings interactively
    Interactive(InteractiveArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Reference image (PNG, JPEG or WebP); repeat for up to five
    #[arg(long = "image", short = 'i', required = true)]
    pub images: Vec<PathBuf>,

    /// Character description
    #[arg(long, short = 'c', default_value = "")]
    pub character: String,

    /// Background and setting
    #[arg(long, short = 'b', default_value = "")]
    pub background: String,

    /// Ask for a transparent background
    #[arg(long)]
    pub remove_background: bool,

    /// Output quality: Standard, 2K or 4K
    #[arg(long, default_value = "Standard")]
    pub quality: Quality,

    /// Directory for saved images (overrides output.dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InteractiveArgs {
    /// Directory for saved images (overrides output.dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Build a controller wired to the configured Gemini backend
pub fn build_controller(settings: &Settings, out_dir: Option<PathBuf>) -> Result<Controller> {
    let backend = GeminiBackend::new(&settings.api)?;
    let client = GenerationClient::new(Arc::new(backend));
    let dir = out_dir.unwrap_or_else(|| PathBuf::from(&settings.output.dir));
    let files = FileHandler::new(dir, settings.output.file_prefix.clone());
    Ok(Controller::new(client, files))
}

/// Run the selected subcommand
pub async fn run(cli: Cli, settings: Settings) -> Result<()> {
    match cli.command {
        CliCommand::Generate(args) => run_generate(args, &settings).await,
        CliCommand::Interactive(args) => run_interactive(args, &settings).await,
    }
}

async fn run_generate(args: GenerateArgs, settings: &Settings) -> Result<()> {
    let mut controller = build_controller(settings, args.out_dir)?;
    let mut out = std::io::stdout();

    controller.set_character_description(args.character);
    controller.set_background_setting(args.background);
    controller.set_remove_background(args.remove_background);
    controller.set_quality(args.quality);

    controller.add_files(args.images).await?;
    if let Some(warning) = controller.error_message() {
        eprintln!("Warning: {}", warning);
    }

    let outcome = generate_with_progress(&mut controller, &mut out).await;
    writeln!(out, "{}", view::render(&controller))?;
    outcome?;

    for path in controller.download_all().await? {
        writeln!(out, "Saved {}", path.display())?;
    }
    Ok(())
}

async fn run_interactive(args: InteractiveArgs, settings: &Settings) -> Result<()> {
    let mut controller = build_controller(settings, args.out_dir)?;
    let mut out = std::io::stdout();
    info!("Interactive session started");

    writeln!(out, "{}", view::render(&controller))?;
    writeln!(out, "Type 'help' for commands.")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(&mut controller, command, &mut out).await {
            error!(error = %e, "Command failed");
            writeln!(out, "{}", e)?;
        }
    }

    info!("Interactive session ended");
    Ok(())
}

/// Run a generation, drawing the panel once while the calls are in flight
async fn generate_with_progress<W: Write>(
    controller: &mut Controller,
    out: &mut W,
) -> Result<()> {
    let request = controller.begin_generation()?;
    let shown = writeln!(out, "{}", view::render(controller)).and_then(|_| out.flush());

    // The phase must leave Generating even if the panel could not be written.
    let outcome = controller.client().generate(request).await;
    controller.complete_generation(outcome)?;
    shown?;
    Ok(())
}

/// Apply one command and print the outcome
async fn execute<W: Write>(
    controller: &mut Controller,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Add(paths) => {
            // Failures are already shown in the panel's error banner.
            let _ = controller.add_files(paths).await;
        }
        Command::Remove(index) => {
            if controller.remove_image(index).is_none() {
                writeln!(out, "No upload #{}", index + 1)?;
            }
        }
        Command::Character(text) => controller.set_character_description(text),
        Command::Background(text) => controller.set_background_setting(text),
        Command::RemoveBackground(Some(enabled)) => controller.set_remove_background(enabled),
        Command::RemoveBackground(None) => {
            controller.toggle_remove_background();
        }
        Command::Quality(quality) => controller.set_quality(quality),
        Command::Generate => {
            // Same as Add: the outcome is in the panel.
            let _ = generate_with_progress(controller, &mut *out).await;
        }
        Command::Download(DownloadTarget::One(index)) => {
            let path = controller.download(index).await?;
            writeln!(out, "Saved {}", path.display())?;
            return Ok(());
        }
        Command::Download(DownloadTarget::All) => {
            for path in controller.download_all().await? {
                writeln!(out, "Saved {}", path.display())?;
            }
            return Ok(());
        }
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            return Ok(());
        }
        Command::Show | Command::Quit => {}
    }

    writeln!(out, "{}", view::render(controller))?;
    Ok(())
}
