use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::export::ExportFormat;
use crate::imports::SourceFormat;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

pub fn styled_command() -> clap::Command {
    Cli::command()
}

#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(bin_name = "tally")]
#[command(version)]
#[command(about = "A local-first inventory check-in and reconciliation tool")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 's',
        long,
        env = "TALLY_STATE_DIR",
        default_value = ".tally",
        help = "Directory holding the state database, config, and lock files."
    )]
    pub state_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Import a master asset list, wiping all previous collection state.")]
    Import(ImportArgs),
    #[command(about = "Check one asset in at a location.", alias = "in")]
    Checkin(CheckinArgs),
    #[command(about = "Remove one stored entry from a location.", alias = "out")]
    Checkout(CheckinArgs),
    #[command(about = "Add a catalog-external item to the catch-all by hand.")]
    Manual(ManualArgs),
    #[command(about = "Show a location's reconciled item list.")]
    View(ViewArgs),
    #[command(about = "List catalog entries confirmed nowhere.")]
    Missing(JsonArgs),
    #[command(about = "Show per-location collection progress.")]
    Status(JsonArgs),
    #[command(about = "Manage locations.")]
    Rooms(RoomsArgs),
    #[command(about = "Write the inventory report.")]
    Export(ExportArgs),
    #[command(about = "Factory reset: wipe everything, keep an empty catch-all.")]
    Reset(ResetArgs),
    #[command(about = "Generate shell completions.")]
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
#[command(about = "Import a master asset list.")]
pub struct ImportArgs {
    #[arg(help = "Path to the source file (.csv, .jsonl).")]
    pub file: PathBuf,

    #[arg(
        short = 'f',
        long,
        help = "Source format (csv, jsonl). Inferred from the extension if omitted."
    )]
    pub format: Option<SourceFormat>,

    #[arg(long, help = "Parse and report without writing anything.")]
    pub dry_run: bool,

    #[arg(long, help = "Re-import even if the file matches the previous import.")]
    pub force: bool,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Check an asset in or out.")]
pub struct CheckinArgs {
    #[arg(help = "Asset tag code.")]
    pub code: String,

    #[arg(
        short = 'r',
        long,
        help = "Target location (defaults to the catch-all)."
    )]
    pub room: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Add a manual extra item.")]
pub struct ManualArgs {
    #[arg(help = "Asset tag code.")]
    pub code: String,

    #[arg(help = "Display name for the item.")]
    pub name: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Show one location.")]
pub struct ViewArgs {
    #[arg(help = "Location name (defaults to the catch-all).")]
    pub room: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct JsonArgs {
    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Location commands.")]
pub struct RoomsArgs {
    #[command(subcommand)]
    pub command: RoomsSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum RoomsSubcommands {
    #[command(about = "List locations, catch-all first.", alias = "ls")]
    List(JsonArgs),
    #[command(about = "Register a new location.")]
    Add(RoomNameArgs),
    #[command(about = "Rename a location, moving its ledger.")]
    Rename(RoomRenameArgs),
    #[command(about = "Delete a location and its ledger.", alias = "rm")]
    Remove(RoomNameArgs),
}

#[derive(Debug, Args)]
#[command(about = "Location name.")]
pub struct RoomNameArgs {
    #[arg(help = "Location name.")]
    pub name: String,
}

#[derive(Debug, Args)]
#[command(about = "Rename a location.")]
pub struct RoomRenameArgs {
    #[arg(help = "Current location name.")]
    pub from: String,

    #[arg(help = "New location name.")]
    pub to: String,
}

#[derive(Debug, Args)]
#[command(about = "Write the inventory report.")]
pub struct ExportArgs {
    #[arg(
        short = 'o',
        long,
        help = "Output path (defaults to a timestamped file name)."
    )]
    pub out: Option<PathBuf>,

    #[arg(short = 'f', long, default_value = "csv", help = "Report format (csv, txt).")]
    pub format: ExportFormat,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Factory reset.")]
pub struct ResetArgs {
    #[arg(short = 'y', long, help = "Skip the confirmation requirement.")]
    pub yes: bool,
}

#[derive(Debug, Args)]
#[command(about = "Generate shell completions.")]
pub struct CompletionsArgs {
    #[arg(help = "Shell name (bash, zsh, fish). Auto-detected if omitted.")]
    pub shell: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn parses_checkin_with_room_and_alias() {
        let cli = Cli::parse_from(["tally", "in", "A1", "--room", "Lab 2"]);
        match cli.command {
            super::Commands::Checkin(args) => {
                assert_eq!(args.code, "A1");
                assert_eq!(args.room.as_deref(), Some("Lab 2"));
            }
            other => panic!("expected checkin, got {other:?}"),
        }
    }

    #[test]
    fn import_format_flag_is_validated() {
        let cli = Cli::parse_from(["tally", "import", "assets.csv", "--format", "jsonl"]);
        match cli.command {
            super::Commands::Import(args) => {
                assert_eq!(args.format, Some(crate::imports::SourceFormat::Jsonl));
            }
            other => panic!("expected import, got {other:?}"),
        }

        let err = Cli::try_parse_from(["tally", "import", "assets.csv", "--format", "xlsx"]);
        assert!(err.is_err());
    }

    #[test]
    fn state_dir_defaults_and_overrides() {
        let cli = Cli::parse_from(["tally", "status"]);
        assert_eq!(cli.state_dir.to_str(), Some(".tally"));

        let cli = Cli::parse_from(["tally", "--state-dir", "/tmp/x", "status"]);
        assert_eq!(cli.state_dir.to_str(), Some("/tmp/x"));
    }

    #[test]
    fn export_format_defaults_to_csv() {
        let cli = Cli::parse_from(["tally", "export"]);
        match cli.command {
            super::Commands::Export(args) => {
                assert_eq!(args.format, crate::export::ExportFormat::Csv);
                assert!(args.out.is_none());
            }
            other => panic!("expected export, got {other:?}"),
        }
    }
}
