mod app;
mod catalog;
mod checkin;
mod cli;
mod completions;
mod config;
mod domain;
mod export;
mod imports;
mod ledger;
mod locks;
mod reconcile;
mod registry;
mod store;
mod ui;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization should work")
    );
}

fn run() -> Result<(), app::AppError> {
    use clap::Parser;
    use cli::{Commands, RoomsSubcommands};

    let cli = cli::Cli::parse();

    if let Commands::Completions(args) = &cli.command {
        return completions::run_completions_command(args.shell.as_deref());
    }

    let app = app::App::open(&cli.state_dir)?;

    match cli.command {
        Commands::Import(args) => {
            let summary = app.import(&args.file, args.format, args.dry_run, args.force)?;
            if args.json {
                print_json(&summary);
            } else if summary.dry_run {
                println!(
                    "dry run: {} item(s) would be imported from {} ({} duplicate row(s) skipped)",
                    summary.imported_count, summary.source_ref, summary.skipped_count
                );
            } else {
                println!(
                    "imported {} item(s) from {} ({} duplicate row(s) skipped); \
                     previous collection state cleared",
                    summary.imported_count, summary.source_ref, summary.skipped_count
                );
            }
        }
        Commands::Checkin(args) => {
            let receipt = app.check_in(args.room.as_deref(), &args.code)?;
            if args.json {
                print_json(&receipt);
            } else {
                println!(
                    "checked in {} ({}) at {}",
                    receipt.record.tag, receipt.record.name, receipt.location
                );
            }
        }
        Commands::Checkout(args) => {
            let receipt = app.check_out(args.room.as_deref(), &args.code)?;
            if args.json {
                print_json(&receipt);
            } else {
                println!(
                    "checked out {} ({}) from {}",
                    receipt.record.tag, receipt.record.name, receipt.location
                );
            }
        }
        Commands::Manual(args) => {
            let receipt = app.add_manual(&args.code, &args.name)?;
            if args.json {
                print_json(&receipt);
            } else {
                println!(
                    "added manual item {} ({}) at {}",
                    receipt.record.tag, receipt.record.name, receipt.location
                );
            }
        }
        Commands::View(args) => {
            let room = args.room.as_deref().unwrap_or_else(|| app.catch_all());
            let view = app.view(room)?;
            if args.json {
                print_json(&view);
            } else {
                ui::print_room_view(&view);
            }
        }
        Commands::Missing(args) => {
            let records = app.missing()?;
            if args.json {
                print_json(&records);
            } else {
                ui::print_missing(&records, app.catch_all());
            }
        }
        Commands::Status(args) => {
            let report = app.status()?;
            if args.json {
                print_json(&report);
            } else {
                ui::print_status(&report);
            }
        }
        Commands::Rooms(args) => match args.command {
            RoomsSubcommands::List(list_args) => {
                let rooms = app.rooms()?;
                if list_args.json {
                    print_json(&rooms);
                } else {
                    ui::print_rooms(&rooms, app.catch_all());
                }
            }
            RoomsSubcommands::Add(add_args) => {
                app.add_room(&add_args.name)?;
                println!("added location '{}'", add_args.name.trim());
            }
            RoomsSubcommands::Rename(rename_args) => {
                app.rename_room(&rename_args.from, &rename_args.to)?;
                println!(
                    "renamed location '{}' to '{}'",
                    rename_args.from.trim(),
                    rename_args.to.trim()
                );
            }
            RoomsSubcommands::Remove(remove_args) => {
                app.remove_room(&remove_args.name)?;
                println!("removed location '{}'", remove_args.name.trim());
            }
        },
        Commands::Export(args) => {
            let summary = app.export(args.out, args.format)?;
            if args.json {
                print_json(&summary);
            } else {
                println!(
                    "wrote {} row(s) to {}",
                    summary.row_count,
                    summary.path.display()
                );
            }
        }
        Commands::Reset(args) => {
            if !args.yes {
                return Err(app::AppError::InvalidArgument(
                    "reset wipes every location and the imported catalog; pass --yes to confirm"
                        .to_string(),
                ));
            }
            app.reset()?;
            println!("reset complete; only an empty '{}' remains", app.catch_all());
        }
        Commands::Completions(_) => {
            unreachable!("completions are handled before app initialization")
        }
    }

    Ok(())
}
