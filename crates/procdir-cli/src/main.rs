mod commands;
mod logging;
mod progress;

use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{ClientAction, Cli, Commands, SearchArgs, UploadArgs};
use dotenv::dotenv;
use procdir_core::placement::naming::expense_file_name;
use procdir_core::storage::Database;
use procdir_core::{
    AppConfig, Area, PlacementOutcome, ProcessArchive, ProcessFilter, ProcessRecord, ProcessRequest,
    Service, Transfer, UploadFile,
};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let guard = logging::init_logger();

    let config = match procdir_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Upload(upload)) => run_upload(&config, upload),
        Some(Commands::Search(search)) => run_search(&config, search),
        Some(Commands::Lookup { number }) => run_lookup(&config, &number),
        Some(Commands::Clients { action }) => run_clients(&config, action),
        Some(Commands::Open { path }) => ProcessArchive::new(&config)
            .open_in_file_explorer(&path)
            .map_err(Into::into),
        Some(Commands::CheckAccess { path }) => run_check_access(&path),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            println!("Area roots: {:?}", procdir_core::AreaRoots::from_config(&config));
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        // Flush the file appender; `exit` skips destructors.
        drop(guard);
        process::exit(1);
    }

    Ok(())
}

fn run_upload(config: &AppConfig, args: UploadArgs) -> anyhow::Result<()> {
    let request = ProcessRequest::parse(
        &args.client,
        &args.area,
        &args.service,
        &args.number,
        &args.year,
        &args.reference,
    )?;

    let db = Database::open(&config.clients_db)
        .with_context(|| format!("opening client store {}", config.clients_db))?;
    if !db.has_client(&request.client)? {
        warn!("Client {} is not registered", request.client);
    }

    let archive = ProcessArchive::new(config).with_reporter(Arc::new(CliReporter::new()));
    let process_dir = archive.validate_and_materialize(&request)?;
    let destination = if args.expense {
        archive.expense_folder(&process_dir)?
    } else {
        process_dir.clone()
    };

    let transfer = if args.move_files {
        Transfer::Relocate
    } else {
        Transfer::Copy
    };
    let record = request.record_at(&process_dir);
    let mut files = Vec::with_capacity(args.files.len());
    for source in &args.files {
        let original = match source.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => bail!("{} is not a file path", source.display()),
        };
        let display_name = match (&args.expense_name, &args.due_date) {
            (Some(expense), Some(due_date)) => {
                expense_file_name(&record, expense, due_date, &original)
            }
            _ => original,
        };
        files.push(UploadFile::new(source, display_name, transfer));
    }

    let report = archive.place_files(&destination, &files, args.policy.into());

    println!("{} {}", "Destination:".bold(), destination.display());
    for entry in &report.entries {
        match &entry.result {
            Ok(outcome @ PlacementOutcome::Skipped(_)) => {
                println!("  {} {}: {}", "-".yellow(), entry.file, outcome)
            }
            Ok(outcome) => println!("  {} {}: {}", "✓".green(), entry.file, outcome),
            Err(err) => println!("  {} {}: {}", "✗".red(), entry.file, err),
        }
    }
    info!(
        "{} stored, {} skipped, {} rejected",
        format!("{}", report.stored_count()).green(),
        format!("{}", report.skipped_count()).yellow(),
        format!("{}", report.rejected_count()).red(),
    );

    if args.open {
        archive.open_in_file_explorer(&destination)?;
    }
    Ok(())
}

fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let filter = ProcessFilter {
        client: args.client,
        area: args.area.as_deref().map(str::parse::<Area>).transpose()?,
        service: args.service.as_deref().map(str::parse::<Service>).transpose()?,
        year: args.year,
        reference_contains: args.reference,
        number_from: args.from,
        number_to: args.to,
    };

    let archive = ProcessArchive::new(config);
    let records = archive.query_processes(&filter)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_records(&records);
    }
    Ok(())
}

fn run_lookup(config: &AppConfig, number: &str) -> anyhow::Result<()> {
    let records = ProcessArchive::new(config).find_by_number(number)?;
    if records.is_empty() {
        println!("No process with number {}", number.trim());
    } else {
        print_records(&records);
    }
    Ok(())
}

fn run_clients(config: &AppConfig, action: ClientAction) -> anyhow::Result<()> {
    let db = Database::open(&config.clients_db)
        .with_context(|| format!("opening client store {}", config.clients_db))?;

    match action {
        ClientAction::List => {
            for name in db.list_clients()? {
                println!("{}", name);
            }
        }
        ClientAction::Add { name } => {
            let name = db.add_client(&name)?;
            println!("Client {} added", name.green());
        }
        ClientAction::Remove { name } => {
            let name = db.remove_client(&name)?;
            println!("Client {} removed", name.red());
        }
    }
    Ok(())
}

fn run_check_access(path: &Path) -> anyhow::Result<()> {
    procdir_core::platform::check_folder_access(path)?;
    println!("{} {} is readable and writable", "✓".green(), path.display());
    Ok(())
}

fn print_records(records: &[ProcessRecord]) {
    for record in records {
        println!(
            "{}  {:<10}  {:<10}  {}  {:<12}  {:<20}  {}",
            record.number.as_str().cyan(),
            record.area.display_name(),
            record.service.display_name(),
            record.year.as_str(),
            record.client,
            record.reference.as_str(),
            record.path.display().to_string().dimmed(),
        );
    }
    println!("{} process(es)", records.len());
}
