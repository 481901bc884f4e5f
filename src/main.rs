//! `sku-batch`: inventory intake from the command line.
//!
//! Assigns SKUs, keeps the batch counters and writes batch extracts under
//! one data directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use sku_batch_rs::{
    config::InventoryConfigBuilder,
    core::{
        batch::{DEFAULT_BATCH_SIZE, DEFAULT_LOCATION},
        grade::Grade,
        intake::Intake,
        product::NewProduct,
    },
    export::ExportOutcome,
};

/// Resale inventory intake tool.
#[derive(Parser, Debug)]
#[command(name = "sku-batch", version, about = "SKU and batch tracking for resale inventory")]
struct Cli {
    /// Directory holding the batch state, the inventory and the extracts.
    #[arg(long, global = true, env = "SKU_BATCH_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Items per batch, used when no batch state exists yet.
    #[arg(long, global = true, env = "SKU_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: u32,

    /// Location code, used when no batch state exists yet.
    #[arg(long, global = true, env = "SKU_BATCH_LOCATION", default_value = DEFAULT_LOCATION)]
    location: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the current batch, location and last SKU.
    Status,

    /// Add a product and print its SKU.
    Add {
        /// Condition grade: LN, VG, G, AC or SA.
        grade: Grade,
        /// Bin or shelf tag appended to the SKU.
        #[arg(long, short = 't')]
        tag: Option<String>,
        #[arg(long)]
        upc: Option<String>,
        #[arg(long)]
        manufacturer: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Auction manifest the item came from.
        #[arg(long)]
        manifest_id: Option<String>,
        #[arg(long)]
        pallet_id: Option<String>,
        #[arg(long)]
        unit_id: Option<String>,
        #[arg(long)]
        pid_uid: Option<String>,
    },

    /// List inventory records.
    List {
        /// Only records of this batch.
        #[arg(long)]
        batch: Option<u32>,
    },

    /// Delete every record with this SKU.
    Delete { sku: String },

    /// Delete the most recently added record.
    Undo,

    /// Export the current batch and start the next one.
    #[command(name = "close-batch")]
    CloseBatch,

    /// Export one batch to its extract file.
    Export { batch: u32 },

    /// Reset the counters to batch 1, item 1.
    Reset,

    /// Change the location used for new SKUs.
    Location { location: String },
}

fn print_export(batch_number: u32, outcome: &ExportOutcome) {
    match outcome {
        ExportOutcome::Written { path, count } => {
            println!("Batch {} exported: {} record(s) to {}", batch_number, count, path.display())
        }
        ExportOutcome::Empty => println!("Batch {} has no records, nothing exported", batch_number),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = InventoryConfigBuilder::new()
        .data_dir(&cli.data_dir)
        .batch_size(cli.batch_size)
        .location(cli.location)
        .build()?;
    info!("Using data directory {}", config.data_dir().display());

    let mut intake = Intake::open(&config)?;

    match cli.command {
        Commands::Status => {
            let state = intake.state();
            println!("Batch:     {}", state.current_batch_number);
            println!("Next item: {} of {}", state.current_item_number, state.batch_size);
            println!("Next id:   {}", intake.current_batch_id());
            println!("Location:  {}", state.location);
            println!("Last SKU:  {}", state.last_sku.as_deref().unwrap_or("-"));
        }

        Commands::Add {
            grade,
            tag,
            upc,
            manufacturer,
            model,
            notes,
            manifest_id,
            pallet_id,
            unit_id,
            pid_uid,
        } => {
            let outcome = intake.add_product(
                grade,
                NewProduct {
                    warehouse_tag: tag,
                    upc,
                    manufacturer,
                    model,
                    notes,
                    manifest_id,
                    pallet_id,
                    unit_id,
                    pid_uid,
                },
            )?;
            println!("{}", outcome.record.sku);
            if let (Some(batch_number), Some(export)) = (outcome.completed_batch, &outcome.export) {
                match export {
                    Ok(export) => print_export(batch_number, export),
                    Err(error) => eprintln!(
                        "Batch {} complete but not exported ({}), retry with `sku-batch export {}`",
                        batch_number, error, batch_number
                    ),
                }
            }
        }

        Commands::List { batch } => {
            let records = match batch {
                Some(batch_number) => intake.store().records_in_batch(batch_number)?,
                None => intake.store().records()?,
            };
            for record in &records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.sku,
                    record.grade.description(),
                    record.manufacturer.as_deref().unwrap_or(""),
                    record.model.as_deref().unwrap_or("")
                );
            }
            println!("{} record(s)", records.len());
        }

        Commands::Delete { sku } => match intake.delete_sku(&sku)? {
            0 => println!("No record with SKU {}", sku),
            removed => println!("Deleted {} record(s) with SKU {}", removed, sku),
        },

        Commands::Undo => match intake.delete_last()? {
            Some(sku) => println!("Deleted {}", sku),
            None => println!("Inventory is empty, nothing deleted"),
        },

        Commands::CloseBatch => {
            let batch_number = intake.state().current_batch_number;
            let outcome = intake.close_batch()?;
            print_export(batch_number, &outcome);
            println!("Now on batch {}", intake.state().current_batch_number);
        }

        Commands::Export { batch } => {
            let outcome = intake.export_batch(batch)?;
            print_export(batch, &outcome);
        }

        Commands::Reset => {
            intake.reset()?;
            println!("Counters reset to {}", intake.current_batch_id());
        }

        Commands::Location { location } => {
            intake.set_location(&location)?;
            println!("Location set to {}", intake.state().location);
        }
    }

    Ok(())
}
