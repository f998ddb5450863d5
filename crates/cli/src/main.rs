use clap::{Parser, Subcommand};
use ontop_core::{
    config::{path_from_env_value, provider_groups_from_env_value, user_id_scheme_from_env_value},
    constants::{DEFAULT_EXPORT_DIR, DEFAULT_RECORDS_PATH},
    export::{to_pretty_json, write_export},
    CoreConfig, FilterCriteria, GroupedResult, IdentityService, RecordKey, SessionState,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ontop")]
#[command(about = "Search patient records across provider systems and merge them")]
struct Cli {
    /// Records document (overrides ONTOP_RECORDS_PATH)
    #[arg(long, global = true)]
    records: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every record under its provider groups
    Groups,
    /// Search records
    Search {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Merge records into one
    Merge {
        /// Record to merge as '<patientID>|<providers>', in merge order (repeatable)
        #[arg(long = "select", required = true)]
        selected: Vec<RecordKey>,
        /// Write the merged record to ONTOP_EXPORT_DIR/merged_patient.json
        #[arg(long)]
        export: bool,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Name contains (case-insensitive)
    #[arg(long)]
    name: Option<String>,
    /// Date of birth contains
    #[arg(long)]
    dob: Option<String>,
    /// Gender contains (case-insensitive)
    #[arg(long)]
    gender: Option<String>,
    /// Zip code contains
    #[arg(long)]
    zip: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            name: args.name,
            dob: args.dob,
            gender: args.gender,
            zip_code: args.zip,
        }
        .normalised()
    }
}

fn print_groups(result: &GroupedResult) {
    for group in result.groups() {
        println!("{} ({})", group.name, group.records.len());
        for record in &group.records {
            println!(
                "  [{}] {} - DOB: {}, Providers: {}",
                record.key(),
                record.patient_name,
                record.patient_dob,
                record.providers
            );
        }
    }
    println!("{} matching records", result.total());
}

fn load_config(records: Option<PathBuf>) -> Result<CoreConfig, Box<dyn std::error::Error>> {
    let records_path = match records {
        Some(path) => path,
        None => path_from_env_value(std::env::var("ONTOP_RECORDS_PATH").ok(), DEFAULT_RECORDS_PATH),
    };
    Ok(CoreConfig::new(
        records_path,
        provider_groups_from_env_value(std::env::var("ONTOP_PROVIDER_GROUPS").ok()),
        user_id_scheme_from_env_value(std::env::var("ONTOP_USER_ID_SCHEME").ok())?,
        path_from_env_value(std::env::var("ONTOP_EXPORT_DIR").ok(), DEFAULT_EXPORT_DIR),
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'ontop --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(load_config(cli.records)?);
    let service = IdentityService::new(cfg.clone());

    match command {
        Commands::Groups => {
            if service.store().is_empty() {
                println!("No records loaded.");
            } else {
                print_groups(&service.search(&FilterCriteria::new()));
            }
        }
        Commands::Search { filter } => {
            print_groups(&service.search(&filter.into()));
        }
        Commands::Merge { selected, export } => {
            let mut state = SessionState::new();
            for key in &selected {
                match service.store().find(key) {
                    Some(record) if state.selection().contains(record) => {
                        eprintln!("Skipping duplicate selection: {}", key);
                    }
                    Some(record) => state = state.toggle_selection(record),
                    None => eprintln!("No record found for: {}", key),
                }
            }

            let state = service.merge(state);
            match state.merged() {
                Some(merged) => {
                    println!("{}", to_pretty_json(merged)?);
                    if export {
                        match write_export(cfg.export_dir(), merged) {
                            Ok(path) => println!("Exported merged record to {}", path.display()),
                            Err(e) => eprintln!("Error exporting merged record: {}", e),
                        }
                    }
                }
                None => println!("Nothing selected; no merged record produced."),
            }
        }
    }

    Ok(())
}
