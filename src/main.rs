// ==========================================
// 实验室设备导入 - 命令行入口
// ==========================================
// 命令: preview / import / template / defaults / config
// 技术栈: clap + tokio + SQLite 配置
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lab_equipment_import::api::{load_labs, ConfigApi, ImportApi};
use lab_equipment_import::config::ConfigManager;
use lab_equipment_import::db::get_default_db_path;
use lab_equipment_import::domain::{ImportReport, Lab};
use lab_equipment_import::i18n;
use lab_equipment_import::importer::ImportPreview;
use lab_equipment_import::logging::{self, LogOptions};

#[derive(Parser)]
#[command(name = "lab-equipment-import")]
#[command(version = lab_equipment_import::VERSION)]
#[command(about = "Bulk-import laboratory equipment from Excel/CSV inventory sheets", long_about = None)]
struct Cli {
    /// SQLite database holding import configuration
    #[arg(long, global = true, env = "LAB_EQUIPMENT_IMPORT_DB_PATH")]
    db: Option<String>,

    /// Print results and log lines as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Message language (en, zh-CN)
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode, transform and validate a file without submitting it
    Preview {
        /// Spreadsheet to inspect (.xlsx, .xls, .csv)
        file: PathBuf,

        /// JSON array of known labs: [{"id": 1, "name": "..."}]
        #[arg(long)]
        labs: Option<PathBuf>,
    },

    /// Validate a file and submit the valid rows to the bulk-import endpoint
    Import {
        /// Spreadsheet to import (.xlsx, .xls, .csv)
        file: PathBuf,

        /// Bearer credential for the equipment API
        #[arg(long, env = "LAB_EQUIPMENT_IMPORT_TOKEN", hide_env_values = true)]
        token: String,

        /// JSON array of known labs
        #[arg(long)]
        labs: Option<PathBuf>,

        /// Override the configured API base URL
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Write a sample file in the legacy inventory layout
    Template {
        /// Output path (.xlsx or .csv)
        #[arg(default_value = "equipment_import_template.xlsx")]
        output: PathBuf,
    },

    /// Show the field default table used by the transformer and importer
    Defaults,

    /// Manage import configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// List all configuration keys with their effective values
    List,

    /// Show one configuration value
    Get { key: String },

    /// Store a configuration value
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(LogOptions {
        json: cli.json,
        verbose: cli.verbose,
    });

    if let Some(locale) = cli.locale.as_deref() {
        if !i18n::set_locale(locale) {
            anyhow::bail!(
                "unsupported locale {} (expected one of {:?})",
                locale,
                i18n::SUPPORTED_LOCALES
            );
        }
    }

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::debug!(db_path = %db_path, "使用配置数据库");
    let config_manager = Arc::new(
        ConfigManager::new(&db_path)
            .with_context(|| format!("failed to open configuration database {}", db_path))?,
    );

    match cli.command {
        Commands::Preview { file, labs } => {
            let labs = read_labs(labs.as_deref()).await?;
            let preview = ImportApi::new(config_manager).preview(&file, &labs).await?;
            if cli.json {
                print_json(&preview)?;
            } else {
                print_preview(&preview);
            }
        }
        Commands::Import {
            file,
            token,
            labs,
            api_url,
        } => {
            let labs = read_labs(labs.as_deref()).await?;
            let report = ImportApi::new(config_manager)
                .import(&file, &labs, &token, api_url.as_deref())
                .await?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
        }
        Commands::Template { output } => {
            let response = ImportApi::new(config_manager)
                .export_template(&output)
                .await?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!("{}", response.path);
            }
        }
        Commands::Defaults => {
            let rules = ImportApi::new(config_manager).defaults_table().await?;
            if cli.json {
                print_json(&rules)?;
            } else {
                println!("{:<18} {:<30} TRIGGER", "FIELD", "DEFAULT");
                for rule in rules {
                    println!("{:<18} {:<30} {}", rule.field, rule.value, rule.trigger);
                }
            }
        }
        Commands::Config { action } => {
            let api = ConfigApi::new(config_manager);
            match action {
                ConfigAction::List => {
                    let items = api.list_configs()?;
                    if cli.json {
                        print_json(&items)?;
                    } else {
                        for item in items {
                            println!("{} = {} ({})", item.key, item.value, item.source);
                        }
                    }
                }
                ConfigAction::Get { key } => {
                    let item = api.get_config(&key)?;
                    if cli.json {
                        print_json(&item)?;
                    } else {
                        println!("{}", item.value);
                    }
                }
                ConfigAction::Set { key, value } => {
                    api.update_config(&key, &value)?;
                }
            }
        }
    }

    Ok(())
}

async fn read_labs(path: Option<&Path>) -> Result<Vec<Lab>> {
    match path {
        Some(path) => Ok(load_labs(path).await?),
        None => Ok(Vec::new()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_preview(preview: &ImportPreview) {
    println!("{} ({})", preview.file_name, preview.batch_id);
    for outcome in &preview.outcomes {
        let c = &outcome.candidate;
        let mark = if outcome.is_valid() { "OK" } else { "INVALID" };
        println!(
            "#{:<4} {:<8} {} | {} | {}",
            outcome.row_number, mark, c.name, c.serial_number, c.category
        );
        for error in &outcome.errors {
            println!("        error: {}", error);
        }
        for warning in &outcome.warnings {
            println!("        warning: {}", warning);
        }
    }

    let s = &preview.summary;
    println!(
        "total {} / valid {} / invalid {} / with warnings {}",
        s.total_rows, s.valid_rows, s.invalid_rows, s.warning_rows
    );
}

fn print_report(report: &ImportReport) {
    if let Some(message) = &report.success_message {
        println!("{}", message);
    }
    if let Some(message) = &report.error_message {
        eprintln!("{}", message);
    }
    println!(
        "submitted {} of {} rows (succeeded {}, failed {})",
        report.submitted,
        report.summary.total_rows,
        report.result.succeeded,
        report.result.failed
    );
}
