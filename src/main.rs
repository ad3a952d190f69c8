use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod analytics;
mod chat;
mod config;
mod db;
mod errors;
mod export;
mod ingest;
mod models;
mod query;
mod report;
mod risk;
mod sample;
mod simulate;
mod store;

use crate::config::AppConfig;
use crate::models::RiskLevel;
use crate::query::{SortField, StudentQuery};
use crate::simulate::Adjustments;
use crate::store::{Repository, StudentStore};

#[derive(Parser)]
#[command(name = "early-signal")]
#[command(about = "Student dropout early-signal tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the Postgres schema
    InitDb,
    /// Replace all students with generated sample data
    Reset {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Replace all students with the rows of a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Write students and their risk scores to a CSV file
    Export {
        #[arg(long, default_value = "students.csv")]
        out: PathBuf,
        #[arg(long)]
        department: Option<String>,
    },
    /// Write a sample CSV upload template
    Template {
        #[arg(long, default_value = "student-template.csv")]
        out: PathBuf,
    },
    /// Show headline numbers and the highest-risk students
    Dashboard,
    /// Search, filter and page through students
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "department")]
        departments: Vec<String>,
        #[arg(long = "risk", value_enum)]
        risk_levels: Vec<RiskLevel>,
        #[arg(long, value_enum, default_value_t = SortField::RiskScore)]
        sort: SortField,
        #[arg(long)]
        asc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one student's score breakdown and interventions
    Show { id: String },
    /// Re-score a student with adjusted metrics without saving
    WhatIf {
        id: String,
        #[arg(long)]
        attendance: Option<f64>,
        #[arg(long)]
        assignment_submission: Option<f64>,
        #[arg(long)]
        library_visits: Option<u32>,
        #[arg(long)]
        gpa: Option<f64>,
        #[arg(long)]
        counselor_visits: Option<u32>,
        #[arg(long)]
        lab_participation: Option<f64>,
        #[arg(long)]
        peer_engagement: Option<u32>,
    },
    /// Show distributions and feature importance
    Analytics,
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Ask the assistant a question
    Chat { message: Vec<String> },
}

async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn open_repository(config: &AppConfig) -> anyhow::Result<Repository> {
    match config.database_url.as_deref() {
        Some(url) => Ok(Repository::Postgres(connect(url).await?)),
        None => Ok(Repository::file(config.data_dir.clone())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::InitDb => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set to initialize the schema")?;
            let pool = connect(url).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Template { out } => {
            std::fs::write(&out, ingest::TEMPLATE)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Template written to {}.", out.display());
        }
        command => {
            let repository = open_repository(&config).await?;
            let mut store = StudentStore::load(repository).await?;
            if store.fell_back_to_sample() {
                store.save().await?;
            }
            run(command, &mut store, &config).await?;
        }
    }

    Ok(())
}

async fn run(command: Commands, store: &mut StudentStore, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::InitDb | Commands::Template { .. } => {}
        Commands::Reset { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            store.reset_to_sample(&mut rng);
            store.save().await?;
            println!("Reset to {} sample students.", store.students().len());
        }
        Commands::Import { csv } => match ingest::read_csv(&csv) {
            Ok(students) => {
                print!("{}", report::render_import_preview(&students));
                let count = students.len();
                store.replace_all(students);
                store.save().await?;
                info!(students = count, "collection replaced from upload");
                println!("Imported {count} students from {}.", csv.display());
            }
            Err(err) => {
                println!("Import failed: {err}");
            }
        },
        Commands::Export { out, department } => {
            let selected = chat::select_department(store.students(), department.as_deref());
            let written = export::write_csv_file(&out, selected)?;
            println!("Exported {written} students to {}.", out.display());
        }
        Commands::Dashboard => {
            print!("{}", report::render_dashboard(store.students()));
        }
        Commands::List {
            search,
            departments,
            risk_levels,
            sort,
            asc,
            page,
        } => {
            let query = StudentQuery {
                search,
                departments,
                risk_levels,
                sort,
                descending: !asc,
                page,
                page_size: config.page_size,
            };
            let page = query::run(store.students(), &query);
            print!("{}", report::render_list(&page));
            if page.total == 0 && !query.departments.is_empty() {
                println!(
                    "Known departments: {}",
                    query::departments(store.students()).join(", ")
                );
            }
        }
        Commands::Show { id } => match store.find(&id) {
            Some(student) => print!("{}", report::render_detail(student)),
            None => print!("{}", report::render_not_found(&id)),
        },
        Commands::WhatIf {
            id,
            attendance,
            assignment_submission,
            library_visits,
            gpa,
            counselor_visits,
            lab_participation,
            peer_engagement,
        } => {
            let Some(student) = store.find(&id) else {
                print!("{}", report::render_not_found(&id));
                return Ok(());
            };
            let adjustments = Adjustments {
                attendance,
                assignment_submission,
                library_visits,
                gpa,
                counselor_visits,
                lab_participation,
                peer_engagement,
            };
            if adjustments.is_empty() {
                println!("No adjustments given; showing the current score.");
            }
            let simulation = simulate::simulate(student, &adjustments);
            print!("{}", report::render_simulation(&simulation));
        }
        Commands::Analytics => {
            print!("{}", report::render_analytics(store.students()));
        }
        Commands::Report { out } => {
            let report = report::build_report(store.students(), Utc::now().date_naive());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Chat { message } => {
            let text = message.join(" ");
            if text.trim().is_empty() {
                println!("{}", chat::GREETING);
                for action in chat::QUICK_ACTIONS.iter() {
                    println!("- {action}");
                }
                return Ok(());
            }

            let bot = chat::Chatbot::default();
            debug!(rule = bot.rule_for(&text).unwrap_or("fallback"), "chat rule selected");
            let context = chat::ChatContext {
                students: store.students(),
                today: Utc::now().date_naive(),
            };
            let reply = bot.reply(&text, &context);
            println!("{}", reply.text);

            if let Some(chat::ChatAction::ExportCsv {
                department,
                file_name,
            }) = reply.action
            {
                let selected = chat::select_department(store.students(), department.as_deref());
                export::write_csv_file(Path::new(&file_name), selected)?;
            }
        }
    }

    Ok(())
}
