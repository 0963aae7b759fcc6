//! # Job Copilot CLI (`jcp`)
//!
//! ## Usage
//!
//! ```bash
//! jcp --config ./config/jcp.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `jcp init` | Create data directories, the database, and a starter profile |
//! | `jcp index` | Index the profile documents directory |
//! | `jcp search "<query>"` | Retrieve snippets from the index |
//! | `jcp extract` | Skill extraction and alignment for a job description |
//! | `jcp generate` | Draft skills, cover letter, emails and ATS summary |
//! | `jcp ask "<question>"` | Free-form question over the indexed documents |
//! | `jcp profile show\|reset\|path` | Inspect or reset the profile |
//! | `jcp serve` | Start the HTTP API |
//!
//! Job descriptions are read from `--file`, `--text`, or stdin.
//!
//! ## Examples
//!
//! ```bash
//! jcp init
//! cp ~/cv.pdf data/job_rag/profile_docs/
//! jcp extract --file posting.txt
//! pbpaste | jcp generate
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use job_copilot::config::{self, Config};
use job_copilot::embedding::create_embedder;
use job_copilot::generate::{analyze, Copilot};
use job_copilot::ingest::Indexer;
use job_copilot::profile::ProfileStore;
use job_copilot::server;
use job_copilot::sqlite_store::SqliteStore;
use job_copilot_core::matcher::SkillMatcher;
use job_copilot_core::models::DocType;
use job_copilot_core::retrieval::{cite_sources, Retriever};
use job_copilot_core::store::Store;

/// Job Copilot: tailor application drafts to a job description using your
/// own documents and a local language model.
#[derive(Parser)]
#[command(name = "jcp", version, about)]
struct Cli {
    /// Path to configuration file (TOML). A missing file means defaults.
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create data directories, the database, and a starter profile.
    ///
    /// Idempotent: an existing profile is left untouched.
    Init,

    /// Index every document in the profile documents directory.
    ///
    /// Re-running adds the documents again; duplicates are harmless.
    Index,

    /// Retrieve snippets for a query.
    Search {
        query: String,

        /// Restrict results to one document type.
        #[arg(long, value_enum)]
        doc_type: Option<DocTypeArg>,
    },

    /// Extract hard/soft skills and keywords from a job description and
    /// align them with the profile. Offline: no index, no model.
    Extract {
        #[command(flatten)]
        input: JdInput,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Run the full pipeline and print the four drafts.
    Generate {
        #[command(flatten)]
        input: JdInput,

        /// Do not write the drafts to the outputs directory.
        #[arg(long)]
        no_save: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Ask a free-form question over the indexed documents.
    Ask { question: String },

    /// Inspect or reset the profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the profile as JSON.
    Show,
    /// Overwrite the profile with the built-in default.
    Reset,
    /// Print the profile file path.
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocTypeArg {
    Profile,
    Jd,
}

impl From<DocTypeArg> for DocType {
    fn from(arg: DocTypeArg) -> Self {
        match arg {
            DocTypeArg::Profile => DocType::Profile,
            DocTypeArg::Jd => DocType::Jd,
        }
    }
}

#[derive(clap::Args)]
struct JdInput {
    /// Read the job description from a file.
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Job description text.
    #[arg(long)]
    text: Option<String>,
}

impl JdInput {
    fn read(&self) -> Result<String> {
        let text = match (&self.file, &self.text) {
            (Some(path), _) => std::fs::read_to_string(path)?,
            (None, Some(text)) => text.clone(),
            (None, None) => std::io::read_to_string(std::io::stdin())?,
        };
        if text.trim().is_empty() {
            anyhow::bail!("job description is empty");
        }
        Ok(text)
    }
}

fn print_list(label: &str, items: &[String]) {
    println!("{}: {}", label, if items.is_empty() { "-".to_string() } else { items.join(", ") });
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => run_init(&cfg).await?,
        Commands::Index => run_index(&cfg).await?,
        Commands::Search { query, doc_type } => {
            let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&cfg).await?);
            let retriever = Retriever::new(store, create_embedder(&cfg.embedding)?)
                .with_limits(cfg.retrieval.top_k, cfg.retrieval.candidate_k);
            let hits = retriever.retrieve(&query, doc_type.map(DocType::from)).await?;
            if hits.is_empty() {
                println!("No results.");
            }
            for (i, hit) in hits.iter().enumerate() {
                println!("[{}] ({}, score {:.3})", i + 1, hit.doc_type, hit.score);
                println!("{}\n", hit.text.trim());
            }
            if !hits.is_empty() {
                println!("Sources:\n{}", cite_sources(&hits));
            }
        }
        Commands::Extract { input, json } => {
            let jd = input.read()?;
            let profile = ProfileStore::new(cfg.data.profile_file()).load()?;
            let analysis = analyze(&SkillMatcher::default(), profile.as_ref(), &jd);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_list("Hard skills", &analysis.extraction.hard);
                print_list("Soft skills", &analysis.extraction.soft);
                print_list("Keywords", &analysis.extraction.keywords);
                match &analysis.alignment {
                    Some(al) => {
                        print_list("You have (hard)", &al.have_hard);
                        print_list("You have (soft)", &al.have_soft);
                        print_list("Gaps", &al.gaps);
                    }
                    None => println!("(no profile configured, alignment skipped)"),
                }
            }
        }
        Commands::Generate {
            input,
            no_save,
            json,
        } => {
            let jd = input.read()?;
            let copilot = Copilot::from_config(&cfg).await?;
            let pkg = copilot.run(&jd, !no_save).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pkg)?);
            } else {
                println!("## Skills & keywords\n\n{}\n", pkg.skills.trim());
                println!("## Cover letter\n\n{}\n", pkg.cover.trim());
                println!("## Emails\n\n{}\n", pkg.emails.trim());
                println!("## ATS summary\n\n{}\n", pkg.ats.trim());
                print_list("You have (hard)", &pkg.have_hard);
                print_list("You have (soft)", &pkg.have_soft);
                print_list("Gaps", &pkg.gaps);
                for file in &pkg.files {
                    println!("saved {}", file.display());
                }
            }
        }
        Commands::Ask { question } => {
            let copilot = Copilot::from_config(&cfg).await?;
            let answer = copilot.ask(&question).await?;
            println!("{}", answer.answer.trim());
            if !answer.sources.is_empty() {
                println!("\nSources:\n{}", cite_sources(&answer.sources));
            }
        }
        Commands::Profile { action } => {
            let profiles = ProfileStore::new(cfg.data.profile_file());
            match action {
                ProfileAction::Show => match profiles.load()? {
                    Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                    None => anyhow::bail!(
                        "no profile configured at {} (run `jcp init`)",
                        profiles.path().display()
                    ),
                },
                ProfileAction::Reset => {
                    profiles.reset()?;
                    println!("Profile reset: {}", profiles.path().display());
                }
                ProfileAction::Path => println!("{}", profiles.path().display()),
            }
        }
        Commands::Serve => server::run_server(&cfg).await?,
    }

    Ok(())
}

async fn run_init(cfg: &Config) -> Result<()> {
    for dir in [cfg.data.profile_docs_path(), cfg.data.outputs_path()] {
        std::fs::create_dir_all(&dir)?;
    }
    let store = SqliteStore::open(cfg).await?;
    let stats = store.stats().await?;
    println!("Database ready: {} ({} documents)", cfg.db.path.display(), stats.documents);

    let profiles = ProfileStore::new(cfg.data.profile_file());
    if profiles.ensure_default()? {
        println!("Starter profile written: {}", profiles.path().display());
    } else {
        println!("Profile exists: {}", profiles.path().display());
    }
    println!("Put CVs and notes in {}", cfg.data.profile_docs_path().display());
    Ok(())
}

async fn run_index(cfg: &Config) -> Result<()> {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(cfg).await?);
    let indexer = Indexer::new(
        store.clone(),
        create_embedder(&cfg.embedding)?,
        cfg.chunking.clone(),
    );
    let report = indexer
        .index_profile_docs(&cfg.data.profile_docs_path())
        .await?;
    let stats = store.stats().await?;

    println!("index {}", cfg.data.profile_docs_path().display());
    println!("  documents: {}", report.documents);
    println!("  chunks: {}", report.chunks);
    println!("  vectors: {}", report.vectors);
    println!("  skipped: {}", report.skipped);
    println!(
        "  store totals: {} documents, {} chunks, {} vectors",
        stats.documents, stats.chunks, stats.vectors
    );
    Ok(())
}
