use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use studymate::artifacts::{parse_flashcards, parse_mind_map, parse_quiz};
use studymate::config::StudyConfig;
use studymate::extract::{extension_of, extract_text, is_blank};
use studymate::jobs::JobLog;
use studymate::render::{flashcards_to_pptx, to_pretty_json, PdfRenderer};
use tracing_subscriber::EnvFilter;

/// Offline tools for the study artifact pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory holding blobs and the job log (overrides STUDYMATE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the text extracted from a document
    Extract { file: PathBuf },

    /// Render markdown-style model text as a titled PDF
    RenderPdf {
        input: PathBuf,
        #[arg(short, long, default_value = "Summary")]
        title: String,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Build a flashcard deck from FRONT:/BACK: text or JSON
    FlashcardsPptx {
        input: PathBuf,
        #[arg(short, long, default_value = "Flash Cards")]
        title: String,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Parse model output into typed records and print them as JSON
    Parse {
        #[arg(value_enum)]
        kind: ParseKind,
        input: PathBuf,
    },

    /// List recorded jobs for a user, newest first
    Jobs {
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ParseKind {
    Flashcards,
    Quiz,
    Mindmap,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,studymate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = StudyConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Command::Extract { file } => {
            let bytes = tokio::fs::read(&file).await?;
            let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let extension = extension_of(name);
            let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &extension)).await?;
            if is_blank(&text) {
                return Err(format!("no text could be extracted from {}", file.display()).into());
            }
            println!("{}", text);
        }
        Command::RenderPdf {
            input,
            title,
            output,
        } => {
            let content = tokio::fs::read_to_string(&input).await?;
            let pdf = PdfRenderer::new()
                .render_document_async(content, title)
                .await?;
            tokio::fs::write(&output, &pdf).await?;
            tracing::info!("[Cli] Wrote {} ({} bytes)", output.display(), pdf.len());
        }
        Command::FlashcardsPptx {
            input,
            title,
            output,
        } => {
            let content = tokio::fs::read_to_string(&input).await?;
            let cards = parse_flashcards(&content);
            let deck = tokio::task::spawn_blocking(move || flashcards_to_pptx(&cards, &title))
                .await??;
            tokio::fs::write(&output, &deck).await?;
            tracing::info!("[Cli] Wrote {} ({} bytes)", output.display(), deck.len());
        }
        Command::Parse { kind, input } => {
            let content = tokio::fs::read_to_string(&input).await?;
            let json = match kind {
                ParseKind::Flashcards => to_pretty_json(&parse_flashcards(&content))?,
                ParseKind::Quiz => {
                    let quiz = parse_quiz(&content)?;
                    for issue in quiz.validate() {
                        tracing::warn!("[Cli] {}", issue);
                    }
                    to_pretty_json(&quiz)?
                }
                ParseKind::Mindmap => to_pretty_json(&parse_mind_map(&content)?)?,
            };
            println!("{}", json);
        }
        Command::Jobs { user } => {
            let log = JobLog::open(config.job_log_path()).await?;
            for job in log.list_for_user(&user).await {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    job.id,
                    job.created_at.format("%Y-%m-%d %H:%M"),
                    job.kind,
                    job.title,
                    job.original_filename()
                );
            }
        }
    }

    Ok(())
}
