use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};

use quillflow::config::ModelSettings;
use quillflow::{
    AnthropicClient, AnthropicConfig, Approver, AutoApprover, Collaborators, ConsoleApprover,
    DryRunPublisher, Generator, KnowledgeBase, Pipeline, Publisher, RunRecordWriter, RunState, Settings,
    TistoryPublisher, Topic, load_topic_file,
};

#[derive(Parser)]
#[command(name = "quillflow")]
#[command(author, version, about = "Research, write, review and publish blog posts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a blog post for a topic and publish it
    Run {
        #[command(flatten)]
        topic: TopicArgs,

        /// Knowledge base files or directories (.md, .txt)
        #[arg(long = "knowledge", num_args = 1..)]
        knowledge: Vec<PathBuf>,

        /// Directory for the run state and the finished post
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Use the dry-run publisher instead of Tistory
        #[arg(long)]
        dry_run: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Query the knowledge base without calling any model
    Search {
        /// Knowledge base files or directories (.md, .txt)
        #[arg(long = "knowledge", num_args = 1.., required = true)]
        knowledge: Vec<PathBuf>,

        /// Search query
        #[arg(short, long)]
        query: String,

        /// Number of results
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args)]
struct TopicArgs {
    /// Topic JSON file
    #[arg(long, conflicts_with_all = ["title", "description", "keywords", "audience", "tone"])]
    topic: Option<PathBuf>,

    /// Post title
    #[arg(long, required_unless_present = "topic")]
    title: Option<String>,

    /// What the post should cover
    #[arg(long, default_value = "")]
    description: String,

    /// Target keyword (repeatable)
    #[arg(long = "keyword")]
    keywords: Vec<String>,

    /// Target audience
    #[arg(long)]
    audience: Option<String>,

    /// Writing tone
    #[arg(long)]
    tone: Option<String>,
}

impl TopicArgs {
    fn into_topic(self) -> Result<Topic> {
        if let Some(path) = self.topic {
            return load_topic_file(&path);
        }
        let title = self.title.context("Either --topic or --title is required")?;
        let mut topic = Topic::new(title, self.description).with_keywords(self.keywords);
        if let Some(audience) = self.audience {
            topic.target_audience = audience;
        }
        if let Some(tone) = self.tone {
            topic.tone = tone;
        }
        Ok(topic)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Run {
            topic,
            knowledge,
            output_dir,
            dry_run,
            verbose,
        } => {
            setup_logging(&settings, verbose)?;
            let topic = topic.into_topic()?;
            run_pipeline(&settings, topic, knowledge, output_dir, dry_run).await
        }
        Commands::Search {
            knowledge,
            query,
            top_k,
            verbose,
        } => {
            setup_logging(&settings, verbose)?;
            search_knowledge(&settings, &knowledge, &query, top_k)
        }
    }
}

fn setup_logging(settings: &Settings, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { settings.log.level.as_str() };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let file_layer = match &settings.log.file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter()))
        .with(file_layer)
        .try_init()
        .ok();
    Ok(())
}

/// Open `path` for appending, creating missing parent directories
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {:?}", path))
}

async fn run_pipeline(
    settings: &Settings,
    topic: Topic,
    knowledge: Vec<PathBuf>,
    output_dir: PathBuf,
    dry_run: bool,
) -> Result<()> {
    let client_for = |role: &ModelSettings| -> Result<Box<dyn Generator>> {
        let client = AnthropicClient::new(AnthropicConfig::for_role(settings, role)?);
        info!("Using model {} (temperature {})", client.model(), role.temperature);
        Ok(Box::new(client))
    };
    let research_model = client_for(&settings.research)?;
    let writer_model = client_for(&settings.writer)?;
    let critic_model = client_for(&settings.critic)?;

    info!("Loading knowledge base from {} paths", knowledge.len());
    let knowledge_base = KnowledgeBase::load(&knowledge, &settings.knowledge);
    info!("Knowledge base ready: {} chunks", knowledge_base.len());

    let publisher: Box<dyn Publisher> = if dry_run {
        Box::new(DryRunPublisher)
    } else {
        Box::new(TistoryPublisher::from_settings(&settings.publish)?)
    };
    let approver: Box<dyn Approver> = if settings.pipeline.manual_approval {
        Box::new(ConsoleApprover)
    } else {
        Box::new(AutoApprover)
    };

    let pipeline = Pipeline::new(
        settings,
        Collaborators {
            retriever: Box::new(knowledge_base),
            research_model,
            writer_model,
            critic_model,
            publisher,
            approver,
        },
    );

    let state = pipeline.run(topic).await;

    let record = RunRecordWriter::new(&output_dir)
        .write(&state)
        .context("Failed to write run record")?;
    info!("State written to {:?}", record.state_path);
    if let Some(post_path) = &record.post_path {
        info!("Post written to {:?}", post_path);
    }

    print_summary(&state);
    Ok(())
}

fn print_summary(state: &RunState) {
    println!("Run Summary");
    println!("===========");
    println!("Run ID: {}", state.run_id);
    println!("Final stage: {}", state.current_stage);
    println!("Iterations: {}", state.iteration_count());

    if state.has_errors() {
        println!();
        println!("Errors");
        println!("------");
        for error in state.errors() {
            println!("- {}", error);
        }
    }

    if let Some(content) = &state.final_content {
        println!();
        println!("Post");
        println!("----");
        println!("Title: {}", content.title);
        println!("Words: {}", content.word_count);
        println!("Tags: {}", content.tags.join(", "));
    }

    if let Some(result) = &state.publish_result {
        println!();
        if result.success {
            println!("Published: {}", result.post_url.as_deref().unwrap_or("-"));
        } else {
            println!(
                "Publish failed: {}",
                result.error_message.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn search_knowledge(
    settings: &Settings,
    knowledge: &[PathBuf],
    query: &str,
    top_k: usize,
) -> Result<()> {
    let knowledge_base = KnowledgeBase::load(knowledge, &settings.knowledge);

    println!("Knowledge Base");
    println!("==============");
    println!("Chunks indexed: {}", knowledge_base.len());
    println!();

    let results = knowledge_base.search(query, top_k);
    if results.is_empty() {
        println!("No matching chunks for {:?}", query);
        return Ok(());
    }

    for (rank, scored) in results.iter().enumerate() {
        let source = scored
            .document
            .metadata
            .get("source")
            .map(String::as_str)
            .unwrap_or("unknown");
        println!("{}. [{:.3}] {}", rank + 1, scored.score, source);
        println!("   {}", quillflow::models::truncate_chars(&scored.document.content, 200));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_log_file_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("nested").join("quillflow.log");

        open_log_file(&path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quillflow.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let mut file = open_log_file(&path).unwrap();
        writeln!(file, "later").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }
}
