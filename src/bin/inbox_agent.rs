use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use inbox_agent::config::{load_config, resolve_data_dir};
use inbox_agent::domain::{Category, PromptKey};
use inbox_agent::llm::GeminiGateway;
use inbox_agent::store::{JsonRepo, TriageRepository};
use inbox_agent::triage::{Agent, urgent_indices};

#[derive(Parser)]
#[command(name = "inbox_agent")]
#[command(about = "LLM-assisted triage for a local JSON inbox", long_about = None)]
struct Cli {
    /// Data directory (overrides config and INBOX_AGENT_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Sampling temperature, 0.0 - 1.0
    #[arg(long, global = true)]
    temperature: Option<f32>,

    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the data files with defaults if they are missing
    Init,

    /// List the inbox
    List {
        /// Only high-priority / urgent emails
        #[arg(long)]
        urgent: bool,

        #[arg(long)]
        hide_archived: bool,
    },

    /// Print one email with its category and action items
    Show { index: usize },

    /// Flag an email as archived
    Archive { index: usize },

    /// Categorize and extract action items for every email
    Ingest,

    Categorize { index: usize },

    /// Extract action items from one email
    Extract { index: usize },

    /// Draft and save a reply (uses the email's thread as context)
    Draft { index: usize },

    /// Ask a question about one email
    Chat { index: usize, question: String },

    /// Append an .eml file to the inbox
    Import { path: PathBuf },

    /// Inspect or edit prompt templates
    Prompts {
        #[command(subcommand)]
        cmd: PromptsCommand,
    },

    /// Counts of saved drafts and analyses
    Results,
}

#[derive(Subcommand)]
enum PromptsCommand {
    List,
    Show {
        key: String,
    },
    /// Replace a template (read from --file or stdin)
    Set {
        key: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => resolve_data_dir(&cfg)?,
    };
    let params = cfg.generation_params(cli.temperature, cli.max_tokens);

    let repo = JsonRepo::open(&data_dir)
        .with_context(|| format!("opening data dir {}", data_dir.display()))?;
    let gateway = GeminiGateway::from_env(cfg.gateway_settings())?;
    let agent = Agent::new(repo, gateway);

    match cli.cmd {
        Command::Init => {
            println!("Data files ready in {}", data_dir.display());
            if agent.generator().is_mock() {
                println!("GOOGLE_API_KEY not set: responses will be mocked.");
            } else {
                println!("Using model {}", agent.generator().model());
            }
        }

        Command::List {
            urgent,
            hide_archived,
        } => {
            let inbox = agent.repo().load_inbox()?;
            let indices = if urgent {
                urgent_indices(&inbox)
            } else {
                (0..inbox.len()).collect()
            };
            let indices: Vec<_> = indices
                .into_iter()
                .filter(|&i| !(hide_archived && inbox[i].archived))
                .collect();

            if indices.is_empty() {
                println!("No emails match the selected filter.");
            }
            for i in indices {
                let archived = if inbox[i].archived { " (archived)" } else { "" };
                println!("{i:>3}  {}{archived}", inbox[i].label());
            }
        }

        Command::Show { index } => {
            let inbox = agent.repo().load_inbox()?;
            let email = inbox
                .get(index)
                .ok_or_else(|| anyhow!("no email at index {index}"))?;
            println!("Subject: {}", email.subject);
            println!("From: {}", email.from);
            println!("To: {}", email.to);
            println!("Date: {}", email.date);
            if let Some(t) = &email.thread_id {
                println!("Thread: {t}");
            }
            println!("---\n{}\n---", email.body);
            if let Some(cat) = &email.category {
                print_category(cat)?;
            }
            if let Some(items) = &email.action_items {
                print_items(items);
            }
        }

        Command::Archive { index } => {
            agent.archive(index)?;
            println!("Email archived.");
        }

        Command::Ingest => {
            let records = agent.ingest(params)?;
            let failed = records.iter().filter(|r| r.is_error()).count();
            println!(
                "Inbox ingestion completed: {} processed, {failed} failed.",
                records.len() - failed
            );
        }

        Command::Categorize { index } => {
            let cat = agent.categorize(index, params)?;
            print_category(&cat)?;
        }

        Command::Extract { index } => {
            let items = agent.extract_actions(index, params)?;
            print_items(&items);
        }

        Command::Draft { index } => {
            let draft = agent.draft_reply(index, params)?;
            println!("Subject: {}\n\n{}", draft.subject, draft.body);
            println!("\nDraft saved.");
        }

        Command::Chat { index, question } => {
            let answer = agent.chat(index, &question, params)?;
            println!("{answer}");
        }

        Command::Import { path } => {
            let idx = agent.import_message(&path)?;
            println!("Imported as email {idx}.");
        }

        Command::Prompts { cmd } => match cmd {
            PromptsCommand::List => {
                for (key, p) in agent.repo().load_prompts()?.iter() {
                    println!("{key:<16} {}", p.name);
                }
            }
            PromptsCommand::Show { key } => {
                let key: PromptKey = key.parse()?;
                let prompts = agent.repo().load_prompts()?;
                println!("{}", prompts.template(key)?);
            }
            PromptsCommand::Set { key, file } => {
                let key: PromptKey = key.parse()?;
                let text = match file {
                    Some(path) => std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?,
                    None => {
                        eprintln!("Paste the new template (end with Ctrl-D):");
                        let mut s = String::new();
                        std::io::Read::read_to_string(&mut std::io::stdin(), &mut s)?;
                        s
                    }
                };
                agent.set_prompt(key, text.trim_end())?;
                println!("Prompt updated.");
            }
        },

        Command::Results => {
            let results = agent.repo().load_results()?;
            println!("Saved Drafts: {}", results.drafts.len());
            println!("Saved Analyses: {}", results.analyses.len());
        }
    }

    Ok(())
}

fn print_category(cat: &Category) -> Result<()> {
    match cat {
        Category::Structured(value) => {
            println!("Category:\n{}", serde_json::to_string_pretty(value)?)
        }
        Category::Raw(text) => println!("Category (unparsed):\n{text}"),
    }
    Ok(())
}

fn print_items(items: &[String]) {
    if items.is_empty() {
        println!("No action items.");
    }
    for (i, item) in items.iter().enumerate() {
        println!("{}. {item}", i + 1);
    }
}
