mod drill;
mod enrich;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use lexdrill_core::time::{now_unix_ms, unix_ms_to_iso8601};
use lexdrill_core::{Selection, SessionState, Vocabulary, WordRecord, due_words};
use lexdrill_store::{Config, Store, default_base_dir};

#[derive(Parser)]
#[command(name = "lexdrill", about = "Spaced-repetition vocabulary drill")]
struct Cli {
    /// Override the data directory (default ~/.lexdrill)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a word to the vocabulary, due immediately
    Add {
        term: String,

        /// Definition to show during drills
        #[arg(long)]
        definition: Option<String>,
    },

    /// List the whole vocabulary
    List,

    /// List words due for review, in drill order
    Due,

    /// Start a study session and enter the drill loop
    Start {
        /// Batch size (default from config)
        #[arg(long)]
        size: Option<usize>,

        /// Sample random words, ignoring due times
        #[arg(long)]
        cram: bool,
    },

    /// Continue an unfinished session
    Resume,

    /// Review the last session's batch again, shuffled
    Again,

    /// Start the next batch of due words
    Next {
        /// Batch size (default: same as last batch)
        #[arg(long)]
        size: Option<usize>,
    },

    /// Discard the persisted session
    Exit,

    /// Show vocabulary and session statistics
    Stats,

    /// Show per-day judgment counts
    History,

    /// Fetch missing definitions from dictionaryapi.dev
    Enrich,

    /// Export state to a JSON file
    Export { path: PathBuf },

    /// Import state from a JSON file
    Import { path: PathBuf },
}

struct App {
    store: Store,
    config: Config,
}

fn open_app(cli: &Cli) -> Result<App> {
    let base = cli
        .data_dir
        .clone()
        .unwrap_or_else(default_base_dir);
    std::fs::create_dir_all(&base)
        .with_context(|| format!("failed to create {}", base.display()))?;

    let store = Store::open(&base.join("lexdrill.db"))
        .map_err(|e| anyhow::anyhow!("failed to open store: {e}"))?;
    let config = Config::load(&base);
    Ok(App { store, config })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Add { term, definition } => cmd_add(&cli, term, definition.as_deref()),
        Commands::List => cmd_list(&cli),
        Commands::Due => cmd_due(&cli),
        Commands::Start { size, cram } => cmd_start(&cli, *size, *cram),
        Commands::Resume => cmd_resume(&cli),
        Commands::Again => cmd_again(&cli),
        Commands::Next { size } => cmd_next(&cli, *size),
        Commands::Exit => cmd_exit(&cli),
        Commands::Stats => cmd_stats(&cli),
        Commands::History => cmd_history(&cli),
        Commands::Enrich => cmd_enrich(&cli).await,
        Commands::Export { path } => cmd_export(&cli, path),
        Commands::Import { path } => cmd_import(&cli, path),
    }
}

fn load_vocab(app: &App) -> Result<Vocabulary> {
    app.store
        .load_words()
        .map_err(|e| anyhow::anyhow!("failed to load words: {e}"))
}

fn cmd_add(cli: &Cli, term: &str, definition: Option<&str>) -> Result<()> {
    let app = open_app(cli)?;
    let vocab = load_vocab(&app)?;

    if vocab.find_by_term(term).is_some() {
        println!("'{term}' is already in the vocabulary");
        return Ok(());
    }

    let now = now_unix_ms();
    let word = match definition {
        Some(d) => WordRecord::new(term, now).with_definition(d),
        None => WordRecord::new(term, now),
    };
    app.store
        .insert_word(&word)
        .map_err(|e| anyhow::anyhow!("failed to save word: {e}"))?;

    println!("added '{term}' ({} words total)", vocab.len() + 1);
    Ok(())
}

fn cmd_list(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    let vocab = load_vocab(&app)?;

    if vocab.is_empty() {
        println!("vocabulary is empty — try `lexdrill add <term>`");
        return Ok(());
    }

    for word in vocab.iter() {
        print_word_line(word);
    }
    Ok(())
}

fn cmd_due(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    let vocab = load_vocab(&app)?;
    let now = now_unix_ms();

    let due = due_words(&vocab, now);
    if due.is_empty() {
        println!("nothing due — all caught up");
        return Ok(());
    }

    for id in &due {
        if let Some(word) = vocab.get(*id) {
            print_word_line(word);
        }
    }
    println!("{} word(s) due", due.len());
    Ok(())
}

fn print_word_line(word: &WordRecord) {
    let next = if word.interval == 0.0 {
        "now".to_string()
    } else {
        unix_ms_to_iso8601(word.next_review)
    };
    let definition = word.definition.as_deref().unwrap_or("-");
    println!(
        "{:<20} {:<8} interval={:<6} next={next}  {definition}",
        word.term,
        word.status.as_str(),
        word.interval,
    );
}

fn cmd_start(cli: &Cli, size: Option<usize>, cram: bool) -> Result<()> {
    let app = open_app(cli)?;
    let mut vocab = load_vocab(&app)?;

    if let Ok(Some(existing)) = app.store.load_session()
        && !existing.finished
    {
        println!("a session is already in progress — `lexdrill resume` or `lexdrill exit`");
        return Ok(());
    }

    let now = now_unix_ms();
    let n = size.unwrap_or(app.config.batch_size);
    let mut rng = SmallRng::from_os_rng();

    let selection = if cram {
        // Cram ignores the due cadence: sample from the whole vocabulary
        let mut ids: Vec<Uuid> = vocab.iter().map(|w| w.id).collect();
        ids.shuffle(&mut rng);
        ids.truncate(n);
        Selection::Ids(ids)
    } else {
        Selection::Count(n)
    };

    let due = due_words(&vocab, now);
    let session = match SessionState::start(selection, &due, cram, &mut rng) {
        Ok(s) => s,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    println!("starting session: {} word(s)", session.initial_count);
    drill::run(&app, &mut vocab, session, &mut std::io::stdin().lock())
}

fn cmd_resume(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    let mut vocab = load_vocab(&app)?;

    let Some(session) = app
        .store
        .load_session()
        .map_err(|e| anyhow::anyhow!("failed to load session: {e}"))?
    else {
        println!("no session to resume — `lexdrill start`");
        return Ok(());
    };
    if session.finished {
        println!("last session is finished — `lexdrill again` or `lexdrill next`");
        return Ok(());
    }

    println!(
        "resuming session: {}/{} done",
        session.completed_count(),
        session.initial_count
    );
    drill::run(&app, &mut vocab, session, &mut std::io::stdin().lock())
}

fn cmd_again(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    let mut vocab = load_vocab(&app)?;

    let Some(last) = app
        .store
        .load_session()
        .map_err(|e| anyhow::anyhow!("failed to load session: {e}"))?
    else {
        println!("no previous session — `lexdrill start`");
        return Ok(());
    };
    if !last.finished {
        println!("session still in progress — `lexdrill resume`");
        return Ok(());
    }

    let mut rng = SmallRng::from_os_rng();
    let session = match last.review_same_batch(&mut rng) {
        Ok(s) => s,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    println!("reviewing last batch: {} word(s)", session.initial_count);
    drill::run(&app, &mut vocab, session, &mut std::io::stdin().lock())
}

fn cmd_next(cli: &Cli, size: Option<usize>) -> Result<()> {
    let app = open_app(cli)?;
    let mut vocab = load_vocab(&app)?;
    let now = now_unix_ms();

    let Some(last) = app
        .store
        .load_session()
        .map_err(|e| anyhow::anyhow!("failed to load session: {e}"))?
    else {
        println!("no previous session — `lexdrill start`");
        return Ok(());
    };
    if !last.finished {
        println!("session still in progress — `lexdrill resume`");
        return Ok(());
    }

    let due = due_words(&vocab, now);
    let mut rng = SmallRng::from_os_rng();
    let session = match last.continue_with_next_batch(size, &due, &mut rng) {
        Ok(s) => s,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    println!("next batch: {} word(s)", session.initial_count);
    drill::run(&app, &mut vocab, session, &mut std::io::stdin().lock())
}

fn cmd_exit(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    app.store
        .clear_session()
        .map_err(|e| anyhow::anyhow!("failed to clear session: {e}"))?;
    println!("session discarded");
    Ok(())
}

fn cmd_stats(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    let vocab = load_vocab(&app)?;
    let now = now_unix_ms();

    let (new, learning, mastered) = vocab.status_counts();
    let points = app
        .store
        .points()
        .map_err(|e| anyhow::anyhow!("failed to load points: {e}"))?;

    println!("words:     {}", vocab.len());
    println!("  new:       {new}");
    println!("  learning:  {learning}");
    println!("  mastered:  {mastered}");
    println!("due now:   {}", lexdrill_core::due_count(&vocab, now));
    println!("points:    {points}");

    if let Ok(Some(session)) = app.store.load_session() {
        let state = if session.finished {
            "finished"
        } else {
            "in progress"
        };
        println!(
            "session:   {state} ({}/{} done)",
            session.completed_count(),
            session.initial_count
        );
    } else {
        println!("session:   none");
    }
    Ok(())
}

fn cmd_history(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    let history = app
        .store
        .history()
        .map_err(|e| anyhow::anyhow!("failed to load history: {e}"))?;

    if history.is_empty() {
        println!("no study history yet");
        return Ok(());
    }
    for (day, count) in &history {
        println!("{day}  {count}");
    }
    Ok(())
}

async fn cmd_enrich(cli: &Cli) -> Result<()> {
    let app = open_app(cli)?;
    let mut vocab = load_vocab(&app)?;

    let filled = enrich::enrich_missing(&app.store, &mut vocab).await?;
    if filled == 0 {
        println!("no definitions missing");
    } else {
        println!("filled {filled} definition(s)");
    }
    Ok(())
}

fn cmd_export(cli: &Cli, path: &Path) -> Result<()> {
    let app = open_app(cli)?;
    app.store
        .export_json_file(path, now_unix_ms())
        .map_err(|e| anyhow::anyhow!("export failed: {e}"))?;
    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(cli: &Cli, path: &Path) -> Result<()> {
    let app = open_app(cli)?;
    app.store
        .import_json_file(path)
        .map_err(|e| anyhow::anyhow!("import failed: {e}"))?;

    let vocab = load_vocab(&app)?;
    println!("imported from {}: {} word(s)", path.display(), vocab.len());
    Ok(())
}
