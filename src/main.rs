use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};

use wordpilot::app::App;
use wordpilot::config::Config;
use wordpilot::event::{AppEvent, EventHandler};
use wordpilot::lexicon::LexiconStore;
use wordpilot::lexicon::fetch::fetch_url;
use wordpilot::picker::{Constraint, LengthBias, WordPicker};
use wordpilot::sink::JsonLineSink;
use wordpilot::store::json_store::{self, JsonStore};

#[derive(Parser)]
#[command(
    name = "wordpilot",
    version,
    about = "Word picker and typing autopilot for syllable word games"
)]
struct Cli {
    #[arg(long, global = true, help = "Word list URL (overrides config)")]
    wordlist_url: Option<String>,

    #[arg(long, global = true, help = "Directory for answers and learned words")]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Debug logging on stderr")]
    verbose: bool,

    #[arg(long, global = true, help = "Skip the remote answer sync")]
    no_sync: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read game events from stdin and write actions to stdout (default).
    Run,
    /// Print suggestions for a syllable.
    Pick {
        syllable: String,
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
        #[arg(long, default_value_t = 3)]
        min: usize,
        #[arg(long, default_value_t = 30)]
        max: usize,
        #[arg(long, default_value = "none", value_parser = parse_bias)]
        bias: LengthBias,
        #[arg(long, help = "Group suggestions by length")]
        categories: bool,
    },
    /// Write answers and learned words to a JSON file.
    Export { path: PathBuf },
    /// Merge a previously exported JSON file.
    Import { path: PathBuf },
    /// Show what is stored.
    Stats,
}

fn parse_bias(s: &str) -> Result<LengthBias, String> {
    match s.to_ascii_lowercase().as_str() {
        "none" => Ok(LengthBias::None),
        "shortest" => Ok(LengthBias::Shortest),
        "longest" => Ok(LengthBias::Longest),
        other => Err(format!("unknown length bias '{other}'")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    if let Some(url) = cli.wordlist_url.clone() {
        config.wordlist_url = Some(url);
    }
    config.validate();

    let store = match &cli.data_dir {
        Some(dir) => JsonStore::with_base_dir(dir.clone()),
        None => JsonStore::new(),
    };
    let store = match store {
        Ok(store) => Some(store),
        Err(err) => {
            warn!("persistence disabled: {err:#}");
            None
        }
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config, store, cli.no_sync),
        Command::Pick {
            syllable,
            count,
            min,
            max,
            bias,
            categories,
        } => {
            let lexicon = Arc::new(LexiconStore::http(config.wordlist_url.clone()));
            lexicon.load_wordlist(None);
            let mut picker = WordPicker::new(lexicon, config.word_frequency_enabled);
            if categories {
                let found = picker.pick_by_category(&syllable, false, false);
                println!("short:  {}", found.short.join(" "));
                println!("medium: {}", found.medium.join(" "));
                println!("long:   {}", found.long.join(" "));
            } else {
                let constraint = Constraint {
                    exclude_used: false,
                    prefer_coverage: false,
                    length_bias: bias,
                    ..Constraint::new(&syllable).lengths(min, max).count(count)
                };
                for word in picker.pick_words(&constraint) {
                    println!("{word}");
                }
            }
            Ok(())
        }
        Command::Export { path } => {
            let store = require_store(store)?;
            json_store::write_export(&path, &store.export_all())?;
            info!("exported to {}", path.display());
            Ok(())
        }
        Command::Import { path } => {
            let data = json_store::read_export(&path)?;
            let lexicon = Arc::new(LexiconStore::http(config.wordlist_url.clone()));
            let mut app = App::new(config, lexicon, Some(require_store(store)?));
            let added = app.import_data(&data);
            println!("imported {added} entries");
            Ok(())
        }
        Command::Stats => {
            let store = require_store(store)?;
            let lexicon = Arc::new(LexiconStore::http(config.wordlist_url.clone()));
            let app = App::new(config, lexicon, Some(store));
            let stats = app.answers.stats();
            println!("answers:  {}", stats.total_answers);
            println!("aliases:  {}", stats.total_aliases);
            match stats.last_fetch {
                Some(at) => println!("synced:   {}", at.format("%Y-%m-%d %H:%M UTC")),
                None => println!("synced:   never"),
            }
            for (dictionary, count) in app.learned.stats() {
                println!("learned ({dictionary}): {count}");
            }
            Ok(())
        }
    }
}

fn require_store(store: Option<JsonStore>) -> Result<JsonStore> {
    store.ok_or_else(|| anyhow::anyhow!("no data directory available"))
}

fn run(config: Config, store: Option<JsonStore>, no_sync: bool) -> Result<()> {
    let lexicon = Arc::new(LexiconStore::http(config.wordlist_url.clone()));
    let answers_url = config.answers_url.clone();
    let mut app = App::new(config, Arc::clone(&lexicon), store);

    // Warm the word list in the background; picks return nothing until it lands.
    thread::spawn(move || {
        let words = lexicon.load_wordlist(None);
        info!("word list ready: {} words", words.len());
    });

    let events = EventHandler::new(BufReader::new(io::stdin()));

    if !no_sync && app.answer_sync_due() {
        let tx = events.sender();
        thread::spawn(move || match fetch_url(&answers_url) {
            Ok(text) => {
                let _ = tx.send(AppEvent::AnswersFetched(text));
            }
            Err(err) => warn!("answer sync failed: {err}"),
        });
    }

    let mut sink = JsonLineSink::new(io::stdout());
    info!("waiting for game events on stdin");

    while !app.should_quit {
        app.tick(Instant::now(), &mut sink);
        let timeout = app
            .next_deadline()
            .map(|at| at.saturating_duration_since(Instant::now()));
        if let Some(event) = events.next(timeout)? {
            app.handle_app_event(event, Instant::now());
        }
    }

    app.save_data();
    Ok(())
}
