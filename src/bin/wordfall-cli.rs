//! WORDFALL CLI
//!
//! Interactive query shell over a loaded embedding table.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wordfall::loader::{self, clean_word, LoadedEmbeddings};
use wordfall::{Axis, EmbeddingError, EmbeddingStore, EmbeddingTable, StoreConfig};

/// WORDFALL - Embedding Query Shell
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Word2vec text embeddings file
    #[arg(short, long, conflicts_with_all = ["words", "values"])]
    embeddings: Option<PathBuf>,

    /// Words manifest (JSON string array or one word per line)
    #[arg(long, requires = "values")]
    words: Option<PathBuf>,

    /// Little-endian f32 value buffer matching the words manifest
    #[arg(long, requires = "words")]
    values: Option<PathBuf>,

    /// Default neighbor count for RAIN
    #[arg(short, long, default_value_t = 30)]
    neighbors: usize,

    /// Keep raw vector magnitudes instead of unit-normalizing rows
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Number of scan worker threads (0 = auto-detect)
    #[arg(long, default_value_t = 0)]
    scan_workers: usize,
}

/// The axis set the installation runs with
const DEFAULT_AXES: [(&str, &str); 4] = [
    ("life", "death"),
    ("machine", "human"),
    ("expensive", "cheap"),
    ("new", "old"),
];

/// Parsed REPL command
#[derive(Debug)]
enum Command {
    Exists { word: String },
    Nearest { word: String, k: usize },
    Project {
        word: String,
        left: String,
        right: String,
    },
    Rain {
        word: String,
        left: String,
        right: String,
        k: usize,
    },
    Axes,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordfall=info".parse()?))
        .init();

    let args = Args::parse();

    let loaded = load_embeddings(&args)?;
    info!(
        "Loaded {} words with dimension {}",
        loaded.words.len(),
        loaded.dim()
    );

    let table = EmbeddingTable::new(loaded.words, loaded.values)?;
    let config = StoreConfig::default()
        .with_normalize_on_load(!args.raw)
        .with_scan_workers(args.scan_workers);
    let store = EmbeddingStore::new(table, config);

    println!(
        "{} words ready. Type 'help' for available commands, 'quit' to exit.\n",
        store.len()
    );

    loop {
        print!("wordfall> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            print_help(args.neighbors);
            continue;
        }

        match parse_command(input, args.neighbors) {
            Ok(cmd) => {
                if let Err(e) = run_command(&store, cmd) {
                    match e {
                        EmbeddingError::UnknownWord { word } => {
                            eprintln!("word not found: {}", word);
                        }
                        other => eprintln!("Error: {}", other),
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
    }

    Ok(())
}

fn load_embeddings(args: &Args) -> anyhow::Result<LoadedEmbeddings> {
    match (&args.embeddings, &args.words, &args.values) {
        (Some(path), _, _) => Ok(loader::load_word2vec_text(path)?),
        (None, Some(words), Some(values)) => Ok(loader::load_split(words, values)?),
        _ => anyhow::bail!("Provide --embeddings <file> or --words <file> --values <file>"),
    }
}

fn parse_command(input: &str, default_k: usize) -> anyhow::Result<Command> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    let cmd = parts[0].to_uppercase();

    match cmd.as_str() {
        "EXISTS" => {
            if parts.len() < 2 {
                anyhow::bail!("EXISTS requires a word: EXISTS <word>");
            }
            Ok(Command::Exists {
                word: clean_word(parts[1]),
            })
        }

        "NEAREST" => {
            if parts.len() < 2 {
                anyhow::bail!("NEAREST requires a word: NEAREST <word> [k]");
            }
            let k = if parts.len() > 2 {
                parts[2].parse::<usize>()?
            } else {
                default_k
            };
            Ok(Command::Nearest {
                word: clean_word(parts[1]),
                k,
            })
        }

        "PROJECT" => {
            if parts.len() < 4 {
                anyhow::bail!("PROJECT requires three words: PROJECT <word> <left> <right>");
            }
            Ok(Command::Project {
                word: clean_word(parts[1]),
                left: clean_word(parts[2]),
                right: clean_word(parts[3]),
            })
        }

        "RAIN" => {
            if parts.len() < 4 {
                anyhow::bail!("RAIN requires three words: RAIN <word> <left> <right> [k]");
            }
            let k = if parts.len() > 4 {
                parts[4].parse::<usize>()?
            } else {
                default_k
            };
            Ok(Command::Rain {
                word: clean_word(parts[1]),
                left: clean_word(parts[2]),
                right: clean_word(parts[3]),
                k,
            })
        }

        "AXES" => Ok(Command::Axes),

        _ => anyhow::bail!("Unknown command: {}. Type 'help' for available commands.", cmd),
    }
}

fn run_command(store: &EmbeddingStore, cmd: Command) -> Result<(), EmbeddingError> {
    match cmd {
        Command::Exists { word } => {
            println!("{}", store.has_word(&word));
        }

        Command::Nearest { word, k } => {
            for (rank, neighbor) in store.nearest(&word, k)?.iter().enumerate() {
                println!("{:>3}  {}", rank + 1, neighbor);
            }
        }

        Command::Project { word, left, right } => {
            let projection = store.project(&word, &left, &right)?;
            println!("{:+.4}  ({} <-> {})", projection, left, right);
        }

        Command::Rain {
            word,
            left,
            right,
            k,
        } => {
            for projected in store.project_nearest(&word, &left, &right, k)? {
                println!("{:+.4}  {}", projected.projection, projected.word);
            }
        }

        Command::Axes => {
            let axes: Vec<Axis> = DEFAULT_AXES
                .iter()
                .filter(|(left, right)| store.has_word(left) && store.has_word(right))
                .map(|(left, right)| Axis::new(*left, *right))
                .collect();
            if axes.is_empty() {
                println!("none of the default axis words are in this vocabulary");
                return Ok(());
            }
            let norms = store.axis_norms(&axes)?;
            for (axis, norm) in axes.iter().zip(norms.iter()) {
                println!("{:>10} <-> {:<10}  norm {:+.4}", axis.left, axis.right, norm);
            }
        }
    }
    Ok(())
}

fn print_help(default_k: usize) {
    println!(
        r#"
Available commands:

  EXISTS <word>                  - Check if a word is in the vocabulary
  NEAREST <word> [k]             - Top k most similar words (default {default_k})
  PROJECT <word> <left> <right>  - Projection onto the left->right axis
  RAIN <word> <left> <right> [k] - Neighbors ranked along the axis
  AXES                           - Vocabulary norm of each default axis

  help                           - Show this help
  quit / exit                    - Exit the shell

Examples:
  NEAREST doctor 10
  PROJECT doctor he she
  RAIN doctor expensive cheap 15
"#
    );
}
