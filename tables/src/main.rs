//! Assoc CLI - read and check associations game tables
//!
//! ```bash
//! assoc parse table.csv             # Raw CSV rows as JSON
//! assoc validate table.csv          # Validated table as JSON
//! assoc check cat Cat feline        # Is "cat" an acceptable answer?
//! assoc normalize b A a c           # Normalized answer list
//! assoc play table.csv              # Play a table in the terminal
//! assoc serve                       # Start HTTP server
//! ```

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use assoc::config::LoadOptions;
use assoc::loader::{load_table_file, parse_raw, with_path_origin};
use assoc::models::parse_cell_label;
use assoc::{fix_acceptables, is_acceptable, Game, Guess, ServerConfig, Track};

#[derive(Parser)]
#[command(name = "assoc")]
#[command(about = "Read and validate associations game tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input CSV file
    input: PathBuf,

    /// Lines preceding the table in its source (shifts error positions)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,

    /// Force an encoding (auto-detect if not specified)
    #[arg(short, long)]
    encoding: Option<String>,
}

impl InputArgs {
    fn options(&self) -> LoadOptions {
        with_path_origin(
            LoadOptions::default()
                .with_line_offset(self.offset)
                .with_encoding(self.encoding.clone()),
            &self.input,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a CSV file and output its rows as JSON
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a table and output it as JSON
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether a guess matches any of the answers
    Check {
        guess: String,

        #[arg(required = true)]
        answers: Vec<String>,
    },

    /// Normalize an answer list (first answer is canonical)
    Normalize {
        answers: Vec<String>,
    },

    /// Play a table interactively
    Play {
        #[command(flatten)]
        input: InputArgs,

        /// Seed for shuffling (random if not specified)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $ASSOC_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),
        Commands::Validate { input, output } => cmd_validate(&input, output.as_deref()),
        Commands::Check { guess, answers } => cmd_check(&guess, &answers),
        Commands::Normalize { answers } => cmd_normalize(&answers),
        Commands::Play { input, seed } => cmd_play(&input, seed),
        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &InputArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(&input.input)?;
    let result = parse_raw(&bytes, &input.options())?;

    eprintln!("Encoding: {}", result.encoding);
    eprintln!("Parsed {} rows", result.rows.len());

    let json = serde_json::to_string_pretty(&result.rows)?;
    write_output(&json, output)
}

fn cmd_validate(input: &InputArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_table_file(&input.input, input.options())?;

    let json = serde_json::to_string_pretty(&loaded.table.to_labeled_json())?;
    write_output(&json, output)
}

fn cmd_check(guess: &str, answers: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if is_acceptable(guess, answers) {
        println!("acceptable");
        Ok(())
    } else {
        println!("not acceptable");
        std::process::exit(2);
    }
}

fn cmd_normalize(answers: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(&fix_acceptables(answers))?);
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = port {
        config.port = port;
    }
    assoc::server::start_server(config).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

// =============================================================================
// Interactive play
// =============================================================================

const PLAY_HELP: &str = "\
Commands:
  open <cell>           open a cell, e.g. open B3
  guess <A-D|sol> <..>  guess a column or the final solution
  hint <A-D|sol>        show a masked answer
  give-up               reveal everything
  quit";

fn cmd_play(input: &InputArgs, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_table_file(&input.input, input.options())?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::shuffled(loaded.table, &mut rng);

    println!("{}", PLAY_HELP);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    while !game.is_finished() {
        print_board(&game);
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        let outcome = match command {
            "open" => match parse_cell_label(rest.trim()) {
                Some((column, row)) => game
                    .open_cell(column, row)
                    .map(|text| format!("{}: {}", rest.trim().to_uppercase(), text))
                    .map_err(|e| e.to_string()),
                None => Err(format!("Unknown cell: {}", rest)),
            },
            "guess" => {
                let (label, text) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
                match Track::from_label(label) {
                    Some(track) => match game.guess(track, text) {
                        Ok(Guess::Correct) => Ok(format!("Correct! {} solved", track)),
                        Ok(Guess::Wrong) => Ok("Wrong".to_string()),
                        Err(e) => Err(e.to_string()),
                    },
                    None => Err(format!("Unknown track: {}", label)),
                }
            }
            "hint" => Track::from_label(rest.trim())
                .map(|track| game.hint(track))
                .ok_or_else(|| format!("Unknown track: {}", rest)),
            "give-up" => game
                .give_up()
                .map(|_| "Revealed".to_string())
                .map_err(|e| e.to_string()),
            "quit" => break,
            "" => continue,
            _ => Err(PLAY_HELP.to_string()),
        };

        match outcome {
            Ok(msg) => println!("{}", msg),
            Err(msg) => println!("{}", msg),
        }
    }

    print_board(&game);
    Ok(())
}

fn print_board(game: &Game) {
    use assoc::{Column, Row};

    for row in Row::ALL {
        let cells: Vec<String> = Column::ALL
            .iter()
            .map(|&column| format!("{:<14}", game.visible_cell(column, row).unwrap_or("?")))
            .collect();
        println!("{} {}", row, cells.join(" "));
    }

    let answers: Vec<String> = Column::ALL
        .iter()
        .map(|&column| {
            let answer = game.visible_answer(Track::Column(column)).unwrap_or("?");
            format!("{:<14}", answer)
        })
        .collect();
    println!("= {}", answers.join(" "));
    println!(
        "{}: {}",
        Track::Final.label(),
        game.visible_answer(Track::Final).unwrap_or("?")
    );
}
