use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
mod auth;
use secure_blocks::{
    Codec, Config, Storage, config::default_config_path, document, is_encrypted_block, locate,
};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn resolve_config(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => Ok(Storage::new(default_config_path()?)),
    }
}

/// Reads FILE, or all of stdin when no file is given.
fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => Storage::new(path).load_text(),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("SECURE_BLOCKS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug, Parser)]
#[command(name = "secure-blocks")]
#[command(
    version,
    about = "Encrypt text into password-protected blocks that can live inside plain-text documents.",
    after_help = "When stdin is piped and SECURE_BLOCKS_PASSWORD is unset, the first line of stdin is the password."
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH", env = "SECURE_BLOCKS_CONFIG")]
    config: Option<PathBuf>,

    /// PBKDF2 iterations for new blocks and legacy blocks (clamped to 100000-10000000)
    #[arg(long, global = true, env = "SECURE_BLOCKS_ITERATIONS")]
    iterations: Option<u32>,

    /// Largest block accepted for decryption in MB (clamped to 1-100)
    #[arg(long = "max-size-mb", global = true, env = "SECURE_BLOCKS_MAX_SIZE_MB")]
    max_size_mb: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a file or stdin and prints the block
    Encrypt {
        /// File to encrypt (stdin if omitted)
        file: Option<PathBuf>,

        /// Also copy the block to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Decrypts the block nearest to an offset and prints the plaintext
    Decrypt {
        /// Document containing the block (stdin if omitted)
        file: Option<PathBuf>,

        /// Byte offset used to pick a block when there are several
        #[arg(long, default_value_t = 0)]
        at: usize,
    },

    /// Encrypts or decrypts a selection, block or whole document in place
    #[command(arg_required_else_help = true)]
    Toggle {
        file: PathBuf,

        /// Selection start (byte offset); alone it acts as the cursor
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Selection end (byte offset)
        #[arg(long)]
        to: Option<usize>,

        /// Encrypt or decrypt the entire file, ignoring blocks inside it
        #[arg(long, conflicts_with_all = ["from", "to"])]
        whole: bool,
    },

    /// Prints whether a document is a single encrypted block
    Check {
        /// Document to inspect (stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Shows or updates the stored configuration
    Config {
        #[arg(long)]
        set_iterations: Option<u32>,

        #[arg(long)]
        set_max_size_mb: Option<u32>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = Cli::parse();
    let config_storage = resolve_config(args.config.clone())?;

    let mut config = Config::load(&config_storage)?;
    if let Some(iterations) = args.iterations {
        config = config.with_iterations(iterations);
    }
    if let Some(max_size_mb) = args.max_size_mb {
        config = config.with_max_decrypt_size_mb(max_size_mb);
    }
    let codec = Codec::new(config);

    match args.command {
        Commands::Encrypt { file, copy } => {
            let password = auth::read_new_password_with_confirmation()?;
            let text = read_input(file)?;
            let block = codec.encrypt(&text, &password)?;
            println!("{block}");

            if copy {
                arboard::Clipboard::new()
                    .and_then(|mut clipboard| clipboard.set_text(block))
                    .context("failed to copy block to clipboard")?;
                eprintln!("block copied to clipboard");
            }
        }
        Commands::Decrypt { file, at } => {
            let password = auth::read_password()?;
            let text = read_input(file)?;
            let range = locate::block_range(&text, at, at).context("no secure block found")?;
            let plain = codec.decrypt(range.block, &password)?;
            println!("{plain}");
        }
        Commands::Toggle {
            file,
            from,
            to,
            whole,
        } => {
            let storage = Storage::new(file);
            let text = storage.load_text()?;
            let password = auth::read_password()?;

            let toggled = if whole {
                document::toggle_file(&codec, &text, &password)?
            } else {
                document::toggle(&codec, &text, from..to.unwrap_or(from), &password)?
            };
            storage.save(toggled.text.as_bytes())?;
            println!("{}", toggled.outcome.message());
        }
        Commands::Check { file } => {
            let text = read_input(file)?;
            if is_encrypted_block(&text) {
                println!("encrypted");
            } else {
                println!("plain");
            }
        }
        Commands::Config {
            set_iterations,
            set_max_size_mb,
        } => {
            if set_iterations.is_some() || set_max_size_mb.is_some() {
                let mut stored = Config::load(&config_storage)?;
                if let Some(iterations) = set_iterations {
                    stored = stored.with_iterations(iterations);
                }
                if let Some(max_size_mb) = set_max_size_mb {
                    stored = stored.with_max_decrypt_size_mb(max_size_mb);
                }
                stored.save(&config_storage)?;
                config = stored;
                println!("configuration saved");
            }

            println!("config file:      {}", config_storage.path().display());
            println!("iterations:       {}", config.iterations());
            println!("max decrypt size: {} MB", config.max_decrypt_size_mb());
        }
    }

    Ok(())
}
