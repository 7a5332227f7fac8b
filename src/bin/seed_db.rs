use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use sales_dashboard::{
    DEFAULT_SEED_URL, SeedSource, Transaction, count_transactions, fetch_seed_transactions,
    initialize_db, replace_all_transactions,
};

/// A utility for loading the seed dataset into a database for the sales dashboard server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path of the SQLite database to load the transactions into.
    #[arg(long, short)]
    db_path: String,

    /// A local JSON file with the seed dataset. When omitted, the dataset is
    /// downloaded from `--seed-url`.
    #[arg(long, short)]
    input_path: Option<String>,

    /// The URL of the JSON seed dataset.
    #[arg(long, env = "SEED_URL", default_value = DEFAULT_SEED_URL)]
    seed_url: String,
}

/// Replace the transactions in a database with the seed dataset.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let transactions = match &args.input_path {
        Some(input_path) => {
            let input_path = Path::new(input_path);

            if !input_path.is_file() {
                eprintln!("No file found at {input_path:#?}!");
                exit(1);
            }

            println!("Reading transactions from {input_path:#?}");
            let text = fs::read_to_string(input_path)?;
            serde_json::from_str::<Vec<Transaction>>(&text)?
        }
        None => {
            println!("Downloading transactions from {}", args.seed_url);
            let source = SeedSource {
                url: args.seed_url.clone(),
                client: reqwest::Client::new(),
            };
            fetch_seed_transactions(&source).await?
        }
    };

    println!("Loading {} transactions into {}", transactions.len(), args.db_path);
    let mut conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;
    replace_all_transactions(&transactions, &mut conn)?;

    println!("Success! The database holds {} transactions.", count_transactions(&conn)?);

    Ok(())
}
