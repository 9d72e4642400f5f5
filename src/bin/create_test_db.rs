use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use spenn::{Identity, Transaction, create_transaction, get_or_create_user, initialize_db};

/// A utility for creating a test database for the REST API server of spenn.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    // Same user the server hands out in dev mode.
    let identity = Identity::stub();
    println!("Creating test user {}...", identity.email);
    let user = get_or_create_user(&identity.email, &conn)?;

    println!("Creating test transactions...");
    let samples = [
        (250_000, "Salary"),
        (-45_000, "Rent"),
        (-8_550, "Groceries"),
        (-1_200, "Coffee"),
    ];

    for (amount, description) in samples {
        create_transaction(Transaction::build(amount, description, user.id), &conn)?;
    }

    println!("Success!");

    Ok(())
}
