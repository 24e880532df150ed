use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use spendwise::{
    CategoryName, NewTransaction, PasswordHash, create_category, create_transaction, create_user,
    initialize_db,
};

/// A utility for creating a test database for the Spendwise server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The database has one user, "test@example.com" with the password "test", with a few
/// categories and transactions.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let password_hash = PasswordHash::from_raw_password("test", PasswordHash::DEFAULT_COST)?;
    let user = create_user("test@example.com", password_hash, &conn)?;

    println!("Creating categories and transactions...");
    for (name, amount, date) in [
        ("Food", "42.50", "2024-03-02"),
        ("Rent", "1200", "2024-03-01"),
        ("Transport", "18.20", "2024-03-05"),
    ] {
        let category = create_category(CategoryName::new(name)?, user.id, &conn)?;
        let transaction = NewTransaction::parse(amount, &category.id.to_string(), date, "")?;
        create_transaction(user.id, &transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}
