use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use finance_tracker::{NewTransaction, TransactionType, create_transaction, initialize_db};

/// A utility for creating a test database for the REST API server of finance_tracker.
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

    println!("Creating test transactions...");

    let samples = [
        ("Salary", 4200.0, TransactionType::Income, "Salary", date!(2025 - 09 - 01)),
        ("Rent", 1650.0, TransactionType::Expense, "Rent", date!(2025 - 09 - 02)),
        ("Groceries", 143.27, TransactionType::Expense, "Food", date!(2025 - 09 - 06)),
        ("Bus pass", 60.0, TransactionType::Expense, "Transport", date!(2025 - 09 - 08)),
        ("Power bill", 112.4, TransactionType::Expense, "Bills", date!(2025 - 09 - 15)),
        ("Sold old bike", 250.0, TransactionType::Income, "Other", date!(2025 - 09 - 20)),
    ];

    for (title, amount, transaction_type, category, transaction_date) in samples {
        create_transaction(
            NewTransaction {
                title: title.to_owned(),
                amount,
                transaction_type,
                category: category.to_owned(),
                transaction_date,
                archived: false,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
