use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budget_tracker::{
    CategoryName, NewCategory, NewTransaction, NewUser, PasswordHash, TransactionType,
    ValidatedPassword, add_transaction, create_category, create_user, initialize_db,
};

/// A utility for creating a test database for the Budget Tracker server.
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

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("Passw0rd"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: EmailAddress::new_unchecked("test@example.com"),
            password_hash,
        },
        &conn,
    )?;

    println!("Creating categories...");

    let mut category_ids = Vec::new();
    for (name, planned_amount, transaction_type) in [
        ("Salary", 4000.0, TransactionType::Income),
        ("Freelance", 500.0, TransactionType::Income),
        ("Rent", 1600.0, TransactionType::Expense),
        ("Groceries", 600.0, TransactionType::Expense),
        ("Transport", 150.0, TransactionType::Expense),
        ("Entertainment", 200.0, TransactionType::Expense),
    ] {
        let category = create_category(
            user.id,
            NewCategory {
                name: CategoryName::new(name)?,
                planned_amount,
                transaction_type,
            },
            &conn,
        )?;
        category_ids.push(category.id);
    }

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let transactions = [
        (4000.0, 0, "Monthly pay", 28),
        (350.0, 1, "Logo design", 20),
        (1600.0, 2, "Rent", 27),
        (142.35, 3, "Weekly shop", 21),
        (168.9, 3, "Weekly shop", 14),
        (155.2, 3, "Weekly shop", 7),
        (173.45, 3, "Weekly shop", 0),
        (60.0, 4, "Bus pass top up", 18),
        (95.0, 4, "Petrol", 4),
        (45.0, 5, "Movie night", 12),
        (180.0, 5, "Concert tickets", 3),
    ];

    for (amount, category_index, description, days_ago) in transactions {
        add_transaction(
            user.id,
            NewTransaction {
                amount,
                category_id: category_ids[category_index],
                description: description.to_owned(),
                date: today - Duration::days(days_ago),
            },
            &conn,
        )?;
    }

    println!("Success! Log in with test@example.com and the password Passw0rd.");

    Ok(())
}
