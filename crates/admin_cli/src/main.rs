use std::{error::Error, fs::File, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use engine::{MoneyCents, SqlLedgerStore, Transaction, parse_date, parse_month};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

mod import;

#[derive(Parser, Debug)]
#[command(name = "tally_admin")]
#[command(about = "Admin utilities for Tally (seed categories, budgets and transactions)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./tally.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Category(Category),
    Budget(Budget),
    Tx(Tx),
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    List,
    Create(CategoryCreateArgs),
    /// Map an extra label onto an existing category.
    Alias(CategoryAliasArgs),
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct CategoryAliasArgs {
    /// Name (or existing alias) of the target category.
    #[arg(long)]
    category: String,
    #[arg(long)]
    alias: String,
}

#[derive(Args, Debug)]
struct Budget {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Set a monthly limit, effective from `--month` onwards.
    Set(BudgetSetArgs),
}

#[derive(Args, Debug)]
struct BudgetSetArgs {
    #[arg(long)]
    user: i64,
    #[arg(long)]
    category: String,
    /// `YYYY-MM`
    #[arg(long)]
    month: String,
    /// Decimal amount, e.g. `250.00`.
    #[arg(long)]
    limit: String,
    /// Overwrite an existing limit for the same month.
    #[arg(long)]
    replace: bool,
}

#[derive(Args, Debug)]
struct Tx {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Add(TxAddArgs),
    /// Import a CSV file with `date,amount[,merchant,category,description]` columns.
    Import(TxImportArgs),
}

#[derive(Args, Debug)]
struct TxAddArgs {
    #[arg(long)]
    user: i64,
    /// `YYYY-MM-DD`
    #[arg(long)]
    date: String,
    /// Signed decimal amount; negative for expenses.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Debug)]
struct TxImportArgs {
    #[arg(long)]
    user: i64,
    path: PathBuf,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn parse_amount(raw: &str) -> MoneyCents {
    match raw.parse() {
        Ok(amount) => amount,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let store = SqlLedgerStore::new(db);

    match cli.command {
        Command::Category(Category {
            command: CategoryCommand::List,
        }) => {
            for category in store.list_categories().await? {
                let marker = if category.is_system { " (system)" } else { "" };
                println!("{}\t{}{marker}", category.id, category.name);
            }
        }
        Command::Category(Category {
            command: CategoryCommand::Create(args),
        }) => {
            let category = store.create_category(&args.name).await?;
            println!("created category: {} ({})", category.name, category.id);
        }
        Command::Category(Category {
            command: CategoryCommand::Alias(args),
        }) => {
            let category = match store.find_category(&args.category).await {
                Ok(category) => category,
                Err(err) => {
                    eprintln!("category not found: {} ({err})", args.category);
                    std::process::exit(1);
                }
            };
            let alias = store.create_alias(&args.alias, category.id).await?;
            println!("created alias: {} -> {}", alias.alias, category.name);
        }
        Command::Budget(Budget {
            command: BudgetCommand::Set(args),
        }) => {
            let month = match parse_month(&args.month) {
                Ok(month) => month,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let limit = parse_amount(&args.limit);
            let category = match store.find_category(&args.category).await {
                Ok(category) => category,
                Err(err) => {
                    eprintln!("category not found: {} ({err})", args.category);
                    std::process::exit(1);
                }
            };

            let budget = store
                .set_budget(args.user, category.id, month, limit, args.replace)
                .await?;
            println!(
                "budget set: {} {} = {}",
                budget.category_name,
                budget.month.format("%Y-%m"),
                budget.limit
            );
        }
        Command::Tx(Tx {
            command: TxCommand::Add(args),
        }) => {
            let occurred_on = match parse_date("date", &args.date) {
                Ok(date) => date,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let amount = parse_amount(&args.amount);
            let transaction = Transaction::new(args.user, occurred_on, amount, args.category)?;
            let id = store.record_transaction(&transaction).await?;
            println!("recorded transaction: {id}");
        }
        Command::Tx(Tx {
            command: TxCommand::Import(args),
        }) => {
            let file = File::open(&args.path)?;
            let transactions = match import::read_transactions(args.user, file) {
                Ok(transactions) => transactions,
                Err(err) => {
                    eprintln!("{}: {err}", args.path.display());
                    std::process::exit(2);
                }
            };
            let outcome = store.record_transactions(&transactions).await?;
            println!(
                "imported {} transactions, skipped {} duplicates",
                outcome.inserted, outcome.skipped
            );
        }
    }

    Ok(())
}
