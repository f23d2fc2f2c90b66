//! CSV transaction import.
//!
//! Expects a header row with `date,amount` and optional `merchant`,
//! `category` and `description` columns. Rows without a category (or
//! labelled "Uncategorized") get one from [`CATEGORY_RULES`] when the
//! merchant matches a keyword.

use std::{error::Error, io::Read};

use engine::{MoneyCents, Transaction, UNCATEGORIZED_NAME, parse_date};
use serde::Deserialize;

/// Merchant keywords (lowercase substrings) and the category they imply.
/// First match wins.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("Coffee", &["starbucks", "dunkin"]),
    ("Transportation", &["uber", "lyft"]),
    ("Groceries", &["whole foods", "trader joes", "kroger", "aldi"]),
    (
        "Dining",
        &["mcdonalds", "chipotle", "dominos", "ubereats", "doordash"],
    ),
    ("Fuel", &["shell", "chevron", "bp"]),
    ("Entertainment", &["netflix", "spotify", "hulu"]),
    ("Utilities", &["verizon", "comcast", "att"]),
];

#[derive(Debug, Deserialize)]
struct ImportRow {
    date: String,
    amount: String,
    #[serde(default)]
    merchant: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn category_for_merchant(merchant: &str) -> Option<&'static str> {
    let merchant = merchant.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| merchant.contains(keyword)))
        .map(|(category, _)| *category)
}

/// Keeps an explicit label; otherwise asks the merchant rules.
fn pick_category(category: Option<String>, merchant: Option<&str>) -> Option<String> {
    let explicit = category
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty() && !label.eq_ignore_ascii_case(UNCATEGORIZED_NAME));
    explicit.or_else(|| merchant.and_then(category_for_merchant).map(str::to_string))
}

/// Parses every row before anything is written, so a bad line rejects the
/// whole file. Each transaction carries an import key so the same row is
/// not stored twice.
pub fn read_transactions<R: Read>(
    user_id: i64,
    input: R,
) -> Result<Vec<Transaction>, Box<dyn Error + Send + Sync>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut transactions = Vec::new();
    for (idx, row) in reader.deserialize::<ImportRow>().enumerate() {
        let line = idx + 2;
        let row = row.map_err(|err| format!("line {line}: {err}"))?;
        let occurred_on =
            parse_date("date", &row.date).map_err(|err| format!("line {line}: {err}"))?;
        let amount: MoneyCents = row
            .amount
            .parse()
            .map_err(|err| format!("line {line}: {err}"))?;
        let category = pick_category(row.category, row.merchant.as_deref());
        let transaction = Transaction::new(user_id, occurred_on, amount, category)
            .map_err(|err| format!("line {line}: {err}"))?
            .with_details(row.merchant, row.description)
            .imported();
        transactions.push(transaction);
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_with_optional_category() {
        let data = "date,amount,category\n\
                    2024-03-05,-40.00,Food\n\
                    2024-03-10, 2000 ,\n";
        let rows = read_transactions(7, data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, 7);
        assert_eq!(rows[0].amount, MoneyCents::new(-4000));
        assert_eq!(rows[0].category.as_deref(), Some("Food"));
        assert_eq!(rows[1].amount, MoneyCents::new(200_000));
        assert_eq!(rows[1].category, None);
    }

    #[test]
    fn merchant_rules_fill_missing_category() {
        let data = "date,amount,merchant,category,description\n\
                    2024-03-05,-4.50,Starbucks #42,,latte\n\
                    2024-03-06,-12.00,UBER *TRIP,Uncategorized,\n\
                    2024-03-07,-30.00,Kroger,Party,\n\
                    2024-03-08,-9.99,Corner Shop,,\n";
        let rows = read_transactions(1, data.as_bytes()).unwrap();

        let categories: Vec<Option<&str>> = rows.iter().map(|r| r.category.as_deref()).collect();
        assert_eq!(
            categories,
            vec![Some("Coffee"), Some("Transportation"), Some("Party"), None]
        );
        assert_eq!(rows[0].merchant.as_deref(), Some("Starbucks #42"));
        assert_eq!(rows[0].description.as_deref(), Some("latte"));
        assert_eq!(rows[1].description, None);
    }

    #[test]
    fn same_file_yields_same_import_keys() {
        let data = "date,amount,merchant\n2024-03-05,-4.50,Starbucks\n";
        let first = read_transactions(1, data.as_bytes()).unwrap();
        let second = read_transactions(1, data.as_bytes()).unwrap();

        assert_ne!(first[0].id, second[0].id);
        assert!(first[0].import_key.is_some());
        assert_eq!(first[0].import_key, second[0].import_key);
    }

    #[test]
    fn bad_line_is_reported_with_its_number() {
        let data = "date,amount,category\n\
                    2024-03-05,-40,Food\n\
                    05/03/2024,-40,Food\n";
        let err = read_transactions(1, data.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("line 3:"));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let data = "date,amount,category\n2024-03-05,0,Food\n";
        assert!(read_transactions(1, data.as_bytes()).is_err());
    }
}
