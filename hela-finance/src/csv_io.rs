//! CSV export and import of transactions.
//!
//! Export writes:
//!   id,date,amount,category,channel,description
//!
//! Import matches columns by header name (any order, case-insensitive).
//! `date`, `amount` and `description` are required; `category` and
//! `channel` fall back to a keyword suggestion and the caller's default.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use hela_core::{Category, NewTransaction, PaymentChannel, TransactionRecord, categorize};
use rust_decimal::Decimal;

const HEADER: [&str; 6] = ["id", "date", "amount", "category", "channel", "description"];

pub fn export_csv<W: Write>(records: &[TransactionRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for r in records {
        let date = r.date.format("%Y-%m-%d").to_string();
        let amount = r.amount.to_string();
        wtr.write_record([
            r.id.as_str(),
            date.as_str(),
            amount.as_str(),
            r.category.label(),
            r.channel.label(),
            r.description.as_str(),
        ])?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    Decimal::from_str(&cleaned).map_err(|e| anyhow!("invalid amount '{raw}': {e}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| anyhow!("invalid date '{raw}' (expected YYYY-MM-DD or DD/MM/YYYY)"))
}

/// Read transaction drafts from CSV. Blank rows are skipped; the first bad
/// row aborts the import with its row number.
pub fn import_csv<R: Read>(reader: R, default_channel: PaymentChannel) -> Result<Vec<NewTransaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: HashMap<String, usize> = rdr
        .headers()
        .context("reading CSV header")?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase(), i))
        .collect();

    for required in ["date", "amount", "description"] {
        if !columns.contains_key(required) {
            bail!("CSV is missing a '{required}' column");
        }
    }

    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // Header is line 1
        let line = i + 2;
        let record = result.with_context(|| format!("reading row {line}"))?;
        let field = |name: &str| {
            columns
                .get(name)
                .and_then(|&idx| record.get(idx))
                .unwrap_or("")
        };

        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let description = field("description").to_string();
        let category = match field("category") {
            "" => categorize(&description),
            raw => Category::from_str(raw).with_context(|| format!("row {line}"))?,
        };
        let channel = match field("channel") {
            "" => default_channel,
            raw => PaymentChannel::from_str(raw).with_context(|| format!("row {line}"))?,
        };

        let draft = NewTransaction {
            amount: parse_amount(field("amount")).with_context(|| format!("row {line}"))?,
            category,
            description,
            date: parse_date(field("date")).with_context(|| format!("row {line}"))?,
            channel,
        };
        draft.validate().with_context(|| format!("row {line}"))?;
        out.push(draft);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, amount: i64, description: &str) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            amount: Decimal::new(amount, 2),
            category: Category::Food,
            description: description.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            channel: PaymentChannel::MobileMoney,
        }
    }

    #[test]
    fn test_export_format() {
        let mut buf = Vec::new();
        export_csv(&[record("t1", -25050, "Paid to NAIVAS, Westlands")], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,date,amount,category,channel,description");
        assert_eq!(lines[1], "t1,2024-03-09,-250.50,food,mobile-money,\"Paid to NAIVAS, Westlands\"");
    }

    #[test]
    fn test_export_then_import_keeps_values() {
        let mut buf = Vec::new();
        export_csv(&[record("t1", -25050, "lunch"), record("t2", 100000, "refund")], &mut buf).unwrap();
        let drafts = import_csv(buf.as_slice(), PaymentChannel::Cash).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].amount, Decimal::new(-25050, 2));
        assert_eq!(drafts[1].channel, PaymentChannel::MobileMoney);
    }

    #[test]
    fn test_import_defaults_and_column_order() {
        let csv = "Description,Amount,Date\n\
                   KPLC token,\"-1,500\",05/03/2024\n\
                   ,,\n\
                   Salary March,85000,2024-03-28\n";
        let drafts = import_csv(csv.as_bytes(), PaymentChannel::Cash).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].amount, Decimal::new(-1500, 0));
        assert_eq!(drafts[0].category, Category::Utilities);
        assert_eq!(drafts[0].channel, PaymentChannel::Cash);
        assert_eq!(drafts[0].date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(drafts[1].category, Category::Salary);
    }

    #[test]
    fn test_import_reports_bad_row() {
        let csv = "date,amount,description\n2024-03-01,-100,tea\n2024-03-02,abc,lunch\n";
        let err = import_csv(csv.as_bytes(), PaymentChannel::Cash).unwrap_err();
        assert!(format!("{err:#}").contains("row 3"), "{err:#}");

        let err = import_csv("amount,description\n1,x\n".as_bytes(), PaymentChannel::Cash).unwrap_err();
        assert!(err.to_string().contains("'date'"));
    }
}
