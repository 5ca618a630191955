//! Turn parsed confirmation messages into transactions.

use chrono::NaiveDate;
use hela_core::{Category, NewTransaction, TransactionRecord, categorize};
use hela_ingest::{MessageParser, ParsedMessage};
use tracing::info;

use crate::session::Session;
use crate::store::{RecordStore, StoreError};

/// Build a transaction draft from a parse result.
///
/// The caller's category wins; otherwise one is suggested from the description.
pub fn draft_from_message(
    parsed: &ParsedMessage,
    category: Option<Category>,
    date: NaiveDate,
) -> NewTransaction {
    let category = category.unwrap_or_else(|| categorize(&parsed.description));
    NewTransaction {
        amount: parsed.amount,
        category,
        description: parsed.description.clone(),
        date,
        channel: parsed.channel,
    }
}

/// Parse `text` and store the result.
///
/// `Ok(None)` means no amount was recognized and nothing was stored; the
/// caller should ask for manual entry.
pub fn import_message<S: RecordStore<TransactionRecord>>(
    parser: &MessageParser,
    session: &mut Session<S>,
    text: &str,
    category: Option<Category>,
    date: NaiveDate,
) -> Result<Option<TransactionRecord>, StoreError> {
    let Some(parsed) = parser.parse(text) else {
        return Ok(None);
    };
    let record = session.add(draft_from_message(&parsed, category, date))?;
    info!(id = %record.id, amount = %record.amount, "imported confirmation message");
    Ok(Some(record))
}
