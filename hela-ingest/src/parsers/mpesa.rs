//! M-Pesa confirmation message parser (text)
//!
//! Expected message shapes:
//!   QAB1CD2EF3 Confirmed. Ksh1,200.00 sent to JOHN DOE 0712345678 on 12/3/24 at 10:15 AM. New M-PESA balance is Ksh5,300.00.
//!   QAB1CD2EF4 Confirmed. You have received Ksh500.00 from JANE WANJIKU 0722000000 on 12/3/24 at 1:02 PM.
//!   QAB1CD2EF5 Confirmed. Ksh450.00 sent to KPLC PREPAID for account 54410022 on 12/3/24 at 9:00 AM.
//!   QAB1CD2EF6 Confirmed. Ksh250.00 paid to NAIVAS WESTLANDS. on 12/3/24 at 6:40 PM.
//!
//! Only the first amount in a message is used; balances and transaction costs follow it.
//! Amounts above `hela_core::MAX_AMOUNT` are treated like a missing amount.

use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::Result;
use hela_core::{MAX_AMOUNT, PaymentChannel};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::types::{Direction, ParsedMessage};

/// Where a counterparty name ends: a phone number, " on <date>", a comma
/// or the end of the text. Sentence breaks are cut afterwards by
/// `cut_at_sentence_end`, which can tell initials apart.
const NAME_END: &str = r"(?:\s+\+?\d{6,}|\s+on\s+\d|\s*,|\s*$)";

static DEFAULT_PARSER: LazyLock<Option<MessageParser>> =
    LazyLock::new(|| MessageParser::new(ParserConfig::default()).ok());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Currency prefix in front of amounts, matched case-insensitively
    pub currency_marker: String,
    /// Provider label attached to every result
    pub channel_label: String,
    /// Used when no marker, or markers of both kinds, are found
    pub default_direction: Direction,
    pub outbound_markers: Vec<String>,
    pub inbound_markers: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            currency_marker: "ksh".to_string(),
            channel_label: "M-Pesa".to_string(),
            default_direction: Direction::Outgoing,
            outbound_markers: vec![
                "sent to".to_string(),
                "pay bill".to_string(),
                "buy goods".to_string(),
            ],
            inbound_markers: vec![
                "received".to_string(),
                "you have received".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Template {
    SentTo,
    ReceivedFrom,
    PayBill,
    PaidTo,
}

/// Compiled parser; build once and reuse across messages.
#[derive(Debug, Clone)]
pub struct MessageParser {
    config: ParserConfig,
    amount_re: Regex,
    reference_re: Regex,
    /// Description templates in priority order
    templates: Vec<(Template, Regex)>,
}

impl MessageParser {
    pub fn new(config: ParserConfig) -> Result<Self> {
        let marker = regex::escape(&config.currency_marker.trim().to_lowercase());
        let amount_re = Regex::new(&format!(
            r"{marker}\.?\s*(?P<amt>\d{{1,3}}(?:,\d{{3}})+(?:\.\d+)?|\d+(?:\.\d+)?)"
        ))?;
        let reference_re = Regex::new(r"^(?P<code>[A-Z0-9]{8,12})\s+(?i:confirmed)")?;

        let templates = vec![
            (
                Template::SentTo,
                Regex::new(&format!(
                    r"(?i)sent to\s+(?P<name>.+?)(?:\s+for account\s+(?P<account>[\w-]+))?{NAME_END}"
                ))?,
            ),
            (
                Template::ReceivedFrom,
                Regex::new(&format!(r"(?i)received\s+.*?\bfrom\s+(?P<name>.+?){NAME_END}"))?,
            ),
            (
                Template::PayBill,
                Regex::new(&format!(
                    r"(?i)pay\s?bill\s+(?:to\s+)?(?P<name>.+?)(?:\s+for account\s+(?P<account>[\w-]+))?{NAME_END}"
                ))?,
            ),
            (
                Template::PaidTo,
                Regex::new(&format!(r"(?i)paid to\s+(?P<name>.+?){NAME_END}"))?,
            ),
        ];

        Ok(Self {
            config,
            amount_re,
            reference_re,
            templates,
        })
    }

    /// Parse one confirmation message.
    ///
    /// Returns `None` when no currency amount is recognized; callers should
    /// fall back to manual entry.
    pub fn parse(&self, text: &str) -> Option<ParsedMessage> {
        // Collapse line breaks and runs of spaces so templates see one line
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let lower = text.to_lowercase();

        let Some(magnitude) = self.find_amount(&lower) else {
            debug!("no currency amount recognized");
            return None;
        };

        let direction = self.classify(&lower);
        let amount = direction.signed(magnitude);
        let description = self
            .describe(&text)
            .unwrap_or_else(|| format!("{} transaction", self.config.channel_label));
        let reference = self
            .reference_re
            .captures(&text)
            .map(|caps| caps["code"].to_string());

        trace!(%amount, %direction, %description, "parsed confirmation message");

        Some(ParsedMessage {
            amount,
            direction,
            description,
            channel: PaymentChannel::MobileMoney,
            provider: self.config.channel_label.clone(),
            reference,
        })
    }

    fn find_amount(&self, lower: &str) -> Option<Decimal> {
        let caps = self.amount_re.captures(lower)?;
        let raw = caps["amt"].replace(',', "");
        let amount = Decimal::from_str(&raw).ok()?;
        if amount.is_zero() || amount > MAX_AMOUNT {
            debug!(%amount, "amount out of range");
            return None;
        }
        Some(amount)
    }

    fn classify(&self, lower: &str) -> Direction {
        let outbound = self
            .config
            .outbound_markers
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()));
        let inbound = self
            .config
            .inbound_markers
            .iter()
            .any(|m| lower.contains(&m.to_lowercase()));

        match (outbound, inbound) {
            (true, false) => Direction::Outgoing,
            (false, true) => Direction::Incoming,
            _ => self.config.default_direction,
        }
    }

    fn describe(&self, text: &str) -> Option<String> {
        for (template, re) in &self.templates {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let name = cut_at_sentence_end(caps["name"].trim());
            if name.is_empty() {
                continue;
            }
            let account = caps.name("account").map(|m| m.as_str());

            return Some(match (template, account) {
                (Template::SentTo | Template::PayBill, Some(acc)) => {
                    format!("Pay bill: {name} (account {acc})")
                }
                (Template::SentTo, None) => format!("Sent to {name}"),
                (Template::PayBill, None) => format!("Pay bill: {name}"),
                (Template::ReceivedFrom, _) => format!("Received from {name}"),
                (Template::PaidTo, _) => format!("Paid to {name}"),
            });
        }
        None
    }
}

/// Cut a captured name at the first sentence break. A period after a
/// single character is an initial ("J. DOE") and does not end the name.
fn cut_at_sentence_end(name: &str) -> &str {
    for (i, _) in name.match_indices('.') {
        let after = &name[i + 1..];
        if !(after.is_empty() || after.starts_with(char::is_whitespace)) {
            continue;
        }
        let word = name[..i].rsplit(char::is_whitespace).next().unwrap_or("");
        if word.chars().count() >= 2 {
            return name[..i].trim_end();
        }
    }
    name
}

/// Parse with the default M-Pesa configuration, compiled once per process.
pub fn parse_message(text: &str) -> Option<ParsedMessage> {
    (*DEFAULT_PARSER).as_ref()?.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> MessageParser {
        MessageParser::new(ParserConfig::default()).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_sent_to_is_expense() {
        let msg = parser().parse("Ksh1,200.00 sent to JOHN").unwrap();
        assert_eq!(msg.amount, dec("-1200.00"));
        assert_eq!(msg.direction, Direction::Outgoing);
        assert!(msg.description.contains("JOHN"));
        assert_eq!(msg.channel, PaymentChannel::MobileMoney);
        assert_eq!(msg.provider, "M-Pesa");
    }

    #[test]
    fn test_full_sent_message() {
        let text = "QAB1CD2EF3 Confirmed. Ksh1,200.00 sent to JOHN DOE 0712345678 on 12/3/24 at 10:15 AM. \
                    New M-PESA balance is Ksh5,300.00. Transaction cost, Ksh13.00.";
        let msg = parser().parse(text).unwrap();
        assert_eq!(msg.amount, dec("-1200.00"));
        assert_eq!(msg.description, "Sent to JOHN DOE");
        assert_eq!(msg.reference.as_deref(), Some("QAB1CD2EF3"));
    }

    #[test]
    fn test_received_is_income() {
        let text = "QAB1CD2EF4 Confirmed. You have received Ksh500 from JANE WANJIKU 0722000000 on 12/3/24 at 1:02 PM";
        let msg = parser().parse(text).unwrap();
        assert_eq!(msg.amount, dec("500.00"));
        assert_eq!(msg.direction, Direction::Incoming);
        assert_eq!(msg.description, "Received from JANE WANJIKU");
    }

    #[test]
    fn test_received_from_at_end_of_text() {
        let msg = parser().parse("received Ksh500 from JANE").unwrap();
        assert_eq!(msg.amount, dec("500"));
        assert_eq!(msg.description, "Received from JANE");
    }

    #[test]
    fn test_no_currency_marker_returns_none() {
        assert!(parser().parse("Your data bundle expires today").is_none());
        assert!(parser().parse("sent to JOHN 1,200.00").is_none());
        assert!(parser().parse("").is_none());
    }

    #[test]
    fn test_thousands_separators_stripped() {
        let msg = parser().parse("Ksh12,345.67 sent to ACME").unwrap();
        assert_eq!(msg.amount, dec("-12345.67"));

        let msg = parser().parse("Ksh1,234,567 sent to ACME").unwrap();
        assert_eq!(msg.amount, dec("-1234567"));
    }

    #[test]
    fn test_marker_variants() {
        assert_eq!(parser().parse("KSH 250 sent to BOB").unwrap().amount, dec("-250"));
        assert_eq!(parser().parse("Ksh.75.50 sent to BOB").unwrap().amount, dec("-75.50"));
    }

    #[test]
    fn test_ambiguous_direction_defaults_to_expense() {
        // Neither marker kind present
        let msg = parser().parse("Ksh300.00 withdrawn from agent 12345").unwrap();
        assert_eq!(msg.amount, dec("-300.00"));
        assert_eq!(msg.description, "M-Pesa transaction");

        // Both marker kinds present
        let msg = parser()
            .parse("Ksh300.00 sent to TOM. You have received a reward")
            .unwrap();
        assert_eq!(msg.direction, Direction::Outgoing);
    }

    #[test]
    fn test_default_direction_is_configurable() {
        let cfg = ParserConfig {
            default_direction: Direction::Incoming,
            ..ParserConfig::default()
        };
        let msg = MessageParser::new(cfg).unwrap().parse("Ksh300.00 reversal").unwrap();
        assert_eq!(msg.amount, dec("300.00"));
    }

    #[test]
    fn test_paybill_with_account() {
        let text = "QAB1CD2EF5 Confirmed. Ksh450.00 sent to KPLC PREPAID for account 54410022 on 12/3/24 at 9:00 AM.";
        let msg = parser().parse(text).unwrap();
        assert_eq!(msg.amount, dec("-450.00"));
        assert_eq!(msg.description, "Pay bill: KPLC PREPAID (account 54410022)");
    }

    #[test]
    fn test_pay_bill_template() {
        let msg = parser()
            .parse("Ksh2,999.00 paid via Pay Bill to ZUKU FIBER on 12/3/24")
            .unwrap();
        assert_eq!(msg.amount, dec("-2999.00"));
        assert_eq!(msg.description, "Pay bill: ZUKU FIBER");
    }

    #[test]
    fn test_buy_goods_paid_to() {
        let text = "QAB1CD2EF6 Confirmed. Ksh250.00 paid to NAIVAS WESTLANDS. on 12/3/24 at 6:40 PM.";
        let msg = parser().parse(text).unwrap();
        assert_eq!(msg.description, "Paid to NAIVAS WESTLANDS");
        // "paid to" is not an outbound marker; the expense default applies
        assert_eq!(msg.amount, dec("-250.00"));
    }

    #[test]
    fn test_multiline_message() {
        let text = "You have received\nKsh 1,000.00 from\nMARY AKINYI\n0711000000";
        let msg = parser().parse(text).unwrap();
        assert_eq!(msg.amount, dec("1000.00"));
        assert_eq!(msg.description, "Received from MARY AKINYI");
        assert_eq!(msg.reference, None);
    }

    #[test]
    fn test_zero_amount_is_no_match() {
        assert!(parser().parse("Ksh0.00 sent to NOBODY").is_none());
    }

    #[test]
    fn test_amount_above_maximum_is_no_match() {
        let text = "Ksh79,228,162,514,264,337,593,543,950,335 sent to BIG SPENDER";
        assert!(parser().parse(text).is_none());
        assert!(parser().parse("Ksh1,000,000,000,000.01 sent to BIG SPENDER").is_none());

        let msg = parser().parse("Ksh1,000,000,000,000 sent to BIG SPENDER").unwrap();
        assert_eq!(msg.amount, -MAX_AMOUNT);
    }

    #[test]
    fn test_initials_do_not_end_name() {
        let msg = parser().parse("Ksh500 sent to J. DOE 0712345678 on 12/3/24").unwrap();
        assert_eq!(msg.description, "Sent to J. DOE");

        let msg = parser().parse("Ksh500 sent to MARY W. KAMAU. New balance is Ksh20").unwrap();
        assert_eq!(msg.description, "Sent to MARY W. KAMAU");

        let msg = parser().parse("Ksh300.00 sent to TOM. You have received a reward").unwrap();
        assert_eq!(msg.description, "Sent to TOM");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let p = parser();
        let text = "Ksh1,200.00 sent to JOHN DOE 0712345678 on 12/3/24";
        assert_eq!(p.parse(text), p.parse(text));
        assert_eq!(parse_message(text), p.parse(text));
        assert!(DEFAULT_PARSER.is_some());
    }

    #[test]
    fn test_custom_marker() {
        let cfg = ParserConfig {
            currency_marker: "TSh".to_string(),
            channel_label: "Tigo Pesa".to_string(),
            ..ParserConfig::default()
        };
        let p = MessageParser::new(cfg).unwrap();
        let msg = p.parse("TSh20,000 sent to ALLY").unwrap();
        assert_eq!(msg.amount, dec("-20000"));
        assert_eq!(msg.provider, "Tigo Pesa");
        assert!(p.parse("Ksh100 sent to ALLY").is_none());
    }
}
