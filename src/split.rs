use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{OcrError, Result};
use crate::models::{FriendBalance, PurchaseRecord, ReceiptScan};

pub const SELF_NAME: &str = "You";

pub fn is_self(participant: &str) -> bool {
    let p = participant.trim();
    p.eq_ignore_ascii_case("you") || p.eq_ignore_ascii_case("self")
}

fn round_cents(val: Decimal) -> Decimal {
    val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `ITEM=PARTICIPANT`, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub item: String,
    pub participant: String,
}

impl FromStr for Assignment {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self> {
        let (item, participant) = s
            .split_once('=')
            .map(|(i, p)| (i.trim(), p.trim()))
            .filter(|(i, p)| !i.is_empty() && !p.is_empty())
            .ok_or_else(|| OcrError::Other(format!("expected ITEM=FRIEND, got '{s}'")))?;
        Ok(Self {
            item: item.to_string(),
            participant: participant.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    /// Lines the user paid for themselves, ready to append to `items`.
    pub own_items: Vec<PurchaseRecord>,
    /// What each friend owes for this receipt, positive amounts only.
    pub friend_totals: Vec<FriendBalance>,
    /// Scanned lines left out of the split.
    pub skipped: Vec<String>,
}

fn on_receipt(scan: &ReceiptScan, item: &str) -> bool {
    scan.items.iter().any(|line| line.name.eq_ignore_ascii_case(item))
}

/// Divide a scanned receipt between the user and their friends. Lines with
/// no assignment belong to the user; skipped lines go to nobody.
///
/// Lines are matched by name, case-insensitively, so an assignment or skip
/// applies to every line that shares the name.
pub fn split_receipt(
    scan: &ReceiptScan,
    assignments: &[Assignment],
    skip: &[String],
    uploaded_at: DateTime<Utc>,
) -> Result<SplitOutcome> {
    let named = assignments
        .iter()
        .map(|a| a.item.as_str())
        .chain(skip.iter().map(String::as_str));
    for item in named {
        if !on_receipt(scan, item) {
            return Err(OcrError::Other(format!("no scanned item named '{item}'")));
        }
    }
    if let Some(both) = assignments
        .iter()
        .find(|a| skip.iter().any(|s| s.eq_ignore_ascii_case(&a.item)))
    {
        return Err(OcrError::Other(format!(
            "'{}' is both skipped and assigned",
            both.item
        )));
    }

    let vendor = scan
        .store_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown");

    let mut own_items = Vec::new();
    let mut friend_totals: Vec<FriendBalance> = Vec::new();
    let mut skipped = Vec::new();
    for line in &scan.items {
        if skip.iter().any(|s| s.eq_ignore_ascii_case(&line.name)) {
            skipped.push(line.name.clone());
            continue;
        }
        let participant = assignments
            .iter()
            .find(|a| a.item.eq_ignore_ascii_case(&line.name))
            .map(|a| a.participant.as_str())
            .unwrap_or(SELF_NAME);

        if is_self(participant) {
            let category = if line.category.is_empty() {
                "uncategorized"
            } else {
                line.category.as_str()
            };
            own_items.push(PurchaseRecord::new(
                &line.name,
                line.price,
                vendor,
                category,
                uploaded_at,
            ));
            continue;
        }

        match friend_totals
            .iter_mut()
            .find(|f| f.name.eq_ignore_ascii_case(participant))
        {
            Some(friend) => friend.amount = friend.amount.saturating_add(line.price),
            None => friend_totals.push(FriendBalance {
                name: participant.to_string(),
                amount: line.price,
            }),
        }
    }
    friend_totals.retain(|f| f.amount > Decimal::ZERO);

    Ok(SplitOutcome {
        own_items,
        friend_totals,
        skipped,
    })
}

/// Add incoming balances to the ledger. Names match case-insensitively and
/// amounts are kept to the cent.
pub fn merge_friends(ledger: &mut Vec<FriendBalance>, incoming: &[FriendBalance]) {
    for new in incoming {
        match ledger
            .iter_mut()
            .find(|f| f.name.to_lowercase() == new.name.to_lowercase())
        {
            Some(existing) => {
                existing.amount = round_cents(existing.amount.saturating_add(new.amount))
            }
            None => ledger.push(FriendBalance {
                name: new.name.clone(),
                amount: round_cents(new.amount),
            }),
        }
    }
}

/// Mark a friend as settled up.
pub fn clear_friend(ledger: &mut [FriendBalance], name: &str) -> Result<()> {
    let friend = ledger
        .iter_mut()
        .find(|f| f.name.to_lowercase() == name.trim().to_lowercase())
        .ok_or_else(|| OcrError::UnknownFriend(name.to_string()))?;
    friend.amount = Decimal::ZERO;
    Ok(())
}

pub fn total_owed(ledger: &[FriendBalance]) -> Decimal {
    ledger
        .iter()
        .fold(Decimal::ZERO, |acc, f| acc.saturating_add(f.amount))
}
