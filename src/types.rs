use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{LedgerError, Result};
use crate::quantity::Quantity;

/// identifier assigned by the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub u64);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// opaque member identifier (display name or external user id)
pub type MemberId = String;

/// opaque handle to a stored screenshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentRef(pub String);

impl AttachmentRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub nickname: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, nickname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: nickname.into(),
        }
    }
}

/// read-only lookup of members, unique by id, kept in the order supplied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// build a roster; later duplicates of an id are dropped
    pub fn new(members: impl IntoIterator<Item = Member>) -> Self {
        let mut unique: Vec<Member> = Vec::new();
        for member in members {
            if !unique.iter().any(|m| m.id == member.id) {
                unique.push(member);
            }
        }
        Self { members: unique }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// nickname for a member id, falling back to the raw id
    pub fn nickname_or_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|m| m.nickname.as_str()).unwrap_or(id)
    }

    /// nicknames sorted alphabetically, deduplicated
    pub fn sorted_nicknames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.members.iter().map(|m| m.nickname.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// payment not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub member_id: MemberId,
    pub date: NaiveDate,
    pub days_covered: Decimal,
    pub amount: Quantity,
    pub attachment_ref: Option<AttachmentRef>,
}

impl NewPayment {
    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment {
            id,
            member_id: self.member_id,
            date: self.date,
            days_covered: self.days_covered,
            amount: self.amount,
            attachment_ref: self.attachment_ref,
        }
    }
}

/// persisted ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub member_id: MemberId,
    pub date: NaiveDate,
    pub days_covered: Decimal,
    pub amount: Quantity,
    pub attachment_ref: Option<AttachmentRef>,
}

impl Payment {
    /// check the row-level invariants
    pub fn validate(&self) -> Result<()> {
        if self.days_covered <= Decimal::ZERO {
            return Err(LedgerError::InvalidPayment {
                id: Some(self.id),
                field: "days_covered",
                reason: format!("must be positive, got {}", self.days_covered),
            });
        }
        if self.amount.is_negative() {
            return Err(LedgerError::InvalidPayment {
                id: Some(self.id),
                field: "amount",
                reason: format!("must not be negative, got {}", self.amount.as_decimal()),
            });
        }
        if self.member_id.trim().is_empty() {
            return Err(LedgerError::InvalidPayment {
                id: Some(self.id),
                field: "member_id",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// attachment handle, treating an empty handle as none
    pub fn attachment(&self) -> Option<&AttachmentRef> {
        self.attachment_ref.as_ref().filter(|r| !r.0.is_empty())
    }
}
