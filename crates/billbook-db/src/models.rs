use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Payment status of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Paid,
}

impl BillStatus {
    /// The other status: `pending <-> paid`.
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Paid,
            Self::Paid => Self::Pending,
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        };
        f.write_str(s)
    }
}

impl FromStr for BillStatus {
    type Err = BillStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(BillStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`BillStatus`] string.
#[derive(Debug, Clone)]
pub struct BillStatusParseError(pub String);

impl fmt::Display for BillStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid bill status: {:?}", self.0)
    }
}

impl std::error::Error for BillStatusParseError {}

// ---------------------------------------------------------------------------

/// Spending category. The set is fixed; stored as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Housing,
    Electricity,
    Water,
    Internet,
    Phone,
    Food,
    Transport,
    Health,
    Education,
    Leisure,
    CreditCard,
    Donations,
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Self::Housing,
        Self::Electricity,
        Self::Water,
        Self::Internet,
        Self::Phone,
        Self::Food,
        Self::Transport,
        Self::Health,
        Self::Education,
        Self::Leisure,
        Self::CreditCard,
        Self::Donations,
        Self::Other,
    ];

    /// Human-readable label for listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Electricity => "Electricity",
            Self::Water => "Water",
            Self::Internet => "Internet",
            Self::Phone => "Phone",
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Leisure => "Leisure",
            Self::CreditCard => "Credit card",
            Self::Donations => "Donations",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Housing => "housing",
            Self::Electricity => "electricity",
            Self::Water => "water",
            Self::Internet => "internet",
            Self::Phone => "phone",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Health => "health",
            Self::Education => "education",
            Self::Leisure => "leisure",
            Self::CreditCard => "credit_card",
            Self::Donations => "donations",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "housing" => Ok(Self::Housing),
            "electricity" => Ok(Self::Electricity),
            "water" => Ok(Self::Water),
            "internet" => Ok(Self::Internet),
            "phone" => Ok(Self::Phone),
            "food" => Ok(Self::Food),
            "transport" => Ok(Self::Transport),
            "health" => Ok(Self::Health),
            "education" => Ok(Self::Education),
            "leisure" => Ok(Self::Leisure),
            "credit_card" => Ok(Self::CreditCard),
            "donations" => Ok(Self::Donations),
            "other" => Ok(Self::Other),
            other => Err(CategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Category`] string.
#[derive(Debug, Clone)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid category: {:?}", self.0)
    }
}

impl std::error::Error for CategoryParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A concrete, dated, payable bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bill {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    /// Template this bill was generated from, if any. Advisory only: the
    /// link is cleared when the template is deleted.
    pub origin_template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A recurring bill definition used to generate monthly bills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecurringTemplate {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub default_amount: Decimal,
    /// Nominal day of month, 1..=31. Clamped to the month length on
    /// generation.
    pub due_day: i16,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-(template, month) record of whether and at what amount generation
/// occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GenerationMarker {
    pub template_id: Uuid,
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub amount: Decimal,
    pub generated: bool,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_status_display_roundtrip() {
        for v in [BillStatus::Pending, BillStatus::Paid] {
            let parsed: BillStatus = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn bill_status_invalid() {
        assert!("overdue".parse::<BillStatus>().is_err());
    }

    #[test]
    fn bill_status_toggle() {
        assert_eq!(BillStatus::Pending.toggled(), BillStatus::Paid);
        assert_eq!(BillStatus::Paid.toggled(), BillStatus::Pending);
    }

    #[test]
    fn category_display_roundtrip() {
        for v in Category::ALL {
            let parsed: Category = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn category_invalid() {
        let err = "groceries".parse::<Category>().unwrap_err();
        assert_eq!(err.to_string(), "invalid category: \"groceries\"");
    }

    #[test]
    fn category_labels_are_distinct() {
        let mut labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Category::ALL.len());
    }
}
