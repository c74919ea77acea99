use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bill {
    pub id: String,
    pub email: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub expense_type: Option<String>,
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub vat: Option<String>,
    pub pct: Option<i32>,
    pub commentary: Option<String>,
    pub status: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

/// Payload persisted for a bill, everything but the store-assigned id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BillRecord {
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: Option<String>,
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub vat: Option<String>,
    pub pct: Option<i32>,
    pub commentary: Option<String>,
    #[serde(default)]
    pub status: BillStatus,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refusé",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillStatus::Pending),
            "accepted" => Ok(BillStatus::Accepted),
            "refused" => Ok(BillStatus::Refused),
            other => Err(other.to_string()),
        }
    }
}

// Categories offered by the new bill form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpenseType {
    #[default]
    Transports,
    Restaurants,
    Hotel,
    OnlineServices,
    It,
    Equipment,
    OfficeSupplies,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 7] = [
        ExpenseType::Transports,
        ExpenseType::Restaurants,
        ExpenseType::Hotel,
        ExpenseType::OnlineServices,
        ExpenseType::It,
        ExpenseType::Equipment,
        ExpenseType::OfficeSupplies,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseType::Transports => "Transports",
            ExpenseType::Restaurants => "Restaurants et bars",
            ExpenseType::Hotel => "Hôtel et logement",
            ExpenseType::OnlineServices => "Services en ligne",
            ExpenseType::It => "IT et électronique",
            ExpenseType::Equipment => "Equipement et matériel",
            ExpenseType::OfficeSupplies => "Fournitures de bureau",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown expense type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values_only() {
        assert_eq!("refused".parse::<BillStatus>(), Ok(BillStatus::Refused));
        assert_eq!("Refused".parse::<BillStatus>(), Err("Refused".to_string()));
    }

    #[test]
    fn expense_type_cycles_through_every_category() {
        let mut t = ExpenseType::Transports;
        for _ in 0..ExpenseType::ALL.len() {
            t = t.next();
        }
        assert_eq!(t, ExpenseType::Transports);
        assert_eq!(ExpenseType::Transports.previous(), ExpenseType::OfficeSupplies);
    }

    #[test]
    fn expense_type_parses_from_label() {
        assert!("Taxi".parse::<ExpenseType>().is_err());
        assert_eq!("Hôtel et logement".parse::<ExpenseType>(), Ok(ExpenseType::Hotel));
        assert_eq!("services en ligne".parse::<ExpenseType>(), Ok(ExpenseType::OnlineServices));
    }

    #[test]
    fn record_deserializes_with_pending_default() {
        let json = r#"{
            "email": "a@a",
            "type": "Transports",
            "name": "train",
            "amount": 42.0,
            "date": "2004-04-04",
            "vat": "7",
            "pct": 20,
            "commentary": null,
            "file_url": null,
            "file_name": null
        }"#;
        let record: BillRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, BillStatus::Pending);
        assert_eq!(record.expense_type.as_deref(), Some("Transports"));
    }
}
