//! Append-only flight history and mileage totals.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numbers::sum_u32;

/// Rejected history input; flights must be numbered `1..=N` in order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("flight numbered {found} recorded where flight {expected} belongs")]
    OutOfSequence { expected: u32, found: u32 },
}

/// A committed flight. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelHistoryItem {
    pub from: String,
    pub to: String,
    /// Great-circle distance in whole miles.
    pub distance: u32,
    pub earned_miles: u32,
    pub flight_time: String,
    /// 1-based position in the ledger.
    pub flight_number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<TravelHistoryItem>", try_from = "Vec<TravelHistoryItem>")]
pub struct HistoryLedger {
    items: Vec<TravelHistoryItem>,
}

impl TryFrom<Vec<TravelHistoryItem>> for HistoryLedger {
    type Error = LedgerError;

    fn try_from(items: Vec<TravelHistoryItem>) -> Result<Self, Self::Error> {
        let mut ledger = Self::new();
        for item in items {
            let expected = ledger.next_flight_number();
            if item.flight_number != expected {
                return Err(LedgerError::OutOfSequence {
                    expected,
                    found: item.flight_number,
                });
            }
            ledger.items.push(item);
        }
        Ok(ledger)
    }
}

impl From<HistoryLedger> for Vec<TravelHistoryItem> {
    fn from(ledger: HistoryLedger) -> Self {
        ledger.items
    }
}

impl HistoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flight number the next appended item must carry.
    #[must_use]
    pub fn next_flight_number(&self) -> u32 {
        u32::try_from(self.items.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }

    pub(crate) fn append(&mut self, item: TravelHistoryItem) {
        debug_assert_eq!(item.flight_number, self.next_flight_number());
        self.items.push(item);
    }

    /// Oldest first.
    #[must_use]
    pub fn all(&self) -> &[TravelHistoryItem] {
        &self.items
    }

    /// Newest first, the order a history panel lists flights in.
    pub fn newest_first(&self) -> impl Iterator<Item = &TravelHistoryItem> {
        self.items.iter().rev()
    }

    #[must_use]
    pub fn last(&self) -> Option<&TravelHistoryItem> {
        self.items.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_distance(&self) -> u64 {
        sum_u32(self.items.iter().map(|item| item.distance))
    }

    #[must_use]
    pub fn total_earned(&self) -> u64 {
        sum_u32(self.items.iter().map(|item| item.earned_miles))
    }

    /// Distinct airports touched by the journey, in first-visit order.
    #[must_use]
    pub fn visited(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let stops = self
            .items
            .first()
            .map(|item| item.from.as_str())
            .into_iter()
            .chain(self.items.iter().map(|item| item.to.as_str()));
        for code in stops {
            if !seen.contains(&code) {
                seen.push(code);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(from: &str, to: &str, distance: u32, flight_number: u32) -> TravelHistoryItem {
        TravelHistoryItem {
            from: from.to_string(),
            to: to.to_string(),
            distance,
            earned_miles: distance,
            flight_time: String::new(),
            flight_number,
        }
    }

    #[test]
    fn totals_and_order_follow_appends() {
        let mut ledger = HistoryLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_flight_number(), 1);
        ledger.append(item("HND", "CTS", 510, 1));
        ledger.append(item("CTS", "FUK", 880, 2));
        ledger.append(item("FUK", "HND", 548, 3));

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.total_distance(), 1938);
        assert_eq!(ledger.total_earned(), 1938);
        let numbers: Vec<u32> = ledger.all().iter().map(|i| i.flight_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        let newest: Vec<u32> = ledger.newest_first().map(|i| i.flight_number).collect();
        assert_eq!(newest, vec![3, 2, 1]);
        assert_eq!(ledger.last().map(|i| i.to.as_str()), Some("HND"));
        assert_eq!(ledger.visited(), vec!["HND", "CTS", "FUK"]);
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut ledger = HistoryLedger::new();
        ledger.append(item("HND", "CTS", 510, 1));
        let json = serde_json::to_value(&ledger).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["earnedMiles"], 510);
        assert_eq!(json[0]["flightNumber"], 1);
    }

    #[test]
    fn deserializing_checks_flight_numbers() {
        let mut ledger = HistoryLedger::new();
        ledger.append(item("HND", "CTS", 510, 1));
        ledger.append(item("CTS", "HND", 510, 2));
        let json = serde_json::to_string(&ledger).unwrap();
        let back: HistoryLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);

        let gapped =
            serde_json::to_value(vec![item("HND", "CTS", 510, 1), item("CTS", "HND", 510, 3)])
                .unwrap();
        let err = serde_json::from_value::<HistoryLedger>(gapped).unwrap_err();
        assert!(err.to_string().contains("flight numbered 3"), "{err}");

        assert_eq!(
            HistoryLedger::try_from(vec![item("HND", "CTS", 510, 2)]),
            Err(LedgerError::OutOfSequence {
                expected: 1,
                found: 2
            })
        );
    }
}
