#![allow(dead_code)]

use thiserror::Error;
use tokio::sync::watch;

use crate::catalog;

/// Upper bound on tracked symbols; fan-out per refresh tick is capped by this.
pub const MAX_SELECTED: usize = 5;

/// Symbols tracked before the user touches the watchlist.
pub const DEFAULT_SELECTED: &[&str] = &["ETH", "XRP"];

/// Rejected mutations are user-notice material; the selection is never
/// changed on error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("up to {MAX_SELECTED} symbols can be selected")]
    Full,
    #[error("{0} is already selected")]
    AlreadySelected(String),
    #[error("{0} is not in the symbol catalog")]
    UnknownSymbol(String),
    #[error("at least one symbol must stay selected")]
    LastSymbol,
    #[error("{0} is not selected")]
    NotSelected(String),
}

/// The user-editable set of tracked symbol keys: ordered, deduplicated,
/// between 1 and [`MAX_SELECTED`] members, all present in the catalog.
/// Every accepted mutation publishes the new key list on a watch channel,
/// which the refresher observes to re-register its tick interval.
#[derive(Debug)]
pub struct Selection {
    keys: Vec<String>,
    tx: watch::Sender<Vec<String>>,
}

impl Selection {
    /// Build a selection seeded with [`DEFAULT_SELECTED`], returning the
    /// receiver side for the refresher.
    pub fn with_defaults() -> (Self, watch::Receiver<Vec<String>>) {
        let keys: Vec<String> = DEFAULT_SELECTED.iter().map(|k| k.to_string()).collect();
        let (tx, rx) = watch::channel(keys.clone());
        (Self { keys, tx }, rx)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn add(&mut self, key: &str) -> Result<(), SelectionError> {
        if catalog::lookup(key).is_none() {
            return Err(SelectionError::UnknownSymbol(key.to_string()));
        }
        if self.keys.iter().any(|k| k == key) {
            return Err(SelectionError::AlreadySelected(key.to_string()));
        }
        if self.keys.len() >= MAX_SELECTED {
            return Err(SelectionError::Full);
        }
        self.keys.push(key.to_string());
        self.publish();
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<(), SelectionError> {
        if !self.keys.iter().any(|k| k == key) {
            return Err(SelectionError::NotSelected(key.to_string()));
        }
        if self.keys.len() == 1 {
            return Err(SelectionError::LastSymbol);
        }
        self.keys.retain(|k| k != key);
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        // send_replace never fails; a refresher that dropped its receiver
        // is already shutting down.
        self.tx.send_replace(self.keys.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_default_pair() {
        let (selection, rx) = Selection::with_defaults();
        assert_eq!(selection.keys(), ["ETH", "XRP"]);
        assert_eq!(*rx.borrow(), vec!["ETH".to_string(), "XRP".to_string()]);
    }

    #[test]
    fn add_publishes_new_list_in_order() {
        let (mut selection, rx) = Selection::with_defaults();
        selection.add("BTC").unwrap();
        assert_eq!(selection.keys(), ["ETH", "XRP", "BTC"]);
        assert_eq!(rx.borrow().last().map(String::as_str), Some("BTC"));
    }

    #[test]
    fn add_rejects_sixth_symbol() {
        let (mut selection, _rx) = Selection::with_defaults();
        for key in ["BTC", "AAPL", "TSLA"] {
            selection.add(key).unwrap();
        }
        assert_eq!(selection.add("NVDA"), Err(SelectionError::Full));
        assert_eq!(selection.keys().len(), MAX_SELECTED);
    }

    #[test]
    fn add_rejects_duplicates_and_unknown_keys() {
        let (mut selection, _rx) = Selection::with_defaults();
        assert_eq!(
            selection.add("ETH"),
            Err(SelectionError::AlreadySelected("ETH".to_string()))
        );
        assert_eq!(
            selection.add("TA35"),
            Err(SelectionError::UnknownSymbol("TA35".to_string()))
        );
        assert_eq!(selection.keys(), ["ETH", "XRP"]);
    }

    #[test]
    fn remove_keeps_at_least_one_symbol() {
        let (mut selection, _rx) = Selection::with_defaults();
        selection.remove("XRP").unwrap();
        assert_eq!(selection.remove("ETH"), Err(SelectionError::LastSymbol));
        assert_eq!(selection.keys(), ["ETH"]);
    }

    #[test]
    fn remove_rejects_unselected_key() {
        let (mut selection, _rx) = Selection::with_defaults();
        assert_eq!(
            selection.remove("BTC"),
            Err(SelectionError::NotSelected("BTC".to_string()))
        );
        assert_eq!(selection.keys(), ["ETH", "XRP"]);
    }
}
