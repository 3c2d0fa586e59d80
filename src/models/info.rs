//! Federation information model

use serde::{Deserialize, Serialize};

/// Static description of the federation shown on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationInfo {
    pub full_name: String,
    pub short_name: String,
    pub informal_names: Vec<String>,
    pub description: String,
    pub disciplines: Vec<Discipline>,
    pub history: Vec<HistoryEntry>,
    pub contacts: FederationContacts,
}

/// A sports programming discipline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discipline {
    pub name: String,
    pub description: String,
    /// Icon key used by the page (`algorithm`, `product`, ...)
    pub icon: String,
}

/// One milestone of the history timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederationContacts {
    pub telegram: String,
    pub email: String,
}
