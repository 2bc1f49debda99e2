use serde::{Deserialize, Serialize};

pub const DEFAULT_ACCOUNT_STATEMENT: &str = "Active";

/// An external client (unit buyer or tenant) attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Option<u64>,
    pub full_name: String,
    pub project_id: u64,
    pub project_name: String,
    pub account_statement: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            id: None,
            full_name: String::new(),
            project_id: 0,
            project_name: String::new(),
            account_statement: DEFAULT_ACCOUNT_STATEMENT.into(),
            email: String::new(),
            phone_number: String::new(),
            address: String::new(),
        }
    }
}
