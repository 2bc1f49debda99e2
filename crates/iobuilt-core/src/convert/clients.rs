use iobuilt_api::models::ClientResource;

use crate::model::{Client, DEFAULT_ACCOUNT_STATEMENT};

impl From<ClientResource> for Client {
    fn from(r: ClientResource) -> Self {
        Self {
            id: r.id,
            full_name: r.full_name.unwrap_or_default(),
            project_id: r.project_id.unwrap_or_default(),
            project_name: r.project_name.unwrap_or_default(),
            account_statement: r
                .account_statement
                .unwrap_or_else(|| DEFAULT_ACCOUNT_STATEMENT.into()),
            email: r.email.unwrap_or_default(),
            phone_number: r.phone_number.unwrap_or_default(),
            address: r.address.unwrap_or_default(),
        }
    }
}

impl From<&Client> for ClientResource {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id,
            full_name: Some(c.full_name.clone()),
            project_id: Some(c.project_id),
            project_name: Some(c.project_name.clone()),
            account_statement: Some(c.account_statement.clone()),
            email: Some(c.email.clone()),
            phone_number: Some(c.phone_number.clone()),
            address: Some(c.address.clone()),
        }
    }
}
