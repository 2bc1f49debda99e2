// External client endpoints

use tracing::warn;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::ClientResource;

#[derive(Debug, Clone)]
pub struct ClientApi {
    clients: Endpoint,
}

impl ClientApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            clients: Endpoint::new(http, ctx.paths.clients.clone()),
        })
    }

    /// Full client list. The raw response is returned so the assembler can
    /// apply its status check.
    pub async fn clients(&self) -> Result<ApiResponse<Vec<ClientResource>>, Error> {
        self.clients
            .get_all()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to list clients"))
    }

    pub async fn client(&self, id: u64) -> Result<ClientResource, Error> {
        self.clients
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch client"))
    }

    pub async fn create(&self, client: &ClientResource) -> Result<ClientResource, Error> {
        self.clients
            .create(client)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(error = %e, "failed to create client"))
    }

    pub async fn update(&self, id: u64, client: &ClientResource) -> Result<ClientResource, Error> {
        self.clients
            .update(id, client)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to update client"))
    }

    pub async fn delete(&self, id: u64) -> Result<(), Error> {
        self.clients
            .delete(id)
            .await
            .map(|_| ())
            .inspect_err(|e| warn!(id, error = %e, "failed to delete client"))
    }
}
