// ── Client store ──
//
// External clients (unit buyers/tenants). Project names come from the
// Projects context through its facade.

use iobuilt_api::models::ClientResource;
use iobuilt_api::{ApiContext, ClientApi};
use tracing::{debug, info};

use super::state::{ErrorLog, LoadingFlag, Observable, RequestFence};
use crate::convert::clients_from_response;
use crate::error::CoreError;
use crate::facade::ProjectsFacade;
use crate::model::Client;
use crate::stream::StateStream;

#[derive(Debug)]
pub struct ClientStore {
    api: ClientApi,
    projects: ProjectsFacade,
    clients: Observable<Vec<Client>>,
    loaded: Observable<bool>,
    loading: LoadingFlag,
    errors: ErrorLog,
    fence: RequestFence,
}

impl ClientStore {
    pub fn new(ctx: &ApiContext, projects: ProjectsFacade) -> Result<Self, CoreError> {
        Ok(Self {
            api: ClientApi::new(ctx)?,
            projects,
            clients: Observable::default(),
            loaded: Observable::new(false),
            loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
            fence: RequestFence::new(),
        })
    }

    /// Fill a missing project name from the projects already loaded.
    fn with_project_name(&self, mut client: Client) -> Client {
        if client.project_name.is_empty() && client.project_id != 0 {
            client.project_name = self.projects.project_name_by_id(client.project_id);
        }
        client
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// The full client list. Anything but an exact 200 yields no clients.
    pub async fn fetch_clients(&self) -> Vec<Client> {
        let _loading = self.loading.guard();
        let ticket = self.fence.ticket();

        let clients: Vec<Client> = match self.api.clients().await {
            Ok(resp) => clients_from_response(resp)
                .into_iter()
                .map(|c| self.with_project_name(c))
                .collect(),
            Err(e) => {
                self.errors.record("fetch_clients", e.into());
                return Vec::new();
            }
        };

        if self.fence.is_current(ticket) {
            debug!(count = clients.len(), "clients loaded");
            self.clients.set(clients.clone());
            self.loaded.set(true);
        }
        clients
    }

    pub async fn add_client(&self, client: &Client) -> Result<Client, CoreError> {
        let _loading = self.loading.guard();
        let created = self
            .api
            .create(&ClientResource::from(client))
            .await
            .map(|r| self.with_project_name(Client::from(r)))
            .map_err(|e| self.errors.capture("add_client", e))?;
        info!(id = ?created.id, "client created");
        self.clients.update(|list| list.push(created.clone()));
        Ok(created)
    }

    pub async fn update_client(&self, client: &Client) -> Result<Client, CoreError> {
        let id = client.id.ok_or_else(|| {
            self.errors
                .capture("update_client", CoreError::MissingArgument("client id".into()))
        })?;

        let _loading = self.loading.guard();
        let updated = self
            .api
            .update(id, &ClientResource::from(client))
            .await
            .map(|r| self.with_project_name(Client::from(r)))
            .map_err(|e| self.errors.capture("update_client", e))?;

        self.clients.update(|list| {
            if let Some(slot) = list.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    pub async fn delete_client(&self, id: u64) -> Result<(), CoreError> {
        let _loading = self.loading.guard();
        self.api
            .delete(id)
            .await
            .map_err(|e| self.errors.capture("delete_client", e))?;
        info!(id, "client deleted");
        self.clients.update(|list| list.retain(|c| c.id != Some(id)));
        Ok(())
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn clients(&self) -> Vec<Client> {
        self.clients.get()
    }

    pub fn client_by_id(&self, id: u64) -> Option<Client> {
        self.clients
            .with(|list| list.iter().find(|c| c.id == Some(id)).cloned())
    }

    /// Zero until the first successful fetch.
    pub fn clients_count(&self) -> usize {
        if self.loaded.get() {
            self.clients.with(Vec::len)
        } else {
            0
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Project lookups for client views.
    pub fn projects(&self) -> &ProjectsFacade {
        &self.projects
    }

    pub fn subscribe_clients(&self) -> StateStream<Vec<Client>> {
        self.clients.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}
