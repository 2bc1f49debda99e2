// Device inventory endpoints

use tracing::warn;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::{ApiContext, ApiResponse, HttpClient};
use crate::models::DeviceResource;

#[derive(Debug, Clone)]
pub struct DeviceApi {
    devices: Endpoint,
}

impl DeviceApi {
    pub fn new(ctx: &ApiContext) -> Result<Self, Error> {
        let http = HttpClient::new(ctx)?;
        Ok(Self {
            devices: Endpoint::new(http, ctx.paths.devices.clone()),
        })
    }

    pub async fn devices(&self) -> Result<ApiResponse<Vec<DeviceResource>>, Error> {
        self.devices
            .get_all()
            .await
            .inspect_err(|e| warn!(error = %e, "failed to list devices"))
    }

    pub async fn device(&self, id: u64) -> Result<DeviceResource, Error> {
        self.devices
            .get_by_id(id)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to fetch device"))
    }

    pub async fn create(&self, device: &DeviceResource) -> Result<DeviceResource, Error> {
        self.devices
            .create(device)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(error = %e, "failed to create device"))
    }

    /// `PUT {devices}/{id}` with the full outbound resource.
    pub async fn update(&self, id: u64, device: &DeviceResource) -> Result<DeviceResource, Error> {
        self.devices
            .update(id, device)
            .await
            .and_then(ApiResponse::into_data)
            .inspect_err(|e| warn!(id, error = %e, "failed to update device"))
    }

    pub async fn delete(&self, id: u64) -> Result<(), Error> {
        self.devices
            .delete(id)
            .await
            .map(|_| ())
            .inspect_err(|e| warn!(id, error = %e, "failed to delete device"))
    }
}
