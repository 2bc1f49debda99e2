// ── Device store ──
//
// Device inventory CRUD plus a selected device for detail views.

use std::collections::BTreeMap;

use iobuilt_api::models::DeviceResource;
use iobuilt_api::{ApiContext, DeviceApi};
use tracing::{debug, info};

use super::state::{ErrorLog, LoadingFlag, Observable, RequestFence};
use crate::convert::entities_from_response;
use crate::error::CoreError;
use crate::model::Device;
use crate::stream::StateStream;

#[derive(Debug)]
pub struct DeviceStore {
    api: DeviceApi,
    devices: Observable<Vec<Device>>,
    selected: Observable<Option<Device>>,
    loading: LoadingFlag,
    errors: ErrorLog,
    fence: RequestFence,
}

impl DeviceStore {
    pub fn new(ctx: &ApiContext) -> Result<Self, CoreError> {
        Ok(Self {
            api: DeviceApi::new(ctx)?,
            devices: Observable::default(),
            selected: Observable::new(None),
            loading: LoadingFlag::new(),
            errors: ErrorLog::new(),
            fence: RequestFence::new(),
        })
    }

    // ── Actions ──────────────────────────────────────────────────────

    pub async fn fetch_devices(&self) -> Vec<Device> {
        let _loading = self.loading.guard();
        let ticket = self.fence.ticket();

        let devices: Vec<Device> = match self.api.devices().await {
            Ok(resp) => entities_from_response(resp),
            Err(e) => {
                self.errors.record("fetch_devices", e.into());
                return Vec::new();
            }
        };

        if self.fence.is_current(ticket) {
            debug!(count = devices.len(), "devices loaded");
            self.devices.set(devices.clone());
        }
        devices
    }

    /// Fetch one device and make it the selection.
    pub async fn fetch_device_by_id(&self, id: u64) -> Option<Device> {
        let _loading = self.loading.guard();
        match self.api.device(id).await {
            Ok(resource) => {
                let device = Device::from(resource);
                self.selected.set(Some(device.clone()));
                Some(device)
            }
            Err(e) => {
                self.errors.record("fetch_device_by_id", e.into());
                None
            }
        }
    }

    pub async fn create_device(&self, device: &Device) -> Result<Device, CoreError> {
        let _loading = self.loading.guard();
        let created = self
            .api
            .create(&DeviceResource::from(device))
            .await
            .map(Device::from)
            .map_err(|e| self.errors.capture("create_device", e))?;
        info!(id = ?created.id, name = %created.name, "device created");
        self.devices.update(|list| list.push(created.clone()));
        Ok(created)
    }

    pub async fn update_device(&self, device: &Device) -> Result<Device, CoreError> {
        let id = device.id.ok_or_else(|| {
            self.errors
                .capture("update_device", CoreError::MissingArgument("device id".into()))
        })?;

        let _loading = self.loading.guard();
        let updated = self
            .api
            .update(id, &DeviceResource::from(device))
            .await
            .map(Device::from)
            .map_err(|e| self.errors.capture("update_device", e))?;

        self.devices.update(|list| {
            if let Some(slot) = list.iter_mut().find(|d| d.id == Some(id)) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    pub async fn delete_device(&self, id: u64) -> Result<(), CoreError> {
        let _loading = self.loading.guard();
        self.api
            .delete(id)
            .await
            .map_err(|e| self.errors.capture("delete_device", e))?;
        info!(id, "device deleted");
        self.devices.update(|list| list.retain(|d| d.id != Some(id)));
        self.selected.update(|sel| {
            if sel.as_ref().is_some_and(|d| d.id == Some(id)) {
                *sel = None;
            }
        });
        Ok(())
    }

    pub fn select_device(&self, device: Option<Device>) {
        self.selected.set(device);
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn devices(&self) -> Vec<Device> {
        self.devices.get()
    }

    pub fn selected_device(&self) -> Option<Device> {
        self.selected.get()
    }

    pub fn online_devices(&self) -> Vec<Device> {
        self.devices
            .with(|list| list.iter().filter(|d| d.is_online()).cloned().collect())
    }

    /// Everything not online, including warning and unknown.
    pub fn offline_devices(&self) -> Vec<Device> {
        self.devices
            .with(|list| list.iter().filter(|d| !d.is_online()).cloned().collect())
    }

    pub fn devices_by_type(&self) -> BTreeMap<String, Vec<Device>> {
        self.devices.with(|list| {
            let mut grouped: BTreeMap<String, Vec<Device>> = BTreeMap::new();
            for device in list {
                grouped
                    .entry(device.device_type.clone())
                    .or_default()
                    .push(device.clone());
            }
            grouped
        })
    }

    pub fn total_devices(&self) -> usize {
        self.devices.with(Vec::len)
    }

    pub fn subscribe_devices(&self) -> StateStream<Vec<Device>> {
        self.devices.subscribe()
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }
}
