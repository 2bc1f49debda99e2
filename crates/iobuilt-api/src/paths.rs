// Per-context endpoint paths.
//
// Every path is relative to the API base URL and can be overridden from
// configuration. Defaults follow the json-server layout of the backend.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub authentication: String,
    pub users: String,
    pub user_details: String,
    pub projects: String,
    pub clients: String,
    pub devices: String,
    pub device_configurations: String,
    pub subscriptions: String,
    pub plans: String,
    pub analytics: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            authentication: "/authentication".into(),
            users: "/users".into(),
            user_details: "/user_details".into(),
            projects: "/projects".into(),
            clients: "/external_clients".into(),
            devices: "/devices".into(),
            device_configurations: "/device_configurations".into(),
            subscriptions: "/subscriptions".into(),
            plans: "/plans".into(),
            analytics: "/analytics".into(),
        }
    }
}
