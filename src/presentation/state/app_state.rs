use std::sync::Arc;

use crate::application::services::{RelayService, RoleMapping};

#[derive(Clone)]
pub struct AppState {
    pub relay_service: Arc<RelayService>,
    pub roles: Arc<RoleMapping>,
}

impl AppState {
    pub fn new(relay_service: RelayService, roles: RoleMapping) -> Self {
        Self {
            relay_service: Arc::new(relay_service),
            roles: Arc::new(roles),
        }
    }
}
