use std::sync::Arc;

use dash_http::RemoteClient;
use dash_http::Request;
use dash_http::Transport;
use dash_types::ApiResult;
use serde::Serialize;

use crate::models::User;
use crate::models::UserPage;
use crate::models::UserRole;

#[derive(Serialize)]
struct RoleChange {
    role: UserRole,
}

/// User administration endpoints
pub struct UserRepository<T: Transport> {
    client: Arc<RemoteClient<T>>,
}

impl<T: Transport> UserRepository<T> {
    pub fn new(client: Arc<RemoteClient<T>>) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32) -> ApiResult<UserPage> {
        self.client.get(Request::new("/users").param("page", page)).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<User> {
        self.client.get(Request::new("/users").segment(id)).await
    }

    pub async fn update_role(&self, id: &str, role: UserRole) -> ApiResult<User> {
        let request = Request::new("/users").segment(id).segment("role").body(&RoleChange { role })?;
        self.client.patch(request).await
    }
}
