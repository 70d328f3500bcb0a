use std::sync::Arc;

use dash_http::RemoteClient;
use dash_http::Request;
use dash_http::Transport;
use dash_types::ApiError;
use dash_types::ApiResult;
use dash_types::ErrorCode;

use crate::models::Coupon;
use crate::models::CouponPage;
use crate::models::CouponPatch;
use crate::models::NewCoupon;

/// Coupon endpoints
pub struct CouponRepository<T: Transport> {
    client: Arc<RemoteClient<T>>,
}

impl<T: Transport> CouponRepository<T> {
    pub fn new(client: Arc<RemoteClient<T>>) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32) -> ApiResult<CouponPage> {
        self.client.get(Request::new("/coupons/list").param("page", page)).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<Coupon> {
        self.client.get(Request::new("/coupons/list").segment(id)).await
    }

    pub async fn create(&self, coupon: &NewCoupon) -> ApiResult<Coupon> {
        let request = Request::new("/coupons").body(coupon)?;
        let created: Coupon = self.client.post(request).await?;
        tracing::info!(id = %created.id, code = %created.code, "Coupon created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: &CouponPatch) -> ApiResult<Coupon> {
        let request = Request::new("/coupons").segment(id).body(patch)?;
        self.client.patch(request).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(Request::new("/coupons").segment(id)).await
    }

    /// Message shown in the coupon screens for a failed call
    pub fn describe_error(err: &ApiError) -> &'static str {
        match err.code {
            ErrorCode::AlreadyExists => "A coupon with this code already exists",
            ErrorCode::NotFound => "Coupon not found",
            ErrorCode::BadRequest => "The coupon data is invalid",
            code => code.message(),
        }
    }
}
