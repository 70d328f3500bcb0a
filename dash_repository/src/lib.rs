//! # dash_repository
//!
//! Per-resource repositories over [`dash_http::RemoteClient`]. Each
//! repository receives the client it should use; none of them build their own.

pub mod coupons;
pub mod models;
pub mod users;

pub use coupons::CouponRepository;
pub use models::Coupon;
pub use models::CouponPage;
pub use models::CouponPatch;
pub use models::DiscountType;
pub use models::NewCoupon;
pub use models::User;
pub use models::UserPage;
pub use models::UserRole;
pub use users::UserRepository;
