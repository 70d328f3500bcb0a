use dash_http::Schema;
use dash_http::SchemaError;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Coupon as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: f64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub used_count: u32,
    pub usage_limit: Option<u32>,
    /// RFC 3339 timestamp
    pub expires_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Schema for Coupon {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.id.is_empty() {
            return Err(SchemaError::field("id", "must not be empty"));
        }
        if self.code.trim().is_empty() {
            return Err(SchemaError::field("code", "must not be empty"));
        }
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(SchemaError::field("value", "must be a non-negative number"));
        }
        if self.discount_type == DiscountType::Percentage && self.value > 100.0 {
            return Err(SchemaError::field("value", "percentage discount above 100"));
        }
        Ok(())
    }
}

/// One page of coupons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponPage {
    pub items: Vec<Coupon>,
    pub page: u32,
    pub total: u64,
}

impl Schema for CouponPage {
    fn validate(&self) -> Result<(), SchemaError> {
        self.items.validate().map_err(|err| SchemaError::new(err.path.replacen("$", "$.items", 1), err.message))
    }
}

/// Body of a coupon creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Partial update; unset fields are left untouched by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub disabled: bool,
}

impl Schema for User {
    fn validate(&self) -> Result<(), SchemaError> {
        if !self.email.contains('@') {
            return Err(SchemaError::field("email", "not an email address"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPage {
    pub items: Vec<User>,
    pub page: u32,
    pub total: u64,
}

impl Schema for UserPage {
    fn validate(&self) -> Result<(), SchemaError> {
        self.items.validate().map_err(|err| SchemaError::new(err.path.replacen("$", "$.items", 1), err.message))
    }
}
