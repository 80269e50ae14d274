pub mod auth_service;
pub mod business_service;
pub mod category_service;
pub mod customer_service;
pub mod otp_service;
pub mod product_service;
pub mod sale_service;
pub mod token;
