pub mod auth;
pub mod businesses;
pub mod categories;
pub mod customers;
pub mod products;
pub mod sales;
