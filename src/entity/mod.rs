pub mod auth_tokens;
pub mod businesses;
pub mod categories;
pub mod customers;
pub mod otps;
pub mod products;
pub mod sale_items;
pub mod sales;
pub mod users;

pub use auth_tokens::Entity as AuthTokens;
pub use businesses::Entity as Businesses;
pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use otps::Entity as Otps;
pub use products::Entity as Products;
pub use sale_items::Entity as SaleItems;
pub use sales::Entity as Sales;
pub use users::Entity as Users;
