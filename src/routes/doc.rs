use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            AuthSession, ForgotPasswordRequest, LoginRequest, OtpVerified,
            RegisterStepOneRequest, RegisterStepTwoRequest, ResendOtpRequest,
            ResetPasswordRequest, UpdatePasswordRequest, VerifyOtpRequest,
        },
        businesses::{BusinessList, CreateBusinessRequest, UpdateBusinessRequest},
        categories::{CategoryList, CreateCategoryRequest},
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        sales::{CreateSaleRequest, SaleItemInput, SaleList, SaleWithItems, UpdateSaleRequest},
    },
    models::{Business, Category, Customer, Product, Sale, SaleItem, User},
    response::{ApiResponse, Meta},
    routes::{
        auth, businesses, categories, customers, health,
        health::HealthData,
        params, products as product_routes, sales,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register_step_one,
        auth::verify_otp,
        auth::resend_otp,
        auth::register_step_two,
        auth::login,
        auth::logout,
        auth::forgot_password,
        auth::verify_reset_otp,
        auth::reset_password,
        auth::update_password,
        sales::list_sales,
        sales::get_sale,
        sales::create_sale,
        sales::update_sale,
        sales::delete_sale,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        customers::list_customers,
        customers::get_customer,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        businesses::list_businesses,
        businesses::get_business,
        businesses::create_business,
        businesses::update_business,
        businesses::delete_business,
        categories::list_categories,
        categories::create_category,
        categories::delete_category
    ),
    components(
        schemas(
            User,
            Business,
            Category,
            Customer,
            Product,
            Sale,
            SaleItem,
            RegisterStepOneRequest,
            VerifyOtpRequest,
            ResendOtpRequest,
            RegisterStepTwoRequest,
            LoginRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UpdatePasswordRequest,
            OtpVerified,
            AuthSession,
            CreateSaleRequest,
            UpdateSaleRequest,
            SaleItemInput,
            SaleWithItems,
            SaleList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CustomerList,
            CreateBusinessRequest,
            UpdateBusinessRequest,
            BusinessList,
            CreateCategoryRequest,
            CategoryList,
            params::Pagination,
            params::ProductQuery,
            params::CustomerQuery,
            params::SaleListQuery,
            params::CategoryQuery,
            HealthData,
            Meta,
            ApiResponse<HealthData>,
            ApiResponse<AuthSession>,
            ApiResponse<OtpVerified>,
            ApiResponse<SaleWithItems>,
            ApiResponse<SaleList>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Customer>,
            ApiResponse<CustomerList>,
            ApiResponse<Business>,
            ApiResponse<BusinessList>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and authentication endpoints"),
        (name = "Sales", description = "Sale endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Customers", description = "Customer endpoints"),
        (name = "Businesses", description = "Business endpoints"),
        (name = "Categories", description = "Category endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
