use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        address::{AddAddressRequest, AddressInput, AddressListData},
        auth::{AuthData, LoginRequest, RegisterRequest, SessionData, UserView},
        cart::UpdateCartRequest,
        orders::{CheckoutUrlData, OrderItemInput, OrderLineView, OrderListData, OrderView, PlaceOrderRequest},
        products::{ProductData, ProductListData},
    },
    middleware::auth::TOKEN_COOKIE,
    models::{Address, Product},
    response::ApiResponse,
    routes::{address, cart, health, order, product, seller, user, webhook},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(TOKEN_COOKIE))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        user::register,
        user::login,
        user::logout,
        user::is_auth,
        seller::is_auth,
        product::list_products,
        product::get_product,
        cart::update_cart,
        address::add_address,
        address::get_addresses,
        order::place_order_cod,
        order::place_order_stripe,
        order::list_user_orders,
        order::list_all_orders,
        webhook::stripe_webhook
    ),
    components(
        schemas(
            Product,
            Address,
            UserView,
            RegisterRequest,
            LoginRequest,
            AuthData,
            SessionData,
            AddressInput,
            AddAddressRequest,
            AddressListData,
            UpdateCartRequest,
            OrderItemInput,
            PlaceOrderRequest,
            OrderLineView,
            OrderView,
            OrderListData,
            CheckoutUrlData,
            ProductData,
            ProductListData,
            webhook::WebhookAck,
            ApiResponse<AuthData>,
            ApiResponse<SessionData>,
            ApiResponse<AddressListData>,
            ApiResponse<ProductListData>,
            ApiResponse<ProductData>,
            ApiResponse<OrderListData>,
            ApiResponse<CheckoutUrlData>
        )
    ),
    security(
        ("cookie_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Account and session endpoints"),
        (name = "Seller", description = "Operator session endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart synchronization endpoints"),
        (name = "Addresses", description = "Delivery address endpoints"),
        (name = "Orders", description = "Order placement and listing endpoints"),
        (name = "Webhooks", description = "Payment provider callbacks"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
