//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
use actix_web::{get, post, web, HttpResponse, Responder};
use guestflow_engine::{traits::PaymentGatewayDatabase, OrderFlowApi};
use log::*;

use crate::{
    data_objects::{JsonResponse, MessagingStatusUpdate, OrderStatusUpdateRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Delivery-status callbacks from the messaging provider. The provider expects a 2xx no matter what, and there is
/// nothing to update locally, so the payload is logged and acknowledged.
#[post("/webhook/messaging_status")]
pub async fn messaging_status(body: web::Form<MessagingStatusUpdate>) -> HttpResponse {
    let update = body.into_inner();
    match update.error_code {
        Some(code) => warn!(
            "📨️ Message {} reported status '{}' with error {code}: {}",
            update.message_sid,
            update.message_status,
            update.error_message.as_deref().unwrap_or("no detail")
        ),
        None => debug!("📨️ Message {} reported status '{}'", update.message_sid, update.message_status),
    }
    HttpResponse::Ok().finish()
}

route!(update_order_status => Post "/api/orders/{id}/status" impl PaymentGatewayDatabase);
/// Explicit order lifecycle transitions (confirm, fulfil, cancel). Illegal transitions come back as 403.
pub async fn update_order_status<B: PaymentGatewayDatabase>(
    path: web::Path<i64>,
    body: web::Json<OrderStatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let new_status = body.into_inner().status;
    debug!("💻️ POST status change for order #{id} to {new_status}");
    let order = api.set_order_status(id, new_status).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order #{id} is now {}.", order.status))))
}
