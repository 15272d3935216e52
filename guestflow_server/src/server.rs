use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use guestflow_engine::{AccountApi, GuestApi, OrderFlowApi, SqliteDatabase};
use notify_tools::{EmailApi, MessagingApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    notifications::NotificationDispatcher,
    payment_routes::PaymentWebhookRoute,
    routes::{health, messaging_status, UpdateOrderStatusRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let email = EmailApi::new(config.email.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let messaging =
        MessagingApi::new(config.messaging.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, email, messaging)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    email: EmailApi,
    messaging: MessagingApi,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let guest_api = GuestApi::new(db.clone());
        let dispatcher = NotificationDispatcher::new(email.clone(), messaging.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gfs::access_log"))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(guest_api))
            .app_data(web::Data::new(dispatcher))
            .service(health)
            .service(messaging_status)
            .service(PaymentWebhookRoute::<SqliteDatabase, EmailApi, MessagingApi>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
