//----------------------------------------  Payment webhooks  --------------------------------------------------------
//
// The provider delivers events at-least-once, so every path here acknowledges with a 2xx except two:
// * a bad signature is rejected with 403 and nothing is processed (the provider will retry), and
// * a database failure during order materialization returns 500, so the provider redelivers a payment event that
//   would otherwise be lost to a transient outage.

use actix_web::{web, HttpRequest, HttpResponse};
use guestflow_engine::{
    traits::{AccountApiError, PaymentGatewayDatabase, PaymentGatewayError},
    AccountApi,
    GuestApi,
    OrderFlowApi,
};
use log::*;
use notify_tools::{EmailChannel, MessageChannel};

use crate::{
    config::ServerConfig,
    data_objects::JsonResponse,
    errors::ServerError,
    helpers::verify_signature,
    notifications::NotificationDispatcher,
    payment_events::{
        account_status,
        deauthorized_account_id,
        payment_confirmation,
        EventKind,
        WebhookEvent,
        SIGNATURE_HEADER,
    },
    route,
};

route!(payment_webhook => Post "/webhook/payments" impl PaymentGatewayDatabase, EmailChannel, MessageChannel);
pub async fn payment_webhook<BPay, TEmail, TMsg>(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<ServerConfig>,
    orders: web::Data<OrderFlowApi<BPay>>,
    accounts: web::Data<AccountApi<BPay>>,
    guests: web::Data<GuestApi<BPay>>,
    dispatcher: web::Data<NotificationDispatcher<TEmail, TMsg>>,
) -> Result<HttpResponse, ServerError>
where
    BPay: PaymentGatewayDatabase,
    TEmail: EmailChannel,
    TMsg: MessageChannel,
{
    trace!("💳️ Received webhook request: {}", req.uri());
    if config.signature_checks {
        // The signature covers the exact raw bytes, so verification must happen before any parsing.
        let provided = req.headers().get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();
        if !verify_signature(config.webhook_secret.reveal(), body.as_ref(), provided) {
            warn!("💳️ Webhook signature verification failed. Rejecting the request.");
            return Err(ServerError::InvalidSignature);
        }
    }
    let event: WebhookEvent =
        serde_json::from_slice(&body).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    debug!("💳️ Event {} ({}) passed verification.", event.id, event.event_type);
    let result = match event.kind() {
        EventKind::PaymentSucceeded => handle_payment_succeeded(&event, &orders, &guests, &dispatcher).await?,
        EventKind::PaymentFailed => {
            info!("💳️ Payment failed for event {}. No state change.", event.id);
            JsonResponse::success("Payment failure noted.")
        },
        EventKind::AccountUpdated => handle_account_updated(&event, &accounts).await?,
        EventKind::AccountDeauthorized => handle_account_deauthorized(&event, &accounts).await?,
        EventKind::Unrecognized(kind) => {
            info!("💳️ Ignoring unrecognized event kind '{kind}' for event {}.", event.id);
            JsonResponse::success("Event ignored.")
        },
    };
    Ok(HttpResponse::Ok().json(result))
}

async fn handle_payment_succeeded<BPay, TEmail, TMsg>(
    event: &WebhookEvent,
    orders: &OrderFlowApi<BPay>,
    guests: &GuestApi<BPay>,
    dispatcher: &NotificationDispatcher<TEmail, TMsg>,
) -> Result<JsonResponse, ServerError>
where
    BPay: PaymentGatewayDatabase,
    TEmail: EmailChannel,
    TMsg: MessageChannel,
{
    let confirmation = match payment_confirmation(event) {
        Ok(confirmation) => confirmation,
        Err(e) => {
            // A payload we cannot attribute will never become processable; acknowledge so it is not redelivered.
            warn!("💳️ Could not convert event {}. {e}", event.id);
            return Ok(JsonResponse::failure(e));
        },
    };
    match orders.process_payment_succeeded(confirmation).await {
        Ok(batch) if batch.duplicate_event => Ok(JsonResponse::success("Event already processed.")),
        Ok(batch) => {
            for order in &batch.orders {
                let guest = guests.guest_info_for_order(order).await;
                let vendor = guests.vendor_for_order(order).await;
                // Orders are committed by now. Whatever happens in dispatch stays in the outcome log.
                dispatcher.send_order_notifications(order, &guest, vendor.as_ref()).await;
            }
            info!("💳️ Event {} created {} order(s).", event.id, batch.orders.len());
            Ok(JsonResponse::success(format!("{} order(s) created.", batch.orders.len())))
        },
        Err(PaymentGatewayError::DatabaseError(e)) => {
            error!("💳️ Database failure while materializing orders for event {}. {e}", event.id);
            Err(ServerError::BackendError(format!("Database error: {e}")))
        },
        Err(e) => {
            warn!("💳️ Unexpected error while handling payment event {}. {e}", event.id);
            Ok(JsonResponse::failure("Unexpected error handling payment event."))
        },
    }
}

async fn handle_account_updated<B: PaymentGatewayDatabase>(
    event: &WebhookEvent,
    accounts: &AccountApi<B>,
) -> Result<JsonResponse, ServerError> {
    let status = match account_status(event) {
        Ok(status) => status,
        Err(e) => {
            warn!("💳️ Could not read account status from event {}. {e}", event.id);
            return Ok(JsonResponse::failure(e));
        },
    };
    match accounts.handle_account_updated(&status).await {
        Ok(Some(_)) => Ok(JsonResponse::success("Account status updated.")),
        Ok(None) => Ok(JsonResponse::success("No linked user for this account.")),
        Err(AccountApiError::DatabaseError(e)) => {
            error!("💳️ Database failure while updating account status for event {}. {e}", event.id);
            Err(ServerError::BackendError(format!("Database error: {e}")))
        },
        Err(e) => {
            warn!("💳️ Could not apply account update for event {}. {e}", event.id);
            Ok(JsonResponse::failure(e))
        },
    }
}

async fn handle_account_deauthorized<B: PaymentGatewayDatabase>(
    event: &WebhookEvent,
    accounts: &AccountApi<B>,
) -> Result<JsonResponse, ServerError> {
    let account_id = match deauthorized_account_id(event) {
        Ok(id) => id,
        Err(e) => {
            warn!("💳️ Could not read the account id from event {}. {e}", event.id);
            return Ok(JsonResponse::failure(e));
        },
    };
    match accounts.handle_account_deauthorized(&account_id).await {
        Ok(Some(_)) => Ok(JsonResponse::success("Account disconnected.")),
        Ok(None) => Ok(JsonResponse::success("No linked user for this account.")),
        Err(AccountApiError::DatabaseError(e)) => {
            error!("💳️ Database failure while deauthorizing account for event {}. {e}", event.id);
            Err(ServerError::BackendError(format!("Database error: {e}")))
        },
        Err(e) => {
            warn!("💳️ Could not deauthorize account for event {}. {e}", event.id);
            Ok(JsonResponse::failure(e))
        },
    }
}
