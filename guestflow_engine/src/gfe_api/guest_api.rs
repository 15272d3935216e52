use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, Vendor},
    traits::CatalogManagement,
};

/// The best available identity for the guest behind an order, resolved at notification time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestInfo {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub passport_url: Option<String>,
}

/// `GuestApi` resolves guest identities for orders. Resolution is best-effort and infallible: when the check-in
/// record cannot be found (or the lookup fails outright) it falls back to whatever contact details the order
/// itself carries.
pub struct GuestApi<B> {
    db: B,
}

impl<B> Debug for GuestApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GuestApi")
    }
}

impl<B> GuestApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> GuestApi<B>
where B: CatalogManagement
{
    /// Resolves the guest behind an order. The order's access token is traded for the most recent check-in record;
    /// failing that, the order's own contact columns are used, with "Guest" as the name of last resort.
    pub async fn guest_info_for_order(&self, order: &Order) -> GuestInfo {
        if let Some(token) = order.order_details.access_token.as_deref() {
            match self.db.fetch_check_in_by_access_token(token).await {
                Ok(Some(check_in)) => {
                    trace!("🧳️ Guest for order #{} resolved from check-in #{}", order.id, check_in.id);
                    return GuestInfo {
                        name: check_in.full_name,
                        email: check_in.email,
                        phone: check_in.phone_number,
                        passport_url: check_in.passport_url,
                    };
                },
                Ok(None) => {
                    debug!("🧳️ No check-in record matches the access token on order #{}.", order.id);
                },
                Err(e) => {
                    warn!("🧳️ Check-in lookup failed for order #{}: {e}. Falling back to order contact info.", order.id);
                },
            }
        }
        GuestInfo {
            name: order.guest_name.clone().unwrap_or_else(|| "Guest".to_string()),
            email: order.guest_email.clone(),
            phone: order.guest_phone.clone(),
            passport_url: None,
        }
    }

    /// Resolves the vendor snapshotted onto an order, if any. Lookup failures are logged and treated as "no
    /// vendor", since notification flows must keep going without one.
    pub async fn vendor_for_order(&self, order: &Order) -> Option<Vendor> {
        let vendor_id = order.vendor_id?;
        match self.db.fetch_vendor(vendor_id).await {
            Ok(vendor) => vendor,
            Err(e) => {
                warn!("🧳️ Vendor lookup failed for order #{}: {e}", order.id);
                None
            },
        }
    }
}
