use mockall::mock;
use notify_tools::{DeliveryReceipt, EmailChannel, MessageChannel, NotifyApiError, OutboundEmail, OutboundMessage};

mock! {
    pub Email {}
    impl Clone for Email {
        fn clone(&self) -> Self;
    }
    impl EmailChannel for Email {
        async fn send_email(&self, email: OutboundEmail) -> Result<DeliveryReceipt, NotifyApiError>;
    }
}

mock! {
    pub Messaging {}
    impl Clone for Messaging {
        fn clone(&self) -> Self;
    }
    impl MessageChannel for Messaging {
        async fn send_message(&self, message: OutboundMessage) -> Result<DeliveryReceipt, NotifyApiError>;
    }
}
