//! Book command.

use std::time::Duration;

use slotbook_protocol::{BookingPayload, Request, Response};
use slotbook_server::RequestHandler;

use crate::error::{ClientError, ClientResult};

/// Books a slot and waits up to `grace` for the CRM sync.
pub async fn run(
    handler: &RequestHandler,
    payload: BookingPayload,
    grace: Duration,
    json: bool,
) -> ClientResult<()> {
    let (response, sync) = handler.handle_with_sync(&Request::book(payload)).await;
    super::settle_crm_sync(sync, grace).await;

    let result = match response {
        Response::Booking { result } => result,
        Response::Error { error } => return Err(ClientError::Rejected(error.to_string())),
        other => {
            return Err(ClientError::Rejected(format!(
                "unexpected response: {:?}",
                other
            )));
        }
    };

    if json {
        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| ClientError::Protocol(e.into()))?;
        println!("{}", text);
    }

    if !result.success {
        let reason = result.reason.unwrap_or_else(|| "booking failed".to_string());
        return Err(ClientError::Rejected(reason));
    }

    if !json {
        println!("Booked: {}", result.event_id.as_deref().unwrap_or("(no id)"));
        if let Some(uri) = result.conference_uri {
            println!("Join: {}", uri);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use slotbook_providers::{MemoryCalendar, MemoryCrmStore};
    use slotbook_server::ServiceConfig;

    fn handler(calendar: MemoryCalendar) -> RequestHandler {
        RequestHandler::new(
            ServiceConfig::default(),
            Arc::new(calendar),
            Arc::new(MemoryCrmStore::new()),
        )
    }

    fn payload() -> BookingPayload {
        BookingPayload::new(
            "Ada",
            "ada@example.com",
            "2099-03-10T10:00",
            "2099-03-10T10:30",
            "Europe/London",
        )
    }

    #[tokio::test]
    async fn successful_booking() {
        let result = run(
            &handler(MemoryCalendar::new()),
            payload(),
            Duration::from_secs(1),
            false,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn failed_booking_is_an_error() {
        let err = run(
            &handler(MemoryCalendar::new().unauthenticated()),
            payload(),
            Duration::from_secs(1),
            false,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::Rejected(ref m) if m.contains("Authentication")));
    }
}
