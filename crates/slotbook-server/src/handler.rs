//! Request/response dispatch handler.
//!
//! Routes protocol requests to the availability and booking services and
//! turns their errors into caller-visible responses.

use std::sync::Arc;

use chrono::NaiveDate;
use slotbook_core::ValidationError;
use slotbook_protocol::{BookingPayload, BookingResult, Request, Response};
use slotbook_providers::{CalendarProvider, CrmStore};
use tracing::{Span, debug, warn};

use crate::availability::AvailabilityEngine;
use crate::booking::BookingOrchestrator;
use crate::config::ServiceConfig;
use crate::crm_sync::CrmSyncHandle;
use crate::error::ServiceError;

/// Handles requests against one owner's calendar and CRM.
pub struct RequestHandler {
    availability: AvailabilityEngine,
    booking: BookingOrchestrator,
}

impl RequestHandler {
    /// Creates a handler sharing `config` between both services.
    pub fn new(
        config: ServiceConfig,
        calendar: Arc<dyn CalendarProvider>,
        crm: Arc<dyn CrmStore>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            availability: AvailabilityEngine::new(config.clone(), calendar.clone()),
            booking: BookingOrchestrator::new(config, calendar, crm),
        }
    }

    /// Returns the availability engine.
    pub fn availability(&self) -> &AvailabilityEngine {
        &self.availability
    }

    /// Returns the booking orchestrator.
    pub fn booking(&self) -> &BookingOrchestrator {
        &self.booking
    }

    /// Handles a request. A booking's CRM sync is left detached.
    pub async fn handle(&self, request: &Request) -> Response {
        self.handle_with_sync(request).await.0
    }

    /// Handles a request, returning the CRM sync handle of a successful
    /// booking alongside the response.
    #[tracing::instrument(skip(self), fields(request_type = request.kind(), duration_ms))]
    pub async fn handle_with_sync(&self, request: &Request) -> (Response, Option<CrmSyncHandle>) {
        let start = std::time::Instant::now();

        let (response, crm_sync) = match request {
            Request::Ping => {
                debug!("Handling Ping request");
                (Response::Pong, None)
            }
            Request::GetAvailability { date, timezone } => {
                debug!(%date, %timezone, "Handling GetAvailability request");
                (self.get_availability(date, timezone).await, None)
            }
            Request::Book { booking } => {
                debug!(email = %booking.email, "Handling Book request");
                self.book(booking).await
            }
        };

        let duration = start.elapsed();
        if tracing::enabled!(tracing::Level::DEBUG) {
            Span::current().record("duration_ms", duration.as_millis());
            debug!(
                success = response.is_success(),
                duration_ms = duration.as_millis(),
                "Request handled"
            );
        }

        (response, crm_sync)
    }

    async fn get_availability(&self, date: &str, timezone: &str) -> Response {
        let date = match parse_date(date) {
            Ok(date) => date,
            Err(e) => return error_response(&ServiceError::from(e)),
        };
        match self.availability.query(date, timezone).await {
            Ok(report) => {
                debug!(
                    available = report.available().count(),
                    total = report.verdicts.len(),
                    "Returning availability"
                );
                Response::availability(report.to_view())
            }
            Err(e) => error_response(&e),
        }
    }

    async fn book(&self, payload: &BookingPayload) -> (Response, Option<CrmSyncHandle>) {
        match self.booking.book(payload).await {
            Ok(mut receipt) => {
                let crm_sync = receipt.take_crm_sync();
                (Response::booking(receipt.result()), crm_sync)
            }
            Err(e) => {
                warn!(code = ?e.code(), error = %e, "Booking failed");
                (
                    Response::booking(BookingResult::failed(e.code(), e.to_string())),
                    None,
                )
            }
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

fn error_response(error: &ServiceError) -> Response {
    warn!(code = ?error.code(), error = %error, "Request failed");
    Response::error(error.code(), error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use slotbook_core::BookingPhase;
    use slotbook_protocol::ErrorCode;
    use slotbook_providers::{MemoryCalendar, MemoryCrmStore, ProviderErrorCode};

    fn handler(calendar: MemoryCalendar) -> RequestHandler {
        RequestHandler::new(
            ServiceConfig::default(),
            Arc::new(calendar),
            Arc::new(MemoryCrmStore::new()),
        )
    }

    #[tokio::test]
    async fn ping() {
        let response = handler(MemoryCalendar::new()).handle(&Request::Ping).await;
        assert_eq!(response, Response::Pong);
    }

    #[tokio::test]
    async fn availability_response() {
        let response = handler(MemoryCalendar::new())
            .handle(&Request::availability("2099-03-10", "Asia/Tokyo"))
            .await;
        match response {
            Response::Availability { view } => {
                assert_eq!(view.viewer_timezone, "Asia/Tokyo");
                assert_eq!(view.owner_timezone, "Europe/London");
                assert_eq!(view.slots.len(), 15);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_date_is_invalid_request() {
        let response = handler(MemoryCalendar::new())
            .handle(&Request::availability("10/03/2024", "UTC"))
            .await;
        let error = response.as_error().unwrap();
        assert_eq!(error.code, ErrorCode::InvalidRequest);
        assert!(error.message.contains("10/03/2024"));
    }

    #[tokio::test]
    async fn provider_failure_is_provider_error() {
        let response = handler(MemoryCalendar::new().failing(ProviderErrorCode::NetworkError))
            .handle(&Request::availability("2099-03-10", "UTC"))
            .await;
        assert_eq!(
            response.as_error().map(|e| e.code),
            Some(ErrorCode::ProviderError)
        );
    }

    #[tokio::test]
    async fn unauthenticated_booking_is_distinct_failure() {
        let response = handler(MemoryCalendar::new().unauthenticated())
            .handle(&Request::book(BookingPayload::new(
                "A",
                "a@x.com",
                "2099-03-10T09:00:00Z",
                "2099-03-10T09:30:00Z",
                "UTC",
            )))
            .await;
        match response {
            Response::Booking { result } => {
                assert!(!result.success);
                assert_eq!(result.code, Some(ErrorCode::AuthenticationFailed));
                assert!(result.reason.is_some());
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn booking_returns_sync_handle() {
        let (response, sync) = handler(MemoryCalendar::new())
            .handle_with_sync(&Request::book(BookingPayload::new(
                "A",
                "a@x.com",
                "2099-03-10T09:00:00Z",
                "2099-03-10T09:30:00Z",
                "UTC",
            )))
            .await;
        assert!(response.is_success());
        let phase = sync.unwrap().wait(Duration::from_secs(5)).await;
        assert_eq!(phase, Some(BookingPhase::CrmSynced));
    }
}
