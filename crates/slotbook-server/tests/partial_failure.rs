//! A failing CRM never fails a booking.

use std::sync::Arc;
use std::time::Duration;

use slotbook_core::{BookingPhase, NOTE_SEPARATOR};
use slotbook_protocol::{BookingPayload, Request, Response};
use slotbook_providers::{JsonFileCrmStore, MemoryCalendar, UnavailableCrmStore};
use slotbook_server::{BookingOrchestrator, RequestHandler, ServiceConfig};

fn payload() -> BookingPayload {
    BookingPayload::new(
        "A",
        "a@x.com",
        "2024-03-12T14:00:00Z",
        "2024-03-12T14:30:00Z",
        "America/New_York",
    )
}

#[tokio::test]
async fn unavailable_crm_still_books() {
    let calendar = Arc::new(MemoryCalendar::new());
    let orchestrator = BookingOrchestrator::new(
        Arc::new(ServiceConfig::default()),
        calendar.clone(),
        Arc::new(UnavailableCrmStore::new("CRM is down")),
    );

    let mut receipt = orchestrator.book(&payload()).await.unwrap();
    assert!(receipt.result().success);
    assert_eq!(calendar.events().len(), 1);
    assert_eq!(receipt.trace.current(), BookingPhase::Complete);

    let phase = receipt
        .take_crm_sync()
        .unwrap()
        .wait(Duration::from_secs(5))
        .await;
    assert_eq!(phase, Some(BookingPhase::CrmSyncFailed));
    // The event is still there
    assert_eq!(calendar.events().len(), 1);
}

#[tokio::test]
async fn unavailable_crm_response_is_success() {
    let handler = RequestHandler::new(
        ServiceConfig::default(),
        Arc::new(MemoryCalendar::new()),
        Arc::new(UnavailableCrmStore::new("CRM is down")),
    );

    let response = handler.handle(&Request::book(payload())).await;
    match response {
        Response::Booking { result } => {
            assert!(result.success);
            assert_eq!(result.event_id.as_deref(), Some("mem-1"));
            assert!(result.reason.is_none());
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn file_crm_accumulates_notes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileCrmStore::new(dir.path().join("contacts.json")));
    let orchestrator = BookingOrchestrator::new(
        Arc::new(ServiceConfig::default()),
        Arc::new(MemoryCalendar::new()),
        store.clone(),
    );

    for notes in ["N1", "N2"] {
        let mut receipt = orchestrator
            .book(&payload().with_notes(notes))
            .await
            .unwrap();
        let phase = receipt
            .take_crm_sync()
            .unwrap()
            .wait(Duration::from_secs(5))
            .await;
        assert_eq!(phase, Some(BookingPhase::CrmSynced));
    }

    let reopened = JsonFileCrmStore::new(dir.path().join("contacts.json"));
    let contact = slotbook_providers::CrmStore::find_by_email(&reopened, "a@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        contact.record.notes_text,
        format!("Meeting on 2024-03-12\nN1{NOTE_SEPARATOR}Meeting on 2024-03-12\nN2")
    );
}
