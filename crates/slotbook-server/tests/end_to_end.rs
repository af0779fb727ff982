//! Tokyo visitor, London owner: book a slot, then see it taken.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use slotbook_core::{BookingPhase, SlotStatus};
use slotbook_protocol::BookingPayload;
use slotbook_providers::{MemoryCalendar, MemoryCrmStore};
use slotbook_server::{
    AvailabilityEngine, BookingOrchestrator, ServiceConfig, SlotVerdict, WindowAnchor,
};

fn config() -> Arc<ServiceConfig> {
    Arc::new(
        ServiceConfig::default()
            .with_window_anchor(WindowAnchor::Viewer)
            .with_weekdays_only(false),
    )
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

fn status_at(verdicts: &[SlotVerdict], label: &str) -> Option<SlotStatus> {
    verdicts
        .iter()
        .find(|v| v.display_start.format("%H:%M").to_string() == label)
        .map(|v| v.status)
}

async fn book_and_requery(date: NaiveDate, start: &str, end: &str) -> (String, Vec<SlotVerdict>) {
    let calendar = Arc::new(MemoryCalendar::new());
    let engine = AvailabilityEngine::new(config(), calendar.clone());
    let orchestrator =
        BookingOrchestrator::new(config(), calendar.clone(), Arc::new(MemoryCrmStore::new()));

    let before = engine.query_at(date, "Asia/Tokyo", now()).await.unwrap();
    assert_eq!(status_at(&before.verdicts, "09:00"), Some(SlotStatus::Free));

    let mut receipt = orchestrator
        .book(&BookingPayload::new(
            "Kenji",
            "kenji@example.jp",
            start,
            end,
            "Asia/Tokyo",
        ))
        .await
        .unwrap();
    let sync = receipt.take_crm_sync().unwrap();
    assert_eq!(
        sync.wait(Duration::from_secs(5)).await,
        Some(BookingPhase::CrmSynced)
    );

    let event = calendar.events().remove(0).event;
    assert_eq!(event.time_zone(), "Europe/London");

    let after = engine.query_at(date, "Asia/Tokyo", now()).await.unwrap();
    (event.start.to_rfc3339(), after.verdicts)
}

#[tokio::test]
async fn tokyo_morning_lands_at_london_midnight_in_winter() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let (start, after) =
        book_and_requery(date, "2024-03-10T09:00:00", "2024-03-10T09:30:00").await;

    // London is still on GMT
    assert_eq!(start, "2024-03-10T00:00:00+00:00");
    assert_eq!(status_at(&after, "09:00"), Some(SlotStatus::Busy));
    assert_eq!(status_at(&after, "09:30"), Some(SlotStatus::Free));
    assert_eq!(after.iter().filter(|v| v.available()).count(), 14);
}

#[tokio::test]
async fn tokyo_morning_lands_at_london_one_am_in_summer() {
    let date = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    let (start, after) =
        book_and_requery(date, "2024-04-10T09:00:00", "2024-04-10T09:30:00").await;

    // London has moved to BST
    assert_eq!(start, "2024-04-10T01:00:00+01:00");
    assert_eq!(status_at(&after, "09:00"), Some(SlotStatus::Busy));
    assert_eq!(status_at(&after, "09:30"), Some(SlotStatus::Free));
}
