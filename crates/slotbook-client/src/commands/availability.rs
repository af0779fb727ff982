//! Availability command.

use slotbook_protocol::{AvailabilityView, Request, Response};
use slotbook_server::RequestHandler;

use crate::error::{ClientError, ClientResult};

/// Prints the slots of `date` as seen from `timezone`.
pub async fn run(
    handler: &RequestHandler,
    date: &str,
    timezone: &str,
    json: bool,
) -> ClientResult<()> {
    let response = handler.handle(&Request::availability(date, timezone)).await;
    match response {
        Response::Availability { view } => {
            if json {
                print_json(&view)?;
            } else {
                print!("{}", render(&view));
            }
            Ok(())
        }
        Response::Error { error } => Err(ClientError::Rejected(error.to_string())),
        other => Err(ClientError::Rejected(format!(
            "unexpected response: {:?}",
            other
        ))),
    }
}

fn print_json(view: &AvailabilityView) -> ClientResult<()> {
    let text = serde_json::to_string_pretty(view)
        .map_err(|e| ClientError::Protocol(e.into()))?;
    println!("{}", text);
    Ok(())
}

/// Renders one line per slot, viewer-local.
pub fn render(view: &AvailabilityView) -> String {
    let mut out = format!(
        "{} ({} {}, owner in {})\n",
        view.date, view.viewer_timezone, view.viewer_zone_abbreviation, view.owner_timezone
    );
    for slot in &view.slots {
        let marker = if slot.available { "+" } else { "-" };
        let status = format!("{:?}", slot.status).to_lowercase();
        out.push_str(&format!("  {} {}  {}\n", marker, slot.label, status));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use slotbook_core::SlotStatus;
    use slotbook_protocol::SlotView;

    #[test]
    fn render_marks_free_slots() {
        let view = AvailabilityView {
            date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            viewer_timezone: "Asia/Tokyo".to_string(),
            viewer_zone_abbreviation: "JST".to_string(),
            owner_timezone: "Europe/London".to_string(),
            slots: vec![
                SlotView {
                    start: "2024-03-12T18:00:00+09:00".to_string(),
                    end: "2024-03-12T18:30:00+09:00".to_string(),
                    label: "18:00".to_string(),
                    available: true,
                    status: SlotStatus::Free,
                },
                SlotView {
                    start: "2024-03-12T18:30:00+09:00".to_string(),
                    end: "2024-03-12T19:00:00+09:00".to_string(),
                    label: "18:30".to_string(),
                    available: false,
                    status: SlotStatus::Busy,
                },
            ],
        };
        assert_eq!(
            render(&view),
            "2024-03-12 (Asia/Tokyo JST, owner in Europe/London)\n  + 18:00  free\n  - 18:30  busy\n"
        );
    }
}
