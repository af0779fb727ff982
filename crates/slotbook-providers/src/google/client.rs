//! Google Calendar API client.
//!
//! Covers the two endpoints slotbook needs: `freeBusy.query` for
//! availability and `events.insert` for bookings.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use slotbook_core::{BusyInterval, TimeWindow};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::provider::{CreatedEvent, NewEvent};

use super::config::GoogleConfig;

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    config: GoogleConfig,
}

impl GoogleCalendarClient {
    /// Creates a client presenting `access_token`.
    pub fn new(access_token: impl Into<String>, config: GoogleConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProviderError::configuration("failed to create HTTP client").with_source(e)
            })?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            config,
        })
    }

    /// Returns the busy intervals of one calendar inside `window`.
    pub async fn free_busy(
        &self,
        calendar_id: &str,
        window: TimeWindow,
    ) -> ProviderResult<Vec<BusyInterval>> {
        let body = FreeBusyRequest {
            time_min: window.start.to_rfc3339(),
            time_max: window.end.to_rfc3339(),
            items: vec![FreeBusyItem {
                id: calendar_id.to_string(),
            }],
        };

        let response = self
            .http_client
            .post(self.config.endpoint("freeBusy"))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let parsed: FreeBusyResponse = read_json(response).await?;
        let busy = parsed.busy_for(calendar_id)?;
        debug!(calendar_id, count = busy.len(), "fetched busy intervals");
        Ok(busy)
    }

    /// Inserts an event and emails the attendees.
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> ProviderResult<CreatedEvent> {
        let url = self.config.endpoint(&format!(
            "calendars/{}/events",
            urlencoding::encode(calendar_id)
        ));

        let mut request = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("sendUpdates", "all")]);
        if event.conference {
            request = request.query(&[("conferenceDataVersion", "1")]);
        }

        let response = request
            .json(&EventInsert::from(event))
            .send()
            .await
            .map_err(request_error)?;

        let created: ApiEvent = read_json(response).await?;
        let conference_uri = created.join_uri();
        debug!(event_id = %created.id, calendar_id, "inserted event");
        Ok(CreatedEvent {
            id: created.id,
            html_link: created.html_link,
            conference_uri,
        })
    }
}

fn request_error(e: reqwest::Error) -> ProviderError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    ProviderError::network(message).with_source(e)
}

/// Maps non-success statuses to errors and parses the body.
async fn read_json<T>(response: reqwest::Response) -> ProviderResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();

    if let Some(code) = ProviderErrorCode::from_http_status(status.as_u16()) {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        let mut message = format!("API error ({}): {}", status, api_error_message(&body));
        if let Some(secs) = retry_after {
            message.push_str(&format!(", retry after {} seconds", secs));
        }
        warn!(%status, "calendar API call failed");
        return Err(ProviderError::new(code, message));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
    })
}

/// Extracts `error.message` from a Google error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyRequest {
    time_min: String,
    time_max: String,
    items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
struct FreeBusyItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<ApiBusy>,
    #[serde(default)]
    errors: Vec<ApiCalendarError>,
}

#[derive(Debug, Deserialize)]
struct ApiBusy {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize)]
struct ApiCalendarError {
    #[serde(default)]
    reason: String,
}

impl FreeBusyResponse {
    fn busy_for(self, calendar_id: &str) -> ProviderResult<Vec<BusyInterval>> {
        let mut calendars = self.calendars;
        let calendar = calendars.remove(calendar_id).ok_or_else(|| {
            ProviderError::invalid_response(format!("no free/busy data for {}", calendar_id))
        })?;

        if let Some(error) = calendar.errors.first() {
            return Err(ProviderError::rejected(format!(
                "free/busy query for {} failed: {}",
                calendar_id, error.reason
            )));
        }

        Ok(calendar
            .busy
            .into_iter()
            .filter_map(|b| {
                let interval = BusyInterval::from_offsets(b.start, b.end);
                if interval.is_none() {
                    warn!(start = %b.start, end = %b.end, "skipping empty busy interval");
                }
                interval
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventInsert {
    summary: String,
    description: String,
    start: ApiEventTime,
    end: ApiEventTime,
    attendees: Vec<ApiAttendee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conference_data: Option<ApiConferenceRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct ApiAttendee {
    email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiConferenceRequest {
    create_request: ApiCreateRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiCreateRequest {
    request_id: String,
    conference_solution_key: ApiSolutionKey,
}

#[derive(Debug, Serialize)]
struct ApiSolutionKey {
    #[serde(rename = "type")]
    kind: String,
}

impl From<&NewEvent> for EventInsert {
    fn from(event: &NewEvent) -> Self {
        let time_zone = event.time_zone().to_string();
        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: ApiEventTime {
                date_time: event.start.to_rfc3339(),
                time_zone: time_zone.clone(),
            },
            end: ApiEventTime {
                date_time: event.end.to_rfc3339(),
                time_zone,
            },
            attendees: event
                .attendees
                .iter()
                .map(|email| ApiAttendee {
                    email: email.clone(),
                })
                .collect(),
            conference_data: event.conference.then(|| ApiConferenceRequest {
                create_request: ApiCreateRequest {
                    request_id: event.dedup_token.clone(),
                    conference_solution_key: ApiSolutionKey {
                        kind: "hangoutsMeet".to_string(),
                    },
                },
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: String,
    html_link: Option<String>,
    hangout_link: Option<String>,
    conference_data: Option<ApiConferenceData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiConferenceData {
    #[serde(default)]
    entry_points: Vec<ApiEntryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEntryPoint {
    entry_point_type: String,
    uri: String,
}

impl ApiEvent {
    fn join_uri(&self) -> Option<String> {
        self.conference_data
            .as_ref()
            .and_then(|cd| cd.entry_points.iter().find(|e| e.entry_point_type == "video"))
            .map(|e| e.uri.clone())
            .or_else(|| self.hangout_link.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::Tz;
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 12, h, m, 0).unwrap()
    }

    fn new_event(conference: bool) -> NewEvent {
        let start = utc(10, 0).with_timezone(&Tz::Europe__London);
        NewEvent {
            summary: "Session with Ada".into(),
            description: "Roadmap".into(),
            start,
            end: start + Duration::minutes(30),
            attendees: vec!["ada@example.com".into(), "bob@example.com".into()],
            dedup_token: "abc123".into(),
            conference,
        }
    }

    fn client(server: &MockServer) -> GoogleCalendarClient {
        let config = GoogleConfig::new("test-token")
            .with_api_base(Url::parse(&server.uri()).unwrap());
        GoogleCalendarClient::new("test-token", config).unwrap()
    }

    #[test]
    fn parse_free_busy_response() {
        let json = r#"{
            "kind": "calendar#freeBusy",
            "calendars": {
                "primary": {
                    "busy": [
                        {"start": "2024-03-12T10:00:00Z", "end": "2024-03-12T10:30:00Z"},
                        {"start": "2024-03-12T20:00:00+09:00", "end": "2024-03-12T21:00:00+09:00"}
                    ]
                }
            }
        }"#;

        let response: FreeBusyResponse = serde_json::from_str(json).unwrap();
        let busy = response.busy_for("primary").unwrap();
        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0].start, utc(10, 0));
        assert_eq!(busy[1].start, utc(11, 0));
    }

    #[test]
    fn free_busy_calendar_errors_are_rejections() {
        let json = r#"{"calendars": {"primary": {"errors": [{"domain": "global", "reason": "notFound"}]}}}"#;
        let response: FreeBusyResponse = serde_json::from_str(json).unwrap();
        let err = response.busy_for("primary").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Rejected);
        assert!(err.message().contains("notFound"));
    }

    #[test]
    fn free_busy_missing_calendar() {
        let response: FreeBusyResponse = serde_json::from_str(r#"{"calendars": {}}"#).unwrap();
        let err = response.busy_for("primary").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[test]
    fn event_insert_body() {
        let body = serde_json::to_value(EventInsert::from(&new_event(true))).unwrap();
        assert_eq!(body["start"]["dateTime"], "2024-03-12T10:00:00+00:00");
        assert_eq!(body["start"]["timeZone"], "Europe/London");
        assert_eq!(body["attendees"][1]["email"], "bob@example.com");
        assert_eq!(body["conferenceData"]["createRequest"]["requestId"], "abc123");
        assert_eq!(
            body["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );

        let body = serde_json::to_value(EventInsert::from(&new_event(false))).unwrap();
        assert!(body.get("conferenceData").is_none());
    }

    #[test]
    fn parse_created_event() {
        let json = r#"{
            "id": "evt1",
            "htmlLink": "https://calendar.google.com/event?eid=evt1",
            "conferenceData": {
                "entryPoints": [
                    {"entryPointType": "phone", "uri": "tel:+1-555"},
                    {"entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij"}
                ]
            }
        }"#;
        let event: ApiEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.join_uri().as_deref(),
            Some("https://meet.google.com/abc-defg-hij")
        );
    }

    #[test]
    fn error_body_message() {
        let body = r#"{"error": {"code": 403, "message": "Insufficient Permission"}}"#;
        assert_eq!(api_error_message(body), "Insufficient Permission");
        assert_eq!(api_error_message("plain text\n"), "plain text");
    }

    #[tokio::test]
    async fn free_busy_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/freeBusy"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({"items": [{"id": "primary"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "calendars": {"primary": {"busy": [
                    {"start": "2024-03-12T10:00:00Z", "end": "2024-03-12T10:30:00Z"}
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let busy = client(&server)
            .free_busy("primary", TimeWindow::new(utc(0, 0), utc(23, 0)))
            .await
            .unwrap();
        assert_eq!(busy, vec![BusyInterval::new(utc(10, 0), utc(10, 30)).unwrap()]);
    }

    #[tokio::test]
    async fn insert_event_sends_updates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(query_param("sendUpdates", "all"))
            .and(query_param("conferenceDataVersion", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "evt42",
                "hangoutLink": "https://meet.google.com/xyz"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client(&server)
            .insert_event("primary", &new_event(true))
            .await
            .unwrap();
        assert_eq!(created.id, "evt42");
        assert_eq!(created.conference_uri.as_deref(), Some("https://meet.google.com/xyz"));
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/freeBusy"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"code": 401, "message": "Invalid Credentials"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client
            .free_busy("primary", TimeWindow::new(utc(0, 0), utc(23, 0)))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert!(err.message().contains("Invalid Credentials"));

        let err = client
            .insert_event("primary", &new_event(false))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert!(err.is_retryable());
    }
}
