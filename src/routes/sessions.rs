use actix_web::{web, HttpResponse, Responder};
use crate::core::{generate_meeting_link, is_meeting_active, is_session_completed, should_show_join_button};
use crate::models::{MeetingLinkResponse, MeetingStatusResponse, SessionSchedule};
use crate::routes::matches::AppState;

/// Configure exchange-session helper routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/sessions/meeting-link", web::post().to(create_meeting_link))
        .route("/sessions/status", web::post().to(session_status));
}

/// POST /api/v1/sessions/meeting-link
async fn create_meeting_link(state: web::Data<AppState>) -> impl Responder {
    let meeting_link = generate_meeting_link(&state.meeting_base_url);
    tracing::debug!("Generated meeting link: {}", meeting_link);

    HttpResponse::Ok().json(MeetingLinkResponse { meeting_link })
}

/// Evaluate a schedule against the server clock
///
/// POST /api/v1/sessions/status
///
/// Request body:
/// ```json
/// { "date": "2024-05-01", "time": "14:00:00", "durationMinutes": 60 }
/// ```
async fn session_status(req: web::Json<SessionSchedule>) -> impl Responder {
    let now = chrono::Utc::now().naive_utc();
    HttpResponse::Ok().json(meeting_status(&req, now))
}

pub fn meeting_status(session: &SessionSchedule, now: chrono::NaiveDateTime) -> MeetingStatusResponse {
    MeetingStatusResponse {
        active: is_meeting_active(session, now),
        show_join_button: should_show_join_button(session, now),
        completed: is_session_completed(session, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn create_session() -> SessionSchedule {
        SessionSchedule {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            duration_minutes: 30,
        }
    }

    #[test]
    fn test_status_during_grace_period() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 15, 0).unwrap();
        let status = meeting_status(&create_session(), now);

        assert!(status.active);
        assert!(!status.show_join_button);
        assert!(status.completed);
    }

    #[test]
    fn test_status_json_field_names() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 25, 0).unwrap();
        let json = serde_json::to_value(meeting_status(&create_session(), now)).unwrap();

        assert_eq!(json["active"], true);
        assert_eq!(json["showJoinButton"], true);
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn test_schedule_parses_from_json() {
        let schedule: SessionSchedule = serde_json::from_str(
            r#"{"date":"2024-05-01","time":"09:30:00","durationMinutes":30}"#,
        )
        .unwrap();

        assert_eq!(schedule, create_session());
    }

    #[actix_web::test]
    async fn test_status_endpoint_survives_calendar_edge() {
        let app = actix_web::test::init_service(actix_web::App::new().configure(configure)).await;

        let req = actix_web::test::TestRequest::post()
            .uri("/sessions/status")
            .set_json(serde_json::json!({
                "date": "+262142-12-31",
                "time": "23:00:00",
                "durationMinutes": 4000000000u32
            }))
            .to_request();
        let status: MeetingStatusResponse = actix_web::test::call_and_read_body_json(&app, req).await;

        assert!(!status.active);
        assert!(!status.show_join_button);
        assert!(!status.completed);
    }
}
