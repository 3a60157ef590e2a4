use chrono::{Duration, NaiveDateTime};
use crate::models::SessionSchedule;

/// Default video-call host for exchange sessions
pub const DEFAULT_MEETING_BASE_URL: &str = "https://meet.jit.si";

/// How early the room opens before the scheduled start
const JOIN_LEAD_MINUTES: i64 = 10;

/// How long the room stays open after the scheduled end
const GRACE_MINUTES: i64 = 30;

const ROOM_ID_LEN: usize = 10;

/// Generate a fresh meeting link of the form `<base_url>/<room>`
///
/// The room is a 10-character lowercase alphanumeric id.
pub fn generate_meeting_link(base_url: &str) -> String {
    let room: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ROOM_ID_LEN)
        .collect();

    format!("{}/{}", base_url.trim_end_matches('/'), room)
}

/// Time points of a scheduled session
#[derive(Debug, Clone, Copy)]
struct SessionWindow {
    opens: NaiveDateTime,
    ends: NaiveDateTime,
    closes: NaiveDateTime,
}

/// Window of a session, or `None` when it has no duration or falls outside
/// the representable calendar
#[inline]
fn session_window(session: &SessionSchedule) -> Option<SessionWindow> {
    if session.duration_minutes == 0 {
        return None;
    }

    let start = session.date.and_time(session.time);
    let ends = start.checked_add_signed(Duration::minutes(i64::from(session.duration_minutes)))?;

    Some(SessionWindow {
        opens: start.checked_sub_signed(Duration::minutes(JOIN_LEAD_MINUTES))?,
        ends,
        closes: ends.checked_add_signed(Duration::minutes(GRACE_MINUTES))?,
    })
}

/// Room is open from 10 minutes before start until 30 minutes after the end
pub fn is_meeting_active(session: &SessionSchedule, now: NaiveDateTime) -> bool {
    session_window(session).is_some_and(|w| now >= w.opens && now <= w.closes)
}

/// "Join" is offered from 10 minutes before start until the scheduled end
pub fn should_show_join_button(session: &SessionSchedule, now: NaiveDateTime) -> bool {
    session_window(session).is_some_and(|w| now >= w.opens && now <= w.ends)
}

pub fn is_session_completed(session: &SessionSchedule, now: NaiveDateTime) -> bool {
    session_window(session).is_some_and(|w| now > w.ends)
}
