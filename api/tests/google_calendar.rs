use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use jayscal_api::calendar::{CalendarService, EventQuery, GoogleCalendar};
use jayscal_api::sync::Synchronizer;
use jayscal_api::{
    ApiError, CalendarEventDraft, HomeAway, NormalizedGame, SyncOutcome, TeamProfile,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn athletics_on(day: u32, hour: u32, minute: u32) -> NormalizedGame {
    NormalizedGame {
        date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        start_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        opponent: "Athletics".into(),
        home_away: HomeAway::Home,
        time_confirmed: true,
    }
}

#[tokio::test]
async fn list_sends_window_and_text_query() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/calendars/primary/events")
        .match_header("authorization", "Bearer token-123")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("timeMin".into(), "2026-03-27T04:00:00Z".into()),
            Matcher::UrlEncoded("timeMax".into(), "2026-03-28T03:59:59Z".into()),
            Matcher::UrlEncoded("q".into(), "Blue Jays vs Athletics".into()),
            Matcher::UrlEncoded("singleEvents".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({"items": [
                {"id": "a1", "summary": "Blue Jays vs Athletics", "status": "confirmed"},
                {"id": "a2", "summary": "Blue Jays vs Athletics", "status": "cancelled"}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let calendar = GoogleCalendar::new("token-123", "primary").with_base_url(server.url());
    let events = calendar
        .list_events(&EventQuery {
            time_min: Utc.with_ymd_and_hms(2026, 3, 27, 4, 0, 0).unwrap(),
            time_max: Utc.with_ymd_and_hms(2026, 3, 28, 3, 59, 59).unwrap(),
            text: "Blue Jays vs Athletics".into(),
        })
        .await
        .unwrap();

    list.assert_async().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "a1");
}

#[tokio::test]
async fn insert_posts_event_body() {
    let mut server = Server::new_async().await;
    let insert = server
        .mock("POST", "/calendars/primary/events")
        .match_header("authorization", "Bearer token-123")
        .match_body(Matcher::PartialJson(json!({
            "summary": "Blue Jays vs Athletics",
            "start": {"dateTime": "2026-03-27T19:07:00", "timeZone": "America/Toronto"},
            "end": {"dateTime": "2026-03-27T22:07:00", "timeZone": "America/Toronto"},
            "colorId": "9"
        })))
        .with_status(200)
        .with_body(json!({"id": "new-1", "summary": "Blue Jays vs Athletics"}).to_string())
        .create_async()
        .await;

    let calendar = GoogleCalendar::new("token-123", "primary").with_base_url(server.url());
    let draft = CalendarEventDraft::for_game(&TeamProfile::blue_jays(), &athletics_on(27, 19, 7));
    let created = calendar.insert_event(&draft).await.unwrap();

    insert.assert_async().await;
    assert_eq!(created.id, "new-1");
}

#[tokio::test]
async fn rejected_token_is_an_auth_error() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let calendar = GoogleCalendar::new("expired", "primary").with_base_url(server.url());
    let err = calendar
        .list_events(&EventQuery {
            time_min: Utc.with_ymd_and_hms(2026, 3, 27, 4, 0, 0).unwrap(),
            time_max: Utc.with_ymd_and_hms(2026, 3, 28, 3, 59, 59).unwrap(),
            text: "Blue Jays vs Athletics".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Auth { status: 401, .. }));
}

#[tokio::test]
async fn sync_against_http_calendar_skips_existing_day() {
    let mut server = Server::new_async().await;
    let _existing = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::UrlEncoded("timeMin".into(), "2026-03-27T04:00:00Z".into()))
        .with_status(200)
        .with_body(json!({"items": [{"id": "a1", "summary": "Blue Jays vs Athletics"}]}).to_string())
        .create_async()
        .await;
    let _empty = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::UrlEncoded("timeMin".into(), "2026-03-28T04:00:00Z".into()))
        .with_status(200)
        .with_body(json!({"items": []}).to_string())
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/calendars/primary/events")
        .match_body(Matcher::PartialJson(json!({
            "start": {"dateTime": "2026-03-28T15:07:00"}
        })))
        .with_status(200)
        .with_body(json!({"id": "new-2"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let calendar = GoogleCalendar::new("token-123", "primary").with_base_url(server.url());
    let games = vec![athletics_on(27, 19, 7), athletics_on(28, 15, 7)];
    let outcome = Synchronizer::new(TeamProfile::blue_jays())
        .unwrap()
        .sync(&games, &calendar, |_| {})
        .await;

    insert.assert_async().await;
    assert_eq!(outcome, SyncOutcome { total: 2, added: 1, skipped: 1, failed: 0 });
}

#[tokio::test]
async fn previous_night_game_does_not_count_as_today() {
    let mut server = Server::new_async().await;
    // Google lists by overlap: the 22:30 game on the 27th runs into the 28th.
    let _overnight = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::UrlEncoded("timeMin".into(), "2026-03-28T04:00:00Z".into()))
        .with_status(200)
        .with_body(
            json!({"items": [{
                "id": "late",
                "summary": "Blue Jays vs Athletics",
                "start": {"dateTime": "2026-03-27T22:30:00-04:00", "timeZone": "America/Toronto"}
            }]})
            .to_string(),
        )
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/calendars/primary/events")
        .with_status(200)
        .with_body(json!({"id": "new-3"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let calendar = GoogleCalendar::new("token-123", "primary").with_base_url(server.url());
    let outcome = Synchronizer::new(TeamProfile::blue_jays())
        .unwrap()
        .sync(&[athletics_on(28, 15, 7)], &calendar, |_| {})
        .await;

    insert.assert_async().await;
    assert_eq!(outcome, SyncOutcome { total: 1, added: 1, skipped: 0, failed: 0 });
}

#[tokio::test]
async fn shared_calendar_id_is_percent_encoded() {
    let mut server = Server::new_async().await;
    let list = server
        .mock(
            "GET",
            "/calendars/en.canadian%23holiday@group.v.calendar.google.com/events",
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"items": []}).to_string())
        .create_async()
        .await;

    let calendar =
        GoogleCalendar::new("token-123", "en.canadian#holiday@group.v.calendar.google.com")
            .with_base_url(server.url());
    let events = calendar
        .list_events(&EventQuery {
            time_min: Utc.with_ymd_and_hms(2026, 3, 27, 4, 0, 0).unwrap(),
            time_max: Utc.with_ymd_and_hms(2026, 3, 28, 3, 59, 59).unwrap(),
            text: "Blue Jays vs Athletics".into(),
        })
        .await
        .unwrap();

    list.assert_async().await;
    assert!(events.is_empty());
}
