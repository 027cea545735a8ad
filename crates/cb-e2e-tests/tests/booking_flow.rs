//! E2E tests for multi-turn booking over HTTP.

mod helpers;

use helpers::{TZ, TestHarness, at, short_date, tomorrow};

/// Scenario: title first, then date and time, then a bare duration books it.
#[tokio::test]
async fn e2e_booking_across_three_turns() {
    let h = TestHarness::new();

    let (_, json) = h.chat("alice", "book a meeting with John").await;
    assert_eq!(
        json["response"],
        "To schedule this meeting, I need more information about: date, time, duration."
    );
    assert_eq!(json["conversation_context"]["booking_in_progress"], true);

    let (_, json) = h.chat("alice", "tomorrow 3pm").await;
    assert_eq!(
        json["response"],
        "To schedule this meeting, I need more information about: duration."
    );
    let info = &json["conversation_context"]["accumulated_booking_info"];
    assert_eq!(info["title"], "John");
    assert_eq!(info["date"], tomorrow().format("%Y-%m-%d").to_string());
    assert_eq!(info["time"], "15:00:00");

    let (_, json) = h.chat("alice", "30").await;
    assert_eq!(
        json["response"],
        format!(
            "Meeting 'John' scheduled for {} at 03:00 PM (30 minutes)!",
            short_date(tomorrow())
        )
    );
    assert_eq!(json["conversation_context"]["booking_in_progress"], false);

    let events = h.calendar.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "John");
    assert_eq!(events[0].start, at(tomorrow(), 15, 0));
    assert_eq!(events[0].end, at(tomorrow(), 15, 30));
    assert_eq!(events[0].timezone, TZ);
}

/// A clashing booking lists alternatives and stays open until the user moves it.
#[tokio::test]
async fn e2e_conflict_then_reschedule() {
    let h = TestHarness::new();
    h.calendar
        .seed("Review", at(tomorrow(), 15, 0), at(tomorrow(), 16, 0), TZ)
        .await;

    let (_, json) = h
        .chat("alice", "book a call with Sam tomorrow at 3pm for 1 hour")
        .await;
    let reply = json["response"].as_str().unwrap();
    assert!(reply.starts_with("Time slot not available!"), "{reply}");
    assert!(reply.contains("'Review'"));
    let day = tomorrow().format("%Y-%m-%d");
    assert!(reply.contains(&format!("  - {day} 16:00")), "{reply}");
    assert!(!reply.contains(&format!("  - {day} 15:30")), "{reply}");
    assert_eq!(json["conversation_context"]["booking_in_progress"], true);

    let reply = h.say("alice", "5pm").await;
    assert_eq!(
        reply,
        format!(
            "Meeting 'Sam' scheduled for {} at 05:00 PM (60 minutes)!",
            short_date(tomorrow())
        )
    );
    assert_eq!(h.calendar.events().await.len(), 2);
}

/// Availability check first, then pick one of the listed slots by position.
#[tokio::test]
async fn e2e_book_listed_slot() {
    let h = TestHarness::new();
    h.calendar
        .seed("Workshop", at(tomorrow(), 9, 0), at(tomorrow(), 12, 0), TZ)
        .await;

    let reply = h.say("alice", "Am I free tomorrow?").await;
    assert!(reply.contains("- 12:00 PM"), "{reply}");

    // Date comes from the availability check; only the time is missing.
    let reply = h.say("alice", "book a meeting with Ana for 45 minutes").await;
    assert_eq!(
        reply,
        "To schedule this meeting, I need more information about: time."
    );

    let reply = h.say("alice", "the first slot").await;
    assert_eq!(
        reply,
        format!(
            "Meeting 'Ana' scheduled for {} at 12:00 PM (45 minutes)!",
            short_date(tomorrow())
        )
    );
    let events = h.calendar.events().await;
    assert_eq!(events[1].start, at(tomorrow(), 12, 0));
    assert_eq!(events[1].end, at(tomorrow(), 12, 45));
}

/// "never mind" drops a half-finished booking.
#[tokio::test]
async fn e2e_cancel_booking() {
    let h = TestHarness::new();

    h.say("alice", "schedule a dentist appointment").await;
    let reply = h.say("alice", "forget it").await;
    assert_eq!(
        reply,
        "Okay, I've dropped that booking. What else can I do for you?"
    );

    let (_, json) = h.conversation("alice").await;
    assert_eq!(json["context"]["booking_in_progress"], false);
    assert!(json["context"]["accumulated_booking_info"]["title"].is_null());
    assert!(h.calendar.events().await.is_empty());
}

/// All details in one message book immediately, including the location.
#[tokio::test]
async fn e2e_single_message_booking_with_location() {
    let h = TestHarness::new();

    let reply = h
        .say(
            "alice",
            "Book a meeting with Ravi tomorrow at 10:30am for half an hour, location: Room 12",
        )
        .await;
    assert_eq!(
        reply,
        format!(
            "Meeting 'Ravi' scheduled for {} at 10:30 AM (30 minutes)! Location: Room 12.",
            short_date(tomorrow())
        )
    );
    assert_eq!(
        h.calendar.events().await[0].location.as_deref(),
        Some("Room 12")
    );
}
