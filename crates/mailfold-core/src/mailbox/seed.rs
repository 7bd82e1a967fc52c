//! Starter data for an empty mailbox.
//!
//! Mirrors the seeded demo content served by `/api/init`: one owner
//! profile and a handful of conversations spread across folders. Ids are
//! fixed so an interrupted seed run can be resumed message by message.

use crate::message::{EmailAddress, Folder, Message};
use crate::user::User;

/// The seeded mailbox owner.
pub(crate) fn seed_user() -> User {
    User {
        id: "seed-user".to_string(),
        name: "User".to_string(),
        email: "user@aeromail.dev".to_string(),
    }
}

/// Starter messages, timestamped relative to `now_ms`.
pub(crate) fn seed_messages(now_ms: i64) -> Vec<Message> {
    let user = EmailAddress::new("User", "user@aeromail.dev");

    let minutes = |n: i64| now_ms - n * 60_000;

    vec![
        inbound(
            "seed-welcome-1",
            "seed-welcome",
            EmailAddress::new("Aero Team", "hello@aeromail.dev"),
            &user,
            "Welcome to your new mailbox",
            "Thanks for trying Aero Mail. This conversation shows how threads \
             group related messages together.",
            minutes(90),
            false,
        ),
        inbound(
            "seed-welcome-2",
            "seed-welcome",
            EmailAddress::new("Aero Team", "hello@aeromail.dev"),
            &user,
            "Welcome to your new mailbox",
            "One more tip: star a message and it will show up in the Starred \
             view until you unstar it or move it to trash.",
            minutes(60),
            false,
        ),
        inbound(
            "seed-launch-1",
            "seed-launch",
            EmailAddress::new("Dana Cruz", "dana@orbitworks.io"),
            &user,
            "Launch review on Thursday",
            "Can you make the launch review on Thursday afternoon? Agenda to \
             follow once the slides are in.",
            minutes(45),
            true,
        ),
        outbound(
            "seed-launch-2",
            "seed-launch",
            &user,
            EmailAddress::new("Dana Cruz", "dana@orbitworks.io"),
            "Launch review on Thursday",
            "Thursday works. I'll bring the readiness checklist.",
            minutes(30),
        ),
        inbound(
            "seed-receipt-1",
            "seed-receipt",
            EmailAddress::new("Billing", "billing@orbitworks.io"),
            &user,
            "Your March invoice",
            "Your invoice for March is attached. No action is required.",
            minutes(15),
            false,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn inbound(
    id: &str,
    thread_id: &str,
    from: EmailAddress,
    to: &EmailAddress,
    subject: &str,
    body: &str,
    timestamp: i64,
    is_starred: bool,
) -> Message {
    Message {
        id: id.to_string(),
        thread_id: thread_id.to_string(),
        from,
        to: vec![to.clone()],
        subject: subject.to_string(),
        snippet: Message::snippet_of(body),
        body: body.to_string(),
        timestamp,
        is_read: false,
        is_starred,
        folder: Folder::Inbox,
    }
}

fn outbound(
    id: &str,
    thread_id: &str,
    from: &EmailAddress,
    to: EmailAddress,
    subject: &str,
    body: &str,
    timestamp: i64,
) -> Message {
    Message {
        id: id.to_string(),
        thread_id: thread_id.to_string(),
        from: from.clone(),
        to: vec![to],
        subject: subject.to_string(),
        snippet: Message::snippet_of(body),
        body: body.to_string(),
        timestamp,
        is_read: true,
        is_starred: false,
        folder: Folder::Sent,
    }
}
