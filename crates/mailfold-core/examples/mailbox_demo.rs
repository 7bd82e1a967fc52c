#![allow(clippy::expect_used, clippy::uninlined_format_args)]
//! Example: drive a mailbox end to end in memory.
//!
//! Seeds starter data, lists the inbox as threads, stars a message,
//! moves one to trash, and shows the starred view tracking both edits.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=debug cargo run --package mailfold-core --example mailbox_demo
//! ```

use mailfold_core::{FolderView, MailboxService, MessageChange};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mailbox = MailboxService::in_memory().await?;
    mailbox.ensure_seed().await?;

    let user = mailbox
        .current_user()
        .await?
        .expect("seed always creates a user");
    println!("Mailbox for {} <{}>\n", user.name, user.email);

    println!("Inbox threads:");
    for thread in mailbox.list_threads(FolderView::Inbox, 0).await? {
        println!(
            "  [{}{}] {} — {} ({} messages, {} unread)",
            if thread.is_starred { "*" } else { " " },
            if thread.unread_count > 0 { "!" } else { " " },
            thread.subject,
            thread.participants_display(),
            thread.message_count(),
            thread.unread_count,
        );
    }

    // Star the newest inbox message, trash the oldest.
    let inbox = mailbox.list_folder(FolderView::Inbox, 0).await?;
    let newest = inbox.first().expect("seeded inbox is not empty");
    let oldest = inbox.last().expect("seeded inbox is not empty");

    mailbox
        .mutate(&newest.id, &[MessageChange::SetStarred(true)])
        .await?;
    mailbox
        .mutate(
            &oldest.id,
            &[MessageChange::MoveToFolder(mailfold_core::Folder::Trash)],
        )
        .await?;

    println!("\nStarred after edits:");
    for message in mailbox.list_folder(FolderView::Starred, 0).await? {
        println!("  {} — {}", message.subject, message.snippet);
    }

    let reindexed = mailbox.reconcile().await?;
    println!("\nReconciled {} messages.", reindexed);

    Ok(())
}
