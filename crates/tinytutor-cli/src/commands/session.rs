//! Session management commands.

use chrono::NaiveDateTime;

use tinytutor_core::TutorSession;
use tinytutor_engine::SessionCoordinator;
use tinytutor_session::SessionStore;

use crate::AppContext;

/// Format a timestamp for display.
fn format_time(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// One listing line for a session.
fn format_session_line(s: &TutorSession) -> String {
    let marker = if s.has_content() { "*" } else { " " };
    format!(
        "#{:<4} {}{} [{}] {}",
        s.id,
        marker,
        s.topic,
        s.language,
        format_time(&s.last_accessed_at)
    )
}

fn print_listing(sessions: &[TutorSession]) {
    if sessions.is_empty() {
        println!("No sessions found.");
        return;
    }

    println!("Sessions ({}):", sessions.len());
    println!();
    for session in sessions {
        println!("  {}", format_session_line(session));
    }
    println!();
    println!("Sessions marked * already have a tutorial; 'tinytutor open <id>' shows it.");
}

pub async fn new_session(
    ctx: &AppContext,
    topic: &str,
    language: Option<&str>,
) -> anyhow::Result<()> {
    let coordinator = SessionCoordinator::new(ctx.store.clone());
    let language = language.unwrap_or(&ctx.config.general.language);

    let id = coordinator.create_session(topic, language).await?;
    println!("Created session #{} for '{}'.", id, topic);
    println!("Run 'tinytutor open {}' to generate the tutorial.", id);
    Ok(())
}

pub async fn list(ctx: &AppContext) -> anyhow::Result<()> {
    let sessions = ctx.store.list_all().await?;
    print_listing(&sessions);
    Ok(())
}

pub async fn search(ctx: &AppContext, query: &str) -> anyhow::Result<()> {
    let sessions = ctx.store.search(query).await?;
    if sessions.is_empty() {
        println!("No sessions match '{}'.", query);
        return Ok(());
    }
    print_listing(&sessions);
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: i64) -> anyhow::Result<()> {
    let coordinator = SessionCoordinator::new(ctx.store.clone());
    coordinator.delete_session(id).await?;
    println!("Deleted session #{}.", id);
    Ok(())
}
