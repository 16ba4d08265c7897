//! Tutoring commands: tutorial generation, Q&A, image description.

use std::path::Path;
use std::sync::Arc;

use tinytutor_core::TutorSession;
use tinytutor_engine::{ContentService, SessionCoordinator};
use tinytutor_providers::{GeminiClient, InlineImage};
use tinytutor_session::SessionStore;

use crate::AppContext;

/// Build the content service from the configured credential.
///
/// A missing or empty credential fails here, before any session state
/// is touched.
fn content_service(ctx: &AppContext) -> anyhow::Result<ContentService> {
    let api_key = ctx.config.provider.resolve_api_key().unwrap_or_default();

    let mut client =
        GeminiClient::new(api_key)?.with_default_model(ctx.config.general.model.clone());
    if let Some(ref base_url) = ctx.config.provider.base_url {
        client = client.with_base_url(base_url.clone());
    }

    Ok(ContentService::new(Arc::new(client)).with_model(ctx.config.general.model.clone()))
}

fn print_tutorial(session: &TutorSession) {
    println!("#{} {}", session.id, session.topic);
    println!();

    let Some(ref generated) = session.generated else {
        println!("(no tutorial yet)");
        return;
    };

    println!("{}", generated.content);

    if !generated.image_urls.is_empty() {
        println!();
        println!("Pictures:");
        for url in &generated.image_urls {
            println!("  {}", url);
        }
    }

    if !generated.youtube_links.is_empty() {
        println!();
        println!("Videos:");
        for url in &generated.youtube_links {
            println!("  {}", url);
        }
    }
}

pub async fn open(ctx: &AppContext, id: i64, language: Option<&str>) -> anyhow::Result<()> {
    let coordinator = SessionCoordinator::new(ctx.store.clone());

    let Some(mut session) = coordinator.open_session(id).await? else {
        println!("Session #{} not found. Use 'tinytutor list' to see sessions.", id);
        return Ok(());
    };

    let language = language.unwrap_or(&session.language).to_string();

    // Generate on first open, or regenerate when the language changes.
    if session.generated.is_none() || language != session.language {
        let service = content_service(ctx)?;
        println!("Generating tutorial about '{}'...", session.topic);

        let generated = service
            .generate_topic_content(&session.topic, &language)
            .await?;
        session.generated = Some(generated);
        session.language = language;
        coordinator.update_session(&session).await?;
    }

    println!();
    print_tutorial(&session);
    Ok(())
}

pub async fn ask(ctx: &AppContext, id: i64, question: &str) -> anyhow::Result<()> {
    let Some(session) = ctx.store.get(id).await? else {
        println!("Session #{} not found. Use 'tinytutor list' to see sessions.", id);
        return Ok(());
    };

    let context = session
        .generated
        .as_ref()
        .map(|g| g.content.as_str())
        .unwrap_or_default();

    let service = content_service(ctx)?;
    let answer = service
        .answer_question(question, context, &session.language)
        .await;

    println!("{}", answer);
    Ok(())
}

pub async fn explain(ctx: &AppContext, path: &Path, language: Option<&str>) -> anyhow::Result<()> {
    let data = std::fs::read(path)?;
    let image = InlineImage {
        media_type: media_type_for(path).to_string(),
        data,
    };

    let language = language.unwrap_or(&ctx.config.general.language);
    let service = content_service(ctx)?;
    let description = service.explain_image(image, language).await;

    println!("{}", description);
    Ok(())
}

/// Guess a MIME type from the file extension.
fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_media_type_for_common_extensions() {
        assert_eq!(media_type_for(&PathBuf::from("cat.JPG")), "image/jpeg");
        assert_eq!(media_type_for(&PathBuf::from("dog.png")), "image/png");
        assert_eq!(media_type_for(&PathBuf::from("bird.gif")), "image/gif");
        assert_eq!(
            media_type_for(&PathBuf::from("notes.txt")),
            "application/octet-stream"
        );
    }
}
