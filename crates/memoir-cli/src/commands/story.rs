use std::path::PathBuf;

use anyhow::Result;
use memoir_config::Config;
use memoir_core::{Feed, Mood, Story, day_window};
use memoir_engine::GallerySession;
use time::{Date, Month};

use super::AppContext;
use crate::cli::StoryCommands;

pub async fn handle(cmd: StoryCommands, app: &AppContext) -> Result<()> {
    match cmd {
        StoryCommands::Add {
            title,
            description,
            mood,
            image,
        } => add(app, title, description, mood, image).await,
        StoryCommands::List { on } => list(app, on).await,
        StoryCommands::Show { id } => show(app, id).await,
        StoryCommands::Edit {
            id,
            title,
            description,
            mood,
        } => edit(app, id, title, description, mood).await,
        StoryCommands::Delete { id } => delete(app, id).await,
    }
}

async fn add(
    app: &AppContext,
    title: String,
    description: String,
    mood: String,
    images: Vec<PathBuf>,
) -> Result<()> {
    let mood: Mood = mood.parse()?;
    let owner = app.config.identity.clone().ok_or_else(|| {
        anyhow::anyhow!(
            "No identity configured; set `identity` in {}",
            Config::config_path().display()
        )
    })?;

    let mut session = GallerySession::new(&owner);
    for image in &images {
        let extension = image
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("img");
        session.stage(&image.to_string_lossy(), extension);
    }

    let story = Story::new(title, description, mood).with_images(session.remote_paths());
    let story = app.repository.create(story).await?;
    session.commit(app.blobs.as_ref(), &app.pending).await?;

    println!("✓ Created story: {}", story.id);
    if !story.images.is_empty() {
        println!("  {} image(s) attached", story.images.len());
    }
    Ok(())
}

async fn list(app: &AppContext, on: Option<String>) -> Result<()> {
    let mut stream = match on {
        Some(day) => {
            let (start, end) = day_window(parse_date(&day)?, app.zone);
            app.repository.observe_filtered(start, end)?
        }
        None => app.repository.observe_all()?,
    };

    match stream.next().await {
        Some(Ok(feed)) => print_feed(&feed),
        Some(Err(err)) => return Err(err.into()),
        None => {}
    }
    app.repository.cancel_feed();
    Ok(())
}

fn print_feed(feed: &Feed) {
    if feed.is_empty() {
        println!("No stories.");
        return;
    }
    for group in feed {
        println!("{}", group.date);
        for story in &group.stories {
            let time = story.date.time();
            print!(
                "  {:02}:{:02}  [{}] {} ({})",
                time.hour(),
                time.minute(),
                story.mood,
                story.title,
                story.id
            );
            if story.images.is_empty() {
                println!();
            } else {
                println!("  [{} image(s)]", story.images.len());
            }
        }
    }
}

async fn show(app: &AppContext, id: String) -> Result<()> {
    let mut stream = app.repository.observe_selected(&id)?;
    match stream.next().await {
        Some(Ok(story)) => {
            println!("{}", story.title);
            println!("  ID: {}", story.id);
            println!("  Date: {}", story.date);
            println!("  Mood: {}", story.mood);
            if !story.description.is_empty() {
                println!("  {}", story.description);
            }
            for image in &story.images {
                println!("  Image: {image}");
            }
            Ok(())
        }
        Some(Err(err)) => Err(err.into()),
        None => anyhow::bail!("Story not found: {id}"),
    }
}

async fn edit(
    app: &AppContext,
    id: String,
    title: Option<String>,
    description: Option<String>,
    mood: Option<String>,
) -> Result<()> {
    let mut stream = app.repository.observe_selected(&id)?;
    let mut story = match stream.next().await {
        Some(Ok(story)) => story,
        Some(Err(err)) => return Err(err.into()),
        None => anyhow::bail!("Story not found: {id}"),
    };

    if let Some(title) = title {
        story.title = title;
    }
    if let Some(description) = description {
        story.description = description;
    }
    if let Some(mood) = mood {
        story.mood = mood.parse()?;
    }

    let story = app.repository.update(story).await?;
    println!("✓ Updated story: {}", story.id);
    Ok(())
}

async fn delete(app: &AppContext, id: String) -> Result<()> {
    let story = app.repository.delete(&id).await?;
    println!("✓ Deleted story: {}", story.title);
    Ok(())
}

pub async fn purge(app: &AppContext, yes: bool) -> Result<()> {
    if !yes {
        print!("Delete every story for this identity? [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    app.repository.delete_all().await?;
    println!("✓ Deleted all stories");
    Ok(())
}

fn parse_date(s: &str) -> Result<Date> {
    let mut parts = s.splitn(3, '-');
    let year: Option<i32> = parts.next().and_then(|p| p.parse().ok());
    let month: Option<u8> = parts.next().and_then(|p| p.parse().ok());
    let day: Option<u8> = parts.next().and_then(|p| p.parse().ok());

    match (year, month, day) {
        (Some(year), Some(month), Some(day)) => {
            let month = Month::try_from(month)?;
            Ok(Date::from_calendar_date(year, month, day)?)
        }
        _ => anyhow::bail!("Invalid date (expected YYYY-MM-DD): {s}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-02").unwrap(), date!(2024-01-02));
        assert!(parse_date("2024-13-02").is_err());
        assert!(parse_date("yesterday").is_err());
    }
}
