use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ArgMatches;
use console::style;
use std::path::Path;
use storysnaps_config::{ConfigManager, GeneratorConfig};
use storysnaps_core::{Story, StoryId, StoryState};
use storysnaps_library::StoryService;
use storysnaps_network::{
    GenerationRequest, GeneratorClientConfig, HttpStoryGenerator, StoryGenerator,
};
use storysnaps_resilience::RetryPolicy;

/// Write a default config and an empty catalog if they are missing
pub async fn init(manager: &ConfigManager, service: &StoryService) -> Result<()> {
    if manager.initialize().context("Failed to write default config")? {
        log::info!("Wrote default config to {}", manager.config_path().display());
        println!("Config written to {}", manager.config_path().display());
    }

    if !service.catalog().exists().await? {
        service
            .catalog()
            .save(&[])
            .await
            .context("Failed to create catalog")?;
        log::info!("Created empty catalog at {}", service.catalog().path().display());
    }

    println!("{} Story store ready", style("✓").green().bold());
    println!("  Catalog: {}", service.catalog().path().display());
    println!("  Images:  {}", service.blobs().dir().display());
    Ok(())
}

/// List all stories
pub async fn list_stories(service: &StoryService, matches: &ArgMatches) -> Result<()> {
    let stories = service
        .list_stories()
        .await
        .context("Failed to list stories")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&stories)?);
        return Ok(());
    }

    if stories.is_empty() {
        println!("No stories yet. Use 'create' to start one.");
        return Ok(());
    }

    println!("\n{} Stories", style(stories.len()).bold().cyan());
    println!("{}", "=".repeat(60));
    for story in &stories {
        println!("{}", story_summary(story));
    }
    Ok(())
}

/// Show one story with its pages
pub async fn show_story(service: &StoryService, matches: &ArgMatches) -> Result<()> {
    let id = story_id(matches)?;
    let story = service
        .get_story(&id)
        .await
        .with_context(|| format!("Failed to load story {}", id))?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&story)?);
        return Ok(());
    }

    println!("\n{}", style(&story.title).bold());
    println!("{}", "=".repeat(60));
    println!("ID:     {}", story.id);
    println!("State:  {}", story.state());
    println!("Pages:  {}", story.pages.len());

    for (index, page) in story.pages.iter().enumerate() {
        println!("\n{} {}", style(format!("Page {}", index + 1)).cyan(), page.image_path);
        println!("{}", page.text);
    }
    Ok(())
}

/// Create an empty story
pub async fn create_story(service: &StoryService) -> Result<()> {
    let story = service
        .create_story()
        .await
        .context("Failed to create story")?;

    println!("{} Story created", style("✓").green().bold());
    println!("  ID: {}", story.id);
    println!("  Title: {}", story.title);
    Ok(())
}

/// Append a page from an image file
pub async fn add_page(service: &StoryService, matches: &ArgMatches) -> Result<()> {
    let id = story_id(matches)?;
    let text = required(matches, "text")?;
    let image = encode_image(Path::new(required(matches, "image")?)).await?;

    let story = service
        .add_page(&id, text, &image)
        .await
        .with_context(|| format!("Failed to add page to story {}", id))?;

    print_page_added(&story);
    Ok(())
}

/// Rename a story
pub async fn rename_story(service: &StoryService, matches: &ArgMatches) -> Result<()> {
    let id = story_id(matches)?;
    let title = required(matches, "title")?;

    let story = service
        .rename_story(&id, title)
        .await
        .with_context(|| format!("Failed to rename story {}", id))?;

    println!("{} Story {} renamed to '{}'", style("✓").green().bold(), story.id, story.title);
    Ok(())
}

/// Mark a story finished
pub async fn finish_story(service: &StoryService, matches: &ArgMatches) -> Result<()> {
    let id = story_id(matches)?;
    let story = service
        .finish_story(&id)
        .await
        .with_context(|| format!("Failed to finish story {}", id))?;

    println!(
        "{} '{}' finished with {} pages",
        style("✓").green().bold(),
        story.title,
        story.pages.len()
    );
    Ok(())
}

/// Delete a story; page images stay until `prune`
pub async fn delete_story(service: &StoryService, matches: &ArgMatches) -> Result<()> {
    let id = story_id(matches)?;
    let outcome = service
        .delete_story(&id)
        .await
        .with_context(|| format!("Failed to delete story {}", id))?;

    log::debug!("Delete {}: {}", id, outcome.message);
    if outcome.success {
        println!("{} {}", style("✓").green().bold(), outcome.message);
    } else {
        println!("{} {}", style("!").yellow().bold(), outcome.message);
    }
    Ok(())
}

/// Caption a photo remotely, then append it as a page
pub async fn generate_page(
    service: &StoryService,
    config: &storysnaps_config::Config,
    matches: &ArgMatches,
) -> Result<()> {
    let id = story_id(matches)?;
    let end_story = matches.get_flag("end");
    let image = encode_image(Path::new(required(matches, "image")?)).await?;

    let story = service
        .get_story(&id)
        .await
        .with_context(|| format!("Failed to load story {}", id))?;

    let request = GenerationRequest::new(image.clone())
        .with_previous_stories(story.transcript())
        .ending(end_story);

    let generator = generator_from_config(&config.generator)?;
    log::debug!(
        "Generating page {} for story {} (end: {})",
        story.next_page_ordinal(),
        id,
        end_story
    );
    println!("Asking {} for the next page...", config.generator.endpoint);
    let text = generator
        .generate(&request)
        .await
        .context("Story generation failed")?;

    let story = service
        .add_page(&id, &text, &image)
        .await
        .with_context(|| format!("Failed to add page to story {}", id))?;
    print_page_added(&story);

    if end_story {
        let story = service
            .finish_story(&id)
            .await
            .with_context(|| format!("Failed to finish story {}", id))?;
        println!("{} '{}' finished", style("✓").green().bold(), story.title);
    }
    Ok(())
}

/// Delete images no page refers to
pub async fn prune(service: &StoryService) -> Result<()> {
    let removed = service
        .prune_orphaned_blobs()
        .await
        .context("Failed to prune images")?;

    if removed.is_empty() {
        println!("No orphaned images.");
    } else {
        println!("{} Removed {} orphaned images", style("✓").green().bold(), removed.len());
        for name in removed {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn generator_from_config(config: &GeneratorConfig) -> Result<HttpStoryGenerator> {
    let client_config = GeneratorClientConfig {
        endpoint: config.endpoint.clone(),
        timeout: config.timeout(),
        retry_policy: RetryPolicy::try_new(config.max_attempts)?,
        ..GeneratorClientConfig::default()
    };
    HttpStoryGenerator::new(client_config).context("Failed to create generator client")
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("--{} is required", name))
}

fn story_id(matches: &ArgMatches) -> Result<StoryId> {
    parse_story_id(required(matches, "id")?)
}

fn parse_story_id(raw: &str) -> Result<StoryId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Story ID must not be empty"));
    }
    Ok(StoryId::new(trimmed))
}

async fn encode_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}

fn story_summary(story: &Story) -> String {
    let state = match story.state() {
        StoryState::Finished => style(story.state().to_string()).green(),
        StoryState::InProgress => style(story.state().to_string()).yellow(),
        StoryState::Empty => style(story.state().to_string()).dim(),
    };
    format!(
        "{:>4}  {:<40} {:>3} pages  {}",
        story.id,
        story.title,
        story.pages.len(),
        state
    )
}

fn print_page_added(story: &Story) {
    println!(
        "{} Page {} added to '{}'",
        style("✓").green().bold(),
        story.pages.len(),
        story.title
    );
    if let Some(page) = story.last_page() {
        println!("  Image: {}", page.image_path);
    }
}
