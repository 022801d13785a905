use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::style;
use std::path::PathBuf;
use storysnaps_config::{Config, ConfigManager};
use storysnaps_core::StoreError;
use storysnaps_library::{StorageLayout, StoryService};

mod commands;

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_name("STORY_ID")
        .help("Story ID")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print JSON instead of text")
        .action(ArgAction::SetTrue)
}

fn image_arg() -> Arg {
    Arg::new("image")
        .short('i')
        .long("image")
        .required(true)
        .value_name("FILE")
        .help("Photo for the page")
}

fn build_cli() -> Command {
    Command::new("storysnaps")
        .version(env!("CARGO_PKG_VERSION"))
        .author("StorySnaps Team")
        .about("Build illustrated stories one photo at a time")
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding stories.json and the image folder")
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .subcommand(Command::new("init").about("Write a default config and prepare the story store"))
        .subcommand(Command::new("list").about("List all stories").arg(json_arg()))
        .subcommand(
            Command::new("show")
                .about("Show a story with its pages")
                .arg(id_arg())
                .arg(json_arg()),
        )
        .subcommand(Command::new("create").about("Create an empty story"))
        .subcommand(
            Command::new("add-page")
                .about("Append a page to a story")
                .arg(id_arg())
                .arg(
                    Arg::new("text")
                        .short('t')
                        .long("text")
                        .required(true)
                        .value_name("TEXT")
                        .help("Caption text"),
                )
                .arg(image_arg()),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a story")
                .arg(id_arg())
                .arg(Arg::new("title").required(true).value_name("TITLE").help("New title")),
        )
        .subcommand(Command::new("finish").about("Mark a story finished").arg(id_arg()))
        .subcommand(Command::new("delete").about("Delete a story").arg(id_arg()))
        .subcommand(
            Command::new("generate")
                .about("Caption a photo with the remote generator and append it as a page")
                .arg(id_arg())
                .arg(image_arg())
                .arg(
                    Arg::new("end")
                        .long("end")
                        .help("Ask for an ending and finish the story")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("prune").about("Delete images no page refers to"))
}

fn load_config(matches: &ArgMatches) -> Result<(ConfigManager, Config)> {
    let manager = match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")?;

    let mut config = manager
        .load_with_env_overrides()
        .context("Failed to load config")?;

    if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.storage.data_dir = Some(PathBuf::from(dir));
    }

    Ok((manager, config))
}

fn storage_layout(config: &Config) -> Result<StorageLayout> {
    let root = config
        .storage
        .resolve_data_dir()
        .context("Failed to resolve data directory")?;

    Ok(StorageLayout::new(root)
        .with_catalog_file(&config.storage.catalog_file)
        .with_images_dir(&config.storage.images_dir))
}

async fn run(matches: ArgMatches) -> Result<()> {
    let (manager, config) = load_config(&matches)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.as_filter()),
    )
    .init();

    let layout = storage_layout(&config)?;
    log::debug!(
        "Using config {} and data directory {}",
        manager.config_path().display(),
        layout.root().display()
    );
    let service = StoryService::open(&layout)
        .await
        .context("Failed to open story store")?;

    match matches.subcommand() {
        Some(("init", _)) => commands::init(&manager, &service).await,
        Some(("list", sub)) => commands::list_stories(&service, sub).await,
        Some(("show", sub)) => commands::show_story(&service, sub).await,
        Some(("create", _)) => commands::create_story(&service).await,
        Some(("add-page", sub)) => commands::add_page(&service, sub).await,
        Some(("rename", sub)) => commands::rename_story(&service, sub).await,
        Some(("finish", sub)) => commands::finish_story(&service, sub).await,
        Some(("delete", sub)) => commands::delete_story(&service, sub).await,
        Some(("generate", sub)) => commands::generate_page(&service, &config, sub).await,
        Some(("prune", _)) => commands::prune(&service).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let result = run(matches).await;
    if let Err(e) = &result {
        log::error!("Command failed: {:#}", e);
        if let Some(store_error) = e.chain().find_map(|c| c.downcast_ref::<StoreError>()) {
            eprintln!(
                "{} {} ({})",
                style("✗").red().bold(),
                store_error.user_message(),
                store_error.recovery_action()
            );
        }
    }
    result
}
