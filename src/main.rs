use anyhow::Result;
use clap::{Parser, Subcommand};
use estate_content::config::Config;
use estate_content::content::load_properties;
use estate_content::importers::{ArchiveMigrator, CsvImporter, ImageRefresher, Importer};
use estate_content::models::Locale;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "estate-content")]
#[command(about = "Import listings and legacy pages into the website's content collections", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the property spreadsheet into JSON records
    ImportCsv {
        /// Spreadsheet to read (overrides --csv-path)
        csv_path: Option<PathBuf>,
        /// Directory for the records (overrides --properties-dir)
        out_dir: Option<PathBuf>,
    },

    /// Migrate the legacy HTML archive
    MigrateHtml {
        /// Archive root (overrides --html-dir)
        src_dir: Option<PathBuf>,
    },

    /// Replace placeholder images with stock photos
    RefreshImages {
        /// Records to rewrite (overrides --properties-dir)
        properties_dir: Option<PathBuf>,
    },

    /// Print the generated listings of one locale
    List {
        /// de, en or th
        locale: Locale,
        /// Records to read (overrides --properties-dir)
        properties_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    let Cli { mut config, command } = Cli::parse();

    match command {
        Commands::ImportCsv { csv_path, out_dir } => {
            if let Some(path) = csv_path {
                config.csv_path = path;
            }
            if let Some(dir) = out_dir {
                config.properties_dir = dir;
            }
            run(CsvImporter::from_config(&config)).await
        }
        Commands::MigrateHtml { src_dir } => {
            if let Some(dir) = src_dir {
                config.html_dir = dir;
            }
            run(ArchiveMigrator::new(config)).await
        }
        Commands::RefreshImages { properties_dir } => {
            if let Some(dir) = properties_dir {
                config.properties_dir = dir;
            }
            run(ImageRefresher::from_config(&config)).await
        }
        Commands::List { locale, properties_dir } => {
            if let Some(dir) = properties_dir {
                config.properties_dir = dir;
            }
            let properties = load_properties(&config.properties_dir, locale).await?;
            info!("Found {} {} listings", properties.len(), locale.label());

            for (i, property) in properties.iter().enumerate() {
                println!("{}. {} ({} THB)", i + 1, property.title, property.price_thb);
                println!("   {} bedrooms, {}", property.bedrooms, property.location);
                println!("   URL: {}", property.url);
            }
            Ok(())
        }
    }
}

/// Run an importer and print its summary as JSON
async fn run<I: Importer>(importer: I) -> Result<()> {
    info!("🏠 Estate Content - {}", importer.source_name());
    let summary = importer.run().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_paths_follow_the_command() {
        let cli = Cli::try_parse_from(["estate-content", "import-csv", "data/a.csv", "out"]).unwrap();
        match cli.command {
            Commands::ImportCsv { csv_path, out_dir } => {
                assert_eq!(csv_path, Some(PathBuf::from("data/a.csv")));
                assert_eq!(out_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("expected import-csv"),
        }
    }

    #[test]
    fn list_parses_locale_and_global_flags() {
        let cli = Cli::try_parse_from(["estate-content", "list", "th", "--properties-dir", "tmp/props"]).unwrap();
        assert_eq!(cli.config.properties_dir, PathBuf::from("tmp/props"));
        match cli.command {
            Commands::List { locale, properties_dir } => {
                assert_eq!(locale, Locale::Th);
                assert!(properties_dir.is_none());
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn unknown_command_and_locale_are_rejected() {
        assert!(Cli::try_parse_from(["estate-content", "publish"]).is_err());
        assert!(Cli::try_parse_from(["estate-content", "list", "fr"]).is_err());
    }
}
