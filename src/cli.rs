use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{Architecture, Distribution};

/// Blueprint Composer - build and submit OS image blueprints
#[derive(Parser)]
#[command(name = "blueprint-composer")]
#[command(about = "Validate, map and submit image-builder blueprints from JSON drafts")]
#[command(version)]
pub struct Cli {
    /// Settings file (API URLs, page size, token); defaults apply when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a blueprint draft
    Validate {
        /// Path to the draft JSON
        draft: PathBuf,
    },
    /// Map a draft to the image-builder request payload
    Map {
        /// Path to the draft JSON
        draft: PathBuf,
        /// Organization id used for registration
        #[arg(long)]
        org_id: String,
        /// Server context JSON (OpenSCAP kernel arguments and services)
        #[arg(long)]
        server: Option<PathBuf>,
        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the wizard steps for a draft and whether each is complete
    Steps {
        /// Path to the draft JSON
        draft: PathBuf,
    },
    /// Create (or update) a blueprint from a draft
    Push {
        /// Path to the draft JSON
        draft: PathBuf,
        /// Organization id used for registration
        #[arg(long)]
        org_id: String,
        /// Update this blueprint instead of creating a new one
        #[arg(long)]
        blueprint_id: Option<String>,
        /// Server context JSON (OpenSCAP kernel arguments and services)
        #[arg(long)]
        server: Option<PathBuf>,
        /// Start image builds after saving
        #[arg(long)]
        build: bool,
    },
    /// Delete a blueprint and all of its images
    Delete {
        /// Blueprint id
        id: String,
    },
    /// List custom repositories available for a distribution and architecture
    Repos {
        /// Draft whose selection is reconciled against the server
        #[arg(long)]
        draft: Option<PathBuf>,
        /// Overrides the draft's architecture (x86_64 without a draft)
        #[arg(long)]
        arch: Option<Architecture>,
        /// Overrides the draft's distribution (rhel-9 without a draft)
        #[arg(long)]
        distribution: Option<Distribution>,
        /// Filter by name or URL
        #[arg(long)]
        search: Option<String>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u64,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_requires_command() {
        let result = Cli::try_parse_from(["blueprint-composer"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_validate_command() {
        let cli = Cli::try_parse_from(["blueprint-composer", "validate", "/tmp/draft.json"]).unwrap();
        match cli.command {
            Commands::Validate { draft } => {
                assert_eq!(draft.to_str().unwrap(), "/tmp/draft.json");
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_map_with_global_config() {
        let cli = Cli::try_parse_from([
            "blueprint-composer",
            "map",
            "draft.json",
            "--org-id",
            "123",
            "--config",
            "settings.json",
        ])
        .unwrap();
        assert_eq!(cli.config.unwrap().to_str().unwrap(), "settings.json");
        match cli.command {
            Commands::Map { org_id, output, .. } => {
                assert_eq!(org_id, "123");
                assert!(output.is_none());
            }
            _ => panic!("Expected Map command"),
        }
    }

    #[test]
    fn test_cli_repos_parses_enums() {
        let cli = Cli::try_parse_from([
            "blueprint-composer",
            "repos",
            "--arch",
            "aarch64",
            "--distribution",
            "centos-9",
        ])
        .unwrap();
        match cli.command {
            Commands::Repos {
                draft,
                arch,
                distribution,
                page,
                ..
            } => {
                assert!(draft.is_none());
                assert_eq!(arch, Some(Architecture::Aarch64));
                assert_eq!(distribution, Some(Distribution::Centos9));
                assert_eq!(page, 1);
            }
            _ => panic!("Expected Repos command"),
        }
    }

    #[test]
    fn test_cli_repos_with_draft() {
        let cli = Cli::try_parse_from([
            "blueprint-composer",
            "repos",
            "--draft",
            "draft.json",
            "--search",
            "epel",
            "--page",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Repos {
                draft,
                arch,
                search,
                page,
                ..
            } => {
                assert_eq!(draft.unwrap().to_str().unwrap(), "draft.json");
                assert!(arch.is_none());
                assert_eq!(search.as_deref(), Some("epel"));
                assert_eq!(page, 3);
            }
            _ => panic!("Expected Repos command"),
        }
    }

    #[test]
    fn test_cli_push_build_flag() {
        let cli = Cli::try_parse_from([
            "blueprint-composer",
            "push",
            "draft.json",
            "--org-id",
            "1",
            "--blueprint-id",
            "bp-1",
            "--build",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Push { build: true, blueprint_id: Some(_), .. }
        ));
    }
}
