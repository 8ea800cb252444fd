//! Blueprint Composer - Main entry point
//!
//! Thin command-line front end over the library: drafts are read from JSON,
//! everything else goes through the same store, mapper and dispatchers the
//! wizard uses.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use blueprint_composer::api::client::{HttpBackend, RepositoryBackend};
use blueprint_composer::api::dispatch::MutationDispatcher;
use blueprint_composer::blueprints::{
    delete_selected_blueprint, save_blueprint, BlueprintListState, SaveAction,
};
use blueprint_composer::cli::{Cli, Commands};
use blueprint_composer::config_file::Settings;
use blueprint_composer::logic::mapper::{map_request_from_state, ServerContext};
use blueprint_composer::repositories::listing::{display_package_count, readable_versions};
use blueprint_composer::repositories::{load_initial_selection, load_listing, RepositoryReconciler};
use blueprint_composer::types::WizardMode;
use blueprint_composer::wizard::validation::validate_draft;
use blueprint_composer::wizard::{Action, BlueprintDraft, Store, WizardState, WizardStep};

/// Initialize tracing; `RUST_LOG` overrides the default `info` level
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    let settings = Settings::resolve(cli.config.as_deref())?;
    debug!(url = %settings.image_builder_url, on_premise = settings.on_premise, "settings resolved");

    match cli.command {
        Commands::Validate { draft } => {
            info!("Validating draft: {:?}", draft);
            let draft = load_draft(&draft)?;
            match validate_draft(&draft) {
                Ok(()) => println!("✓ Draft is valid: {}", draft.name),
                Err(e) => {
                    error!("Draft validation failed: {}", e);
                    eprintln!("✗ {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Map {
            draft,
            org_id,
            server,
            output,
        } => {
            let state = WizardState {
                draft: load_draft(&draft)?,
                ..Default::default()
            };
            let server = load_server_context(server.as_deref())?;
            let request = map_request_from_state(&state, Some(&org_id), &server)?;
            let json = serde_json::to_string_pretty(&request)
                .context("Failed to serialize request payload")?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write payload to {:?}", path))?;
                    println!("✓ Payload written to {:?}", path);
                }
                None => println!("{}", json),
            }
        }
        Commands::Steps { draft } => {
            let draft = load_draft(&draft)?;
            for step in WizardStep::visible_steps(&draft, settings.on_premise) {
                let mark = if step.is_valid(&draft) { "✓" } else { "✗" };
                println!("{} {}", mark, step);
            }
        }
        Commands::Push {
            draft,
            org_id,
            blueprint_id,
            server,
            build,
        } => {
            let mut draft = load_draft(&draft)?;
            // A name given in the file counts as chosen by the user
            draft.is_custom_name |= !draft.name.trim().is_empty();
            let mode = if blueprint_id.is_some() {
                WizardMode::Edit
            } else {
                WizardMode::Create
            };
            let mut store = Store::new(WizardState {
                mode,
                blueprint_id,
                draft,
            });
            store.refresh_default_name(chrono::Local::now().naive_local());
            validate_draft(&store.state().draft)?;

            let server = load_server_context(server.as_deref())?;
            let action = if build {
                SaveAction::SaveAndBuild
            } else {
                SaveAction::Save
            };
            let mut dispatcher = MutationDispatcher::new(HttpBackend::new(&settings)?);
            let outcome =
                save_blueprint(&mut dispatcher, &mut store, Some(&org_id), &server, action).await?;
            println!("✓ Blueprint saved: {}", outcome.blueprint_id);
            for compose in &outcome.composes {
                println!("  build started: {}", compose.id);
            }
        }
        Commands::Delete { id } => {
            let mut dispatcher = MutationDispatcher::new(HttpBackend::new(&settings)?);
            let mut list = BlueprintListState::default();
            list.select(id);
            if let Some(id) = delete_selected_blueprint(&mut dispatcher, &mut list).await? {
                println!("✓ Blueprint deleted: {}", id);
            }
        }
        Commands::Repos {
            draft,
            arch,
            distribution,
            search,
            page,
        } => {
            let backend = HttpBackend::new(&settings)?;
            let draft = match draft.as_deref() {
                Some(path) => load_draft(path)?,
                None => BlueprintDraft::default(),
            };
            let mut store = Store::new(WizardState {
                draft,
                ..Default::default()
            });
            if let Some(arch) = arch {
                store.dispatch(Action::ChangeArchitecture(arch));
            }
            if let Some(distribution) = distribution {
                store.dispatch(Action::ChangeDistribution(distribution));
            }

            let mut reconciler = RepositoryReconciler::mount(
                store.state(),
                settings.per_page,
                settings.filter_debounce(),
            );
            let unavailable = load_initial_selection(&backend, &mut reconciler, &mut store).await?;
            if unavailable > 0 {
                println!(
                    "✗ {} previously selected repositories are no longer available",
                    unavailable
                );
            }

            // No keystrokes to wait on: settle the search at once
            if let Some(search) = search.as_deref() {
                let now = Instant::now();
                reconciler.set_filter(search, now);
                reconciler.poll_filter(now + settings.filter_debounce());
            }
            reconciler.set_page(page);

            let params = backend.list_repository_parameters().await.ok();
            let listing = load_listing(&backend, &mut reconciler, &mut store).await?;
            if let Some(template) = reconciler.template() {
                println!("content template {} (read-only)", template);
            }
            for repo in &listing.data {
                let selected = repo
                    .uuid
                    .as_deref()
                    .is_some_and(|uuid| reconciler.is_selected(store.state(), uuid));
                let disabled = reconciler
                    .row_disabled(store.state(), repo)
                    .map(|reason| reason.to_string())
                    .unwrap_or_default();
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    if selected { "✓" } else { " " },
                    repo.uuid.as_deref().unwrap_or("-"),
                    repo.name,
                    readable_versions(params.as_ref(), repo.distribution_versions.as_deref()),
                    display_package_count(repo.package_count),
                    repo.display_status(),
                    disabled,
                );
            }
            println!(
                "page {} ({} of {} repositories)",
                reconciler.pagination().page,
                listing.data.len(),
                listing.meta.count
            );
        }
    }

    Ok(())
}

/// Load a blueprint draft from a JSON file
fn load_draft(path: &Path) -> Result<BlueprintDraft> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft from {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse draft JSON")
}

/// Load the server context, or an empty one when no file was given
fn load_server_context(path: Option<&Path>) -> Result<ServerContext> {
    let Some(path) = path else {
        return Ok(ServerContext::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read server context from {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse server context JSON")
}
