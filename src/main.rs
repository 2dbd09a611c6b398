// Main entry point
use anyhow::{anyhow, bail};
use clap::Parser;
use colored::Colorize;
use rinth::application::analytics::{self, Metric};
use rinth::domain::model::{NotificationFilter, Outcome, User};
use rinth::domain::patch::{GalleryUpload, ModifyUser, ProjectPatch, VersionPatch};
use rinth::infrastructure::config::{self, Config, Logging};
use rinth::infrastructure::network::client::ApiClient;
use rinth::interfaces::cli::{
    Cli, Command, NotificationCommand, ProjectCommand, SettingsCommand, TeamCommand,
    VersionCommand,
};
use rinth::presentation::render;
use rinth::presentation::theme::Theme;
use rinth::state::AppState;
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Spawn signal handler task
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for shutdown signal: {}", e);
        } else {
            eprintln!("\n收到中断信号，正在优雅关闭...");
            let _ = shutdown_tx.send(());
        }
    });

    let cli = Cli::parse();
    let config = config::load_config()?;

    // Initialize logging
    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    let theme_name = cli.theme.as_deref().unwrap_or(config.theme.as_str());
    let theme = Theme::from_settings(theme_name, &config.accent_color);

    // Commands that only touch local state
    match cli.command {
        Command::Config { generate, edit } => return edit_config(generate, edit).await,
        Command::Login { token } => return login(config, &token).await,
        Command::Logout => return logout(config),
        Command::Settings(cmd) => return settings(config, cmd, &theme, cli.json),
        command => {
            let state = AppState::new(config)?;
            tokio::select! {
                result = run(&state, command, cli.json, &theme) => {
                    result?;
                }
                Ok(()) = shutdown_rx => {
                    eprintln!("操作被中断");
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            // Log to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Print `value` as JSON or as themed text
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn done(message: &str) {
    println!("{} {}", "✔".green(), message);
}

async fn run(state: &AppState, command: Command, json: bool, theme: &Theme) -> anyhow::Result<()> {
    let api = &state.api;
    if !api.is_authenticated() && !matches!(command, Command::Search { .. } | Command::Status) {
        bail!(
            "Not logged in. Run `rinth login <token>` or set {}.",
            config::TOKEN_ENV
        );
    }

    match command {
        Command::Me => {
            let me = api.fetch_current_user().await?;
            emit(json, &me, || render::render_user(&me, theme))?;
        }
        Command::EditProfile {
            username,
            bio,
            avatar_url,
        } => {
            let patch = ModifyUser {
                username,
                bio,
                avatar_url,
            };
            if patch == ModifyUser::default() {
                bail!("Nothing to update");
            }
            let me = api.fetch_current_user().await?;
            api.modify_user(&me.id, &patch).await?;
            done("Profile updated");
        }
        Command::User { id } => match api.fetch_user_by_id_with_status(&id).await? {
            Outcome::Found(user) => emit(json, &user, || render::render_user(&user, theme))?,
            Outcome::Status(status) => bail!("User {} is not available ({})", id, status),
            Outcome::RouteMissing => bail!("User {} is not available", id),
        },
        Command::Projects { user, metric } => {
            let user_id = match user {
                Some(id) => id,
                None => api.fetch_current_user().await?.id,
            };
            let projects = api.fetch_user_projects(&user_id).await?;
            let metric = Metric::from(metric);
            emit(json, &projects, || {
                render::render_projects(&projects, metric, theme)
            })?;
        }
        Command::Project(cmd) => run_project(api, cmd, json, theme).await?,
        Command::Version(cmd) => match cmd {
            VersionCommand::Edit {
                id,
                name,
                version_type,
                changelog,
                game_versions,
                loaders,
            } => {
                let patch = VersionPatch {
                    name,
                    version_type,
                    changelog,
                    game_versions,
                    loaders,
                    dependencies: None,
                };
                if patch == VersionPatch::default() {
                    bail!("Nothing to update");
                }
                api.modify_version(&id, &patch).await?;
                done("Version updated");
            }
            VersionCommand::Delete { id } => {
                api.delete_version(&id).await?;
                done("Version deleted");
            }
        },
        Command::Team(cmd) => match cmd {
            TeamCommand::Add { team_id, username } => {
                let found = api
                    .search_user(&username)
                    .await
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("No user named {}", username))?;
                api.add_team_member(&team_id, &found.user_id).await?;
                done(&format!("Invited {}", found.username));
            }
            TeamCommand::Role {
                team_id,
                user_id,
                role,
            } => {
                api.update_team_member(&team_id, &user_id, &role).await?;
                done("Member updated");
            }
            TeamCommand::Remove { team_id, user_id } => {
                api.delete_team_member(&team_id, &user_id).await?;
                done("Member removed");
            }
        },
        Command::Notifications(cmd) => run_notifications(api, cmd, json, theme).await?,
        Command::Search { username } => {
            let results = api.search_user(&username).await;
            emit(json, &results, || render::render_search(&results, theme))?;
        }
        Command::Analytics { metric } => {
            let dashboard = analytics::load_dashboard(api, metric.into()).await?;
            emit(json, &dashboard, || render::render_dashboard(&dashboard, theme))?;
        }
        Command::Payouts => {
            let dashboard = analytics::load_dashboard(api, Metric::Downloads).await?;
            let history = analytics::load_payout_history(api, &dashboard.user.id).await;
            let value = serde_json::json!({
                "payout": dashboard.payout,
                "history": history.as_ref().and_then(Outcome::as_found),
            });
            emit(json, &value, || {
                let mut text = render::render_payout_view(&dashboard.payout, theme);
                text.push_str(&render::render_payout_history(history.as_ref(), theme));
                text
            })?;
        }
        Command::Status => print_status(state).await?,
        // handled before the client is built
        Command::Config { .. } | Command::Login { .. } | Command::Logout | Command::Settings(_) => {}
    }

    Ok(())
}

async fn run_project(
    api: &ApiClient,
    cmd: ProjectCommand,
    json: bool,
    theme: &Theme,
) -> anyhow::Result<()> {
    match cmd {
        ProjectCommand::Show { id } => {
            let project = api.fetch_project(&id).await?;
            emit(json, &project, || render::render_project(&project, theme))?;
        }
        ProjectCommand::Update {
            id,
            title,
            description,
            body_file,
            client_side,
            server_side,
            license_id,
            license_url,
            issues_url,
            source_url,
            wiki_url,
            discord_url,
            status,
        } => {
            let body = match body_file {
                Some(path) => Some(tokio::fs::read_to_string(&path).await?),
                None => None,
            };
            let patch = ProjectPatch {
                title,
                description,
                body,
                client_side,
                server_side,
                license_id,
                license_url,
                issues_url,
                source_url,
                wiki_url,
                discord_url,
                status: status.map(Into::into),
            };
            if patch.is_empty() {
                bail!("Nothing to update");
            }
            api.update_project(&id, &patch).await?;
            done("Project updated");
        }
        ProjectCommand::Icon { id, file } => {
            api.change_project_icon(&id, &file).await?;
            done("Icon uploaded");
        }
        ProjectCommand::DeleteIcon { id } => {
            api.delete_project_icon(&id).await?;
            done("Icon removed");
        }
        ProjectCommand::GalleryAdd {
            id,
            file,
            featured,
            title,
            description,
        } => {
            let upload = GalleryUpload {
                featured,
                title,
                description,
            };
            api.add_gallery_image(&id, &file, &upload).await?;
            done("Image uploaded");
        }
        ProjectCommand::GalleryDelete { id, url } => {
            api.delete_gallery_image(&id, &url).await?;
            done("Image removed");
        }
        ProjectCommand::Versions { id } => {
            let versions = api.fetch_project_versions(&id).await?;
            emit(json, &versions, || render::render_versions(&versions, theme))?;
        }
        ProjectCommand::Deps { id } => {
            let deps = api.fetch_project_dependencies(&id).await?;
            emit(json, &deps, || render::render_dependencies(&deps, theme))?;
        }
        ProjectCommand::Members { id } => {
            let members = api.fetch_project_members(&id).await?;
            emit(json, &members, || render::render_members(&members, theme))?;
        }
    }
    Ok(())
}

async fn run_notifications(
    api: &ApiClient,
    cmd: NotificationCommand,
    json: bool,
    theme: &Theme,
) -> anyhow::Result<()> {
    match cmd {
        NotificationCommand::List { status } => {
            let me = api.fetch_current_user().await?;
            let list = api.fetch_notifications(&me.id, status.into()).await?;
            emit(json, &list, || render::render_notifications(&list, theme))?;
        }
        NotificationCommand::Read { id } => {
            api.mark_notification_read(&id).await?;
            done("Marked as read");
        }
        NotificationCommand::ReadAll => {
            let me = api.fetch_current_user().await?;
            let unread = api
                .fetch_notifications(&me.id, NotificationFilter::Unread)
                .await?;
            let ids: Vec<String> = unread.into_iter().map(|n| n.id).collect();
            api.mark_notifications_read(&ids).await?;
            done(&format!("Marked {} notifications as read", ids.len()));
        }
        NotificationCommand::Delete { id } => {
            api.delete_notification(&id).await?;
            done("Notification deleted");
        }
    }
    Ok(())
}

async fn edit_config(generate: bool, edit: bool) -> anyhow::Result<()> {
    if generate {
        config::generate_config_sample()?;
    }
    if edit {
        if let Some(config_path) = config::get_config_path() {
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            let config_path_clone = config_path.clone();
            // Run editor in blocking task
            tokio::task::spawn_blocking(move || {
                std::process::Command::new(editor)
                    .arg(&config_path_clone)
                    .status()
            })
            .await??;
        } else {
            eprintln!("{}", "Config file not found".red());
        }
    }
    Ok(())
}

/// Verify a token against the API before storing it.
async fn login(mut config: Config, token: &str) -> anyhow::Result<()> {
    let api = ApiClient::new(&config.api, Some(token))?;
    let me: User = api
        .fetch_current_user()
        .await
        .map_err(|e| anyhow!("Token rejected: {}", e))?;

    config.token = Some(token.trim().to_string());
    let path = config::save_config(&config)?;
    done(&format!("Logged in as {} (saved to {})", me.username, path.display()));
    Ok(())
}

fn logout(mut config: Config) -> anyhow::Result<()> {
    config.token = None;
    config::save_config(&config)?;
    done("Token removed");
    Ok(())
}

fn settings(mut config: Config, cmd: SettingsCommand, theme: &Theme, json: bool) -> anyhow::Result<()> {
    match cmd {
        SettingsCommand::Show => {
            let mut shown = config.clone();
            shown.token = shown.token.map(|_| "***".to_string());
            emit(json, &shown, || render::render_settings(&config, theme))?;
        }
        SettingsCommand::Set { key, value } => {
            config.set(&key, &value)?;
            config::save_config(&config)?;
            done(&format!("{} = {}", key, value));
        }
    }
    Ok(())
}

async fn print_status(state: &AppState) -> anyhow::Result<()> {
    println!("{}", "rinth Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = state.config.read().await;
    println!(
        "Config: {}",
        config::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found".to_string())
    );
    println!("API: {}", config.api.base_url);

    if state.api.is_authenticated() {
        println!("Token: Configured");
    } else {
        println!("Token: Not configured");
    }

    // Cache status
    println!(
        "Session Cache: {} entries (ttl {} ms)",
        state.api.session().cached_entries(),
        config.api.cache_ttl_ms
    );

    Ok(())
}
