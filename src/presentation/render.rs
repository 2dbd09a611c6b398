use crate::application::analytics::{Dashboard, Metric, SnapshotState};
use crate::domain::model::{
    Notification, Outcome, PayoutHistory, Project, ProjectDependency, ProjectMember, User,
    UserSearchResult, Version,
};
use crate::domain::payout::{PayoutSource, PayoutView};
use crate::infrastructure::config::Config;
use crate::presentation::theme::Theme;
use chrono::{DateTime, Utc};
use std::fmt::Write;

fn money(amount: f64, currency: Option<&str>) -> String {
    match currency {
        None | Some("USD") => format!("${:.2}", amount),
        Some(code) => format!("{:.2} {}", amount, code),
    }
}

fn date(at: Option<&DateTime<Utc>>) -> String {
    at.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn cutoff(theme: &Theme) -> String {
    (theme.line)(&"⸺".repeat(40))
}

pub fn render_user(user: &User, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}  {}", (theme.title)(&user.username), theme.accent(&user.role)).ok();
    writeln!(output, "  {} {}", (theme.label)("id:"), (theme.value)(&user.id)).ok();
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        writeln!(output, "  {} {}", (theme.label)("bio:"), (theme.value)(bio)).ok();
    }
    if let Some(avatar) = &user.avatar_url {
        writeln!(output, "  {} {}", (theme.label)("avatar:"), (theme.muted)(avatar)).ok();
    }
    match user.payout_data.as_present() {
        Some(data) => {
            let currency = data.currency.as_deref().unwrap_or("USD");
            let wallet = data
                .payout_wallet
                .as_deref()
                .or(data.payout_wallet_type.as_deref())
                .unwrap_or("not configured");
            writeln!(
                output,
                "  {} {} ({})",
                (theme.label)("payout wallet:"),
                (theme.value)(wallet),
                currency
            )
            .ok();
        }
        None => {
            writeln!(output, "  {}", (theme.muted)("payout data not visible")).ok();
        }
    }
    output
}

pub fn render_projects(projects: &[Project], metric: Metric, theme: &Theme) -> String {
    let mut output = String::new();
    if projects.is_empty() {
        writeln!(output, "{}", (theme.muted)("No projects")).ok();
        return output;
    }

    let mut sorted: Vec<&Project> = projects.iter().collect();
    sorted.sort_by(|a, b| metric.of(b).cmp(&metric.of(a)));
    for (i, project) in sorted.iter().enumerate() {
        writeln!(
            output,
            "{}. {} {} {}",
            (theme.idx)(&(i + 1).to_string()),
            (theme.title)(&project.title),
            (theme.muted)(&format!("({})", project.slug)),
            theme.accent(project.status.as_str())
        )
        .ok();
        writeln!(
            output,
            "   {} {}   {} {}",
            (theme.label)("downloads"),
            (theme.value)(&project.downloads.to_string()),
            (theme.label)("followers"),
            (theme.value)(&project.followers.to_string())
        )
        .ok();
    }
    output
}

pub fn render_project(project: &Project, theme: &Theme) -> String {
    let mut output = String::new();
    writeln!(output, "{}  {}", (theme.title)(&project.title), theme.accent(project.status.as_str())).ok();
    writeln!(output, "  {}", (theme.value)(&project.description)).ok();
    writeln!(output, "  {}", cutoff(theme)).ok();

    let rows = [
        ("id", Some(project.id.clone())),
        ("slug", Some(project.slug.clone())),
        ("team", Some(project.team.clone())),
        ("downloads", Some(project.downloads.to_string())),
        ("followers", Some(project.followers.to_string())),
        ("categories", Some(project.categories.join(", "))),
        ("client", project.client_side.clone()),
        ("server", project.server_side.clone()),
        ("license", project.license.as_ref().map(|l| l.id.clone())),
        ("published", Some(date(project.published.as_ref()))),
        ("updated", Some(date(project.updated.as_ref()))),
        ("issues", project.issues_url.clone()),
        ("source", project.source_url.clone()),
        ("wiki", project.wiki_url.clone()),
        ("discord", project.discord_url.clone()),
    ];
    for (label, value) in rows {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            writeln!(output, "  {:<11} {}", (theme.label)(label), (theme.value)(&value)).ok();
        }
    }

    if !project.gallery.is_empty() {
        writeln!(output, "  {}", (theme.label)("gallery")).ok();
        for image in &project.gallery {
            let star = if image.featured { "★ " } else { "" };
            writeln!(output, "    {}{}", star, (theme.muted)(&image.url)).ok();
        }
    }
    output
}

pub fn render_versions(versions: &[Version], theme: &Theme) -> String {
    let mut output = String::new();
    if versions.is_empty() {
        writeln!(output, "{}", (theme.muted)("No versions")).ok();
        return output;
    }
    for version in versions {
        writeln!(
            output,
            "{} {} {}  {}",
            (theme.title)(&version.version_number),
            (theme.value)(&version.name),
            theme.accent(&version.version_type),
            (theme.muted)(&version.id)
        )
        .ok();
        writeln!(
            output,
            "   {} {}   {} {}   {} {}",
            (theme.label)("loaders"),
            (theme.value)(&version.loaders.join(", ")),
            (theme.label)("game"),
            (theme.value)(&version.game_versions.join(", ")),
            (theme.label)("downloads"),
            (theme.value)(&version.downloads.to_string())
        )
        .ok();
    }
    output
}

pub fn render_dependencies(dependencies: &[ProjectDependency], theme: &Theme) -> String {
    let mut output = String::new();
    if dependencies.is_empty() {
        writeln!(output, "{}", (theme.muted)("No dependencies")).ok();
        return output;
    }
    for dep in dependencies {
        let name = dep
            .title
            .as_deref()
            .or(dep.project_id.as_deref())
            .or(dep.file_name.as_deref())
            .unwrap_or("unknown");
        let kind = serde_json::to_value(dep.dependency_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        writeln!(output, "  {} {}", (theme.value)(name), theme.accent(&kind)).ok();
    }
    output
}

pub fn render_members(members: &[ProjectMember], theme: &Theme) -> String {
    let mut output = String::new();
    for member in members {
        let pending = if member.accepted { "" } else { " (invited)" };
        writeln!(
            output,
            "  {} {}{}  {}",
            (theme.value)(&member.user.username),
            theme.accent(&member.role),
            (theme.muted)(pending),
            (theme.muted)(&member.user.id)
        )
        .ok();
    }
    output
}

pub fn render_notifications(notifications: &[Notification], theme: &Theme) -> String {
    let mut output = String::new();
    if notifications.is_empty() {
        writeln!(output, "{}", (theme.muted)("No notifications")).ok();
        return output;
    }
    for n in notifications {
        let marker = if n.read { " " } else { "•" };
        writeln!(
            output,
            "{} {}  {}",
            theme.accent(marker),
            (theme.title)(&n.title),
            (theme.muted)(&date(Some(&n.created)))
        )
        .ok();
        writeln!(output, "  {}", (theme.value)(&n.text)).ok();
        writeln!(output, "  {}", (theme.muted)(&n.id)).ok();
    }
    output
}

pub fn render_search(results: &[UserSearchResult], theme: &Theme) -> String {
    let mut output = String::new();
    if results.is_empty() {
        writeln!(output, "{}", (theme.muted)("No user found")).ok();
    }
    for r in results {
        writeln!(
            output,
            "  {} {}  {}",
            (theme.value)(&r.username),
            theme.accent(&r.role),
            (theme.muted)(&r.user_id)
        )
        .ok();
    }
    output
}

pub fn render_payout_view(view: &PayoutView, theme: &Theme) -> String {
    let mut output = String::new();
    let Some(summary) = view.summary() else {
        writeln!(
            output,
            "{}",
            (theme.warn)("Payout data is not available for this account/token.")
        )
        .ok();
        return output;
    };

    let currency = summary.currency.as_deref();
    writeln!(
        output,
        "  {:<18} {}",
        (theme.label)("balance"),
        theme.accent(&money(summary.wallet_balance, currency))
    )
    .ok();
    let optional = [
        ("available now", summary.available),
        ("pending", summary.pending),
        ("withdrawn", summary.withdrawn_lifetime),
    ];
    for (label, amount) in optional {
        if let Some(amount) = amount {
            writeln!(output, "  {:<18} {}", (theme.label)(label), (theme.value)(&money(amount, currency))).ok();
        }
    }
    writeln!(
        output,
        "  {:<18} {}",
        (theme.label)("total revenue"),
        (theme.value)(&money(summary.lifetime_earnings, currency))
    )
    .ok();
    if summary.source == PayoutSource::Profile {
        writeln!(output, "  {}", (theme.muted)("from profile payout data")).ok();
    }
    output
}

pub fn render_dashboard(dashboard: &Dashboard, theme: &Theme) -> String {
    let stats = &dashboard.stats;
    let mut output = String::new();

    writeln!(output, "{}", (theme.title)(&format!("Analytics for {}", dashboard.user.username))).ok();
    writeln!(output, "  {}", cutoff(theme)).ok();
    writeln!(output, "  {:<18} {}", (theme.label)("projects"), (theme.value)(&stats.project_count.to_string())).ok();
    writeln!(output, "  {:<18} {}", (theme.label)("downloads"), theme.accent(&stats.total_downloads.to_string())).ok();
    writeln!(output, "  {:<18} {}", (theme.label)("followers"), (theme.value)(&stats.total_followers.to_string())).ok();
    writeln!(output, "  {:<18} {}", (theme.label)("avg downloads"), (theme.value)(&format!("{:.0}", stats.avg_downloads))).ok();

    if !stats.top_categories.is_empty() {
        let cats: Vec<String> = stats
            .top_categories
            .iter()
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect();
        writeln!(output, "  {:<18} {}", (theme.label)("top categories"), (theme.value)(&cats.join(", "))).ok();
    }

    writeln!(output).ok();
    writeln!(output, "{}", (theme.title)("Revenue")).ok();
    output.push_str(&render_payout_view(&dashboard.payout, theme));
    match dashboard.snapshot_state {
        SnapshotState::RouteMissing => {
            writeln!(output, "  {}", (theme.muted)("balance endpoint is not available on this API deployment")).ok();
        }
        SnapshotState::Status(401 | 403) => {
            writeln!(output, "  {}", (theme.warn)("Token has no payouts access. Recreate it with payouts scope.")).ok();
        }
        _ => {}
    }
    if dashboard.wallet_warning {
        writeln!(output, "  {}", (theme.warn)("Create a wallet on Modrinth to receive payouts.")).ok();
    }

    if !stats.top_projects.is_empty() {
        let label = match stats.metric {
            Metric::Downloads => "Top projects by downloads",
            Metric::Followers => "Top projects by followers",
        };
        writeln!(output).ok();
        writeln!(output, "{}", (theme.title)(label)).ok();
        let max = stats.top_projects[0].value.max(1);
        for (i, project) in stats.top_projects.iter().enumerate() {
            let width = ((project.value as f64 / max as f64) * 30.0).round() as usize;
            writeln!(
                output,
                "  {:>2}. {:<24} {} {}",
                (theme.idx)(&(i + 1).to_string()),
                project.title,
                theme.accent(&"█".repeat(width.max(1))),
                (theme.value)(&project.value.to_string())
            )
            .ok();
        }
    }
    output
}

pub fn render_payout_history(history: Option<&Outcome<PayoutHistory>>, theme: &Theme) -> String {
    let mut output = String::new();
    let Some(history) = history else {
        writeln!(output, "  {}", (theme.muted)("Payout history could not be loaded.")).ok();
        return output;
    };
    match history {
        Outcome::Found(history) => {
            writeln!(output, "  {:<18} {}", (theme.label)("all time"), (theme.value)(&money(history.balance_all_time, None))).ok();
            writeln!(output, "  {:<18} {}", (theme.label)("last 30 days"), (theme.value)(&money(history.last_30_days, None))).ok();
            if history.payouts.is_empty() {
                writeln!(output, "  {}", (theme.muted)("No payout transactions available")).ok();
            }
            for payout in &history.payouts {
                writeln!(
                    output,
                    "  {}  {}  {}",
                    (theme.muted)(&date(Some(&payout.created))),
                    (theme.value)(&money(payout.amount, None)),
                    theme.accent(&payout.status)
                )
                .ok();
            }
        }
        Outcome::RouteMissing => {
            writeln!(output, "  {}", (theme.muted)("Payout history is unavailable: this endpoint is missing from the public API.")).ok();
        }
        Outcome::Status(401 | 403) => {
            writeln!(output, "  {}", (theme.warn)("Token has no payouts access. Recreate it with payouts scope.")).ok();
        }
        Outcome::Status(status) => {
            writeln!(output, "  {}", (theme.muted)(&format!("Payout history is unavailable ({}).", status))).ok();
        }
    }
    output
}

pub fn render_settings(config: &Config, theme: &Theme) -> String {
    let mut output = String::new();
    let token = match config.resolve_token() {
        Some(_) => "stored",
        None => "not set",
    };
    let rows = [
        ("token", token.to_string()),
        ("language", config.language.clone()),
        ("theme", config.theme.clone()),
        ("accent_color", config.accent_color.clone()),
        ("api", config.api.base_url.clone()),
        ("cache ttl", format!("{} ms", config.api.cache_ttl_ms)),
    ];
    for (label, value) in rows {
        writeln!(output, "  {:<14} {}", (theme.label)(label), (theme.value)(&value)).ok();
    }
    output
}
