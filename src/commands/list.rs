use super::{CommandContext, CommandResult};
use crate::components::events::categories::CategoryStore;
use crate::components::events::status::EventStatus;
use crate::components::events::view::{build_views, EventView};
use crate::utils::time::{now_in_tz, resolve_timezone};

/// One display line for an event view
pub fn render_line(view: &EventView, categories: &CategoryStore) -> String {
    let mut line = format!(
        "{} - {} - {}",
        view.event.title, view.when_label, view.countdown_text
    );
    if let Some(category_id) = &view.event.category {
        let name = categories
            .get(category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(category_id.as_str());
        line.push_str(&format!(" [{}]", name));
    }
    line
}

/// List all events grouped by status, earliest date first within each group
pub async fn list(context: &CommandContext) -> CommandResult {
    let (tz, window_days) = {
        let config = context.config.read().await;
        (
            resolve_timezone(&config.timezone)?,
            config.upcoming_window_days,
        )
    };
    let now = now_in_tz(&tz).naive_local();
    let views = build_views(&context.store.list_sorted(), now, window_days);

    if views.is_empty() {
        println!("No events yet. Add one with: muistutin add <title> <date>");
        return Ok(());
    }

    for status in EventStatus::DISPLAY_ORDER {
        let group: Vec<&EventView> = views.iter().filter(|v| v.status == status).collect();
        if group.is_empty() {
            continue;
        }
        println!("{}:", status.heading());
        for view in group {
            println!("  {}", render_line(view, &context.categories));
            println!("    id: {}", view.event.id);
        }
    }
    Ok(())
}

/// Delete everything from storage
pub async fn clear(context: &CommandContext, yes: bool) -> CommandResult {
    if !yes {
        println!("This deletes every stored event and category. Re-run with --yes to confirm.");
        return Ok(());
    }
    context.storage.clear().await?;
    println!("Cleared all stored data");
    Ok(())
}
