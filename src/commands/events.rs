use super::{CommandContext, CommandResult};
use crate::components::events::view::build_views;
use crate::components::events::EventInput;
use crate::error::{AppResult, Error, ValidationIssues};
use crate::utils::time::{now_in_tz, resolve_timezone};

/// Normalize a category argument
///
/// An empty string clears the category; anything else must name an existing
/// category id.
fn resolve_category(
    context: &CommandContext,
    category: Option<String>,
) -> AppResult<Option<String>> {
    let Some(value) = category else {
        return Ok(None);
    };
    let value = value.trim().to_string();
    if value.is_empty() {
        return Ok(None);
    }
    if context.categories.get(&value).is_none() {
        let mut issues = ValidationIssues::new();
        issues.push(
            "category",
            format!("unknown category '{}'; see `muistutin categories`", value),
        );
        return Err(Error::Validation(issues));
    }
    Ok(Some(value))
}

/// Add a new event
pub async fn add(
    context: &mut CommandContext,
    title: String,
    date: String,
    description: String,
    category: Option<String>,
) -> CommandResult {
    let category = resolve_category(context, category)?;
    let input = EventInput {
        title,
        date,
        description,
        category,
    };
    let record = context.store.add(input).await?;
    println!("Added \"{}\" ({})", record.title, record.date);
    println!("  id: {}", record.id);
    Ok(())
}

/// Update an existing event, keeping any field not given on the command line
pub async fn update(
    context: &mut CommandContext,
    id: &str,
    title: Option<String>,
    date: Option<String>,
    description: Option<String>,
    category: Option<String>,
) -> CommandResult {
    let current = context
        .store
        .get_by_id(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    let category = match category {
        Some(value) => resolve_category(context, Some(value))?,
        None => current.category,
    };
    let input = EventInput {
        title: title.unwrap_or(current.title),
        date: date.unwrap_or(current.date),
        description: description.unwrap_or(current.description),
        category,
    };

    let record = context.store.update(id, input).await?;
    println!("Updated \"{}\" ({})", record.title, record.date);
    Ok(())
}

/// Remove an event; removing an unknown id is a no-op
pub async fn remove(context: &mut CommandContext, id: &str) -> CommandResult {
    if context.store.delete(id).await {
        println!("Removed event {}", id);
    } else {
        println!("No event with id {}", id);
    }
    Ok(())
}

/// Show one event with its countdown
pub async fn show(context: &CommandContext, id: &str) -> CommandResult {
    let record = context
        .store
        .get_by_id(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    let (tz, window_days) = {
        let config = context.config.read().await;
        (
            resolve_timezone(&config.timezone)?,
            config.upcoming_window_days,
        )
    };
    let now = now_in_tz(&tz).naive_local();
    let views = build_views(std::slice::from_ref(record), now, window_days);

    println!("{}", record.title);
    println!("  id:          {}", record.id);
    println!("  date:        {}", record.date);
    if !record.description.is_empty() {
        println!("  description: {}", record.description);
    }
    if let Some(category_id) = &record.category {
        let name = context
            .categories
            .get(category_id)
            .map(|c| c.name.as_str())
            .unwrap_or(category_id.as_str());
        println!("  category:    {}", name);
    }
    if let Some(view) = views.first() {
        println!("  when:        {} ({})", view.when_label, view.status.heading());
        println!("  countdown:   {}", view.countdown_text);
    }
    println!("  created:     {}", record.created_at);
    Ok(())
}
