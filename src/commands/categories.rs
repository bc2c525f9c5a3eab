use super::{CategoryAction, CommandContext, CommandResult};

/// Route the `categories` subcommand; no action means list
pub async fn run(context: &mut CommandContext, action: Option<CategoryAction>) -> CommandResult {
    match action {
        None => list(context),
        Some(CategoryAction::Add { name, color }) => add(context, &name, color).await,
        Some(CategoryAction::Remove { id }) => remove(context, &id).await,
    }
}

fn list(context: &CommandContext) -> CommandResult {
    for category in context.categories.list() {
        println!("{:<12} {}  ({})", category.id, category.name, category.color);
    }
    Ok(())
}

async fn add(context: &mut CommandContext, name: &str, color: Option<String>) -> CommandResult {
    let record = context.categories.add(name, color).await?;
    println!("Added category '{}' ({})", record.id, record.color);
    Ok(())
}

async fn remove(context: &mut CommandContext, id: &str) -> CommandResult {
    if context.categories.remove(id).await {
        println!("Removed category '{}'", id);
    } else {
        println!("No category with id '{}'", id);
    }
    Ok(())
}
