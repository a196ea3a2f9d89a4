//! Main entry point for the mealdex CLI.

use anyhow::{bail, Result};
use clap::Parser;
use mealdex::context::AppContext;
use mealdex::hydrate;
use mealdex::model::{CategoryList, Meal, MealList, MealSummary};
use mealdex::settings::Settings;
use mealdex::tracker::{Outcome, RequestTracker};
use mealdex::{cli, telemetry};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let settings = Settings::load()?;
    telemetry::init(&settings.logging.level)?;
    let context = AppContext::init(settings)?;

    match args.command {
        cli::Commands::Categories => {
            let list: CategoryList = fetch(&context, context.api.categories()).await?;
            for category in list.categories {
                println!("{:>5}  {}", category.id, category.name);
            }
        }
        cli::Commands::Meals { category } => {
            let list: MealList<MealSummary> =
                fetch(&context, context.api.filter_by_category(&category)).await?;
            print_summaries(list.into_results(), &context);
        }
        cli::Commands::Meal { id } => {
            let meal = hydrate::fetch_meal(context.transport.as_ref(), &context.api, &id).await?;
            print_meal(&meal, &context);
        }
        cli::Commands::Search { query } => {
            let list: MealList<Meal> = fetch(&context, context.api.search(&query)).await?;
            let summaries = list
                .into_results()
                .into_iter()
                .map(|meal| MealSummary {
                    id: meal.id,
                    name: meal.name,
                    thumb: meal.thumb,
                })
                .collect();
            print_summaries(summaries, &context);
        }
        cli::Commands::Fav { command } => match command {
            cli::FavCommands::Add { id } => {
                context.favorites.add(&id);
                println!("{} favorites", context.favorites.list().len());
            }
            cli::FavCommands::Remove { id } => {
                context.favorites.remove(&id);
                println!("{} favorites", context.favorites.list().len());
            }
            cli::FavCommands::List => {
                for id in context.favorites.list() {
                    println!("{}", id);
                }
            }
            cli::FavCommands::Show => {
                let ids = context.favorites.list();
                let meals =
                    hydrate::hydrate_favorites(context.transport.as_ref(), &context.api, &ids)
                        .await?;
                for meal in meals {
                    print_meal(&meal, &context);
                    println!();
                }
            }
        },
    }

    Ok(())
}

/// Runs one retrieval through a request tracker and waits for it to settle.
async fn fetch<T>(context: &AppContext, url: String) -> Result<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let tracker: RequestTracker<T> = RequestTracker::new(Arc::clone(&context.transport));
    let mut rx = tracker.subscribe();
    tracker.bind(Some(url));

    loop {
        rx.changed().await?;
        let outcome = rx.borrow_and_update().clone();
        match outcome {
            Outcome::Succeeded(payload) => return Ok(payload),
            Outcome::Failed(message) => bail!(message),
            Outcome::Idle | Outcome::Pending => continue,
        }
    }
}

fn print_summaries(meals: Vec<MealSummary>, context: &AppContext) {
    if meals.is_empty() {
        println!("no meals found");
        return;
    }
    for meal in meals {
        let marker = if context.favorites.contains(&meal.id) {
            "*"
        } else {
            " "
        };
        println!("{} {:>7}  {}", marker, meal.id, meal.name);
    }
}

fn print_meal(meal: &Meal, context: &AppContext) {
    let marker = if context.favorites.contains(&meal.id) {
        " [favorite]"
    } else {
        ""
    };
    println!("{}  {}{}", meal.id, meal.name, marker);
    if let (Some(category), Some(area)) = (&meal.category, &meal.area) {
        println!("{} / {}", category, area);
    }

    let ingredients = meal.ingredients();
    if !ingredients.is_empty() {
        println!();
        for (ingredient, measure) in ingredients {
            if measure.is_empty() {
                println!("  - {}", ingredient);
            } else {
                println!("  - {} ({})", ingredient, measure);
            }
        }
    }

    if let Some(instructions) = &meal.instructions {
        println!("\n{}", instructions);
    }
}
