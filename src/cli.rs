//! Command-line interface definitions using clap derive API.

use clap::{Parser, Subcommand};

/// Mealdex recipe browser CLI
#[derive(Parser)]
#[command(name = "mealdex-cli")]
#[command(about = "Browse recipes and keep a locally persisted favorites list")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all recipe categories
    Categories,
    /// List meals within a category
    Meals {
        /// Category name, e.g. "Seafood"
        category: String,
    },
    /// Show full detail for one meal id
    Meal {
        /// Upstream meal id
        id: String,
    },
    /// Search meals by name
    Search {
        /// Free-text name query
        query: String,
    },
    /// Manage the favorites list
    Fav {
        #[command(subcommand)]
        command: FavCommands,
    },
}

#[derive(Subcommand)]
pub enum FavCommands {
    /// Add a meal id to the favorites
    Add { id: String },
    /// Remove a meal id from the favorites
    Remove { id: String },
    /// Print favorite ids in insertion order
    List,
    /// Fetch and print full detail for every favorite
    Show,
}
