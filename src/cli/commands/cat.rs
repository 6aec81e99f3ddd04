//! `boxroom cat` - manage item categories

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;

#[derive(Subcommand, Debug)]
pub enum CatCommands {
    /// Create a category; names are unique per home, case-insensitively
    New {
        /// Home ID (HOME-...)
        home: String,
        /// Category name
        name: String,
    },

    /// List a home's categories
    List {
        /// Home ID (HOME-...)
        home: String,
    },

    /// Rename a category
    Rename {
        /// Category ID (CAT-...)
        id: String,
        /// New name
        name: String,
    },

    /// Delete a category; items keep existing but lose the label
    Rm {
        /// Category ID (CAT-...)
        id: String,
    },
}

pub fn run(cmd: CatCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        CatCommands::New { home, name } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let category = store
                .create_category(&caller, &home, &name)
                .into_diagnostic()?;
            println!(
                "{} Created category {} ({})",
                style("✓").green(),
                style(&category.id).bold(),
                category.name
            );
        }
        CatCommands::List { home } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let categories = store.list_categories(&caller, &home).into_diagnostic()?;
            let rows = categories
                .iter()
                .map(|c| vec![c.id.to_string(), c.name.clone()])
                .collect();
            println!("{}", table::render(&["ID", "NAME"], rows));
        }
        CatCommands::Rename { id, name } => {
            let id = helpers::parse_id(&id, EntityKind::Cat)?;
            let category = store
                .rename_category(&caller, &id, &name)
                .into_diagnostic()?;
            println!(
                "{} Renamed category to '{}'",
                style("✓").green(),
                category.name
            );
        }
        CatCommands::Rm { id } => {
            let id = helpers::parse_id(&id, EntityKind::Cat)?;
            store.delete_category(&caller, &id).into_diagnostic()?;
            println!("{} Deleted category {}", style("✓").green(), id);
        }
    }
    Ok(())
}
