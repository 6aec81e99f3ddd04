//! `boxroom item` - manage item definitions

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Create an item; names are unique per home, case-insensitively
    New {
        /// Home ID (HOME-...)
        home: String,

        /// Item name
        name: String,

        /// Category to file the item under (CAT-...)
        #[arg(long)]
        category: Option<String>,
    },

    /// List a home's items
    List {
        /// Home ID (HOME-...)
        home: String,
    },

    /// Show one item
    Show {
        /// Item ID (ITEM-...)
        id: String,
    },

    /// Edit an item
    Edit {
        /// Item ID (ITEM-...)
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// Move the item to this category (CAT-...)
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,

        /// Remove the item's category
        #[arg(long)]
        clear_category: bool,
    },

    /// Delete an item and its instances
    Rm {
        /// Item ID (ITEM-...)
        id: String,
    },
}

pub fn run(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        ItemCommands::New {
            home,
            name,
            category,
        } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let category = category
                .map(|c| helpers::parse_id(&c, EntityKind::Cat))
                .transpose()?;
            let item = store
                .create_item(&caller, &home, &name, category.as_ref())
                .into_diagnostic()?;
            println!(
                "{} Created item {} ({})",
                style("✓").green(),
                style(&item.id).bold(),
                item.name
            );
        }
        ItemCommands::List { home } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let items = store.list_items(&caller, &home).into_diagnostic()?;
            let rows = items
                .iter()
                .map(|i| {
                    vec![
                        i.id.to_string(),
                        i.name.clone(),
                        helpers::opt_cell(&i.category_id),
                    ]
                })
                .collect();
            println!("{}", table::render(&["ID", "NAME", "CATEGORY"], rows));
        }
        ItemCommands::Show { id } => {
            let id = helpers::parse_id(&id, EntityKind::Item)?;
            let item = store.get_item(&caller, &id).into_diagnostic()?;
            println!("{}", style(&item.name).bold());
            println!("  ID:       {}", item.id);
            println!("  Home:     {}", item.home_id);
            println!("  Category: {}", helpers::opt_cell(&item.category_id));
        }
        ItemCommands::Edit {
            id,
            name,
            category,
            clear_category,
        } => {
            let id = helpers::parse_id(&id, EntityKind::Item)?;
            let category = category
                .map(|c| helpers::parse_id(&c, EntityKind::Cat))
                .transpose()?;
            let category_id = if clear_category {
                Some(None)
            } else {
                category.as_ref().map(Some)
            };
            let item = store
                .update_item(&caller, &id, name.as_deref(), category_id)
                .into_diagnostic()?;
            println!(
                "{} Updated {} ({})",
                style("✓").green(),
                item.id,
                item.name
            );
        }
        ItemCommands::Rm { id } => {
            let id = helpers::parse_id(&id, EntityKind::Item)?;
            store.delete_item(&caller, &id).into_diagnostic()?;
            println!("{} Deleted item {}", style("✓").green(), id);
        }
    }
    Ok(())
}
