//! `boxroom home` - manage homes (tenants)

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;

#[derive(Subcommand, Debug)]
pub enum HomeCommands {
    /// Create a home; the creator becomes its first admin
    New {
        /// Home name
        name: String,
    },

    /// List the homes the acting identity belongs to
    List,

    /// Show one home
    Show {
        /// Home ID (HOME-...)
        id: String,
    },

    /// Rename a home (admin-only)
    Rename {
        /// Home ID (HOME-...)
        id: String,
        /// New name
        name: String,
    },

    /// Delete a home and everything beneath it (admin-only)
    Rm {
        /// Home ID (HOME-...)
        id: String,
    },
}

pub fn run(cmd: HomeCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        HomeCommands::New { name } => {
            let home = store.create_home(&caller, &name).into_diagnostic()?;
            println!(
                "{} Created home {} ({})",
                style("✓").green(),
                style(&home.id).bold(),
                home.name
            );
        }
        HomeCommands::List => {
            let homes = store.list_homes(&caller).into_diagnostic()?;
            let rows = homes
                .iter()
                .map(|h| {
                    vec![
                        h.id.to_string(),
                        h.name.clone(),
                        h.created_at.to_rfc3339(),
                    ]
                })
                .collect();
            println!("{}", table::render(&["ID", "NAME", "CREATED"], rows));
        }
        HomeCommands::Show { id } => {
            let id = helpers::parse_id(&id, EntityKind::Home)?;
            let home = store.get_home(&caller, &id).into_diagnostic()?;
            println!("{}", style(&home.name).bold());
            println!("  ID:      {}", home.id);
            println!("  Created: {}", home.created_at.to_rfc3339());
        }
        HomeCommands::Rename { id, name } => {
            let id = helpers::parse_id(&id, EntityKind::Home)?;
            let home = store.update_home(&caller, &id, &name).into_diagnostic()?;
            println!("{} Renamed home to '{}'", style("✓").green(), home.name);
        }
        HomeCommands::Rm { id } => {
            let id = helpers::parse_id(&id, EntityKind::Home)?;
            store.delete_home(&caller, &id).into_diagnostic()?;
            println!("{} Deleted home {}", style("✓").green(), id);
        }
    }
    Ok(())
}
