//! `boxroom loc` - manage the location tree

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;
use crate::entities::location::LocationKind;
use crate::store::LocationUpdate;

#[derive(Subcommand, Debug)]
pub enum LocCommands {
    /// Create a location
    New {
        /// Home ID (HOME-...)
        home: String,

        /// Location kind (house, room, or zone)
        kind: String,

        /// Location name
        name: String,

        /// Parent location (LOC-...); omit for a root
        #[arg(long)]
        parent: Option<String>,
    },

    /// List a home's locations
    List {
        /// Home ID (HOME-...)
        home: String,
    },

    /// Show one location
    Show {
        /// Location ID (LOC-...)
        id: String,
    },

    /// Edit a location
    Edit {
        /// Location ID (LOC-...)
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New kind (house, room, or zone)
        #[arg(long)]
        kind: Option<String>,

        /// Reparent under this location (LOC-...)
        #[arg(long, conflicts_with = "detach")]
        parent: Option<String>,

        /// Detach the location to the root of the tree
        #[arg(long)]
        detach: bool,
    },

    /// Delete a location and its subtree; boxes inside lose their
    /// placement but survive
    Rm {
        /// Location ID (LOC-...)
        id: String,
    },
}

pub fn run(cmd: LocCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        LocCommands::New {
            home,
            kind,
            name,
            parent,
        } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let kind: LocationKind = kind.parse().map_err(|e: String| miette::miette!(e))?;
            let parent = parent
                .map(|p| helpers::parse_id(&p, EntityKind::Loc))
                .transpose()?;
            let location = store
                .create_location(&caller, &home, kind, parent.as_ref(), &name)
                .into_diagnostic()?;
            println!(
                "{} Created {} {} ({})",
                style("✓").green(),
                location.kind,
                style(&location.id).bold(),
                location.name
            );
        }
        LocCommands::List { home } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let locations = store.list_locations(&caller, &home).into_diagnostic()?;
            let rows = locations
                .iter()
                .map(|l| {
                    vec![
                        l.id.to_string(),
                        l.kind.to_string(),
                        l.name.clone(),
                        helpers::opt_cell(&l.parent_id),
                    ]
                })
                .collect();
            println!(
                "{}",
                table::render(&["ID", "KIND", "NAME", "PARENT"], rows)
            );
        }
        LocCommands::Show { id } => {
            let id = helpers::parse_id(&id, EntityKind::Loc)?;
            let location = store.get_location(&caller, &id).into_diagnostic()?;
            println!("{}", style(&location.name).bold());
            println!("  ID:     {}", location.id);
            println!("  Kind:   {}", location.kind);
            println!("  Home:   {}", location.home_id);
            println!("  Parent: {}", helpers::opt_cell(&location.parent_id));
        }
        LocCommands::Edit {
            id,
            name,
            kind,
            parent,
            detach,
        } => {
            let id = helpers::parse_id(&id, EntityKind::Loc)?;
            let kind = kind
                .map(|k| k.parse::<LocationKind>())
                .transpose()
                .map_err(|e: String| miette::miette!(e))?;
            let parent_id = if detach {
                Some(None)
            } else {
                parent
                    .map(|p| helpers::parse_id(&p, EntityKind::Loc))
                    .transpose()?
                    .map(Some)
            };
            let update = LocationUpdate {
                name,
                kind,
                parent_id,
            };
            let location = store
                .update_location(&caller, &id, update)
                .into_diagnostic()?;
            println!(
                "{} Updated {} ({})",
                style("✓").green(),
                location.id,
                location.name
            );
        }
        LocCommands::Rm { id } => {
            let id = helpers::parse_id(&id, EntityKind::Loc)?;
            store.delete_location(&caller, &id).into_diagnostic()?;
            println!("{} Deleted location {}", style("✓").green(), id);
        }
    }
    Ok(())
}
