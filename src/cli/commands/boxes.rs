//! `boxroom box` - manage storage boxes
//!
//! Box mutations feed the audit trail; the scan token printed on
//! creation is what a label printer encodes.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;
use crate::store::BoxUpdate;

#[derive(Subcommand, Debug)]
pub enum BoxCommands {
    /// Create a box
    New {
        /// Home ID (HOME-...)
        home: String,

        /// Box label
        label: String,

        /// Location to place the box in (LOC-...)
        #[arg(long)]
        location: Option<String>,

        /// Scan token to print on the label; generated when omitted
        #[arg(long)]
        token: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List a home's boxes
    List {
        /// Home ID (HOME-...)
        home: String,
    },

    /// Show one box
    Show {
        /// Box ID (BOX-...)
        id: String,
    },

    /// Resolve a scanned token to its box
    Scan {
        /// Scan token, e.g. box:k7f2m9qa1x
        token: String,
    },

    /// Edit a box
    Edit {
        /// Box ID (BOX-...)
        id: String,

        /// New label
        #[arg(long)]
        label: Option<String>,

        /// Move the box to this location (LOC-...)
        #[arg(long, conflicts_with = "unplace")]
        location: Option<String>,

        /// Remove the box from its location
        #[arg(long)]
        unplace: bool,

        /// Replace the notes
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        /// Remove the notes
        #[arg(long)]
        clear_notes: bool,

        /// Replace the scan token
        #[arg(long)]
        token: Option<String>,
    },

    /// Delete a box and the instances stored in it
    Rm {
        /// Box ID (BOX-...)
        id: String,
    },
}

pub fn run(cmd: BoxCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        BoxCommands::New {
            home,
            label,
            location,
            token,
            notes,
        } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let location = location
                .map(|l| helpers::parse_id(&l, EntityKind::Loc))
                .transpose()?;
            let storage_box = store
                .create_box(&caller, &home, &label, location.as_ref(), token, notes)
                .into_diagnostic()?;
            println!(
                "{} Created box {} ({})",
                style("✓").green(),
                style(&storage_box.id).bold(),
                storage_box.label
            );
            println!("  Token: {}", storage_box.scan_token);
        }
        BoxCommands::List { home } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let boxes = store.list_boxes(&caller, &home).into_diagnostic()?;
            let rows = boxes
                .iter()
                .map(|b| {
                    vec![
                        b.id.to_string(),
                        b.label.clone(),
                        helpers::opt_cell(&b.location_id),
                        b.scan_token.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                table::render(&["ID", "LABEL", "LOCATION", "TOKEN"], rows)
            );
        }
        BoxCommands::Show { id } => {
            let id = helpers::parse_id(&id, EntityKind::Box)?;
            let storage_box = store.get_box(&caller, &id).into_diagnostic()?;
            print_box(&storage_box);
        }
        BoxCommands::Scan { token } => {
            let storage_box = store.find_box_by_token(&caller, &token).into_diagnostic()?;
            print_box(&storage_box);
        }
        BoxCommands::Edit {
            id,
            label,
            location,
            unplace,
            notes,
            clear_notes,
            token,
        } => {
            let id = helpers::parse_id(&id, EntityKind::Box)?;
            let location_id = if unplace {
                Some(None)
            } else {
                location
                    .map(|l| helpers::parse_id(&l, EntityKind::Loc))
                    .transpose()?
                    .map(Some)
            };
            let notes = if clear_notes { Some(None) } else { notes.map(Some) };
            let update = BoxUpdate {
                label,
                location_id,
                notes,
                scan_token: token,
            };
            let storage_box = store.update_box(&caller, &id, update).into_diagnostic()?;
            println!(
                "{} Updated {} ({})",
                style("✓").green(),
                storage_box.id,
                storage_box.label
            );
        }
        BoxCommands::Rm { id } => {
            let id = helpers::parse_id(&id, EntityKind::Box)?;
            store.delete_box(&caller, &id).into_diagnostic()?;
            println!("{} Deleted box {}", style("✓").green(), id);
        }
    }
    Ok(())
}

fn print_box(b: &crate::entities::storage_box::StorageBox) {
    println!("{}", style(&b.label).bold());
    println!("  ID:       {}", b.id);
    println!("  Home:     {}", b.home_id);
    println!("  Location: {}", helpers::opt_cell(&b.location_id));
    println!("  Token:    {}", b.scan_token);
    if let Some(notes) = &b.notes {
        println!("  Notes:    {}", notes);
    }
}
