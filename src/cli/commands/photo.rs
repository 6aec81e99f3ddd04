//! `boxroom photo` - manage photo references
//!
//! Photos are stored as opaque locators; the bytes live elsewhere.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;
use crate::entities::photo::PhotoOwner;

#[derive(Subcommand, Debug)]
pub enum PhotoCommands {
    /// Attach a photo to an item, box, or invoice
    Add {
        /// Home ID (HOME-...)
        home: String,

        /// Owner type (item, box, or invoice)
        owner_type: String,

        /// Owner reference (ITEM-..., BOX-..., or an invoice reference)
        owner: String,

        /// Opaque locator for the stored bytes
        locator: String,
    },

    /// List a home's photos
    List {
        /// Home ID (HOME-...)
        home: String,

        /// Only photos of this owner type (item, box, or invoice)
        #[arg(long, requires = "owner")]
        owner_type: Option<String>,

        /// Only photos of this owner reference
        #[arg(long, requires = "owner_type")]
        owner: Option<String>,
    },

    /// Show one photo reference
    Show {
        /// Photo ID (PHOT-...)
        id: String,
    },

    /// Replace a photo's locator
    Relink {
        /// Photo ID (PHOT-...)
        id: String,
        /// New locator
        locator: String,
    },

    /// Delete a photo reference
    Rm {
        /// Photo ID (PHOT-...)
        id: String,
    },
}

pub fn run(cmd: PhotoCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        PhotoCommands::Add {
            home,
            owner_type,
            owner,
            locator,
        } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let owner_type: PhotoOwner =
                owner_type.parse().map_err(|e: String| miette::miette!(e))?;
            let photo = store
                .create_photo(&caller, &home, owner_type, &owner, &locator)
                .into_diagnostic()?;
            println!(
                "{} Added photo {} to {} {}",
                style("✓").green(),
                style(&photo.id).bold(),
                photo.owner_type,
                photo.owner_id
            );
        }
        PhotoCommands::List {
            home,
            owner_type,
            owner,
        } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let owner_type = owner_type
                .map(|t| t.parse::<PhotoOwner>())
                .transpose()
                .map_err(|e: String| miette::miette!(e))?;
            let filter = match (owner_type, owner.as_deref()) {
                (Some(t), Some(o)) => Some((t, o)),
                _ => None,
            };
            let photos = store
                .list_photos(&caller, &home, filter)
                .into_diagnostic()?;
            let rows = photos
                .iter()
                .map(|p| {
                    vec![
                        p.id.to_string(),
                        p.owner_type.to_string(),
                        p.owner_id.clone(),
                        p.locator.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                table::render(&["ID", "OWNER TYPE", "OWNER", "LOCATOR"], rows)
            );
        }
        PhotoCommands::Show { id } => {
            let id = helpers::parse_id(&id, EntityKind::Phot)?;
            let photo = store.get_photo(&caller, &id).into_diagnostic()?;
            println!("{}", style(&photo.id).bold());
            println!("  Home:    {}", photo.home_id);
            println!("  Owner:   {} {}", photo.owner_type, photo.owner_id);
            println!("  Locator: {}", photo.locator);
        }
        PhotoCommands::Relink { id, locator } => {
            let id = helpers::parse_id(&id, EntityKind::Phot)?;
            let photo = store
                .update_photo_locator(&caller, &id, &locator)
                .into_diagnostic()?;
            println!(
                "{} Relinked {} to {}",
                style("✓").green(),
                photo.id,
                photo.locator
            );
        }
        PhotoCommands::Rm { id } => {
            let id = helpers::parse_id(&id, EntityKind::Phot)?;
            store.delete_photo(&caller, &id).into_diagnostic()?;
            println!("{} Deleted photo {}", style("✓").green(), id);
        }
    }
    Ok(())
}
