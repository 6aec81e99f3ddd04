//! `boxroom inst` - manage item instances
//!
//! An instance places a quantity of one item in one box. Every
//! mutation here lands in the audit trail with before and after
//! images.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;
use crate::entities::instance::InstanceStatus;
use crate::store::InstanceUpdate;

#[derive(Subcommand, Debug)]
pub enum InstCommands {
    /// Put a quantity of an item into a box
    Add {
        /// Item ID (ITEM-...)
        item: String,

        /// Box ID (BOX-...)
        r#box: String,

        /// Quantity stored
        #[arg(long, default_value_t = 1)]
        qty: i64,

        /// Status (ok, to-repair, to-give, to-lend, to-sell, given-away)
        #[arg(long, default_value = "ok")]
        status: String,

        /// Asking price when selling
        #[arg(long)]
        price: Option<f64>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List a home's instances
    List {
        /// Home ID (HOME-...)
        home: String,

        /// Only instances stored in this box (BOX-...)
        #[arg(long)]
        r#box: Option<String>,
    },

    /// Show one instance
    Show {
        /// Instance ID (INST-...)
        id: String,
    },

    /// Edit an instance
    Edit {
        /// Instance ID (INST-...)
        id: String,

        /// Move the instance to this box (BOX-...)
        #[arg(long)]
        r#box: Option<String>,

        /// New quantity
        #[arg(long)]
        qty: Option<i64>,

        /// New status
        #[arg(long)]
        status: Option<String>,

        /// New asking price
        #[arg(long, conflicts_with = "clear_price")]
        price: Option<f64>,

        /// Remove the asking price
        #[arg(long)]
        clear_price: bool,

        /// Replace the notes
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        /// Remove the notes
        #[arg(long)]
        clear_notes: bool,
    },

    /// Delete an instance
    Rm {
        /// Instance ID (INST-...)
        id: String,
    },
}

pub fn run(cmd: InstCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        InstCommands::Add {
            item,
            r#box,
            qty,
            status,
            price,
            notes,
        } => {
            let item = helpers::parse_id(&item, EntityKind::Item)?;
            let box_id = helpers::parse_id(&r#box, EntityKind::Box)?;
            let status: InstanceStatus =
                status.parse().map_err(|e: String| miette::miette!(e))?;
            let instance = store
                .create_instance(&caller, &item, &box_id, qty, status, price, notes)
                .into_diagnostic()?;
            println!(
                "{} Added {} x{} to {}",
                style("✓").green(),
                style(&instance.id).bold(),
                instance.quantity,
                instance.box_id
            );
        }
        InstCommands::List { home, r#box } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let box_id = r#box
                .map(|b| helpers::parse_id(&b, EntityKind::Box))
                .transpose()?;
            let instances = store
                .list_instances(&caller, &home, box_id.as_ref())
                .into_diagnostic()?;
            let rows = instances
                .iter()
                .map(|i| {
                    vec![
                        i.id.to_string(),
                        i.item_id.to_string(),
                        i.box_id.to_string(),
                        i.quantity.to_string(),
                        i.status.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                table::render(&["ID", "ITEM", "BOX", "QTY", "STATUS"], rows)
            );
        }
        InstCommands::Show { id } => {
            let id = helpers::parse_id(&id, EntityKind::Inst)?;
            let instance = store.get_instance(&caller, &id).into_diagnostic()?;
            println!("{}", style(&instance.id).bold());
            println!("  Item:    {}", instance.item_id);
            println!("  Box:     {}", instance.box_id);
            println!("  Qty:     {}", instance.quantity);
            println!("  Status:  {}", instance.status);
            println!("  Price:   {}", helpers::opt_cell(&instance.sale_price));
            println!("  Notes:   {}", helpers::opt_cell(&instance.notes));
            println!("  Updated: {}", instance.updated_at.to_rfc3339());
        }
        InstCommands::Edit {
            id,
            r#box,
            qty,
            status,
            price,
            clear_price,
            notes,
            clear_notes,
        } => {
            let id = helpers::parse_id(&id, EntityKind::Inst)?;
            let box_id = r#box
                .map(|b| helpers::parse_id(&b, EntityKind::Box))
                .transpose()?;
            let status = status
                .map(|s| s.parse::<InstanceStatus>())
                .transpose()
                .map_err(|e: String| miette::miette!(e))?;
            let sale_price = if clear_price { Some(None) } else { price.map(Some) };
            let notes = if clear_notes { Some(None) } else { notes.map(Some) };
            let update = InstanceUpdate {
                box_id,
                quantity: qty,
                status,
                sale_price,
                notes,
            };
            let instance = store
                .update_instance(&caller, &id, update)
                .into_diagnostic()?;
            println!(
                "{} Updated {} (qty {}, {})",
                style("✓").green(),
                instance.id,
                instance.quantity,
                instance.status
            );
        }
        InstCommands::Rm { id } => {
            let id = helpers::parse_id(&id, EntityKind::Inst)?;
            store.delete_instance(&caller, &id).into_diagnostic()?;
            println!("{} Deleted instance {}", style("✓").green(), id);
        }
    }
    Ok(())
}
