//! `boxroom audit` - inspect the audit trail
//!
//! Read-only by construction: there is no subcommand that writes.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::EntityKind;

#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// List a home's audit records in commit order
    List {
        /// Home ID (HOME-...)
        home: String,
    },

    /// Show one audit record with its before and after images
    Show {
        /// Audit record ID (AUD-...)
        id: String,
    },
}

pub fn run(cmd: AuditCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let store = helpers::open_store(global)?;

    match cmd {
        AuditCommands::List { home } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let records = store.list_audit(&caller, &home).into_diagnostic()?;
            let rows = records
                .iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        r.recorded_at.to_rfc3339(),
                        helpers::opt_cell(&r.actor),
                        r.action.clone(),
                        r.entity_id.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                table::render(&["ID", "RECORDED", "ACTOR", "ACTION", "ENTITY"], rows)
            );
        }
        AuditCommands::Show { id } => {
            let id = helpers::parse_id(&id, EntityKind::Aud)?;
            let record = store.get_audit(&caller, &id).into_diagnostic()?;
            println!("{}", style(&record.id).bold());
            println!("  Recorded: {}", record.recorded_at.to_rfc3339());
            println!("  Actor:    {}", helpers::opt_cell(&record.actor));
            println!("  Action:   {}", record.action);
            println!(
                "  Entity:   {} ({})",
                record.entity_id, record.entity_kind
            );
            match &record.before {
                Some(v) => println!(
                    "  Before:   {}",
                    serde_json::to_string_pretty(v).into_diagnostic()?
                ),
                None => println!("  Before:   -"),
            }
            match &record.after {
                Some(v) => println!(
                    "  After:    {}",
                    serde_json::to_string_pretty(v).into_diagnostic()?
                ),
                None => println!("  After:    -"),
            }
        }
    }
    Ok(())
}
