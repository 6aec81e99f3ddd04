//! `boxroom member` - manage home memberships
//!
//! Joining is self-service only; role changes and removals are admin-only.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::GlobalOpts;
use crate::cli::{helpers, table};
use crate::core::identity::{EntityKind, IdentityId};
use crate::entities::home::Role;

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Join a home as the acting identity
    Join {
        /// Home ID (HOME-...)
        home: String,

        /// Role to join with (admin or member)
        #[arg(long, default_value = "member")]
        role: String,
    },

    /// List a home's members
    List {
        /// Home ID (HOME-...)
        home: String,
    },

    /// Change a member's role (admin-only)
    SetRole {
        /// Home ID (HOME-...)
        home: String,
        /// Member identity
        identity: String,
        /// New role (admin or member)
        role: String,
    },

    /// Remove a member (admin-only)
    Rm {
        /// Home ID (HOME-...)
        home: String,
        /// Member identity
        identity: String,
    },
}

pub fn run(cmd: MemberCommands, global: &GlobalOpts) -> Result<()> {
    let caller = helpers::caller(global)?;
    let mut store = helpers::open_store(global)?;

    match cmd {
        MemberCommands::Join { home, role } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let role: Role = role.parse().map_err(|e: String| miette::miette!(e))?;
            let m = store
                .join_home(&caller, &home, &caller, role)
                .into_diagnostic()?;
            println!(
                "{} Joined {} as {}",
                style("✓").green(),
                m.home_id,
                m.role
            );
        }
        MemberCommands::List { home } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let members = store.list_members(&caller, &home).into_diagnostic()?;
            let rows = members
                .iter()
                .map(|m| {
                    vec![
                        m.identity.to_string(),
                        m.role.to_string(),
                        m.joined_at.to_rfc3339(),
                    ]
                })
                .collect();
            println!("{}", table::render(&["IDENTITY", "ROLE", "JOINED"], rows));
        }
        MemberCommands::SetRole {
            home,
            identity,
            role,
        } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let identity = IdentityId::new(identity);
            let role: Role = role.parse().map_err(|e: String| miette::miette!(e))?;
            let m = store
                .set_member_role(&caller, &home, &identity, role)
                .into_diagnostic()?;
            println!(
                "{} {} is now {} in {}",
                style("✓").green(),
                m.identity,
                m.role,
                m.home_id
            );
        }
        MemberCommands::Rm { home, identity } => {
            let home = helpers::parse_id(&home, EntityKind::Home)?;
            let identity = IdentityId::new(identity);
            store
                .remove_member(&caller, &home, &identity)
                .into_diagnostic()?;
            println!("{} Removed {} from {}", style("✓").green(), identity, home);
        }
    }
    Ok(())
}
