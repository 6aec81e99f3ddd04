//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    audit::AuditCommands, boxes::BoxCommands, cat::CatCommands, home::HomeCommands,
    inst::InstCommands, item::ItemCommands, loc::LocCommands, member::MemberCommands,
    photo::PhotoCommands,
};

#[derive(Parser)]
#[command(name = "boxroom")]
#[command(author, version, about = "Multi-tenant home inventory with a transactional audit trail")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Path to the inventory database
    #[arg(long, global = true, env = "BOXROOM_DB")]
    pub db: Option<PathBuf>,

    /// Acting identity (established by the upstream authentication layer)
    #[arg(
        id = "acting_identity",
        long = "as",
        global = true,
        env = "BOXROOM_IDENTITY",
        value_name = "IDENTITY"
    )]
    pub identity: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage homes (tenants)
    #[command(subcommand)]
    Home(HomeCommands),

    /// Manage home memberships
    #[command(subcommand)]
    Member(MemberCommands),

    /// Manage the location tree (house / room / zone)
    #[command(subcommand)]
    Loc(LocCommands),

    /// Manage categories
    #[command(subcommand)]
    Cat(CatCommands),

    /// Manage storage boxes
    #[command(subcommand)]
    Box(BoxCommands),

    /// Manage items
    #[command(subcommand)]
    Item(ItemCommands),

    /// Manage item instances (placements)
    #[command(subcommand)]
    Inst(InstCommands),

    /// Manage photo references
    #[command(subcommand)]
    Photo(PhotoCommands),

    /// Inspect the audit trail
    #[command(subcommand)]
    Audit(AuditCommands),
}
