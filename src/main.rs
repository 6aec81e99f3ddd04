use boxroom::cli::{Cli, Commands};
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for readable diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Home(cmd) => boxroom::cli::commands::home::run(cmd, &global),
        Commands::Member(cmd) => boxroom::cli::commands::member::run(cmd, &global),
        Commands::Loc(cmd) => boxroom::cli::commands::loc::run(cmd, &global),
        Commands::Cat(cmd) => boxroom::cli::commands::cat::run(cmd, &global),
        Commands::Box(cmd) => boxroom::cli::commands::boxes::run(cmd, &global),
        Commands::Item(cmd) => boxroom::cli::commands::item::run(cmd, &global),
        Commands::Inst(cmd) => boxroom::cli::commands::inst::run(cmd, &global),
        Commands::Photo(cmd) => boxroom::cli::commands::photo::run(cmd, &global),
        Commands::Audit(cmd) => boxroom::cli::commands::audit::run(cmd, &global),
    }
}
