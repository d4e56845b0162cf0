use clap::{Args, Subcommand};

use crate::config::{open_engine, resolve_actor};

#[derive(Args)]
pub struct NotifyArgs {
    /// Acting user id (24-hex)
    #[arg(long = "as", value_name = "USER_ID", global = true)]
    actor: Option<String>,

    #[command(subcommand)]
    command: NotifyCommand,
}

#[derive(Subcommand)]
enum NotifyCommand {
    /// List the acting user's notifications, newest first
    List,
    /// Mark a notification as read
    Read { id: String },
}

pub fn run(args: NotifyArgs) -> anyhow::Result<()> {
    let (store, engine) = open_engine()?;
    let actor_id = args
        .actor
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--as <USER_ID> is required"))?;
    let actor = resolve_actor(&store, actor_id)?;

    match args.command {
        NotifyCommand::List => {
            for n in engine.notifications(&actor)? {
                let flag = if n.read { " " } else { "*" };
                println!("{flag} {} [{}] {}: {}", n.id, n.priority, n.title, n.message);
            }
        }
        NotifyCommand::Read { id } => {
            if engine.mark_notification_read(&id, &actor)? {
                println!("Marked read: {id}");
            } else {
                println!("No such notification: {id}");
            }
        }
    }
    Ok(())
}
