use clap::{Args, Subcommand};

use kanri_core::id::UserId;
use kanri_core::types::User;
use kanri_policy::allowed_actions;

use crate::config::open_store;

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand)]
enum UserCommand {
    /// Add a user to the directory
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// user, editor, staff, admin or enterprise_admin
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// List users with their permitted actions
    List,
}

pub fn run(args: UserArgs) -> anyhow::Result<()> {
    match args.command {
        UserCommand::Add { name, email, role } => {
            let (_, _, store) = open_store()?;
            let user = User {
                id: UserId::new(),
                name,
                email,
                // Credentials live with the auth service, not here.
                password_hash: "!".into(),
                role: role.parse()?,
            };
            store.insert_user(&user)?;
            println!("Added user: {}", user.id);
            println!("  Name:  {}", user.name);
            println!("  Role:  {}", user.role);
        }
        UserCommand::List => {
            let (_, _, store) = open_store()?;
            for user in store.list_users()? {
                let actions: Vec<String> = allowed_actions(user.role)
                    .iter()
                    .map(|a| format!("{a:?}"))
                    .collect();
                println!("{} {} <{}> {}", user.id, user.name, user.email, user.role);
                println!("  can: {}", actions.join(", "));
            }
        }
    }
    Ok(())
}
