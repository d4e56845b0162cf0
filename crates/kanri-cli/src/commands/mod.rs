pub mod change;
pub mod init;
pub mod notify;
pub mod user;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a kanri project in the current directory
    Init(init::InitArgs),
    /// Manage the user directory
    User(user::UserArgs),
    /// Manage change requests
    Change(change::ChangeArgs),
    /// Inspect the notification center
    Notifications(notify::NotifyArgs),
}

impl Commands {
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Commands::Init(args) => init::run(args),
            Commands::User(args) => user::run(args),
            Commands::Change(args) => change::run(args).await,
            Commands::Notifications(args) => notify::run(args),
        }
    }
}
