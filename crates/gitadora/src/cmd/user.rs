//! User command - Manage accounts without the HTTP API
//!
//! # Usage
//!
//! ```bash
//! GITADORA_PASSWORD=... gitadora user create --email admin@example.com --role admin
//! gitadora user list
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gitadora_auth::Role;
use gitadora_config::Config;

/// User command arguments
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account
    Create {
        #[arg(long)]
        email: String,

        /// Password (8 to 128 characters)
        #[arg(long, env = "GITADORA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Name shown on the ranking list (defaults to the email's local part)
        #[arg(long, default_value = "")]
        display_name: String,

        /// user or admin
        #[arg(long, default_value = "user")]
        role: String,
    },

    /// List accounts
    List,
}

/// Run the user command
pub async fn run(config: Config, args: UserArgs) -> Result<()> {
    let db = super::open_database(&config).await?;

    let result = match args.command {
        UserCommand::Create {
            email,
            password,
            display_name,
            role,
        } => {
            let role = Role::parse(&role)
                .with_context(|| format!("unknown role '{}' (expected user or admin)", role))?;
            let auth = super::auth_service(&config, db.clone())?;
            let user = auth
                .create_user(&email, &display_name, &password, role)
                .await
                .context("failed to create user")?;
            println!("Created {} {} (id {})", user.role, user.email, user.id);
            Ok(())
        }
        UserCommand::List => {
            let users = db.users().list().await.context("failed to list users")?;
            println!("{:>6}  {:<6}  {:<32}  DISPLAY NAME", "ID", "ROLE", "EMAIL");
            for user in users {
                println!(
                    "{:>6}  {:<6}  {:<32}  {}",
                    user.id, user.role, user.email, user.display_name
                );
            }
            Ok(())
        }
    };

    db.close().await;
    result
}
