use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use hostelbyte::cli::{create_admin, hash_password};
use hostelbyte::store::PgHostelStore;
use hostelbyte_core::CredentialHasher;
use hostelbyte_db::{DatabaseConfig, init_db_pool};

#[derive(Parser)]
#[command(name = "hostelbyte-cli")]
#[command(about = "Hostelbyte CLI - Administrative tools for Hostelbyte", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new admin account
    CreateAdmin {
        /// Display name of the admin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Print the bcrypt hash of a password
    HashPassword {
        /// Password (will be prompted securely if not provided)
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let hasher = CredentialHasher::from_env();

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&hasher, name, email, password).await,
        Commands::HashPassword { password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            println!("{}", hash_password(&hasher, &password)?);
            Ok(())
        }
    }
}

async fn handle_create_admin(
    hasher: &CredentialHasher,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    let store = PgHostelStore::new(pool);

    // Use provided values or prompt interactively
    let name = match name {
        Some(n) => n,
        None => prompt_text("Name")?,
    };
    let email = match email {
        Some(e) => e,
        None => prompt_text("Email address")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };

    match create_admin(&store, hasher, &name, &email, &password).await {
        Ok(_) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", email);
            println!("   Name: {}", name);
            Ok(())
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

fn prompt_text(prompt: &str) -> anyhow::Result<String> {
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

fn prompt_password() -> anyhow::Result<String> {
    Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords don't match")
        .interact()
        .context("Failed to read password")
}
