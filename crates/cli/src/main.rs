use anyhow::Context;
use agora_authz::Role;
use agora_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "agora", version, about = "Agora library catalog and social API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Change a user's role
    Promote {
        /// Username to change
        username: String,
        /// admin, librarian or member
        #[arg(long, default_value = "librarian")]
        role: Role,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Agora settings")?;
    agora_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => {
            let (registry, state) = agora_app::bootstrap(settings).await?;
            let served = agora_http::start_server(&registry, state).await;
            agora_app::shut_down(&registry).await?;
            served
        }
        Command::Migrate => {
            let db = agora_db::connect(&settings.database).await?;
            let registry = agora_app::build_registry();
            let applied = agora_db::migrate(&db, &registry.collect_migrations()).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Promote { username, role } => {
            let db = agora_db::connect(&settings.database).await?;
            match agora_authz::users::set_role(&db, &username, role).await? {
                Some(user) => {
                    println!("{} is now {:?}", user.username, user.role);
                    Ok(())
                }
                None => anyhow::bail!("no user named '{username}'"),
            }
        }
    }
}
