use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courtside::{chat, config::Config, doctor, models::Domain};

#[derive(Parser)]
#[command(name = "courtside")]
#[command(about = "Chat with the official rulebook and the collective bargaining agreement")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation
    Chat {
        /// Knowledge domain to start in
        #[arg(short, long, value_enum, default_value = "rulebook")]
        domain: Domain,
    },
    /// Ask a single question and exit
    Ask {
        question: String,

        #[arg(short, long, value_enum, default_value = "rulebook")]
        domain: Domain,
    },
    /// Generate a quiz from the corpus
    Quiz {
        /// Narrow the quiz to a topic
        #[arg(short, long)]
        topic: Option<String>,

        /// Number of questions
        #[arg(short, long, default_value_t = 5)]
        count: usize,

        #[arg(short, long, value_enum, default_value = "rulebook")]
        domain: Domain,
    },
    /// Walk through a scenario with a guided form
    Scenario {
        #[arg(short, long, value_enum, default_value = "rulebook")]
        domain: Domain,
    },
    /// Check credentials and knowledge base connectivity
    Doctor,
}

/// Logs go to stderr; stdout belongs to the conversation.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "courtside=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load()?;

    // No subcommand starts a chat in the default domain.
    let command = cli.command.unwrap_or(Commands::Chat {
        domain: Domain::default(),
    });

    match command {
        Commands::Chat { domain } => {
            chat::run(&config, domain).await?;
        }
        Commands::Ask { question, domain } => {
            chat::ask_once(&config, domain, &question).await?;
        }
        Commands::Quiz {
            topic,
            count,
            domain,
        } => {
            chat::quiz(&config, domain, topic.as_deref(), count).await?;
        }
        Commands::Scenario { domain } => {
            chat::scenario(&config, domain).await?;
        }
        Commands::Doctor => {
            if !doctor::run(&config).await {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
