use crate::demo::{run_check, run_classify, run_demo, run_questions, CheckArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use service_navigator::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Citizen Service Navigator",
    about = "Route citizens to public services and check their eligibility",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Show which service a free-text request routes to
    Classify {
        /// The citizen's request, e.g. "I need zakat help"
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List the follow-up questions for a service
    Questions {
        /// Service identifier (zakat, transport-card, immunization, housing-support)
        service: String,
    },
    /// Run one eligibility check end to end
    Check(CheckArgs),
    /// Walk through a scripted request for every supported service
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Disable the language model and answer with deterministic templates
    #[arg(long)]
    pub(crate) degraded: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Classify { text } => {
            run_classify(&text.join(" "));
            Ok(())
        }
        Command::Questions { service } => {
            run_questions(&service);
            Ok(())
        }
        Command::Check(args) => run_check(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
