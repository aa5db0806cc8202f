use crate::assess::{run_assessment, run_question_listing, AssessArgs, QuestionsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use needs_assessment::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Needs Assessment",
    about = "Score project needs and recommend a complexity tier and ownership model",
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
    /// Answer the questionnaire from the command line and print the recommendation
    Assess(AssessArgs),
    /// List the configured questions and their option weights
    Questions(QuestionsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assessment(args),
        Command::Questions(args) => run_question_listing(args),
    }
}
