use clap::{Args, Subcommand};

mod set;

#[derive(Debug, Args)]
pub(crate) struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SettingsSubcommand {
    /// Change tax and shipping settings; omitted values are kept
    Set(set::SetSettingsArgs),
}

pub(crate) async fn run(command: SettingsCommand) -> Result<(), String> {
    match command.command {
        SettingsSubcommand::Set(args) => set::run(args).await,
    }
}
