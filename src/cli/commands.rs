use std::io::{self, IsTerminal};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::Session;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::shell::run_shell;
use crate::config::{global_config_path, Settings};
use crate::domain::ClusterTreeStore;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        None | Some(Commands::Shell) => _shell(cli),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => _completion(*shell),
    }
}

#[instrument(skip(cli))]
fn _shell(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "settings loaded");

    let store = ClusterTreeStore::with_options(settings.store_options());
    let mut session = Session::new(store, settings.creation_defaults());

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout();
    if interactive {
        output::info(&mut stdout, "clustree shell, type 'help' for commands")?;
    }
    run_shell(&mut session, stdin.lock(), &mut stdout, interactive)
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    let mut stdout = io::stdout();
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&mut stdout, settings.to_toml()?.trim_end())?;
        }
        ConfigCommands::Path => {
            let path = global_config_path()
                .ok_or_else(|| CliError::Usage("no home directory to derive config path".into()))?;
            output::info(&mut stdout, &path.display())?;
        }
        ConfigCommands::Template => output::info(&mut stdout, &Settings::template())?,
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
