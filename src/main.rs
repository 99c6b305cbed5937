//! sysundo: single-step undo for rm, mv and cp
//!
//! `sysundo watch rm notes.txt` backs up notes.txt before removing it;
//! `sysundo undo` puts it back.

use std::process::ExitCode;

use sysundo::cli::{CliArgs, Commands};
use sysundo::config::Config;
use sysundo::error::SysundoError;
use sysundo::init;
use sysundo::interceptor::Interceptor;
use sysundo::lang::{self, Messages};
use sysundo::logger;
use sysundo::restorer::Restorer;
use sysundo::store::BackupStore;

fn main() -> ExitCode {
    let args = CliArgs::parse_args();

    if let Err(e) = logger::init(args.verbose) {
        eprintln!("sysundo: cannot initialize logging: {:#}", e);
    }

    let config = Config::load();
    let messages = Messages::select(config.language.as_deref());

    match run(&args.command, &config, &messages) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let key = match args.command {
                Commands::Undo => "undo_error",
                _ => "error",
            };
            eprintln!("{}", messages.get(key, &[&e.user_message(&messages)]));
            e.exit_code().into()
        }
    }
}

/// Dispatch a subcommand
fn run(command: &Commands, config: &Config, messages: &Messages) -> Result<(), SysundoError> {
    match command {
        Commands::Watch { argv } => {
            let Some((program, program_args)) = argv.split_first() else {
                return Err(SysundoError::MissingCommand);
            };
            let store = BackupStore::open(config.backup_dir());
            Interceptor::new(&store, &config.policy, messages).run(program, program_args)
        }
        Commands::Undo => {
            let store = BackupStore::open(config.backup_dir());
            Restorer::new(&store, messages).restore_all()?;
            println!("{}", messages.get("last_backups_restored", &[]));
            Ok(())
        }
        Commands::List => {
            let store = BackupStore::open(config.backup_dir());
            println!("{}", Restorer::new(&store, messages).list_backups()?);
            Ok(())
        }
        Commands::Lang { code } => match code {
            Some(code) => set_language(code, config),
            None => {
                show_languages(messages);
                Ok(())
            }
        },
        Commands::Init => init::run_init(messages),
    }
}

/// Print the current language and every available one
fn show_languages(messages: &Messages) {
    println!(
        "{}",
        messages.get(
            "current_language",
            &[&messages.code(), &messages.native_name()]
        )
    );
    println!();
    println!("{}", messages.get("available_languages", &[]));
    for code in lang::available_languages() {
        println!(
            "{}",
            messages.get("language_entry", &[&code, &lang::native_name(code)])
        );
    }
}

/// Persist `code` as the interface language
fn set_language(code: &str, config: &Config) -> Result<(), SysundoError> {
    let Some(selected) = Messages::load(code) else {
        return Err(SysundoError::UnknownLanguage(code.to_string()));
    };

    let path = Config::config_path().ok_or_else(|| SysundoError::ConfigWrite {
        path: "~/.config/sysundo/config.toml".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found"),
    })?;

    let updated = Config {
        language: Some(code.to_string()),
        ..config.clone()
    };
    updated.save_to_path(&path)?;

    println!("{}", selected.get("language_set", &[&code]));
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_version_available() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
        assert!(version.contains('.'), "Version should be in semver format");
    }
}
