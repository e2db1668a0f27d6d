use clap::Subcommand;
use focuswell_core::{Config, CoreError, Database, ThemeManager, ThemePreference};

use crate::appearance::TerminalAppearance;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the resolved theme
    Show,
    /// Flip between light and dark
    Toggle,
    /// Set the theme explicitly
    Set {
        /// "light" or "dark"
        theme: ThemePreference,
    },
}

pub fn run(action: ThemeAction) -> Result<(), CoreError> {
    let config = Config::load()?;
    let mut db = Database::open()?;
    let mut theme = ThemeManager::initialize(&db, &TerminalAppearance::detect(&config));

    match action {
        ThemeAction::Show => {}
        ThemeAction::Toggle => {
            theme.toggle(&mut db);
        }
        ThemeAction::Set { theme: wanted } => {
            theme.set(wanted, &mut db);
        }
    }

    println!("{} {}", theme.current(), theme.icon());
    Ok(())
}
