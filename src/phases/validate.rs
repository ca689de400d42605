//! Locale completeness gate
//!
//! Every locale the shipped manifest requires for Linux must have been
//! obtained. The first one missing aborts the run before anything is
//! packaged.

use log::info;

use crate::error::{Error, Result};
use crate::locales::{Blacklist, LocaleManifest, ObtainedLocales, TARGET_PLATFORM};

/// Check `obtained` against the `shipped` manifest.
///
/// The source locale, blacklisted codes and locales that do not ship on
/// Linux are not required.
pub fn execute(
    shipped: &LocaleManifest,
    blacklist: &Blacklist,
    obtained: &ObtainedLocales,
) -> Result<()> {
    info!("*** Checking that required locales are present ***");

    for entry in shipped.entries() {
        if entry.is_source_locale() {
            continue;
        }
        if blacklist.contains(&entry.code) {
            info!("Ignoring {} (blacklisted)", entry.code);
            continue;
        }
        if !entry.ships_on(TARGET_PLATFORM) {
            info!(
                "Ignoring {} (not on {} - {})",
                entry.code,
                TARGET_PLATFORM,
                entry.platforms.join(", ")
            );
            continue;
        }

        if !obtained.contains(&entry.code) {
            return Err(Error::LocaleCompleteness {
                locale: entry.code.clone(),
            });
        }
        info!("{} - Yes", entry.code);
    }

    Ok(())
}
