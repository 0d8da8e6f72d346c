use crate::error::SyncError;
use crate::fetch::fetch_listing_page;
use crate::format::format_listings;
use crate::log::RunLog;
use crate::parser::extract_listings;
use crate::patch;
use crate::settings::Settings;

/// One full update run. Returns whether the target was (or, on a dry run,
/// would have been) updated; every failure is reported through `log`.
pub async fn run(settings: &Settings, log: &RunLog, dry_run: bool) -> bool {
    let source = settings.source_label();
    let target = settings.target_label();

    log.rule();
    log.line("Starting BBS list auto-update");

    log.line(format!("Fetching BBS list from {}...", source));
    let html = match fetch_listing_page(settings).await {
        Ok(html) => {
            log.line(format!("Successfully downloaded {}", source));
            html
        }
        Err(e) => {
            log.line(format!("ERROR: Failed to fetch {}: {}", source, e));
            log.line("FAILED: Could not fetch BBS list");
            return false;
        }
    };

    let listings = extract_listings(&html);
    if listings.is_empty() {
        log.line(format!("WARNING: {}", SyncError::NoListings));
        return false;
    }
    log.line(format!("Found {} BBSes from {}", listings.len(), source));

    log.line(format!("Updating {} with new entries...", target));
    let success = match format_listings(&listings) {
        Ok(section) => match patch::apply(&settings.target_file, &section, dry_run) {
            Ok(()) if dry_run => {
                log.line(format!("Dry run: {} left unchanged", target));
                true
            }
            Ok(()) => {
                log.line(format!("Successfully updated {}", target));
                true
            }
            Err(e) => {
                log.line(format!("ERROR: {}", e));
                false
            }
        },
        Err(e) => {
            log.line(format!("ERROR: Failed to format entries: {}", e));
            false
        }
    };

    if success {
        log.line(format!("SUCCESS: Updated with {} BBSes", listings.len()));
    }
    log.line("Update process completed");
    log.rule();

    success
}
