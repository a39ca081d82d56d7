//! Localized listing text fields.

use crate::LocalizedListing;
use std::path::Path;
use tracing::debug;

/// Listing fields and the file each one is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingField {
    Title,
    ShortDescription,
    FullDescription,
    Video,
}

const LISTING_FILES: [(ListingField, &str); 4] = [
    (ListingField::FullDescription, "full_description.txt"),
    (ListingField::ShortDescription, "short_description.txt"),
    (ListingField::Title, "title.txt"),
    (ListingField::Video, "video.txt"),
];

/// Reads the listing text files of a language directory.
///
/// Any file that is missing or unreadable leaves its field unset; this never
/// fails.
pub fn read_listing(language_dir: &Path, language_code: &str) -> LocalizedListing {
    let mut listing = LocalizedListing::new(language_code);

    for (field, file_name) in LISTING_FILES {
        let path = language_dir.join(file_name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "listing file not read, ignoring");
                continue;
            }
        };

        let slot = match field {
            ListingField::Title => &mut listing.title,
            ListingField::ShortDescription => &mut listing.short_description,
            ListingField::FullDescription => &mut listing.full_description,
            ListingField::Video => &mut listing.video,
        };
        *slot = Some(content);
    }

    debug!(language = language_code, ?listing, "constructed listing");
    listing
}
