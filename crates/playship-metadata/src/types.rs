//! Typed metadata entities resolved from the directory tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Store listing image types.
///
/// The first four are singletons (at most one image); the rest are galleries
/// holding an ordered sequence of screenshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageType {
    /// Feature graphic shown at the top of the listing.
    FeatureGraphic,
    /// High resolution app icon.
    Icon,
    /// Promo graphic.
    PromoGraphic,
    /// Android TV banner.
    TvBanner,
    /// Phone screenshots.
    PhoneScreenshots,
    /// 7-inch tablet screenshots.
    SevenInchScreenshots,
    /// 10-inch tablet screenshots.
    TenInchScreenshots,
    /// Android TV screenshots.
    TvScreenshots,
    /// Wear OS screenshots.
    WearScreenshots,
}

impl ImageType {
    /// All image types, in resolution order.
    pub const ALL: [ImageType; 9] = [
        ImageType::FeatureGraphic,
        ImageType::Icon,
        ImageType::PromoGraphic,
        ImageType::TvBanner,
        ImageType::PhoneScreenshots,
        ImageType::SevenInchScreenshots,
        ImageType::TenInchScreenshots,
        ImageType::TvScreenshots,
        ImageType::WearScreenshots,
    ];

    /// Name used both on disk and by the store API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::FeatureGraphic => "featureGraphic",
            ImageType::Icon => "icon",
            ImageType::PromoGraphic => "promoGraphic",
            ImageType::TvBanner => "tvBanner",
            ImageType::PhoneScreenshots => "phoneScreenshots",
            ImageType::SevenInchScreenshots => "sevenInchScreenshots",
            ImageType::TenInchScreenshots => "tenInchScreenshots",
            ImageType::TvScreenshots => "tvScreenshots",
            ImageType::WearScreenshots => "wearScreenshots",
        }
    }

    /// Whether this type admits at most one image.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            ImageType::FeatureGraphic
                | ImageType::Icon
                | ImageType::PromoGraphic
                | ImageType::TvBanner
        )
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image mime types accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
        }
    }
}

impl std::fmt::Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Localized store listing text.
///
/// Every field is optional: a missing source file leaves the field unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedListing {
    /// BCP-47 language tag (e.g., "en-US").
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    /// Promo video URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl LocalizedListing {
    /// Creates an empty listing for a language.
    pub fn new(language_code: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            ..Default::default()
        }
    }

    /// Returns true when no text field was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.short_description.is_none()
            && self.full_description.is_none()
            && self.video.is_none()
    }
}

/// Release notes for one version code in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    pub language_code: String,
    pub version_code: i64,
    pub text: String,
    /// File the text was read from.
    pub source: PathBuf,
}

/// A single image to upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub language_code: String,
    pub image_type: ImageType,
    pub path: PathBuf,
    pub mime_type: MimeType,
}

/// Images resolved for one language, grouped by type.
///
/// Gallery entries keep the order in which they were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAssetSet {
    images: BTreeMap<ImageType, Vec<ImageAsset>>,
}

impl ImageAssetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset under its image type.
    ///
    /// Singleton types keep only the first asset inserted.
    pub fn push(&mut self, asset: ImageAsset) {
        let entry = self.images.entry(asset.image_type).or_default();
        if asset.image_type.is_singleton() && !entry.is_empty() {
            return;
        }
        entry.push(asset);
    }

    /// Assets of one type, in upload order.
    pub fn get(&self, image_type: ImageType) -> &[ImageAsset] {
        self.images
            .get(&image_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates over non-empty image types and their assets.
    pub fn iter(&self) -> impl Iterator<Item = (ImageType, &[ImageAsset])> {
        self.images
            .iter()
            .filter(|(_, assets)| !assets.is_empty())
            .map(|(image_type, assets)| (*image_type, assets.as_slice()))
    }

    /// Total number of assets.
    pub fn len(&self) -> usize {
        self.images.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(image_type: ImageType, name: &str) -> ImageAsset {
        ImageAsset {
            language_code: "en-US".to_string(),
            image_type,
            path: PathBuf::from(name),
            mime_type: MimeType::Png,
        }
    }

    #[test]
    fn test_image_type_names() {
        assert_eq!(ImageType::FeatureGraphic.as_str(), "featureGraphic");
        assert_eq!(ImageType::SevenInchScreenshots.to_string(), "sevenInchScreenshots");
        assert_eq!(
            serde_json::to_string(&ImageType::TvBanner).unwrap(),
            "\"tvBanner\""
        );
    }

    #[test]
    fn test_singleton_classification() {
        let singletons: Vec<_> = ImageType::ALL
            .iter()
            .filter(|t| t.is_singleton())
            .collect();
        assert_eq!(singletons.len(), 4);
        assert!(!ImageType::WearScreenshots.is_singleton());
    }

    #[test]
    fn test_asset_set_keeps_single_singleton() {
        let mut set = ImageAssetSet::new();
        set.push(asset(ImageType::Icon, "icon.png"));
        set.push(asset(ImageType::Icon, "icon.jpg"));

        assert_eq!(set.get(ImageType::Icon).len(), 1);
        assert_eq!(set.get(ImageType::Icon)[0].path, PathBuf::from("icon.png"));
    }

    #[test]
    fn test_asset_set_preserves_gallery_order() {
        let mut set = ImageAssetSet::new();
        set.push(asset(ImageType::PhoneScreenshots, "b.png"));
        set.push(asset(ImageType::PhoneScreenshots, "a.png"));

        let names: Vec<_> = set
            .get(ImageType::PhoneScreenshots)
            .iter()
            .map(|a| a.path.clone())
            .collect();
        assert_eq!(names, vec![PathBuf::from("b.png"), PathBuf::from("a.png")]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_listing_is_empty() {
        let mut listing = LocalizedListing::new("de-DE");
        assert!(listing.is_empty());
        listing.video = Some("https://youtu.be/x".to_string());
        assert!(!listing.is_empty());
    }
}
