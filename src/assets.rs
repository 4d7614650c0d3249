//! Bundled placeholder images
//!
//! The `no_logo` placeholder is generated in-process so the loader always
//! has something to show, even with no asset files on disk. Additional
//! placeholders can be loaded from a directory, one image per file, named
//! by file stem (`crest_outline.png` → `crest_outline`).

use crate::config::schema::PlaceholderConfig;
use crate::decode::DecodedImage;
use crate::error::{LogoError, LogoResult};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the built-in placeholder
pub const NO_LOGO: &str = "no_logo";

const NO_LOGO_SIZE: u32 = 64;

/// Image file extensions accepted in an assets directory
const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Catalog of named placeholder images
#[derive(Debug, Clone)]
pub struct Assets {
    images: HashMap<String, DecodedImage>,
    default: String,
}

impl Assets {
    /// Catalog containing only the built-in placeholder
    pub fn builtin() -> Self {
        let mut images = HashMap::new();
        images.insert(NO_LOGO.to_string(), no_logo());
        Self {
            images,
            default: NO_LOGO.to_string(),
        }
    }

    /// Build the catalog from the `[placeholders]` config section
    pub fn from_config(config: &PlaceholderConfig) -> LogoResult<Self> {
        let mut assets = Self::builtin();

        if let Some(dir) = &config.assets_dir {
            assets.load_dir(dir)?;
        }

        if assets.images.contains_key(&config.default) {
            assets.default = config.default.clone();
        } else {
            warn!(
                "Default placeholder '{}' not found, using '{}'",
                config.default, NO_LOGO
            );
        }

        Ok(assets)
    }

    /// Load every supported image in `dir` as a named placeholder
    ///
    /// Returns the number of assets loaded. A file that fails to decode is
    /// an error: a broken placeholder would otherwise only show up at the
    /// first failed load.
    pub fn load_dir(&mut self, dir: &Path) -> LogoResult<usize> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| LogoError::io(format!("reading assets directory {}", dir.display()), e))?;

        let mut loaded = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| LogoError::io("reading assets entry", e))?
                .path();

            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !supported {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let img = image::open(&path).map_err(|e| LogoError::AssetLoad {
                path: path.clone(),
                reason: e.to_string(),
            })?;

            debug!("Loaded placeholder '{}' from {}", name, path.display());
            self.images
                .insert(name.to_string(), DecodedImage::new(img.to_rgba8()));
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Look up a placeholder by name, falling back to the default
    pub fn get(&self, name: &str) -> DecodedImage {
        if let Some(img) = self.images.get(name) {
            return img.clone();
        }
        warn!("Unknown placeholder '{}', using '{}'", name, self.default);
        self.default_placeholder()
    }

    /// The placeholder used when a load does not name one
    pub fn default_placeholder(&self) -> DecodedImage {
        // `default` is only ever set to a name present in `images`
        self.images
            .get(&self.default)
            .cloned()
            .unwrap_or_else(no_logo)
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    /// Names of all known placeholders, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.images.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Neutral grey tile with a darker ring, drawn procedurally
fn no_logo() -> DecodedImage {
    let center = (NO_LOGO_SIZE as f32 - 1.0) / 2.0;
    let outer = NO_LOGO_SIZE as f32 / 2.0 - 4.0;
    let inner = outer - 4.0;

    let pixels = RgbaImage::from_fn(NO_LOGO_SIZE, NO_LOGO_SIZE, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= outer && dist >= inner {
            Rgba([150, 150, 150, 255])
        } else {
            Rgba([224, 224, 224, 255])
        }
    });
    DecodedImage::new(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tests::png_bytes;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn builtin_has_no_logo() {
        let assets = Assets::builtin();
        let img = assets.get(NO_LOGO);
        assert_eq!((img.width(), img.height()), (NO_LOGO_SIZE, NO_LOGO_SIZE));
        assert_eq!(assets.default_name(), NO_LOGO);
    }

    #[test]
    fn lookups_return_shared_image() {
        let assets = Assets::builtin();
        assert!(assets.get(NO_LOGO).same_as(&assets.default_placeholder()));
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        let assets = Assets::builtin();
        assert!(assets
            .get("does_not_exist")
            .same_as(&assets.default_placeholder()));
    }

    #[test]
    fn loads_directory_by_file_stem() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("crest_outline.png"), png_bytes(10, 12)).unwrap();
        std::fs::write(temp.path().join("README.txt"), "not an image").unwrap();

        let assets = Assets::from_config(&PlaceholderConfig {
            default: "crest_outline".to_string(),
            assets_dir: Some(temp.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(assets.names(), vec!["crest_outline", NO_LOGO]);
        assert_eq!(assets.default_name(), "crest_outline");
        assert_eq!(assets.default_placeholder().height(), 12);
    }

    #[test]
    fn corrupt_asset_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("broken.png"), b"not a png").unwrap();

        let err = Assets::from_config(&PlaceholderConfig {
            default: NO_LOGO.to_string(),
            assets_dir: Some(temp.path().to_path_buf()),
        })
        .unwrap_err();
        assert!(matches!(err, LogoError::AssetLoad { .. }));
    }

    #[test]
    fn missing_default_keeps_no_logo() {
        let assets = Assets::from_config(&PlaceholderConfig {
            default: "missing".to_string(),
            assets_dir: None,
        })
        .unwrap();
        assert_eq!(assets.default_name(), NO_LOGO);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = Assets::builtin()
            .load_dir(&PathBuf::from("/nonexistent/logocache-assets"))
            .unwrap_err();
        assert!(matches!(err, LogoError::Io { .. }));
    }
}
