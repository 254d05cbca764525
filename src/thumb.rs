//! Thumbnail URL builder
//!
//! Pure function from original image metadata and an option chain to `img`
//! attributes. Nothing is cached; callers recompute whenever options change.
//!
//! ## File name format
//!
//! ```text
//! {stem}-{w}x{h}[-crop[-{position}]][-blur{n}][-bw][-q{n}].{ext}
//! ```
//!
//! The extension is lower-cased and `jpeg` becomes `jpg`.

use serde::{Deserialize, Serialize};

/// Original image metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: Option<String>,
}

/// Resize options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Aspect ratio (width / height) used with a single explicit dimension
    pub ratio: Option<f64>,
    pub crop: bool,
    /// Crop anchor such as `"top-left"`; `"center"` is the default
    pub crop_position: Option<String>,
    pub blur: u32,
    pub grayscale: bool,
    pub quality: u32,
    /// Request a double-density file when the original is large enough
    pub hires: bool,
}

impl ThumbOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn ratio(mut self, ratio: f64) -> Self {
        self.ratio = Some(ratio);
        self
    }

    pub fn crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    pub fn crop_at(mut self, position: impl Into<String>) -> Self {
        self.crop = true;
        self.crop_position = Some(position.into());
        self
    }

    pub fn blur(mut self, blur: u32) -> Self {
        self.blur = blur;
        self
    }

    pub fn grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    pub fn hires(mut self, hires: bool) -> Self {
        self.hires = hires;
        self
    }

    fn effective_ratio(&self) -> Option<f64> {
        self.ratio.filter(|r| r.is_finite() && *r > 0.0)
    }
}

/// Attributes for an `img` element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAttributes {
    pub src: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: Option<String>,
}

/// Compute the thumb URL and display size.
///
/// Returns `src: None` when the url, dimensions or extension are missing.
pub fn build_url(image: &ImageSource, options: &ThumbOptions) -> ImageAttributes {
    let incomplete = ImageAttributes {
        src: None,
        width: options.width.or(image.width),
        height: options.height.or(image.height),
        alt: image.alt.clone(),
    };

    let (Some(url), Some(orig_w), Some(orig_h)) = (image.url.as_deref(), image.width, image.height)
    else {
        return incomplete;
    };
    if orig_w == 0 || orig_h == 0 {
        return incomplete;
    }
    let Some((prefix, stem, ext)) = split_url(url) else {
        return incomplete;
    };

    let (width, height) = target_size(orig_w, orig_h, options);
    let doubled = (width.checked_mul(2), height.checked_mul(2));
    let (file_w, file_h) = match doubled {
        (Some(w), Some(h)) if options.hires && w <= orig_w && h <= orig_h => (w, h),
        _ => (width, height),
    };

    let crop = options.crop || (options.effective_ratio().is_some() && (options.width.is_some() != options.height.is_some()));

    let mut suffix = format!("-{}x{}", file_w, file_h);
    if crop {
        suffix.push_str("-crop");
        if let Some(position) = options.crop_position.as_deref().filter(|p| *p != "center") {
            suffix.push('-');
            suffix.push_str(position);
        }
    }
    if options.blur > 0 {
        suffix.push_str(&format!("-blur{}", options.blur));
    }
    if options.grayscale {
        suffix.push_str("-bw");
    }
    if options.quality > 0 {
        suffix.push_str(&format!("-q{}", options.quality));
    }

    ImageAttributes {
        src: Some(format!("{}{}{}.{}", prefix, stem, suffix, ext)),
        width: Some(width),
        height: Some(height),
        alt: image.alt.clone(),
    }
}

/// Comma-separated `srcset` for several widths sharing the other options
pub fn srcset(image: &ImageSource, widths: &[u32], options: &ThumbOptions) -> String {
    widths
        .iter()
        .filter_map(|w| {
            let mut opts = options.clone().width(*w);
            opts.height = None;
            opts.hires = false;
            build_url(image, &opts).src.map(|src| format!("{} {}w", src, w))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the display size for the given options
fn target_size(orig_w: u32, orig_h: u32, options: &ThumbOptions) -> (u32, u32) {
    let original_ratio = orig_w as f64 / orig_h as f64;
    let ratio = options.effective_ratio().unwrap_or(original_ratio);

    match (options.width, options.height) {
        (Some(w), Some(h)) if options.crop => (w.max(1), h.max(1)),
        (Some(w), Some(h)) => {
            let fit_w = scale(h, original_ratio);
            if fit_w > w {
                (w.max(1), scale_div(w, original_ratio))
            } else {
                (fit_w, h.max(1))
            }
        }
        (Some(w), None) => (w.max(1), scale_div(w, ratio)),
        (None, Some(h)) => (scale(h, ratio), h.max(1)),
        (None, None) => (orig_w, orig_h),
    }
}

fn scale(value: u32, ratio: f64) -> u32 {
    ((value as f64 * ratio).round() as u32).max(1)
}

fn scale_div(value: u32, ratio: f64) -> u32 {
    ((value as f64 / ratio).round() as u32).max(1)
}

/// Split a url into (directory prefix with trailing slash, stem, normalised extension)
fn split_url(url: &str) -> Option<(&str, &str, String)> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let slash = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let (prefix, filename) = path.split_at(slash);
    let dot = filename.rfind('.')?;
    let (stem, ext) = (&filename[..dot], &filename[dot + 1..]);
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    let ext = match ext.to_lowercase().as_str() {
        "jpeg" => "jpg".to_string(),
        other => other.to_string(),
    };
    Some((prefix, stem, ext))
}
