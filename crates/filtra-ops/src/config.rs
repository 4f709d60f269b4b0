//! YAML pipeline descriptions.
//!
//! ```yaml
//! parallelization: true
//! filters:
//!   - resize: { width: 300, height: 0, resampling: lanczos }
//!   - gaussian_blur: { sigma: 1.5 }
//!   - rotate: { angle: 30, interpolation: cubic, background: [0, 0, 0, 1] }
//!   - sobel
//! ```
//!
//! Each entry in `filters` is either a bare filter name or a single-key map
//! from the name to its parameters. Omitted parameters take the defaults of
//! the corresponding filter constructor.
//!
//! # Example
//!
//! ```rust
//! use filtra_ops::config::PipelineConfig;
//!
//! let cfg = PipelineConfig::from_yaml_str("filters: [rotate90, { gaussian_blur: { sigma: 2 } }]")?;
//! let pipeline = cfg.build();
//! assert_eq!(pipeline.len(), 2);
//! # Ok::<(), filtra_ops::OpsError>(())
//! ```

use std::path::Path;

use filtra_core::{Pixel, Rect};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::colors::ColorFunc;
use crate::convolution::{Convolution, GaussianBlur, Mean, Sobel, UnsharpMask};
use crate::effects::Pixelate;
use crate::filter::{CopyImage, Filter};
use crate::pipeline::Pipeline;
use crate::rank::RankFilter;
use crate::resize::{Resampling, Resize, ResizeToFill, ResizeToFit};
use crate::transform::{Anchor, Crop, CropToSize, Interpolation, Rotate, Transform};
use crate::{OpsError, OpsResult};

/// One configured filter.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum FilterConfig {
    Resize { width: i32, height: i32, resampling: Resampling },
    ResizeToFit { width: i32, height: i32, resampling: Resampling },
    ResizeToFill { width: i32, height: i32, resampling: Resampling, anchor: Anchor },
    Crop { rect: Rect },
    CropToSize { width: i32, height: i32, anchor: Anchor },
    Rotate { angle: f32, background: Pixel, interpolation: Interpolation },
    Transform(Transform),
    GaussianBlur { sigma: f32 },
    UnsharpMask { sigma: f32, amount: f32, threshold: f32 },
    Mean { ksize: usize, disk: bool },
    Median { ksize: usize, disk: bool },
    Minimum { ksize: usize, disk: bool },
    Maximum { ksize: usize, disk: bool },
    Sobel,
    Convolution { kernel: Vec<f32>, normalize: bool, alpha: bool, abs: bool, delta: f32 },
    Invert,
    Gamma { gamma: f32 },
    SrgbToLinear,
    LinearToSrgb,
    Pixelate { size: i32 },
    Copy,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SizeParams {
    #[serde(default)]
    width: i32,
    #[serde(default)]
    height: i32,
    #[serde(default)]
    resampling: Resampling,
    #[serde(default)]
    anchor: Anchor,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CropParams {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RotateParams {
    angle: f32,
    #[serde(default)]
    background: [f32; 4],
    #[serde(default)]
    interpolation: Interpolation,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BlurParams {
    sigma: f32,
    #[serde(default = "one")]
    amount: f32,
    #[serde(default)]
    threshold: f32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RankParams {
    ksize: usize,
    #[serde(default)]
    disk: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KernelParams {
    kernel: Vec<f32>,
    #[serde(default)]
    normalize: bool,
    #[serde(default)]
    alpha: bool,
    #[serde(default)]
    abs: bool,
    #[serde(default)]
    delta: f32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GammaParams {
    gamma: f32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PixelateParams {
    size: i32,
}

fn one() -> f32 {
    1.0
}

fn finite(name: &str, v: f32) -> OpsResult<f32> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(OpsError::InvalidParameter(format!("{name} must be finite, got {v}")))
    }
}

fn params<T: for<'de> Deserialize<'de>>(value: Value) -> OpsResult<T> {
    let value = if value.is_null() {
        Value::Mapping(Default::default())
    } else {
        value
    };
    Ok(serde_yaml::from_value(value)?)
}

fn transform_by_name(name: &str) -> Option<Transform> {
    Some(match name {
        "rotate90" => Transform::Rotate90,
        "rotate180" => Transform::Rotate180,
        "rotate270" => Transform::Rotate270,
        "flip_horizontal" => Transform::FlipHorizontal,
        "flip_vertical" => Transform::FlipVertical,
        "transpose" => Transform::Transpose,
        "transverse" => Transform::Transverse,
        _ => return None,
    })
}

fn no_params(name: &str, value: &Value) -> OpsResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Mapping(m) if m.is_empty() => Ok(()),
        _ => Err(OpsError::InvalidParameter(format!("{name} takes no parameters"))),
    }
}

impl FilterConfig {
    /// Parses one `filters` entry.
    pub fn from_value(entry: Value) -> OpsResult<Self> {
        let (name, value) = match entry {
            Value::String(name) => (name, Value::Null),
            Value::Mapping(map) => {
                let mut it = map.into_iter();
                match (it.next(), it.next()) {
                    (Some((Value::String(name), value)), None) => (name, value),
                    _ => {
                        return Err(OpsError::InvalidParameter(
                            "filter entry must be a name or a single-key map".into(),
                        ));
                    }
                }
            }
            other => {
                return Err(OpsError::InvalidParameter(format!(
                    "unexpected filter entry: {other:?}"
                )));
            }
        };
        Self::from_name(&name, value)
    }

    /// Builds a filter description from its name and YAML parameters.
    pub fn from_name(name: &str, value: Value) -> OpsResult<Self> {
        if let Some(t) = transform_by_name(name) {
            no_params(name, &value)?;
            return Ok(Self::Transform(t));
        }
        let cfg = match name {
            "resize" | "resize_to_fit" | "resize_to_fill" | "crop_to_size" => {
                let p: SizeParams = params(value)?;
                match name {
                    "resize" => Self::Resize {
                        width: p.width,
                        height: p.height,
                        resampling: p.resampling,
                    },
                    "resize_to_fit" => Self::ResizeToFit {
                        width: p.width,
                        height: p.height,
                        resampling: p.resampling,
                    },
                    "resize_to_fill" => Self::ResizeToFill {
                        width: p.width,
                        height: p.height,
                        resampling: p.resampling,
                        anchor: p.anchor,
                    },
                    _ => Self::CropToSize {
                        width: p.width,
                        height: p.height,
                        anchor: p.anchor,
                    },
                }
            }
            "crop" => {
                let p: CropParams = params(value)?;
                Self::Crop {
                    rect: Rect::new(p.min_x, p.min_y, p.max_x, p.max_y),
                }
            }
            "rotate" => {
                let p: RotateParams = params(value)?;
                if p.background.iter().any(|c| !(0.0..=1.0).contains(c)) {
                    return Err(OpsError::InvalidParameter(format!(
                        "rotate background channels must be in [0, 1], got {:?}",
                        p.background
                    )));
                }
                Self::Rotate {
                    angle: finite("angle", p.angle)?,
                    background: Pixel::from(p.background),
                    interpolation: p.interpolation,
                }
            }
            "gaussian_blur" => {
                let p: BlurParams = params(value)?;
                Self::GaussianBlur {
                    sigma: finite("sigma", p.sigma)?,
                }
            }
            "unsharp_mask" => {
                let p: BlurParams = params(value)?;
                Self::UnsharpMask {
                    sigma: finite("sigma", p.sigma)?,
                    amount: finite("amount", p.amount)?,
                    threshold: finite("threshold", p.threshold)?,
                }
            }
            "mean" | "median" | "minimum" | "maximum" => {
                let RankParams { ksize, disk } = params(value)?;
                match name {
                    "mean" => Self::Mean { ksize, disk },
                    "median" => Self::Median { ksize, disk },
                    "minimum" => Self::Minimum { ksize, disk },
                    _ => Self::Maximum { ksize, disk },
                }
            }
            "convolution" => {
                let p: KernelParams = params(value)?;
                for &k in &p.kernel {
                    finite("kernel value", k)?;
                }
                Self::Convolution {
                    kernel: p.kernel,
                    normalize: p.normalize,
                    alpha: p.alpha,
                    abs: p.abs,
                    delta: finite("delta", p.delta)?,
                }
            }
            "gamma" => {
                let p: GammaParams = params(value)?;
                Self::Gamma {
                    gamma: finite("gamma", p.gamma)?,
                }
            }
            "pixelate" => {
                let p: PixelateParams = params(value)?;
                Self::Pixelate { size: p.size }
            }
            "sobel" | "invert" | "srgb_to_linear" | "linear_to_srgb" | "copy" => {
                no_params(name, &value)?;
                match name {
                    "sobel" => Self::Sobel,
                    "invert" => Self::Invert,
                    "srgb_to_linear" => Self::SrgbToLinear,
                    "linear_to_srgb" => Self::LinearToSrgb,
                    _ => Self::Copy,
                }
            }
            other => return Err(OpsError::UnknownFilter(other.to_string())),
        };
        Ok(cfg)
    }

    /// Instantiates the filter.
    pub fn build(&self) -> Box<dyn Filter> {
        match self.clone() {
            Self::Resize {
                width,
                height,
                resampling,
            } => Box::new(Resize::new(width, height, resampling)),
            Self::ResizeToFit {
                width,
                height,
                resampling,
            } => Box::new(ResizeToFit::new(width, height, resampling)),
            Self::ResizeToFill {
                width,
                height,
                resampling,
                anchor,
            } => Box::new(ResizeToFill::new(width, height, resampling, anchor)),
            Self::Crop { rect } => Box::new(Crop::new(rect)),
            Self::CropToSize {
                width,
                height,
                anchor,
            } => Box::new(CropToSize::new(width, height, anchor)),
            Self::Rotate {
                angle,
                background,
                interpolation,
            } => Box::new(Rotate::new(angle, background, interpolation)),
            Self::Transform(t) => Box::new(t),
            Self::GaussianBlur { sigma } => Box::new(GaussianBlur::new(sigma)),
            Self::UnsharpMask {
                sigma,
                amount,
                threshold,
            } => Box::new(UnsharpMask::new(sigma, amount, threshold)),
            Self::Mean { ksize, disk } => Box::new(Mean::new(ksize, disk)),
            Self::Median { ksize, disk } => Box::new(RankFilter::median(ksize, disk)),
            Self::Minimum { ksize, disk } => Box::new(RankFilter::minimum(ksize, disk)),
            Self::Maximum { ksize, disk } => Box::new(RankFilter::maximum(ksize, disk)),
            Self::Sobel => Box::new(Sobel),
            Self::Convolution {
                kernel,
                normalize,
                alpha,
                abs,
                delta,
            } => Box::new(Convolution::new(kernel, normalize, alpha, abs, delta)),
            Self::Invert => Box::new(ColorFunc::invert()),
            Self::Gamma { gamma } => Box::new(ColorFunc::gamma(gamma)),
            Self::SrgbToLinear => Box::new(ColorFunc::srgb_to_linear()),
            Self::LinearToSrgb => Box::new(ColorFunc::linear_to_srgb()),
            Self::Pixelate { size } => Box::new(Pixelate::new(size)),
            Self::Copy => Box::new(CopyImage),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPipelineConfig {
    parallelization: Option<bool>,
    filters: Option<Vec<Value>>,
}

/// A parsed pipeline description.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Run pixel loops in parallel. Default: `true`.
    pub parallelization: bool,
    /// Filters in application order.
    pub filters: Vec<FilterConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallelization: true,
            filters: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Loads a description from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> OpsResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parses a description from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> OpsResult<Self> {
        let raw: RawPipelineConfig = serde_yaml::from_str(yaml)?;
        let filters = raw
            .filters
            .unwrap_or_default()
            .into_iter()
            .map(FilterConfig::from_value)
            .collect::<OpsResult<Vec<_>>>()?;
        debug!(filters = filters.len(), "pipeline config parsed");
        Ok(Self {
            parallelization: raw.parallelization.unwrap_or(true),
            filters,
        })
    }

    /// Instantiates the described pipeline.
    pub fn build(&self) -> Pipeline {
        let mut pipeline = Pipeline::new(self.filters.iter().map(FilterConfig::build).collect());
        pipeline.set_parallelization(self.parallelization);
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let yaml = r#"
parallelization: false
filters:
  - resize: { width: 300, height: 0, resampling: lanczos }
  - gaussian_blur: { sigma: 1.5 }
  - rotate: { angle: 30, interpolation: cubic, background: [0, 0, 0, 1] }
  - median: { ksize: 3, disk: true }
  - crop: { min_x: 1, min_y: 2, max_x: 10, max_y: 20 }
  - rotate90
  - invert
  - gamma: { gamma: 2.2 }
"#;
        let cfg = PipelineConfig::from_yaml_str(yaml).unwrap();
        assert!(!cfg.parallelization);
        assert_eq!(
            cfg.filters,
            vec![
                FilterConfig::Resize {
                    width: 300,
                    height: 0,
                    resampling: Resampling::Lanczos
                },
                FilterConfig::GaussianBlur { sigma: 1.5 },
                FilterConfig::Rotate {
                    angle: 30.0,
                    background: Pixel::BLACK,
                    interpolation: Interpolation::Cubic
                },
                FilterConfig::Median { ksize: 3, disk: true },
                FilterConfig::Crop {
                    rect: Rect::new(1, 2, 10, 20)
                },
                FilterConfig::Transform(Transform::Rotate90),
                FilterConfig::Invert,
                FilterConfig::Gamma { gamma: 2.2 },
            ]
        );

        let p = cfg.build();
        assert_eq!(p.len(), 8);
        assert!(!p.parallelization());
    }

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert!(cfg.build().is_empty());

        let cfg = PipelineConfig::from_yaml_str("filters: [{ resize_to_fill: { width: 10, height: 10 } }, { unsharp_mask: { sigma: 1 } }]").unwrap();
        assert_eq!(
            cfg.filters[0],
            FilterConfig::ResizeToFill {
                width: 10,
                height: 10,
                resampling: Resampling::Lanczos,
                anchor: Anchor::Center
            }
        );
        assert_eq!(
            cfg.filters[1],
            FilterConfig::UnsharpMask {
                sigma: 1.0,
                amount: 1.0,
                threshold: 0.0
            }
        );
    }

    #[test]
    fn test_errors() {
        let err = PipelineConfig::from_yaml_str("filters: [sharpen]").unwrap_err();
        assert!(matches!(err, OpsError::UnknownFilter(name) if name == "sharpen"));

        let err = PipelineConfig::from_yaml_str("filters: [{ sobel: { size: 3 } }]").unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));

        let err = PipelineConfig::from_yaml_str("filters: [{ rotate: { angle: 10, background: [2, 0, 0, 1] } }]")
            .unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));

        let err = PipelineConfig::from_yaml_str("filters: [{ gaussian_blur: { sigma: .nan } }]").unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));

        let err = PipelineConfig::from_yaml_str("filters: [{ median: { ksize: 3, radius: 2 } }]").unwrap_err();
        assert!(matches!(err, OpsError::Yaml(_)));

        let err = PipelineConfig::from_yaml_str("filters: [{ mean: { ksize: 3 }, sobel: null }]").unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));

        let err = PipelineConfig::from_file("/nonexistent/filtra.yaml").unwrap_err();
        assert!(matches!(err, OpsError::Io(_)));
    }
}
