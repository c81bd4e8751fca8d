// src/imaging/filter.rs

//! Resize filter name resolution.
//!
//! Callers pick a kernel by name ("lanczos", "catrom", ...). Names come in
//! over config files and script bindings, so resolution never fails: anything
//! unrecognized, including the empty string, falls back to [`FilterKind::Lanczos`].
//!
//! The extended set (jinc, sinc, the lanczos variants and friends) is gated
//! behind the `extended-filters` feature, which is on by default.

use std::fmt;

use image::imageops::FilterType;
use tracing::debug;

/// Resize kernel selected for a transform job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Point,
    Box,
    Triangle,
    Hermite,
    Hanning,
    Hamming,
    Blackman,
    Gaussian,
    Quadratic,
    Cubic,
    Catrom,
    Mitchell,
    Lanczos,
    Kaiser,
    Welsh,
    Parzen,
    Bohman,
    Bartlett,
    Lagrange,
    #[cfg(feature = "extended-filters")]
    Jinc,
    #[cfg(feature = "extended-filters")]
    Sinc,
    #[cfg(feature = "extended-filters")]
    SincFast,
    #[cfg(feature = "extended-filters")]
    LanczosSharp,
    #[cfg(feature = "extended-filters")]
    Lanczos2,
    #[cfg(feature = "extended-filters")]
    Lanczos2Sharp,
    #[cfg(feature = "extended-filters")]
    Robidoux,
    #[cfg(feature = "extended-filters")]
    RobidouxSharp,
    #[cfg(feature = "extended-filters")]
    Cosine,
    #[cfg(feature = "extended-filters")]
    Spline,
    #[cfg(feature = "extended-filters")]
    LanczosRadius,
}

impl FilterKind {
    /// Resolves a filter name. Unknown names, including the empty string,
    /// fall back to lanczos; resolution never fails.
    pub fn resolve(name: &str) -> Self {
        match name {
            "point" => Self::Point,
            "box" => Self::Box,
            "triangle" => Self::Triangle,
            "hermite" => Self::Hermite,
            "hanning" => Self::Hanning,
            "hamming" => Self::Hamming,
            "blackman" => Self::Blackman,
            "gaussian" => Self::Gaussian,
            "quadratic" => Self::Quadratic,
            "cubic" => Self::Cubic,
            "catrom" => Self::Catrom,
            "mitchell" => Self::Mitchell,
            "lanczos" => Self::Lanczos,
            "kaiser" => Self::Kaiser,
            "welsh" => Self::Welsh,
            "parzen" => Self::Parzen,
            "bohman" => Self::Bohman,
            "bartlett" => Self::Bartlett,
            "lagrange" => Self::Lagrange,
            #[cfg(feature = "extended-filters")]
            "jinc" => Self::Jinc,
            #[cfg(feature = "extended-filters")]
            "sinc" => Self::Sinc,
            #[cfg(feature = "extended-filters")]
            "sincfast" => Self::SincFast,
            #[cfg(feature = "extended-filters")]
            "lanczossharp" => Self::LanczosSharp,
            #[cfg(feature = "extended-filters")]
            "lanczos2" => Self::Lanczos2,
            #[cfg(feature = "extended-filters")]
            "lanczos2sharp" => Self::Lanczos2Sharp,
            #[cfg(feature = "extended-filters")]
            "robidoux" => Self::Robidoux,
            #[cfg(feature = "extended-filters")]
            "robidouxsharp" => Self::RobidouxSharp,
            #[cfg(feature = "extended-filters")]
            "cosine" => Self::Cosine,
            #[cfg(feature = "extended-filters")]
            "spline" => Self::Spline,
            #[cfg(feature = "extended-filters")]
            "lanczosradius" => Self::LanczosRadius,
            other => {
                if !other.is_empty() {
                    debug!("Unknown resize filter '{}', using lanczos", other);
                }
                Self::Lanczos
            }
        }
    }

    /// Canonical name, as accepted by [`FilterKind::resolve`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Box => "box",
            Self::Triangle => "triangle",
            Self::Hermite => "hermite",
            Self::Hanning => "hanning",
            Self::Hamming => "hamming",
            Self::Blackman => "blackman",
            Self::Gaussian => "gaussian",
            Self::Quadratic => "quadratic",
            Self::Cubic => "cubic",
            Self::Catrom => "catrom",
            Self::Mitchell => "mitchell",
            Self::Lanczos => "lanczos",
            Self::Kaiser => "kaiser",
            Self::Welsh => "welsh",
            Self::Parzen => "parzen",
            Self::Bohman => "bohman",
            Self::Bartlett => "bartlett",
            Self::Lagrange => "lagrange",
            #[cfg(feature = "extended-filters")]
            Self::Jinc => "jinc",
            #[cfg(feature = "extended-filters")]
            Self::Sinc => "sinc",
            #[cfg(feature = "extended-filters")]
            Self::SincFast => "sincfast",
            #[cfg(feature = "extended-filters")]
            Self::LanczosSharp => "lanczossharp",
            #[cfg(feature = "extended-filters")]
            Self::Lanczos2 => "lanczos2",
            #[cfg(feature = "extended-filters")]
            Self::Lanczos2Sharp => "lanczos2sharp",
            #[cfg(feature = "extended-filters")]
            Self::Robidoux => "robidoux",
            #[cfg(feature = "extended-filters")]
            Self::RobidouxSharp => "robidouxsharp",
            #[cfg(feature = "extended-filters")]
            Self::Cosine => "cosine",
            #[cfg(feature = "extended-filters")]
            Self::Spline => "spline",
            #[cfg(feature = "extended-filters")]
            Self::LanczosRadius => "lanczosradius",
        }
    }

    /// Nearest kernel the `image` crate ships. Interpolating cubics land on
    /// Catmull-Rom, smoothing kernels on Gaussian, every windowed sinc on
    /// Lanczos3.
    pub fn sampler(self) -> FilterType {
        match self {
            Self::Point | Self::Box => FilterType::Nearest,
            Self::Triangle | Self::Bartlett => FilterType::Triangle,
            Self::Hermite | Self::Catrom | Self::Mitchell | Self::Lagrange => {
                FilterType::CatmullRom
            }
            Self::Gaussian | Self::Quadratic | Self::Cubic => FilterType::Gaussian,
            Self::Hanning
            | Self::Hamming
            | Self::Blackman
            | Self::Kaiser
            | Self::Welsh
            | Self::Parzen
            | Self::Bohman
            | Self::Lanczos => FilterType::Lanczos3,
            #[cfg(feature = "extended-filters")]
            Self::Robidoux | Self::RobidouxSharp => FilterType::CatmullRom,
            #[cfg(feature = "extended-filters")]
            Self::Spline => FilterType::Gaussian,
            #[cfg(feature = "extended-filters")]
            Self::Jinc
            | Self::Sinc
            | Self::SincFast
            | Self::LanczosSharp
            | Self::Lanczos2
            | Self::Lanczos2Sharp
            | Self::Cosine
            | Self::LanczosRadius => FilterType::Lanczos3,
        }
    }
}

impl Default for FilterKind {
    fn default() -> Self {
        Self::Lanczos
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
