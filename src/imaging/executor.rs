// src/imaging/executor.rs

//! The blocking transform pipeline: decode, autofit, resize, encode, then
//! write to disk or hand the bytes back. Everything here is synchronous and
//! runs on a worker thread; the pool is the only caller.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

use crate::imaging::error::{TransformError, TransformResult};
use crate::imaging::filter::FilterKind;
use crate::imaging::job::{Source, TransformJob, TransformOutput};

/// Upper bound on the pixel count of a resize target. Keeps a bad width or
/// height from attempting a multi-gigabyte allocation on the worker.
const MAX_TARGET_PIXELS: u64 = 1 << 31;

/// Runs one job start to finish. Never panics on bad input; every failure
/// maps to the [`TransformError`] variant for the stage that hit it.
pub(crate) fn run_job(job: TransformJob) -> TransformResult<TransformOutput> {
    let TransformJob {
        source,
        target,
        width,
        height,
        format,
        filter,
        quality,
    } = job;

    debug!(
        "Starting transform: {:?} -> {}x{}, filter={}",
        source, width, height, filter
    );

    let (mut image, sniffed) = decode(source)?;
    let (want_w, want_h) = autofit((image.width(), image.height()), (width, height));

    if want_w > 0 && want_h > 0 {
        image = resize(image, want_w, want_h, filter)?;
    }

    let format = resolve_format(format.as_deref(), target.as_deref(), sniffed)?;
    let (out_w, out_h) = (image.width(), image.height());

    match target {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| TransformError::directory(parent, e))?;
            }
            let data = encode(&image, format, quality)?;
            fs::write(&path, &data).map_err(|e| {
                TransformError::encode(format!("cannot write {}: {e}", path.display()))
            })?;
            debug!("Wrote {}x{} image to {}", out_w, out_h, path.display());
            Ok(TransformOutput::Written {
                path,
                width: out_w,
                height: out_h,
            })
        }
        None => {
            let data = encode(&image, format, quality)?;
            debug!("Returning {}x{} image as a {} byte blob", out_w, out_h, data.len());
            Ok(TransformOutput::Blob {
                data,
                width: out_w,
                height: out_h,
            })
        }
    }
}

/// Decodes the source and remembers its container format, which becomes the
/// output format when neither the options nor the target extension pick one.
fn decode(source: Source) -> TransformResult<(DynamicImage, Option<ImageFormat>)> {
    match source {
        Source::Bytes(data) => {
            let format = image::guess_format(&data).ok();
            let image = image::load_from_memory(&data)
                .map_err(|e| TransformError::decode(format!("cannot decode source blob: {e}")))?;
            Ok((image, format))
        }
        Source::Path(path) => {
            let reader = ImageReader::open(&path)
                .map_err(|e| {
                    TransformError::decode(format!("cannot open {}: {e}", path.display()))
                })?
                .with_guessed_format()
                .map_err(|e| {
                    TransformError::decode(format!("cannot probe {}: {e}", path.display()))
                })?;
            let format = reader.format();
            let image = reader.decode().map_err(|e| {
                TransformError::decode(format!("cannot decode {}: {e}", path.display()))
            })?;
            Ok((image, format))
        }
    }
}

/// Fills in a missing target dimension from the source aspect ratio. Both
/// dimensions zero means no resize, so the pair comes back unchanged.
fn autofit(source: (u32, u32), want: (u32, u32)) -> (u32, u32) {
    let (source_w, source_h) = source;
    let (mut w, mut h) = want;
    if w == 0 || h == 0 {
        let aspect = f64::from(source_w) / f64::from(source_h);
        if h == 0 && w != 0 {
            h = (f64::from(w) / aspect).round() as u32;
        } else if w == 0 && h != 0 {
            w = (f64::from(h) * aspect).round() as u32;
        }
    }
    (w, h)
}

/// Scales to exactly `width` x `height`, distorting if the aspect ratio
/// differs. Matches what callers asked for, not what looks best.
fn resize(
    image: DynamicImage,
    width: u32,
    height: u32,
    filter: FilterKind,
) -> TransformResult<DynamicImage> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_TARGET_PIXELS {
        return Err(TransformError::resize(format!(
            "target {width}x{height} exceeds the pixel limit"
        )));
    }
    Ok(image.resize_exact(width, height, filter.sampler()))
}

/// Output format precedence: explicit option, then the target extension,
/// then whatever the source was decoded from.
fn resolve_format(
    explicit: Option<&str>,
    target: Option<&Path>,
    sniffed: Option<ImageFormat>,
) -> TransformResult<ImageFormat> {
    if let Some(name) = explicit.filter(|name| !name.is_empty()) {
        return ImageFormat::from_extension(name)
            .ok_or_else(|| TransformError::encode(format!("unknown output format {name:?}")));
    }
    if let Some(format) = target
        .and_then(Path::extension)
        .and_then(ImageFormat::from_extension)
    {
        return Ok(format);
    }
    sniffed.ok_or_else(|| TransformError::encode("cannot determine output format"))
}

/// Encodes into memory. JPEG honors a quality of 1..=100 and flattens any
/// alpha channel first; anything else goes through the codec defaults.
fn encode(image: &DynamicImage, format: ImageFormat, quality: u32) -> TransformResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    if format == ImageFormat::Jpeg {
        let rgb = image.to_rgb8();
        if (1..=100).contains(&quality) {
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality as u8))
        } else {
            rgb.write_with_encoder(JpegEncoder::new(&mut out))
        }
        .map_err(|e| TransformError::encode(format!("jpeg encode failed: {e}")))?;
    } else {
        image
            .write_to(&mut out, format)
            .map_err(|e| TransformError::encode(format!("{format:?} encode failed: {e}")))?;
    }
    let data = out.into_inner();
    if data.is_empty() {
        return Err(TransformError::encode("encoder produced no output"));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn autofit_derives_the_missing_dimension() {
        assert_eq!(autofit((800, 600), (400, 0)), (400, 300));
        assert_eq!(autofit((800, 600), (0, 300)), (400, 300));
    }

    #[test]
    fn autofit_leaves_explicit_and_absent_pairs_alone() {
        assert_eq!(autofit((800, 600), (0, 0)), (0, 0));
        assert_eq!(autofit((800, 600), (120, 90)), (120, 90));
    }

    #[test]
    fn autofit_rounds_instead_of_truncating() {
        // 333 * 600 / 800 = 249.75
        assert_eq!(autofit((800, 600), (333, 0)), (333, 250));
    }

    #[test]
    fn autofit_derived_zero_stays_zero() {
        // 1 * 1 / 400 rounds to 0, which the both-nonzero gate then skips
        assert_eq!(autofit((400, 1), (1, 0)), (1, 0));
    }

    #[test]
    fn format_precedence_is_option_then_extension_then_source() {
        let target = Path::new("out/picture.png");
        assert_eq!(
            resolve_format(Some("jpg"), Some(target), Some(ImageFormat::Gif)).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(
            resolve_format(None, Some(target), Some(ImageFormat::Gif)).unwrap(),
            ImageFormat::Png
        );
        assert_eq!(
            resolve_format(None, None, Some(ImageFormat::Gif)).unwrap(),
            ImageFormat::Gif
        );
    }

    #[test]
    fn empty_format_option_is_ignored() {
        let target = Path::new("out/picture.png");
        assert_eq!(
            resolve_format(Some(""), Some(target), None).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn unknown_format_option_is_an_encode_error() {
        let err = resolve_format(Some("nosuchformat"), None, None).unwrap_err();
        assert!(matches!(err, TransformError::Encode(_)));
    }

    #[test]
    fn blob_job_resizes_and_reports_dimensions() {
        let job = TransformJob {
            source: Source::Bytes(sample_jpeg(800, 600)),
            target: None,
            width: 400,
            height: 0,
            format: None,
            filter: FilterKind::Lanczos,
            quality: 101,
        };
        let output = run_job(job).unwrap();
        match output {
            TransformOutput::Blob { data, width, height } => {
                assert_eq!((width, height), (400, 300));
                assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Jpeg);
            }
            other => panic!("expected a blob, got {other:?}"),
        }
    }

    #[test]
    fn zero_by_zero_keeps_source_dimensions() {
        let job = TransformJob {
            source: Source::Bytes(sample_jpeg(320, 240)),
            target: None,
            width: 0,
            height: 0,
            format: None,
            filter: FilterKind::Lanczos,
            quality: 101,
        };
        let output = run_job(job).unwrap();
        assert_eq!(output.dimensions(), (320, 240));
    }

    #[test]
    fn extreme_aspect_ratios_keep_source_dimensions() {
        // the derived height of a 400:1 strip at width 1 rounds to zero,
        // so no resize runs
        let job = TransformJob {
            source: Source::Bytes(sample_jpeg(400, 1)),
            target: None,
            width: 1,
            height: 0,
            format: None,
            filter: FilterKind::Lanczos,
            quality: 101,
        };
        let output = run_job(job).unwrap();
        assert_eq!(output.dimensions(), (400, 1));
    }

    #[test]
    fn alpha_sources_still_encode_as_jpeg() {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::new_rgba8(32, 32)
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();

        let job = TransformJob {
            source: Source::Bytes(png.into_inner()),
            target: None,
            width: 0,
            height: 0,
            format: Some("jpg".into()),
            filter: FilterKind::Lanczos,
            quality: 80,
        };
        let output = run_job(job).unwrap();
        match output {
            TransformOutput::Blob { data, .. } => {
                assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::Jpeg);
            }
            other => panic!("expected a blob, got {other:?}"),
        }
    }

    #[test]
    fn oversized_target_is_a_resize_error() {
        let job = TransformJob {
            source: Source::Bytes(sample_jpeg(16, 16)),
            target: None,
            width: 1_000_000,
            height: 1_000_000,
            format: None,
            filter: FilterKind::Point,
            quality: 101,
        };
        let err = run_job(job).unwrap_err();
        assert!(matches!(err, TransformError::Resize(_)));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let job = TransformJob {
            source: Source::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
            target: None,
            width: 0,
            height: 0,
            format: None,
            filter: FilterKind::Lanczos,
            quality: 101,
        };
        let err = run_job(job).unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)));
    }
}
