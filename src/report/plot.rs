//! Comparison chart: box plot per group with the points swarmed on top.
//!
//! K_i: The chart is drawn into an in-memory RGB buffer, then encoded once
//! with the configured DPI recorded in the PNG `pHYs` chunk.
//! B_i: Values only fit an f32 chart axis after `ValueAxis` rescales them.

use crate::models::{PlotConfig, Result, TcompareError};
use plotters::backend::RGBPixel;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Family name chart text is rendered with.
const FONT_FAMILY: &str = "sans-serif";

/// Fonts probed when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOX_COLORS: [RGBColor; 2] = [RGBColor(76, 114, 176), RGBColor(221, 132, 82)];
const POINT_COLOR: RGBColor = RGBColor(64, 64, 64);

const METERS_PER_INCH: f64 = 0.0254;

/// What the chart shows.
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub group_column: &'a str,
    pub value_column: &'a str,
    /// (label, values) in display order
    pub groups: [(&'a str, &'a [f64]); 2],
    pub p_value: f64,
}

impl ChartData<'_> {
    pub fn title(&self) -> String {
        format!("Comparison of {} between Groups", self.value_column)
    }

    pub fn subtitle(&self) -> String {
        format!("p = {:.4}", self.p_value)
    }
}

/// Maps data values onto chart coordinates as `(value - origin) / scale`.
///
/// plotters' box plots are f32-only. Shifting by a rounded origin and
/// dividing by a power of ten keeps chart coordinates small, so values far
/// beyond f32 range, or closer together than f32 resolves, still plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueAxis {
    origin: f64,
    scale: f64,
}

impl ValueAxis {
    /// Fit an axis to `values`; `None` if they are empty or their span is not finite.
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (lo, hi) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let span = hi - lo;
        if !span.is_finite() {
            return None;
        }

        let reference = if span > 0.0 { span } else { lo.abs() };
        let scale = if reference > 0.0 {
            10f64.powf(reference.log10().floor())
        } else {
            1.0
        };
        let origin = (lo / scale).floor() * scale;

        (scale.is_finite() && scale > 0.0 && origin.is_finite()).then_some(Self { origin, scale })
    }

    pub fn to_chart(&self, value: f64) -> f32 {
        ((value - self.origin) / self.scale) as f32
    }

    pub fn to_value(&self, y: f32) -> f64 {
        f64::from(y) * self.scale + self.origin
    }

    /// Tick label for chart coordinate `y`, in data units.
    pub fn label(&self, y: f32) -> String {
        let value = self.to_value(y);
        let magnitude = value.abs();
        if magnitude != 0.0 && !(1e-4..1e15).contains(&magnitude) {
            return format!("{value:.3e}");
        }

        let decimals = (1.0 - self.scale.log10().floor()).max(0.0) as usize;
        let text = format!("{value:.decimals$}");
        let text = if text.contains('.') {
            text.trim_end_matches('0').trim_end_matches('.')
        } else {
            text.as_str()
        };
        if text == "-0" { "0".to_string() } else { text.to_string() }
    }
}

/// Render the chart as a PNG at `path`.
pub fn render_plot(path: &Path, data: &ChartData<'_>, config: &PlotConfig) -> Result<()> {
    if let Some((label, _)) = data.groups.iter().find(|(_, values)| values.is_empty()) {
        return Err(TcompareError::output_write(
            path,
            format!("group '{label}' has no values to plot"),
        ));
    }
    let axis = ValueAxis::fit(data.groups.iter().flat_map(|(_, values)| values.iter().copied()))
        .ok_or_else(|| {
            TcompareError::output_write(path, "values span more than a chart axis can represent")
        })?;

    let with_text = prepare_font(config.font.as_deref());
    if !with_text {
        warn!("No usable font found; rendering chart without text (set plot.font)");
    }

    let (width, height) = config.pixel_size();
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| TcompareError::output_write(path, "image dimensions overflow"))?;
    let mut pixels = vec![0u8; len];

    draw(&mut pixels, (width, height), data, &axis, config, with_text)
        .map_err(|e| TcompareError::output_write(path, e.to_string()))?;
    write_png(path, &pixels, (width, height), config.dpi)?;

    debug!(path = %path.display(), size = ?(width, height), dpi = config.dpi, "Chart rendered");
    Ok(())
}

fn draw(
    pixels: &mut [u8],
    (width, height): (u32, u32),
    data: &ChartData<'_>,
    axis: &ValueAxis,
    config: &PlotConfig,
    with_text: bool,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    // point sizes → pixels at the configured resolution
    let pt = |points: f64| (points * f64::from(config.dpi) / 72.0).round().max(1.0) as u32;

    let root = BitMapBackend::<RGBPixel>::with_buffer_and_format(pixels, (width, height))?
        .into_drawing_area();
    root.fill(&WHITE)?;

    let title_height = if with_text { pt(40.0) } else { 0 };
    let (title_area, body) = root.split_vertically(title_height);

    if with_text {
        let style = TextStyle::from((FONT_FAMILY, pt(12.0)).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top));
        let cx = (width / 2) as i32;
        let top = pt(6.0) as i32;
        title_area.draw_text(&data.title(), &style, (cx, top))?;
        title_area.draw_text(&data.subtitle(), &style, (cx, top + pt(16.0) as i32))?;
    }

    let scaled: [Vec<f32>; 2] = data
        .groups
        .map(|(_, values)| values.iter().map(|&v| axis.to_chart(v)).collect());
    let quartiles = scaled.each_ref().map(|values| Quartiles::new(values.as_slice()));
    let (lo, hi) = chart_bounds(&scaled, &quartiles);

    let labels = data.groups.map(|(label, _)| label);
    let label_area = |points: f64| if with_text { pt(points) } else { 0 };
    let mut chart = ChartBuilder::on(&body)
        .margin(pt(8.0))
        .x_label_area_size(label_area(36.0))
        .y_label_area_size(label_area(64.0))
        .build_cartesian_2d((&labels[..]).into_segmented(), lo..hi)?;

    let x_formatter = |v: &SegmentValue<&&str>| match v {
        SegmentValue::CenterOf(label) => label.to_string(),
        _ => String::new(),
    };
    let y_formatter = |y: &f32| axis.label(*y);

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh().disable_y_mesh();
    if with_text {
        mesh.x_desc(data.group_column)
            .y_desc(data.value_column)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .label_style((FONT_FAMILY, pt(10.0)))
            .axis_desc_style((FONT_FAMILY, pt(11.0)));
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;

    // pixel layout is resolved before drawing so the chart is only borrowed once
    let radius = pt(2.0);
    let center = |i: usize, v: f32| chart.backend_coord(&(SegmentValue::CenterOf(&labels[i]), v));
    let spacing = (center(1, lo).0 - center(0, lo).0).abs().max(1);
    let box_width = (f64::from(spacing) * 0.6) as u32;
    let max_offset = (spacing / 2 - radius as i32).max(0);
    let offsets: Vec<Vec<i32>> = scaled
        .iter()
        .enumerate()
        .map(|(i, values)| {
            let ys: Vec<i32> = values.iter().map(|&v| center(i, v).1).collect();
            swarm_offsets(&ys, radius as i32 * 2, max_offset)
        })
        .collect();

    chart.draw_series(quartiles.iter().enumerate().map(|(i, q)| {
        Boxplot::new_vertical(SegmentValue::CenterOf(&labels[i]), q)
            .width(box_width)
            .whisker_width(0.5)
            .style(BOX_COLORS[i].stroke_width(pt(1.0)))
    }))?;

    let point_style = POINT_COLOR.mix(0.5).filled();
    for (i, (values, dxs)) in scaled.iter().zip(&offsets).enumerate() {
        chart.draw_series(values.iter().zip(dxs).map(|(&v, &dx)| {
            EmptyElement::at((SegmentValue::CenterOf(&labels[i]), v))
                + Circle::new((dx, 0), radius, point_style)
        }))?;
    }

    root.present()?;
    Ok(())
}

/// Chart y range covering every point and whisker, padded by 5%.
fn chart_bounds(scaled: &[Vec<f32>; 2], quartiles: &[Quartiles; 2]) -> (f32, f32) {
    let fences = quartiles.iter().flat_map(|q| {
        let [lower, _, _, _, upper] = q.values();
        [lower, upper]
    });

    let (lo, hi) = scaled
        .iter()
        .flatten()
        .copied()
        .chain(fences)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}

/// Horizontal pixel offsets for points of `diameter` at pixel heights `ys`.
///
/// Offsets are multiples of `diameter` no further than `max_offset` from the
/// center line. Points are placed in ascending pixel order, each in the slot
/// closest to the center (0, +d, -d, +2d, ...) that no placed point within
/// `diameter` vertically holds. When every slot is held the point goes to
/// the least crowded one and overlaps.
pub fn swarm_offsets(ys: &[i32], diameter: i32, max_offset: i32) -> Vec<i32> {
    if diameter <= 0 {
        return vec![0; ys.len()];
    }
    let reach = max_offset.max(0) / diameter;
    let slots: Vec<i32> = (0..=reach)
        .flat_map(|k| if k == 0 { vec![0] } else { vec![k, -k] })
        .collect();
    let index = |slot: i32| (slot + reach) as usize;

    let mut order: Vec<usize> = (0..ys.len()).collect();
    order.sort_by_key(|&i| ys[i]);

    let mut offsets = vec![0i32; ys.len()];
    // (y, slot), ascending in y
    let mut placed: Vec<(i32, i32)> = Vec::with_capacity(ys.len());
    let mut crowding = vec![0usize; slots.len()];

    for i in order {
        let y = ys[i];
        crowding.fill(0);
        // neighbours in other slots are at least one diameter away horizontally
        for &(_, slot) in placed.iter().rev().take_while(|&&(py, _)| y - py < diameter) {
            crowding[index(slot)] += 1;
        }

        let slot = slots
            .iter()
            .copied()
            .find(|&s| crowding[index(s)] == 0)
            .or_else(|| slots.iter().copied().min_by_key(|&s| crowding[index(s)]))
            .unwrap_or(0);
        offsets[i] = slot * diameter;
        placed.push((y, slot));
    }

    offsets
}

/// `dpi` as the pixels-per-meter PNG records.
pub fn pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) / METERS_PER_INCH).round() as u32
}

/// Encode RGB `pixels` as a PNG with the resolution stored in `pHYs`.
fn write_png(path: &Path, pixels: &[u8], (width, height): (u32, u32), dpi: u32) -> Result<()> {
    let file = File::create(path).map_err(|e| TcompareError::output_write(path, e))?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);
    let ppm = pixels_per_meter(dpi);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder
        .write_header()
        .map_err(|e| TcompareError::output_write(path, e))?;
    writer
        .write_image_data(pixels)
        .map_err(|e| TcompareError::output_write(path, e))?;
    writer
        .finish()
        .map_err(|e| TcompareError::output_write(path, e))
}

/// Make sure `FONT_FAMILY` resolves to a real font; `false` when none does.
fn prepare_font(configured: Option<&Path>) -> bool {
    static SYSTEM_FONT: OnceLock<bool> = OnceLock::new();

    if let Some(path) = configured {
        match register_font_file(path) {
            Ok(()) => return true,
            Err(e) => warn!(path = %path.display(), error = %e, "Configured font unusable"),
        }
    }

    *SYSTEM_FONT.get_or_init(|| {
        SYSTEM_FONTS
            .iter()
            .map(Path::new)
            .filter(|p| p.is_file())
            .any(|p| match register_font_file(p) {
                Ok(()) => {
                    debug!(path = %p.display(), "Registered chart font");
                    true
                }
                Err(e) => {
                    debug!(path = %p.display(), error = %e, "Skipping font");
                    false
                }
            })
    })
}

fn register_font_file(path: &Path) -> std::result::Result<(), String> {
    let bytes = fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    // registered fonts must outlive every chart
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| format!("{} is not a usable TrueType/OpenType font", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn chart<'a>(control: &'a [f64], treatment: &'a [f64]) -> ChartData<'a> {
        ChartData {
            group_column: "Group",
            value_column: "Value",
            groups: [("Control", control), ("Treatment", treatment)],
            p_value: 0.008,
        }
    }

    fn small() -> PlotConfig {
        PlotConfig {
            dpi: 30,
            ..Default::default()
        }
    }

    #[test]
    fn test_swarm_spreads_ties() {
        let offsets = swarm_offsets(&[100, 100, 100], 10, 100);
        assert_eq!(offsets, vec![0, 10, -10]);
    }

    #[test]
    fn test_swarm_keeps_distant_points_centered() {
        let offsets = swarm_offsets(&[300, 100, 200], 10, 100);
        assert_eq!(offsets, vec![0, 0, 0]);
    }

    #[test]
    fn test_swarm_no_overlap() {
        let ys = [50, 52, 55, 51, 49, 80, 53];
        let d = 8;
        let offsets = swarm_offsets(&ys, d, 1000);
        for i in 0..ys.len() {
            for j in (i + 1)..ys.len() {
                let dx = offsets[i] - offsets[j];
                let dy = ys[i] - ys[j];
                assert!(dx * dx + dy * dy >= d * d, "points {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn test_swarm_full_slots_overlap_evenly() {
        // three slots, six tied points
        let offsets = swarm_offsets(&[40; 6], 10, 10);
        for slot in [-10, 0, 10] {
            assert_eq!(offsets.iter().filter(|&&dx| dx == slot).count(), 2);
        }
    }

    #[test]
    fn test_swarm_many_ties_stay_in_segment() {
        let ys = vec![900; 2000];
        let start = Instant::now();
        let offsets = swarm_offsets(&ys, 16, 400);
        assert!(start.elapsed() < Duration::from_secs(5));

        assert_eq!(offsets.len(), 2000);
        assert!(offsets.iter().all(|dx| dx.abs() <= 400));
        // 25 slots each side of the center
        assert_eq!(offsets.iter().max(), Some(&400));
        assert_eq!(offsets.iter().min(), Some(&-400));
    }

    #[test]
    fn test_swarm_zero_width_segment() {
        assert_eq!(swarm_offsets(&[5, 5], 10, 0), vec![0, 0]);
        assert_eq!(swarm_offsets(&[5, 5], 0, 100), vec![0, 0]);
    }

    #[test]
    fn test_titles() {
        let data = ChartData {
            p_value: 0.008049893,
            ..chart(&[1.0, 2.0], &[3.0, 4.0])
        };
        assert_eq!(data.title(), "Comparison of Value between Groups");
        assert_eq!(data.subtitle(), "p = 0.0080");
    }

    #[test]
    fn test_axis_keeps_close_large_values_apart() {
        let values: Vec<f64> = (0..5).map(|k| 1e8 + f64::from(k)).collect();
        let axis = ValueAxis::fit(values.iter().copied()).unwrap();

        let ys: Vec<f32> = values.iter().map(|&v| axis.to_chart(v)).collect();
        assert_eq!(ys, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(axis.to_value(ys[3]), 1e8 + 3.0);
    }

    #[test]
    fn test_axis_beyond_f32_range() {
        let axis = ValueAxis::fit([1e39, 6e39]).unwrap();
        assert_eq!(axis.to_chart(1e39), 0.0);
        assert_eq!(axis.to_chart(6e39), 5.0);
        assert_eq!(axis.label(5.0), "6.000e39");
    }

    #[test]
    fn test_axis_rejects_unrepresentable_span() {
        assert_eq!(ValueAxis::fit([-1e308, 1e308]), None);
        assert_eq!(ValueAxis::fit(std::iter::empty()), None);
    }

    #[test]
    fn test_axis_labels() {
        let axis = ValueAxis::fit([10.0, 16.0]).unwrap();
        assert_eq!(axis.label(1.0), "11");
        assert_eq!(axis.label(0.5), "10.5");

        let flat = ValueAxis::fit([5.0, 5.0]).unwrap();
        assert_eq!(flat.to_chart(5.0), 0.0);
        assert_eq!(flat.label(-1.0), "4");
    }

    #[test]
    fn test_render_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plot.png");

        render_plot(&path, &chart(&[10.0, 12.0, 11.0], &[15.0, 14.0, 16.0]), &small()).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_png_records_dpi() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plot.png");

        render_plot(&path, &chart(&[10.0, 12.0, 11.0], &[15.0, 14.0, 16.0]), &small()).unwrap();

        let reader = png::Decoder::new(File::open(&path).unwrap()).read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), small().pixel_size());
        let dims = info.pixel_dims.unwrap();
        assert_eq!(dims.unit, png::Unit::Meter);
        assert_eq!(dims.xppu, pixels_per_meter(30));
        assert_eq!(dims.yppu, dims.xppu);
        assert_eq!(pixels_per_meter(300), 11811);
    }

    #[test]
    fn test_render_huge_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plot.png");

        render_plot(&path, &chart(&[1e39, 2e39, 3e39], &[4e39, 5e39, 6e39]), &small()).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_render_unrepresentable_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plot.png");

        let err = render_plot(&path, &chart(&[-1e308, 0.0], &[0.0, 1e308]), &small()).unwrap_err();
        assert!(matches!(err, TcompareError::OutputWrite { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_render_empty_group() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plot.png");

        let err = render_plot(&path, &chart(&[1.0, 2.0], &[]), &small()).unwrap_err();
        assert!(matches!(err, TcompareError::OutputWrite { .. }));
    }

    #[test]
    fn test_bad_font_file_rejected() {
        let dir = TempDir::new().unwrap();
        let font = dir.path().join("font.ttf");
        fs::write(&font, b"not a font").unwrap();

        let err = register_font_file(&font).unwrap_err();
        assert!(err.contains("font.ttf"), "{err}");
        assert!(register_font_file(&dir.path().join("missing.ttf")).is_err());
    }

    #[test]
    fn test_bad_configured_font_falls_back() {
        let dir = TempDir::new().unwrap();
        let font = dir.path().join("font.ttf");
        fs::write(&font, b"not a font").unwrap();
        let path = dir.path().join("plot.png");

        // same outcome as with no font configured
        assert_eq!(prepare_font(Some(font.as_path())), prepare_font(None));

        let config = PlotConfig {
            font: Some(font),
            ..small()
        };
        render_plot(&path, &chart(&[10.0, 12.0, 11.0], &[15.0, 14.0, 16.0]), &config).unwrap();
        assert!(path.is_file());
    }
}
