use crate::{
    comparison::{ComparisonMatrix, SmoothedSeries},
    config::Palette,
    data::{dataset::ExperimentData, Application, InfrastructureCategory, TimeTable},
    metrics::SECONDS_PER_HOUR,
};
use anyhow::{anyhow, Context};
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use std::{fs, path::Path};
use textplots::{Chart, Plot, Shape};
use tracing::{debug, info};

const TIMELINE_SIZE: (u32, u32) = (1000, 500);
const BARPLOT_SIZE: (u32, u32) = (900, 550);
const FONT: &str = "sans-serif";

/// Line colours for the comparison chart, one per experiment.
const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(0x63, 0x6e, 0xfa),
    RGBColor(0xef, 0x55, 0x3b),
    RGBColor(0x00, 0xcc, 0x96),
    RGBColor(0xab, 0x63, 0xfa),
    RGBColor(0xff, 0xa1, 0x5a),
    RGBColor(0x19, 0xd3, 0xf3),
];

/// Parses a `#rrggbb` colour.
pub fn parse_hex(hex: &str) -> anyhow::Result<RGBColor> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(anyhow!("Invalid colour {}, expected #rrggbb", hex));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).context(format!("Invalid colour {}", hex))
    };
    Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Palette with every colour parsed.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub cloud: RGBColor,
    pub fog: RGBColor,
    pub fog_static: RGBColor,
    pub wan: RGBColor,
    pub wifi: RGBColor,
    pub cctv: RGBColor,
    pub stm: RGBColor,
}
impl Colors {
    pub fn try_from_palette(palette: &Palette) -> anyhow::Result<Self> {
        Ok(Colors {
            cloud: parse_hex(&palette.cloud)?,
            fog: parse_hex(&palette.fog)?,
            fog_static: parse_hex(&palette.fog_static)?,
            wan: parse_hex(&palette.wan)?,
            wifi: parse_hex(&palette.wifi)?,
            cctv: parse_hex(&palette.cctv)?,
            stm: parse_hex(&palette.stm)?,
        })
    }

    pub fn application(&self, app: Application) -> RGBColor {
        match app {
            Application::Cctv => self.cctv,
            Application::Stm => self.stm,
        }
    }

    /// Bar colour of a category. Both fog categories share the fog hue, static is darker.
    pub fn category(&self, category: InfrastructureCategory) -> RGBColor {
        match category {
            InfrastructureCategory::Cloud => self.cloud,
            InfrastructureCategory::FogDynamic => self.fog,
            InfrastructureCategory::FogStatic => self.fog_static,
            InfrastructureCategory::Wan => self.wan,
            InfrastructureCategory::Wifi => self.wifi,
        }
    }
}

/// A single line of a timeline chart.
#[derive(Clone)]
pub struct Trace {
    pub name: String,
    pub values: Vec<f64>,
    pub style: ShapeStyle,
    pub dotted: bool,
}
impl Trace {
    pub fn solid(name: &str, values: Vec<f64>, color: RGBColor) -> Self {
        Trace {
            name: name.to_string(),
            values,
            style: color.stroke_width(1),
            dotted: false,
        }
    }

    /// Dotted line for the static share of a consumer.
    pub fn dotted(name: &str, values: Vec<f64>, color: RGBColor) -> Self {
        Trace {
            dotted: true,
            ..Trace::solid(name, values, color)
        }
    }
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

/// Traces of the infrastructure chart. Fog lines are left out of experiments without fog nodes.
pub fn infrastructure_traces(table: &TimeTable, colors: &Colors) -> anyhow::Result<Vec<Trace>> {
    let fog_static = table.column(InfrastructureCategory::FogStatic.column())?;
    let fog_dynamic = table.column(InfrastructureCategory::FogDynamic.column())?;
    let fog = add(fog_static, fog_dynamic);

    let mut traces = vec![Trace::solid(
        "Cloud",
        table.column(InfrastructureCategory::Cloud.column())?.to_vec(),
        colors.cloud,
    )];
    if fog.iter().sum::<f64>() > 0.0 {
        traces.push(Trace::solid("Fog", fog, colors.fog));
        traces.push(Trace::dotted("Fog static", fog_static.to_vec(), colors.fog));
    } else {
        debug!("No fog consumption, leaving fog traces out");
    }
    traces.push(Trace::solid(
        "WAN",
        table.column(InfrastructureCategory::Wan.column())?.to_vec(),
        colors.wan,
    ));
    traces.push(Trace::solid(
        "WiFi",
        table.column(InfrastructureCategory::Wifi.column())?.to_vec(),
        colors.wifi,
    ));

    Ok(traces)
}

fn application_total(table: &TimeTable, app: Application) -> anyhow::Result<Vec<f64>> {
    Ok(add(
        table.column(app.static_column())?,
        table.column(app.dynamic_column())?,
    ))
}

/// Total consumption of both applications.
pub fn applications_traces(table: &TimeTable, colors: &Colors) -> anyhow::Result<Vec<Trace>> {
    Application::ALL
        .iter()
        .map(|app| -> anyhow::Result<Trace> {
            Ok(Trace::solid(
                app.label(),
                application_total(table, *app)?,
                colors.application(*app),
            ))
        })
        .collect()
}

/// Total consumption of one application next to its static share.
pub fn application_traces(
    table: &TimeTable,
    app: Application,
    colors: &Colors,
) -> anyhow::Result<Vec<Trace>> {
    let color = colors.application(app);
    Ok(vec![
        Trace::solid(app.label(), application_total(table, app)?, color),
        Trace::dotted(
            &format!("{} (static)", app.label()),
            table.column(app.static_column())?.to_vec(),
            color,
        ),
    ])
}

fn hour_label(hours: &f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Draws traces over a time index given in seconds. The x axis is labelled in hours of the day.
pub fn draw_timeline(path: &Path, time: &[f64], traces: &[Trace], y_desc: &str) -> anyhow::Result<()> {
    let hours = time.iter().map(|t| t / SECONDS_PER_HOUR).collect::<Vec<_>>();
    // round up so the last tick lands on a full hour
    let x_max = hours.last().copied().unwrap_or(0.0).ceil().max(1.0);
    let y_max = traces
        .iter()
        .flat_map(|trace| trace.values.iter())
        .copied()
        .fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let root = SVGBackend::new(path, TIMELINE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc(y_desc)
        .x_labels(13)
        .x_label_formatter(&hour_label)
        .light_line_style(&WHITE)
        .draw()?;

    for trace in traces {
        let style = trace.style;
        let points = hours.iter().copied().zip(trace.values.iter().copied());
        let annotation = if trace.dotted {
            chart.draw_series(DashedLineSeries::new(points, 2, 3, style))?
        } else {
            chart.draw_series(LineSeries::new(points, style))?
        };
        annotation
            .label(trace.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
        .context(format!("Unable to write chart {}", path.display()))?;
    Ok(())
}

/// Writes the four detail charts of one experiment into `dir`.
pub fn write_experiment_charts(
    dir: &Path,
    data: &ExperimentData,
    colors: &Colors,
) -> anyhow::Result<()> {
    fs::create_dir_all(dir).context(format!("Unable to create {}", dir.display()))?;

    let infrastructure = &data.infrastructure;
    draw_timeline(
        &dir.join("infrastructure.svg"),
        infrastructure.index(),
        &infrastructure_traces(infrastructure, colors)?,
        "Watt",
    )?;

    let applications = &data.applications;
    draw_timeline(
        &dir.join("applications.svg"),
        applications.index(),
        &applications_traces(applications, colors)?,
        "Watt",
    )?;

    for app in Application::ALL {
        draw_timeline(
            &dir.join(format!("application_{}.svg", app.key())),
            applications.index(),
            &application_traces(applications, app, colors)?,
            "Watt",
        )?;
    }

    debug!("Wrote experiment charts to {}", dir.display());
    Ok(())
}

/// Stacking order of the bar chart, bottom to top.
pub const BAR_STACK: [InfrastructureCategory; 5] = [
    InfrastructureCategory::FogStatic,
    InfrastructureCategory::FogDynamic,
    InfrastructureCategory::Cloud,
    InfrastructureCategory::Wifi,
    InfrastructureCategory::Wan,
];

/// Stacked bar chart of the energy each experiment consumed, with the grand total on top.
pub fn write_barplot(path: &Path, matrix: &ComparisonMatrix, colors: &Colors) -> anyhow::Result<()> {
    let n = matrix.len();
    // leave room above the tallest bar for its label
    let y_max = (matrix.max_total() * 1.15).max(1.0);

    let root = SVGBackend::new(path, BARPLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0.0..y_max)?;

    let titles = &matrix.titles;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&|value: &SegmentValue<usize>| match value {
            SegmentValue::CenterOf(i) => titles.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("kWh consumed in 24h")
        .draw()?;

    let mut base = vec![0_f64; n];
    for category in BAR_STACK {
        let color = colors.category(category);
        let heights = matrix.series(category);
        let bars = base
            .iter()
            .zip(heights.iter())
            .enumerate()
            .map(|(i, (bottom, height))| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), *bottom),
                        (SegmentValue::Exact(i + 1), bottom + height),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 12, 12);
                bar
            })
            .collect::<Vec<_>>();

        chart
            .draw_series(bars)?
            .label(category.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        for (b, height) in base.iter_mut().zip(heights.iter()) {
            *b += height;
        }
    }

    let label_style = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    for (i, total) in matrix.total.iter().enumerate() {
        chart.plotting_area().draw(&Text::new(
            format!("{:.2}", total),
            (SegmentValue::CenterOf(i), *total),
            label_style.clone(),
        ))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
        .context(format!("Unable to write chart {}", path.display()))?;
    Ok(())
}

/// Timeline with one smoothed line per experiment.
pub fn write_comparison_chart(path: &Path, series: &[SmoothedSeries]) -> anyhow::Result<()> {
    let time = series
        .iter()
        .max_by_key(|s| s.time.len())
        .map(|s| s.time.as_slice())
        .unwrap_or_default();

    let traces = series
        .iter()
        .zip(SERIES_COLORS.iter().cycle())
        .map(|(s, color)| Trace::solid(&s.title, s.values.clone(), *color))
        .collect::<Vec<_>>();

    draw_timeline(path, time, &traces, "Watt")
}

/// Prints the smoothed series as terminal charts, one below the other on the same time scale.
pub fn preview_comparison(series: &[SmoothedSeries]) {
    let x_max = series
        .iter()
        .filter_map(|s| s.time.last())
        .copied()
        .fold(1.0, f64::max)
        / SECONDS_PER_HOUR;

    for s in series {
        let points = preview_points(s);
        println!("\n{} (W over hours)", s.title);
        Chart::new(180, 60, 0.0, x_max as f32)
            .lineplot(&Shape::Lines(&points))
            .display();
    }
}

const PREVIEW_POINTS: usize = 500;

/// Thins a series out to a few hundred points, time in hours.
fn preview_points(series: &SmoothedSeries) -> Vec<(f32, f32)> {
    let step = (series.values.len() / PREVIEW_POINTS).max(1);
    series
        .time
        .iter()
        .zip(series.values.iter())
        .step_by(step)
        .map(|(t, v)| ((t / SECONDS_PER_HOUR) as f32, *v as f32))
        .collect()
}

/// Writes every chart: per-experiment details, the bar chart and the comparison chart.
pub fn write_all(
    results_dir: &Path,
    experiments: &[(&str, &ExperimentData)],
    matrix: &ComparisonMatrix,
    comparison: &[SmoothedSeries],
    comparison_output: &str,
    colors: &Colors,
) -> anyhow::Result<()> {
    let barplot = results_dir.join("barplot.svg");
    info!("Creating barplot {}", barplot.display());
    write_barplot(&barplot, matrix, colors)?;

    for (experiment_id, data) in experiments {
        info!("Generating plots for experiment {}", experiment_id);
        write_experiment_charts(&results_dir.join(experiment_id).join("plots"), data, colors)?;
    }

    let comparison_path = results_dir.join(format!("{}.svg", comparison_output));
    info!(
        "Creating comparison plot between {}",
        comparison
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>()
            .join(" and ")
    );
    write_comparison_chart(&comparison_path, comparison)
}
