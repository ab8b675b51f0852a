use std::path::Path;

use console::Style;
use sonarlog_core::frame::LogData;
use sonarlog_core::pipeline::config::PipelineConfig;
use sonarlog_core::pipeline::PipelineReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red(),
        }
    }
}

pub fn print_log_info(path: &Path, data: &LogData) {
    let s = Styles::new();
    let h = &data.header;

    println!();
    println!("  {:<14}{}", s.label.apply_to("File"), s.path.apply_to(path.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Version"),
        s.value.apply_to(h.version)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Hardware"),
        s.value.apply_to(h.hardware_version)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Block size"),
        s.value.apply_to(h.block_size)
    );
    if let Some(t) = data.creation_time() {
        println!("  {:<14}{} (unix)", s.label.apply_to("Created"), s.value.apply_to(t));
    }
    println!();

    println!(
        "{}",
        s.header.apply_to(format!(
            "|{:>22}|{:>14}|{:>13}|{:>12}|{:>12}|",
            "Channel Type", "Frequency", "First Frame", "Last Frame", "Frames Total"
        ))
    );
    println!("{}", "-".repeat(79));
    for c in data.channel_summary() {
        let frequency = c.frequency.map(|f| f.to_string()).unwrap_or_default();
        println!(
            "|{:>22}|{:>14}|{:>13}|{:>12}|{:>12}|",
            format!("{}({})", c.channel, c.channel.id()),
            frequency,
            c.first_index,
            c.last_index,
            c.frame_count
        );
    }
    println!("{}", "-".repeat(79));
    println!("|{:>22}|{:>14}|{:>13}|{:>12}|{:>12}|", "", "", "", "", data.frames.len());
}

pub fn print_pipeline_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Sonar Log Converter"));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    match config.depth_adjust {
        Some(ref p) => println!("  {:<14}{}", s.label.apply_to("Depth adjust"), s.path.apply_to(p.display())),
        None => println!("  {:<14}{}", s.label.apply_to("Depth adjust"), s.disabled.apply_to("disabled")),
    }
    match config.depth_shift {
        Some(ref v) => println!("  {:<14}{}", s.label.apply_to("Depth shift"), s.value.apply_to(v)),
        None => println!("  {:<14}{}", s.label.apply_to("Depth shift"), s.disabled.apply_to("disabled")),
    }
    match config.generate {
        Some(ref g) => println!("  {:<14}{}", s.label.apply_to("Generate"), s.value.apply_to(g)),
        None => println!("  {:<14}{}", s.label.apply_to("Generate"), s.disabled.apply_to("disabled")),
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Flip"),
        if config.flip_sidescan {
            s.value.apply_to("SidescanComposite".to_string())
        } else {
            s.disabled.apply_to("disabled".to_string())
        }
    );

    let f = &config.filter;
    let channels = if f.channels.is_empty() {
        "all".to_string()
    } else {
        f.channels
            .iter()
            .map(|c| c.id().to_string())
            .collect::<Vec<_>>()
            .join(":")
    };
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(format!("{}..={} channels {}", f.from, f.to, channels))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Anonymize"),
        match config.anonymize {
            Some(ref a) => s.value.apply_to(match a.seed {
                Some(seed) => format!("seed {seed}"),
                None => "random".to_string(),
            }),
            None => s.disabled.apply_to("disabled".to_string()),
        }
    );

    if config.output.formats.is_empty() {
        println!("  {:<14}{}", s.label.apply_to("Output"), s.disabled.apply_to("none"));
    } else {
        for format in &config.output.formats {
            println!(
                "  {:<14}{}",
                s.label.apply_to("Output"),
                s.path.apply_to(config.output.path_for(*format).display())
            );
        }
    }
    println!();
}

pub fn print_pipeline_report(report: &PipelineReport) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<16}{}",
        s.label.apply_to("Input frames"),
        s.value.apply_to(report.input_frames)
    );
    if let Some((ref nearest, difference)) = report.depth_adjustment {
        println!(
            "    {:<16}{}",
            s.label.apply_to("Depth adjust"),
            s.value.apply_to(format!(
                "{:+.3} m over {} frames (anchor distance {:.2} m)",
                difference.meters(),
                report.adjusted_frames,
                nearest.distance_m
            ))
        );
    }
    if let Some(shift) = report.depth_shift {
        println!(
            "    {:<16}{}",
            s.label.apply_to("Depth shift"),
            s.value.apply_to(format!("{:+.3} m", shift.meters()))
        );
    }
    if let Some(ref g) = report.generation {
        if g.skipped {
            println!(
                "    {:<16}{}",
                s.label.apply_to("Generation"),
                s.disabled.apply_to("no source channels, skipped")
            );
        } else {
            println!(
                "    {:<16}{}",
                s.label.apply_to("Generation"),
                s.value.apply_to(format!(
                    "{} unique source, {} erased, {} added",
                    g.unique_sources, g.erased, g.added
                ))
            );
        }
    }
    if report.flipped > 0 {
        println!(
            "    {:<16}{}",
            s.label.apply_to("Flipped"),
            s.value.apply_to(report.flipped)
        );
    }
    println!(
        "    {:<16}{}",
        s.label.apply_to("Output frames"),
        s.value.apply_to(report.output_frames)
    );
    if let Some(offset) = report.anonymized {
        println!(
            "    {:<16}{}",
            s.label.apply_to("Moved to"),
            s.value.apply_to(format!("{:.0}, {:.0}", offset.latitude, offset.longitude))
        );
    }

    for export in &report.exports {
        match export.error {
            None => println!(
                "    {:<16}{}",
                s.label.apply_to(format!("Wrote {}", export.format)),
                s.path.apply_to(export.path.display())
            ),
            Some(ref e) => println!(
                "    {:<16}{}",
                s.label.apply_to(format!("Failed {}", export.format)),
                s.error.apply_to(e)
            ),
        }
    }
    for w in &report.warnings {
        println!("    {}", s.disabled.apply_to(w));
    }
    println!();
}
