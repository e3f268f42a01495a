use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::{Args, Mode};
use crate::config_file::Settings;
use crate::grid_processing::batch::{discover_images, grid_output_path, plan_jobs, BatchConverter};
use crate::grid_processing::merge::{merge_grids, DEFAULT_MERGE_OUTPUT};
use crate::grid_processing::render::{render_grid, save_rendered};
use crate::grid_processing::report::print_report;
use crate::grid_processing::{
    load_envelope, write_envelope, ConversionConfig, GridConverter, GridSize,
};
use crate::json_output::JsonMessage;
use crate::utils::{create_progress_bar, create_row_progress_bar, format_duration, verbose_println};

/// Parse-to-exit entry point shared by both binaries
pub fn run(args: Args) -> Result<()> {
    let settings = Settings::from_args(args)?;
    run_with(&settings)
}

pub fn run_with(settings: &Settings) -> Result<()> {
    let human = !settings.json_progress;
    let verbose = settings.verbose && human;

    if human {
        println!("{}", style("Grid Converter").bold().blue());
        println!();
    }

    if verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Mode: {:?}", settings.mode);
        println!("  Grid size: {}x{}", settings.width, settings.height);
        println!("  Filter: {}", settings.filter);
        println!("  Pretty JSON: {}", settings.pretty);
        println!("  Parallel jobs: {}", settings.jobs);
        println!("  Extensions: {:?}", settings.extensions);
        println!();
    }

    match settings.mode {
        Mode::Convert => run_convert(settings),
        Mode::Merge => run_merge(settings),
        Mode::Render => run_render(settings),
    }
}

fn converter_for(settings: &Settings) -> GridConverter {
    GridConverter::new(ConversionConfig {
        filter: settings.filter,
        pretty: settings.pretty,
    })
}

fn run_convert(settings: &Settings) -> Result<()> {
    match settings.inputs.as_slice() {
        [single] if !single.is_dir() => convert_single(settings, single),
        _ => convert_batch(settings),
    }
}

fn convert_single(settings: &Settings, source: &Path) -> Result<()> {
    let human = !settings.json_progress;
    let destination = settings
        .output
        .clone()
        .unwrap_or_else(|| grid_output_path(source, None));

    verbose_println(
        settings.verbose && human,
        &format!("Converting {} -> {}", source.display(), destination.display()),
    );

    let row_bar = if human {
        let height = u64::try_from(settings.height).unwrap_or(0);
        let pb = create_row_progress_bar(height);
        pb.set_message("scanning");
        Some(pb)
    } else {
        None
    };

    let result = converter_for(settings).convert_file(
        source,
        &destination,
        settings.width,
        settings.height,
        |done, total| match &row_bar {
            Some(pb) => pb.set_position(u64::from(done)),
            None => JsonMessage::progress(done as usize, total as usize, "rows"),
        },
    );

    match result {
        Ok(outcome) => {
            if let Some(pb) = row_bar {
                pb.finish_with_message("done");
            }
            if human {
                println!(
                    "{} Converted '{}' ({}x{}) to '{}' ({}x{} grid) in {}",
                    style("✓").green().bold(),
                    outcome.source.display(),
                    outcome.source_dimensions.0,
                    outcome.source_dimensions.1,
                    outcome.destination.display(),
                    outcome.grid_width,
                    outcome.grid_height,
                    style(format_duration(outcome.elapsed)).dim()
                );
            } else {
                JsonMessage::file_completed(&outcome);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(pb) = row_bar {
                pb.abandon_with_message("failed");
            }
            if !human {
                JsonMessage::file_failed(source, e.to_string());
            }
            Err(e).with_context(|| format!("Failed to convert '{}'", source.display()))
        }
    }
}

fn convert_batch(settings: &Settings) -> Result<()> {
    let human = !settings.json_progress;
    let start = Instant::now();

    // Validate up front so a bad size fails once instead of once per file
    let size = GridSize::new(settings.width, settings.height)?;

    let sources = discover_images(&settings.inputs, &settings.extensions)
        .context("Failed to scan input paths")?;
    if sources.is_empty() {
        if human {
            println!("{}", style("No images found with specified extensions").red());
        }
        return Ok(());
    }
    verbose_println(
        settings.verbose && human,
        &format!("Found {} image files", sources.len()),
    );

    let jobs = plan_jobs(&sources, settings.output.as_deref());
    let batch = BatchConverter::new(converter_for(settings), size);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.jobs)
        .build()
        .context("Failed to initialize thread pool")?;

    let pb = if human {
        create_progress_bar(jobs.len() as u64)
    } else {
        indicatif::ProgressBar::hidden()
    };
    pb.set_message("Converting images");

    let results = pool.install(|| {
        batch.convert_all(&jobs, |entry, finished| {
            pb.inc(1);
            if human {
                return;
            }
            match &entry.result {
                Ok(outcome) => JsonMessage::file_completed(outcome),
                Err(e) => JsonMessage::file_failed(&entry.job.source, e.to_string()),
            }
            JsonMessage::progress(finished, jobs.len(), "files");
        })
    });
    pb.finish_with_message("✓ Conversion complete");

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    let converted = results.len() - failed;
    let elapsed = start.elapsed();

    if human {
        println!();
        println!("{}", style("Results Summary:").bold().green());
        println!("  Converted: {}", style(converted).bold().green());
        if failed > 0 {
            println!("  Failed: {}", style(failed).bold().red());
        }
        println!("  Total time: {}", style(format_duration(elapsed)).bold());

        if failed > 0 {
            println!();
            println!("{}", style("Errors encountered:").bold().red());
            for (i, entry) in results.iter().filter(|r| r.result.is_err()).enumerate() {
                if let Err(e) = &entry.result {
                    println!("  {}: {}", style(format!("#{}", i + 1)).dim(), e);
                }
            }
        }

        if settings.report {
            println!();
            print_report(&results);
        }
    } else {
        JsonMessage::summary(results.len(), converted, failed, elapsed.as_secs_f64());
    }

    if failed > 0 {
        anyhow::bail!("{} of {} conversions failed", failed, results.len());
    }
    Ok(())
}

/// A merge counts as one produced document
fn merge_summary(elapsed: Duration) -> JsonMessage {
    JsonMessage::Summary {
        total_files: 1,
        converted: 1,
        failed: 0,
        duration_secs: elapsed.as_secs_f64(),
    }
}

fn run_merge(settings: &Settings) -> Result<()> {
    let start = Instant::now();
    let mut grids = Vec::with_capacity(settings.inputs.len());
    for path in &settings.inputs {
        let grid = load_envelope(path)
            .with_context(|| format!("Failed to load grid '{}'", path.display()))?;
        grids.push(grid);
    }

    let merged = merge_grids(&grids).context("Failed to merge grids")?;
    let output = settings
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MERGE_OUTPUT));

    // merged documents are always compact, they tend to be large
    write_envelope(&merged, &output, false)
        .with_context(|| format!("Failed to write merged grid '{}'", output.display()))?;

    if settings.json_progress {
        merge_summary(start.elapsed()).emit();
    } else {
        println!(
            "{} Merged {} grids → {}",
            style("✓").green().bold(),
            grids.len(),
            output.display()
        );
    }
    Ok(())
}

/// `<stem>.png` next to the grid, inside `-o DIR`, or exactly `-o FILE` for a single grid
fn render_output_path(settings: &Settings, grid_path: &Path) -> PathBuf {
    let file_name = grid_path.with_extension("png");
    let file_name = file_name.file_name().map(PathBuf::from).unwrap_or_default();

    match (&settings.output, settings.inputs.len()) {
        (Some(path), 1) if !path.is_dir() => path.clone(),
        (Some(dir), _) => dir.join(file_name),
        (None, _) => grid_path.with_extension("png"),
    }
}

fn run_render(settings: &Settings) -> Result<()> {
    for grid_path in &settings.inputs {
        let envelope = load_envelope(grid_path)
            .with_context(|| format!("Failed to load grid '{}'", grid_path.display()))?;
        let output = render_output_path(settings, grid_path);

        save_rendered(&render_grid(&envelope), &output)
            .with_context(|| format!("Failed to write image '{}'", output.display()))?;

        if settings.json_progress {
            JsonMessage::progress(1, 1, output.display().to_string());
        } else {
            println!(
                "{} Rendered {} ({}x{}) → {}",
                style("✓").green().bold(),
                grid_path.display(),
                envelope.grid_width,
                envelope.grid_height,
                output.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::ConfigFile;
    use crate::error::GridError;
    use crate::test_support::{gradient_image, write_png, TempDir};
    use clap::Parser;
    use image::{ImageBuffer, Rgb, RgbImage};

    fn settings(list: &[&str]) -> Settings {
        let mut argv = vec!["grid-converter"];
        argv.extend_from_slice(list);
        Settings::resolve(Args::try_parse_from(argv).unwrap(), ConfigFile::default())
    }

    #[test]
    fn test_single_conversion_default_destination() {
        let tmp = TempDir::new("cmd-single");
        let source = write_png(tmp.path(), "photo.png", &gradient_image(20, 10));

        run_with(&settings(&[source.to_str().unwrap(), "-W", "5", "-H", "4"])).unwrap();

        let written = load_envelope(&tmp.path().join("photo_grid.json")).unwrap();
        assert_eq!(written.dimensions(), (5, 4));
    }

    #[test]
    fn test_single_conversion_errors_are_classified() {
        let tmp = TempDir::new("cmd-errors");
        let missing = tmp.path().join("missing.png");

        let err = run_with(&settings(&[missing.to_str().unwrap()])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GridError>(),
            Some(GridError::NotFound { .. })
        ));

        let source = write_png(tmp.path(), "ok.png", &gradient_image(4, 4));
        let err = run_with(&settings(&[source.to_str().unwrap(), "-W", "0"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GridError>(),
            Some(GridError::InvalidDimensions { .. })
        ));
        assert!(!tmp.path().join("ok_grid.json").exists());
    }

    #[test]
    fn test_directory_batch_with_output_dir() {
        let tmp = TempDir::new("cmd-batch");
        let input = tmp.path().join("in");
        std::fs::create_dir_all(&input).unwrap();
        write_png(&input, "a.png", &gradient_image(6, 6));
        write_png(&input, "b.png", &gradient_image(9, 3));
        let out = tmp.path().join("out");

        run_with(&settings(&[
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-W",
            "3",
            "-H",
            "3",
            "-j",
            "2",
            "--report",
        ]))
        .unwrap();

        assert_eq!(load_envelope(&out.join("a_grid.json")).unwrap().dimensions(), (3, 3));
        assert_eq!(load_envelope(&out.join("b_grid.json")).unwrap().dimensions(), (3, 3));
    }

    #[test]
    fn test_batch_reports_failures() {
        let tmp = TempDir::new("cmd-batch-fail");
        let good = write_png(tmp.path(), "good.png", &gradient_image(4, 4));
        let missing = tmp.path().join("missing.png");

        let result = run_with(&settings(&[
            good.to_str().unwrap(),
            missing.to_str().unwrap(),
            "-W",
            "2",
            "-H",
            "2",
            "--json-progress",
        ]));
        assert!(result.is_err());
        assert!(tmp.path().join("good_grid.json").exists());
    }

    #[test]
    fn test_merge_summary_counts_one_document() {
        match merge_summary(Duration::from_millis(250)) {
            JsonMessage::Summary {
                total_files,
                converted,
                failed,
                duration_secs,
            } => {
                assert_eq!((total_files, converted, failed), (1, 1, 0));
                assert_eq!(converted + failed, total_files);
                assert!((duration_secs - 0.25).abs() < 1e-9);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_merge_then_render() {
        let tmp = TempDir::new("cmd-merge");
        let red: RgbImage = ImageBuffer::from_pixel(2, 2, Rgb([255, 0, 0]));
        let white: RgbImage = ImageBuffer::from_pixel(2, 2, Rgb([255, 255, 255]));
        let red_src = write_png(tmp.path(), "red.png", &red);
        let white_src = write_png(tmp.path(), "white.png", &white);

        for src in [&red_src, &white_src] {
            run_with(&settings(&[src.to_str().unwrap(), "-W", "2", "-H", "2"])).unwrap();
        }

        let merged = tmp.path().join("merged.json");
        run_with(&settings(&[
            "--merge",
            tmp.path().join("white_grid.json").to_str().unwrap(),
            tmp.path().join("red_grid.json").to_str().unwrap(),
            "-o",
            merged.to_str().unwrap(),
        ]))
        .unwrap();

        // white never overrides, so the red base shows through
        let envelope = load_envelope(&merged).unwrap();
        assert!(envelope.data.iter().flatten().all(|c| c == "#FF0000"));

        let png = tmp.path().join("merged.png");
        run_with(&settings(&["--render", merged.to_str().unwrap()])).unwrap();
        let rendered = image::open(&png).unwrap().to_rgba8();
        assert_eq!(rendered.dimensions(), (2, 2));
        assert_eq!(rendered.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_render_output_path() {
        let s = settings(&["--render", "/g/a.json"]);
        assert_eq!(render_output_path(&s, Path::new("/g/a.json")), PathBuf::from("/g/a.png"));

        let s = settings(&["--render", "/g/a.json", "-o", "/tmp/x.png"]);
        assert_eq!(render_output_path(&s, Path::new("/g/a.json")), PathBuf::from("/tmp/x.png"));

        let s = settings(&["--render", "/g/a.json", "/g/b.json", "-o", "/out"]);
        assert_eq!(render_output_path(&s, Path::new("/g/b.json")), PathBuf::from("/out/b.png"));
    }
}
