//! CLI tool for rendering image tags in Word and PowerPoint templates.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docx_image_core::{DocumentFormat, ImageLoader, ImageOptions, ImageSize, SizePolicy};
use docx_image_ooxml::{ImageModule, Package, RenderStats};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Replace {%tag} and {%%tag} placeholders in a .docx or .pptx with images.
#[derive(Parser, Debug)]
#[command(name = "docx-image")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Template file (.docx or .pptx)
    template: PathBuf,

    /// JSON file with the tag values (paths, data URLs or byte arrays)
    #[arg(short, long)]
    data: PathBuf,

    /// Directory image paths are resolved against (default: the data file's directory)
    #[arg(short, long)]
    images: Option<PathBuf>,

    /// Output file (default: <template stem>.rendered.<ext> next to the template)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Center images whose tag is alone in its paragraph or shape
    #[arg(short, long)]
    centered: bool,

    /// Render every image at this size in pixels, e.g. 150x150
    #[arg(short, long, value_name = "WxH", conflicts_with = "fit")]
    size: Option<String>,

    /// Scale images down so their longer side is at most this many pixels
    #[arg(short, long, value_name = "PX")]
    fit: Option<f64>,

    /// Print how many images were inserted and tags removed
    #[arg(long)]
    print_stats: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let data = read_data(&args.data)?;
    let module = build_module(&args)?;

    if args.verbose {
        eprintln!("Rendering: {}", args.template.display());
    }

    let file = File::open(&args.template)
        .with_context(|| format!("Failed to open {}", args.template.display()))?;
    let mut package = Package::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to load {}", args.template.display()))?;

    let stats = module
        .render(&mut package, &data)
        .with_context(|| format!("Failed to render {}", args.template.display()))?;

    let output_path = get_output_path(&args.template, args.output.as_ref(), package.format());
    write_output(&output_path, &package)?;

    if args.verbose {
        eprintln!("Written to: {}", output_path.display());
    }
    if args.print_stats {
        print_stats(&stats);
    }

    Ok(())
}

/// Build the image module from the command line options.
fn build_module(args: &Args) -> Result<ImageModule<ImageLoader>> {
    let root = match &args.images {
        Some(dir) => dir.clone(),
        None => args
            .data
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let policy = match (&args.size, args.fit) {
        (Some(size), _) => SizePolicy::Fixed(ImageSize::parse(size)?),
        (None, Some(max_px)) if max_px.is_finite() && max_px > 0.0 => SizePolicy::FitWithin(max_px),
        (None, Some(max_px)) => bail!("--fit must be a positive number of pixels, got {}", max_px),
        (None, None) => SizePolicy::Detect,
    };
    log::debug!("Images from {} sized with {:?}", root.display(), policy);

    let loader = ImageLoader::new().with_root(root).with_size_policy(policy);
    Ok(ImageModule::new(loader).with_options(ImageOptions::new().with_centered(args.centered)))
}

/// Read the tag values, which must be a JSON object.
fn read_data(path: &Path) -> Result<Map<String, Value>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => bail!("{} must hold a JSON object, found {}", path.display(), kind_of(&other)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Determine the output path for a rendered template.
fn get_output_path(template: &Path, output: Option<&PathBuf>, format: DocumentFormat) -> PathBuf {
    if let Some(path) = output {
        return path.clone();
    }

    let stem = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = template
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| DocumentFormat::from_extension(e) == Some(format))
        .unwrap_or(format.extension());

    let output_filename = format!("{}.rendered.{}", stem, ext);
    match template.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}

/// Write the rendered package to a file.
fn write_output(path: &Path, package: &Package) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = package
        .write(BufWriter::new(file))
        .with_context(|| format!("Failed to write to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

fn print_stats(stats: &RenderStats) {
    println!("images inserted: {}", stats.images_inserted);
    println!("tags removed:    {}", stats.tags_removed);
    println!("parts rewritten: {}", stats.parts_rewritten);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_defaults_next_to_template() {
        let path = get_output_path(Path::new("/tmp/report.docx"), None, DocumentFormat::Docx);
        assert_eq!(path, PathBuf::from("/tmp/report.rendered.docx"));

        let path = get_output_path(Path::new("deck.PPTX"), None, DocumentFormat::Pptx);
        assert_eq!(path, PathBuf::from("deck.rendered.PPTX"));

        let path = get_output_path(Path::new("/tmp/template.zip"), None, DocumentFormat::Pptx);
        assert_eq!(path, PathBuf::from("/tmp/template.rendered.pptx"));
    }

    #[test]
    fn test_output_path_override() {
        let out = PathBuf::from("/out/final.docx");
        assert_eq!(get_output_path(Path::new("a.docx"), Some(&out), DocumentFormat::Docx), out);
    }

    #[test]
    fn test_size_and_fit_are_exclusive() {
        let result = Args::try_parse_from(["docx-image", "t.docx", "-d", "d.json", "-s", "10x10", "-f", "5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_from_args() {
        let args = Args::try_parse_from(["docx-image", "t.docx", "--data", "dir/d.json", "--fit", "200"]).unwrap();
        assert!(build_module(&args).is_ok());

        let args = Args::try_parse_from(["docx-image", "t.docx", "--data", "d.json", "--fit=-3"]).unwrap();
        assert!(build_module(&args).is_err());

        let args = Args::try_parse_from(["docx-image", "t.docx", "--data", "d.json", "--size", "wide"]).unwrap();
        assert!(build_module(&args).is_err());
    }

    #[test]
    fn test_read_data_requires_object() {
        let dir = std::env::temp_dir().join(format!("docx-image-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let object = dir.join("object.json");
        std::fs::write(&object, r#"{"image": "image.png"}"#).unwrap();
        assert_eq!(read_data(&object).unwrap()["image"], "image.png");

        let array = dir.join("array.json");
        std::fs::write(&array, "[1, 2]").unwrap();
        let err = read_data(&array).unwrap_err();
        assert!(err.to_string().contains("an array"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
