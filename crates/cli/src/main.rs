//! CLI tool for building the year-end summary deck and applying corrections.

mod content;
mod corrections;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_core::outline::snippet;
use deck_core::{
    DeckBuilder, DeckSpec, Document, FileFormat, OverlapPolicy, PatchSet, Patcher, StyleConfig,
};
use deck_docx::DocxParser;
use deck_pptx::PptxWriter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Build styled slide decks and patch existing ones in place.
#[derive(Parser, Debug)]
#[command(name = "deck-tool")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a deck from structured content.
    Build {
        /// Output file
        #[arg(short, long, default_value = content::DEFAULT_DECK_FILE)]
        output: PathBuf,

        /// Deck content as JSON (default: built-in content)
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Style configuration as JSON (default: built-in style)
        #[arg(long)]
        style: Option<PathBuf>,
    },

    /// Apply correction rules to existing decks.
    Patch {
        /// Input .pptx file(s) (default: the built deck)
        input: Vec<PathBuf>,

        /// Suffix appended to the input file stem
        #[arg(short, long, default_value = corrections::DEFAULT_SUFFIX)]
        suffix: String,

        /// Patch rules as JSON (default: built-in corrections)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Style configuration as JSON (default: built-in style)
        #[arg(long)]
        style: Option<PathBuf>,

        /// Refuse to patch when one shape is matched by several rules
        #[arg(long)]
        strict: bool,
    },

    /// Dump the text of .pptx or .docx files.
    Inspect {
        /// Input file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::Build {
            output,
            spec,
            style,
        } => run_build(&output, spec.as_deref(), style.as_deref()),
        Command::Patch {
            input,
            suffix,
            rules,
            style,
            strict,
        } => run_patch(&input, &suffix, rules.as_deref(), style.as_deref(), strict),
        Command::Inspect { input, json } => run_inspect(&input, json),
    }
}

fn run_build(output: &Path, spec: Option<&Path>, style: Option<&Path>) -> Result<()> {
    let style: StyleConfig = load_json(style)?.unwrap_or_default();
    let spec: DeckSpec = load_json(spec)?.unwrap_or_else(content::deck);

    let doc = DeckBuilder::new(style.clone())
        .build(&spec)
        .context("Failed to build deck")?;
    save(&doc, &style, output)?;

    println!("Built {} slides", doc.slides.len());
    println!("Saved to {}", output.display());
    Ok(())
}

fn run_patch(
    inputs: &[PathBuf],
    suffix: &str,
    rules: Option<&Path>,
    style: Option<&Path>,
    strict: bool,
) -> Result<()> {
    let style: StyleConfig = load_json(style)?.unwrap_or_default();
    let mut set: PatchSet = load_json(rules)?.unwrap_or_else(|| corrections::patch_set(&style));
    if strict {
        set.policy = OverlapPolicy::Reject;
    }

    let default_input = [PathBuf::from(content::DEFAULT_DECK_FILE)];
    let inputs = if inputs.is_empty() {
        &default_input[..]
    } else {
        inputs
    };

    let patcher = Patcher::new(style.clone());
    for input_path in inputs {
        if !input_path.exists() {
            log::error!("File not found: {}", input_path.display());
            continue;
        }
        log::debug!("Processing: {}", input_path.display());

        let mut doc = deck_pptx::open(input_path)
            .with_context(|| format!("Failed to open {}", input_path.display()))?;
        let report = patcher
            .apply(&mut doc, &set)
            .with_context(|| format!("Failed to patch {}", input_path.display()))?;

        for event in &report.events {
            println!("{}", event);
        }
        println!(
            "Updated {} shapes, removed {}, skipped {}",
            report.updated(),
            report.removed(),
            report.skipped()
        );

        let output_path = get_output_path(input_path, suffix);
        save(&doc, &style, &output_path)?;
        println!("Saved to {}", output_path.display());
    }

    Ok(())
}

/// Text of one shape, for `inspect`.
#[derive(Debug, Serialize)]
struct ShapeDump {
    name: String,
    left: Option<f64>,
    top: Option<f64>,
    text: String,
}

/// Shapes of one slide, for `inspect`.
#[derive(Debug, Serialize)]
struct SlideDump {
    number: usize,
    layout: usize,
    shapes: Vec<ShapeDump>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
enum FileDump {
    Presentation { path: PathBuf, slides: Vec<SlideDump> },
    WordProcessing { path: PathBuf, paragraphs: Vec<String> },
}

fn run_inspect(inputs: &[PathBuf], json: bool) -> Result<()> {
    let mut dumps = Vec::new();
    for input_path in inputs {
        if !input_path.exists() {
            log::error!("File not found: {}", input_path.display());
            continue;
        }
        dumps.push(inspect_file(input_path)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&dumps)?);
        return Ok(());
    }

    for dump in &dumps {
        match dump {
            FileDump::Presentation { path, slides } => {
                println!("--- {} ---", path.display());
                println!("Total slides: {}", slides.len());
                for slide in slides {
                    println!("\nSlide {} (layout {})", slide.number, slide.layout);
                    for shape in &slide.shapes {
                        println!("  - {}: {}", shape.name, snippet(&shape.text, 50));
                    }
                }
            }
            FileDump::WordProcessing { path, paragraphs } => {
                println!("--- {} ---", path.display());
                for paragraph in paragraphs {
                    println!("Para: {}", paragraph);
                }
            }
        }
    }
    Ok(())
}

fn inspect_file(input_path: &Path) -> Result<FileDump> {
    let format = input_path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(FileFormat::from_extension)
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format of {}", input_path.display()))?;

    // Read magic bytes; both formats are ZIP containers
    let mut magic = [0u8; 4];
    File::open(input_path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .with_context(|| format!("Failed to read header of {}", input_path.display()))?;
    if !FileFormat::is_zip_container(&magic) {
        anyhow::bail!("{} is not an Office Open XML file", input_path.display());
    }

    match format {
        FileFormat::Presentation => {
            let doc = deck_pptx::open(input_path)
                .with_context(|| format!("Failed to open {}", input_path.display()))?;
            Ok(FileDump::Presentation {
                path: input_path.to_path_buf(),
                slides: dump_slides(&doc),
            })
        }
        FileFormat::WordProcessing => {
            let file = File::open(input_path)
                .with_context(|| format!("Failed to open {}", input_path.display()))?;
            let paragraphs = DocxParser::new()
                .parse_non_empty(BufReader::new(file))
                .with_context(|| format!("Failed to read {}", input_path.display()))?;
            Ok(FileDump::WordProcessing {
                path: input_path.to_path_buf(),
                paragraphs,
            })
        }
    }
}

fn dump_slides(doc: &Document) -> Vec<SlideDump> {
    doc.slides
        .iter()
        .enumerate()
        .map(|(index, slide)| SlideDump {
            number: index + 1,
            layout: slide.layout,
            shapes: slide
                .shapes
                .iter()
                .filter(|shape| shape.has_text_frame())
                .map(|shape| ShapeDump {
                    name: shape.name.clone(),
                    left: shape.frame.map(|f| f.left.as_inches()),
                    top: shape.frame.map(|f| f.top.as_inches()),
                    text: shape.text(),
                })
                .collect(),
        })
        .collect()
}

/// Read a JSON configuration file; `None` when no path was given.
fn load_json<T: DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

fn save(doc: &Document, style: &StyleConfig, path: &Path) -> Result<()> {
    PptxWriter::new()
        .with_typefaces(style.typefaces.clone())
        .save(doc, path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Output path for a patched file: the input's stem plus `suffix`, next to it.
fn get_output_path(input_path: &Path, suffix: &str) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}{}.pptx", stem, suffix);

    match input_path.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::Slide;
    use deck_pptx::PptxParser;
    use std::io::Cursor;

    fn slide_titled<'a>(doc: &'a Document, title: &str) -> &'a Slide {
        doc.slides
            .iter()
            .find(|s| s.title().as_deref() == Some(title))
            .unwrap()
    }

    #[test]
    fn test_get_output_path() {
        assert_eq!(
            get_output_path(Path::new("decks/summary.pptx"), "_Corrected"),
            PathBuf::from("decks/summary_Corrected.pptx")
        );
        assert_eq!(
            get_output_path(Path::new("summary.pptx"), "_v2"),
            PathBuf::from("summary_v2.pptx")
        );
    }

    #[test]
    fn test_build_then_correct() {
        let style = StyleConfig::default();
        let doc = DeckBuilder::new(style.clone()).build(&content::deck()).unwrap();
        let bytes = PptxWriter::new()
            .write(&doc, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();

        let mut loaded = PptxParser::new().parse(Cursor::new(bytes)).unwrap();
        assert_eq!(loaded.slides.len(), doc.slides.len());

        let mut set = corrections::patch_set(&style);
        set.policy = OverlapPolicy::Reject;
        let report = Patcher::new(style).apply(&mut loaded, &set).unwrap();
        assert!(report.is_complete(), "{:#?}", report.events);
        assert_eq!(report.updated(), 8);
        assert_eq!(report.removed(), 5);

        let bytes = PptxWriter::new()
            .write(&loaded, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let corrected = PptxParser::new().parse(Cursor::new(bytes)).unwrap();

        let handover = slide_titled(&corrected, "交接中心").texts().join("\n");
        assert!(handover.contains("流程标准化"));
        assert!(handover.contains("无损传递"));
        assert!(handover.contains("■ 工作心得"));
        assert!(!handover.contains("关键成效"));
        assert!(!handover.contains("247"));
        assert!(!handover.contains("业务支撑"));

        let desktop = slide_titled(&corrected, "桌面布局规范").texts();
        assert!(desktop.iter().any(|t| t == "内部节省"));
        assert!(desktop.iter().any(|t| t == "247人天"));
        assert!(desktop.iter().any(|t| t == "支撑营收"));
        assert!(desktop.iter().any(|t| t == "千万级"));
        assert!(!desktop.iter().any(|t| t.contains("0起")));
    }

    #[test]
    fn test_patch_skips_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let style = StyleConfig::default();
        let doc = DeckBuilder::new(style.clone()).build(&content::deck()).unwrap();
        let real = dir.path().join("summary.pptx");
        save(&doc, &style, &real).unwrap();
        let missing = dir.path().join("missing.pptx");

        run_patch(&[missing, real], "_Corrected", None, None, true).unwrap();

        let mut written: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        written.sort();
        assert_eq!(written, vec!["summary.pptx", "summary_Corrected.pptx"]);

        let corrected = deck_pptx::open(dir.path().join("summary_Corrected.pptx")).unwrap();
        let handover = slide_titled(&corrected, "交接中心").texts().join("\n");
        assert!(handover.contains("流程标准化"));
    }

    #[test]
    fn test_second_pass_finds_nothing_to_delete() {
        let style = StyleConfig::default();
        let doc = DeckBuilder::new(style.clone()).build(&content::deck()).unwrap();
        let bytes = PptxWriter::new()
            .write(&doc, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut loaded = PptxParser::new().parse(Cursor::new(bytes)).unwrap();

        let set = corrections::patch_set(&style);
        let patcher = Patcher::new(style);
        patcher.apply(&mut loaded, &set).unwrap();
        let again = patcher.apply(&mut loaded, &set).unwrap();

        assert_eq!(again.removed(), 0);
        assert!(!again.is_complete());
    }
}
