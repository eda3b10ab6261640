use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;

mod output;

use output::{ColorMode, print_extraction_summary, print_outcome, print_voices};

use chaptersmith_ai::{
    BookAnalysis, CatalogVoiceMatcher, ContentClassifier, MetadataExtractor, OpenAiAnalyzer,
    SuitabilityVerdict, VoiceMatch, VoiceRecommender, sample_for_analysis,
};
use chaptersmith_core::{SplitOutcome, SplitterConfig, config_file};
use chaptersmith_extract::{BackendError, ExtractError, ExtractedText, extract_text};
use chaptersmith_reporting::{
    BookMetadata, CreditsGenerator, ExportFormat, RunReport, export_report, write_chapter_files,
};

/// Chaptersmith - Split manuscripts into narration-ready audiobook chapters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Html,
    Json,
    Text,
}

impl From<ReportFormat> for ExportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Html => ExportFormat::Html,
            ReportFormat::Json => ExportFormat::Json,
            ReportFormat::Text => ExportFormat::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a manuscript into chapters, narration files, and a report
    Process {
        /// Path to the manuscript (PDF, EPUB, DOCX, or TXT)
        input: PathBuf,

        /// Output directory (default: `<input stem>_audiobook`)
        output_dir: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Minimum words for an accepted chapter
        #[arg(long)]
        min_chapter_words: Option<usize>,

        /// Chars of document prefix searched for the TOC anchor
        #[arg(long)]
        toc_window: Option<usize>,

        /// Quality score a chapter needs to be validated
        #[arg(long)]
        accept_threshold: Option<f64>,

        /// OpenAI API key (falls back to OPENAI_API_KEY, then config file)
        #[arg(long)]
        openai_key: Option<String>,

        /// Skip the AI collaborators (suitability gate, metadata, voices)
        #[arg(long)]
        skip_ai: bool,

        /// Comma-separated chapter titles to fall back to when automatic
        /// detection comes up short
        #[arg(long, value_delimiter = ',')]
        chapter_titles: Vec<String>,

        /// Report format(s) to write (default: html and json)
        #[arg(long, value_enum)]
        report_format: Vec<ReportFormat>,
    },

    /// Detect chapters and print them without writing any files
    Detect {
        /// Path to the manuscript (PDF, EPUB, DOCX, or TXT)
        input: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Minimum words for an accepted chapter
        #[arg(long)]
        min_chapter_words: Option<usize>,

        /// Chars of document prefix searched for the TOC anchor
        #[arg(long)]
        toc_window: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Process {
            input,
            output_dir,
            no_color,
            min_chapter_words,
            toc_window,
            accept_threshold,
            openai_key,
            skip_ai,
            chapter_titles,
            report_format,
        } => {
            process(
                input,
                output_dir,
                no_color,
                min_chapter_words,
                toc_window,
                accept_threshold,
                openai_key,
                skip_ai,
                chapter_titles,
                report_format,
            )
            .await
        }
        Command::Detect {
            input,
            no_color,
            min_chapter_words,
            toc_window,
        } => detect(input, no_color, min_chapter_words, toc_window),
    }
}

/// Resolve the splitter configuration: config file first, CLI flags last
/// so flags win.
fn build_splitter_config(
    file_config: &config_file::ConfigFile,
    min_chapter_words: Option<usize>,
    toc_window: Option<usize>,
    accept_threshold: Option<f64>,
) -> anyhow::Result<SplitterConfig> {
    let mut builder = config_file::apply_to_builder(SplitterConfig::builder(), file_config);
    if let Some(words) = min_chapter_words {
        builder = builder.min_chapter_words(words);
    }
    if let Some(window) = toc_window {
        builder = builder.toc_anchor_window(window);
    }
    if let Some(threshold) = accept_threshold {
        builder = builder.accept_threshold(threshold);
    }
    Ok(builder.build()?)
}

/// Turn an extraction failure into an actionable user-facing error.
fn describe_extract_error(error: ExtractError, input: &Path) -> anyhow::Error {
    let name = input.display();
    match error {
        ExtractError::Backend(BackendError::Encrypted) => anyhow::anyhow!(
            "{} is password-protected. Remove the password and try again.",
            name
        ),
        ExtractError::Backend(BackendError::NoTextLayer) | ExtractError::NoText => anyhow::anyhow!(
            "{} has no extractable text (it may be a scanned or image-only document). \
             Run OCR on it first, or upload a text-based copy.",
            name
        ),
        ExtractError::UnsupportedFormat(ext) => anyhow::anyhow!(
            "Unsupported file format .{}. Supported formats: PDF, EPUB, DOCX, TXT.",
            ext
        ),
        other => anyhow::anyhow!("Failed to extract text from {}: {}", name, other),
    }
}

fn extract_with_summary(
    input: &Path,
    writer: &mut dyn Write,
    color: ColorMode,
) -> anyhow::Result<ExtractedText> {
    let extracted = extract_text(input).map_err(|e| describe_extract_error(e, input))?;
    print_extraction_summary(
        writer,
        &input.display().to_string(),
        extracted.text.len(),
        extracted.page_count,
        color,
    )?;
    Ok(extracted)
}

fn split_with_spinner(
    text: &str,
    user_titles: &[String],
    config: &SplitterConfig,
) -> SplitOutcome {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("Detecting chapters...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = if user_titles.is_empty() {
        chaptersmith_core::split_chapters(text, config)
    } else {
        chaptersmith_core::split_with_user_titles(text, user_titles, config)
    };
    spinner.finish_and_clear();
    outcome
}

#[allow(clippy::too_many_arguments)]
async fn process(
    input: PathBuf,
    output_dir: Option<PathBuf>,
    no_color: bool,
    min_chapter_words: Option<usize>,
    toc_window: Option<usize>,
    accept_threshold: Option<f64>,
    openai_key: Option<String>,
    skip_ai: bool,
    chapter_titles: Vec<String>,
    report_format: Vec<ReportFormat>,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let file_config = config_file::load_config();
    let config = build_splitter_config(
        &file_config,
        min_chapter_words,
        toc_window,
        accept_threshold,
    )?;
    let api_key = openai_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .or_else(|| {
            file_config
                .api
                .as_ref()
                .and_then(|a| a.openai_api_key.clone())
        });
    let api_timeout = file_config
        .api
        .as_ref()
        .and_then(|a| a.timeout_secs)
        .unwrap_or(30);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let extracted = extract_with_summary(&input, &mut writer, color)?;

    let analyzer = match (&api_key, skip_ai) {
        (Some(key), false) => {
            let mut analyzer = OpenAiAnalyzer::new(key.clone())
                .with_timeout(Duration::from_secs(api_timeout));
            if let Some(model) = file_config.api.as_ref().and_then(|a| a.model.clone()) {
                analyzer = analyzer.with_model(model);
            }
            Some(analyzer)
        }
        _ => None,
    };

    // Suitability gate: reject non-book documents before doing real work.
    // A classifier outage degrades open rather than blocking the run.
    let mut suitability: Option<SuitabilityVerdict> = None;
    if let Some(analyzer) = &analyzer {
        let sample: String = extracted.text.chars().take(3000).collect();
        let verdict = match analyzer.classify(&sample, &cancel).await {
            Ok(verdict) => verdict,
            Err(chaptersmith_ai::AiError::Cancelled) => anyhow::bail!("cancelled"),
            Err(e) => {
                tracing::warn!(error = %e, "content validation failed; continuing");
                SuitabilityVerdict::degraded_open()
            }
        };
        if !verdict.is_suitable {
            let message = verdict.user_message().unwrap_or_default();
            writeln!(writer, "Content validation failed: {}", verdict.reason)?;
            writeln!(writer, "{}", message)?;
            anyhow::bail!(
                "not suitable for audiobook production (detected: {})",
                verdict.document_type
            );
        }
        writeln!(
            writer,
            "Content validated: {} - {}",
            verdict.document_type, verdict.estimated_genre
        )?;
        writeln!(writer)?;
        suitability = Some(verdict);
    }

    let outcome = split_with_spinner(&extracted.text, &chapter_titles, &config);
    print_outcome(&mut writer, &outcome, color)?;

    // Metadata + voice recommendations (both degrade gracefully)
    let mut analysis = BookAnalysis::default();
    let mut voices: Vec<VoiceMatch> = Vec::new();
    if let Some(analyzer) = &analyzer {
        let sample = sample_for_analysis(&extracted.text, 1000);
        match analyzer.extract_metadata(&sample, &cancel).await {
            Ok(extracted_analysis) => analysis = extracted_analysis,
            Err(e) => tracing::warn!(error = %e, "metadata extraction failed"),
        }
        voices = match analyzer.recommend(&analysis, &cancel).await {
            Ok(voices) if !voices.is_empty() => voices,
            Ok(_) | Err(_) => {
                tracing::warn!("voice recommendation unavailable; using built-in catalog");
                CatalogVoiceMatcher::new().rank(&analysis)
            }
        };
        print_voices(&mut writer, &voices, color)?;
    }

    // Write narration files, credits, and reports
    let out_dir = output_dir.unwrap_or_else(|| default_output_dir(&input));
    let chapters_dir = out_dir.join("chapters");
    let mut all_chapters = outcome.chapters.clone();
    all_chapters.extend(outcome.low_confidence.iter().cloned());
    write_chapter_files(&all_chapters, &chapters_dir)?;

    let title = analysis
        .title
        .clone()
        .unwrap_or_else(|| input_stem(&input));
    let author = analysis
        .author
        .clone()
        .unwrap_or_else(|| "Unknown Author".to_string());
    let credits = CreditsGenerator::new(BookMetadata::new(title, author));
    credits.write_credits(&chapters_dir)?;

    let source_name = input.display().to_string();
    let report = RunReport {
        source_name: &source_name,
        page_count: extracted.page_count,
        outcome: &outcome,
        suitability: suitability.as_ref(),
        analysis: Some(&analysis),
        voices: &voices,
    };
    let formats = if report_format.is_empty() {
        vec![ReportFormat::Html, ReportFormat::Json]
    } else {
        report_format
    };
    for format in dedup_formats(&formats) {
        let export: ExportFormat = format.into();
        let path = out_dir.join(format!("report.{}", export.extension()));
        export_report(&report, export, &path).map_err(|e| anyhow::anyhow!(e))?;
    }

    writeln!(writer)?;
    writeln!(writer, "Output written to {}", out_dir.display())?;
    Ok(())
}

fn detect(
    input: PathBuf,
    no_color: bool,
    min_chapter_words: Option<usize>,
    toc_window: Option<usize>,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    let file_config = config_file::load_config();
    let config = build_splitter_config(&file_config, min_chapter_words, toc_window, None)?;

    let extracted = extract_with_summary(&input, &mut writer, color)?;
    let outcome = split_with_spinner(&extracted.text, &[], &config);
    print_outcome(&mut writer, &outcome, color)?;
    Ok(())
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("book")
        .to_string()
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input_stem(input);
    input
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default()
        .join(format!("{}_audiobook", stem))
}

fn dedup_formats(formats: &[ReportFormat]) -> Vec<ReportFormat> {
    let mut seen = Vec::new();
    for &format in formats {
        if !seen.contains(&format) {
            seen.push(format);
        }
    }
    seen
}
