use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ExamProfile;
use crate::core::model::{Diagnostic, DiagnosticKind, ParseResult, Question, SourceDocument};
use crate::export::csv_export::CsvExporter;
use crate::export::json_export::JsonExporter;
use crate::export::markdown_export::MarkdownExporter;
use crate::export::Exporter;
use crate::ocr::corrector::OcrCorrector;
use crate::parser::layout_builder::LayoutAnalyzer;
use crate::parser::sections::identify_sections;
use crate::parser::segmenter::segment_questions;
use crate::parser::{strip_page_furniture, HeuristicExtractor, QuestionExtractor, SplitStrategy};
use crate::tables::strip::strip_table_text;
use crate::tables::TablePool;

const MIN_CHOICES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub profile: ExamProfile,
}

impl PipelineConfig {
    pub fn new(input: PathBuf, output: PathBuf, formats: Vec<OutputFormat>, profile: ExamProfile) -> Self {
        Self {
            input,
            output,
            formats,
            profile,
        }
    }
}

/// State owned by a single parse. Nothing here outlives the call.
struct ParseContext<'a> {
    profile: &'a ExamProfile,
    page_headers: Vec<Regex>,
    tables: TablePool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ParseContext<'a> {
    fn new(document: &SourceDocument, profile: &'a ExamProfile, corrector: &OcrCorrector) -> Self {
        Self {
            profile,
            page_headers: profile.page_header_regexes(),
            tables: TablePool::from_document(document, corrector),
            diagnostics: Vec::new(),
        }
    }

    fn diagnose(&mut self, kind: DiagnosticKind, question_number: Option<u32>, message: String) {
        self.diagnostics.push(Diagnostic {
            kind,
            question_number,
            message,
        });
    }
}

/// Parses a document with the built-in heuristic extractor.
pub fn parse_document(document: &SourceDocument, profile: &ExamProfile) -> ParseResult {
    let corrector = OcrCorrector::new(profile.lexicon_pairs());
    let extractor = HeuristicExtractor::new(corrector);
    parse_document_with(document, profile, &extractor)
}

/// Parses a document into questions plus diagnostics. Malformed input never
/// fails the call; it shows up as missing questions and diagnostic records.
pub fn parse_document_with(
    document: &SourceDocument,
    profile: &ExamProfile,
    extractor: &dyn QuestionExtractor,
) -> ParseResult {
    let corrector = OcrCorrector::new(profile.lexicon_pairs());
    let mut ctx = ParseContext::new(document, profile, &corrector);

    let analyzer = LayoutAnalyzer::new();
    let mut text = String::new();
    let mut page_starts = Vec::with_capacity(document.pages.len());
    for (page_idx, page) in document.pages.iter().enumerate() {
        let page_text = corrector.correct_lines(&analyzer.analyze_page(page, page_idx).text);
        if !text.is_empty() {
            text.push('\n');
        }
        page_starts.push(text.len());
        text.push_str(&page_text);
    }

    if text.trim().is_empty() {
        ctx.diagnose(
            DiagnosticKind::EmptyDocument,
            None,
            "document contains no text".to_string(),
        );
        return finish(document, Vec::new(), ctx);
    }

    let sections = identify_sections(&text, profile);
    let spans = segment_questions(&text, &page_starts, profile.max_number_gap);
    if spans.is_empty() {
        ctx.diagnose(
            DiagnosticKind::NoQuestionMarkers,
            None,
            "no question markers found".to_string(),
        );
        return finish(document, Vec::new(), ctx);
    }

    let mut questions = Vec::with_capacity(spans.len());
    for mut span in spans {
        span.text = strip_page_furniture(&span.text, ctx.profile, &ctx.page_headers);
        let extraction = extractor.extract(&span);
        if extraction.choices.len() < MIN_CHOICES {
            warn!(
                number = span.number,
                choices = extraction.choices.len(),
                "dropping question with too few choices"
            );
            ctx.diagnose(
                DiagnosticKind::ExtractionFailed,
                Some(span.number),
                format!(
                    "question {} has {} choice(s), at least {MIN_CHOICES} required",
                    span.number,
                    extraction.choices.len()
                ),
            );
            continue;
        }

        let mut question = Question {
            number: span.number,
            section: sections.section_for(span.number, span.offset, profile),
            stem: extraction.stem,
            preamble: extraction.preamble,
            passage: extraction.passage,
            choices: extraction.choices,
            table: None,
            table_match: None,
        };

        if let Some((table, found)) = ctx.tables.bind(&span.text, &profile.table_families) {
            debug!(number = question.number, page = span.page_idx, "attached table");
            let include_stem = extraction.strategy != SplitStrategy::Interrogative;
            strip_table_text(&mut question, &table, include_stem);
            question.table = Some(table);
            question.table_match = Some(found);
        }
        questions.push(question);
    }

    finish(document, questions, ctx)
}

fn finish(document: &SourceDocument, mut questions: Vec<Question>, ctx: ParseContext<'_>) -> ParseResult {
    questions.sort_by_key(|q| q.number);
    info!(
        questions = questions.len(),
        diagnostics = ctx.diagnostics.len(),
        unbound_tables = ctx.tables.unconsumed(),
        "parsed document"
    );
    ParseResult {
        name: document.name.clone(),
        questions,
        diagnostics: ctx.diagnostics,
    }
}

/// Reads a JSON document, or plain text with form-feed page breaks.
pub fn load_document(path: &Path) -> Result<SourceDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read input {}", path.display()))?;
    let is_text = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

    let mut document = if is_text {
        SourceDocument::from_concatenated(&raw)
    } else {
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse input document {}", path.display()))?
    };
    if document.name.is_none() {
        document.name = path.file_stem().map(|stem| stem.to_string_lossy().into_owned());
    }
    Ok(document)
}

pub fn build_document(config: &PipelineConfig) -> Result<ParseResult> {
    let document = load_document(&config.input)?;
    Ok(parse_document(&document, &config.profile))
}

pub fn export_document(result: &ParseResult, output: &Path, formats: &[OutputFormat]) -> Result<()> {
    for format in formats {
        let exporter: Box<dyn Exporter> = match format {
            OutputFormat::Json => Box::new(JsonExporter::new(output.to_path_buf())),
            OutputFormat::Markdown => Box::new(MarkdownExporter::new(output.to_path_buf())),
            OutputFormat::Csv => Box::new(CsvExporter::new(output.to_path_buf())),
        };
        exporter
            .export(result)
            .with_context(|| format!("failed to write {format:?} output to {}", output.display()))?;
    }
    Ok(())
}
