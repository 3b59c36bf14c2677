use std::path::Path;

use cantos_core::config::PageRange;
use cantos_core::page::{Page, SpanBlock, SpanLine, TextSpan};
use indicatif::{ProgressBar, ProgressStyle};

use crate::prelude::*;

/// Decoded pages plus the ones that could not be read.
#[derive(Debug, Default)]
pub struct PageSource {
    pub pages: Vec<Page>,
    pub skipped: Vec<u32>,
}

/// Convert decoded positioned text into the core page model.
pub fn to_page(text: pdf::PageText) -> Page {
    let blocks = text
        .blocks
        .into_iter()
        .map(|block| {
            SpanBlock::new(
                block
                    .lines
                    .into_iter()
                    .map(|line| {
                        SpanLine::new(
                            line.spans
                                .into_iter()
                                .map(|s| TextSpan::new(s.text, s.font_size, s.x, s.y))
                                .collect(),
                        )
                    })
                    .collect(),
            )
        })
        .collect();
    Page::new(text.number, blocks)
}

pub fn open(path: &Path) -> Result<pdf::Document> {
    pdf::Document::open(path).wrap_err_with(|| f!("Failed to open PDF {}", path.display()))
}

/// One-line description of the document for headers and logs.
pub fn describe_document(meta: &pdf::DocumentMetadata) -> String {
    let title = meta.title.as_deref().unwrap_or("untitled");
    match &meta.author {
        Some(author) => f!("{title} by {author} ({} pages)", meta.page_count),
        None => f!("{title} ({} pages)", meta.page_count),
    }
}

/// Decode every page of `range`, in order, skipping pages that fail.
pub fn read_pages(doc: &pdf::Document, range: &PageRange) -> Result<PageSource> {
    let pages = range.pages(doc.page_count());
    let total = pages.clone().count() as u64;

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .wrap_err("Invalid progress template")?,
    );

    let mut source = PageSource::default();
    for number in pages {
        bar.set_message(f!("page {number}"));
        match doc.page(number) {
            Ok(text) => source.pages.push(to_page(text)),
            Err(e) => {
                log::warn!("skipping page {number}: {e}");
                source.skipped.push(number);
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    log::info!(
        "decoded {} page(s), skipped {}",
        source.pages.len(),
        source.skipped.len()
    );
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_span(text: &str, size: f32, y: f32) -> pdf::TextSpan {
        pdf::TextSpan {
            text: text.to_string(),
            x: 50.0,
            y,
            width: 10.0,
            font_size: size,
            font_name: "Times-Roman".to_string(),
        }
    }

    #[test]
    fn test_to_page_keeps_structure_and_geometry() {
        let text = pdf::PageText {
            number: 12,
            height: 600.0,
            blocks: vec![
                pdf::TextBlock {
                    lines: vec![pdf::TextLine {
                        spans: vec![pdf_span("ROCA DE LA ETERNIDAD", 12.0, 60.0)],
                        ..Default::default()
                    }],
                },
                pdf::TextBlock {
                    lines: vec![pdf::TextLine {
                        spans: vec![pdf_span("Himno ", 11.0, 560.0), pdf_span("7", 28.0, 560.0)],
                        ..Default::default()
                    }],
                },
            ],
        };

        let page = to_page(text);
        assert_eq!(page.number, 12);
        assert_eq!(page.blocks.len(), 2);
        assert_eq!(page.blocks[0].lines[0].text(), "ROCA DE LA ETERNIDAD");
        assert_eq!(page.blocks[1].lines[0].text(), "Himno 7");

        let numeral = &page.blocks[1].lines[0].spans[1];
        assert_eq!(numeral.size, 28.0);
        assert_eq!(numeral.y, 560.0);
    }

    #[test]
    fn test_open_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("himnario.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = open(&path).unwrap_err();
        assert!(f!("{err:?}").contains("himnario.pdf"));
    }

    #[test]
    fn test_describe_document() {
        let meta = pdf::DocumentMetadata {
            title: Some("Himnario Adventista".into()),
            author: Some("IASD".into()),
            page_count: 412,
        };
        assert_eq!(
            describe_document(&meta),
            "Himnario Adventista by IASD (412 pages)"
        );

        let untitled = pdf::DocumentMetadata {
            page_count: 3,
            ..Default::default()
        };
        assert_eq!(describe_document(&untitled), "untitled (3 pages)");
    }
}
