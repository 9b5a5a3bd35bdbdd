//! File triage (§4.D): media-vs-text by extension, then SQL-vs-NoSQL
//! structural scoring for everything that isn't media.

pub mod signals;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::Modality;
use signals::ScoreCard;

const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];
const VIDEO_EXTS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
const AUDIO_EXTS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StructuralClass {
    Sql,
    NoSql,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub is_media: bool,
    pub modality: Modality,
    pub structural_class: Option<StructuralClass>,
    pub sql_score: i32,
    pub nosql_score: i32,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Stage 1: media detection by extension. Unknown extensions fall through
/// to text (§4.D).
pub fn classify_modality(path: &Path) -> Modality {
    let ext = extension_of(path);
    if IMAGE_EXTS.contains(&ext.as_str()) {
        Modality::Image
    } else if VIDEO_EXTS.contains(&ext.as_str()) {
        Modality::Video
    } else if AUDIO_EXTS.contains(&ext.as_str()) {
        Modality::Audio
    } else {
        Modality::Text
    }
}

/// Stage 2: SQL-vs-NoSQL scoring on the extracted text of a non-media file.
/// `ext` drives which parser is consulted; `extracted_text` is the raw
/// Unicode payload already produced by the text extractor.
pub fn classify_structure(ext: &str, extracted_text: &str) -> (i32, i32, Vec<String>) {
    let mut card = ScoreCard::default();

    match ext {
        "csv" => {
            let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(extracted_text.as_bytes());
            let record_count = reader.records().filter_map(Result::ok).count();
            signals::score_tabular(&mut card, record_count);
        }
        "json" => {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(extracted_text) {
                signals::score_json(&mut card, &value);
            } else {
                signals::score_plain_text(&mut card);
            }
        }
        "yaml" | "yml" => {
            if let Ok(value) = serde_yaml::from_str::<serde_json::Value>(extracted_text) {
                signals::score_json(&mut card, &value);
            } else {
                signals::score_plain_text(&mut card);
            }
        }
        "xml" => match roxmltree::Document::parse(extracted_text) {
            Ok(doc) => {
                let depth = xml_max_depth(doc.root_element(), 0);
                let repeating = xml_has_repeating_children(doc.root_element());
                signals::score_xml(&mut card, depth, repeating);
            }
            Err(_) => signals::score_plain_text(&mut card),
        },
        "html" | "htm" => signals::score_html(&mut card, extracted_text),
        "txt" | "md" | "log" => signals::score_plain_text(&mut card),
        _ => signals::score_plain_text(&mut card),
    }

    let reasons = card.hits.iter().map(|h| h.reason.clone()).collect();
    (card.sql, card.nosql, reasons)
}

fn xml_max_depth(node: roxmltree::Node, depth: usize) -> usize {
    node.children()
        .filter(|c| c.is_element())
        .map(|c| xml_max_depth(c, depth + 1))
        .max()
        .unwrap_or(depth)
}

fn xml_has_repeating_children(node: roxmltree::Node) -> bool {
    let mut tags: Vec<&str> = node.children().filter(|c| c.is_element()).map(|c| c.tag_name().name()).collect();
    tags.sort_unstable();
    tags.windows(2).any(|w| w[0] == w[1])
}

/// Runs both classification stages, producing the full report (§4.D). For
/// media files the structural stage is skipped entirely; the SQL branch
/// remains disabled downstream regardless of `structural_class` (the
/// decision is still reported, never acted on — see the open question on
/// the disabled SQL branch).
pub fn classify(path: &Path, extracted_text: Option<&str>) -> ClassificationReport {
    let modality = classify_modality(path);
    if modality != Modality::Text {
        return ClassificationReport {
            is_media: true,
            modality,
            structural_class: None,
            sql_score: 0,
            nosql_score: 0,
            confidence: 0.0,
            reasons: vec![],
        };
    }

    let ext = extension_of(path);
    let text = extracted_text.unwrap_or("");
    let (sql, nosql, reasons) = classify_structure(&ext, text);
    let card = ScoreCard { sql, nosql, hits: vec![] };
    let structural_class = Some(if card.is_sql() { StructuralClass::Sql } else { StructuralClass::NoSql });

    ClassificationReport {
        is_media: false,
        modality: Modality::Text,
        structural_class,
        sql_score: sql,
        nosql_score: nosql,
        confidence: card.confidence(),
        reasons,
    }
}
