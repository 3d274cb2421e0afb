use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::error::ProcuraError;
use crate::images::{sanitize_name, ExtractedImages, ImageExtractor};

/// Extracts pictures embedded in an xlsx workbook.
///
/// An xlsx file is a zip archive; pictures live under `xl/media/` and are
/// placed on sheets via drawingML parts that record a cell anchor. The
/// anchor row gives us the association between a picture and the catalog
/// row it illustrates. Anchor rows in drawingML are 0-based; stored rows
/// are 1-based document rows to line up with `source_row`.
pub struct XlsxImageExtractor;

impl ImageExtractor for XlsxImageExtractor {
    fn extract_images(
        &self,
        bytes: &[u8],
        out_dir: &Path,
    ) -> Result<ExtractedImages, ProcuraError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| ProcuraError::UnreadableSource(format!("not a zip archive: {e}")))?;

        let sheet_names = parse_sheet_names(&read_entry(&mut archive, "xl/workbook.xml")?);
        std::fs::create_dir_all(out_dir)?;

        let mut result = ExtractedImages::default();
        let mut seq = 0usize;

        for (sheet_idx, sheet_name) in sheet_names.iter().enumerate() {
            let sheet_no = sheet_idx + 1;
            let rels_path = format!("xl/worksheets/_rels/sheet{sheet_no}.xml.rels");
            let Ok(rels_xml) = read_entry(&mut archive, &rels_path) else {
                continue; // sheet has no relationships, so no drawings
            };

            let Some(drawing_target) = parse_rels(&rels_xml)
                .into_iter()
                .find(|rel| rel.rel_type.ends_with("/drawing"))
                .map(|rel| resolve_target("xl/worksheets", &rel.target))
            else {
                continue;
            };

            let Ok(drawing_xml) = read_entry(&mut archive, &drawing_target) else {
                warn!(sheet = %sheet_name, "drawing part missing from archive");
                continue;
            };
            let drawing_rels_path = rels_path_for(&drawing_target);
            let media_rels = match read_entry(&mut archive, &drawing_rels_path) {
                Ok(xml) => parse_rels(&xml),
                Err(_) => continue,
            };

            for anchor in parse_drawing_anchors(&drawing_xml) {
                let Some(media_target) = media_rels
                    .iter()
                    .find(|rel| rel.id == anchor.rel_id)
                    .map(|rel| resolve_target("xl/drawings", &rel.target))
                else {
                    continue;
                };

                let image_bytes = match read_entry_bytes(&mut archive, &media_target) {
                    Ok(bytes) if !bytes.is_empty() => bytes,
                    _ => {
                        warn!(media = %media_target, "skipping image with unusable payload");
                        continue;
                    }
                };

                let ext = media_target
                    .rsplit_once('.')
                    .map(|(_, ext)| ext)
                    .unwrap_or("png");
                let document_row = anchor.row + 1;
                seq += 1;
                let file_name = format!(
                    "{}_row{}_{}.{}",
                    sanitize_name(sheet_name),
                    document_row,
                    seq,
                    ext
                );
                let path = out_dir.join(file_name);
                if let Err(e) = std::fs::write(&path, &image_bytes) {
                    warn!(path = %path.display(), "failed to write image: {e}");
                    continue;
                }
                result
                    .anchored
                    .insert((sheet_name.clone(), document_row), path);
            }
        }

        Ok(result)
    }

    fn backend_name(&self) -> &str {
        "xlsx-drawingml"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// One picture anchor from a drawing part: the 0-based anchor row and the
/// relationship id of the picture it places.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DrawingAnchor {
    pub row: u32,
    pub rel_id: String,
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<String, ProcuraError> {
    let bytes = read_entry_bytes(archive, name)?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

fn read_entry_bytes<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, ProcuraError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ProcuraError::UnreadableSource(format!("missing archive entry {name}: {e}")))?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Ordered sheet names from xl/workbook.xml.
pub(crate) fn parse_sheet_names(xml: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"name" {
                            if let Ok(value) = attr.unescape_value() {
                                names.push(value.to_string());
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    names
}

/// Relationships from a .rels part.
pub(crate) fn parse_rels(xml: &str) -> Vec<Relationship> {
    let mut rels = Vec::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    for attr in e.attributes().flatten() {
                        let value = match attr.unescape_value() {
                            Ok(v) => v.to_string(),
                            Err(_) => continue,
                        };
                        match attr.key.local_name().as_ref() {
                            b"Id" => id = value,
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            _ => {}
                        }
                    }
                    if !id.is_empty() && !target.is_empty() {
                        rels.push(Relationship {
                            id,
                            rel_type,
                            target,
                        });
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    rels
}

/// Picture anchors from a drawing part.
///
/// Only the `from` corner of an anchor is read; `to` rows describe extent,
/// not placement. Pictures without a `from` row (absolute anchors) are
/// skipped, per the rule that an unanchorable image is simply unused.
pub(crate) fn parse_drawing_anchors(xml: &str) -> Vec<DrawingAnchor> {
    let mut anchors = Vec::new();
    let mut reader = Reader::from_str(xml);

    let mut in_from = false;
    let mut in_from_row = false;
    let mut current_row: Option<u32> = None;
    let mut current_rel: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"from" => in_from = true,
                b"row" if in_from => in_from_row = true,
                b"blip" => {
                    if let Some(id) = blip_embed_id(&e) {
                        current_rel = Some(id);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"blip" {
                    if let Some(id) = blip_embed_id(&e) {
                        current_rel = Some(id);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if in_from_row {
                    if let Ok(text) = t.unescape() {
                        current_row = text.trim().parse().ok();
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"from" => in_from = false,
                b"row" => in_from_row = false,
                b"twoCellAnchor" | b"oneCellAnchor" | b"absoluteAnchor" => {
                    if let (Some(row), Some(rel_id)) = (current_row.take(), current_rel.take()) {
                        anchors.push(DrawingAnchor { row, rel_id });
                    }
                    current_row = None;
                    current_rel = None;
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    anchors
}

fn blip_embed_id(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"embed" {
            if let Ok(value) = attr.unescape_value() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Resolve a relationship target against its part's base directory.
/// Handles the "../media/image1.png" form common producers emit.
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        return stripped.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for piece in target.split('/') {
        match piece {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}
