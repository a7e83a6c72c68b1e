//! Pipeline – ties together field policies, section rendering, zone
//! assignment, pagination and emission into a single function call.
//!
//! Every stage before emission is format-independent, so [`compile_all`]
//! runs them once and fans the emitters out in parallel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use serde::Deserialize;

use crate::content::{ContentNode, RenderedSection, SectionItem};
use crate::emit::{self, Document, OutputFormat};
use crate::error::{CompileError, Warning};
use crate::fonts::FontManager;
use crate::images::{fetch_image, DataUriSource, ImageSource};
use crate::layout::{compute_geometry, A4_HEIGHT, A4_WIDTH};
use crate::layout_config::{LayoutConfig, Zone};
use crate::model::{non_blank, FieldMapping, Profile, SectionType, TemplateSection};
use crate::pagination::{distribute, HeightEstimator, Page, PlacedSection, DEFAULT_MAX_PAGES};
use crate::policy::{DefaultFieldTable, FieldPolicy};
use crate::richtext::{Block, Run};
use crate::sections::{render_section, select_projects};
use crate::style::StyleTokens;
use crate::zones::assign_zones;

pub const PLACEHOLDER_TEXT: &str = "No profile information available.";
pub const DEFAULT_TITLE: &str = "Profile";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything one compilation reads. Produced by the host application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompileRequest {
    pub profile: Option<Profile>,
    pub sections: Vec<TemplateSection>,
    pub field_mappings: Vec<FieldMapping>,
    pub layout: LayoutConfig,
    /// Document title override; defaults to the profile's full name.
    pub title: Option<String>,
}

impl CompileRequest {
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        serde_json::from_str(json).map_err(|e| CompileError::Input(format!("malformed request: {e}")))
    }
}

/// Runtime knobs for a compilation.
#[derive(Clone)]
pub struct CompileOptions {
    /// Page ceiling; content past it is truncated with a warning.
    pub max_pages: usize,
    pub image_timeout: Duration,
    /// Portrait sheet size in points; landscape layouts swap it.
    pub page_width: f32,
    pub page_height: f32,
    pub defaults: DefaultFieldTable,
    pub image_source: Arc<dyn ImageSource>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            image_timeout: Duration::from_secs(5),
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            defaults: DefaultFieldTable::builtin(),
            image_source: Arc::new(DataUriSource),
        }
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("max_pages", &self.max_pages)
            .field("image_timeout", &self.image_timeout)
            .field("page_width", &self.page_width)
            .field("page_height", &self.page_height)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Outcome of compiling one format.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub format: OutputFormat,
    pub success: bool,
    pub bytes: Option<Vec<u8>>,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub error_message: Option<String>,
    /// Recovered problems: skipped sections, omitted image, truncation.
    pub warnings: Vec<Warning>,
}

impl CompileResult {
    fn failure(format: OutputFormat, error: &CompileError, warnings: Vec<Warning>) -> Self {
        Self {
            format,
            success: false,
            bytes: None,
            mime_type: format.mime_type(),
            extension: format.extension(),
            error_message: Some(error.to_string()),
            warnings,
        }
    }
}

/// The format-independent result of every stage before emission.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub document: Document,
    pub tokens: StyleTokens,
    pub warnings: Vec<Warning>,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Run every format-independent stage. Only `Input` errors escape; all
/// other problems are recorded as warnings.
pub fn prepare(request: &CompileRequest, options: &CompileOptions) -> Result<Prepared, CompileError> {
    // 1. Validate
    let profile = request
        .profile
        .as_ref()
        .ok_or_else(|| CompileError::Input("no profile supplied".to_string()))?;
    if request.sections.is_empty() {
        return Err(CompileError::Input("template has no sections".to_string()));
    }

    let mut warnings = Vec::new();
    let mut record = |error: CompileError| {
        log::warn!("{error}");
        warnings.push(error.into_warning());
    };

    // 2. Resolve field policies in display order
    let mut ordered: Vec<&TemplateSection> = request.sections.iter().collect();
    ordered.sort_by_key(|s| s.display_order);
    let policies: Vec<FieldPolicy> = ordered
        .iter()
        .map(|s| FieldPolicy::for_section(s, &request.field_mappings, &options.defaults))
        .collect();

    // 3. Fetch the photo once, if any header shows it
    let image = photo_reference(profile, &ordered, &policies).and_then(|reference| {
        match fetch_image(Arc::clone(&options.image_source), reference, options.image_timeout) {
            Ok(image) => Some(image),
            Err(e) => {
                record(e);
                None
            }
        }
    });

    // 4. Render sections, skipping malformed ones
    let mut rendered = Vec::new();
    for (position, (section, policy)) in ordered.iter().zip(&policies).enumerate() {
        let scoped;
        let source = if section.section_type == SectionType::Projects {
            scoped = Profile {
                projects: select_projects(&profile.projects, section.styling_config.projects_to_view),
                ..profile.clone()
            };
            &scoped
        } else {
            profile
        };
        match render_section(section, source, policy) {
            Ok(r) if r.is_page_break() || r.item_count() > 0 => rendered.push(RenderedSection { position, ..r }),
            Ok(r) => log::debug!("Section '{}' has no content; omitted", r.id),
            Err(e) => record(e),
        }
    }
    log::debug!("Rendered {} section(s)", rendered.len());

    // 5. Zones, geometry, pagination
    let layout = &request.layout;
    let by_zone = assign_zones(layout.layout_type, rendered);
    let geometry = compute_geometry(layout, options.page_width, options.page_height);
    let tokens = StyleTokens::from_layout(layout);
    let fonts = FontManager::new();
    let estimator = HeightEstimator::new(&tokens, &fonts);
    let pagination = distribute(by_zone, &estimator, &geometry, options.max_pages);
    if let Some(t) = pagination.truncated {
        record(CompileError::PaginationOverflow {
            max_pages: t.max_pages,
            dropped_items: t.dropped_items,
        });
    }

    let mut pages = pagination.pages;
    if pages.iter().all(Page::is_empty) {
        pages = vec![placeholder_page()];
    }

    let title = non_blank(request.title.as_deref())
        .map(str::to_string)
        .or_else(|| profile.full_name())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Ok(Prepared {
        document: Document {
            title,
            layout_type: layout.layout_type,
            geometry,
            pages,
            image,
        },
        tokens,
        warnings,
    })
}

/// The photo reference of the first header section that shows it unmasked.
fn photo_reference<'a>(
    profile: &'a Profile,
    sections: &[&TemplateSection],
    policies: &[FieldPolicy],
) -> Option<&'a str> {
    let reference = non_blank(profile.image.as_deref())?;
    sections
        .iter()
        .zip(policies)
        .any(|(s, p)| {
            s.section_type == SectionType::General
                && p.is_visible("profile_image")
                && p.decision("profile_image").mask.is_none()
        })
        .then_some(reference)
}

fn placeholder_page() -> Page {
    let mut page = Page::default();
    page.zones.insert(
        Zone::Main,
        vec![PlacedSection {
            section_id: "placeholder".to_string(),
            section_type: SectionType::General,
            display_order: 0,
            title: None,
            items: vec![SectionItem::new(vec![ContentNode::Paragraph {
                blocks: vec![Block::Paragraph {
                    runs: vec![Run::plain(PLACEHOLDER_TEXT)],
                }],
            }])],
            continued: false,
            partial: false,
        }],
    );
    page
}

/// Serialize an already prepared document in one format.
pub fn emit_prepared(prepared: &Prepared, format: OutputFormat) -> CompileResult {
    let outcome = emit::emit(format, &prepared.document, &prepared.tokens)
        .map_err(|e| e.to_string())
        .and_then(|bytes| {
            if bytes.is_empty() {
                Err("empty output buffer".to_string())
            } else {
                Ok(bytes)
            }
        });
    match outcome {
        Ok(bytes) => CompileResult {
            format,
            success: true,
            bytes: Some(bytes),
            mime_type: format.mime_type(),
            extension: format.extension(),
            error_message: None,
            warnings: prepared.warnings.clone(),
        },
        Err(reason) => {
            let error = CompileError::Emitter {
                format: format.id().to_string(),
                reason,
            };
            log::error!("{error}");
            CompileResult::failure(format, &error, prepared.warnings.clone())
        }
    }
}

/// Compile `request` into one format.
pub fn compile(request: &CompileRequest, format: OutputFormat, options: &CompileOptions) -> CompileResult {
    match prepare(request, options) {
        Ok(prepared) => emit_prepared(&prepared, format),
        Err(error) => {
            log::error!("{error}");
            CompileResult::failure(format, &error, Vec::new())
        }
    }
}

/// Compile `request` into several formats. Shared stages run once; the
/// emitters run in parallel and one format's failure never affects another.
pub fn compile_all(
    request: &CompileRequest,
    formats: &[OutputFormat],
    options: &CompileOptions,
) -> Vec<CompileResult> {
    match prepare(request, options) {
        Ok(prepared) => formats
            .par_iter()
            .map(|format| emit_prepared(&prepared, *format))
            .collect(),
        Err(error) => {
            log::error!("{error}");
            formats
                .iter()
                .map(|format| CompileResult::failure(*format, &error, Vec::new()))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;
    use crate::model::{Experience, Project, Skill};

    fn request(sections: Vec<TemplateSection>) -> CompileRequest {
        CompileRequest {
            profile: Some(Profile {
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                email: Some("ada@example.com".into()),
                ..Profile::default()
            }),
            sections,
            ..CompileRequest::default()
        }
    }

    #[test]
    fn missing_profile_is_fatal() {
        let req = CompileRequest {
            sections: vec![TemplateSection::new("g", SectionType::General, 0)],
            ..CompileRequest::default()
        };
        let result = compile(&req, OutputFormat::Text, &CompileOptions::default());
        assert!(!result.success);
        assert!(result.bytes.is_none());
        assert!(result.error_message.unwrap().contains("no profile"));
    }

    #[test]
    fn projects_are_selected_before_rendering() {
        let mut section = TemplateSection::new("projects", SectionType::Projects, 1);
        section.styling_config.projects_to_view = Some(2);
        let mut req = request(vec![section]);
        if let Some(p) = req.profile.as_mut() {
            p.projects = [("old", None, "2018-01-01"), ("new", None, "2023-01-01"), ("pinned", Some(1), "2010-01-01")]
                .into_iter()
                .map(|(name, order, start)| Project {
                    name: Some(name.into()),
                    display_order: order,
                    start_date: Some(start.into()),
                    ..Project::default()
                })
                .collect();
        }
        let prepared = prepare(&req, &CompileOptions::default()).unwrap();
        let section = &prepared.document.flat_sections()[0];
        let names: Vec<String> = section.items.iter().map(|i| i.nodes[0].plain_text()).collect();
        assert_eq!(names, vec!["pinned", "new"]);
    }

    #[test]
    fn zero_sections_is_fatal() {
        let err = prepare(&request(Vec::new()), &CompileOptions::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn malformed_section_is_skipped_with_warning() {
        let mut req = request(vec![
            TemplateSection::new("g", SectionType::General, 0),
            TemplateSection::new("skills", SectionType::TechnicalSkills, 1),
        ]);
        if let Some(p) = req.profile.as_mut() {
            p.technical_skills = vec![Skill {
                name: Some("Rust".into()),
                proficiency: Some(11),
                ..Skill::default()
            }];
        }
        let prepared = prepare(&req, &CompileOptions::default()).unwrap();
        assert_eq!(prepared.warnings.len(), 1);
        assert_eq!(prepared.warnings[0].kind, WarningKind::SectionSkipped);
        let ids: Vec<_> = prepared.document.flat_sections().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["g"]);
    }

    #[test]
    fn empty_profile_gets_placeholder_page() {
        let req = CompileRequest {
            profile: Some(Profile::default()),
            sections: vec![TemplateSection::new("g", SectionType::General, 0)],
            ..CompileRequest::default()
        };
        let prepared = prepare(&req, &CompileOptions::default()).unwrap();
        assert_eq!(prepared.document.pages.len(), 1);
        assert_eq!(prepared.document.title, DEFAULT_TITLE);
        let text = emit::text::render_text(&prepared.document);
        assert!(text.contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn bad_photo_is_omitted_with_warning() {
        let mut req = request(vec![TemplateSection::new("g", SectionType::General, 0)]);
        if let Some(p) = req.profile.as_mut() {
            p.image = Some("https://example.com/me.png".into());
        }
        let prepared = prepare(&req, &CompileOptions::default()).unwrap();
        assert!(prepared.document.image.is_none());
        assert!(prepared.warnings.iter().any(|w| w.kind == WarningKind::ImageOmitted));
    }

    #[test]
    fn overflow_truncates_with_warning() {
        let mut req = request(vec![TemplateSection::new("exp", SectionType::Experience, 1)]);
        if let Some(p) = req.profile.as_mut() {
            p.experiences = (0..200)
                .map(|i| Experience {
                    company_name: Some(format!("Company {i}")),
                    designation: Some("Engineer".into()),
                    description: Some("<p>Built things that mattered to people.</p>".into()),
                    ..Experience::default()
                })
                .collect();
        }
        let options = CompileOptions {
            max_pages: 2,
            ..CompileOptions::default()
        };
        let prepared = prepare(&req, &options).unwrap();
        assert_eq!(prepared.document.pages.len(), 2);
        assert!(prepared.warnings.iter().any(|w| w.kind == WarningKind::PagesTruncated));
    }

    #[test]
    fn title_prefers_override_then_name() {
        let mut req = request(vec![TemplateSection::new("g", SectionType::General, 0)]);
        assert_eq!(prepare(&req, &CompileOptions::default()).unwrap().document.title, "Ada Lovelace");
        req.title = Some("CV".into());
        assert_eq!(prepare(&req, &CompileOptions::default()).unwrap().document.title, "CV");
    }

    #[test]
    fn compile_all_keeps_format_order() {
        let req = request(vec![TemplateSection::new("g", SectionType::General, 0)]);
        let results = compile_all(&req, &OutputFormat::ALL, &CompileOptions::default());
        let formats: Vec<_> = results.iter().map(|r| r.format).collect();
        assert_eq!(formats, OutputFormat::ALL.to_vec());
        assert!(results.iter().all(|r| r.success));
    }

    #[test]
    fn request_from_json_defaults_missing_keys() {
        let req = CompileRequest::from_json(
            r#"{"profile": {"first_name": "Ada"}, "sections": [{"id": "g", "section_type": "general"}]}"#,
        )
        .unwrap();
        assert_eq!(req.sections[0].display_order, 0);
        assert!(CompileRequest::from_json("{not json").is_err());
    }
}
