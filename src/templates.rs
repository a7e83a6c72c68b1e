//! Sample profile and templates for testing and demonstration.
//!
//! Each template exercises a different layout and a different mix of
//! section options.

use std::collections::BTreeSet;

use crate::layout_config::{LayoutConfig, LayoutType};
use crate::model::{
    Achievement, Education, Experience, FieldConfig, Placement, Profile, Project, Reference,
    SectionType, Skill, TemplateSection, Training,
};
use crate::pipeline::CompileRequest;

/// 1×1 PNG used as the sample photo.
pub const SAMPLE_PHOTO: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

fn skill(name: &str, proficiency: i32, priority: i32) -> Skill {
    Skill {
        name: some(name),
        proficiency: Some(proficiency),
        priority: Some(priority),
    }
}

/// A fully populated profile touching every section type.
pub fn sample_profile() -> Profile {
    Profile {
        first_name: some("Grace"),
        last_name: some("Hopper"),
        email: some("grace.hopper@example.com"),
        phone: some("+1 555 0100"),
        location: some("Arlington, VA"),
        designation: some("Computer Scientist"),
        biography: some(
            "<p>Pioneer of <strong>machine-independent</strong> programming languages.</p>\
             <p>Led the team behind <em>FLOW-MATIC</em>.</p>",
        ),
        image: some(SAMPLE_PHOTO),
        experiences: vec![
            Experience {
                company_name: some("Remington Rand"),
                designation: some("Senior Mathematician"),
                location: some("Philadelphia, PA"),
                start_date: some("1949-06-01"),
                end_date: some("1967-08-01"),
                is_current: false,
                description: some(
                    "<ul><li>Developed the A-0 compiler</li>\
                     <li>Designed <b>FLOW-MATIC</b></li></ul>",
                ),
            },
            Experience {
                company_name: some("US Navy"),
                designation: some("Rear Admiral"),
                location: some("Washington, DC"),
                start_date: some("1967-08-01"),
                end_date: None,
                is_current: true,
                description: some("<p>Standardised COBOL across the Navy.<br>Retired 1986.</p>"),
            },
        ],
        education: vec![Education {
            degree: some("PhD, Mathematics"),
            institution: some("Yale University"),
            start_date: some("1930-09-01"),
            end_date: some("1934-06-01"),
            grade: None,
            description: None,
        }],
        projects: vec![
            Project {
                name: some("COBOL"),
                role: some("Technical adviser"),
                description: some("<p>Common business-oriented language.</p>"),
                technologies: vec!["COBOL".into(), "UNIVAC".into()],
                url: None,
                start_date: some("1959-05-28"),
                end_date: some("1960-04-01"),
                display_order: Some(1),
            },
            Project {
                name: some("A-0 System"),
                role: some("Author"),
                description: None,
                technologies: vec!["UNIVAC I".into()],
                url: None,
                start_date: some("1951-01-01"),
                end_date: some("1952-12-01"),
                display_order: Some(2),
            },
        ],
        technical_skills: vec![
            skill("Compilers", 10, 1),
            skill("COBOL", 9, 2),
            skill("Assembly", 8, 3),
            skill("Mathematics", 9, 4),
        ],
        specialized_skills: vec![skill("Teaching", 9, 1), skill("Leadership", 8, 2)],
        trainings: vec![Training {
            title: some("Naval Reserve Midshipmen's School"),
            provider: some("US Navy"),
            date: some("1944-06-01"),
            description: None,
        }],
        achievements: vec![Achievement {
            name: some("National Medal of Technology"),
            date: some("1991-09-16"),
            description: some("<p>First woman to receive it individually.</p>"),
        }],
        references: vec![
            Reference {
                id: "ref-aiken".into(),
                name: some("Howard Aiken"),
                designation: some("Director"),
                company: some("Harvard Computation Lab"),
                email: some("aiken@example.com"),
                phone: None,
            },
            Reference {
                id: "ref-unused".into(),
                name: some("Not Selected"),
                ..Reference::default()
            },
        ],
    }
}

fn section(id: &str, section_type: SectionType, order: i32) -> TemplateSection {
    TemplateSection::new(id, section_type, order)
}

fn in_sidebar(mut s: TemplateSection) -> TemplateSection {
    s.styling_config.layout_placement = Some(Placement::Sidebar);
    s
}

fn references(order: i32) -> TemplateSection {
    let mut s = section("references", SectionType::References, order);
    s.styling_config.selected_references = BTreeSet::from(["ref-aiken".to_string()]);
    s
}

/// Every section type in one column, with a page break before training.
pub fn classic_template() -> Vec<TemplateSection> {
    let mut general = section("general", SectionType::General, 0);
    // Phone masked with the default mask; everything else from the defaults.
    general.styling_config.fields = vec![
        FieldConfig::new("profile_image", "Photo", 1),
        FieldConfig::new("first_name", "First Name", 2),
        FieldConfig::new("last_name", "Last Name", 3),
        FieldConfig::new("designation", "Designation", 4),
        FieldConfig::new("email", "Email", 5),
        FieldConfig {
            masked: true,
            ..FieldConfig::new("phone", "Phone", 6)
        },
        FieldConfig::new("biography", "Biography", 7),
    ];
    let mut projects = section("projects", SectionType::Projects, 3);
    projects.styling_config.projects_to_view = Some(1);
    let mut skills = section("skills", SectionType::TechnicalSkills, 4);
    skills.display_name = some("Core Skills");
    skills.styling_config.max_skills_count = Some(3);

    vec![
        general,
        section("experience", SectionType::Experience, 1),
        section("education", SectionType::Education, 2),
        projects,
        skills,
        section("break", SectionType::PageBreak, 5),
        section("training", SectionType::Training, 6),
        section("achievements", SectionType::Achievements, 7),
        references(8),
    ]
}

/// Main column plus a secondary column for skills and training.
pub fn two_column_template() -> Vec<TemplateSection> {
    vec![
        section("general", SectionType::General, 0),
        section("experience", SectionType::Experience, 1),
        in_sidebar(section("skills", SectionType::TechnicalSkills, 2)),
        in_sidebar(section("specialized", SectionType::SpecializedSkills, 3)),
        section("projects", SectionType::Projects, 4),
        in_sidebar(section("training", SectionType::Training, 5)),
    ]
}

/// Header and skills in a tinted sidebar, history in the main column.
pub fn sidebar_template() -> Vec<TemplateSection> {
    vec![
        in_sidebar(section("general", SectionType::General, 0)),
        in_sidebar(section("skills", SectionType::TechnicalSkills, 1)),
        section("experience", SectionType::Experience, 2),
        section("education", SectionType::Education, 3),
        in_sidebar(references(4)),
        section("achievements", SectionType::Achievements, 5),
    ]
}

/// The sample profile paired with the template for `layout_type`.
pub fn sample_request(layout_type: LayoutType) -> CompileRequest {
    let sections = match layout_type {
        LayoutType::SingleColumn => classic_template(),
        LayoutType::TwoColumn => two_column_template(),
        LayoutType::Sidebar => sidebar_template(),
    };
    CompileRequest {
        profile: Some(sample_profile()),
        sections,
        field_mappings: Vec::new(),
        layout: LayoutConfig {
            layout_type,
            ..LayoutConfig::default()
        },
        title: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_have_unique_orders() {
        for sections in [classic_template(), two_column_template(), sidebar_template()] {
            let mut orders: Vec<i32> = sections.iter().map(|s| s.display_order).collect();
            orders.sort_unstable();
            orders.dedup();
            assert_eq!(orders.len(), sections.len());
        }
    }

    #[test]
    fn sample_requests_prepare_cleanly() {
        let options = crate::pipeline::CompileOptions::default();
        for layout in [LayoutType::SingleColumn, LayoutType::TwoColumn, LayoutType::Sidebar] {
            let prepared = crate::pipeline::prepare(&sample_request(layout), &options).unwrap();
            assert!(prepared.warnings.is_empty(), "{layout:?}: {:?}", prepared.warnings);
            assert!(prepared.document.image.is_some());
            assert_eq!(prepared.document.title, "Grace Hopper");
        }
    }
}
