use crate::domain::model::Project;
use serde::Serialize;

/// 手工排版的案例頁面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseStudyEntry {
    pub slug: &'static str,
    pub title: &'static str,
}

pub const CASE_STUDIES: &[CaseStudyEntry] = &[
    CaseStudyEntry {
        slug: "harbor-bank",
        title: "Harbor Bank: rebuilding everyday banking",
    },
    CaseStudyEntry {
        slug: "fieldnotes",
        title: "Fieldnotes: a research journal for ecologists",
    },
    CaseStudyEntry {
        slug: "lumen-health",
        title: "Lumen Health: patient onboarding",
    },
    CaseStudyEntry {
        slug: "orbit-mobility",
        title: "Orbit Mobility: one app for every ride",
    },
];

pub fn find_case_study(slug: &str) -> Option<&'static CaseStudyEntry> {
    CASE_STUDIES.iter().find(|entry| entry.slug == slug)
}

pub fn is_registered(slug: &str) -> bool {
    find_case_study(slug).is_some()
}

/// 公開案例頁要顯示的內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CaseStudyView {
    ComingSoon,
    Custom { slug: String, title: String },
    Markdown { body: String },
}

/// 決定案例頁的呈現方式
///
/// comingSoon 優先於一切；其次是已登記的 slug；最後才是 markdown。
/// 三者皆無時回傳 None。
pub fn resolve_case_study(project: &Project) -> Option<CaseStudyView> {
    if project.coming_soon {
        return Some(CaseStudyView::ComingSoon);
    }

    if let Some(entry) = project.case_study_slug.as_deref().and_then(find_case_study) {
        return Some(CaseStudyView::Custom {
            slug: entry.slug.to_string(),
            title: entry.title.to_string(),
        });
    }

    project
        .case_study
        .as_ref()
        .filter(|body| !body.trim().is_empty())
        .map(|body| CaseStudyView::Markdown { body: body.clone() })
}
