use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 兩個獨立排序的集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Projects,
    Team,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Team => "team",
        }
    }

    /// 顯示這個集合排序的頁面，公開列表快取也存在第一個路徑下
    pub fn listing_pages(&self) -> &'static [&'static str] {
        match self {
            Collection::Projects => &["/", "/admin/projects"],
            Collection::Team => &["/about", "/admin/team"],
        }
    }

    pub fn public_listing_page(&self) -> &'static str {
        self.listing_pages()[0]
    }

    /// 單筆詳細頁，只有作品有
    pub fn detail_page(&self, id: &str) -> Option<String> {
        match self {
            Collection::Projects => Some(format!("/work/{}", id)),
            Collection::Team => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Laptop,
    Mobile,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Laptop => "laptop",
            DeviceType::Mobile => "mobile",
        }
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "laptop" => Ok(DeviceType::Laptop),
            "mobile" => Ok(DeviceType::Mobile),
            other => Err(format!("unknown device type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutVariant {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl LayoutVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutVariant::A => "A",
            LayoutVariant::B => "B",
            LayoutVariant::C => "C",
            LayoutVariant::D => "D",
            LayoutVariant::E => "E",
            LayoutVariant::F => "F",
        }
    }
}

impl FromStr for LayoutVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(LayoutVariant::A),
            "B" => Ok(LayoutVariant::B),
            "C" => Ok(LayoutVariant::C),
            "D" => Ok(LayoutVariant::D),
            "E" => Ok(LayoutVariant::E),
            "F" => Ok(LayoutVariant::F),
            other => Err(format!("unknown layout variant '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub client: String,
    pub summary: Option<String>,
    pub start_year: i32,
    /// None 代表仍在進行中
    pub end_year: Option<i32>,
    pub services: Vec<String>,
    pub industry: Vec<String>,
    pub website: Option<String>,
    pub hero_image: String,
    pub device_mockup: String,
    pub device_type: DeviceType,
    pub layout_variant: LayoutVariant,
    pub case_study: Option<String>,
    pub case_study_slug: Option<String>,
    pub coming_soon: bool,
    pub order: i64,
}

/// 作品的可編輯欄位，已通過驗證
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub client: String,
    pub summary: Option<String>,
    pub start_year: i32,
    pub end_year: Option<i32>,
    pub services: Vec<String>,
    pub industry: Vec<String>,
    pub website: Option<String>,
    pub hero_image: String,
    pub device_mockup: String,
    pub device_type: DeviceType,
    pub layout_variant: LayoutVariant,
    pub case_study: Option<String>,
    pub case_study_slug: Option<String>,
    pub coming_soon: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub baby_photo: String,
    pub adult_photo: String,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub cv_link: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMemberDraft {
    pub name: String,
    pub role: String,
    pub baby_photo: String,
    pub adult_photo: String,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub cv_link: Option<String>,
}

/// 可排序集合的成員，作品與團隊共用同一套排序協定
pub trait OrderedEntity: Clone + Send + Sync + Serialize + 'static {
    type Draft: Clone + Send + Sync + 'static;

    const COLLECTION: Collection;
    const LABEL: &'static str;

    fn id(&self) -> &str;
    fn order(&self) -> i64;
    fn set_order(&mut self, order: i64);
    fn from_draft(id: String, order: i64, draft: Self::Draft) -> Self;

    /// 公開頁面看到的版本，預設與後台相同
    fn public_view(&self) -> Self {
        self.clone()
    }
}

impl OrderedEntity for Project {
    type Draft = ProjectDraft;

    const COLLECTION: Collection = Collection::Projects;
    const LABEL: &'static str = "Project";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    /// 即將推出的作品不對外公開案例內容
    fn public_view(&self) -> Self {
        let mut project = self.clone();
        if project.coming_soon {
            project.case_study = None;
            project.case_study_slug = None;
        }
        project
    }

    fn from_draft(id: String, order: i64, draft: ProjectDraft) -> Self {
        Project {
            id,
            name: draft.name,
            client: draft.client,
            summary: draft.summary,
            start_year: draft.start_year,
            end_year: draft.end_year,
            services: draft.services,
            industry: draft.industry,
            website: draft.website,
            hero_image: draft.hero_image,
            device_mockup: draft.device_mockup,
            device_type: draft.device_type,
            layout_variant: draft.layout_variant,
            case_study: draft.case_study,
            case_study_slug: draft.case_study_slug,
            coming_soon: draft.coming_soon,
            order,
        }
    }
}

impl OrderedEntity for TeamMember {
    type Draft = TeamMemberDraft;

    const COLLECTION: Collection = Collection::Team;
    const LABEL: &'static str = "Team member";

    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    fn from_draft(id: String, order: i64, draft: TeamMemberDraft) -> Self {
        TeamMember {
            id,
            name: draft.name,
            role: draft.role,
            baby_photo: draft.baby_photo,
            adult_photo: draft.adult_photo,
            email: draft.email,
            linkedin: draft.linkedin,
            cv_link: draft.cv_link,
            order,
        }
    }
}

/// 已登入的呼叫者身分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// 比對用的正規化 email
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
