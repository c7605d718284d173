//! 管理後台送來的表單資料與回應格式。
//!
//! 表單欄位允許缺漏，缺漏與格式錯誤統一在 `into_draft` 轉成欄位層級的驗證錯誤。

use crate::domain::case_study::is_registered;
use crate::domain::model::{DeviceType, LayoutVariant, ProjectDraft, TeamMemberDraft};
use crate::utils::error::Result;
use crate::utils::validation::FieldErrors;
use serde::{Deserialize, Serialize};

const MIN_YEAR: i64 = 1900;
const MAX_YEAR: i64 = 2100;

/// 年份可以是數字或數字字串 (HTML 表單送出的是字串)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Number(i64),
    Text(String),
}

impl From<i32> for YearValue {
    fn from(year: i32) -> Self {
        YearValue::Number(i64::from(year))
    }
}

/// 未填 (缺漏或空字串) 回傳 `Ok(None)`，格式或範圍錯誤回傳訊息
fn parse_year(value: Option<YearValue>) -> std::result::Result<Option<i32>, String> {
    let number = match value {
        None => return Ok(None),
        Some(YearValue::Number(n)) => n,
        Some(YearValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .map_err(|_| "must be numeric".to_string())?
        }
    };

    if !(MIN_YEAR..=MAX_YEAR).contains(&number) {
        return Err(format!("must be between {} and {}", MIN_YEAR, MAX_YEAR));
    }
    Ok(Some(number as i32))
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPayload {
    pub name: String,
    pub client: String,
    pub summary: Option<String>,
    pub start_year: Option<YearValue>,
    pub end_year: Option<YearValue>,
    pub services: Vec<String>,
    pub industry: Vec<String>,
    pub website: Option<String>,
    pub hero_image: String,
    pub device_mockup: String,
    pub device_type: Option<String>,
    pub layout_variant: Option<String>,
    pub case_study: Option<String>,
    pub case_study_slug: Option<String>,
    pub coming_soon: bool,
}

impl ProjectPayload {
    pub fn into_draft(self) -> Result<ProjectDraft> {
        let mut errors = FieldErrors::new();

        let name = errors.required_text("name", &self.name);
        let client = errors.required_text("client", &self.client);
        let hero_image = errors.required_text("heroImage", &self.hero_image);
        let device_mockup = errors.required_text("deviceMockup", &self.device_mockup);
        let summary = errors.optional_text(self.summary);
        let website = errors.optional_url("website", self.website);
        let case_study = errors.optional_text(self.case_study);

        let start_year = match parse_year(self.start_year) {
            Ok(Some(year)) => Some(year),
            Ok(None) => {
                errors.push("startYear", "is required");
                None
            }
            Err(message) => {
                errors.push("startYear", message);
                None
            }
        };
        let end_year = parse_year(self.end_year).unwrap_or_else(|message| {
            errors.push("endYear", message);
            None
        });
        if let (Some(start), Some(end)) = (start_year, end_year) {
            if end < start {
                errors.push("endYear", "must not be before startYear");
            }
        }

        let device_type = match self.device_type.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("deviceType", "is required");
                None
            }
            Some(raw) => match raw.parse::<DeviceType>() {
                Ok(value) => Some(value),
                Err(_) => {
                    errors.push("deviceType", "must be one of: laptop, mobile");
                    None
                }
            },
        };

        let layout_variant = match self.layout_variant.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("layoutVariant", "is required");
                None
            }
            Some(raw) => match raw.parse::<LayoutVariant>() {
                Ok(value) => Some(value),
                Err(_) => {
                    errors.push("layoutVariant", "must be one of: A, B, C, D, E, F");
                    None
                }
            },
        };

        let case_study_slug = errors.optional_text(self.case_study_slug);
        if let Some(slug) = &case_study_slug {
            if !is_registered(slug) {
                errors.push("caseStudySlug", format!("unknown case study '{}'", slug));
            }
        }

        // 每個 None 都已記錄對應的欄位錯誤
        let (Some(start_year), Some(device_type), Some(layout_variant)) =
            (start_year, device_type, layout_variant)
        else {
            return Err(errors.into_error());
        };
        errors.into_result()?;

        Ok(ProjectDraft {
            name,
            client,
            summary,
            start_year,
            end_year,
            services: clean_list(self.services),
            industry: clean_list(self.industry),
            website,
            hero_image,
            device_mockup,
            device_type,
            layout_variant,
            case_study,
            case_study_slug,
            coming_soon: self.coming_soon,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMemberPayload {
    pub name: String,
    pub role: String,
    pub baby_photo: String,
    pub adult_photo: String,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub cv_link: Option<String>,
}

impl TeamMemberPayload {
    pub fn into_draft(self) -> Result<TeamMemberDraft> {
        let mut errors = FieldErrors::new();

        let name = errors.required_text("name", &self.name);
        let role = errors.required_text("role", &self.role);
        let baby_photo = errors.required_text("babyPhoto", &self.baby_photo);
        let adult_photo = errors.required_text("adultPhoto", &self.adult_photo);
        let linkedin = errors.optional_url("linkedin", self.linkedin);
        let cv_link = errors.optional_url("cvLink", self.cv_link);

        let email = errors.optional_text(self.email);
        if let Some(email) = &email {
            if !email.contains('@') || email.contains(char::is_whitespace) {
                errors.push("email", "must be a valid email address");
            }
        }

        errors.into_result()?;

        Ok(TeamMemberDraft {
            name,
            role,
            baby_photo,
            adult_photo,
            email,
            linkedin,
            cv_link,
        })
    }
}

/// 完整排列; 帶 expectedVersion 時版本不符會被拒絕
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderResponse {
    pub success: bool,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub collection: String,
    pub version: u64,
}
