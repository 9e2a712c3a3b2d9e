use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{lenient_int, lenient_int_opt};

/// One element of a project list field (`team_members`, `milestones`, ...).
/// Free-form object; `media` is filled by the per-index upload route.
pub type ListItem = Map<String, Value>;

// ── Users ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub youtube: String,
    pub instagram: String,
    pub github: String,
    pub twitter: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub digest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seeking {
    pub creator: bool,
    pub brand: bool,
    pub freelancer: bool,
    pub contractor: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub media: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub issue_date: String,
    pub expiry_date: String,
    pub credential_url: String,
    pub media: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accolade {
    pub title: String,
    pub issuer: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endorsement {
    pub name: String,
    pub position: String,
    pub company: String,
    pub text: String,
}

/// Shared shape of `featured_projects` and `case_studies` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Showcase {
    pub title: String,
    pub description: String,
    pub url: String,
    pub media: String,
}

/// A dependent collection of a user, persisted in its own child table.
#[derive(Debug)]
pub struct ChildTable {
    /// Key in the nested user shape.
    pub field: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

pub const USER_COLLECTIONS: &[ChildTable] = &[
    ChildTable {
        field: "work_experience",
        table: "user_work_experience",
        columns: &[
            "title",
            "company",
            "location",
            "start_date",
            "end_date",
            "description",
            "media",
        ],
    },
    ChildTable {
        field: "education",
        table: "user_education",
        columns: &["school", "degree", "field_of_study", "start_date", "end_date", "description"],
    },
    ChildTable {
        field: "certifications",
        table: "user_certifications",
        columns: &["name", "issuer", "issue_date", "expiry_date", "credential_url", "media"],
    },
    ChildTable {
        field: "accolades",
        table: "user_accolades",
        columns: &["title", "issuer", "date", "description"],
    },
    ChildTable {
        field: "endorsements",
        table: "user_endorsements",
        columns: &["name", "position", "company", "text"],
    },
    ChildTable {
        field: "featured_projects",
        table: "user_featured_projects",
        columns: &["title", "description", "url", "media"],
    },
    ChildTable {
        field: "case_studies",
        table: "user_case_studies",
        columns: &["title", "description", "url", "media"],
    },
];

/// Nested user aggregate as returned by the API. The password hash never
/// appears here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile_image: String,
    pub bio: String,
    pub user_type: String,
    pub career_title: String,
    #[serde(deserialize_with = "lenient_int")]
    pub career_experience: i64,
    pub social_media_handle: String,
    #[serde(deserialize_with = "lenient_int")]
    pub social_media_followers: i64,
    pub company: String,
    pub company_location: String,
    pub company_website: String,
    pub contract_type: String,
    pub contract_duration: String,
    pub contract_rate: String,
    pub availability_status: String,
    pub preferred_work_type: String,
    pub rate_range: String,
    pub currency: String,
    pub standard_rate: String,
    pub rate_type: String,
    pub compensation_type: String,
    pub website: String,
    pub social_links: SocialLinks,
    pub notification_preferences: NotificationPreferences,
    pub skills: Vec<String>,
    pub expertise: Vec<String>,
    pub target_audience: Vec<String>,
    pub solutions_offered: Vec<String>,
    pub interest_tags: Vec<String>,
    pub experience_tags: Vec<String>,
    pub education_tags: Vec<String>,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub accolades: Vec<Accolade>,
    pub endorsements: Vec<Endorsement>,
    pub featured_projects: Vec<Showcase>,
    pub case_studies: Vec<Showcase>,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile edit payload. Absent keys are left untouched; a present
/// collection replaces the stored one wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_int_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub career_experience: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media_handle: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_int_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub social_media_followers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_work_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_preferences: Option<NotificationPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solutions_offered: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_experience: Option<Vec<WorkExperience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<Certification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accolades: Option<Vec<Accolade>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endorsements: Option<Vec<Endorsement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_projects: Option<Vec<Showcase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_studies: Option<Vec<Showcase>>,
}

// ── Projects ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub project_name: String,
    pub project_description: String,
    pub project_type: String,
    pub project_category: String,
    pub project_image: String,
    pub project_title: String,
    pub project_duration: String,
    pub project_handle: String,
    #[serde(deserialize_with = "lenient_int")]
    pub project_followers: i64,
    pub client: String,
    pub client_location: String,
    pub client_website: String,
    pub contract_type: String,
    pub contract_duration: String,
    pub contract_value: String,
    pub project_timeline: String,
    pub budget: String,
    pub project_status: String,
    pub preferred_collaboration_type: String,
    pub budget_range: String,
    pub currency: String,
    pub standard_rate: String,
    pub rate_type: String,
    pub compensation_type: String,
    pub visibility: String,
    pub seeking: Seeking,
    pub social_links: SocialLinks,
    pub notification_preferences: NotificationPreferences,
    pub skills_required: Vec<String>,
    pub expertise_needed: Vec<String>,
    pub target_audience: Vec<String>,
    pub solutions_offered: Vec<String>,
    pub project_tags: Vec<String>,
    pub industry_tags: Vec<String>,
    pub technology_tags: Vec<String>,
    pub website_links: Vec<String>,
    pub team_members: Vec<ListItem>,
    pub collaborators: Vec<ListItem>,
    pub advisors: Vec<ListItem>,
    pub partners: Vec<ListItem>,
    pub testimonials: Vec<ListItem>,
    pub deliverables: Vec<ListItem>,
    pub milestones: Vec<ListItem>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create/update payload for projects. On create, absent keys take their
/// defaults; on update they are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_handle: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_int_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_followers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_collaboration_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeking: Option<Seeking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_preferences: Option<NotificationPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise_needed: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solutions_offered: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_links: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<ListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<Vec<ListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisors: Option<Vec<ListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partners: Option<Vec<ListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testimonials: Option<Vec<ListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverables: Option<Vec<ListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<ListItem>>,
}

// ── Articles ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    #[default]
    FullWidthText,
    FullWidthMedia,
    LeftMediaRightText,
    LeftTextRightMedia,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullWidthText => "full-width-text",
            Self::FullWidthMedia => "full-width-media",
            Self::LeftMediaRightText => "left-media-right-text",
            Self::LeftTextRightMedia => "left-text-right-media",
        }
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-width-text" => Ok(Self::FullWidthText),
            "full-width-media" => Ok(Self::FullWidthMedia),
            "left-media-right-text" => Ok(Self::LeftMediaRightText),
            "left-text-right-media" => Ok(Self::LeftTextRightMedia),
            _ => Err(format!("Invalid section type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub title: String,
    pub text: String,
    pub media_url: String,
    pub media_type: String,
    pub media_subtext: String,
    pub order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub citations: Vec<String>,
    pub contributors: Vec<String>,
    pub related_media: Vec<String>,
    pub sections: Vec<Section>,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub citations: Option<Vec<String>>,
    pub contributors: Option<Vec<String>>,
    pub related_media: Option<Vec<String>>,
    pub sections: Option<Vec<Section>>,
}

// ── Posts ─────────────────────────────────────────────────────────────

/// Which of the two image fields of a post is authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    #[default]
    Url,
    Upload,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Upload => "upload",
        }
    }
}

impl FromStr for ImageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(Self::Url),
            "upload" => Ok(Self::Upload),
            _ => Err(format!("Invalid image source: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub text: String,
    pub created_at: String,
}

/// `comment_count` and `comments` are separate fields; listings fill the
/// count and leave `comments` empty, single-post reads fill both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub post_image_url: String,
    pub post_image_upload: String,
    pub post_image_display: ImageSource,
    pub tags: Vec<String>,
    pub likes: i64,
    pub comment_count: i64,
    pub comments: Vec<Comment>,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Post {
    /// The image selected by `post_image_display`, if it is set.
    pub fn image(&self) -> Option<&str> {
        let src = match self.post_image_display {
            ImageSource::Url => &self.post_image_url,
            ImageSource::Upload => &self.post_image_upload,
        };
        (!src.is_empty()).then_some(src.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub post_image_url: Option<String>,
    pub post_image_display: Option<ImageSource>,
    pub tags: Option<Vec<String>>,
}

// ── Interactions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Project,
    Article,
    Post,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Article => "article",
            Self::Post => "post",
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "users" => Ok(Self::User),
            "project" | "projects" => Ok(Self::Project),
            "article" | "articles" => Ok(Self::Article),
            "post" | "posts" => Ok(Self::Post),
            other => Err(format!("Invalid entity type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Like,
    Follow,
    Watch,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Follow => "follow",
            Self::Watch => "watch",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionCount {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionStatus {
    pub active: bool,
}

// ── Search & featured projections ─────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub user_type: String,
    pub bio: String,
    pub career_title: String,
    pub profile_image: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub project_name: String,
    pub project_description: String,
    pub project_type: String,
    pub project_image: String,
    pub user_id: i64,
    pub username: String,
    pub user_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub user_id: i64,
    pub username: String,
    pub user_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub tags: Vec<String>,
    pub likes: i64,
    pub comment_count: i64,
    pub user_id: i64,
    pub username: String,
    pub user_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub users: Vec<UserSummary>,
    pub projects: Vec<ProjectSummary>,
    pub articles: Vec<ArticleSummary>,
    pub posts: Vec<PostSummary>,
}

/// Row counts per kind across all pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTotals {
    pub users: i64,
    pub projects: i64,
    pub articles: i64,
    pub posts: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: SearchResults,
    pub totals: SearchTotals,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub page: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturedItem {
    pub id: i64,
    pub title: String,
    #[serde(rename = "mediaUrl")]
    pub media_url: String,
    pub excerpt: String,
    pub user_id: i64,
    pub username: String,
    pub user_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturedContent {
    pub users: Vec<FeaturedItem>,
    pub projects: Vec<FeaturedItem>,
    pub articles: Vec<FeaturedItem>,
    pub posts: Vec<FeaturedItem>,
}
