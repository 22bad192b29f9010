//! crates/briefcraft_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend; the serde names
//! mirror the JSON shape the briefs are persisted and generated in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. Created at first login; never mutated afterwards
/// (re-registration with the same email is a no-op, the first record wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub level: String,
    pub xp: u32,
}

/// Which market the brief is written for. Controls the output language of
/// every textual field except hex codes and the asset description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMarket {
    #[serde(rename = "محلي (العرب)")]
    Local,
    #[serde(rename = "دولي (Global)")]
    Foreign,
}

impl ClientMarket {
    pub fn label(&self) -> &'static str {
        match self {
            ClientMarket::Local => "محلي (العرب)",
            ClientMarket::Foreign => "دولي (Global)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesignCategory {
    Logo,
    BrandIdentity,
    UiUx,
    SocialMedia,
    Packaging,
    Illustration,
    Advertising,
    YouTube,
    Education,
    Football,
    Collage,
    Remix,
}

impl DesignCategory {
    /// Display label, also interpolated verbatim into generation prompts.
    pub fn label(&self) -> &'static str {
        match self {
            DesignCategory::Logo => "تصميم شعار",
            DesignCategory::BrandIdentity => "هوية بصرية",
            DesignCategory::UiUx => "واجهة وتجربة مستخدم",
            DesignCategory::SocialMedia => "سوشيال ميديا",
            DesignCategory::Packaging => "عبوات وتغليف",
            DesignCategory::Illustration => "رسم رقمي",
            DesignCategory::Advertising => "حملة إعلانية",
            DesignCategory::YouTube => "صورة مصغرة يوتيوب",
            DesignCategory::Education => "دعاية تعليمية/مدرسين",
            DesignCategory::Football => "تصاميم كرة قدم",
            DesignCategory::Collage => "فن الكولاج",
            DesignCategory::Remix => "محاكاة ستايل (Remix)",
        }
    }

    pub fn all() -> &'static [DesignCategory] {
        &[
            DesignCategory::Logo,
            DesignCategory::BrandIdentity,
            DesignCategory::UiUx,
            DesignCategory::SocialMedia,
            DesignCategory::Packaging,
            DesignCategory::Illustration,
            DesignCategory::Advertising,
            DesignCategory::YouTube,
            DesignCategory::Education,
            DesignCategory::Football,
            DesignCategory::Collage,
            DesignCategory::Remix,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Professional,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "مبتدئ",
            Difficulty::Professional => "محترف",
        }
    }
}

/// A generated creative assignment.
///
/// Immutable once created, except for cosmetic edits the accepting user makes
/// before acceptance. The copy embedded in a [`Project`] never changes again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    /// Stamped client-side after generation, never requested from the model.
    pub id: Uuid,
    pub project_name: String,
    pub company_name: String,
    pub industry: String,
    pub about_company: String,
    pub target_audience: String,
    pub project_goal: String,
    /// What is actually happening in the video/ad: the story the design tells.
    pub content_summary: String,
    pub required_deliverables: Vec<String>,
    pub style_preferences: String,
    pub suggested_colors: Vec<String>,
    /// Challenge duration in hours.
    pub deadline_hours: u32,
    pub copywriting: Vec<String>,
    pub contact_details: Vec<String>,
    pub visual_references: Vec<String>,
    /// Always English regardless of market; feeds the image generator.
    pub provided_asset_description: String,
    pub client_type: ClientMarket,
    /// Base64 payload, present only for briefs produced in style-remix mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Expired,
}

/// An accepted challenge, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub brief: Brief,
    pub start_time: DateTime<Utc>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    /// The submitted result image (base64), set on submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
}

impl Project {
    pub fn deadline_at(&self) -> DateTime<Utc> {
        self.start_time + Duration::hours(i64::from(self.brief.deadline_hours))
    }

    /// Deadline-based expiry is a query-time property, not a scheduled timer:
    /// an active project past its deadline reads as expired.
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ProjectStatus::Active && now > self.deadline_at()
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> ProjectStatus {
        if self.has_expired(now) {
            ProjectStatus::Expired
        } else {
            self.status
        }
    }
}

/// Evaluation result attached to exactly one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Expected range 1-10; a contract on the evaluator, not enforced here.
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub advice: String,
    pub is_success: bool,
}
