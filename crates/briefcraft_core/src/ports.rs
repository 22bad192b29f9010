//! crates/briefcraft_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! generative AI provider or the on-disk store.

use async_trait::async_trait;
use crate::domain::{Brief, ClientMarket, DesignCategory, Difficulty, Feedback, Project, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Storage has no variant here: the gateway contract absorbs read/write
/// failures locally and never surfaces them.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The generative capability failed or returned unparseable data.
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persistence Gateway Port
//=========================================================================================

/// Key-value backed storage for the user registry, the single session slot,
/// and the per-user project lists.
///
/// All operations are synchronous and fail soft: corrupt or missing data
/// reads as empty/none, and write failures are absorbed by the adapter
/// (logged, never surfaced). Last writer wins; there is no cross-process
/// coordination.
pub trait ChallengeStore: Send + Sync {
    /// Returns every registered user; empty on missing or corrupt data.
    fn registered_users(&self) -> Vec<User>;

    /// Idempotent by email: if a user with the same email already exists,
    /// the stored record is returned unchanged and nothing is written.
    fn register_user(&self, user: User) -> User;

    fn find_user_by_email(&self, email: &str) -> Option<User>;

    // --- Session (single global slot) ---
    fn save_session(&self, user: &User);
    fn session(&self) -> Option<User>;
    fn clear_session(&self);

    // --- Per-user project lists, namespaced by email ---
    fn projects_for(&self, email: &str) -> Vec<Project>;

    /// Full overwrite of that user's list, not an incremental update.
    fn save_projects_for(&self, email: &str, projects: &[Project]);
}

//=========================================================================================
// Generative Capability Ports
//=========================================================================================

/// Everything the brief generator needs to build one request.
#[derive(Debug, Clone)]
pub struct BriefRequest {
    pub category: DesignCategory,
    pub difficulty: Difficulty,
    pub client_market: ClientMarket,
    /// `None` means "let the generator pick a random creative niche".
    pub industry: Option<String>,
    /// Base64 image payload; present only for the style-remix category.
    pub reference_image: Option<String>,
}

#[async_trait]
pub trait BriefGenerationService: Send + Sync {
    /// Produces a fully populated brief, or fails with
    /// [`PortError::Generation`] when the capability errors or returns data
    /// that does not parse into the expected shape.
    async fn generate_brief(&self, request: &BriefRequest) -> PortResult<Brief>;
}

#[async_trait]
pub trait SubmissionEvaluationService: Send + Sync {
    /// Grades a submitted image against its brief.
    ///
    /// Infallible by contract: any upstream failure is replaced with a fixed
    /// optimistic fallback so evaluation can never block completion.
    async fn evaluate_submission(&self, brief: &Brief, image_base64: &str) -> Feedback;
}
