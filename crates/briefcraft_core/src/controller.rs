//! crates/briefcraft_core/src/controller.rs
//!
//! The challenge lifecycle controller: the wizard state machine, the
//! login/registration flow, and the project state transitions. Owns the
//! in-memory session and project list; every mutation is written through the
//! [`ChallengeStore`] as a full-list overwrite.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::{IndustryCatalog, RANDOM_NICHE};
use crate::domain::{
    Brief, ClientMarket, DesignCategory, Difficulty, Feedback, Project, ProjectStatus, User,
};
use crate::ports::{
    BriefGenerationService, BriefRequest, ChallengeStore, PortResult, SubmissionEvaluationService,
};

/// User-visible message when brief generation fails.
pub const GENERATION_ERROR_MESSAGE: &str =
    "حدث خطأ أثناء توليد البرييف. يرجى المحاولة مرة أخرى.";

const DEFAULT_DISPLAY_NAME: &str = "مصمم جرافيكو";
const DEFAULT_LEVEL: &str = "مستوى 1";

//=========================================================================================
// Wizard & View States
//=========================================================================================

/// The wizard's current step. The cycle repeats indefinitely per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Category,
    Industry,
    UploadStyle,
    Result,
}

/// Orthogonal top-level view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Home,
    Dashboard,
}

/// Handle for one generation request. A response is applied only while its
/// ticket still matches the controller's epoch; anything else is stale and
/// dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// No session: the auth overlay opens, the wizard is untouched and no
    /// project is created.
    AuthRequired,
    /// A generation is still in flight; acceptance is blocked.
    Blocked,
    Accepted(Uuid),
}

//=========================================================================================
// The Controller
//=========================================================================================

pub struct ChallengeController {
    store: Arc<dyn ChallengeStore>,
    generator: Arc<dyn BriefGenerationService>,
    evaluator: Arc<dyn SubmissionEvaluationService>,
    catalog: IndustryCatalog,

    user: Option<User>,
    projects: Vec<Project>,

    view: ActiveView,
    auth_overlay_open: bool,

    step: WizardStep,
    selected_category: Option<DesignCategory>,
    selected_industry: String,
    difficulty: Difficulty,
    client_market: ClientMarket,
    current_brief: Option<Brief>,
    remix_image: Option<String>,
    error: Option<String>,

    in_flight: bool,
    epoch: u64,
}

impl ChallengeController {
    /// Restores the session (if any) from the store and loads that user's
    /// projects.
    pub fn new(
        store: Arc<dyn ChallengeStore>,
        generator: Arc<dyn BriefGenerationService>,
        evaluator: Arc<dyn SubmissionEvaluationService>,
        catalog: IndustryCatalog,
    ) -> Self {
        let user = store.session();
        let projects = user
            .as_ref()
            .map(|u| store.projects_for(&u.email))
            .unwrap_or_default();

        Self {
            store,
            generator,
            evaluator,
            catalog,
            user,
            projects,
            view: ActiveView::Home,
            auth_overlay_open: false,
            step: WizardStep::Category,
            selected_category: None,
            selected_industry: String::new(),
            difficulty: Difficulty::Beginner,
            client_market: ClientMarket::Local,
            current_brief: None,
            remix_image: None,
            error: None,
            in_flight: false,
            epoch: 0,
        }
    }

    // --- Read accessors ---

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_brief(&self) -> Option<&Brief> {
        self.current_brief.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn auth_overlay_open(&self) -> bool {
        self.auth_overlay_open
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight
    }

    pub fn selected_category(&self) -> Option<DesignCategory> {
        self.selected_category
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn client_market(&self) -> ClientMarket {
        self.client_market
    }

    pub fn remix_image(&self) -> Option<&str> {
        self.remix_image.as_deref()
    }

    /// Industry choices offered for the selected category.
    pub fn industries(&self) -> &'static [&'static str] {
        match self.selected_category {
            Some(category) => self.catalog.for_category(category),
            None => self.catalog.for_category(DesignCategory::Logo),
        }
    }

    /// A brief already completed as a project is shown read-only.
    pub fn is_view_only(&self) -> bool {
        match &self.current_brief {
            Some(brief) => self
                .projects
                .iter()
                .any(|p| p.brief.id == brief.id && p.status == ProjectStatus::Completed),
            None => false,
        }
    }

    // --- Login / registration ---

    /// Looks up the user by email; an existing record wins verbatim (the
    /// newly entered name is discarded). Unknown emails are registered with
    /// default level/xp. Either way the result becomes the session.
    ///
    /// This is a capability boundary, not an authentication boundary: no
    /// credential is verified.
    pub fn login(&mut self, name: &str, email: &str) -> User {
        let logged = match self.store.find_user_by_email(email) {
            Some(existing) => existing,
            None => {
                let name = name.trim();
                let new_user = User {
                    name: if name.is_empty() {
                        DEFAULT_DISPLAY_NAME.to_string()
                    } else {
                        name.to_string()
                    },
                    email: email.to_string(),
                    avatar: String::new(),
                    level: DEFAULT_LEVEL.to_string(),
                    xp: 0,
                };
                self.store.register_user(new_user)
            }
        };

        self.store.save_session(&logged);
        self.projects = self.store.projects_for(&logged.email);
        self.user = Some(logged.clone());
        self.auth_overlay_open = false;
        logged
    }

    pub fn logout(&mut self) {
        self.store.clear_session();
        self.user = None;
        self.projects.clear();
        self.step = WizardStep::Category;
        self.view = ActiveView::Home;
        self.invalidate_generation();
    }

    pub fn open_auth_overlay(&mut self) {
        self.auth_overlay_open = true;
    }

    pub fn close_auth_overlay(&mut self) {
        self.auth_overlay_open = false;
    }

    pub fn show_dashboard(&mut self) {
        self.view = ActiveView::Dashboard;
    }

    pub fn show_home(&mut self) {
        self.view = ActiveView::Home;
    }

    // --- Wizard transitions ---

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn set_client_market(&mut self, market: ClientMarket) {
        self.client_market = market;
    }

    /// `category -> industry`, or `category -> upload-style` for remix.
    pub fn select_category(&mut self, category: DesignCategory) {
        self.selected_category = Some(category);
        self.step = if category == DesignCategory::Remix {
            WizardStep::UploadStyle
        } else {
            WizardStep::Industry
        };
        self.invalidate_generation();
    }

    /// Step back from industry/upload to the category grid.
    pub fn back_to_category(&mut self) {
        self.step = WizardStep::Category;
    }

    /// `result -> category`, clearing everything the run accumulated.
    pub fn back_to_start(&mut self) {
        self.current_brief = None;
        self.selected_category = None;
        self.selected_industry.clear();
        self.remix_image = None;
        self.step = WizardStep::Category;
        self.error = None;
        self.invalidate_generation();
    }

    pub fn attach_remix_image(&mut self, image_base64: String) {
        self.remix_image = Some(image_base64);
    }

    pub fn clear_remix_image(&mut self) {
        self.remix_image = None;
    }

    // --- Generation ---

    /// Validates the wizard invariants and opens a generation request.
    ///
    /// Returns `None` without any state change when no category is selected,
    /// when the remix path has no attached image, or when another request is
    /// already in flight. Otherwise bumps the epoch (invalidating stale
    /// responses), raises the in-flight flag, and hands back the request the
    /// generation port should be called with.
    pub fn begin_generation(
        &mut self,
        industry: Option<&str>,
    ) -> Option<(GenerationTicket, BriefRequest)> {
        let category = self.selected_category?;
        if self.in_flight {
            return None;
        }
        if category == DesignCategory::Remix && self.remix_image.is_none() {
            return None;
        }

        if let Some(industry) = industry {
            self.selected_industry = industry.to_string();
        }

        // The random-niche sentinel means "let the generator choose"; the
        // remix path never carries an industry at all.
        let industry = match self.selected_industry.as_str() {
            _ if category == DesignCategory::Remix => None,
            "" | RANDOM_NICHE => None,
            picked => Some(picked.to_string()),
        };

        self.error = None;
        self.in_flight = true;
        self.epoch += 1;

        let request = BriefRequest {
            category,
            difficulty: self.difficulty,
            client_market: self.client_market,
            industry,
            reference_image: self.remix_image.clone(),
        };
        Some((GenerationTicket { epoch: self.epoch }, request))
    }

    /// Applies a finished generation. Stale responses (ticket no longer
    /// matching the current epoch) are dropped without touching the wizard.
    pub fn apply_generation(&mut self, ticket: GenerationTicket, result: PortResult<Brief>) {
        if ticket.epoch != self.epoch {
            debug!("discarding stale generation response");
            return;
        }
        self.in_flight = false;

        match result {
            Ok(brief) => {
                self.current_brief = Some(brief);
                self.step = WizardStep::Result;
            }
            Err(e) => {
                warn!(error = %e, "brief generation failed");
                self.error = Some(GENERATION_ERROR_MESSAGE.to_string());
                // Revert one step; the wizard never advances on failure.
                self.step = if self.selected_category == Some(DesignCategory::Remix) {
                    WizardStep::UploadStyle
                } else {
                    WizardStep::Industry
                };
            }
        }
    }

    /// Runs one full generation round-trip against the generation port.
    /// Returns `false` when the invariants blocked the request.
    pub async fn generate(&mut self, industry: Option<&str>) -> bool {
        let Some((ticket, request)) = self.begin_generation(industry) else {
            return false;
        };
        let generator = Arc::clone(&self.generator);
        let result = generator.generate_brief(&request).await;
        self.apply_generation(ticket, result);
        true
    }

    /// The remix entry point: a no-op unless a reference image is attached.
    pub async fn start_remix(&mut self) -> bool {
        if self.remix_image.is_none() {
            return false;
        }
        self.generate(None).await
    }

    /// Re-runs generation with the same parameters.
    pub async fn regenerate(&mut self) -> bool {
        if self.selected_category.is_none() {
            return false;
        }
        let industry = self.selected_industry.clone();
        let industry = (!industry.is_empty()).then_some(industry);
        self.generate(industry.as_deref()).await
    }

    // --- Acceptance and project transitions ---

    /// Accepts a brief (possibly carrying the user's pre-acceptance edits)
    /// as a new active project.
    pub fn accept_brief(&mut self, brief: Brief) -> AcceptOutcome {
        if self.in_flight {
            return AcceptOutcome::Blocked;
        }
        let Some(user) = &self.user else {
            self.auth_overlay_open = true;
            return AcceptOutcome::AuthRequired;
        };

        let project = Project {
            id: Uuid::new_v4(),
            brief,
            start_time: Utc::now(),
            status: ProjectStatus::Active,
            feedback: None,
            user_image: None,
        };
        let project_id = project.id;

        self.projects.insert(0, project);
        self.store.save_projects_for(&user.email, &self.projects);

        self.view = ActiveView::Dashboard;
        self.step = WizardStep::Category;
        self.current_brief = None;
        self.remix_image = None;
        self.invalidate_generation();

        AcceptOutcome::Accepted(project_id)
    }

    /// Applies an in-place mutation to one project and re-persists the whole
    /// list. Returns `false` when the id is unknown.
    pub fn update_project(&mut self, project_id: Uuid, update: impl FnOnce(&mut Project)) -> bool {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) else {
            return false;
        };
        update(project);
        self.persist_projects();
        true
    }

    /// Evaluates a submitted image against the project's brief, attaches the
    /// feedback, and completes the project. Evaluation never fails; at worst
    /// the feedback is the evaluator's canned fallback.
    pub async fn submit_for_review(
        &mut self,
        project_id: Uuid,
        image_base64: String,
    ) -> Option<Feedback> {
        let brief = self
            .projects
            .iter()
            .find(|p| p.id == project_id && p.status == ProjectStatus::Active)?
            .brief
            .clone();

        let evaluator = Arc::clone(&self.evaluator);
        let feedback = evaluator.evaluate_submission(&brief, &image_base64).await;

        self.update_project(project_id, |project| {
            project.feedback = Some(feedback.clone());
            project.user_image = Some(image_base64);
            project.status = ProjectStatus::Completed;
        });
        Some(feedback)
    }

    /// Materializes deadline expiry the way a dashboard render would: every
    /// active project past its deadline flips to expired, persisted once.
    /// Returns how many projects changed.
    pub fn sync_expired(&mut self, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for project in &mut self.projects {
            if project.has_expired(now) {
                project.status = ProjectStatus::Expired;
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist_projects();
        }
        changed
    }

    /// Re-opens a stored project's brief on the result step, read-only when
    /// the project is already completed.
    pub fn view_brief(&mut self, project_id: Uuid) -> bool {
        let Some(project) = self.projects.iter().find(|p| p.id == project_id) else {
            return false;
        };
        self.current_brief = Some(project.brief.clone());
        self.view = ActiveView::Home;
        self.step = WizardStep::Result;
        true
    }

    // --- Internals ---

    fn persist_projects(&self) {
        if let Some(user) = &self.user {
            self.store.save_projects_for(&user.email, &self.projects);
        }
    }

    fn invalidate_generation(&mut self) {
        self.in_flight = false;
        self.epoch += 1;
    }
}
