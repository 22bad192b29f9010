//! End-to-end tests of the challenge lifecycle controller against in-memory
//! fakes of the storage and generative ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use briefcraft_core::catalog::RANDOM_NICHE;
use briefcraft_core::controller::{
    AcceptOutcome, ActiveView, ChallengeController, WizardStep,
};
use briefcraft_core::domain::{
    Brief, ClientMarket, DesignCategory, Difficulty, Feedback, Project, ProjectStatus, User,
};
use briefcraft_core::ports::{
    BriefGenerationService, BriefRequest, ChallengeStore, PortError, PortResult,
    SubmissionEvaluationService,
};
use briefcraft_core::IndustryCatalog;

//=========================================================================================
// Fakes
//=========================================================================================

#[derive(Default)]
struct MemoryStore {
    users: Mutex<Vec<User>>,
    session: Mutex<Option<User>>,
    projects: Mutex<HashMap<String, Vec<Project>>>,
}

impl ChallengeStore for MemoryStore {
    fn registered_users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    fn register_user(&self, user: User) -> User {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter().find(|u| u.email == user.email) {
            return existing.clone();
        }
        users.push(user.clone());
        user
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    fn save_session(&self, user: &User) {
        *self.session.lock().unwrap() = Some(user.clone());
    }

    fn session(&self) -> Option<User> {
        self.session.lock().unwrap().clone()
    }

    fn clear_session(&self) {
        *self.session.lock().unwrap() = None;
    }

    fn projects_for(&self, email: &str) -> Vec<Project> {
        self.projects
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .unwrap_or_default()
    }

    fn save_projects_for(&self, email: &str, projects: &[Project]) {
        self.projects
            .lock()
            .unwrap()
            .insert(email.to_string(), projects.to_vec());
    }
}

/// Echoes the request back as a populated brief, or fails on demand.
/// Captures every request it sees.
#[derive(Default)]
struct FakeGenerator {
    fail: AtomicBool,
    requests: Mutex<Vec<BriefRequest>>,
}

impl FakeGenerator {
    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> BriefRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl BriefGenerationService for FakeGenerator {
    async fn generate_brief(&self, request: &BriefRequest) -> PortResult<Brief> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::Generation("model unavailable".into()));
        }
        Ok(Brief {
            id: Uuid::new_v4(),
            project_name: "Nova Launch".into(),
            company_name: "Nova".into(),
            industry: request.industry.clone().unwrap_or_else(|| "niche".into()),
            about_company: "about".into(),
            target_audience: "everyone".into(),
            project_goal: "goal".into(),
            content_summary: "story".into(),
            required_deliverables: vec!["poster".into()],
            style_preferences: "bold".into(),
            suggested_colors: vec!["#112233".into()],
            deadline_hours: 48,
            copywriting: vec!["headline".into()],
            contact_details: vec!["nova@example.com".into()],
            visual_references: vec!["bold poster".into()],
            provided_asset_description: "a product on a table".into(),
            client_type: request.client_market,
            reference_image: request.reference_image.clone(),
        })
    }
}

#[derive(Default)]
struct FakeEvaluator {
    calls: AtomicUsize,
}

#[async_trait]
impl SubmissionEvaluationService for FakeEvaluator {
    async fn evaluate_submission(&self, _brief: &Brief, _image_base64: &str) -> Feedback {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Feedback {
            score: 9,
            strengths: vec!["clean layout".into()],
            weaknesses: vec![],
            advice: "keep going".into(),
            is_success: true,
        }
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    generator: Arc<FakeGenerator>,
    evaluator: Arc<FakeEvaluator>,
    controller: ChallengeController,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::default());
    let generator = Arc::new(FakeGenerator::default());
    let evaluator = Arc::new(FakeEvaluator::default());
    let controller = ChallengeController::new(
        store.clone(),
        generator.clone(),
        evaluator.clone(),
        IndustryCatalog::default(),
    );
    Harness {
        store,
        generator,
        evaluator,
        controller,
    }
}

//=========================================================================================
// Login / registration
//=========================================================================================

#[test]
fn login_creates_user_with_defaults() {
    let mut h = harness();
    let user = h.controller.login("Sara", "a@x.com");

    assert_eq!(user.name, "Sara");
    assert_eq!(user.xp, 0);
    assert_eq!(h.store.registered_users().len(), 1);
    assert_eq!(h.store.session().unwrap().email, "a@x.com");
}

#[test]
fn login_reuses_existing_record_and_discards_new_name() {
    let mut h = harness();
    h.controller.login("Sara", "a@x.com");
    h.controller.logout();

    let again = h.controller.login("Someone Else", "a@x.com");
    assert_eq!(again.name, "Sara");
    assert_eq!(h.store.registered_users().len(), 1);
}

#[test]
fn blank_name_falls_back_to_default() {
    let mut h = harness();
    let user = h.controller.login("   ", "b@x.com");
    assert_eq!(user.name, "مصمم جرافيكو");
}

#[test]
fn controller_restores_session_from_store() {
    let h = harness();
    let store = h.store;
    let user = User {
        name: "Sara".into(),
        email: "a@x.com".into(),
        avatar: String::new(),
        level: "مستوى 1".into(),
        xp: 0,
    };
    store.register_user(user.clone());
    store.save_session(&user);

    let controller = ChallengeController::new(
        store,
        Arc::new(FakeGenerator::default()),
        Arc::new(FakeEvaluator::default()),
        IndustryCatalog::default(),
    );
    assert_eq!(controller.user().unwrap().email, "a@x.com");
}

//=========================================================================================
// Wizard transitions and generation
//=========================================================================================

#[tokio::test]
async fn generation_requires_a_selected_category() {
    let mut h = harness();
    assert!(!h.controller.generate(Some("Gaming")).await);
    assert_eq!(h.generator.request_count(), 0);
    assert_eq!(h.controller.step(), WizardStep::Category);
}

#[tokio::test]
async fn standard_flow_reaches_result() {
    let mut h = harness();
    h.controller.select_category(DesignCategory::YouTube);
    assert_eq!(h.controller.step(), WizardStep::Industry);

    assert!(h.controller.generate(Some("Gaming (ألعاب فيديو)")).await);
    assert_eq!(h.controller.step(), WizardStep::Result);
    assert!(h.controller.current_brief().is_some());
    assert!(h.controller.error().is_none());
}

#[tokio::test]
async fn random_niche_sentinel_lets_the_generator_choose() {
    let mut h = harness();
    h.controller.select_category(DesignCategory::Logo);
    assert!(h.controller.generate(Some(RANDOM_NICHE)).await);
    assert_eq!(h.generator.last_request().industry, None);
}

#[tokio::test]
async fn failing_generation_reverts_to_industry_with_error() {
    let mut h = harness();
    h.generator.fail.store(true, Ordering::SeqCst);

    h.controller.select_category(DesignCategory::Logo);
    assert!(h.controller.generate(Some("مطاعم وكافيهات")).await);

    assert_eq!(h.controller.step(), WizardStep::Industry);
    assert!(!h.controller.error().unwrap().is_empty());
    assert!(h.controller.current_brief().is_none());
}

#[tokio::test]
async fn failing_remix_generation_reverts_to_upload_style() {
    let mut h = harness();
    h.generator.fail.store(true, Ordering::SeqCst);

    h.controller.select_category(DesignCategory::Remix);
    h.controller.attach_remix_image("aW1hZ2U=".into());
    assert!(h.controller.start_remix().await);

    assert_eq!(h.controller.step(), WizardStep::UploadStyle);
    assert!(h.controller.error().is_some());
}

#[tokio::test]
async fn remix_without_image_is_a_no_op() {
    let mut h = harness();
    h.controller.select_category(DesignCategory::Remix);
    assert_eq!(h.controller.step(), WizardStep::UploadStyle);

    assert!(!h.controller.start_remix().await);
    assert_eq!(h.generator.request_count(), 0);
    assert_eq!(h.controller.step(), WizardStep::UploadStyle);

    h.controller.attach_remix_image("aW1hZ2U=".into());
    assert!(h.controller.start_remix().await);
    assert_eq!(h.generator.request_count(), 1);
    let request = h.generator.last_request();
    assert_eq!(request.reference_image.as_deref(), Some("aW1hZ2U="));
    assert_eq!(
        h.controller.current_brief().unwrap().reference_image.as_deref(),
        Some("aW1hZ2U=")
    );
}

#[tokio::test]
async fn only_one_generation_may_be_in_flight() {
    let mut h = harness();
    h.controller.select_category(DesignCategory::Logo);

    let first = h.controller.begin_generation(Some("أزياء وموضة"));
    assert!(first.is_some());
    assert!(h.controller.is_generating());
    assert!(h.controller.begin_generation(Some("أزياء وموضة")).is_none());

    // Accepting is blocked while the request is outstanding.
    let (ticket, request) = first.unwrap();
    let brief = h.generator.generate_brief(&request).await.unwrap();
    assert_eq!(
        h.controller.accept_brief(brief.clone()),
        AcceptOutcome::Blocked
    );
    h.controller.apply_generation(ticket, Ok(brief));
    assert!(!h.controller.is_generating());
}

#[tokio::test]
async fn stale_generation_response_is_discarded() {
    let mut h = harness();
    h.controller.select_category(DesignCategory::Logo);

    let (ticket, request) = h.controller.begin_generation(Some("سياحة وسفر")).unwrap();
    let brief = h.generator.generate_brief(&request).await.unwrap();

    // The user backs out before the response lands.
    h.controller.back_to_start();
    h.controller.apply_generation(ticket, Ok(brief));

    assert_eq!(h.controller.step(), WizardStep::Category);
    assert!(h.controller.current_brief().is_none());
}

#[tokio::test]
async fn regenerate_reuses_the_same_parameters() {
    let mut h = harness();
    h.controller.select_category(DesignCategory::Football);
    assert!(h.controller.generate(Some("يوم المباراة (Match Day)")).await);
    assert!(h.controller.regenerate().await);

    assert_eq!(h.generator.request_count(), 2);
    let request = h.generator.last_request();
    assert_eq!(request.industry.as_deref(), Some("يوم المباراة (Match Day)"));
    assert_eq!(request.category, DesignCategory::Football);
}

//=========================================================================================
// Acceptance
//=========================================================================================

#[tokio::test]
async fn accepting_unauthenticated_opens_overlay_and_creates_nothing() {
    let mut h = harness();
    h.controller.select_category(DesignCategory::Logo);
    assert!(h.controller.generate(Some("خدمات مالية")).await);

    let brief = h.controller.current_brief().unwrap().clone();
    assert_eq!(h.controller.accept_brief(brief), AcceptOutcome::AuthRequired);

    assert!(h.controller.auth_overlay_open());
    assert_eq!(h.controller.step(), WizardStep::Result);
    assert!(h.controller.projects().is_empty());
}

#[tokio::test]
async fn accepting_authenticated_stamps_a_fresh_active_project() {
    let mut h = harness();
    h.controller.login("Sara", "a@x.com");
    h.controller.select_category(DesignCategory::Logo);
    assert!(h.controller.generate(Some("عقارات وهندسة")).await);

    let brief = h.controller.current_brief().unwrap().clone();
    let before = Utc::now();
    let outcome = h.controller.accept_brief(brief.clone());
    let AcceptOutcome::Accepted(project_id) = outcome else {
        panic!("expected acceptance, got {:?}", outcome);
    };

    let stored = h.store.projects_for("a@x.com");
    assert_eq!(stored.len(), 1);
    let project = &stored[0];
    assert_eq!(project.id, project_id);
    assert_ne!(project.id, brief.id);
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(project.brief.id, brief.id);
    assert!(project.start_time >= before);

    // The wizard resets and the dashboard takes over.
    assert_eq!(h.controller.step(), WizardStep::Category);
    assert_eq!(h.controller.view(), ActiveView::Dashboard);
    assert!(h.controller.current_brief().is_none());
}

#[tokio::test]
async fn projects_are_namespaced_per_user() {
    let mut h = harness();
    h.controller.login("Sara", "a@x.com");
    h.controller.select_category(DesignCategory::Logo);
    assert!(h.controller.generate(Some("صحة ورياضة")).await);
    let brief = h.controller.current_brief().unwrap().clone();
    assert!(matches!(
        h.controller.accept_brief(brief),
        AcceptOutcome::Accepted(_)
    ));

    h.controller.logout();
    h.controller.login("Omar", "b@x.com");
    assert!(h.controller.projects().is_empty());
    assert_eq!(h.store.projects_for("a@x.com").len(), 1);
    assert!(h.store.projects_for("b@x.com").is_empty());
}

//=========================================================================================
// Dashboard transitions
//=========================================================================================

async fn accepted_project(h: &mut Harness) -> Uuid {
    h.controller.login("Sara", "a@x.com");
    h.controller.select_category(DesignCategory::Logo);
    assert!(h.controller.generate(Some("مستحضرات تجميل")).await);
    let brief = h.controller.current_brief().unwrap().clone();
    match h.controller.accept_brief(brief) {
        AcceptOutcome::Accepted(id) => id,
        other => panic!("expected acceptance, got {:?}", other),
    }
}

#[tokio::test]
async fn submission_attaches_feedback_and_completes_the_project() {
    let mut h = harness();
    let project_id = accepted_project(&mut h).await;

    let feedback = h
        .controller
        .submit_for_review(project_id, "c3VibWlzc2lvbg==".into())
        .await
        .unwrap();
    assert!(feedback.is_success);
    assert_eq!(h.evaluator.calls.load(Ordering::SeqCst), 1);

    let stored = h.store.projects_for("a@x.com");
    assert_eq!(stored[0].status, ProjectStatus::Completed);
    assert_eq!(stored[0].feedback.as_ref().unwrap().score, 9);
    assert_eq!(stored[0].user_image.as_deref(), Some("c3VibWlzc2lvbg=="));

    // Completed projects cannot be submitted again.
    assert!(h
        .controller
        .submit_for_review(project_id, "eA==".into())
        .await
        .is_none());
}

#[tokio::test]
async fn expiry_is_derived_from_the_deadline_at_read_time() {
    let mut h = harness();
    let project_id = accepted_project(&mut h).await;

    // Nothing expires while the deadline is in the future.
    assert_eq!(h.controller.sync_expired(Utc::now()), 0);

    let past_deadline = Utc::now() + Duration::hours(49);
    assert_eq!(h.controller.sync_expired(past_deadline), 1);
    let stored = h.store.projects_for("a@x.com");
    assert_eq!(stored[0].status, ProjectStatus::Expired);

    // Expired is terminal; a second pass changes nothing.
    assert_eq!(h.controller.sync_expired(past_deadline), 0);
    let _ = project_id;
}

#[tokio::test]
async fn viewing_a_completed_project_is_read_only() {
    let mut h = harness();
    let project_id = accepted_project(&mut h).await;
    h.controller
        .submit_for_review(project_id, "c3VibWlzc2lvbg==".into())
        .await
        .unwrap();

    assert!(h.controller.view_brief(project_id));
    assert_eq!(h.controller.step(), WizardStep::Result);
    assert_eq!(h.controller.view(), ActiveView::Home);
    assert!(h.controller.is_view_only());
}

#[tokio::test]
async fn update_project_persists_the_whole_list() {
    let mut h = harness();
    let project_id = accepted_project(&mut h).await;

    assert!(h.controller.update_project(project_id, |p| {
        p.user_image = Some("ZHJhZnQ=".into());
    }));
    assert_eq!(
        h.store.projects_for("a@x.com")[0].user_image.as_deref(),
        Some("ZHJhZnQ=")
    );
    assert!(!h.controller.update_project(Uuid::new_v4(), |_| {}));
}

//=========================================================================================
// End-to-end scenario
//=========================================================================================

#[tokio::test]
async fn full_challenge_scenario() {
    let mut h = harness();

    let user = h.controller.login("Sara", "a@x.com");
    assert_eq!(user.name, "Sara");
    assert_eq!(user.xp, 0);

    h.controller.set_client_market(ClientMarket::Local);
    h.controller.set_difficulty(Difficulty::Beginner);
    h.controller.select_category(DesignCategory::YouTube);
    assert!(h
        .controller
        .industries()
        .contains(&"Gaming (ألعاب فيديو)"));

    assert!(h.controller.generate(Some("Gaming (ألعاب فيديو)")).await);
    let request = h.generator.last_request();
    assert_eq!(request.category, DesignCategory::YouTube);
    assert_eq!(request.industry.as_deref(), Some("Gaming (ألعاب فيديو)"));
    assert_eq!(request.client_market, ClientMarket::Local);

    let brief = h.controller.current_brief().unwrap().clone();
    assert_eq!(brief.client_type, ClientMarket::Local);

    let AcceptOutcome::Accepted(_) = h.controller.accept_brief(brief.clone()) else {
        panic!("expected acceptance");
    };
    let stored = h.store.projects_for("a@x.com");
    assert_eq!(stored[0].status, ProjectStatus::Active);
    assert_eq!(stored[0].brief.id, brief.id);
}
