pub mod assets;
pub mod catalog;
pub mod controller;
pub mod domain;
pub mod ports;

pub use catalog::IndustryCatalog;
pub use controller::{AcceptOutcome, ActiveView, ChallengeController, WizardStep};
pub use domain::{
    Brief, ClientMarket, DesignCategory, Difficulty, Feedback, Project, ProjectStatus, User,
};
pub use ports::{
    BriefGenerationService, BriefRequest, ChallengeStore, PortError, PortResult,
    SubmissionEvaluationService,
};
