//! services/app/src/bin/app.rs
//!
//! Wires the store and the generative adapters into the challenge
//! controller and drives it with a minimal line-oriented terminal loop.

use std::sync::Arc;

use app_lib::{
    adapters::{AssetFetcher, FileStore, OpenAiBriefAdapter, OpenAiEvalAdapter},
    config::Config,
    error::AppError,
};
use async_openai::{config::OpenAIConfig, Client};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use briefcraft_core::{
    assets, AcceptOutcome, ActiveView, Brief, ChallengeController, ClientMarket, DesignCategory,
    Difficulty, IndustryCatalog, WizardStep,
};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting up...");

    // --- 2. Open the Store ---
    let store = Arc::new(FileStore::new(config.data_dir.clone()));

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| AppError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let brief_adapter = Arc::new(OpenAiBriefAdapter::new(
        openai_client.clone(),
        config.brief_model.clone(),
    ));
    let eval_adapter = Arc::new(OpenAiEvalAdapter::new(
        openai_client.clone(),
        config.eval_model.clone(),
    ));
    let fetcher = AssetFetcher::new();

    // --- 4. Build the Controller ---
    let mut controller = ChallengeController::new(
        store,
        brief_adapter,
        eval_adapter,
        IndustryCatalog::default(),
    );

    if let Some(user) = controller.user() {
        println!("مرحباً {} ({})", user.name, user.email);
    }
    println!("اكتب help لعرض الأوامر.");

    // --- 5. Drive the Wizard ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt_line(&controller);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line.as_str(), ""),
        };

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,

            "login" => {
                let (email, name) = match rest.split_once(' ') {
                    Some((e, n)) => (e, n),
                    None => (rest, ""),
                };
                if email.is_empty() {
                    println!("usage: login <email> [name]");
                    continue;
                }
                let user = controller.login(name, email);
                println!("مرحباً {}", user.name);
            }
            "logout" => {
                controller.logout();
                println!("تم تسجيل الخروج.");
            }
            "whoami" => match controller.user() {
                Some(user) => println!("{} <{}>, {}", user.name, user.email, user.level),
                None => println!("لم تسجل الدخول بعد."),
            },

            "market" => match rest {
                "local" => controller.set_client_market(ClientMarket::Local),
                "global" => controller.set_client_market(ClientMarket::Foreign),
                _ => println!("usage: market local|global"),
            },
            "difficulty" => match rest {
                "beginner" => controller.set_difficulty(Difficulty::Beginner),
                "pro" => controller.set_difficulty(Difficulty::Professional),
                _ => println!("usage: difficulty beginner|pro"),
            },

            "categories" => {
                for (i, category) in DesignCategory::all().iter().enumerate() {
                    println!("{:2}. {}", i + 1, category.label());
                }
            }
            "pick" => match rest
                .parse::<usize>()
                .ok()
                .and_then(|n| DesignCategory::all().get(n.wrapping_sub(1)))
            {
                Some(category) => {
                    controller.select_category(*category);
                    match controller.step() {
                        WizardStep::UploadStyle => {
                            println!("ارفع صورة مرجعية: remix <path> ثم start")
                        }
                        _ => println!("اختر المجال: industries ثم go <n|random>"),
                    }
                }
                None => println!("usage: pick <n> (see categories)"),
            },

            "industries" => {
                for (i, industry) in controller.industries().iter().enumerate() {
                    println!("{:2}. {}", i + 1, industry);
                }
            }
            "go" => {
                let industry = if rest == "random" {
                    Some(briefcraft_core::catalog::RANDOM_NICHE)
                } else {
                    rest.parse::<usize>()
                        .ok()
                        .and_then(|n| controller.industries().get(n.wrapping_sub(1)).copied())
                };
                match industry {
                    Some(industry) => {
                        println!("جاري كتابة البرييف...");
                        if controller.generate(Some(industry)).await {
                            report_generation(&controller);
                        } else {
                            println!("اختر نوع التصميم أولاً (pick).");
                        }
                    }
                    None => println!("usage: go <n|random>"),
                }
            }

            "remix" => match tokio::fs::read(rest).await {
                Ok(bytes) => {
                    controller.attach_remix_image(BASE64.encode(bytes));
                    println!("تم إرفاق الصورة المرجعية.");
                }
                Err(e) => println!("could not read {}: {}", rest, e),
            },
            "start" => {
                println!("جاري تحليل الستايل...");
                if controller.start_remix().await {
                    report_generation(&controller);
                } else {
                    println!("أرفق صورة مرجعية أولاً (remix <path>).");
                }
            }
            "regen" => {
                if controller.regenerate().await {
                    report_generation(&controller);
                } else {
                    println!("لا يوجد برييف لإعادة توليده.");
                }
            }
            "back" => {
                controller.back_to_start();
            }

            "accept" => match controller.current_brief().cloned() {
                Some(brief) => match controller.accept_brief(brief) {
                    AcceptOutcome::Accepted(id) => {
                        println!("بدأ التحدي! project {}", id);
                    }
                    AcceptOutcome::AuthRequired => {
                        println!("سجل الدخول أولاً (login <email> [name]).")
                    }
                    AcceptOutcome::Blocked => println!("انتظر انتهاء التوليد الجاري."),
                },
                None => println!("لا يوجد برييف معروض."),
            },

            "dashboard" => {
                let expired = controller.sync_expired(Utc::now());
                if expired > 0 {
                    println!("({} تحدي انتهت مهلته)", expired);
                }
                controller.show_dashboard();
                if controller.projects().is_empty() {
                    println!("لا توجد تحديات بعد.");
                }
                for (i, project) in controller.projects().iter().enumerate() {
                    println!(
                        "{:2}. {} | {:?} | {}h | بدأ {}",
                        i + 1,
                        project.brief.project_name,
                        project.status,
                        project.brief.deadline_hours,
                        project.start_time.format("%Y-%m-%d %H:%M"),
                    );
                }
            }
            "view" => match nth_project_id(&controller, rest) {
                Some(id) => {
                    controller.view_brief(id);
                    if let Some(brief) = controller.current_brief() {
                        print_brief(brief, None);
                    }
                }
                None => println!("usage: view <n> (see dashboard)"),
            },
            "submit" => {
                let (index, path) = match rest.split_once(' ') {
                    Some((i, p)) => (i, p.trim()),
                    None => ("", ""),
                };
                let Some(id) = nth_project_id(&controller, index) else {
                    println!("usage: submit <n> <image-path>");
                    continue;
                };
                match tokio::fs::read(path).await {
                    Ok(bytes) => {
                        match controller.submit_for_review(id, BASE64.encode(bytes)).await {
                            Some(feedback) => {
                                println!("التقييم: {}/10", feedback.score);
                                for s in &feedback.strengths {
                                    println!("  + {}", s);
                                }
                                for w in &feedback.weaknesses {
                                    println!("  - {}", w);
                                }
                                println!("  {}", feedback.advice);
                            }
                            None => println!("التحدي غير نشط."),
                        }
                    }
                    Err(e) => println!("could not read {}: {}", path, e),
                }
            }

            "asset" => match controller.current_brief() {
                Some(brief) => {
                    let url = assets::asset_image_url(brief, controller.selected_category());
                    let file_name = assets::asset_file_name(brief);
                    match fetcher
                        .download_to(&url, config.data_dir.as_path(), &file_name)
                        .await
                    {
                        Ok(path) => println!("saved to {}", path.display()),
                        Err(e) => {
                            // Fall back to the raw URL when the download fails.
                            println!("download failed ({}), open directly:\n{}", e, url);
                        }
                    }
                }
                None => println!("لا يوجد برييف معروض."),
            },
            "stock" => match controller.current_brief() {
                Some(brief) => println!("{}", assets::stock_search_url(brief)),
                None => println!("لا يوجد برييف معروض."),
            },

            _ => println!("أمر غير معروف. اكتب help."),
        }
    }

    Ok(())
}

fn prompt_line(controller: &ChallengeController) {
    let step = match (controller.view(), controller.step()) {
        (ActiveView::Dashboard, _) => "dashboard",
        (_, WizardStep::Category) => "category",
        (_, WizardStep::Industry) => "industry",
        (_, WizardStep::UploadStyle) => "upload-style",
        (_, WizardStep::Result) => "result",
    };
    print!("[{}] > ", step);
    use std::io::Write as _;
    let _ = std::io::stdout().flush();
}

fn report_generation(controller: &ChallengeController) {
    if let Some(error) = controller.error() {
        println!("{}", error);
        return;
    }
    if let Some(brief) = controller.current_brief() {
        print_brief(brief, controller.selected_category());
        println!("accept لقبول التحدي، regen لبرييف آخر، back للعودة.");
    }
}

fn print_brief(brief: &Brief, category: Option<DesignCategory>) {
    println!("== {} ({}) ==", brief.project_name, brief.company_name);
    println!("السوق: {} | المجال: {}", brief.client_type.label(), brief.industry);
    println!("عن الشركة: {}", brief.about_company);
    println!("الجمهور: {}", brief.target_audience);
    println!("الهدف: {}", brief.project_goal);
    println!("القصة: {}", brief.content_summary);
    println!("المطلوب: {}", brief.required_deliverables.join(", "));
    println!("الستايل: {}", brief.style_preferences);
    println!("الألوان: {}", brief.suggested_colors.join(" "));
    for text in &brief.copywriting {
        println!("نص: {}", text);
    }
    for keyword in &brief.visual_references {
        println!("#{}", keyword);
    }
    println!("المهلة: {}h", brief.deadline_hours);
    println!("صورة العمل: {}", assets::asset_image_url(brief, category));
}

fn nth_project_id(controller: &ChallengeController, index: &str) -> Option<uuid::Uuid> {
    index
        .parse::<usize>()
        .ok()
        .and_then(|n| controller.projects().get(n.wrapping_sub(1)))
        .map(|p| p.id)
}

fn print_help() {
    println!(
        "login <email> [name] | logout | whoami\n\
         market local|global | difficulty beginner|pro\n\
         categories | pick <n> | industries | go <n|random>\n\
         remix <path> | start | regen | accept | back\n\
         dashboard | view <n> | submit <n> <image-path>\n\
         asset | stock | quit"
    );
}
