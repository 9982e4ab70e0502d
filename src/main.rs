use std::sync::Arc;

use email_triage::config::TriageConfig;
use email_triage::error::{ConfigError, Error, GoogleError};
use email_triage::google::auth::{SCOPES, load_access_token};
use email_triage::google::{GmailMailbox, GoogleCalendar, GoogleClient, GoogleSheets, GoogleTasks};
use email_triage::llm::create_provider;
use email_triage::pipeline::{
    ActionDispatcher, DispatchSettings, FieldExtractor, IntentClassifier, TriagePipeline,
    render_summary,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        report(&e);
        std::process::exit(1);
    }
}

async fn run() -> email_triage::error::Result<()> {
    let config = TriageConfig::from_env()?;

    eprintln!("📬 Email Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   LLM: {} ({})", config.llm.backend.name(), config.llm.model);
    eprintln!("   Sheet: {} ({})", config.sheet_id, config.sheet_range);
    eprintln!("   Timezone: {}", config.time_zone);
    eprintln!("   Max unread: {}\n", config.max_results);

    let llm = create_provider(&config.llm)?;

    let client = GoogleClient::new(load_access_token(&config)?);
    let mail = Arc::new(GmailMailbox::new(client.clone()));
    let dispatcher = ActionDispatcher::new(
        Arc::new(GoogleTasks::new(client.clone())),
        Arc::new(GoogleCalendar::new(client.clone())),
        Arc::new(GoogleSheets::new(client)),
        DispatchSettings {
            sheet_id: config.sheet_id.clone(),
            sheet_range: config.sheet_range.clone(),
            time_zone: config.time_zone.clone(),
        },
    );

    let pipeline = TriagePipeline::new(
        mail,
        IntentClassifier::new(Arc::clone(&llm)),
        FieldExtractor::new(llm),
        dispatcher,
        config.max_results,
    );

    let results = pipeline.run().await?;
    println!("{}", render_summary(&results));
    Ok(())
}

fn report(error: &Error) {
    eprintln!("Error: {error}");
    match error {
        Error::Config(ConfigError::MissingEnvVar(var)) => {
            eprintln!("  export {var}=...");
        }
        Error::Google(GoogleError::Auth(_)) | Error::Pipeline(_) => {
            eprintln!("  Provide an OAuth access token via GOOGLE_ACCESS_TOKEN or GOOGLE_TOKEN_PATH");
            eprintln!("  with scopes:");
            for scope in SCOPES {
                eprintln!("    {scope}");
            }
        }
        _ => {}
    }
}
