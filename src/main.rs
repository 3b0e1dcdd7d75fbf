use std::sync::Arc;

use anyhow::Result;
use crew_rs::{
    chat::{self, ChatError, ConversableAgent},
    config::Settings,
    demos::{self, CrewDemo},
    llm::{Model, provider::openai::OpenAI, request::GenerationConfig},
    report::{self, CrewReport, Outcome, PREVIEW_CHARS, Summary},
};
use tracing_subscriber::EnvFilter;

type ChatDemo = fn(GenerationConfig) -> Result<(ConversableAgent, ConversableAgent), ChatError>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_line_number(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // OPENAI_API_KEY=sk-xxxxxxxxxxxxxxxxxxxxx
    // OPENAI_BASE_URL=https://api.deepseek.com/v1 OPENAI_MODEL_NAME=deepseek-chat
    let settings = Settings::from_env()?;
    let model: Arc<dyn Model> = Arc::new(OpenAI::from_config(&settings.llm));
    let generation = GenerationConfig::from(&settings.llm);

    println!("{}", "=".repeat(60));
    println!("MULTI-AGENT CREWS AND CHATS");
    println!("{}", "=".repeat(60));

    let mut summary = Summary::new();

    run_chat(
        &mut summary,
        "Travel Advice Chat",
        demos::travel_chat,
        model.as_ref(),
        generation,
        demos::TRAVEL_CHAT_MESSAGE,
        demos::TRAVEL_CHAT_MAX_TURNS,
    )
    .await;

    for demo in demos::TRAVEL_CREWS.into_iter().chain(demos::BUSINESS_CREWS) {
        run_crew(&mut summary, demo, &model, &settings).await;
    }

    run_chat(
        &mut summary,
        "Research Paper Outline",
        demos::research_chat,
        model.as_ref(),
        generation,
        demos::RESEARCH_CHAT_MESSAGE,
        demos::RESEARCH_CHAT_MAX_TURNS,
    )
    .await;

    run_crew(&mut summary, demos::ARCHITECTURE_CREW, &model, &settings).await;

    println!("\n{}", "=".repeat(60));
    println!("SUMMARY");
    println!("{}", "=".repeat(60));
    print!("{summary}");

    Ok(())
}

async fn run_crew(
    summary: &mut Summary,
    demo: CrewDemo,
    model: &Arc<dyn Model>,
    settings: &Settings,
) {
    let name = demo.name;
    println!("\n🚀 {name}");
    println!("{}", "-".repeat(40));

    let crew = match (demo.build)(model, settings) {
        Ok(crew) => crew,
        Err(e) => {
            println!("❌ {name} failed: {e}");
            summary.record(name, Outcome::Failed(e.to_string()));
            return;
        }
    };

    let output = crew.kickoff().await;
    println!("{}", CrewReport::new(&output, demo.preview_chars));
    summary.record_crew(name, &output);
}

async fn run_chat(
    summary: &mut Summary,
    name: &str,
    build: ChatDemo,
    model: &dyn Model,
    generation: GenerationConfig,
    message: &str,
    max_turns: usize,
) {
    println!("\n🤖 {name}");
    println!("{}", "-".repeat(40));

    let result = match build(generation) {
        Ok((sender, recipient)) => {
            chat::initiate_chat(&sender, &recipient, model, message, max_turns).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(result) => {
            print!("{}", result.chat_history);
            println!(
                "Summary: {}",
                report::preview(&result.summary, PREVIEW_CHARS)
            );
            summary.record(name, Outcome::Completed);
        }
        Err(e) => {
            println!("❌ {name} failed: {e}");
            summary.record(name, Outcome::Failed(e.to_string()));
        }
    }
}
