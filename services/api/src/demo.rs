use crate::infra::build_screening_service;
use clap::Args;
use screener::config::AppConfig;
use screener::error::AppError;
use screener::screening::{AnalysisResult, ResponseSet};
use serde_json::json;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop after the first screening turn instead of completing the
    /// conversation
    #[arg(long)]
    pub(crate) first_turn_only: bool,
}

fn sample_responses(value: serde_json::Value) -> ResponseSet {
    serde_json::from_value(value).unwrap_or_default()
}

fn print_analysis(analysis: &AnalysisResult) {
    println!("  risk level: {}", analysis.risk_level.label());
    for observation in &analysis.observations {
        println!("  note: {observation}");
    }
    for (category, entries) in &analysis.recommended_resources {
        println!("  {category}:");
        for entry in entries {
            println!("    - {entry}");
        }
    }
    if !analysis.guidance.is_empty() {
        println!("  guidance: {}", analysis.guidance);
    }
}

/// Walk one screening conversation through the orchestrator and print each
/// turn. Without an API key configured the deterministic fallback answers,
/// which makes the demo reproducible offline.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (_store, service) = build_screening_service(&config)?;

    println!("== turn 1: initial screening responses ==");
    let first = service
        .submit(
            None,
            sample_responses(json!({
                "mood": "2",
                "stress_level": 8,
                "symptoms": ["low energy", "trouble concentrating"]
            })),
        )
        .await?;

    println!("session: {}", first.session_id);
    println!("fallback: {}", first.outcome.using_fallback);
    print_analysis(&first.outcome.analysis);
    for question in &first.outcome.follow_up_questions {
        println!("  follow-up: {question}");
    }

    if args.first_turn_only || first.outcome.conversation_complete {
        return Ok(());
    }

    println!("\n== turn 2: follow-up answers ==");
    let second = service
        .submit(
            Some(first.session_id),
            sample_responses(json!({
                "duration": "about two months",
                "sleep_changes": "significant",
                "social_support": "none"
            })),
        )
        .await?;

    println!("complete: {}", second.outcome.conversation_complete);
    print_analysis(&second.outcome.analysis);

    Ok(())
}
