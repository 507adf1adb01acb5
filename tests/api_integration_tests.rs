use dotenv::dotenv;
use meal_planner::api_connection::{
    connection::ApiConnectionError,
    endpoints::{ChatCompletionRequest, ChatMessage, Provider, ResponseFormat, OPENROUTER_MODELS},
};
use meal_planner::config::GeneratorConfig;
use meal_planner::models::MealPlanRequest;
use meal_planner::plan_generator::{generate_with_fallback, LlmPlanGenerator, PlanGenerator, PlanSource};
use meal_planner::Catalog;
use std::env;
use std::time::Duration;

const TEST_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

fn get_cerebras_test_model() -> String {
    OPENROUTER_MODELS
        .iter()
        .find(|m| m.model_source == "cerebras")
        .map(|m| m.model_name.to_string())
        .expect("No Cerebras model found in OPENROUTER_MODELS for testing")
}

fn setup_test_environment() {
    dotenv().ok();
}

fn weekly_request() -> MealPlanRequest {
    MealPlanRequest {
        budget: 2100.0,
        calorie_target: 2000.0,
        dietary_preferences: vec!["VEGETARIAN".to_string()],
        health_goals: vec!["MAINTAIN_HEALTH".to_string()],
        allergies: None,
        duration_days: 7,
        region: None,
    }
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let provider = Provider::openrouter("THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    let request = ChatCompletionRequest {
        model: get_cerebras_test_model(),
        messages: vec![ChatMessage::user("Hello")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };
    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    }
}

#[tokio::test]
async fn test_unreachable_model_falls_back_to_deterministic_plan() {
    setup_test_environment();
    let config = GeneratorConfig {
        api_key_env_var: "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ".to_string(),
        ..GeneratorConfig::default()
    };
    let generator = LlmPlanGenerator::new(config);
    let catalog = Catalog::new(vec![], vec![]).unwrap();

    let outcome = generate_with_fallback(
        &generator,
        &weekly_request(),
        &catalog,
        Some(Duration::from_secs(5)),
    )
    .await;

    assert_eq!(outcome.source, PlanSource::Fallback);
    assert_eq!(outcome.plan.days.len(), 7);
    assert_eq!(outcome.plan.total_cost, 2100.0);
    assert_eq!(outcome.plan.average_daily_calories, 2000.0);
    assert!(outcome.failure.is_some());
}

#[tokio::test]
#[ignore]
async fn test_successful_json_object_call() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!(
            "Skipping test_successful_json_object_call: {} not set.",
            TEST_API_KEY_ENV_VAR
        );
        return;
    }

    let provider = Provider::openrouter(TEST_API_KEY_ENV_VAR);
    let request = ChatCompletionRequest {
        model: get_cerebras_test_model(),
        messages: vec![
            ChatMessage::system(
                "Answer in JSON with keys \"dish\" and \"calories\". /no_thinking",
            ),
            ChatMessage::user("Give me one typical Indian breakfast."),
        ],
        response_format: Some(ResponseFormat::json_object()),
        temperature: Some(0.2),
        max_tokens: Some(300),
    };

    let result = provider.call_chat_completion(request).await;
    assert!(result.is_ok(), "API call failed: {:?}", result.err());
    let response = result.unwrap();
    let content = response.first_content().expect("empty response");
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let parsed: serde_json::Value = serde_json::from_str(trimmed)
        .unwrap_or_else(|e| panic!("Response is not JSON ({}): '{}'", e, content));
    assert!(parsed.get("dish").is_some());
}

#[tokio::test]
#[ignore]
async fn test_live_model_plan_has_requested_days() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!(
            "Skipping test_live_model_plan_has_requested_days: {} not set.",
            TEST_API_KEY_ENV_VAR
        );
        return;
    }

    let mut request = weekly_request();
    request.duration_days = 2;
    request.budget = 600.0;
    let generator = LlmPlanGenerator::new(GeneratorConfig::from_env());
    let catalog = Catalog::new(vec![], vec![]).unwrap();

    match generator.generate(&request, &catalog).await {
        Ok(plan) => {
            assert_eq!(plan.days.len(), 2);
            assert!(plan.days.iter().all(|d| !d.meals.is_empty()));
        }
        // The model may still return something unusable; that path is covered by the fallback.
        Err(e) => println!("model did not produce a usable plan: {}", e),
    }
}

#[tokio::test]
#[ignore]
async fn test_api_error_with_invalid_key() {
    setup_test_environment();

    const INVALID_KEY_ENV_NAME_FOR_THIS_TEST: &str = "ENV_VAR_WITH_BAD_KEY_VALUE";

    unsafe {
        std::env::set_var(
            INVALID_KEY_ENV_NAME_FOR_THIS_TEST,
            "this_is_a_deliberately_bad_api_key_string_for_testing",
        );
    }

    let provider = Provider::openrouter(INVALID_KEY_ENV_NAME_FOR_THIS_TEST);
    let request = ChatCompletionRequest {
        model: get_cerebras_test_model(),
        messages: vec![ChatMessage::user("This call should fail due to invalid key.")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };

    let result = provider.call_chat_completion(request).await;
    assert!(
        matches!(result, Err(ApiConnectionError::ApiError { .. })),
        "Expected ApiError, got {:?}",
        result
    );
    if let Err(ApiConnectionError::ApiError { status, .. }) = result {
        assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    }

    unsafe {
        std::env::remove_var(INVALID_KEY_ENV_NAME_FOR_THIS_TEST);
    }
}
