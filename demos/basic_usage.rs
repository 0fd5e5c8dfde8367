//! Basic usage example
//!
//! Talks to a stack running on the default address and exercises each
//! capability once. The address can be overridden through `STACK_HOST` and
//! `STACK_PORT`.
//!
//! Usage:
//!   RUST_LOG=stack_client=debug cargo run --example basic_usage

use stack_client::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = match StackClientBuilder::from_env()?.build().await {
        Ok(client) => client,
        Err(e) if e.kind() == ErrorKind::Connection => {
            eprintln!("The stack is not reachable: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let health = client.health_check().await?;
    println!("Health: {} {:?}", health.status, health.details);

    let trace = client.trace("Analyze the auth logic").await?;
    println!("\nTrace answer: {}", trace.answer);
    for (i, step) in trace.steps.iter().enumerate() {
        println!("  {}. {} {:?}", i + 1, step.tool, step.args);
    }

    let answer = client
        .ask("How are tokens refreshed?", Pipeline::Reranking)
        .await?;
    println!("\nAsk answer: {}", answer.answer);
    for source in &answer.sources {
        println!("  - {} ({:?})", source.source, source.score);
    }

    let messages = vec![
        Message::system("You are a helpful assistant."),
        Message::user("Why is the sky blue?"),
    ];
    match client.chat(&messages, ChatOptions::thinking()).await {
        Ok(chat) => {
            if let Some(thinking) = &chat.thinking {
                println!("\nThinking:\n{}", thinking);
            }
            println!("\nChat answer: {}", chat.answer);
        }
        Err(e) => match e.kind() {
            ErrorKind::Api => eprintln!("Stack rejected the chat: {}", e),
            ErrorKind::Decode => eprintln!("Unexpected chat reply: {}", e),
            _ => return Err(e.into()),
        },
    }

    let forecast = client.forecast("cpu_load", 300, 20).await?;
    println!("\nForecast ({} points): {:?}", forecast.len(), forecast.forecast);

    Ok(())
}
