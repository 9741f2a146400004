//! Example: Invoking a lambda and checking event implementation
//!
//! Loads the client configuration from the environment (or a `faas.json` /
//! `faas.toml` file), then checks whether an event is implemented and
//! invokes it.
//!
//! # Setup
//!
//! 1. Set environment variables: ```bash export FAAS_ACCOUNT_ID=123456
//!    export FAAS_CLIENT_ID=... FAAS_CLIENT_SECRET=... ```
//!
//! 2. Run this example: ```bash cargo run -p faas-infra --example invoke --
//!    conversational_command ```

use std::sync::Arc;

use faas_core::AuthStrategy;
use faas_domain::{events, Invocation, InvocationBody, IsImplementedRequest, LambdaFilter};
use faas_infra::{
    config, Client, FanoutMetricCollector, InvocationMetrics, TracingMetricCollector,
};
use serde_json::json;

const EXTERNAL_SYSTEM: &str = "faas-client-example";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let event_id =
        std::env::args().nth(1).unwrap_or_else(|| events::CONVERSATIONAL_COMMAND.to_string());

    let loaded = config::load()?;
    println!("FaaS client for account {}", loaded.client.account_id);

    let stats = Arc::new(InvocationMetrics::new());
    let collector = FanoutMetricCollector::new()
        .with(Arc::new(TracingMetricCollector))
        .with(stats.clone());

    let credentials =
        loaded.credentials.ok_or("FAAS_CLIENT_ID and FAAS_CLIENT_SECRET are required")?;
    let client = Client::builder(loaded.client)
        .auth(AuthStrategy::AppJwt(credentials))
        .metric_collector(Arc::new(collector))
        .build()?;

    let lambdas = client.get_lambdas(&LambdaFilter::default().event_id(&event_id)).await?;
    println!("Lambdas for {event_id}: {}", lambdas.body);

    let check = IsImplementedRequest::new(&event_id, EXTERNAL_SYSTEM);
    if !client.is_implemented(&check).await? {
        println!("Event {event_id} has no implementing lambda");
        return Ok(());
    }

    let body = InvocationBody::new(json!({"greeting": "hello"})).with_header("X-Demo", "1");
    let invocation = Invocation::event(&event_id, EXTERNAL_SYSTEM, body);
    match client.invoke(&invocation).await {
        Ok(response) => {
            println!(
                "Invocation answered {} after {:?} retries",
                response.status, response.retry_count
            );
            println!("{}", response.body);
        }
        Err(e) => println!("Invocation failed ({}): {e}", e.name()),
    }

    println!("invoke calls: {}, p95: {:?} ms", stats.invoke().calls(), stats.invoke().p95_ms());
    Ok(())
}
