//! # Curator Kernel
//!
//! Boots the kernel, registers two sample services and their capabilities,
//! then serves until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `CK_*` environment)
//! 2. Install telemetry
//! 3. Assemble the kernel (utilities first; any failure is fatal)
//! 4. Register and start services in dependency order
//! 5. Publish capabilities
//! 6. Spawn background tasks and wait for a signal
//!
//! Set `CK_DEMO_ONESHOT=1` to shut down right after the demo.

use std::env;

use anyhow::{Context, Result};
use tracing::{info, warn};

use ck_03_capability_registry::RegistryApi;
use ck_04_route_index::RouteQuery;
use kernel_runtime::demo::{parse_file, plan_journey, DemoService};
use kernel_runtime::{Kernel, KernelConfig};
use kernel_telemetry::init_telemetry;
use shared_types::{CallerContext, TenantScope};

async fn run_demo(kernel: &Kernel) -> Result<()> {
    let container = kernel.container();
    container
        .register_service("content_service", DemoService::new(), vec![], TenantScope::Global)
        .context("Failed to register content_service")?;
    container
        .register_service(
            "journey_service",
            DemoService::new(),
            vec!["content_service".to_string()],
            TenantScope::Global,
        )
        .context("Failed to register journey_service")?;

    let report = container.start_all().await.context("Failed to start services")?;
    info!(started = ?report.started, "Services started");

    let system = CallerContext::system();
    let registry = kernel.registry();
    for definition in [parse_file("1.0.0"), parse_file("1.1.0"), plan_journey()] {
        let key = definition.key();
        let outcome = registry
            .register_domain_capability(definition, &system)
            .with_context(|| format!("Failed to register {key}"))?;
        info!(key = %key, outcome = outcome.as_str(), "Capability published");
    }

    for route in registry.discover_routes(&RouteQuery::all()) {
        info!(
            route = %route.route_id,
            domain = %route.domain,
            version = %route.version,
            path = route.path.as_deref().unwrap_or("-"),
            "Route available"
        );
    }

    let health = kernel.get_health();
    info!(overall = ?health.overall, services = health.services.len(), "Kernel health");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = KernelConfig::from_env().context("Failed to load configuration")?;

    let telemetry = init_telemetry(config.telemetry.clone())
        .await
        .context("Failed to initialize telemetry")?;

    let kernel = Kernel::with_metrics(config, telemetry.metrics().clone())
        .context("Failed to assemble kernel")?;

    info!("===========================================");
    info!("  Curator Kernel v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    kernel.spawn_background_tasks();

    if let Err(e) = run_demo(&kernel).await {
        warn!(error = %format!("{e:#}"), "Demo failed");
    }

    let oneshot = env::var("CK_DEMO_ONESHOT").map(|v| v == "1").unwrap_or(false);
    if !oneshot {
        info!("Kernel is running. Press Ctrl+C to stop.");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
    }

    let stopped = kernel.shutdown().await;
    info!(stopped = ?stopped, "Kernel stopped");
    Ok(())
}
