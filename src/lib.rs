//! Bookshelf application library
//!
//! In-memory book records served over HTTP, wired through the kernel's
//! module registry.

pub mod modules;

pub use modules::*;

use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Registry holding every application module
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry);
    registry
}

/// Run the module lifecycle around the HTTP server until shutdown.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let registry = registry();
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, settings).await;

    registry.stop_modules().await?;
    served
}
