use anyhow::Context;

use burrow::config::Config;
use burrow::http::responder::{PathResponder, ResponderRegistry};
use burrow::http::response::Response;
use burrow::http::server::HttpServer;
use burrow::http::static_files::StaticFileResponder;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut registry = ResponderRegistry::new();
    registry.register(PathResponder::new("/", |_| Response::ok("Hello from burrow\n")));
    if let Some(static_files) = &cfg.static_files {
        tracing::info!(root = %static_files.root.display(), "Serving static files");
        registry.register(StaticFileResponder::new(
            static_files.root.clone(),
            static_files.index.clone(),
        ));
    }

    HttpServer::with_hostname(&cfg.server.host, cfg.server.port, registry)?
        .limits(cfg.server.limits())
        .backlog(cfg.server.backlog)
        .start()
        .with_context(|| format!("server on {} stopped", cfg.listen_addr()))?;

    Ok(())
}
