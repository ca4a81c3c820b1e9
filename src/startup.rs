use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use actix_web_lab::middleware::from_fn;
use tracing_actix_web::TracingLogger;

use crate::authorization::middleware::enforce_folder_protection;
use crate::configuration::Settings;
use crate::domain::ProtectionConfig;
use crate::routes::health_check;
use crate::routes::pass_through;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Wrapper over `startup::run` that builds a `Server`
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        // env-dependent host
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // get the randomised port assigned by OS (tests bind to port 0); this
        // will be saved in the `port` field
        let port = listener.local_addr()?.port();

        // validate the folder map once, at cold start; the snapshot is
        // immutable for the process lifetime, and a redeploy means a new
        // process generation, not an in-place mutation
        let protection = cfg.protection.snapshot()?;

        let server = run(listener, protection)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// Because this consumes `self`, this should be the final function call
    /// (or passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all endpoints. The protection middleware wraps the whole app, so
/// it fires on every viewer request before any handler runs -- the equivalent
/// of hooking the distribution's default behavior on the viewer-request event.
pub fn run(
    listener: TcpListener,
    protection: ProtectionConfig,
) -> Result<Server, anyhow::Error> {
    // `Data` is externally an `Arc`; concurrent requests across all workers
    // share one read-only snapshot, so there is nothing to contend on
    let protection = Data::new(protection);

    // note the closure: actix spins up a worker per core, each running its own
    // copy of the `App` built here, so everything moved in must be cloneable
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default()) // wrap the whole app in tracing middleware
            .wrap(from_fn(enforce_folder_protection))
            .route("/health_check", web::get().to(health_check))
            // everything else stands in for the content origin; the guard has
            // already run by the time any of this is reached
            .default_service(web::route().to(pass_through))
            .app_data(protection.clone())
    })
    .listen(listener)?
    .run();

    Ok(server) // sync return -- caller uses foo()?.await
}
