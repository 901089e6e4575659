use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use civitas::{
    application::{
        backend::{AdminCollections, AuthApi, PublicApi, RequestsApi, UploadSigner},
        error::AppError,
        session::LoginService,
        uploads::{MediaHost, UploadGateway},
        workspaces::AdminWorkspaces,
    },
    config,
    domain::uploads::ImagePolicy,
    infra::{
        backend::BackendClient,
        error::InfraError,
        http::{self, AdminState, PublicState},
        media::CloudinaryHost,
        telemetry,
    },
};
use tokio::{sync::watch, task::JoinHandle, try_join};
use tracing::{Dispatch, Level, debug, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const EDITOR_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::CheckBackend(_) => run_check_backend(settings).await,
    }
}

async fn run_check_backend(settings: config::Settings) -> Result<(), AppError> {
    let backend = BackendClient::new(&settings.backend).map_err(AppError::from)?;
    let status = backend.probe().await?;
    info!(
        target = "civitas::check_backend",
        base_url = %backend.base(),
        status,
        "backend answered"
    );
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let (public_state, admin_state) = build_states(&settings)?;
    let sweep_handle =
        spawn_editor_sweep(admin_state.workspaces.clone(), settings.admin.editor_idle);

    let result = serve_http(&settings, public_state, admin_state).await;

    sweep_handle.abort();
    let _ = sweep_handle.await;
    result
}

/// Periodically drop admin editors nobody has touched within `idle`.
fn spawn_editor_sweep(workspaces: Arc<AdminWorkspaces>, idle: Duration) -> JoinHandle<()> {
    let period = idle.min(EDITOR_SWEEP_PERIOD);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            let dropped = workspaces.sweep_idle(idle);
            if dropped > 0 {
                debug!(
                    target = "civitas::serve",
                    dropped,
                    held = workspaces.len(),
                    "idle admin editors dropped"
                );
            }
        }
    })
}

fn build_states(settings: &config::Settings) -> Result<(PublicState, AdminState), AppError> {
    let backend = Arc::new(BackendClient::new(&settings.backend).map_err(AppError::from)?);
    let media: Arc<dyn MediaHost> =
        Arc::new(CloudinaryHost::new(&settings.media).map_err(AppError::from)?);

    let public_api: Arc<dyn PublicApi> = backend.clone();
    let collections: Arc<dyn AdminCollections> = backend.clone();
    let requests: Arc<dyn RequestsApi> = backend.clone();
    let auth: Arc<dyn AuthApi> = backend.clone();
    let signer: Arc<dyn UploadSigner> = backend.clone();

    let policy = ImagePolicy::new(
        settings.uploads.max_image_bytes.get(),
        settings.uploads.allowed_types.clone(),
    );

    let public_state = PublicState::new(public_api);
    let admin_state = AdminState {
        collections,
        requests,
        login: Arc::new(LoginService::new(auth)),
        uploads: Arc::new(UploadGateway::new(signer, media, policy)),
        workspaces: Arc::new(AdminWorkspaces::default()),
        base_path: settings.admin.base_path.clone(),
        secure_cookies: settings.admin.secure_cookies,
        media_folder: Some(settings.media.default_folder.clone())
            .filter(|folder| !folder.trim().is_empty()),
    };

    Ok((public_state, admin_state))
}

async fn serve_http(
    settings: &config::Settings,
    public_state: PublicState,
    admin_state: AdminState,
) -> Result<(), AppError> {
    let public_router = http::build_public_router(public_state);
    let upload_body_limit = usize::try_from(settings.uploads.max_request_bytes.get())
        .unwrap_or(usize::MAX);
    let admin_router = http::build_admin_router(admin_state, upload_body_limit);

    let public_listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let admin_listener = tokio::net::TcpListener::bind(settings.server.admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "civitas::serve",
        public = %settings.server.public_addr,
        admin = %settings.server.admin_addr,
        backend = %settings.backend.base_url,
        "listeners bound"
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(stopped(stop_rx.clone()))
        .into_future();
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(stopped(stop_rx.clone()))
        .into_future();
    let servers = async { try_join!(public_server, admin_server) };

    tokio::select! {
        result = servers => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        () = drain_deadline(stop_rx, settings.server.graceful_shutdown) => {
            warn!(
                target = "civitas::serve",
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    Ok(())
}

async fn stopped(mut stop: watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}

/// Resolves once shutdown was requested and the grace period has run out.
async fn drain_deadline(stop: watch::Receiver<bool>, grace: Duration) {
    stopped(stop).await;
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!(target = "civitas::serve", "shutdown requested");
}
