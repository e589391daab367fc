//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/certificate", get(handlers::users::my_certificate))
        .route("/volunteers", get(handlers::users::list_volunteers))
        .route("/{user_id}/certificate", get(handlers::users::volunteer_certificate))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Catálogo + ciclo de vida das inscrições
    let catalog_routes = Router::new()
        .route(
            "/organizations",
            post(handlers::catalog::create_organization)
                .get(handlers::catalog::list_organizations),
        )
        .route("/projects", post(handlers::catalog::create_project))
        .route("/offers", post(handlers::catalog::create_offer))
        .route(
            "/offers/{offer_id}",
            get(handlers::catalog::get_offer).put(handlers::catalog::update_offer),
        )
        .route("/offers/{offer_id}/apply", post(handlers::offers::apply))
        .route("/offers/{offer_id}/confirm", post(handlers::offers::confirm))
        .route("/offers/{offer_id}/approve", post(handlers::offers::approve))
        .route("/offers/{offer_id}/approve-whole", post(handlers::offers::approve_whole))
        .route("/offers/{offer_id}/withdraw", post(handlers::offers::withdraw))
        .route("/offers/{offer_id}/certificate", get(handlers::offers::offer_certificate))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let review_routes = Router::new()
        .route(
            "/reviews",
            post(handlers::reviews::submit_review).get(handlers::reviews::list_reviews),
        )
        .route(
            "/reviews/{review_id}",
            put(handlers::reviews::update_review).delete(handlers::reviews::delete_review),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api", catalog_routes)
        .nest("/api", review_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
