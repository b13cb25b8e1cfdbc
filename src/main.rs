mod api;
mod app;
mod authorize;
mod errors;
mod models;
mod services;

use actix_web::middleware::Logger;
use actix_web::{web, App as ActixWebApp, HttpServer};
use api::*;
use app::App;

#[tokio::main]
async fn main() {
    let app = App::new().await;
    let port = app.port();

    app.init();
    let app_web_data = web::Data::new(app);

    HttpServer::new(move || {
        ActixWebApp::new()
            .wrap(Logger::new("%a %r %s %b %T"))
            .wrap(app_web_data.cors())
            .app_data(app_web_data.clone())
            .service(
                web::scope("/run")
                    .service(get_run)
                    .service(create_run)
                    .service(update_run),
            )
    })
    .bind(("0.0.0.0", port))
    .unwrap_or_else(|e| panic!("Could not bind to port {}.\n{}", port, e))
    .run()
    .await
    .unwrap_or_else(|e| panic!("Could not run server on port {}.\n{}", port, e));
}
