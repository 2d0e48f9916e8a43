//! Every middleware at work:
//!
//! ```sh
//! cargo run --example getting_started -- ./public
//! curl -i http://127.0.0.1:3000/visits
//! curl -i -d 'name=neo' 'http://127.0.0.1:3000/api/users/42?lang=en'
//! ```

use futures::FutureExt;
use serde_json::json;
use strand_web::middleware::{self, Cookie};
use strand_web::{Body, Router, Server, handler_fn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut api = Router::new();
    api.get(
        "/users/:id",
        handler_fn(|req, res, _next| {
            async move {
                let id = req.param("id").unwrap_or_default().to_string();
                res.json(&json!({ "id": id })).await?;
                Ok(())
            }
            .boxed()
        }),
    )?
    .post(
        "/users/:id",
        handler_fn(|req, res, _next| {
            async move {
                let fields = match req.body() {
                    Body::Fields(fields) => fields.clone(),
                    Body::Raw(_) => Default::default(),
                };
                res.set_status(201)?;
                res.json(&json!({ "id": req.param("id"), "fields": fields })).await?;
                Ok(())
            }
            .boxed()
        }),
    )?;

    let mut router = Router::new();
    router
        .use_middleware(middleware::logger())?
        .use_middleware(middleware::cookie_parser())?
        .use_middleware(middleware::session())?
        .use_middleware(middleware::body_parser())?
        .get(
            "/visits",
            handler_fn(|req, res, _next| {
                async move {
                    let session = req.session().ok_or("session middleware missing")?;
                    let visits = session.get::<u64>("visits").unwrap_or(0) + 1;
                    session.insert("visits", &visits)?;

                    res.set_cookie(&Cookie::new("last_visit", visits.to_string()).max_age(600))?;
                    res.send(format!("visit number {visits}")).await?;
                    Ok(())
                }
                .boxed()
            }),
        )?
        .mount("/api", api)?;

    if let Some(public) = std::env::args().nth(1) {
        router.mount("/static", middleware::serve_static(public)?)?;
    }

    Server::builder().router(router).address("127.0.0.1:3000").max_connections(256).build()?.start().await?;
    Ok(())
}
