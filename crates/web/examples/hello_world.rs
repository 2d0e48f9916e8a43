use futures::FutureExt;
use strand_web::{Router, Server, handler_fn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut router = Router::new();
    router.get("/", handler_fn(|_req, res, _next| async move { Ok(res.send("hello world").await?) }.boxed()))?;

    Server::builder()
        .router(router)
        .address("127.0.0.1:3000")
        .build()?
        .listen(|address| println!("listening on http://{address}"))
        .await?;
    Ok(())
}
