#[actix_web::main]
async fn main() -> std::io::Result<()> {
    replen_server::run().await
}
