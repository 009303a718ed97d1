pub mod handlers;

use actix_web::web;
use handlers::{
    files::{get_file, new_folder, upload},
    web_ui::{index, robots_txt, serve_favicon, serve_static_asset},
    websocket::ws_route,
};

/// All HTTP routes. Expects `web::Data<ServerConfig>` and
/// `web::Data<ClientRegistry>` to be registered on the app.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/getfile", web::get().to(get_file))
        .route("/upload", web::post().to(upload))
        .route("/newfolder", web::post().to(new_folder))
        .route("/ws", web::get().to(ws_route))
        .route("/static/{filename:.*}", web::get().to(serve_static_asset))
        .route("/favicon.svg", web::get().to(serve_favicon))
        .route("/favicon.ico", web::get().to(serve_favicon))
        .route("/robots.txt", web::get().to(robots_txt));
}
