use crate::components::footer::Footer;
use crate::components::header::Header;
use crate::components::modals::{NewFolderModal, UploadModal};
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct LayoutProps {
    pub title: String,
    pub share_name: String,
    /// Directory being shown, relative to the share. Read by app.js to decide
    /// which live events concern this page.
    pub directory_path: String,
    pub build_version: String,
    pub git_sha: String,
    pub children: Element,
}

#[component]
pub fn Layout(props: LayoutProps) -> Element {
    rsx! {
        head {
            meta { charset: "UTF-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1.0" }
            meta { name: "robots", content: "noindex, nofollow" }
            meta { name: "referrer", content: "no-referrer" }
            title { "{props.title}" }

            link { rel: "icon", r#type: "image/svg+xml", href: "/favicon.svg" }
            link { rel: "stylesheet", href: "/static/css/style.css?v={props.git_sha}" }
        }
        body {
            "data-path": "{props.directory_path}",

            Header { share_name: props.share_name.clone() }

            main {
                {props.children}
            }

            UploadModal { directory_path: props.directory_path.clone() }
            NewFolderModal { directory_path: props.directory_path.clone() }

            Footer {
                build_version: props.build_version.clone(),
                git_sha: props.git_sha.clone()
            }

            script { src: "/static/js/app.js?v={props.git_sha}" }
        }
    }
}
