use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct FooterProps {
    pub build_version: String,
    pub git_sha: String,
}

#[component]
pub fn Footer(props: FooterProps) -> Element {
    let version = env!("CARGO_PKG_VERSION");
    rsx! {
        footer { class: "app-footer text-muted",
            p { "dirshare v{version} · build {props.build_version} · {props.git_sha}" }
        }
    }
}
