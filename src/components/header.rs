use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct HeaderProps {
    pub share_name: String,
}

#[component]
pub fn Header(props: HeaderProps) -> Element {
    rsx! {
        header { class: "app-header",
            a { href: "/", class: "brand", "{props.share_name}" }
            nav { class: "actions",
                a { href: "#uploadModal", class: "btn", id: "btn-upload", "Upload" }
                a { href: "#newFolderModal", class: "btn", id: "btn-new-folder", "New folder" }
                span {
                    id: "live-status",
                    class: "live-status offline",
                    title: "Live updates",
                    "offline"
                }
            }
        }
    }
}
