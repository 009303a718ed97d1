use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ModalProps {
    pub directory_path: String,
}

// The `path` input comes first: the server expects it before any file part.
#[component]
pub fn UploadModal(props: ModalProps) -> Element {
    rsx! {
        div { id: "uploadModal", class: "modal-overlay",
            a { href: "#", class: "close-overlay" }
            div { class: "modal-content panel",
                h2 { "Upload files" }
                form {
                    id: "upload-form",
                    action: "/upload",
                    method: "post",
                    enctype: "multipart/form-data",
                    input { r#type: "hidden", name: "path", value: "{props.directory_path}" }
                    input { r#type: "file", name: "files", multiple: true, required: true }
                    div { class: "modal-actions",
                        a { href: "#", class: "btn", "Cancel" }
                        button { r#type: "submit", class: "btn btn-primary", "Upload" }
                    }
                    p { id: "upload-status", class: "text-muted" }
                }
            }
        }
    }
}

#[component]
pub fn NewFolderModal(props: ModalProps) -> Element {
    rsx! {
        div { id: "newFolderModal", class: "modal-overlay",
            a { href: "#", class: "close-overlay" }
            div { class: "modal-content panel",
                h2 { "New folder" }
                form {
                    id: "new-folder-form",
                    action: "/newfolder",
                    method: "post",
                    enctype: "multipart/form-data",
                    input { r#type: "hidden", name: "path", value: "{props.directory_path}" }
                    input {
                        r#type: "text",
                        name: "foldername",
                        placeholder: "Folder name",
                        required: true,
                        autocomplete: "off"
                    }
                    div { class: "modal-actions",
                        a { href: "#", class: "btn", "Cancel" }
                        button { r#type: "submit", class: "btn btn-primary", "Create" }
                    }
                    p { id: "new-folder-status", class: "text-muted" }
                }
            }
        }
    }
}
