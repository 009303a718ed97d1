use crate::core::listing::child_path;
use crate::core::models::PageData;
use dioxus::prelude::*;

fn encode(relative: &str) -> String {
    url::form_urlencoded::byte_serialize(relative.as_bytes()).collect()
}

/// Link to the listing page of a directory relative to the share.
pub fn listing_href(relative: &str) -> String {
    if relative == "." || relative.is_empty() {
        "/".to_string()
    } else {
        format!("/?p={}", encode(relative))
    }
}

pub fn download_href(relative: &str) -> String {
    format!("/getfile?p={}", encode(relative))
}

struct Row {
    name: String,
    href: String,
    modified: String,
    size: String,
}

#[derive(Props, Clone, PartialEq)]
pub struct DirectoryViewProps {
    pub page: PageData,
}

#[component]
pub fn DirectoryView(props: DirectoryViewProps) -> Element {
    let page = &props.page;
    let location = if page.directory_path == "." {
        "/".to_string()
    } else {
        format!("/{}", page.directory_path)
    };
    let parent_href = listing_href(&page.parent_dir);

    let directories: Vec<Row> = page
        .directories
        .iter()
        .map(|d| Row {
            name: d.name.clone(),
            href: listing_href(&child_path(&page.directory_path, &d.name)),
            modified: d.modified.clone(),
            size: String::new(),
        })
        .collect();

    let files: Vec<Row> = page
        .files
        .iter()
        .map(|f| Row {
            name: f.name.clone(),
            href: download_href(&child_path(&page.directory_path, &f.name)),
            modified: f.modified.clone(),
            size: f.size.clone(),
        })
        .collect();

    let is_empty = directories.is_empty() && files.is_empty();

    rsx! {
        section { class: "panel",
            h1 { class: "dir-title", "{page.directory_name}" }
            p { class: "dir-location text-muted", "{location}" }

            table { id: "listing",
                thead {
                    tr {
                        th { "Name" }
                        th { "Modified" }
                        th { class: "col-size", "Size" }
                    }
                }
                tbody {
                    if page.is_not_top_most {
                        tr { class: "row-parent",
                            td { a { href: "{parent_href}", ".." } }
                            td {}
                            td {}
                        }
                    }
                    for row in directories {
                        tr { class: "row-dir",
                            td { a { href: "{row.href}", "{row.name}/" } }
                            td { "{row.modified}" }
                            td { class: "col-size" }
                        }
                    }
                    for row in files {
                        tr { class: "row-file",
                            td { a { href: "{row.href}", download: "{row.name}", "{row.name}" } }
                            td { "{row.modified}" }
                            td { class: "col-size", "{row.size}" }
                        }
                    }
                    if is_empty {
                        tr { class: "row-empty",
                            td { colspan: "3", class: "text-muted", "This folder is empty." }
                        }
                    }
                }
            }
        }
    }
}
