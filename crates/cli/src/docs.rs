//! Built-in documentation pages shown by `genai docs`.

/// Page opened when no topic is given.
pub const DEFAULT_DOC_PAGE: &str = "how-it-works";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocPage {
    pub id: &'static str,
    /// Short label used in the navigation list.
    pub nav_title: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocSection {
    pub id: &'static str,
    pub title: &'static str,
    pub pages: &'static [DocPage],
}

/// What a `genai docs <topic>` argument resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTopic {
    Page(&'static DocPage),
    Section(&'static DocSection),
}

pub const DOC_SECTIONS: &[DocSection] = &[
    DocSection {
        id: "getting-started",
        title: "Getting Started",
        pages: &[
            DocPage {
                id: "how-it-works",
                nav_title: "How It Works",
                title: "How It Works",
                body: "\
genai talks to Hugging Face models through the inference proxy so you can
focus on the conversation instead of the API plumbing.

1. Enter your API key. Paste a Hugging Face token into the key field and
   press Enter to validate it.
2. Choose a model. Pick a category, then a model specialised for it:
   conversation, creative writing or sentiment analysis.
3. Create and analyse. Chat with the model, draft a story or score the
   sentiment of a sentence.

The demo allows a few free messages before asking you to sign in with
`genai auth login`. Signed-in users can keep several chats in
`genai dashboard`.",
            },
            DocPage {
                id: "api-key",
                nav_title: "Getting an API Key",
                title: "Getting a Hugging Face API Key",
                body: "\
You need a Hugging Face access token to use genai.

1. Create an account at https://huggingface.co/join.
2. Open Settings from your profile menu.
3. Under \"Access Tokens\", click \"New Token\".
4. Name the token and give it read permission.
5. Copy the token and store it with `genai key set <token>`, or paste it
   into the key field of the TUI.

Important: keep the key private. genai stores it in plain text in
storage.toml under ~/.genai (or $GENAI_HOME) and only sends it to the
inference proxy. `genai key clear` removes it.",
            },
        ],
    },
    DocSection {
        id: "development",
        title: "Development",
        pages: &[
            DocPage {
                id: "source-code",
                nav_title: "Source Code",
                title: "Source Code",
                body: "\
genai is open source. Explore the code, contribute or fork it for your own
projects.

Built with:
  - Rust and tokio
  - ratatui and crossterm for the terminal UI
  - reqwest for the proxy and account APIs
  - the Hugging Face Inference API",
            },
            DocPage {
                id: "architecture",
                nav_title: "Architecture",
                title: "Architecture",
                body: "\
The workspace is split into small crates:

  - proto: chat messages, the model catalog and shared error types
  - inference: request building, the proxy client and the reply formatter
  - session: key storage and the demo and dashboard chat controllers
  - portal: account sign-in and testimonials
  - cli: the `genai` binary, its configuration and the TUI",
            },
        ],
    },
    DocSection {
        id: "resources",
        title: "Resources",
        pages: &[
            DocPage {
                id: "hugging-face",
                nav_title: "Hugging Face API",
                title: "Hugging Face API",
                body: "\
The Hugging Face API gives access to thousands of machine learning models.
genai relies on the Inference API endpoints:

  https://api-inference.huggingface.co/models/[MODEL_ID]

See https://huggingface.co/docs/api-inference/index for details.",
            },
            DocPage {
                id: "contributing",
                nav_title: "Contributing",
                title: "Contributing",
                body: "\
Contributions are welcome.

1. Fork the repository on GitHub.
2. Make your changes in a new branch.
3. Open a pull request with a clear description of the change.

Please follow the existing code style and include tests.",
            },
        ],
    },
];

pub fn find_page(id: &str) -> Option<&'static DocPage> {
    DOC_SECTIONS
        .iter()
        .flat_map(|s| s.pages.iter())
        .find(|p| p.id == id)
}

/// Resolves a page id or a section id, ignoring case and surrounding space.
pub fn resolve_topic(topic: &str) -> Option<DocTopic> {
    let topic = topic.trim().to_ascii_lowercase();
    if let Some(page) = find_page(&topic) {
        return Some(DocTopic::Page(page));
    }
    DOC_SECTIONS
        .iter()
        .find(|s| s.id == topic)
        .map(DocTopic::Section)
}

/// Navigation list; the `active` page is marked with `▸`.
pub fn render_navigation(active: Option<&str>) -> String {
    let mut out = String::from("Documentation\n");
    for section in DOC_SECTIONS {
        out.push_str(&format!("\n{} ({})\n", section.title, section.id));
        for page in section.pages {
            let marker = if active == Some(page.id) { "▸" } else { " " };
            out.push_str(&format!("  {marker} {:<20} {}\n", page.id, page.nav_title));
        }
    }
    out
}

pub fn render_page(page: &DocPage) -> String {
    let rule = "─".repeat(page.title.chars().count());
    format!("{}\n{rule}\n\n{}\n", page.title, page.body)
}

pub fn render_section(section: &DocSection) -> String {
    let mut out = format!("{}\n", section.title);
    for page in section.pages {
        out.push_str(&format!("  {:<20} {}\n", page.id, page.nav_title));
    }
    out.push_str("\nRun `genai docs <page>` to read one.\n");
    out
}
