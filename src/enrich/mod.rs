//! Natural-language repository summaries.
//!
//! "Do X": Produce a short summary of what a repository is for.
//!
//! `ChatSummarizer` reads the repository README and asks an
//! OpenAI-compatible chat-completions endpoint to summarise it. Any failure
//! means "no summary"; the run carries on without one.

mod internal;

pub use internal::{strip_code_fence, ChatSummarizer, ReadmeFetcher};

/// Default chat-completions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// README characters kept after download.
pub const README_MAX_CHARS: usize = 15_000;

/// README characters included in the prompt.
pub const PROMPT_README_CHARS: usize = 8_000;

/// Build the summarisation prompt for one repository.
pub fn build_prompt(owner: &str, name: &str, description: &str, readme: &str) -> String {
    let excerpt = crate::properties::truncate(readme, PROMPT_README_CHARS);
    format!(
        "Summarise the following GitHub project in at most 200 words.\n\n\
         Project: {owner}/{name}\n\
         Description: {description}\n\n\
         README (excerpt):\n{excerpt}\n\n\
         Answer in this format:\n\
         **What it is**: [what the project is]\n\
         **What it is for**: [core features and use cases]\n\
         **How to use it**: [short usage or installation steps]\n\n\
         Be concise and accurate, focus on the project's core value and keep \
         practical advice brief."
    )
}
